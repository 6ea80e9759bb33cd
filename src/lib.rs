//! # price-surface
//!
//! Renders a synthetic bet-pricing surface as a rotating 3D animation.
//!
//! ## Features
//!
//! - Product-of-Gaussians price over date deviation and birth weight
//! - 3D surface frames with an inferno color bar, one per camera viewpoint
//! - Parallel frame rendering with deterministic file naming
//! - Looping GIF assembly with pauses at the start and the turning point
//!
//! ## Example
//!
//! ```rust,no_run
//! use price_surface::config::Config;
//! use price_surface::models::PriceModel;
//!
//! fn main() -> price_surface::error::Result<()> {
//!     let config = Config::from_env()?;
//!     config.init_logging()?;
//!
//!     let model = PriceModel::new(&config.pricing);
//!     println!("due date, 7.6 lbs: ${:.2}", model.quote(0.0, 7.6));
//!
//!     let output = price_surface::pipeline::run(&config)?;
//!     println!("{} frames -> {:?}", output.frames.len(), output.animation_path);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{PriceSurfaceError, Result};
