//! Data models for the price surface
//!
//! This module contains the Gaussian price model, the evaluated surface
//! and the camera viewpoints it is rendered from.

mod pricing;
mod surface;
mod viewpoint;

pub use pricing::*;
pub use surface::*;
pub use viewpoint::*;
