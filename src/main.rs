//! Renders `price_surface.gif` from the built-in pricing constants.
//!
//! Per-frame PNGs are left in `frames/`.

use price_surface::config::Config;
use price_surface::error::Result;
use price_surface::pipeline;
use tracing::info;

fn main() -> Result<()> {
    let config = Config::from_env()?;
    config.init_logging()?;

    info!("Starting price surface animation");

    let output = pipeline::run(&config)?;

    info!(
        "Wrote {} frames and a {}-frame animation to {:?}",
        output.frames.len(),
        output.script.len(),
        output.animation_path
    );

    Ok(())
}
