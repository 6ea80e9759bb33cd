//! Evaluate → render → assemble

use crate::config::{Config, PricingConfig};
use crate::error::Result;
use crate::models::{PriceModel, PriceSurface, ViewpointSequence};
use crate::utils::{encode_gif, render_frames, AnimationScript, RenderedFrame};
use std::path::PathBuf;
use tracing::{debug, info};

/// What a pipeline run left on disk
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub frames: Vec<RenderedFrame>,
    pub script: AnimationScript,
    pub animation_path: PathBuf,
}

/// Cent quotes at the peak and at the earliest, lightest grid corner
pub fn reference_quotes(pricing: &PricingConfig) -> [((f64, f64), f64); 2] {
    let model = PriceModel::new(pricing);
    let peak = (pricing.mu_date, pricing.mu_weight);
    let corner = (
        pricing.mu_date - pricing.bound_date,
        pricing.mu_weight - pricing.bound_weight,
    );
    [
        (peak, model.quote(peak.0, peak.1)),
        (corner, model.quote(corner.0, corner.1)),
    ]
}

pub fn run(config: &Config) -> Result<PipelineOutput> {
    info!("Evaluating price surface");
    let surface = PriceSurface::evaluate(&config.pricing, &config.grid);
    info!(
        "Surface has {} x {} points",
        surface.grid.date_devs.len(),
        surface.grid.weights.len()
    );

    for ((date_dev, weight), quote) in reference_quotes(&config.pricing) {
        debug!("Quote at ({}, {}): ${:.2}", date_dev, weight, quote);
    }

    let viewpoints = ViewpointSequence::new(&config.camera);
    info!(
        "Camera bounce of {} views ({} forward)",
        viewpoints.len(),
        viewpoints.forward_len()
    );

    let frames = render_frames(&surface, &viewpoints, &config.render)?;

    let script = AnimationScript::build(frames.len(), viewpoints.forward_len(), &config.animation)?;
    encode_gif(&script, &frames, &config.animation)?;
    info!("Animation saved to {:?}", config.animation.output_path);

    Ok(PipelineOutput {
        frames,
        script,
        animation_path: config.animation.output_path.clone(),
    })
}
