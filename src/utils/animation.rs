//! Frame sequencing and GIF encoding
//!
//! The bounce-ordered frames are played with a pause on the first frame and
//! another on the turning point of the sweep. The GIF loops forever, so the
//! opening pause doubles as the pause at the end of the backward sweep.

use crate::config::AnimationConfig;
use crate::error::{PriceSurfaceError, Result};
use crate::utils::plotting::RenderedFrame;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::iter;
use tracing::info;

/// One displayed frame of the animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEntry {
    /// Index into the bounce-ordered frame list
    pub frame: usize,
    pub duration_ms: u32,
}

/// Ordered frame references with their display durations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationScript {
    entries: Vec<ScriptEntry>,
}

impl AnimationScript {
    /// Hold on the first frame, sweep forward, hold on the last forward frame,
    /// then play the rest of the bounce.
    pub fn build(frame_count: usize, forward_len: usize, config: &AnimationConfig) -> Result<Self> {
        if forward_len == 0 || forward_len > frame_count {
            return Err(PriceSurfaceError::Other(format!(
                "Forward sweep of {} frames does not fit {} rendered frames",
                forward_len, frame_count
            )));
        }

        let hold = |frame: usize| {
            iter::repeat(ScriptEntry {
                frame,
                duration_ms: config.hold_ms,
            })
            .take(config.hold_frames)
        };
        let sweep = |frames: std::ops::Range<usize>| {
            frames.map(|frame| ScriptEntry {
                frame,
                duration_ms: config.sweep_ms,
            })
        };

        let entries = hold(0)
            .chain(sweep(0..forward_len))
            .chain(hold(forward_len - 1))
            .chain(sweep(forward_len..frame_count))
            .collect();

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ScriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn frames(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.frame).collect()
    }

    pub fn durations(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.duration_ms).collect()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.entries.iter().map(|e| e.duration_ms as u64).sum()
    }
}

/// Encode the scripted frames into a looping GIF at `config.output_path`.
///
/// Each frame file is decoded once, however often the script repeats it.
pub fn encode_gif(
    script: &AnimationScript,
    frames: &[RenderedFrame],
    config: &AnimationConfig,
) -> Result<()> {
    let images = frames
        .iter()
        .map(|f| -> Result<RgbaImage> { Ok(image::open(&f.path)?.to_rgba8()) })
        .collect::<Result<Vec<RgbaImage>>>()?;

    if let Some(missing) = script.entries().iter().find(|e| e.frame >= images.len()) {
        return Err(PriceSurfaceError::Other(format!(
            "Script references frame {} but only {} were rendered",
            missing.frame,
            images.len()
        )));
    }

    info!(
        "Encoding {} GIF frames ({} ms per loop) to {:?}",
        script.len(),
        script.total_duration_ms(),
        config.output_path
    );

    let writer = BufWriter::new(File::create(&config.output_path)?);
    let mut encoder = GifEncoder::new_with_speed(writer, config.gif_speed);
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(script.entries().iter().map(|entry| {
        Frame::from_parts(
            images[entry.frame].clone(),
            0,
            0,
            Delay::from_numer_denom_ms(entry.duration_ms, 1),
        )
    }))?;

    Ok(())
}
