use crate::config::CameraConfig;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Camera orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewpoint {
    pub azimuth: f64,
    pub elevation: f64,
}

/// Forward sweep followed by its reverse, without repeating either endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewpointSequence {
    views: Vec<Viewpoint>,
    forward_len: usize,
}

impl ViewpointSequence {
    pub fn new(camera: &CameraConfig) -> Self {
        let n = camera.forward_frames;
        let azimuths = Array1::linspace(camera.azimuth_start, camera.azimuth_end, n);
        let elevations = Array1::linspace(camera.elevation_start, camera.elevation_end, n);

        let forward: Vec<Viewpoint> = azimuths
            .iter()
            .zip(elevations.iter())
            .map(|(&azimuth, &elevation)| Viewpoint { azimuth, elevation })
            .collect();

        Self::bounce(forward)
    }

    /// Build the bounce from an explicit forward sweep
    pub fn bounce(forward: Vec<Viewpoint>) -> Self {
        let forward_len = forward.len();
        let mut views = forward;
        if forward_len > 2 {
            let back: Vec<Viewpoint> = views[1..forward_len - 1].iter().rev().copied().collect();
            views.extend(back);
        }
        Self { views, forward_len }
    }

    pub fn forward(&self) -> &[Viewpoint] {
        &self.views[..self.forward_len]
    }

    pub fn forward_len(&self) -> usize {
        self.forward_len
    }

    pub fn views(&self) -> &[Viewpoint] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
