use crate::error::Result;
use crate::models::PricingModel;
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Parameters of the two Gaussian price components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Peak of the date component, in days from the due date
    pub mu_date: f64,
    /// Peak of the weight component, in pounds
    pub mu_weight: f64,
    /// Date offset at which the date component reaches zero
    pub bound_date: f64,
    /// Weight offset at which the weight component reaches zero
    pub bound_weight: f64,
    pub date_sigma: f64,
    pub weight_sigma: f64,
    /// Price of the least likely guess
    pub min_price: f64,
    /// Price of the most likely guess
    pub max_price: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            mu_date: 0.0,
            mu_weight: 7.6,
            bound_date: 21.0,
            bound_weight: 3.0,
            date_sigma: 7.0,
            weight_sigma: 1.5,
            min_price: 2.5,
            max_price: 25.0,
        }
    }
}

impl PricingConfig {
    /// Replace both sigmas with those of a pricing preset
    pub fn with_model(mut self, model: PricingModel) -> Self {
        let (date_sigma, weight_sigma) = model.sigmas();
        self.date_sigma = date_sigma;
        self.weight_sigma = weight_sigma;
        self
    }

    pub fn price_range(&self) -> f64 {
        self.max_price - self.min_price
    }
}

/// Resolution of the evaluation mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub date_samples: usize,
    pub weight_samples: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            date_samples: 80,
            weight_samples: 60,
        }
    }
}

/// Forward camera sweep, in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub forward_frames: usize,
    pub azimuth_start: f64,
    pub azimuth_end: f64,
    /// 25 degrees is an angled view, 80 is almost top-down
    pub elevation_start: f64,
    pub elevation_end: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            forward_frames: 40,
            azimuth_start: 0.0,
            azimuth_end: 90.0,
            elevation_start: 25.0,
            elevation_end: 80.0,
        }
    }
}

/// Frame raster settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Working directory for the per-frame PNGs
    pub frames_dir: PathBuf,
    pub frame_prefix: String,
    /// Render frames on the rayon pool
    pub parallel: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 700,
            height: 500,
            frames_dir: PathBuf::from("frames"),
            frame_prefix: "frame_".to_string(),
            parallel: true,
        }
    }
}

impl RenderConfig {
    /// Path of the frame with the given sequence index, e.g. `frames/frame_007.png`
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.frames_dir
            .join(format!("{}{:03}.png", self.frame_prefix, index))
    }
}

/// Hold and timing policy of the assembled animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// How many times a held frame is repeated
    pub hold_frames: usize,
    pub hold_ms: u32,
    pub sweep_ms: u32,
    pub output_path: PathBuf,
    /// GIF quantizer speed, 1 (best) to 30 (fastest)
    pub gif_speed: i32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            hold_frames: 2,
            hold_ms: 600,
            sweep_ms: 140,
            output_path: PathBuf::from("price_surface.gif"),
            gif_speed: 10,
        }
    }
}

/// Configuration for the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub pricing: PricingConfig,
    pub grid: GridConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
    pub animation: AnimationConfig,
    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            grid: GridConfig::default(),
            camera: CameraConfig::default(),
            render: RenderConfig::default(),
            animation: AnimationConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Built-in constants, with only the log level taken from the environment
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            log_level,
            ..Config::default()
        })
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();

        Ok(())
    }
}
