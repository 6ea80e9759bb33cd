use crate::config::{GridConfig, PricingConfig};
use crate::models::pricing::PriceModel;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Sample axes of the evaluation mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    /// Days from the due date, spanning `[-bound_date, bound_date]` around `mu_date`
    pub date_devs: Array1<f64>,
    /// Weights in pounds, spanning `mu_weight ± bound_weight`
    pub weights: Array1<f64>,
}

impl Grid {
    pub fn new(pricing: &PricingConfig, grid: &GridConfig) -> Self {
        let date_devs = Array1::linspace(
            pricing.mu_date - pricing.bound_date,
            pricing.mu_date + pricing.bound_date,
            grid.date_samples,
        );
        let weights = Array1::linspace(
            pricing.mu_weight - pricing.bound_weight,
            pricing.mu_weight + pricing.bound_weight,
            grid.weight_samples,
        );
        Self { date_devs, weights }
    }

    pub fn date_range(&self) -> (f64, f64) {
        axis_range(&self.date_devs)
    }

    pub fn weight_range(&self) -> (f64, f64) {
        axis_range(&self.weights)
    }
}

fn axis_range(axis: &Array1<f64>) -> (f64, f64) {
    let min = axis.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max = axis.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    (min, max)
}

/// Prices evaluated over a [`Grid`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSurface {
    pub grid: Grid,
    /// Prices (2D array: weights x date deviations)
    pub prices: Array2<f64>,
    pub min_price: f64,
    pub max_price: f64,
}

impl PriceSurface {
    pub fn evaluate(pricing: &PricingConfig, grid_config: &GridConfig) -> Self {
        let model = PriceModel::new(pricing);
        let grid = Grid::new(pricing, grid_config);

        let prices = Array2::from_shape_fn(
            (grid.weights.len(), grid.date_devs.len()),
            |(i, j)| model.price(grid.date_devs[j], grid.weights[i]),
        );

        Self {
            grid,
            prices,
            min_price: pricing.min_price,
            max_price: pricing.max_price,
        }
    }

    /// Price at the given (weight index, date index)
    pub fn at(&self, weight_idx: usize, date_idx: usize) -> f64 {
        self.prices[[weight_idx, date_idx]]
    }

    /// Position of `price` within the nominal price range, 0 at `min_price`
    pub fn normalize(&self, price: f64) -> f64 {
        (price - self.min_price) / (self.max_price - self.min_price)
    }
}
