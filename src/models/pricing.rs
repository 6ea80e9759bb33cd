//! Gaussian price model
//!
//! A guess is priced by two independent Gaussian bumps, one over the date
//! deviation and one over the weight. Each bump is rescaled so that it is
//! exactly 1 at its mean and exactly 0 at its bound.

use crate::config::PricingConfig;
use crate::error::{PriceSurfaceError, Result};
use serde::{Deserialize, Serialize};

/// Sigma presets for the two price components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingModel {
    Aggressive,
    Standard,
    Chill,
}

impl PricingModel {
    /// (date sigma, weight sigma)
    pub fn sigmas(self) -> (f64, f64) {
        match self {
            PricingModel::Aggressive => (3.0, 0.4),
            PricingModel::Standard => (5.0, 0.75),
            PricingModel::Chill => (7.0, 1.0),
        }
    }
}

/// Sigma such that `exp(-0.5 * (bound / sigma)^2) == cutoff`
pub fn sigma_for_cutoff(bound: f64, cutoff: f64) -> Result<f64> {
    if cutoff <= 0.0 || cutoff >= 1.0 {
        return Err(PriceSurfaceError::ConfigError(format!(
            "Cutoff must be strictly between 0 and 1, got {}",
            cutoff
        )));
    }
    Ok(bound / (-2.0 * cutoff.ln()).sqrt())
}

/// One Gaussian bump rescaled to [0, 1] between its bound and its mean
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianComponent {
    pub mean: f64,
    pub sigma: f64,
    /// Offset from the mean at which the component is 0
    pub bound: f64,
    extreme: f64,
}

impl GaussianComponent {
    pub fn new(mean: f64, sigma: f64, bound: f64) -> Self {
        let extreme = (-0.5 * (bound / sigma).powi(2)).exp();
        Self {
            mean,
            sigma,
            bound,
            extreme,
        }
    }

    /// Raw Gaussian value, 1 at the mean
    pub fn gaussian(&self, x: f64) -> f64 {
        (-0.5 * ((x - self.mean) / self.sigma).powi(2)).exp()
    }

    /// Rescaled value. Not clamped: inputs beyond the bound go negative.
    pub fn normalized(&self, x: f64) -> f64 {
        (self.gaussian(x) - self.extreme) / (1.0 - self.extreme)
    }
}

/// Product-of-Gaussians price over (date deviation, weight)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceModel {
    pub date: GaussianComponent,
    pub weight: GaussianComponent,
    pub min_price: f64,
    pub max_price: f64,
}

impl PriceModel {
    pub fn new(config: &PricingConfig) -> Self {
        Self {
            date: GaussianComponent::new(config.mu_date, config.date_sigma, config.bound_date),
            weight: GaussianComponent::new(
                config.mu_weight,
                config.weight_sigma,
                config.bound_weight,
            ),
            min_price: config.min_price,
            max_price: config.max_price,
        }
    }

    pub fn price(&self, date_dev: f64, weight: f64) -> f64 {
        self.min_price
            + (self.max_price - self.min_price)
                * self.date.normalized(date_dev)
                * self.weight.normalized(weight)
    }

    /// Price rounded to whole cents, as shown to a bettor
    pub fn quote(&self, date_dev: f64, weight: f64) -> f64 {
        (self.price(date_dev, weight) * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn model() -> PriceModel {
        PriceModel::new(&PricingConfig::default())
    }

    #[test]
    fn components_peak_at_one_and_vanish_at_bound() {
        let m = model();
        assert_eq!(m.date.normalized(0.0), 1.0);
        assert_eq!(m.weight.normalized(7.6), 1.0);
        assert_abs_diff_eq!(m.date.normalized(21.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.date.normalized(-21.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.weight.normalized(7.6 + 3.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.weight.normalized(7.6 - 3.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn seed_prices() {
        let m = model();
        assert_eq!(m.price(0.0, 7.6), 25.0);
        assert_abs_diff_eq!(m.price(21.0, 7.6), 2.5, epsilon = 1e-9);
        assert_abs_diff_eq!(m.price(0.0, 10.6), 2.5, epsilon = 1e-9);
    }

    #[test]
    fn beyond_bound_is_not_clamped() {
        let m = model();
        assert!(m.date.normalized(30.0) < 0.0);
        assert!(m.price(30.0, 7.6) < m.min_price);
    }

    #[test]
    fn quote_rounds_to_cents() {
        let m = model();
        let q = m.quote(5.0, 8.1);
        assert_abs_diff_eq!(q, m.price(5.0, 8.1), epsilon = 0.005);
        assert_abs_diff_eq!(q * 100.0, (q * 100.0).round(), epsilon = 1e-9);
    }

    #[test]
    fn cutoff_sigma_inverts_gaussian() {
        let sigma = sigma_for_cutoff(14.0, 0.01).unwrap();
        let g = GaussianComponent::new(0.0, sigma, 14.0);
        assert_abs_diff_eq!(g.gaussian(14.0), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn cutoff_outside_unit_interval_is_rejected() {
        assert!(matches!(
            sigma_for_cutoff(14.0, 0.0),
            Err(PriceSurfaceError::ConfigError(_))
        ));
        assert!(sigma_for_cutoff(14.0, 1.0).is_err());
    }

    #[test]
    fn presets() {
        assert_eq!(PricingModel::Standard.sigmas(), (5.0, 0.75));
        assert_eq!(PricingModel::Chill.sigmas(), (7.0, 1.0));
    }
}
