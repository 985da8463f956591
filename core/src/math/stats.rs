use num_complex::Complex64;

use crate::math::geodesy::normalize_bearing;

pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Population standard deviation.
    pub fn std_dev(values: &[f64]) -> Option<f64> {
        let mean = Self::mean(values)?;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        Some(variance.sqrt())
    }

    /// `Σ(value·weight) / Σweight`, or `None` when the weights sum to zero.
    pub fn weighted_mean(pairs: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
        let (weighted, total) = pairs
            .into_iter()
            .fold((0.0, 0.0), |(acc, sum), (value, weight)| {
                (acc + value * weight, sum + weight)
            });
        if total == 0.0 {
            None
        } else {
            Some(weighted / total)
        }
    }

    /// Standard deviation over mean, clamped to [0, 1].
    ///
    /// An empty sample or a non-positive mean counts as maximal variation.
    pub fn coefficient_of_variation(values: &[f64]) -> f64 {
        match (Self::mean(values), Self::std_dev(values)) {
            (Some(mean), Some(std_dev)) if mean > 0.0 => (std_dev / mean).clamp(0.0, 1.0),
            _ => 1.0,
        }
    }

    /// Mean of the unit phasors `e^{iθ}` for angles given in degrees.
    fn mean_resultant(angles_deg: &[f64]) -> Option<Complex64> {
        if angles_deg.is_empty() {
            return None;
        }
        let sum: Complex64 = angles_deg
            .iter()
            .map(|deg| Complex64::from_polar(1.0, deg.to_radians()))
            .sum();
        Some(sum / angles_deg.len() as f64)
    }

    /// Circular mean in degrees, [0, 360). Empty input yields 0.
    pub fn circular_mean_deg(angles_deg: &[f64]) -> f64 {
        Self::mean_resultant(angles_deg)
            .map(|resultant| normalize_bearing(resultant.arg().to_degrees()))
            .unwrap_or(0.0)
    }

    /// `1 - |mean(e^{iθ})|`: 0 for identical headings, 1 for no common direction.
    pub fn circular_variation(angles_deg: &[f64]) -> f64 {
        Self::mean_resultant(angles_deg)
            .map(|resultant| (1.0 - resultant.norm()).clamp(0.0, 1.0))
            .unwrap_or(1.0)
    }
}
