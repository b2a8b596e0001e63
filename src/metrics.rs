//! Regression metrics over plain slices.

use crate::error::{LinRegError, Result};

pub struct Metrics;

impl Metrics {
    fn check(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
        if y_true.len() != y_pred.len() {
            return Err(LinRegError::DimensionMismatch {
                features: y_pred.len(),
                targets: y_true.len(),
            });
        }
        if y_true.is_empty() {
            return Err(LinRegError::EmptyDataset);
        }
        Ok(())
    }

    /// Mean squared error.
    ///
    /// ```
    /// use linreg_parity::metrics::Metrics;
    ///
    /// let mse = Metrics::mse(&[1.0, 2.0], &[1.0, 4.0]).unwrap();
    /// assert_eq!(mse, 2.0);
    /// ```
    pub fn mse(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
        Self::check(y_true, y_pred)?;
        let sum: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(t, p)| (t - p) * (t - p))
            .sum();
        Ok(sum / y_true.len() as f64)
    }

    pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
        Ok(Self::mse(y_true, y_pred)?.sqrt())
    }

    /// Coefficient of determination `1 − SS_res / SS_tot`.
    ///
    /// Constant targets have `SS_tot = 0`; the score is then 1 for a perfect
    /// fit and 0 otherwise.
    pub fn r2(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
        Self::check(y_true, y_pred)?;
        let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(t, p)| (t - p) * (t - p))
            .sum();
        let ss_tot: f64 = y_true.iter().map(|t| (t - mean) * (t - mean)).sum();
        if ss_tot == 0.0 {
            return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
        }
        Ok(1.0 - ss_res / ss_tot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_prediction() {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(Metrics::mse(&y, &y).unwrap(), 0.0);
        assert_eq!(Metrics::rmse(&y, &y).unwrap(), 0.0);
        assert_eq!(Metrics::r2(&y, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_mean_predictor_has_zero_r2() {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(Metrics::r2(&y, &[2.0, 2.0, 2.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_rmse() {
        assert_eq!(Metrics::rmse(&[0.0, 0.0], &[3.0, -3.0]).unwrap(), 3.0);
    }

    #[test]
    fn test_constant_targets() {
        assert_eq!(Metrics::r2(&[5.0, 5.0], &[5.0, 5.0]).unwrap(), 1.0);
        assert_eq!(Metrics::r2(&[5.0, 5.0], &[4.0, 5.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            Metrics::mse(&[1.0], &[1.0, 2.0]),
            Err(LinRegError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            Metrics::r2(&[], &[]),
            Err(LinRegError::EmptyDataset)
        ));
    }
}
