use statrs::distribution::{ContinuousCDF, Normal};

use crate::{align::Alignment, Error, FittedSur};

/// One row of a coefficient table: the estimate with its standard error and the
/// single-coefficient test of `beta = 0`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coef {
    label: String,
    estimate: f64,
    std_err: f64,
    z: f64,
    p_value: f64,
}

impl Coef {
    /// Fails when `variance` is not a positive finite number.
    pub fn new(
        label: impl ToString,
        estimate: f64,
        variance: f64,
        normal: &Normal,
    ) -> Result<Self, Error> {
        let label = label.to_string();
        if !variance.is_finite() || variance <= 0.0 {
            return Err(Error::NonPositiveVariance { label, variance });
        }
        let std_err = variance.sqrt();
        let z = estimate / std_err;
        Ok(Self {
            label,
            estimate,
            std_err,
            z,
            p_value: 2.0 * normal.sf(z.abs()),
        })
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    #[inline]
    pub fn std_err(&self) -> f64 {
        self.std_err
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.z
    }

    /// The Wald statistic of `beta = 0` for this coefficient alone, `z^2`, with one
    /// degree of freedom.
    #[inline]
    pub fn wald(&self) -> f64 {
        self.z * self.z
    }

    /// Two-sided normal p-value, equal to the chi-squared(1) upper tail of [`Self::wald`].
    #[inline]
    pub fn p_value(&self) -> f64 {
        self.p_value
    }
}

impl std::fmt::Display for Coef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {:.3} ({:.3}) z = {:.3}, p = {:.3}",
            self.label, self.estimate, self.std_err, self.z, self.p_value
        )
    }
}

/// Estimate, standard error, z statistic and two-sided normal p-value for every
/// coefficient of a fitted model, in coefficient order.
#[tracing::instrument(skip(model))]
pub fn coef_table(model: &impl FittedSur) -> Result<Vec<Coef>, Error> {
    let names = model.coef_names();
    let betas = model.coefficients();
    let cov = model.covariance();
    if names.len() != betas.len() {
        return Err(Error::DimensionMismatch {
            what: "coefficient names",
            expected: betas.len(),
            found: names.len(),
        });
    }
    if cov.nrows() != betas.len() || cov.ncols() != betas.len() {
        return Err(Error::DimensionMismatch {
            what: "covariance matrix",
            expected: betas.len(),
            found: if cov.nrows() != betas.len() {
                cov.nrows()
            } else {
                cov.ncols()
            },
        });
    }
    if !betas.iter().all(|x| x.is_finite()) {
        return Err(Error::NonFinite("coefficient vector"));
    }
    let perm = Alignment::covariance_only(names, cov)?;
    let perm = perm.covariance_order();
    let normal = Normal::new(0.0, 1.0).map_err(|e| Error::Distribution(e.to_string()))?;
    names
        .iter()
        .zip(betas.iter())
        .enumerate()
        .map(|(i, (label, &estimate))| {
            Coef::new(label, estimate, cov.get(perm[i], perm[i]), &normal)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::{LabeledMatrix, SurFit};

    macro_rules! assert_float_eq {
        ($a:expr, $b:expr, $tol:expr) => {
            assert!(($a - $b).abs() < $tol, "{:.22} != {:.22}", $a, $b);
        };
    }

    macro_rules! float_eq {
        ($a:expr, $b:expr) => {
            assert_float_eq!($a, $b, 1e-12);
        };
    }

    #[test]
    fn test_coef_table() {
        let cov = LabeledMatrix::from_rows(&[&[4.0, 0.5], &[0.5, 0.25]])
            .unwrap()
            .with_dimnames(vec!["x_2".to_string(), "x_1".to_string()])
            .unwrap();
        let fit = SurFit::new(
            vec!["x_1".to_string(), "x_2".to_string()],
            vec![1.0, -3.0],
            cov,
        )
        .unwrap();
        let table = coef_table(&fit).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].label(), "x_1");
        float_eq!(table[0].estimate(), 1.0);
        float_eq!(table[0].std_err(), 0.5);
        float_eq!(table[0].z(), 2.0);
        assert_float_eq!(table[0].p_value(), 0.04550026389635842, 1e-9);
        assert_eq!(table[1].label(), "x_2");
        float_eq!(table[1].std_err(), 2.0);
        float_eq!(table[1].z(), -1.5);
        assert_float_eq!(table[1].p_value(), 0.1336144025377161, 1e-9);
        float_eq!(table[1].wald(), 2.25);
    }

    #[test]
    fn test_coef_table_bad_covariance() {
        let fit = SurFit::new(
            vec!["a".to_string(), "b".to_string()],
            vec![1.0, 2.0],
            LabeledMatrix::identity(3),
        )
        .unwrap();
        assert!(matches!(
            coef_table(&fit).unwrap_err(),
            Error::DimensionMismatch { .. }
        ));
    }

    #[test]
    fn test_coef_table_non_positive_variance() {
        let fit = SurFit::new(
            vec!["a".to_string(), "b".to_string()],
            vec![1.0, 0.0],
            LabeledMatrix::from_rows(&[&[-1.0, 0.0], &[0.0, 0.0]]).unwrap(),
        )
        .unwrap();
        let err = coef_table(&fit).unwrap_err();
        assert!(
            matches!(
                &err,
                Error::NonPositiveVariance { label, variance } if label == "a" && *variance == -1.0
            ),
            "{err}"
        );

        let fit = SurFit::new(
            vec!["a".to_string(), "b".to_string()],
            vec![1.0, 0.0],
            LabeledMatrix::from_rows(&[&[1.0, 0.0], &[0.0, 0.0]]).unwrap(),
        )
        .unwrap();
        assert!(matches!(
            coef_table(&fit).unwrap_err(),
            Error::NonPositiveVariance { variance, .. } if variance == 0.0
        ));

        let fit = SurFit::new(
            vec!["a".to_string(), "b".to_string()],
            vec![1.0, 0.0],
            LabeledMatrix::from_rows(&[&[1.0, 0.0], &[0.0, f64::INFINITY]]).unwrap(),
        )
        .unwrap();
        assert!(matches!(
            coef_table(&fit).unwrap_err(),
            Error::NonPositiveVariance { .. }
        ));
    }

    #[test]
    fn test_coef_table_non_finite_coefficients() {
        let fit = SurFit::new(
            vec!["a".to_string(), "b".to_string()],
            vec![f64::NAN, 1.0],
            LabeledMatrix::identity(2),
        )
        .unwrap();
        assert!(matches!(
            coef_table(&fit).unwrap_err(),
            Error::NonFinite("coefficient vector")
        ));
    }

    #[test]
    fn test_coef_table_covariance_dimnames_disagree() {
        let fit = SurFit::new(
            vec!["a".to_string(), "b".to_string()],
            vec![1.0, 2.0],
            LabeledMatrix::identity(2)
                .with_rownames(vec!["a".to_string(), "b".to_string()])
                .unwrap()
                .with_colnames(vec!["b".to_string(), "a".to_string()])
                .unwrap(),
        )
        .unwrap();
        assert!(matches!(
            coef_table(&fit).unwrap_err(),
            Error::Alignment(_)
        ));
    }

    #[test]
    fn test_coef_display() {
        let normal = Normal::new(0.0, 1.0).unwrap();
        let coef = Coef::new("x1_2", 1.0, 0.25, &normal).unwrap();
        float_eq!(coef.wald(), 4.0);
        assert_eq!(coef.to_string(), "x1_2: 1.000 (0.500) z = 2.000, p = 0.046");
    }
}
