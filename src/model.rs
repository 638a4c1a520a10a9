use crate::{coef_table, Coef, Error, LabeledMatrix};

/// A fitted SUR model as needed for hypothesis testing: a named coefficient vector and
/// the estimated covariance of those coefficients.
///
/// How the model was estimated (maximum likelihood, 3SLS, ...) does not matter here.
pub trait FittedSur {
    fn coef_names(&self) -> &[String];
    fn coefficients(&self) -> &[f64];
    /// Covariance of the coefficients. If it carries names they must be the coefficient
    /// names in any order, otherwise it is aligned by position.
    fn covariance(&self) -> &LabeledMatrix;
}

/// An owned summary of a fitted SUR model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SurFit {
    names: Vec<String>,
    coefficients: Vec<f64>,
    covariance: LabeledMatrix,
}

impl SurFit {
    pub fn new(
        names: Vec<String>,
        coefficients: Vec<f64>,
        covariance: LabeledMatrix,
    ) -> Result<Self, Error> {
        if names.len() != coefficients.len() {
            return Err(Error::DimensionMismatch {
                what: "coefficient names",
                expected: coefficients.len(),
                found: names.len(),
            });
        }
        Ok(Self {
            names,
            coefficients,
            covariance,
        })
    }

    pub fn coefs(&self) -> Result<Vec<Coef>, Error> {
        coef_table(self)
    }

    pub fn from_json(s: &str) -> Result<Self, Error> {
        let fit: Self = serde_json::from_str(s)?;
        if fit.names.len() != fit.coefficients.len() {
            return Err(Error::DimensionMismatch {
                what: "coefficient names",
                expected: fit.coefficients.len(),
                found: fit.names.len(),
            });
        }
        Ok(fit)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

impl FittedSur for SurFit {
    fn coef_names(&self) -> &[String] {
        &self.names
    }

    fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    fn covariance(&self) -> &LabeledMatrix {
        &self.covariance
    }
}

/// Coefficient names in the usual SUR layout, `<regressor>_<equation>` with equations
/// numbered from 1, equation by equation.
pub fn equation_names<S: AsRef<str>>(regressors: &[Vec<S>]) -> Vec<String> {
    regressors
        .iter()
        .enumerate()
        .flat_map(|(eq, names)| {
            names
                .iter()
                .map(move |name| format!("{}_{}", name.as_ref(), eq + 1))
        })
        .collect()
}
