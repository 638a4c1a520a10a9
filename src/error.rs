#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("{what} dimensions do not match: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("alignment error: {0}")]
    Alignment(String),
    #[error(
        "projected covariance R * cov * R' is singular (smallest |eigenvalue| {min:e}, largest \
         {max:e}); restrictions may be redundant"
    )]
    SingularCovariance { min: f64, max: f64 },
    #[error("wald statistic {0} is negative or not finite")]
    NumericInstability(f64),
    #[error("{0} contains non-finite values")]
    NonFinite(&'static str),
    #[error("variance of coefficient {label} is {variance}, expected a positive finite value")]
    NonPositiveVariance { label: String, variance: f64 },
    #[error("eigen error")]
    Eigen(faer::linalg::evd::EvdError),
    #[error("distribution error: {0}")]
    Distribution(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<faer::linalg::evd::EvdError> for Error {
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn from(err: faer::linalg::evd::EvdError) -> Self {
        Error::Eigen(err)
    }
}
