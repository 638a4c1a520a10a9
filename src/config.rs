pub const DEFAULT_SINGULAR_TOL: f64 = 1e-10;

/// Options for a single Wald test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaldOptions {
    /// The projected covariance `R * cov * R'` is treated as singular when its smallest
    /// absolute eigenvalue is at most `singular_tol` times its largest.
    pub singular_tol: f64,
    /// Emit the one-line summary through `tracing` at info level.
    pub report: bool,
}

impl WaldOptions {
    pub fn singular_tol(mut self, tol: f64) -> Self {
        self.singular_tol = tol;
        self
    }

    pub fn report(mut self, report: bool) -> Self {
        self.report = report;
        self
    }
}

impl Default for WaldOptions {
    /// Reads `SURWALD_SINGULAR_TOL` and `SURWALD_REPORT` from the environment.
    fn default() -> Self {
        let singular_tol = std::env::var("SURWALD_SINGULAR_TOL")
            .ok()
            .and_then(|x| x.parse::<f64>().ok())
            .filter(|x| x.is_finite() && *x >= 0.0)
            .unwrap_or(DEFAULT_SINGULAR_TOL);
        let report = std::env::var("SURWALD_REPORT")
            .map(|x| !matches!(x.trim(), "0" | "false" | "FALSE" | "False"))
            .unwrap_or(true);
        Self {
            singular_tol,
            report,
        }
    }
}
