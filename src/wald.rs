use faer::{linalg::solvers::Solve, Col, ColRef, Mat, Side};
use rayon::prelude::*;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use tracing::{debug, info, warn};

use crate::{align::Alignment, Error, FittedSur, LabeledMatrix, Restriction, WaldOptions};

/// Outcome of a Wald test of `R * beta = b`.
///
/// `restriction` is `R` with its columns in coefficient order and named after the
/// coefficients, whatever order the caller supplied them in.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WaldResult {
    statistic: f64,
    p_value: f64,
    degrees_of_freedom: usize,
    discrepancy: Vec<f64>,
    restriction: LabeledMatrix,
    values: Vec<f64>,
}

impl WaldResult {
    #[inline]
    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    /// Upper tail probability of the statistic under a chi-squared distribution with
    /// [`Self::degrees_of_freedom`] degrees of freedom.
    #[inline]
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    #[inline]
    pub fn degrees_of_freedom(&self) -> usize {
        self.degrees_of_freedom
    }

    /// `R * beta - b`.
    #[inline]
    pub fn discrepancy(&self) -> &[f64] {
        &self.discrepancy
    }

    #[inline]
    pub fn restriction(&self) -> &LabeledMatrix {
        &self.restriction
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

impl std::fmt::Display for WaldResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Wald stat.: {:.3} (p-value: {:.3})",
            self.statistic, self.p_value
        )
    }
}

/// Wald test of `restriction` on a fitted model, with options from the environment.
pub fn wald_test(model: &impl FittedSur, restriction: &Restriction) -> Result<WaldResult, Error> {
    wald_test_with(model, restriction, &WaldOptions::default())
}

pub fn wald_test_with(
    model: &impl FittedSur,
    restriction: &Restriction,
    opts: &WaldOptions,
) -> Result<WaldResult, Error> {
    wald_betas(
        model.coef_names(),
        model.coefficients(),
        model.covariance(),
        restriction.r(),
        restriction.b(),
        opts,
    )
}

/// Test every restriction against the same model in parallel, with options from the
/// environment. The results are in the same order as `restrictions`.
pub fn wald_tests(
    model: &(impl FittedSur + Sync),
    restrictions: &[Restriction],
) -> Vec<Result<WaldResult, Error>> {
    wald_tests_with(model, restrictions, &WaldOptions::default())
}

#[tracing::instrument(skip(model, restrictions))]
pub fn wald_tests_with(
    model: &(impl FittedSur + Sync),
    restrictions: &[Restriction],
    opts: &WaldOptions,
) -> Vec<Result<WaldResult, Error>> {
    restrictions
        .par_iter()
        .enumerate()
        .map(|(i, restriction)| {
            let res = wald_test_with(model, restriction, opts);
            if let Err(e) = &res {
                warn!("Wald test {} failed: {}", i, e);
            }
            res
        })
        .collect()
}

/// Wald test of `r * betas = b` where `cov` is the covariance of `betas`.
///
/// `cov` and the columns of `r` are matched to `betas` through `names` when they carry
/// names, and by position otherwise.
#[tracing::instrument(skip(names, betas, cov, r, b))]
pub fn wald_betas(
    names: &[String],
    betas: &[f64],
    cov: &LabeledMatrix,
    r: &LabeledMatrix,
    b: &[f64],
    opts: &WaldOptions,
) -> Result<WaldResult, Error> {
    let p = betas.len();
    if names.len() != p {
        return Err(Error::DimensionMismatch {
            what: "coefficient names",
            expected: p,
            found: names.len(),
        });
    }
    if r.nrows() == 0 {
        return Err(Error::DimensionMismatch {
            what: "restriction rows",
            expected: 1,
            found: 0,
        });
    }
    if r.ncols() != p {
        return Err(Error::DimensionMismatch {
            what: "restriction matrix columns",
            expected: p,
            found: r.ncols(),
        });
    }
    if b.len() != r.nrows() {
        return Err(Error::DimensionMismatch {
            what: "restriction values",
            expected: r.nrows(),
            found: b.len(),
        });
    }
    if cov.nrows() != p || cov.ncols() != p {
        return Err(Error::DimensionMismatch {
            what: "covariance matrix",
            expected: p,
            found: if cov.nrows() != p {
                cov.nrows()
            } else {
                cov.ncols()
            },
        });
    }
    if !betas.iter().all(|x| x.is_finite()) {
        return Err(Error::NonFinite("coefficient vector"));
    }
    if !cov.is_finite() {
        return Err(Error::NonFinite("covariance matrix"));
    }
    if !r.is_finite() {
        return Err(Error::NonFinite("restriction matrix"));
    }
    if !b.iter().all(|x| x.is_finite()) {
        return Err(Error::NonFinite("restriction values"));
    }

    let alignment = Alignment::new(names, cov, r)?;
    let cov = alignment.covariance(cov);
    let rm = alignment.restriction(r);
    let q = rm.nrows();
    debug!("Aligned {} coefficients and {} restrictions", p, q);

    let rb = &rm * ColRef::from_slice(betas);
    let holg = Col::from_fn(q, |i| rb[i] - b[i]);

    let m = &rm * &cov * rm.transpose();
    // symmetric up to rounding, make it exact before the eigen decomposition
    let m = Mat::from_fn(q, q, |i, j| 0.5 * (m[(i, j)] + m[(j, i)]));

    let eigen = m.as_ref().self_adjoint_eigen(Side::Lower)?;
    let s = eigen.S();
    let mut min = f64::INFINITY;
    let mut max = 0.0_f64;
    for i in 0..q {
        let e = s[i].abs();
        min = min.min(e);
        max = max.max(e);
    }
    debug!("Projected covariance eigenvalues in [{:e}, {:e}]", min, max);
    if max <= 0.0 || min <= opts.singular_tol * max {
        return Err(Error::SingularCovariance { min, max });
    }

    let x = m.as_ref().partial_piv_lu().solve(&holg);
    let statistic = (0..q).map(|i| holg[i] * x[i]).sum::<f64>();
    if !statistic.is_finite() || statistic < 0.0 {
        return Err(Error::NumericInstability(statistic));
    }

    let p_value = ChiSquared::new(q as f64)
        .map_err(|e| Error::Distribution(e.to_string()))?
        .sf(statistic);

    let mut restriction = LabeledMatrix::from_mat_ref(rm.as_ref()).with_colnames(names.to_vec())?;
    if let Some(rownames) = r.rownames() {
        restriction = restriction.with_rownames(rownames.to_vec())?;
    }
    let result = WaldResult {
        statistic,
        p_value,
        degrees_of_freedom: q,
        discrepancy: (0..q).map(|i| holg[i]).collect(),
        restriction,
        values: b.to_vec(),
    };
    if opts.report {
        info!("{}", result);
    }
    Ok(result)
}
