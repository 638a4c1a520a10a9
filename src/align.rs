use std::collections::HashMap;

use faer::Mat;

use crate::{Error, LabeledMatrix};

/// Index permutations that put a covariance matrix and a restriction matrix into the
/// order of the coefficient vector.
///
/// `covariance[i]` is the row/column of the covariance matrix holding coefficient `i`,
/// `restriction[i]` is the column of the restriction matrix multiplying coefficient `i`.
/// Unnamed matrices are aligned by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    covariance: Vec<usize>,
    restriction: Vec<usize>,
}

impl Alignment {
    /// Assumes the dimensions have already been checked against `names.len()`.
    pub fn new(names: &[String], cov: &LabeledMatrix, r: &LabeledMatrix) -> Result<Self, Error> {
        let index = name_index(names)?;
        Ok(Self {
            covariance: covariance_order(&index, cov, names.len())?,
            restriction: order(&index, r.colnames(), names.len(), "restriction matrix")?,
        })
    }

    pub(crate) fn covariance_only(names: &[String], cov: &LabeledMatrix) -> Result<Self, Error> {
        let index = name_index(names)?;
        Ok(Self {
            covariance: covariance_order(&index, cov, names.len())?,
            restriction: (0..names.len()).collect(),
        })
    }

    #[inline]
    pub fn covariance_order(&self) -> &[usize] {
        &self.covariance
    }

    #[inline]
    pub fn restriction_order(&self) -> &[usize] {
        &self.restriction
    }

    /// The covariance matrix with rows and columns in coefficient order.
    pub fn covariance(&self, cov: &LabeledMatrix) -> Mat<f64> {
        let perm = &self.covariance;
        Mat::from_fn(perm.len(), perm.len(), |i, j| cov.get(perm[i], perm[j]))
    }

    /// The restriction matrix with columns in coefficient order.
    pub fn restriction(&self, r: &LabeledMatrix) -> Mat<f64> {
        let perm = &self.restriction;
        Mat::from_fn(r.nrows(), perm.len(), |i, j| r.get(i, perm[j]))
    }
}

fn name_index(names: &[String]) -> Result<HashMap<&str, usize>, Error> {
    let mut index = HashMap::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        if index.insert(name.as_str(), i).is_some() {
            return Err(Error::Alignment(format!(
                "coefficient name {name} appears more than once"
            )));
        }
    }
    Ok(index)
}

fn covariance_order(
    index: &HashMap<&str, usize>,
    cov: &LabeledMatrix,
    n: usize,
) -> Result<Vec<usize>, Error> {
    if let (Some(rows), Some(cols)) = (cov.rownames(), cov.colnames()) {
        if rows != cols {
            return Err(Error::Alignment(
                "covariance row names differ from its column names".to_string(),
            ));
        }
    }
    order(index, cov.colnames().or(cov.rownames()), n, "covariance matrix")
}

fn order(
    index: &HashMap<&str, usize>,
    labels: Option<&[String]>,
    n: usize,
    what: &str,
) -> Result<Vec<usize>, Error> {
    let Some(labels) = labels else {
        return Ok((0..n).collect());
    };
    let mut order = vec![usize::MAX; n];
    for (pos, label) in labels.iter().enumerate() {
        let Some(&i) = index.get(label.as_str()) else {
            return Err(Error::Alignment(format!(
                "{what} label {label} does not match any coefficient"
            )));
        };
        if order[i] != usize::MAX {
            return Err(Error::Alignment(format!(
                "{what} label {label} appears more than once"
            )));
        }
        order[i] = pos;
    }
    Ok(order)
}
