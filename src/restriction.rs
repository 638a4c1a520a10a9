use crate::{Error, LabeledMatrix};

/// A set of linear hypotheses `R * beta = b` on the coefficients of a fitted model.
///
/// Each row of `R` is one hypothesis. If `R` carries column names they are matched against
/// the coefficient names, otherwise the columns must already be in coefficient order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawRestriction")]
pub struct Restriction {
    r: LabeledMatrix,
    b: Vec<f64>,
}

#[derive(serde::Deserialize)]
struct RawRestriction {
    r: LabeledMatrix,
    b: Vec<f64>,
}

impl TryFrom<RawRestriction> for Restriction {
    type Error = Error;

    fn try_from(raw: RawRestriction) -> Result<Self, Self::Error> {
        Restriction::new(raw.r, raw.b)
    }
}

impl Restriction {
    pub fn new(r: LabeledMatrix, b: Vec<f64>) -> Result<Self, Error> {
        if b.len() != r.nrows() {
            return Err(Error::DimensionMismatch {
                what: "restriction values",
                expected: r.nrows(),
                found: b.len(),
            });
        }
        Ok(Self { r, b })
    }

    /// Positional restriction, one slice per hypothesis.
    pub fn from_rows(rows: &[&[f64]], b: Vec<f64>) -> Result<Self, Error> {
        Self::new(LabeledMatrix::from_rows(rows)?, b)
    }

    /// Restriction whose columns are matched to coefficients by `colnames`.
    pub fn named<S: ToString>(colnames: &[S], rows: &[&[f64]], b: Vec<f64>) -> Result<Self, Error> {
        let r = LabeledMatrix::from_rows(rows)?
            .with_colnames(colnames.iter().map(|x| x.to_string()).collect())?;
        Self::new(r, b)
    }

    /// `beta[a] - beta[b] = 0`, e.g. the same regressor having equal slopes in two
    /// equations.
    pub fn equality(names: &[String], a: &str, b: &str) -> Result<Self, Error> {
        let i = position(names, a)?;
        let j = position(names, b)?;
        if i == j {
            return Err(Error::Alignment(format!(
                "cannot test {a} for equality with itself"
            )));
        }
        let mut row = vec![0.0; names.len()];
        row[i] = 1.0;
        row[j] = -1.0;
        Self::named(names, &[row.as_slice()], vec![0.0])
    }

    /// `beta[name] = value`.
    pub fn value(names: &[String], name: &str, value: f64) -> Result<Self, Error> {
        let i = position(names, name)?;
        let mut row = vec![0.0; names.len()];
        row[i] = 1.0;
        Self::named(names, &[row.as_slice()], vec![value])
    }

    /// All hypotheses of `restrictions` tested jointly.
    pub fn stack(restrictions: &[Restriction]) -> Result<Self, Error> {
        let Some(first) = restrictions.first() else {
            return Err(Error::DimensionMismatch {
                what: "restriction rows",
                expected: 1,
                found: 0,
            });
        };
        let ncols = first.r.ncols();
        let colnames = first.r.colnames();
        let mut rows = Vec::new();
        let mut b = Vec::new();
        for restriction in restrictions {
            if restriction.r.ncols() != ncols {
                return Err(Error::DimensionMismatch {
                    what: "restriction matrix columns",
                    expected: ncols,
                    found: restriction.r.ncols(),
                });
            }
            if restriction.r.colnames() != colnames {
                return Err(Error::Alignment(
                    "stacked restrictions must share the same column names".to_string(),
                ));
            }
            rows.extend((0..restriction.r.nrows()).map(|i| restriction.r.row(i)));
            b.extend_from_slice(&restriction.b);
        }
        let rows = rows.iter().map(|r| r.as_slice()).collect::<Vec<_>>();
        let mut r = LabeledMatrix::from_rows(&rows)?;
        if let Some(colnames) = colnames {
            r = r.with_colnames(colnames.to_vec())?;
        }
        Self::new(r, b)
    }

    /// `(c * R, c * b)`, the same hypotheses expressed on another scale.
    pub fn scale(&self, c: f64) -> Self {
        Self {
            r: self.r.scale(c),
            b: self.b.iter().map(|x| x * c).collect(),
        }
    }

    /// Reorder the hypotheses so that row `i` of the result is row `order[i]` of `self`.
    pub fn permute_rows(&self, order: &[usize]) -> Result<Self, Error> {
        Ok(Self {
            r: self.r.permute_rows(order)?,
            b: order.iter().map(|&i| self.b[i]).collect(),
        })
    }

    #[inline]
    pub fn r(&self) -> &LabeledMatrix {
        &self.r
    }

    #[inline]
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.r.nrows()
    }
}

fn position(names: &[String], name: &str) -> Result<usize, Error> {
    names
        .iter()
        .position(|x| x == name)
        .ok_or_else(|| Error::Alignment(format!("coefficient {name} not found")))
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn names() -> Vec<String> {
        ["a_1", "b_1", "a_2", "b_2"]
            .iter()
            .map(|x| x.to_string())
            .collect()
    }

    #[test]
    fn test_b_length_mismatch() {
        let err = Restriction::from_rows(&[&[1.0, 0.0]], vec![0.0, 1.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_equality() {
        let r = Restriction::equality(&names(), "b_1", "b_2").unwrap();
        assert_eq!(r.nrows(), 1);
        assert_eq!(r.r().row(0), vec![0.0, 1.0, 0.0, -1.0]);
        assert_eq!(r.b(), &[0.0]);
        assert_eq!(r.r().colnames().unwrap(), names().as_slice());
    }

    #[test]
    fn test_equality_unknown_and_self() {
        assert!(matches!(
            Restriction::equality(&names(), "b_1", "c_2").unwrap_err(),
            Error::Alignment(_)
        ));
        assert!(matches!(
            Restriction::equality(&names(), "b_1", "b_1").unwrap_err(),
            Error::Alignment(_)
        ));
    }

    #[test]
    fn test_value() {
        let r = Restriction::value(&names(), "a_2", 1.5).unwrap();
        assert_eq!(r.r().row(0), vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(r.b(), &[1.5]);
    }

    #[test]
    fn test_stack() {
        let r = Restriction::stack(&[
            Restriction::equality(&names(), "a_1", "a_2").unwrap(),
            Restriction::equality(&names(), "b_1", "b_2").unwrap(),
        ])
        .unwrap();
        assert_eq!(r.nrows(), 2);
        assert_eq!(r.r().row(0), vec![1.0, 0.0, -1.0, 0.0]);
        assert_eq!(r.r().row(1), vec![0.0, 1.0, 0.0, -1.0]);
        assert_eq!(r.b(), &[0.0, 0.0]);
    }

    #[test]
    fn test_stack_mismatched_names() {
        let named = Restriction::equality(&names(), "a_1", "a_2").unwrap();
        let positional = Restriction::from_rows(&[&[1.0, 0.0, -1.0, 0.0]], vec![0.0]).unwrap();
        assert!(matches!(
            Restriction::stack(&[named, positional]).unwrap_err(),
            Error::Alignment(_)
        ));
        assert!(Restriction::stack(&[]).is_err());
    }

    #[test]
    fn test_scale_and_permute() {
        let r = Restriction::from_rows(&[&[1.0, 0.0], &[0.0, 2.0]], vec![3.0, 4.0]).unwrap();
        let s = r.scale(-2.0);
        assert_eq!(s.r().row(1), vec![-0.0, -4.0]);
        assert_eq!(s.b(), &[-6.0, -8.0]);
        let p = r.permute_rows(&[1, 0]).unwrap();
        assert_eq!(p.r().row(0), vec![0.0, 2.0]);
        assert_eq!(p.b(), &[4.0, 3.0]);
    }
}
