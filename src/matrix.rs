use faer::{Mat, MatRef};

use crate::Error;

/// A dense column-major matrix with optional row and column names.
///
/// Covariance matrices use the names to say which coefficient each row and column belongs
/// to, restriction matrices use the column names to say which coefficient each column
/// multiplies. A matrix without names is aligned by position.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct LabeledMatrix {
    pub(crate) nrows: usize,
    pub(crate) ncols: usize,
    pub(crate) rownames: Option<Vec<String>>,
    pub(crate) colnames: Option<Vec<String>>,
    pub(crate) data: Vec<f64>,
}

#[derive(serde::Deserialize)]
struct RawMatrix {
    nrows: usize,
    ncols: usize,
    rownames: Option<Vec<String>>,
    colnames: Option<Vec<String>>,
    data: Vec<f64>,
}

impl TryFrom<RawMatrix> for LabeledMatrix {
    type Error = Error;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        let m = LabeledMatrix::new(raw.nrows, raw.ncols, raw.data)?;
        let m = match raw.rownames {
            Some(rownames) => m.with_rownames(rownames)?,
            None => m,
        };
        match raw.colnames {
            Some(colnames) => m.with_colnames(colnames),
            None => Ok(m),
        }
    }
}

impl PartialEq for LabeledMatrix {
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn eq(&self, other: &Self) -> bool {
        self.nrows == other.nrows
            && self.ncols == other.ncols
            && self.rownames == other.rownames
            && self.colnames == other.colnames
            && self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl LabeledMatrix {
    /// Build a matrix from column-major data.
    pub fn new(nrows: usize, ncols: usize, data: Vec<f64>) -> Result<Self, Error> {
        let Some(len) = nrows.checked_mul(ncols) else {
            return Err(Error::DimensionMismatch {
                what: "matrix rows times columns",
                expected: data.len(),
                found: usize::MAX,
            });
        };
        if len != data.len() {
            return Err(Error::DimensionMismatch {
                what: "matrix data length",
                expected: len,
                found: data.len(),
            });
        }
        Ok(Self {
            nrows,
            ncols,
            rownames: None,
            colnames: None,
            data,
        })
    }

    /// Build a matrix from rows of equal length.
    pub fn from_rows(rows: &[&[f64]]) -> Result<Self, Error> {
        let nrows = rows.len();
        let ncols = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(row) = rows.iter().find(|r| r.len() != ncols) {
            return Err(Error::DimensionMismatch {
                what: "row length",
                expected: ncols,
                found: row.len(),
            });
        }
        let mut data = Vec::with_capacity(nrows * ncols);
        for j in 0..ncols {
            data.extend(rows.iter().map(|r| r[j]));
        }
        Self::new(nrows, ncols, data)
    }

    pub fn from_mat_ref(m: MatRef<'_, f64>) -> Self {
        let mut data = Vec::with_capacity(m.nrows() * m.ncols());
        for j in 0..m.ncols() {
            data.extend((0..m.nrows()).map(|i| m[(i, j)]));
        }
        Self {
            nrows: m.nrows(),
            ncols: m.ncols(),
            rownames: None,
            colnames: None,
            data,
        }
    }

    pub fn identity(n: usize) -> Self {
        Self::from_mat_ref(Mat::<f64>::identity(n, n).as_ref())
    }

    pub fn with_colnames(mut self, colnames: Vec<String>) -> Result<Self, Error> {
        if colnames.len() != self.ncols {
            return Err(Error::DimensionMismatch {
                what: "column names",
                expected: self.ncols,
                found: colnames.len(),
            });
        }
        self.colnames = Some(colnames);
        Ok(self)
    }

    pub fn with_rownames(mut self, rownames: Vec<String>) -> Result<Self, Error> {
        if rownames.len() != self.nrows {
            return Err(Error::DimensionMismatch {
                what: "row names",
                expected: self.nrows,
                found: rownames.len(),
            });
        }
        self.rownames = Some(rownames);
        Ok(self)
    }

    /// Set both row and column names, for a square matrix indexed by the same labels on
    /// both axes such as a coefficient covariance matrix.
    pub fn with_dimnames(self, names: Vec<String>) -> Result<Self, Error> {
        self.with_rownames(names.clone())?.with_colnames(names)
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn rownames(&self) -> Option<&[String]> {
        self.rownames.as_deref()
    }

    #[inline]
    pub fn colnames(&self) -> Option<&[String]> {
        self.colnames.as_deref()
    }

    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[j * self.nrows + i]
    }

    pub fn row(&self, i: usize) -> Vec<f64> {
        (0..self.ncols).map(|j| self.get(i, j)).collect()
    }

    pub fn as_mat_ref(&self) -> MatRef<'_, f64> {
        MatRef::from_column_major_slice(self.data.as_slice(), self.nrows, self.ncols)
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Multiply every element by `c`, keeping the names.
    pub fn scale(&self, c: f64) -> Self {
        let mut m = self.clone();
        m.data.iter_mut().for_each(|x| *x *= c);
        m
    }

    /// Reorder the rows so that row `i` of the result is row `order[i]` of `self`.
    pub fn permute_rows(&self, order: &[usize]) -> Result<Self, Error> {
        if order.len() != self.nrows {
            return Err(Error::DimensionMismatch {
                what: "row order",
                expected: self.nrows,
                found: order.len(),
            });
        }
        if let Some(&i) = order.iter().find(|&&i| i >= self.nrows) {
            return Err(Error::DimensionMismatch {
                what: "row index",
                expected: self.nrows,
                found: i,
            });
        }
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.ncols {
            data.extend(order.iter().map(|&i| self.get(i, j)));
        }
        Ok(Self {
            nrows: self.nrows,
            ncols: self.ncols,
            rownames: self
                .rownames
                .as_ref()
                .map(|r| order.iter().map(|&i| r[i].clone()).collect()),
            colnames: self.colnames.clone(),
            data,
        })
    }
}
