use crate::dataset::Dataset;
use crate::types::VarId;

/// Symmetric p×p Pearson correlation matrix with a unit diagonal. Computed
/// once per run and immutable afterwards, so workers read it without
/// synchronization.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    dim: usize,
    values: Box<[f64]>,
}

impl CorrelationMatrix {
    /// Pearson correlation of every pair of columns. A zero-variance column
    /// correlates with nothing and yields 0 against every other variable.
    pub fn from_dataset(data: &Dataset) -> Self {
        let dim = data.n_vars();
        let n = data.n_samples();
        let mut means = vec![0.0; dim];
        let mut norms = vec![0.0; dim];
        for v in 0..dim {
            let column = data.column(VarId(v as u32));
            let mean = column.iter().sum::<f64>() / n as f64;
            means[v] = mean;
            norms[v] = column
                .iter()
                .map(|&x| {
                    let d = x - mean;
                    d * d
                })
                .sum::<f64>()
                .sqrt();
        }

        let mut matrix = Self::identity(dim);
        for i in 0..dim {
            let xs = data.column(VarId(i as u32));
            for j in (i + 1)..dim {
                let ys = data.column(VarId(j as u32));
                let dot: f64 = xs
                    .iter()
                    .zip(ys)
                    .map(|(&x, &y)| (x - means[i]) * (y - means[j]))
                    .sum();
                let denom = norms[i] * norms[j];
                let r = if denom > 0.0 { dot / denom } else { 0.0 };
                let r = if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 };
                matrix.set(i, j, r);
            }
        }
        matrix
    }

    /// Builds a matrix from an entry function; `f` is consulted for `i < j`
    /// and mirrored. Intended for callers that already hold correlations.
    pub fn from_fn(dim: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut matrix = Self::identity(dim);
        for i in 0..dim {
            for j in (i + 1)..dim {
                matrix.set(i, j, f(i, j));
            }
        }
        matrix
    }

    fn identity(dim: usize) -> Self {
        let mut values = vec![0.0; dim * dim].into_boxed_slice();
        for i in 0..dim {
            values[i * dim + i] = 1.0;
        }
        Self { dim, values }
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.dim + j] = value;
        self.values[j * self.dim + i] = value;
    }

    #[inline]
    pub fn get(&self, i: VarId, j: VarId) -> f64 {
        self.values[i.index() * self.dim + j.index()]
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfectly_correlated_columns() {
        let data =
            Dataset::from_columns(vec![vec![1.0, 2.0, 3.0, 4.0], vec![2.0, 4.0, 6.0, 8.0]])
                .unwrap();
        let corr = CorrelationMatrix::from_dataset(&data);
        assert!((corr.get(VarId(0), VarId(1)) - 1.0).abs() < 1e-12);
        assert_eq!(corr.get(VarId(0), VarId(0)), 1.0);
    }

    #[test]
    fn anticorrelated_columns() {
        let data =
            Dataset::from_columns(vec![vec![1.0, 2.0, 3.0], vec![3.0, 2.0, 1.0]]).unwrap();
        let corr = CorrelationMatrix::from_dataset(&data);
        assert!((corr.get(VarId(0), VarId(1)) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn orthogonal_columns_have_zero_correlation() {
        let data = Dataset::from_columns(vec![
            vec![1.0, 1.0, -1.0, -1.0],
            vec![1.0, -1.0, 1.0, -1.0],
        ])
        .unwrap();
        let corr = CorrelationMatrix::from_dataset(&data);
        assert!(corr.get(VarId(0), VarId(1)).abs() < 1e-12);
    }

    #[test]
    fn constant_column_yields_zero() {
        let data =
            Dataset::from_columns(vec![vec![2.0, 2.0, 2.0], vec![1.0, 2.0, 3.0]]).unwrap();
        let corr = CorrelationMatrix::from_dataset(&data);
        assert_eq!(corr.get(VarId(0), VarId(1)), 0.0);
    }

    #[test]
    fn from_fn_mirrors_entries() {
        let corr = CorrelationMatrix::from_fn(3, |i, j| (i + j) as f64 / 10.0);
        assert_eq!(corr.get(VarId(1), VarId(2)), 0.3);
        assert_eq!(corr.get(VarId(2), VarId(1)), 0.3);
        assert_eq!(corr.get(VarId(2), VarId(2)), 1.0);
    }
}
