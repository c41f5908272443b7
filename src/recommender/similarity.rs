use super::RecommendError;

/// Term-count vector over a fixed number of vocabulary columns.
///
/// Only non-zero counts are stored, as `(column, count)` pairs sorted by
/// column. Every column is `< dim`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, u32)>,
}

impl SparseVector {
    /// All-zero vector of the given dimension
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    /// Builds a vector from already sorted, de-duplicated, non-zero entries
    pub(crate) fn from_sorted(dim: usize, entries: Vec<(usize, u32)>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        debug_assert!(entries.iter().all(|&(col, count)| col < dim && count > 0));
        Self { dim, entries }
    }

    pub fn from_dense(values: &[u32]) -> Self {
        let entries = values
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(col, &count)| (col, count))
            .collect();
        Self {
            dim: values.len(),
            entries,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn entries(&self) -> &[(usize, u32)] {
        &self.entries
    }

    /// Count at `column`, zero when absent or out of range
    pub fn get(&self, column: usize) -> u32 {
        self.entries
            .binary_search_by_key(&column, |&(col, _)| col)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0)
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_dense(&self) -> Vec<u32> {
        let mut dense = vec![0; self.dim];
        for &(col, count) in &self.entries {
            dense[col] = count;
        }
        dense
    }

    fn norm_squared(&self) -> u64 {
        self.entries
            .iter()
            .map(|&(_, count)| u64::from(count) * u64::from(count))
            .sum()
    }

    fn dot(&self, other: &SparseVector) -> u64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0u64;
        while i < self.entries.len() && j < other.entries.len() {
            let (col_a, count_a) = self.entries[i];
            let (col_b, count_b) = other.entries[j];
            match col_a.cmp(&col_b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += u64::from(count_a) * u64::from(count_b);
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Movie × vocabulary count matrix with cached row norms
#[derive(Debug, Clone, PartialEq)]
pub struct CountMatrix {
    cols: usize,
    rows: Vec<SparseVector>,
    norms_squared: Vec<u64>,
}

impl CountMatrix {
    /// Fails with `DimensionMismatch` if any row has a different dimension than `cols`
    pub fn new(cols: usize, rows: Vec<SparseVector>) -> Result<Self, RecommendError> {
        if let Some(row) = rows.iter().find(|row| row.dim != cols) {
            return Err(RecommendError::DimensionMismatch {
                expected: cols,
                actual: row.dim,
            });
        }
        let norms_squared = rows.iter().map(SparseVector::norm_squared).collect();
        Ok(Self {
            cols,
            rows,
            norms_squared,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&SparseVector> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    /// Cosine similarity of `query` against every row, in row order
    pub fn scores(&self, query: &SparseVector) -> Result<Vec<f64>, RecommendError> {
        self.check_dimension(query)?;
        let query_norm = query.norm_squared();
        Ok(self
            .rows
            .iter()
            .zip(&self.norms_squared)
            .map(|(row, &row_norm)| cosine(query.dot(row), query_norm, row_norm))
            .collect())
    }

    fn check_dimension(&self, query: &SparseVector) -> Result<(), RecommendError> {
        if query.dim != self.cols {
            return Err(RecommendError::DimensionMismatch {
                expected: self.cols,
                actual: query.dim,
            });
        }
        Ok(())
    }
}

/// `dot(a, b) / (||a|| * ||b||)`, or 0 when either vector is all zeros.
///
/// Fails with `DimensionMismatch` when the vectors have different dimensions.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> Result<f64, RecommendError> {
    if a.dim != b.dim {
        return Err(RecommendError::DimensionMismatch {
            expected: a.dim,
            actual: b.dim,
        });
    }
    Ok(cosine(a.dot(b), a.norm_squared(), b.norm_squared()))
}

fn cosine(dot: u64, norm_squared_a: u64, norm_squared_b: u64) -> f64 {
    if norm_squared_a == 0 || norm_squared_b == 0 {
        return 0.0;
    }
    // Single sqrt keeps sim(a, a) at exactly 1.0
    let denominator = (norm_squared_a as f64 * norm_squared_b as f64).sqrt();
    (dot as f64 / denominator).min(1.0)
}

/// Row indices and scores of the `n` rows most similar to `query`.
///
/// Ordered by descending score; equal scores keep row order.
pub fn top_n(
    query: &SparseVector,
    matrix: &CountMatrix,
    n: usize,
) -> Result<Vec<(usize, f64)>, RecommendError> {
    let scores = matrix.scores(query)?;
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut ranked: Vec<(usize, f64)> = scores.into_iter().enumerate().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    Ok(ranked)
}
