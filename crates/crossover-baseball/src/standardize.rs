// Column standardization (z-scores) fit once over a full dataset.

// ---------------------------------------------------------------------------
// Column statistics
// ---------------------------------------------------------------------------

/// Threshold below which a standard deviation is treated as zero.
const STDEV_EPSILON: f64 = 1e-9;

/// Mean and population standard deviation of a single column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub mean: f64,
    pub stdev: f64,
}

impl ColumnStats {
    /// Divisor used for z-scoring. A constant column keeps scale 1 so its
    /// z-values are all 0 instead of NaN.
    pub fn scale(&self) -> f64 {
        if self.stdev < STDEV_EPSILON {
            1.0
        } else {
            self.stdev
        }
    }

    pub fn zscore(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale()
    }

    /// Map a z-value back onto the column's original scale.
    pub fn invert(&self, z: f64) -> f64 {
        z * self.scale() + self.mean
    }
}

/// Compute mean and standard deviation for a slice of values.
///
/// Uses the population standard deviation (N denominator): the scalers are
/// fit over the whole dataset, not a sample of it. Returns zeros for an empty
/// slice.
pub fn column_stats(values: &[f64]) -> ColumnStats {
    if values.is_empty() {
        return ColumnStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    ColumnStats {
        mean,
        stdev: variance.sqrt(),
    }
}

// ---------------------------------------------------------------------------
// Multi-column scaler
// ---------------------------------------------------------------------------

/// Joint scaler over `N` columns. Each column gets its own mean/std; "joint"
/// means all columns are fit from the same set of rows at once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardScaler<const N: usize> {
    columns: [ColumnStats; N],
}

impl<const N: usize> StandardScaler<N> {
    pub fn fit(rows: &[[f64; N]]) -> Self {
        let columns = std::array::from_fn(|col| {
            let values: Vec<f64> = rows.iter().map(|row| row[col]).collect();
            column_stats(&values)
        });
        StandardScaler { columns }
    }

    /// Scaler built from known per-column statistics.
    pub fn from_stats(columns: [ColumnStats; N]) -> Self {
        StandardScaler { columns }
    }

    pub fn column(&self, index: usize) -> ColumnStats {
        self.columns[index]
    }

    pub fn transform_row(&self, row: &[f64; N]) -> [f64; N] {
        std::array::from_fn(|col| self.columns[col].zscore(row[col]))
    }

    pub fn transform(&self, rows: &[[f64; N]]) -> Vec<[f64; N]> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }

    pub fn fit_transform(rows: &[[f64; N]]) -> (Self, Vec<[f64; N]>) {
        let scaler = Self::fit(rows);
        let z = scaler.transform(rows);
        (scaler, z)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
