use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::types::{Result, SkeletonError, VarId};

/// Whether CSV records are samples or variables.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum CsvLayout {
    /// One record per sample, one field per variable.
    #[default]
    SampleRows,
    /// One record per variable, one field per sample.
    VariableRows,
}

/// In-memory sample store, one contiguous column per variable.
#[derive(Debug, Clone)]
pub struct Dataset {
    n_samples: usize,
    columns: Vec<Box<[f64]>>,
}

impl Dataset {
    /// Builds a dataset from per-variable columns. Every column must hold the
    /// same number of samples.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self> {
        let n_samples = columns.first().map(Vec::len).unwrap_or(0);
        for (record, column) in columns.iter().enumerate() {
            if column.len() != n_samples {
                return Err(SkeletonError::RaggedData {
                    record,
                    expected: n_samples,
                    actual: column.len(),
                });
            }
        }
        Ok(Self {
            n_samples,
            columns: columns.into_iter().map(Vec::into_boxed_slice).collect(),
        })
    }

    /// Builds a dataset from per-sample rows, transposing into columns.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_vars = rows.first().map(Vec::len).unwrap_or(0);
        for (record, row) in rows.iter().enumerate() {
            if row.len() != n_vars {
                return Err(SkeletonError::RaggedData {
                    record,
                    expected: n_vars,
                    actual: row.len(),
                });
            }
        }
        let n_samples = rows.len();
        let mut columns = vec![Vec::with_capacity(n_samples); n_vars];
        for row in &rows {
            for (column, &value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }
        Ok(Self {
            n_samples,
            columns: columns.into_iter().map(Vec::into_boxed_slice).collect(),
        })
    }

    pub fn from_csv_path(
        path: impl AsRef<Path>,
        layout: CsvLayout,
        has_headers: bool,
    ) -> Result<Self> {
        Self::from_csv_reader(File::open(path)?, layout, has_headers)
    }

    /// Reads numeric CSV records. Rectangularity is enforced after parsing so
    /// a short record surfaces as [`SkeletonError::RaggedData`] rather than a
    /// csv-level error.
    pub fn from_csv_reader<R: io::Read>(
        reader: R,
        layout: CsvLayout,
        has_headers: bool,
    ) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(has_headers)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();
        for (record, result) in csv_reader.records().enumerate() {
            let raw = result?;
            let mut values = Vec::with_capacity(raw.len());
            for (field, value) in raw.iter().enumerate() {
                let parsed: f64 =
                    value
                        .parse()
                        .map_err(|_| SkeletonError::InvalidNumber {
                            record,
                            field,
                            value: value.to_string(),
                        })?;
                values.push(parsed);
            }
            records.push(values);
        }
        match layout {
            CsvLayout::SampleRows => Self::from_rows(records),
            CsvLayout::VariableRows => Self::from_columns(records),
        }
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_vars(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, v: VarId) -> &[f64] {
        &self.columns[v.index()]
    }
}
