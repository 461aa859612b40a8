use std::fmt;

/// Index of a variable (a column of the input data) in `[0, p)`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct VarId(pub u32);

impl VarId {
    /// Position of this variable in dense per-variable arrays.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for VarId {
    fn from(value: u32) -> Self {
        VarId(value)
    }
}

impl From<VarId> for u32 {
    fn from(value: VarId) -> Self {
        value.0
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SkeletonError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("significance level must lie in (0, 1), got {0}")]
    InvalidAlpha(f64),
    #[error("at least 4 samples required, got {0}")]
    TooFewSamples(usize),
    #[error("at least 2 variables required, got {0}")]
    TooFewVariables(usize),
    #[error("ragged data: record {record} has {actual} values, expected {expected}")]
    RaggedData {
        record: usize,
        expected: usize,
        actual: usize,
    },
    #[error("record {record}, field {field}: not a number: {value:?}")]
    InvalidNumber {
        record: usize,
        field: usize,
        value: String,
    },
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
}

pub type Result<T> = std::result::Result<T, SkeletonError>;
