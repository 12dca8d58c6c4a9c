use std::path::PathBuf;

/// Errors raised by the aggregation pipeline.
///
/// Missing cells and unknown locations are not errors: the former travel as
/// `None` through every transform, the latter are reported as omissions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column: `{column}`")]
    MissingColumn { column: String },

    #[error("unparseable `date` column: {bad} of {total} rows have invalid dates (tolerance {tolerance:.2}%)")]
    Parse {
        bad: usize,
        total: usize,
        tolerance: f64,
    },

    #[error("unknown column: `{column}`")]
    UnknownColumn { column: String },
}

impl PipelineError {
    pub fn unknown_column(column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
        }
    }

    /// Exit code used by the `owid` binary for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Io { .. } | PipelineError::MissingColumn { .. } | PipelineError::UnknownColumn { .. } => 2,
            PipelineError::Csv(_) | PipelineError::Parse { .. } => 3,
        }
    }
}

/// Error surfaced at the binary boundary: a message plus the process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
