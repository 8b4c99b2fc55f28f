use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// The requested sheet name is not a key of `sheets`.
    #[error("sheet not found: {name}")]
    NotFound { name: String },

    /// The report (or one sheet of it) does not match the expected shape.
    #[error("malformed report{}: {reason}", location(.sheet, .field))]
    Malformed {
        sheet: Option<String>,
        field: Option<String>,
        reason: String,
    },

    #[error("reading report {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        ReportError::Malformed {
            sheet: None,
            field: None,
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ReportError::NotFound { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ReportError::Malformed { .. })
    }
}

fn location(sheet: &Option<String>, field: &Option<String>) -> String {
    match (sheet, field) {
        (Some(s), Some(f)) => format!(" (sheet {s:?}, field {f:?})"),
        (Some(s), None) => format!(" (sheet {s:?})"),
        (None, Some(f)) => format!(" (field {f:?})"),
        (None, None) => String::new(),
    }
}
