//! Non-fatal conditions surfaced to the user after an operation.

use std::fmt::{Display, Formatter};

/// Something the UI should tell the user without aborting the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceNotice {
    /// A record could not be read; defaults are in use.
    LoadFailed { record: &'static str, message: String },
    /// Some rows of a record could not be repaired and were left out.
    ///
    /// They stay on disk until the next write of that record.
    RowsDropped { record: &'static str, reasons: Vec<String> },
    /// A record could not be written; storage may be stale.
    SaveFailed { record: &'static str, message: String },
    /// The reminder scheduler rejected a request.
    ScheduleFailed { message: String },
}

impl Display for ServiceNotice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadFailed { record, message } => {
                write!(f, "failed to load {record}: {message}")
            }
            Self::RowsDropped { record, reasons } => write!(
                f,
                "dropped {} unreadable row(s) from {record}: {}",
                reasons.len(),
                reasons.join("; ")
            ),
            Self::SaveFailed { record, message } => {
                write!(f, "failed to save {record}: {message}")
            }
            Self::ScheduleFailed { message } => {
                write!(f, "failed to schedule reminder: {message}")
            }
        }
    }
}
