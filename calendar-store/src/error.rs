use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("calendar `{0}` not found")]
    CalendarNotFound(String),

    #[error("entry `{entry}` not found in calendar `{calendar}`")]
    EntryNotFound { calendar: String, entry: String },

    /// Malformed or missing attributes in a request body.
    #[error("{0}")]
    Validation(String),
}

impl Error {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::CalendarNotFound(_) | Error::EntryNotFound { .. })
    }
}
