use std::io;
use std::path::PathBuf;

use super::parser::ParseError;

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// File missing or could not be opened.
    NotAvailable { path: PathBuf, source: io::Error },
    /// File content does not match the expected field layout.
    MalformedRecord(String),
    /// Process disappeared during collection.
    ProcessGone(u32),
}

impl CollectError {
    pub(crate) fn not_available(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CollectError::NotAvailable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        CollectError::MalformedRecord(msg.into())
    }

    /// A per-process file that cannot be opened means the process exited.
    pub(crate) fn gone_if_unavailable(self, pid: u32) -> Self {
        match self {
            CollectError::NotAvailable { .. } => CollectError::ProcessGone(pid),
            other => other,
        }
    }
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::NotAvailable { path, source } => {
                write!(f, "{} not available: {}", path.display(), source)
            }
            CollectError::MalformedRecord(msg) => write!(f, "malformed record: {}", msg),
            CollectError::ProcessGone(pid) => write!(f, "process {} disappeared", pid),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::NotAvailable { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ParseError> for CollectError {
    fn from(e: ParseError) -> Self {
        CollectError::MalformedRecord(e.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gone_if_unavailable() {
        let err = CollectError::not_available("/proc/42/stat", io::ErrorKind::NotFound.into());
        assert!(matches!(err.gone_if_unavailable(42), CollectError::ProcessGone(42)));

        let err = CollectError::malformed("short line");
        assert!(matches!(
            err.gone_if_unavailable(42),
            CollectError::MalformedRecord(_)
        ));
    }

    #[test]
    fn test_display() {
        let err = CollectError::not_available("/proc/meminfo", io::ErrorKind::NotFound.into());
        assert!(err.to_string().starts_with("/proc/meminfo not available"));
        assert_eq!(
            CollectError::ProcessGone(7).to_string(),
            "process 7 disappeared"
        );
        let err: CollectError = ParseError::new("missing field 2").into();
        assert_eq!(err.to_string(), "malformed record: missing field 2");
    }
}
