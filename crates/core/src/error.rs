use thiserror::Error;

/// Top-level error type used across the entire dashboard.
#[derive(Debug, Error)]
pub enum DashError {
    #[error("config error: {0}")]
    Config(String),

    /// The source can never produce data on this machine (no device, missing tool).
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// A single query failed; the next one may succeed.
    #[error("query failed: {0}")]
    Query(String),

    #[error("graph error: {0}")]
    Graph(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl DashError {
    /// `true` when retrying later is pointless.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

pub type Result<T, E = DashError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unavailable_is_persistent() {
        assert!(DashError::Unavailable("no gpu".into()).is_persistent());
        assert!(!DashError::Query("timeout".into()).is_persistent());
        let io: DashError = std::io::Error::other("boom").into();
        assert!(!io.is_persistent());
    }

    #[test]
    fn display_includes_context() {
        let e = DashError::Unavailable("playerctl not found".into());
        assert_eq!(e.to_string(), "source unavailable: playerctl not found");
    }
}
