//! Store error taxonomy
//!
//! Every variant names the store it came from so the coordinator can
//! report which side failed without extra bookkeeping.

use std::time::Duration;

use crate::models::StoreRole;

/// Failure of a single store call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No pooled connection became available within the acquire bound
    #[error("{role} store pool exhausted")]
    PoolExhausted { role: StoreRole },

    /// Could not open or reach a connection to the store
    #[error("{role} store unreachable: {detail}")]
    ConnectFailed { role: StoreRole, detail: String },

    /// The statement itself failed
    #[error("{role} store statement failed: {detail}")]
    Statement { role: StoreRole, detail: String },

    /// The call did not finish within the coordinator's bound
    #[error("{role} store call timed out after {}ms", .after.as_millis())]
    Timeout { role: StoreRole, after: Duration },

    /// The call was cancelled before it finished
    #[error("{role} store call cancelled")]
    Cancelled { role: StoreRole },
}

impl StoreError {
    pub fn role(&self) -> StoreRole {
        match self {
            Self::PoolExhausted { role }
            | Self::ConnectFailed { role, .. }
            | Self::Statement { role, .. }
            | Self::Timeout { role, .. }
            | Self::Cancelled { role } => *role,
        }
    }

    /// Stable machine-readable kind for responses and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PoolExhausted { .. } => "pool_exhausted",
            Self::ConnectFailed { .. } => "connect_failed",
            Self::Statement { .. } => "statement",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    /// Classify a driver error.
    pub fn from_sqlx(role: StoreRole, err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut => Self::PoolExhausted { role },
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolClosed => Self::ConnectFailed {
                role,
                detail: err.to_string(),
            },
            _ => Self::Statement {
                role,
                detail: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_exhaustion() {
        let err = StoreError::from_sqlx(StoreRole::Local, sqlx::Error::PoolTimedOut);
        assert_eq!(err, StoreError::PoolExhausted { role: StoreRole::Local });
        assert_eq!(err.kind(), "pool_exhausted");
    }

    #[test]
    fn io_error_is_connect_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = StoreError::from_sqlx(StoreRole::Peer, sqlx::Error::Io(io));
        assert!(matches!(err, StoreError::ConnectFailed { role: StoreRole::Peer, .. }));
        assert!(err.to_string().starts_with("peer store unreachable"));
    }

    #[test]
    fn other_errors_are_statement_failures() {
        let err = StoreError::from_sqlx(StoreRole::Local, sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Statement { .. }));
        assert_eq!(err.role(), StoreRole::Local);
    }

    #[test]
    fn timeout_display_in_millis() {
        let err = StoreError::Timeout {
            role: StoreRole::Peer,
            after: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "peer store call timed out after 1500ms");
    }
}
