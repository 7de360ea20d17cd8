//! Error taxonomy for the fetch-aggregate-cache pipeline.
//!
//! Errors are `Clone` because a single failed rebuild is reported to every
//! caller that was waiting on it.

use thiserror::Error;

/// Errors produced while building a dashboard snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    /// Non-success response or transport failure from the remote API.
    #[error("Upstream error during {context}: {message}")]
    Upstream {
        /// What was being requested (e.g. "issue BAC-1", "search page 3").
        context: String,
        /// HTTP status, when a response was received at all.
        status: Option<u16>,
        message: String,
    },

    /// A raw record without its mandatory `key` field.
    #[error("Malformed record in {context}: missing issue key")]
    MalformedRecord { context: String },

    /// The rebuild task stopped without producing a result.
    #[error("Rebuild aborted: {0}")]
    Rebuild(String),
}

impl DashboardError {
    pub fn upstream(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            context: context.into(),
            status: None,
            message: message.into(),
        }
    }

    pub fn upstream_status(
        context: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::Upstream {
            context: context.into(),
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn malformed(context: impl Into<String>) -> Self {
        Self::MalformedRecord {
            context: context.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display() {
        let err = DashboardError::upstream_status("issue BAC-1", 404, "Issue does not exist");
        assert_eq!(
            err.to_string(),
            "Upstream error during issue BAC-1: Issue does not exist"
        );
        assert!(matches!(err, DashboardError::Upstream { status: Some(404), .. }));
    }

    #[test]
    fn test_malformed_display() {
        let err = DashboardError::malformed("task search");
        assert_eq!(
            err.to_string(),
            "Malformed record in task search: missing issue key"
        );
    }
}
