use thiserror::Error;

/// Fatal failures of a sync or report run.
///
/// Provider adapters report plain `anyhow` errors; the orchestrator wraps
/// them here with the service name or the ticket key that was being worked.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("can't connect to {service}: {source:#}")]
    Connection {
        service: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("can't get {what} from {service}: {source:#}")]
    Query {
        service: String,
        what: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("can't add card for `{key}`: {source:#}")]
    Create {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("can't {action} card `{key}`: {source:#}")]
    Mutation {
        key: String,
        action: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl SyncError {
    pub fn connection(service: &str, source: anyhow::Error) -> Self {
        Self::Connection {
            service: service.to_string(),
            source,
        }
    }

    pub fn query(service: &str, what: &'static str, source: anyhow::Error) -> Self {
        Self::Query {
            service: service.to_string(),
            what,
            source,
        }
    }

    /// True when the run failed after it started changing the board.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Create { .. } | Self::Mutation { .. })
    }
}
