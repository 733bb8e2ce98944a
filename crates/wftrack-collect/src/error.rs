use thiserror::Error;
use wftrack_db::DbError;

/// Failure of one adapter invocation.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The adapter needs a credential that is not configured.
    #[error("missing credentials: {0} is not set")]
    MissingCredentials(&'static str),

    /// Network or TLS failure, or a non-2xx status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream API answered but reported an error.
    #[error("API error: {0}")]
    Api(String),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// No adapter is registered for the requested platform.
    #[error("no source configured for {0}")]
    NotConfigured(String),
}

/// Persistence failure seen by the collector.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
