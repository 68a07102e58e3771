use thiserror::Error;

/// Errors returned by the directory API client.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned `"success": false` with a message.
    #[error("directory API error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
