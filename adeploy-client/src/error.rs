use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("artifact registration rejected by the service: {0}")]
    Rejected(String),

    #[error("registration response carried no {0}")]
    MissingField(&'static str),

    #[error("finish upload reported status {0:?}")]
    FinishNotOk(String),

    #[error("public install page was requested but the service returned no URL")]
    PublicPageUnavailable,

    #[error("{phase} failed after {attempts} attempts: {source}")]
    ExhaustedRetries {
        phase: &'static str,
        attempts: u32,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Transient failures are worth another attempt within the retry budget.
    /// Everything else is a definitive answer from the service and retrying
    /// would only repeat it.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::Http(_) | ClientError::Status(_) | ClientError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
