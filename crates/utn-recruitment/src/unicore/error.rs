use reqwest::StatusCode;

/// Result of a registry read that reached the registry and got an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    /// The registry answered 404 for the identity number.
    NotFound,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// Failures talking to the unicore registry.
#[derive(Debug, thiserror::Error)]
pub enum UnicoreError {
    #[error("unicore unreachable: {0}")]
    Unreachable(String),
    #[error("unicore temporarily unavailable (HTTP {status})")]
    Unavailable { status: u16 },
    #[error("unicore rejected the request (HTTP {status})")]
    Rejected { status: u16 },
    #[error("malformed unicore response: {0}")]
    MalformedResponse(String),
    #[error("unicore request failed: {0}")]
    RequestFailed(String),
    #[error("unicore client could not be built: {0}")]
    Client(String),
}

impl UnicoreError {
    /// Whether the same request may succeed later without any change on our side.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            UnicoreError::Unreachable(_) | UnicoreError::Unavailable { .. }
        )
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UnicoreError::Unreachable(format!("request timed out: {err}"))
        } else if err.is_connect() {
            UnicoreError::Unreachable(format!("connection failed: {err}"))
        } else {
            UnicoreError::RequestFailed(err.to_string())
        }
    }

    /// Maps a non-200, non-404 status onto the error taxonomy.
    pub(crate) fn from_status(status: StatusCode) -> Self {
        if status.is_server_error()
            || status == StatusCode::REQUEST_TIMEOUT
            || status == StatusCode::TOO_MANY_REQUESTS
        {
            UnicoreError::Unavailable {
                status: status.as_u16(),
            }
        } else {
            UnicoreError::Rejected {
                status: status.as_u16(),
            }
        }
    }
}
