use reqwest::StatusCode;
use thiserror::Error;

/// Longest response body kept in an error message
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Failures talking to the HTTP event store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// 401 or 403: the token is missing, expired or lacks access
    #[error("Event store refused access ({status}): {body}")]
    Denied { status: StatusCode, body: String },

    #[error("Not found in event store: {0}")]
    NotFound(String),

    #[error("Event store unavailable ({status}): {body}")]
    Unavailable { status: StatusCode, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected event store response ({status}): {body}")]
    InvalidResponse { status: StatusCode, body: String },
}

impl StoreError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let body = clip_body(body);
        match status.as_u16() {
            401 | 403 => StoreError::Denied { status, body },
            404 => StoreError::NotFound(body),
            429 | 500..=599 => StoreError::Unavailable { status, body },
            _ => StoreError::InvalidResponse { status, body },
        }
    }

    /// 401 or 403 from the store
    pub fn is_denied(&self) -> bool {
        matches!(self, StoreError::Denied { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

fn clip_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut cut = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}... ({} bytes)", &body[..cut], body.len())
}
