//! Error taxonomy for the arena calls.
//!
//! Status mapping happens at the api boundary, so the session controller
//! only ever matches on these variants and never inspects HTTP statuses.
//! Every variant is recoverable by user action; none aborts the process.

use thiserror::Error;

use crate::protocol::HARD_BLOCK_SECS;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 404 on fetch: the subject's item pool ran dry for this user.
    #[error("no more questions for this subject")]
    SubjectExhausted,

    /// 400 on fetch: the backend rejected the bot-check proof.
    #[error("challenge verification rejected")]
    ChallengeRejected,

    /// 429 on selection. `retry_secs` is the remaining block duration from
    /// the response header, when the backend sent a parseable one.
    #[error("rate limited by the backend")]
    RateLimited { retry_secs: Option<u64> },

    /// Any other non-2xx the taxonomy has no specific meaning for.
    #[error("backend error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Connect, timeout or decode failure below HTTP semantics.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// Ten-minute hard block, as opposed to the ordinary short window.
    pub fn is_hard_block(&self) -> bool {
        matches!(self, ApiError::RateLimited { retry_secs: Some(s) } if *s >= HARD_BLOCK_SECS)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_block_starts_at_the_sentinel() {
        assert!(ApiError::RateLimited { retry_secs: Some(600) }.is_hard_block());
        assert!(ApiError::RateLimited { retry_secs: Some(601) }.is_hard_block());
        assert!(!ApiError::RateLimited { retry_secs: Some(599) }.is_hard_block());
        assert!(!ApiError::RateLimited { retry_secs: None }.is_hard_block());
    }

    #[test]
    fn display_stays_short() {
        let e = ApiError::Api { status: 500, message: "boom".to_string() };
        assert_eq!(e.to_string(), "backend error: HTTP 500: boom");
        let r = ApiError::RateLimited { retry_secs: Some(42) };
        assert_eq!(r.to_string(), "rate limited by the backend");
    }
}
