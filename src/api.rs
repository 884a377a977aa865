//! HTTP client for the arena backend.
//!
//! Three JSON POST operations, each issued at most once per user trigger;
//! there are no automatic retries. Status codes with a contract meaning are
//! mapped to `ApiError` variants here so callers never see raw HTTP.
//! Calls are instrumented and log latencies and statuses (not item contents,
//! and never the client id).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::domain::ModelLabel;
use crate::error::ApiError;
use crate::protocol::{
  CompareIn, CompareOut, FeedbackIn, SelectionIn, BLOCK_REMAINING_HEADER, COMPARE_PATH,
  FEEDBACK_PATH, SELECTION_PATH, USER_ID_HEADER,
};
use crate::util::{join_url, trunc_for_log};

/// The three backend operations the session controller needs. Faked in
/// controller tests; implemented over HTTP by [`HttpApi`].
#[async_trait]
pub trait ComparisonApi: Send + Sync {
  /// Start or continue a sitting: fetch the next item pair for `subject`.
  /// The token rides along when the client still holds one; `question_count`
  /// only on the first fetch of a sitting.
  async fn fetch_comparison(
    &self,
    subject: &str,
    challenge_token: Option<&str>,
    question_count: Option<u32>,
  ) -> Result<CompareOut, ApiError>;

  /// Record which item the user preferred, by backend label.
  async fn save_selection(
    &self,
    session_id: &str,
    subject: &str,
    item_index: i64,
    selected: ModelLabel,
  ) -> Result<(), ApiError>;

  /// Attach free-form feedback to the session.
  async fn submit_feedback(&self, session_id: &str, feedback: &str) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct HttpApi {
  client: reqwest::Client,
  base_url: String,
  user_id: String,
}

impl HttpApi {
  pub fn new(
    base_url: impl Into<String>,
    user_id: impl Into<String>,
    timeout: Duration,
  ) -> Result<Self, ApiError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url: base_url.into(), user_id: user_id.into() })
  }

  async fn post_json<B: serde::Serialize>(
    &self,
    path: &str,
    body: &B,
  ) -> Result<reqwest::Response, ApiError> {
    let url = join_url(&self.base_url, path);
    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "quizarena-client/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(USER_ID_HEADER, &self.user_id)
      .json(body)
      .send()
      .await?;
    Ok(res)
  }
}

/// Drain the body of a failed response into a generic `Api` error.
async fn api_error_from(res: reqwest::Response) -> ApiError {
  let status = res.status().as_u16();
  let body = res.text().await.unwrap_or_default();
  let message = extract_backend_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
  ApiError::Api { status, message }
}

#[async_trait]
impl ComparisonApi for HttpApi {
  #[instrument(
    level = "info",
    skip(self, challenge_token),
    fields(%subject, has_token = challenge_token.is_some(), count = ?question_count)
  )]
  async fn fetch_comparison(
    &self,
    subject: &str,
    challenge_token: Option<&str>,
    question_count: Option<u32>,
  ) -> Result<CompareOut, ApiError> {
    let body = CompareIn {
      subject: subject.to_string(),
      recaptcha_token: challenge_token.map(str::to_string),
      question_count,
    };

    let start = std::time::Instant::now();
    let res = self.post_json(COMPARE_PATH, &body).await?;
    let status = res.status();

    match status {
      StatusCode::NOT_FOUND => {
        info!(target: "session", %subject, "No more items for this subject");
        return Err(ApiError::SubjectExhausted);
      }
      StatusCode::BAD_REQUEST => {
        warn!(target: "session", %subject, "Backend rejected the challenge proof");
        return Err(ApiError::ChallengeRejected);
      }
      s if !s.is_success() => return Err(api_error_from(res).await),
      _ => {}
    }

    let out: CompareOut = res.json().await?;
    info!(
      target: "session",
      elapsed = ?start.elapsed(),
      session_id = %out.session_id,
      idx = out.idx,
      "Comparison pair fetched"
    );
    Ok(out)
  }

  #[instrument(level = "info", skip(self), fields(%session_id, item_index, selected = %selected.as_wire()))]
  async fn save_selection(
    &self,
    session_id: &str,
    subject: &str,
    item_index: i64,
    selected: ModelLabel,
  ) -> Result<(), ApiError> {
    let body = SelectionIn {
      session_id: session_id.to_string(),
      subject: subject.to_string(),
      idx: item_index,
      selected_model: selected,
    };

    let res = self.post_json(SELECTION_PATH, &body).await?;
    let status = res.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
      let retry_secs = res
        .headers()
        .get(BLOCK_REMAINING_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok());
      warn!(target: "session", ?retry_secs, "Selection rate limited");
      return Err(ApiError::RateLimited { retry_secs });
    }
    if !status.is_success() {
      return Err(api_error_from(res).await);
    }

    info!(target: "session", "Selection saved");
    Ok(())
  }

  #[instrument(level = "info", skip(self, feedback), fields(%session_id, feedback_len = feedback.len()))]
  async fn submit_feedback(&self, session_id: &str, feedback: &str) -> Result<(), ApiError> {
    let body = FeedbackIn {
      session_id: session_id.to_string(),
      feedback: feedback.to_string(),
    };

    let res = self.post_json(FEEDBACK_PATH, &body).await?;
    if !res.status().is_success() {
      return Err(api_error_from(res).await);
    }

    info!(target: "session", "Feedback submitted");
    Ok(())
  }
}

/// Try to extract a clean error message from the backend's error body
/// (the backend wraps failure text as `{"detail": ...}`).
fn extract_backend_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    detail: String,
  }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.detail),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{Arc, Mutex};

  use axum::extract::State;
  use axum::http::HeaderMap;
  use axum::response::IntoResponse;
  use axum::routing::post;
  use axum::{Json, Router};

  const TIMEOUT: Duration = Duration::from_secs(5);

  /// Everything the fake backend observed, for assertions.
  #[derive(Clone, Default)]
  struct Seen {
    user_ids: Arc<Mutex<Vec<String>>>,
    compares: Arc<Mutex<Vec<CompareIn>>>,
    selections: Arc<Mutex<Vec<SelectionIn>>>,
    feedbacks: Arc<Mutex<Vec<FeedbackIn>>>,
  }

  fn sample_out() -> CompareOut {
    serde_json::from_value(serde_json::json!({
      "session_id": "sess-1",
      "idx": 2,
      "model_a": { "question": "QA", "choices": ["1"], "answer": "1", "explanation": "ea" },
      "model_b": { "question": "QB", "choices": ["2"], "answer": "2", "explanation": "eb" }
    }))
    .unwrap()
  }

  async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
  }

  fn record_user(seen: &Seen, headers: &HeaderMap) {
    let id = headers
      .get(USER_ID_HEADER)
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default()
      .to_string();
    seen.user_ids.lock().unwrap().push(id);
  }

  async fn happy_backend(seen: Seen) -> String {
    let app = Router::new()
      .route(
        COMPARE_PATH,
        post(|State(s): State<Seen>, headers: HeaderMap, Json(body): Json<CompareIn>| async move {
          record_user(&s, &headers);
          s.compares.lock().unwrap().push(body);
          Json(sample_out())
        }),
      )
      .route(
        SELECTION_PATH,
        post(|State(s): State<Seen>, headers: HeaderMap, Json(body): Json<SelectionIn>| async move {
          record_user(&s, &headers);
          s.selections.lock().unwrap().push(body);
          Json(serde_json::json!({ "ok": true }))
        }),
      )
      .route(
        FEEDBACK_PATH,
        post(|State(s): State<Seen>, headers: HeaderMap, Json(body): Json<FeedbackIn>| async move {
          record_user(&s, &headers);
          s.feedbacks.lock().unwrap().push(body);
          Json(serde_json::json!({ "ok": true }))
        }),
      )
      .with_state(seen);
    spawn(app).await
  }

  #[derive(Clone)]
  struct Fixed {
    status: axum::http::StatusCode,
    body: serde_json::Value,
  }

  async fn fixed_reply(State(f): State<Fixed>) -> impl IntoResponse {
    (f.status, Json(f.body))
  }

  async fn fixed_status_backend(status: axum::http::StatusCode, body: serde_json::Value) -> String {
    let app = Router::new()
      .route(COMPARE_PATH, post(fixed_reply))
      .route(SELECTION_PATH, post(fixed_reply))
      .route(FEEDBACK_PATH, post(fixed_reply))
      .with_state(Fixed { status, body });
    spawn(app).await
  }

  #[tokio::test]
  async fn fetch_sends_identity_token_and_count() {
    let seen = Seen::default();
    let base = happy_backend(seen.clone()).await;
    let api = HttpApi::new(base, "uid-77", TIMEOUT).unwrap();

    let out = api
      .fetch_comparison("자료구조론", Some("tok-9"), Some(5))
      .await
      .unwrap();
    assert_eq!(out.session_id, "sess-1");
    assert_eq!(out.idx, 2);

    assert_eq!(seen.user_ids.lock().unwrap().as_slice(), ["uid-77"]);
    let compares = seen.compares.lock().unwrap();
    assert_eq!(compares[0].subject, "자료구조론");
    assert_eq!(compares[0].recaptcha_token.as_deref(), Some("tok-9"));
    assert_eq!(compares[0].question_count, Some(5));
  }

  #[tokio::test]
  async fn fetch_maps_404_to_exhaustion() {
    let base =
      fixed_status_backend(axum::http::StatusCode::NOT_FOUND, serde_json::json!({ "detail": "empty" }))
        .await;
    let api = HttpApi::new(base, "uid", TIMEOUT).unwrap();
    let err = api.fetch_comparison("확률변수", None, None).await.unwrap_err();
    assert!(matches!(err, ApiError::SubjectExhausted));
  }

  #[tokio::test]
  async fn fetch_maps_400_to_challenge_rejection() {
    let base = fixed_status_backend(
      axum::http::StatusCode::BAD_REQUEST,
      serde_json::json!({ "detail": "captcha failed" }),
    )
    .await;
    let api = HttpApi::new(base, "uid", TIMEOUT).unwrap();
    let err = api.fetch_comparison("확률변수", Some("bad"), None).await.unwrap_err();
    assert!(matches!(err, ApiError::ChallengeRejected));
  }

  #[tokio::test]
  async fn selection_carries_the_backend_label() {
    let seen = Seen::default();
    let base = happy_backend(seen.clone()).await;
    let api = HttpApi::new(base, "uid", TIMEOUT).unwrap();

    api.save_selection("sess-1", "멀티미디어", 3, ModelLabel::ModelB).await.unwrap();

    let selections = seen.selections.lock().unwrap();
    assert_eq!(selections[0].session_id, "sess-1");
    assert_eq!(selections[0].idx, 3);
    assert_eq!(selections[0].selected_model, ModelLabel::ModelB);
  }

  #[tokio::test]
  async fn selection_rate_limit_parses_block_header() {
    let app = Router::new().route(
      SELECTION_PATH,
      post(|| async {
        let mut headers = HeaderMap::new();
        headers.insert(BLOCK_REMAINING_HEADER, "600".parse().unwrap());
        (axum::http::StatusCode::TOO_MANY_REQUESTS, headers, "blocked").into_response()
      }),
    );
    let base = spawn(app).await;
    let api = HttpApi::new(base, "uid", TIMEOUT).unwrap();

    let err = api.save_selection("s", "회로이론1", 0, ModelLabel::ModelA).await.unwrap_err();
    match err {
      ApiError::RateLimited { retry_secs } => assert_eq!(retry_secs, Some(600)),
      other => panic!("expected RateLimited, got {other:?}"),
    }
    assert!(err_is_hard(600));
    assert!(!err_is_hard(45));
  }

  fn err_is_hard(secs: u64) -> bool {
    ApiError::RateLimited { retry_secs: Some(secs) }.is_hard_block()
  }

  #[tokio::test]
  async fn selection_rate_limit_without_header_still_limits() {
    let app = Router::new().route(
      SELECTION_PATH,
      post(|| async { axum::http::StatusCode::TOO_MANY_REQUESTS }),
    );
    let base = spawn(app).await;
    let api = HttpApi::new(base, "uid", TIMEOUT).unwrap();

    let err = api.save_selection("s", "전자기학1", 0, ModelLabel::ModelA).await.unwrap_err();
    assert!(matches!(err, ApiError::RateLimited { retry_secs: None }));
  }

  #[tokio::test]
  async fn feedback_surfaces_backend_detail_on_failure() {
    let base = fixed_status_backend(
      axum::http::StatusCode::INTERNAL_SERVER_ERROR,
      serde_json::json!({ "detail": "db down" }),
    )
    .await;
    let api = HttpApi::new(base, "uid", TIMEOUT).unwrap();

    let err = api.submit_feedback("sess-1", "good pair").await.unwrap_err();
    match err {
      ApiError::Api { status, message } => {
        assert_eq!(status, 500);
        assert_eq!(message, "db down");
      }
      other => panic!("expected Api error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn transport_failures_do_not_panic() {
    // Nothing listens on this port; bind-then-drop guarantees it is free.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let api = HttpApi::new(base, "uid", Duration::from_millis(300)).unwrap();
    let err = api.fetch_comparison("확률변수", None, None).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
  }
}
