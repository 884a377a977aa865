//! QuizArena · Terminal A/B Comparison Client
//!
//! - Picks a subject, clears the bot check when asked, compares two
//!   anonymized quiz items per round and records which one the user prefers
//! - Talks to the arena backend over JSON POSTs with a stable pseudonymous id
//! - All persistence, pool allocation and rate limiting live in the backend
//!
//! Important env variables:
//!   QUIZARENA_API_URL       : backend base URL (required)
//!   QUIZARENA_DATA_DIR      : identity storage dir (default: XDG data dir)
//!   QUIZARENA_CONFIG_PATH   : path to a TOML catalogue overlay (optional)
//!   QUIZARENA_HTTP_TIMEOUT_SECS : transport timeout, default 20
//!   LOG_LEVEL    : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod subjects;
mod protocol;
mod error;
mod api;
mod identity;
mod shuffle;
mod widget;
mod session;
mod ui;

use tracing::{info, instrument};

use crate::api::HttpApi;
use crate::config::ClientConfig;
use crate::identity::IdentityStore;
use crate::session::SessionController;
use crate::widget::PromptWidget;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = ClientConfig::from_env()?;

  // One stable id per installation; every request carries it.
  let user_id = IdentityStore::new(&cfg.data_dir).get_or_create();

  let api = HttpApi::new(cfg.api_base.clone(), user_id, cfg.http_timeout)?;
  let controller = SessionController::new(
    api,
    PromptWidget::default(),
    cfg.subjects.clone(),
    cfg.round_choices.clone(),
  );

  info!(
    target: "quizarena_client",
    api_base = %cfg.api_base,
    subjects = cfg.subjects.len(),
    "Client ready"
  );
  ui::run(controller).await?;
  Ok(())
}
