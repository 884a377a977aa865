//! Client configuration: environment variables plus an optional TOML
//! catalogue overlay.
//!
//! Env variables:
//! - QUIZARENA_API_URL          backend base URL (required)
//! - QUIZARENA_DATA_DIR         identity storage dir (default: XDG data dir)
//! - QUIZARENA_CONFIG_PATH      path to a TOML catalogue overlay (optional)
//! - QUIZARENA_HTTP_TIMEOUT_SECS  per-request transport timeout (default 20)
//!
//! The overlay can replace the built-in subject catalogue and round-length
//! choices; a broken overlay is logged and ignored, it never takes the
//! client down.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::subjects;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

/// Everything main() needs to assemble the client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
  pub api_base: String,
  pub data_dir: PathBuf,
  pub http_timeout: Duration,
  pub subjects: Vec<String>,
  pub round_choices: Vec<u32>,
}

/// Schema of the optional TOML overlay file.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct OverlayCfg {
  #[serde(default)]
  pub catalogue: CatalogueCfg,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct CatalogueCfg {
  #[serde(default)] pub subjects: Option<Vec<String>>,
  #[serde(default)] pub round_choices: Option<Vec<u32>>,
}

impl ClientConfig {
  /// Assemble the configuration from the environment. Only the backend URL
  /// is mandatory; everything else has a usable default.
  pub fn from_env() -> Result<Self, String> {
    let api_base = std::env::var("QUIZARENA_API_URL")
      .ok()
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .ok_or_else(|| "QUIZARENA_API_URL is not set (backend base URL)".to_string())?;

    let data_dir = std::env::var("QUIZARENA_DATA_DIR")
      .ok()
      .filter(|s| !s.is_empty())
      .map(PathBuf::from)
      .unwrap_or_else(default_data_dir);

    let http_timeout = std::env::var("QUIZARENA_HTTP_TIMEOUT_SECS")
      .ok()
      .and_then(|s| s.trim().parse::<u64>().ok())
      .filter(|&secs| secs > 0)
      .map(Duration::from_secs)
      .unwrap_or(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));

    let mut subjects = subjects::builtin_subjects();
    let mut round_choices = subjects::DEFAULT_ROUND_CHOICES.to_vec();

    if let Some(overlay) = load_overlay_from_env() {
      if let Some(list) = overlay.catalogue.subjects {
        if list.iter().any(|s| s.trim().is_empty()) || list.is_empty() {
          warn!(target: "quizarena_client", "Ignoring overlay subjects: empty list or blank entries");
        } else {
          subjects = list;
        }
      }
      if let Some(choices) = overlay.catalogue.round_choices {
        if choices.is_empty() || choices.contains(&0) {
          warn!(target: "quizarena_client", "Ignoring overlay round_choices: must be non-empty and positive");
        } else {
          round_choices = choices;
        }
      }
    }

    Ok(Self { api_base, data_dir, http_timeout, subjects, round_choices })
  }
}

/// $XDG_DATA_HOME/quizarena, falling back to ~/.local/share/quizarena, and
/// as a last resort a dot directory next to the binary's cwd.
fn default_data_dir() -> PathBuf {
  if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
    if !xdg.is_empty() {
      return PathBuf::from(xdg).join("quizarena");
    }
  }
  if let Ok(home) = std::env::var("HOME") {
    if !home.is_empty() {
      return PathBuf::from(home).join(".local").join("share").join("quizarena");
    }
  }
  PathBuf::from(".quizarena")
}

/// Attempt to load the overlay from QUIZARENA_CONFIG_PATH. On any
/// parsing/IO error, returns None.
fn load_overlay_from_env() -> Option<OverlayCfg> {
  let path = std::env::var("QUIZARENA_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<OverlayCfg>(&s) {
      Ok(cfg) => {
        info!(target: "quizarena_client", %path, "Loaded catalogue overlay (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quizarena_client", %path, error = %e, "Failed to parse TOML overlay");
        None
      }
    },
    Err(e) => {
      error!(target: "quizarena_client", %path, error = %e, "Failed to read TOML overlay file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn overlay_schema_accepts_partial_tables() {
    let cfg: OverlayCfg = toml::from_str(
      r#"
        [catalogue]
        round_choices = [3, 7]
      "#,
    )
    .unwrap();
    assert_eq!(cfg.catalogue.round_choices, Some(vec![3, 7]));
    assert!(cfg.catalogue.subjects.is_none());
  }

  #[test]
  fn overlay_schema_accepts_full_catalogue() {
    let cfg: OverlayCfg = toml::from_str(
      r#"
        [catalogue]
        subjects = ["운영체제", "컴파일러"]
        round_choices = [5]
      "#,
    )
    .unwrap();
    assert_eq!(cfg.catalogue.subjects.unwrap().len(), 2);
  }
}
