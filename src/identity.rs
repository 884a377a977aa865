//! Stable pseudonymous identity for this client installation.
//!
//! One UUID, generated on first need and kept under a fixed file name in
//! the data directory. Every backend call carries it in the X-User-Id
//! header so rate limits and pool allocation attach to an installation,
//! not to a network address.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};
use uuid::Uuid;

/// File name under the data directory. Fixed so reinstalling the binary
/// keeps the same identity as long as the data dir survives.
const ID_FILE: &str = "user_id";

pub struct IdentityStore {
  dir: PathBuf,
}

impl IdentityStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  /// Return the stored identity, or mint and persist a fresh one.
  ///
  /// Storage trouble is survivable: on read or write failure the call
  /// falls back to an ephemeral id for this process, so the backend still
  /// sees a well-formed value and only continuity is lost.
  pub fn get_or_create(&self) -> String {
    let path = self.dir.join(ID_FILE);

    if let Ok(existing) = fs::read_to_string(&path) {
      let existing = existing.trim();
      if !existing.is_empty() {
        debug!(target: "quizarena_client", path = %path.display(), "Reusing stored client id");
        return existing.to_string();
      }
    }

    let id = Uuid::new_v4().to_string();
    match fs::create_dir_all(&self.dir).and_then(|_| fs::write(&path, &id)) {
      Ok(()) => {
        debug!(target: "quizarena_client", path = %path.display(), "Created client id");
      }
      Err(e) => {
        warn!(
          target: "quizarena_client",
          path = %path.display(),
          error = %e,
          "Could not persist client id; using an ephemeral one for this run"
        );
      }
    }
    id
  }
}
