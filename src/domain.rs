//! Domain models for one sitting of the arena: quiz items, slot labels,
//! per-round state, verification and progress bookkeeping.

use serde::{Deserialize, Serialize};

/// A single generated quiz item as the backend returns it.
/// The client renders it; it never inspects or rewrites the content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizItem {
  pub question: String,
  #[serde(default)] pub choices: Vec<String>,
  #[serde(default)] pub answer: String,
  #[serde(default)] pub explanation: String,
}

/// Backend identity of an item within a round. Never shown to the user;
/// on-screen positions are [`Slot`]s.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelLabel {
  ModelA,
  ModelB,
}

impl ModelLabel {
  /// Wire spelling, identical to the serde rename.
  pub fn as_wire(&self) -> &'static str {
    match self {
      ModelLabel::ModelA => "model_a",
      ModelLabel::ModelB => "model_b",
    }
  }
}

/// On-screen position of an item, independent of its backend label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
  A,
  B,
}

/// Both items of one comparison round, still under their backend labels.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelPair {
  pub model_a: QuizItem,
  pub model_b: QuizItem,
}

impl ModelPair {
  pub fn by_label(&self, label: ModelLabel) -> &QuizItem {
    match label {
      ModelLabel::ModelA => &self.model_a,
      ModelLabel::ModelB => &self.model_b,
    }
  }
}

/// Which way the two backend labels land on screen for one round.
/// `swapped == false` shows model_a in slot A; `swapped == true` inverts.
/// Drawn once per round, immutable afterwards (see shuffle.rs).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotMapping {
  pub swapped: bool,
}

/// One open comparison round: the backend session coordinates plus the item
/// pair and the slot mapping drawn for it. Created together, discarded
/// together, so a mapping can never outlive the items it was drawn for.
#[derive(Clone, Debug)]
pub struct Round {
  pub session_id: String,
  pub item_index: i64,
  pub subject: String,
  pub items: ModelPair,
  pub mapping: SlotMapping,
}

/// Bot-check bookkeeping. `verified_subject` survives a return to the
/// subject list within the process; the pending subject and any held token
/// do not outlive the exchange they belong to.
#[derive(Clone, Debug, Default)]
pub struct VerificationState {
  pub pending_subject: Option<String>,
  pub verified_subject: Option<String>,
  pub challenge_token: Option<String>,
}

impl VerificationState {
  pub fn is_verified(&self, subject: &str) -> bool {
    self.verified_subject.as_deref() == Some(subject)
  }

  pub fn clear_token(&mut self) {
    self.challenge_token = None;
  }
}

/// Round counter for one sitting of a subject. `answered` is 1-based: it
/// names the round currently on screen, so target 5 means `answered` runs
/// 1..=5 and `has_next` turns false on the fifth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundProgress {
  pub target: u32,
  pub answered: u32,
}

impl RoundProgress {
  pub fn start(target: u32) -> Self {
    Self { target, answered: 1 }
  }

  pub fn has_next(&self) -> bool {
    self.answered < self.target
  }

  pub fn advance(&mut self) {
    self.answered += 1;
  }
}
