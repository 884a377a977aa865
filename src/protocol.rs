//! Wire protocol for the arena backend (serde ready): the three POST
//! endpoints, their request/response DTOs, and the headers both sides agree
//! on. Keep this small and stable to evolve backend and client independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ModelLabel, ModelPair, QuizItem};

/// Pseudonymous client identity, attached to every request.
pub const USER_ID_HEADER: &str = "X-User-Id";
/// 429 responses carry the remaining block duration (whole seconds) here.
pub const BLOCK_REMAINING_HEADER: &str = "x-block-remaining";
/// Remaining durations at or above this mark the ten-minute hard block;
/// anything below is the ordinary short window.
pub const HARD_BLOCK_SECS: u64 = 600;

// Endpoint paths. The backend routes carry trailing slashes.
pub const COMPARE_PATH: &str = "/compare_models/";
pub const SELECTION_PATH: &str = "/save_selection/";
pub const FEEDBACK_PATH: &str = "/submit_feedback/";

/// Body of `POST /compare_models/`. The token rides along only when the
/// client still holds one; the round count only on the first fetch of a
/// sitting.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompareIn {
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recaptcha_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_count: Option<u32>,
}

/// Response of `POST /compare_models/`: session coordinates plus the two
/// items, still under their backend labels.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompareOut {
    pub session_id: String,
    pub idx: i64,
    pub model_a: QuizItem,
    pub model_b: QuizItem,
}

impl CompareOut {
    /// Split into session coordinates and the item pair.
    pub fn into_parts(self) -> (String, i64, ModelPair) {
        (
            self.session_id,
            self.idx,
            ModelPair { model_a: self.model_a, model_b: self.model_b },
        )
    }
}

/// Body of `POST /save_selection/`. `selected_model` is the backend label
/// of the chosen item, never the on-screen slot.
#[derive(Debug, Serialize, Deserialize)]
pub struct SelectionIn {
    pub session_id: String,
    pub subject: String,
    pub idx: i64,
    pub selected_model: ModelLabel,
}

/// Body of `POST /submit_feedback/`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackIn {
    pub session_id: String,
    pub feedback: String,
}
