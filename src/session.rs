//! Session state machine for one sitting of the arena client.
//!
//! All mutable per-sitting state lives here, owned by a single controller.
//! Screens are an enum, so contradictory flag combinations cannot be
//! represented; transient messages overlay the current screen instead of
//! being a state of their own, and the next user action dismisses them.
//! Backend calls go through the [`ComparisonApi`] seam and the bot-check
//! through [`ChallengeWidget`], which keeps every transition testable
//! against fakes.

use tracing::{debug, error, info, instrument, warn};

use crate::api::ComparisonApi;
use crate::domain::{QuizItem, Round, RoundProgress, Slot, VerificationState};
use crate::error::ApiError;
use crate::shuffle;
use crate::widget::{ChallengeWidget, WidgetEvent};

/// Named screens of the single-page flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    SubjectSelection,
    AwaitingVerification,
    QuestionCountSelection,
    Fetching,
    Comparing,
    Reviewing,
    Exhausted,
}

/// Transient message shown on top of the current screen. Stored as data,
/// not text, so rendering decisions stay in the ui layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    ChallengeRetry,
    ChallengeExpired,
    WidgetError(String),
    TokenMissing,
    ShortRateLimit,
    HardBlock,
    FetchFailed,
    SelectionFailed,
    FeedbackFailed,
    FeedbackSaved,
    AllRoundsDone { target: u32 },
}

pub struct SessionController<A, W> {
    api: A,
    widget: W,
    subjects: Vec<String>,
    round_choices: Vec<u32>,

    screen: Screen,
    verification: VerificationState,
    subject: Option<String>,
    round: Option<Round>,
    progress: Option<RoundProgress>,
    picked: Option<Slot>,
    notice: Option<Notice>,
    /// True while a backend call is outstanding; every trigger checks it
    /// first so a second operation can never start mid-flight.
    busy: bool,
}

impl<A: ComparisonApi, W: ChallengeWidget> SessionController<A, W> {
    pub fn new(api: A, widget: W, subjects: Vec<String>, round_choices: Vec<u32>) -> Self {
        Self {
            api,
            widget,
            subjects,
            round_choices,
            screen: Screen::SubjectSelection,
            verification: VerificationState::default(),
            subject: None,
            round: None,
            progress: None,
            picked: None,
            notice: None,
            busy: false,
        }
    }

    // --- Read accessors for rendering ---

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn round_choices(&self) -> &[u32] {
        &self.round_choices
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn pending_subject(&self) -> Option<&str> {
        self.verification.pending_subject.as_deref()
    }

    pub fn is_subject_verified(&self, subject: &str) -> bool {
        self.verification.is_verified(subject)
    }

    pub fn has_challenge_token(&self) -> bool {
        self.verification.challenge_token.is_some()
    }

    pub fn progress(&self) -> Option<RoundProgress> {
        self.progress
    }

    pub fn picked_slot(&self) -> Option<Slot> {
        self.picked
    }

    /// The open round's items in display order (slot A, slot B).
    pub fn presented(&self) -> Option<(&QuizItem, &QuizItem)> {
        self.round.as_ref().map(|r| shuffle::present(&r.items, r.mapping))
    }

    /// The item the user picked, as it was shown to them.
    pub fn picked_item(&self) -> Option<&QuizItem> {
        let round = self.round.as_ref()?;
        let slot = self.picked?;
        Some(round.items.by_label(shuffle::resolve(slot, round.mapping)))
    }

    // --- User triggers ---

    /// Pick a subject from the list. Verified subjects go straight to
    /// round-count selection; everything else parks on the bot check.
    #[instrument(level = "info", skip(self), fields(%subject))]
    pub fn select_subject(&mut self, subject: &str) {
        if self.reject_if_busy("select_subject") {
            return;
        }
        self.notice = None;
        if !self.subjects.iter().any(|s| s == subject) {
            warn!(target: "session", %subject, "Ignoring unknown subject");
            return;
        }
        if self.verification.is_verified(subject) {
            debug!(target: "session", "Subject already verified; skipping the challenge");
            self.subject = Some(subject.to_string());
            self.verification.pending_subject = None;
            self.screen = Screen::QuestionCountSelection;
        } else {
            self.verification.pending_subject = Some(subject.to_string());
            self.screen = Screen::AwaitingVerification;
        }
    }

    /// React to the challenge widget. Token arrival only stores the token;
    /// expiry and widget failure invalidate it and reset the widget.
    pub fn handle_widget_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::TokenReceived(token) => {
                debug!(target: "session", "Challenge token received");
                self.notice = None;
                self.verification.challenge_token = Some(token);
            }
            WidgetEvent::Expired => {
                info!(target: "session", "Challenge token expired before use");
                self.verification.clear_token();
                self.widget.reset();
                self.notice = Some(Notice::ChallengeExpired);
            }
            WidgetEvent::Errored(message) => {
                warn!(target: "session", %message, "Challenge widget reported an error");
                self.verification.clear_token();
                self.widget.reset();
                self.notice = Some(Notice::WidgetError(message));
            }
        }
    }

    /// Confirm the bot check for the pending subject. Consumes the held
    /// token: the subject is marked verified for the rest of the process
    /// and the widget starts over.
    #[instrument(level = "info", skip(self))]
    pub fn confirm_verification(&mut self) {
        if self.reject_if_busy("confirm_verification") {
            return;
        }
        if self.screen != Screen::AwaitingVerification {
            debug!(target: "session", "Confirm outside the verification screen ignored");
            return;
        }
        let Some(pending) = self.verification.pending_subject.clone() else {
            debug!(target: "session", "Confirm without a pending subject ignored");
            return;
        };
        if self.verification.challenge_token.is_none() {
            self.notice = Some(Notice::TokenMissing);
            return;
        }
        self.notice = None;
        self.verification.verified_subject = Some(pending.clone());
        self.verification.pending_subject = None;
        self.verification.clear_token();
        self.widget.reset();
        self.screen = Screen::QuestionCountSelection;
        info!(target: "session", subject = %pending, "Verification confirmed; token consumed");
        self.subject = Some(pending);
    }

    /// Choose how many rounds this sitting should run, then fetch the
    /// first pair. The count rides along on this first fetch only.
    #[instrument(level = "info", skip(self))]
    pub async fn choose_round_count(&mut self, count: u32) {
        if self.reject_if_busy("choose_round_count") {
            return;
        }
        if self.screen != Screen::QuestionCountSelection {
            debug!(target: "session", "Round-count choice outside its screen ignored");
            return;
        }
        if !self.round_choices.contains(&count) {
            warn!(target: "session", count, "Ignoring a round count outside the offered choices");
            return;
        }
        let Some(subject) = self.subject.clone() else {
            warn!(target: "session", "No subject selected; returning to the subject list");
            self.screen = Screen::SubjectSelection;
            return;
        };
        self.notice = None;
        self.progress = Some(RoundProgress::start(count));
        self.fetch_round(subject, Some(count)).await;
    }

    /// Record the user's preference for the item in `slot`. The slot is
    /// translated to a backend label through the round's mapping at the
    /// last moment, so what is reported is exactly what was on screen.
    #[instrument(level = "info", skip(self))]
    pub async fn pick_slot(&mut self, slot: Slot) {
        if self.reject_if_busy("pick_slot") {
            return;
        }
        if self.screen != Screen::Comparing {
            debug!(target: "session", "Slot pick outside the comparison screen ignored");
            return;
        }
        let Some((session_id, subject, item_index, label)) = self.round.as_ref().map(|r| {
            (
                r.session_id.clone(),
                r.subject.clone(),
                r.item_index,
                shuffle::resolve(slot, r.mapping),
            )
        }) else {
            warn!(target: "session", "No open round; ignoring the pick");
            return;
        };
        self.notice = None;

        self.busy = true;
        let result = self.api.save_selection(&session_id, &subject, item_index, label).await;
        self.busy = false;

        match result {
            Ok(()) => {
                self.picked = Some(slot);
                self.screen = Screen::Reviewing;
                info!(target: "session", label = %label.as_wire(), "Preference recorded");
            }
            Err(err @ ApiError::RateLimited { .. }) => {
                let hard = err.is_hard_block();
                warn!(target: "session", hard, "Selection was rate limited");
                self.notice = Some(if hard { Notice::HardBlock } else { Notice::ShortRateLimit });
            }
            Err(e) => {
                error!(target: "session", error = %e, "Saving the selection failed");
                self.notice = Some(Notice::SelectionFailed);
            }
        }
    }

    /// Attach free-form feedback to the current session. The screen does
    /// not change; success and failure both surface as notices.
    #[instrument(level = "info", skip(self, text), fields(feedback_len = text.len()))]
    pub async fn submit_feedback(&mut self, text: &str) {
        if self.reject_if_busy("submit_feedback") {
            return;
        }
        if self.screen != Screen::Reviewing {
            debug!(target: "session", "Feedback outside the review screen ignored");
            return;
        }
        let Some(session_id) = self.round.as_ref().map(|r| r.session_id.clone()) else {
            warn!(target: "session", "No open round; ignoring feedback");
            return;
        };
        self.notice = None;

        self.busy = true;
        let result = self.api.submit_feedback(&session_id, text).await;
        self.busy = false;

        match result {
            Ok(()) => {
                self.notice = Some(Notice::FeedbackSaved);
            }
            Err(e) => {
                error!(target: "session", error = %e, "Submitting feedback failed");
                self.notice = Some(Notice::FeedbackFailed);
            }
        }
    }

    /// Move on to the next round of the sitting, unless the target has
    /// been reached. The counter advances only once the new pair actually
    /// arrives, so a failed fetch never skips a round.
    #[instrument(level = "info", skip(self))]
    pub async fn next_round(&mut self) {
        if self.reject_if_busy("next_round") {
            return;
        }
        if self.screen != Screen::Reviewing {
            debug!(target: "session", "Next-round outside the review screen ignored");
            return;
        }
        let Some(progress) = self.progress else {
            debug!(target: "session", "No progress tracked; ignoring next-round");
            return;
        };
        if !progress.has_next() {
            info!(target: "session", target_rounds = progress.target, "Sitting complete; no further fetches");
            self.notice = Some(Notice::AllRoundsDone { target: progress.target });
            return;
        }
        let Some(subject) = self.subject.clone() else {
            warn!(target: "session", "No subject for the open sitting; returning to the list");
            self.screen = Screen::SubjectSelection;
            return;
        };
        self.notice = None;
        self.picked = None;
        self.fetch_round(subject, None).await;
        if self.screen == Screen::Comparing {
            if let Some(p) = self.progress.as_mut() {
                p.advance();
            }
        }
    }

    /// From Reviewing back to the comparison of the same round, e.g. to
    /// reread both items or change the pick.
    pub fn back_to_comparison(&mut self) {
        if self.reject_if_busy("back_to_comparison") {
            return;
        }
        if self.screen != Screen::Reviewing || self.round.is_none() {
            debug!(target: "session", "Back-to-comparison ignored");
            return;
        }
        self.notice = None;
        self.picked = None;
        self.screen = Screen::Comparing;
    }

    /// Abandon the sitting and return to the subject list. Round, progress
    /// and any pending verification are dropped; subjects verified earlier
    /// in this process stay verified.
    #[instrument(level = "info", skip(self))]
    pub fn back_to_subjects(&mut self) {
        if self.reject_if_busy("back_to_subjects") {
            return;
        }
        self.notice = None;
        self.subject = None;
        self.round = None;
        self.progress = None;
        self.picked = None;
        self.verification.pending_subject = None;
        if self.verification.challenge_token.is_some() {
            self.verification.clear_token();
            self.widget.reset();
        }
        self.screen = Screen::SubjectSelection;
        debug!(target: "session", verified = ?self.verification.verified_subject, "Returned to subject selection");
    }

    // --- Internals ---

    /// Fetch one comparison pair and apply the outcome. The single place
    /// where fetch results turn into screen changes.
    async fn fetch_round(&mut self, subject: String, question_count: Option<u32>) {
        let return_to = self.screen;
        self.screen = Screen::Fetching;

        self.busy = true;
        let token = self.verification.challenge_token.clone();
        let sent_token = token.is_some();
        let result = self
            .api
            .fetch_comparison(&subject, token.as_deref(), question_count)
            .await;
        self.busy = false;

        // A token that went over the wire is spent, whatever came back.
        if sent_token {
            self.verification.clear_token();
            self.widget.reset();
        }

        match result {
            Ok(out) => {
                let (session_id, item_index, items) = out.into_parts();
                let mapping = shuffle::draw(&mut rand::thread_rng());
                debug!(target: "session", %session_id, item_index, swapped = mapping.swapped, "Round opened");
                self.round = Some(Round { session_id, item_index, subject, items, mapping });
                self.picked = None;
                self.screen = Screen::Comparing;
            }
            Err(ApiError::SubjectExhausted) => {
                info!(target: "session", %subject, "Subject has no more items");
                self.subject = None;
                self.round = None;
                self.progress = None;
                self.picked = None;
                self.screen = Screen::Exhausted;
            }
            Err(ApiError::ChallengeRejected) => {
                warn!(target: "session", %subject, "Verification rejected; back to the challenge");
                if !sent_token {
                    self.verification.clear_token();
                    self.widget.reset();
                }
                if self.verification.verified_subject.as_deref() == Some(subject.as_str()) {
                    self.verification.verified_subject = None;
                }
                self.verification.pending_subject = Some(subject);
                self.screen = Screen::AwaitingVerification;
                self.notice = Some(Notice::ChallengeRetry);
            }
            Err(e) => {
                error!(target: "session", error = %e, "Fetching a comparison failed");
                self.screen = return_to;
                self.notice = Some(Notice::FetchFailed);
            }
        }
    }

    fn reject_if_busy(&self, action: &str) -> bool {
        if self.busy {
            debug!(target: "session", action, "Trigger ignored: an operation is in flight");
        }
        self.busy
    }
}
