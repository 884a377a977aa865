//! Screen rendering for the terminal front. Small pure helpers build the
//! text; printing happens at the edges so the formatting stays testable.

use std::io::Write;

use crate::api::ComparisonApi;
use crate::domain::{QuizItem, Slot};
use crate::session::{Notice, Screen, SessionController};
use crate::widget::ChallengeWidget;

/// User-facing text for a transient notice.
pub fn notice_text(notice: &Notice) -> String {
  match notice {
    Notice::ChallengeRetry => "Verification failed. Please solve the challenge again.".to_string(),
    Notice::ChallengeExpired => "The challenge expired. Please solve it again.".to_string(),
    Notice::WidgetError(message) => {
      format!("The challenge widget reported an error ({message}). Please try again.")
    }
    Notice::TokenMissing => "Paste the challenge token first, then confirm with 'v'.".to_string(),
    Notice::ShortRateLimit => {
      "Too many requests. Please wait about a minute and try again.".to_string()
    }
    Notice::HardBlock => {
      "Too many requests: you are blocked for 10 minutes.".to_string()
    }
    Notice::FetchFailed => "Failed to fetch a question pair. Please try again.".to_string(),
    Notice::SelectionFailed => "Failed to save your selection. Please try again.".to_string(),
    Notice::FeedbackFailed => "Failed to submit feedback. Please try again.".to_string(),
    Notice::FeedbackSaved => "Feedback saved. Thank you!".to_string(),
    Notice::AllRoundsDone { target } => {
      format!("You have completed all {target} questions of this sitting!")
    }
  }
}

/// Numbered subject list with a mark on already-verified entries.
pub fn subject_list(subjects: &[String], mut is_verified: impl FnMut(&str) -> bool) -> String {
  let mut out = String::new();
  for (i, subject) in subjects.iter().enumerate() {
    let mark = if is_verified(subject) { "  [verified]" } else { "" };
    out.push_str(&format!("  {:>2}. {}{}\n", i + 1, subject, mark));
  }
  out
}

/// One quiz item as a titled block.
pub fn item_block(title: &str, item: &QuizItem) -> String {
  let mut out = String::new();
  out.push_str(&format!("── {title} ──\n"));
  out.push_str(&format!("Q: {}\n", item.question));
  for (i, choice) in item.choices.iter().enumerate() {
    out.push_str(&format!("  {}) {}\n", i + 1, choice));
  }
  if !item.answer.is_empty() {
    out.push_str(&format!("Answer: {}\n", item.answer));
  }
  if !item.explanation.is_empty() {
    out.push_str(&format!("Explanation: {}\n", item.explanation));
  }
  out
}

/// Full text of the current screen, notice included.
pub fn screen_text<A: ComparisonApi, W: ChallengeWidget>(c: &SessionController<A, W>) -> String {
  let mut out = String::new();

  if let Some(notice) = c.notice() {
    out.push_str(&format!("\n!! {}\n", notice_text(notice)));
  }

  match c.screen() {
    Screen::SubjectSelection => {
      out.push_str("\n=== Subjects ===\n");
      out.push_str(&subject_list(c.subjects(), |s| c.is_subject_verified(s)));
      out.push_str("Type a subject number. [h] help  [q] quit\n");
    }
    Screen::AwaitingVerification => {
      let subject = c.pending_subject().unwrap_or("?");
      out.push_str(&format!("\n=== Verification · {subject} ===\n"));
      out.push_str("Solve the challenge in your browser, then paste the token here.\n");
      if c.has_challenge_token() {
        out.push_str("Token received. [v] start  [s] back to subjects\n");
      } else {
        out.push_str("Waiting for a token… (paste it, then [v]; [s] back to subjects)\n");
      }
    }
    Screen::QuestionCountSelection => {
      let subject = c.subject().unwrap_or("?");
      out.push_str(&format!("\n=== {subject} ===\n"));
      let choices = c
        .round_choices()
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" / ");
      out.push_str(&format!("How many questions this sitting? ({choices})\n"));
      out.push_str("Type the number. [s] back to subjects\n");
    }
    Screen::Fetching => {
      out.push_str("\nFetching the next comparison…\n");
    }
    Screen::Comparing => {
      if let Some((a, b)) = c.presented() {
        if let Some(progress) = c.progress() {
          out.push_str(&format!("\nQuestion {}/{}\n", progress.answered, progress.target));
        }
        out.push_str(&item_block("Question A", a));
        out.push('\n');
        out.push_str(&item_block("Question B", b));
        out.push_str("\nWhich question is better? [a] / [b]  ·  [s] back to subjects\n");
      }
    }
    Screen::Reviewing => {
      if let (Some(slot), Some(item)) = (c.picked_slot(), c.picked_item()) {
        if let Some(progress) = c.progress() {
          out.push_str(&format!("\nCompared {}/{}\n", progress.answered, progress.target));
        }
        let title = match slot {
          Slot::A => "Your pick · Question A",
          Slot::B => "Your pick · Question B",
        };
        out.push_str(&item_block(title, item));
        out.push_str("\n[n] next question  [c] back to the comparison  [f <text>] feedback  [s] subjects\n");
      }
    }
    Screen::Exhausted => {
      out.push_str("\nThis subject has no more questions for you.\n");
      out.push_str("[s] back to subjects  [q] quit\n");
    }
  }

  out
}

pub fn print_screen<A: ComparisonApi, W: ChallengeWidget>(c: &SessionController<A, W>) {
  print!("{}", screen_text(c));
  let _ = std::io::stdout().flush();
}

pub fn print_prompt() {
  print!("› ");
  let _ = std::io::stdout().flush();
}

pub fn print_loading() {
  println!("… working");
}

pub fn print_unknown(line: &str) {
  println!("Unrecognized input: {line:?}. Type 'h' for help.");
}

pub fn print_help() {
  println!(
    "\nCommands:\n  \
     number     pick a subject / a round count (on those screens)\n  \
     a, b       prefer question A or B\n  \
     v          confirm verification after pasting the token\n  \
     n          next question\n  \
     c          back to the comparison\n  \
     f <text>   send feedback on this round\n  \
     s          back to the subject list\n  \
     q          quit\n"
  );
}
