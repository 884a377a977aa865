//! Bot-check widget seam.
//!
//! The challenge itself is an external collaborator: it hands the client a
//! token (or reports expiry/failure) and can be told to reset so the next
//! proof starts from scratch. The session controller only ever talks to
//! the trait, which keeps the whole verification flow testable with a fake.

use tracing::debug;

/// What the widget can tell the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WidgetEvent {
  TokenReceived(String),
  Expired,
  Errored(String),
}

/// Controller-facing surface of the widget. Reset must be idempotent;
/// the controller may call it after every consumed or invalidated token.
pub trait ChallengeWidget: Send {
  fn reset(&mut self);
}

/// Terminal rendition of the widget: the user completes the challenge
/// out of band and pastes the resulting token as a line of input. An
/// empty paste reads as expiry.
#[derive(Debug, Default)]
pub struct PromptWidget;

impl PromptWidget {
  /// Interpret one pasted line as a widget event.
  pub fn event_from_line(line: &str) -> WidgetEvent {
    let token = line.trim();
    if token.is_empty() {
      WidgetEvent::Expired
    } else {
      WidgetEvent::TokenReceived(token.to_string())
    }
  }
}

impl ChallengeWidget for PromptWidget {
  fn reset(&mut self) {
    // Nothing to tear down in the paste flow; the prompt itself is
    // re-rendered from controller state. Leave a trace for debugging.
    debug!(target: "session", "challenge widget reset; a fresh proof is required");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pasted_line_becomes_a_token() {
    assert_eq!(
      PromptWidget::event_from_line("  03AGdBq27x  "),
      WidgetEvent::TokenReceived("03AGdBq27x".to_string())
    );
  }

  #[test]
  fn empty_paste_reads_as_expiry() {
    assert_eq!(PromptWidget::event_from_line("   "), WidgetEvent::Expired);
    assert_eq!(PromptWidget::event_from_line(""), WidgetEvent::Expired);
  }
}
