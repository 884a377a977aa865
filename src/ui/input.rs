//! Line-to-command parsing for the terminal front.
//!
//! Parsing depends on the current screen: a bare number means a subject on
//! the list screen but a round count on the count screen, and on the
//! verification screen any non-command line is treated as a pasted token.

use crate::domain::Slot;
use crate::session::Screen;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
  PickSubject(usize),
  WidgetLine(String),
  ConfirmVerification,
  PickCount(u32),
  PickSlot(Slot),
  Feedback(String),
  NextRound,
  BackToComparison,
  BackToSubjects,
  Help,
  Quit,
  Unknown(String),
}

pub fn parse(line: &str, screen: Screen) -> Command {
  let trimmed = line.trim();

  match trimmed {
    "q" | "quit" => return Command::Quit,
    "h" | "help" => return Command::Help,
    "s" | "subjects" => return Command::BackToSubjects,
    _ => {}
  }

  match screen {
    Screen::SubjectSelection => {
      if let Ok(n) = trimmed.parse::<usize>() {
        return Command::PickSubject(n);
      }
      Command::Unknown(trimmed.to_string())
    }
    Screen::AwaitingVerification => {
      if trimmed == "v" {
        return Command::ConfirmVerification;
      }
      // Anything else, including an empty line, goes to the widget.
      Command::WidgetLine(line.to_string())
    }
    Screen::QuestionCountSelection => {
      if let Ok(n) = trimmed.parse::<u32>() {
        return Command::PickCount(n);
      }
      Command::Unknown(trimmed.to_string())
    }
    Screen::Comparing => match trimmed {
      "a" => Command::PickSlot(Slot::A),
      "b" => Command::PickSlot(Slot::B),
      _ => Command::Unknown(trimmed.to_string()),
    },
    Screen::Reviewing => {
      if trimmed == "n" || trimmed == "next" {
        return Command::NextRound;
      }
      if trimmed == "c" {
        return Command::BackToComparison;
      }
      if let Some(rest) = trimmed.strip_prefix("f ") {
        let text = rest.trim();
        if !text.is_empty() {
          return Command::Feedback(text.to_string());
        }
      }
      Command::Unknown(trimmed.to_string())
    }
    Screen::Fetching | Screen::Exhausted => Command::Unknown(trimmed.to_string()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numbers_depend_on_the_screen() {
    assert_eq!(parse("3", Screen::SubjectSelection), Command::PickSubject(3));
    assert_eq!(parse(" 10 ", Screen::QuestionCountSelection), Command::PickCount(10));
    assert_eq!(
      parse("3", Screen::Comparing),
      Command::Unknown("3".to_string())
    );
  }

  #[test]
  fn verification_screen_treats_lines_as_tokens() {
    assert_eq!(
      parse("03AGdBq27x", Screen::AwaitingVerification),
      Command::WidgetLine("03AGdBq27x".to_string())
    );
    assert_eq!(parse("v", Screen::AwaitingVerification), Command::ConfirmVerification);
    assert_eq!(
      parse("", Screen::AwaitingVerification),
      Command::WidgetLine(String::new())
    );
  }

  #[test]
  fn globals_win_everywhere() {
    assert_eq!(parse("q", Screen::Comparing), Command::Quit);
    assert_eq!(parse("s", Screen::Exhausted), Command::BackToSubjects);
    assert_eq!(parse("help", Screen::Reviewing), Command::Help);
  }

  #[test]
  fn review_commands() {
    assert_eq!(parse("a", Screen::Comparing), Command::PickSlot(Slot::A));
    assert_eq!(parse("n", Screen::Reviewing), Command::NextRound);
    assert_eq!(parse("c", Screen::Reviewing), Command::BackToComparison);
    assert_eq!(
      parse("f the left one was clearer", Screen::Reviewing),
      Command::Feedback("the left one was clearer".to_string())
    );
    assert_eq!(parse("f ", Screen::Reviewing), Command::Unknown("f".to_string()));
  }
}
