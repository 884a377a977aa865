//! Terminal front: a read-render loop over stdin lines.
//!
//! The loop owns the session controller. Every iteration renders the
//! current screen, reads one line, parses it in the context of that screen
//! and hands the resulting command to the controller. Backend calls finish
//! before the next line is read, so a second operation cannot start while
//! one is in flight.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::api::ComparisonApi;
use crate::session::SessionController;
use crate::widget::PromptWidget;

pub mod input;
pub mod render;

use input::Command;

/// Run the interactive loop until the user quits, input closes, or
/// Ctrl-C arrives.
pub async fn run<A: ComparisonApi>(
    mut controller: SessionController<A, PromptWidget>,
) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    render::print_screen(&controller);
    loop {
        render::print_prompt();
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!(target: "quizarena_client", "Interrupted; exiting");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!(target: "quizarena_client", "Input closed; exiting");
                    break;
                };
                let command = input::parse(&line, controller.screen());
                if command == Command::Quit {
                    break;
                }
                dispatch(&mut controller, command).await;
                render::print_screen(&controller);
            }
        }
    }
    Ok(())
}

async fn dispatch<A: ComparisonApi>(
    controller: &mut SessionController<A, PromptWidget>,
    command: Command,
) {
    match command {
        Command::PickSubject(n) => {
            let name = controller.subjects().get(n.wrapping_sub(1)).cloned();
            match name {
                Some(name) => controller.select_subject(&name),
                None => render::print_unknown(&n.to_string()),
            }
        }
        Command::WidgetLine(line) => {
            controller.handle_widget_event(PromptWidget::event_from_line(&line));
        }
        Command::ConfirmVerification => controller.confirm_verification(),
        Command::PickCount(count) => {
            render::print_loading();
            controller.choose_round_count(count).await;
        }
        Command::PickSlot(slot) => {
            render::print_loading();
            controller.pick_slot(slot).await;
        }
        Command::Feedback(text) => {
            render::print_loading();
            controller.submit_feedback(&text).await;
        }
        Command::NextRound => {
            render::print_loading();
            controller.next_round().await;
        }
        Command::BackToComparison => controller.back_to_comparison(),
        Command::BackToSubjects => controller.back_to_subjects(),
        Command::Help => render::print_help(),
        Command::Unknown(line) => render::print_unknown(&line),
        Command::Quit => {}
    }
}
