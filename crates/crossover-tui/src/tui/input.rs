// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app orchestrator, or into local ViewState mutations (focus movement,
// selector stepping).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::protocol::UserCommand;
use super::{Focus, Phase, Slot, ViewState};

/// Shown when Compare is pressed before both sides have a pitcher and date.
pub const INCOMPLETE_SELECTION: &str = "Selection incomplete: choose a pitcher and date for A and B";

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator (Compare, Quit). Returns `None` when the key press was
/// handled locally by mutating `ViewState`.
pub fn handle_key(
    key_event: KeyEvent,
    view_state: &mut ViewState,
) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress; ignoring
    // non-Press events prevents double-processing.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode (escape hatch)
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    // Quit confirmation mode: only y/q confirm, n/Esc cancel, everything else blocked
    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    match key_event.code {
        // Focus movement
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
            view_state.focus = view_state.focus.next();
            None
        }
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
            view_state.focus = view_state.focus.prev();
            None
        }

        // Selector stepping
        KeyCode::Up | KeyCode::Char('k') => {
            step_focused(view_state, -1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            step_focused(view_state, 1);
            None
        }

        KeyCode::Enter | KeyCode::Char('c') => request_compare(view_state),

        // Quit: enter confirmation mode instead of quitting immediately
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }

        _ => None,
    }
}

/// Handle key events while in quit confirmation mode.
///
/// In quit confirmation mode:
/// - `y` or `q` confirms quit (sends UserCommand::Quit)
/// - `n` or `Esc` cancels (returns to normal mode)
/// - All other keys are blocked (no-op)
fn handle_confirm_quit(
    key_event: KeyEvent,
    view_state: &mut ViewState,
) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None, // Block all other input
    }
}

fn step_focused(view_state: &mut ViewState, delta: isize) {
    match view_state.focus {
        Focus::PitcherA => view_state.step_pitcher(Slot::A, delta),
        Focus::DateA => view_state.step_date(Slot::A, delta),
        Focus::PitcherB => view_state.step_pitcher(Slot::B, delta),
        Focus::DateB => view_state.step_date(Slot::B, delta),
        Focus::Compare => {}
    }
}

/// Build a Compare command from the current selection, or flag it incomplete.
fn request_compare(view_state: &mut ViewState) -> Option<UserCommand> {
    match (view_state.selection(Slot::A), view_state.selection(Slot::B)) {
        (Some(a), Some(b)) => {
            view_state.notice = None;
            view_state.phase = Phase::Computing;
            Some(UserCommand::Compare { a, b })
        }
        _ => {
            view_state.notice = Some(INCOMPLETE_SELECTION.to_string());
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
