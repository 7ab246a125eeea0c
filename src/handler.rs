use crate::{
    app::{App, Focus, PopupState},
    event::Action,
};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

/// Handles a crossterm event and returns an optional Action.
pub fn handle_event(app: &App, event: Event) -> Option<Action> {
    if let Event::Key(key) = event
        && key.kind == KeyEventKind::Press
    {
        return handle_key_press(key, app);
    }
    None
}

fn handle_key_press(key_event: KeyEvent, app: &App) -> Option<Action> {
    if key_event.code == KeyCode::Char('q') {
        return Some(Action::Quit);
    }

    if app.popup != PopupState::None {
        return handle_popup_keys(key_event);
    }

    // Until the startup wallet check resolves only quit is available.
    if app.checking_wallet {
        return None;
    }

    if app.is_connected() {
        handle_connected_keys(key_event, app)
    } else {
        handle_disconnected_keys(key_event)
    }
}

/// Any key dismisses a popup through Esc or Enter.
fn handle_popup_keys(key_event: KeyEvent) -> Option<Action> {
    match key_event.code {
        KeyCode::Esc | KeyCode::Enter => Some(Action::ClearPopup),
        _ => None,
    }
}

fn handle_disconnected_keys(key_event: KeyEvent) -> Option<Action> {
    match key_event.code {
        KeyCode::Char('w') => Some(Action::Connect),
        _ => None,
    }
}

fn handle_connected_keys(key_event: KeyEvent, app: &App) -> Option<Action> {
    match key_event.code {
        KeyCode::Char('d') => Some(Action::Disconnect),
        KeyCode::Char('c') => Some(Action::CopyAddress),
        KeyCode::Char('t') => Some(Action::CopyLastHash),
        KeyCode::Tab => Some(Action::SwitchFocus),
        KeyCode::Enter => Some(Action::SubmitVote),
        KeyCode::Left => Some(Action::SelectPrevOption),
        KeyCode::Right => Some(Action::SelectNextOption),
        _ => match app.focus {
            // In the options grid digits pick an option directly.
            Focus::Options => match key_event.code {
                KeyCode::Char(c @ '1'..='3') => {
                    Some(Action::SelectOption(c as u8 - b'0'))
                }
                _ => None,
            },
            // In the amount field digits and the dot edit the draft.
            Focus::Amount => match key_event.code {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                    Some(Action::AmountInput(c))
                }
                KeyCode::Backspace => Some(Action::AmountBackspace),
                _ => None,
            },
        },
    }
}
