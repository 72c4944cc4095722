//! Key bindings: arrows, vim (h/l) and WASD-style (a/d) all move between lanes.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press. What it does depends on the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Up,
    Down,
    Confirm,
    Pause,
    Home,
    PlayAgain,
    Share,
    Help,
    Quit,
    None,
}

impl Action {
    /// Lane delta for movement actions.
    pub fn lane_delta(&self) -> Option<i32> {
        match self {
            Self::MoveLeft => Some(-1),
            Self::MoveRight => Some(1),
            _ => None,
        }
    }
}

/// Map key event to action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Confirm,
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Esc => Action::Pause,
        KeyCode::Char('m') | KeyCode::Char('M') | KeyCode::Home => Action::Home,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::PlayAgain,
        KeyCode::Char('s') | KeyCode::Char('S') => Action::Share,
        KeyCode::Char('?') => Action::Help,
        _ => Action::None,
    }
}
