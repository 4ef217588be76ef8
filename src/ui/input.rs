/// Keyboard input: drains crossterm's event queue once per tick and maps
/// key presses onto simulation `Command`s, preserving their order.
///
/// Only Press/Repeat events count. Release events (reported by terminals with
/// keyboard enhancement) are dropped.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::grid::Direction;
use crate::sim::event::Command;
use crate::sim::world::Mode;

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Key presses collected during the most recent drain, oldest first.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { raw_events: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per tick, before the simulation step.
    pub fn drain_events(&mut self) {
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    self.raw_events.push(key);
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("terminal event read failed: {e}");
                    break;
                }
            }
        }
    }

    /// Commands for this tick. `mode` decides what the confirm key means.
    pub fn commands(&self, mode: Mode) -> Vec<Command> {
        self.raw_events.iter().filter_map(|k| key_to_command(k, mode)).collect()
    }
}

fn key_to_command(key: &KeyEvent, mode: Mode) -> Option<Command> {
    let code = key.code;

    if key.modifiers.contains(KeyModifiers::CONTROL)
        && (code == KeyCode::Char('c') || code == KeyCode::Char('C'))
    {
        return Some(Command::Quit);
    }

    if KEYS_QUIT.contains(&code) {
        Some(Command::Quit)
    } else if KEYS_UP.contains(&code) {
        Some(Command::Turn(Direction::Up))
    } else if KEYS_DOWN.contains(&code) {
        Some(Command::Turn(Direction::Down))
    } else if KEYS_LEFT.contains(&code) {
        Some(Command::Turn(Direction::Left))
    } else if KEYS_RIGHT.contains(&code) {
        Some(Command::Turn(Direction::Right))
    } else if KEYS_PAUSE.contains(&code) {
        Some(Command::TogglePause)
    } else if KEYS_RESTART.contains(&code) {
        Some(Command::Restart)
    } else if KEYS_CONFIRM.contains(&code) {
        Some(confirm_command(mode))
    } else {
        None
    }
}

/// Space/Enter starts from the menu and replays after game over.
pub fn confirm_command(mode: Mode) -> Command {
    match mode {
        Mode::GameOver { .. } => Command::Restart,
        _ => Command::ToggleStart,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snake::GameOverReason;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_turn() {
        assert_eq!(key_to_command(&press(KeyCode::Up), Mode::Playing), Some(Command::Turn(Direction::Up)));
        assert_eq!(key_to_command(&press(KeyCode::Char('a')), Mode::Playing), Some(Command::Turn(Direction::Left)));
        assert_eq!(key_to_command(&press(KeyCode::Char('S')), Mode::Playing), Some(Command::Turn(Direction::Down)));
        assert_eq!(key_to_command(&press(KeyCode::Right), Mode::Playing), Some(Command::Turn(Direction::Right)));
    }

    #[test]
    fn confirm_depends_on_mode() {
        let space = press(KeyCode::Char(' '));
        assert_eq!(key_to_command(&space, Mode::StartMenu), Some(Command::ToggleStart));
        let over = Mode::GameOver { reason: GameOverReason::SelfCollision };
        assert_eq!(key_to_command(&space, over), Some(Command::Restart));
    }

    #[test]
    fn quit_keys() {
        assert_eq!(key_to_command(&press(KeyCode::Esc), Mode::Paused), Some(Command::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_command(&ctrl_c, Mode::Playing), Some(Command::Quit));
        // Plain 'c' is not bound
        assert_eq!(key_to_command(&press(KeyCode::Char('c')), Mode::Playing), None);
    }

    #[test]
    fn commands_keep_key_order() {
        let mut input = InputState::new();
        input.raw_events = vec![
            press(KeyCode::Up),
            press(KeyCode::Char('x')),
            press(KeyCode::Char('p')),
        ];
        assert_eq!(
            input.commands(Mode::Playing),
            vec![Command::Turn(Direction::Up), Command::TogglePause]
        );
    }
}
