/// Commands flowing into the simulation and events flowing out of it.
/// The presentation layer turns events into sounds and log lines.

use std::time::Duration;

use crate::domain::food::FoodKind;
use crate::domain::grid::{Direction, Pos};
use crate::domain::snake::GameOverReason;

/// One discrete input, already decoupled from key bindings.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Quit,
    Turn(Direction),
    ToggleStart,
    TogglePause,
    Restart,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Started,
    Paused,
    Resumed,
    FoodEaten { kind: FoodKind, at: Pos, points: u32 },
    PowerUpActivated { until: Duration },
    LevelUp { level: u32 },
    GameOver { reason: GameOverReason, score: u32, high_score: u32 },
    Restarted,
}
