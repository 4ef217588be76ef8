/// WorldState: the complete snapshot of a running session.
///
/// ## Mode
///
/// `Mode` is a single tagged enum, so "paused and game over at once" cannot
/// be expressed. The game-over reason lives inside `Mode::GameOver` and
/// disappears on restart.
///
/// ## High score
///
/// Injected at construction and read back with `high_score()`. It outlives
/// restarts but not the `WorldState` itself; the caller decides how long
/// it lives.

use std::time::Duration;

use rand::rngs::StdRng;

use crate::config::RulesConfig;
use crate::domain::food::Food;
use crate::domain::grid::{Bounds, Pos};
use crate::domain::snake::{GameOverReason, Snake};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    StartMenu,
    Playing,
    Paused,
    GameOver { reason: GameOverReason },
}

pub struct WorldState {
    pub bounds: Bounds,
    pub rules: RulesConfig,
    pub mode: Mode,

    // ── Entities ──
    pub snake: Snake,
    pub food: Food,

    // ── Progression ──
    pub level: u32,
    /// When the last level-up happened; drives the transient banner.
    pub level_up_at: Option<Duration>,
    pub(super) high_score: u32,

    // ── Meta ──
    pub tick: u64,
    pub(super) rng: StdRng,
}

impl WorldState {
    pub fn new(bounds: Bounds, rules: RulesConfig, high_score: u32, rng: StdRng, now: Duration) -> Self {
        let mut world = WorldState {
            bounds,
            rules,
            mode: Mode::StartMenu,
            snake: Snake::new(bounds.center()),
            food: Food::new(),
            level: 1,
            level_up_at: None,
            high_score,
            tick: 0,
            rng,
        };
        if world.respawn_food(now).is_none() {
            log::warn!("no free cell for food on a {}x{} board", bounds.width, bounds.height);
        }
        world
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        match self.mode {
            Mode::GameOver { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn level_for_score(&self, score: u32) -> u32 {
        1 + score / self.rules.points_per_level
    }

    pub fn level_banner_visible(&self, now: Duration) -> bool {
        self.level_up_at
            .map_or(false, |t| now.saturating_sub(t) < self.rules.level_banner)
    }

    /// Ticks per second: speeds up with score, doubled while powered up.
    pub fn tick_rate(&self) -> u32 {
        let base = self.rules.base_fps + self.snake.score / self.rules.points_per_level;
        if self.snake.power_up_active() { base * 2 } else { base }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate().max(1)
    }

    /// Re-roll the food onto a free cell. `None` means the board is full.
    pub fn respawn_food(&mut self, now: Duration) -> Option<Pos> {
        let policy = self.rules.spawn_policy();
        let snake = &self.snake;
        self.food.respawn(
            self.bounds,
            |p| snake.occupies(p),
            snake.score,
            &policy,
            now,
            &mut self.rng,
        )
    }
}
