/// The snake: body cells, heading, growth target, score and power-up timer.
///
/// Movement model:
///   - `turn()` only buffers a heading; it takes effect on the next `advance()`.
///   - A turn onto the exact reverse of the current heading is ignored.
///   - `advance()` checks walls, then the body *minus its head*, before mutating.
///     A blocked move leaves the heading unchanged too.
///   - The tail is dropped only while the body is longer than `length`.

use std::collections::VecDeque;
use std::time::Duration;

use super::grid::{Bounds, Direction, Pos};

/// Why the game ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameOverReason {
    WallCollision,
    SelfCollision,
    /// Every free cell is taken: nowhere left to put food.
    BoardCleared,
}

impl GameOverReason {
    pub fn label(self) -> &'static str {
        match self {
            GameOverReason::WallCollision => "Wall Collision",
            GameOverReason::SelfCollision => "Self-Collision",
            GameOverReason::BoardCleared => "Board Cleared",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    Moved { head: Pos },
    Blocked(GameOverReason),
}

#[derive(Clone, Debug)]
pub struct Snake {
    /// Head first.
    body: VecDeque<Pos>,
    direction: Direction,
    next_direction: Direction,
    pub length: usize,
    pub score: u32,
    /// `Some(expiry)` while a power-up is active.
    power_up_until: Option<Duration>,
}

impl Snake {
    pub fn new(start: Pos) -> Self {
        let mut body = VecDeque::with_capacity(64);
        body.push_back(start);
        Snake {
            body,
            direction: Direction::Right,
            next_direction: Direction::Right,
            length: 1,
            score: 0,
            power_up_until: None,
        }
    }

    /// Build a snake from an explicit head-first body. Length is the body length.
    #[cfg(test)]
    pub fn from_body(cells: &[Pos], direction: Direction) -> Self {
        Snake {
            body: cells.iter().copied().collect(),
            direction,
            next_direction: direction,
            length: cells.len(),
            score: 0,
            power_up_until: None,
        }
    }

    pub fn head(&self) -> Pos {
        self.body[0]
    }

    pub fn body(&self) -> &VecDeque<Pos> {
        &self.body
    }

    pub fn occupies(&self, p: Pos) -> bool {
        self.body.contains(&p)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn turn(&mut self, dir: Direction) {
        if dir == self.direction.opposite() {
            return;
        }
        self.next_direction = dir;
    }

    pub fn advance(&mut self, bounds: Bounds, now: Duration) -> MoveOutcome {
        let dir = self.next_direction;
        let new_head = self.head().step(dir);

        if !bounds.contains(new_head) {
            return MoveOutcome::Blocked(GameOverReason::WallCollision);
        }
        if self.body.iter().skip(1).any(|&c| c == new_head) {
            return MoveOutcome::Blocked(GameOverReason::SelfCollision);
        }

        self.direction = dir;

        if let Some(until) = self.power_up_until {
            if now >= until {
                self.power_up_until = None;
            }
        }

        self.body.push_front(new_head);
        while self.body.len() > self.length {
            self.body.pop_back();
        }

        MoveOutcome::Moved { head: new_head }
    }

    pub fn grow(&mut self, amount: usize) {
        self.length += amount;
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Last write wins: re-activating replaces the expiry.
    pub fn activate_power_up(&mut self, now: Duration, duration: Duration) {
        self.power_up_until = Some(now + duration);
    }

    pub fn power_up_active(&self) -> bool {
        self.power_up_until.is_some()
    }

    pub fn power_up_until(&self) -> Option<Duration> {
        self.power_up_until
    }

    pub fn reset(&mut self, start: Pos) {
        *self = Snake::new(start);
    }
}
