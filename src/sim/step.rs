/// The step function and command handling.
///
/// Per-tick processing order while Playing:
///   1. Advance the snake (its buffered turn is applied first)
///   2. On collision: game over, stop
///   3. Food pickup: grow, score, power-up, respawn
///   4. Level progression
///
/// Commands (mode transitions, turns) are applied before the step, in the
/// order they were read. Everything worth logging leaves as a `GameEvent`.

use std::time::Duration;

use crate::domain::food::FoodKind;
use crate::domain::grid::Pos;
use crate::domain::snake::{GameOverReason, MoveOutcome};
use super::event::{Command, GameEvent};
use super::world::{Mode, WorldState};

// ══════════════════════════════════════════════════════════════
// Commands
// ══════════════════════════════════════════════════════════════

/// Apply one command. Returns `true` if the game should quit.
pub fn handle_command(world: &mut WorldState, cmd: Command, now: Duration, events: &mut Vec<GameEvent>) -> bool {
    match (cmd, world.mode) {
        (Command::Quit, _) => return true,

        (Command::ToggleStart, Mode::StartMenu) => {
            world.mode = Mode::Playing;
            events.push(GameEvent::Started);
        }

        (Command::TogglePause, Mode::Playing) => {
            world.mode = Mode::Paused;
            events.push(GameEvent::Paused);
        }
        (Command::TogglePause, Mode::Paused) => {
            world.mode = Mode::Playing;
            events.push(GameEvent::Resumed);
        }

        (Command::Turn(dir), Mode::Playing) => world.snake.turn(dir),

        (Command::Restart, Mode::GameOver { .. }) => {
            restart(world, now);
            events.push(GameEvent::Restarted);
        }

        _ => {}
    }
    false
}

/// New round: fresh snake and food, level 1. High score carries over.
pub fn restart(world: &mut WorldState, now: Duration) {
    world.snake.reset(world.bounds.center());
    if world.respawn_food(now).is_none() {
        log::warn!("no free cell for food after restart");
    }
    world.level = 1;
    world.level_up_at = None;
    world.tick = 0;
    world.mode = Mode::Playing;
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, now: Duration) -> Vec<GameEvent> {
    if world.mode != Mode::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    let head = match world.snake.advance(world.bounds, now) {
        MoveOutcome::Moved { head } => head,
        MoveOutcome::Blocked(reason) => {
            end_game(world, reason, &mut events);
            return events;
        }
    };

    let board_full = resolve_food(world, head, now, &mut events);
    resolve_level(world, now, &mut events);
    if board_full {
        end_game(world, GameOverReason::BoardCleared, &mut events);
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Food
// ══════════════════════════════════════════════════════════════

/// Returns `true` if the food was eaten and there is nowhere left to put it.
fn resolve_food(world: &mut WorldState, head: Pos, now: Duration, events: &mut Vec<GameEvent>) -> bool {
    if head != world.food.position { return false; }

    let kind = world.food.kind;
    let points = world.food.score_value();
    world.snake.grow(1);
    world.snake.add_score(points);
    events.push(GameEvent::FoodEaten { kind, at: head, points });

    if kind == FoodKind::PowerUp {
        world.snake.activate_power_up(now, world.rules.power_up_duration);
        let until = now + world.rules.power_up_duration;
        events.push(GameEvent::PowerUpActivated { until });
    }

    world.respawn_food(now).is_none()
}

// ══════════════════════════════════════════════════════════════
// Level progression
// ══════════════════════════════════════════════════════════════

fn resolve_level(world: &mut WorldState, now: Duration, events: &mut Vec<GameEvent>) {
    let new_level = world.level_for_score(world.snake.score);
    if new_level > world.level {
        world.level = new_level;
        world.level_up_at = Some(now);
        events.push(GameEvent::LevelUp { level: new_level });
    }
}

// ══════════════════════════════════════════════════════════════
// Game over
// ══════════════════════════════════════════════════════════════

fn end_game(world: &mut WorldState, reason: GameOverReason, events: &mut Vec<GameEvent>) {
    let score = world.snake.score;
    world.high_score = world.high_score.max(score);
    world.mode = Mode::GameOver { reason };
    events.push(GameEvent::GameOver { reason, score, high_score: world.high_score });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::config::RulesConfig;
    use crate::domain::grid::{Bounds, Direction};
    use crate::domain::snake::Snake;

    const T0: Duration = Duration::ZERO;

    fn playing_world() -> WorldState {
        let mut w = WorldState::new(
            Bounds::new(10, 10),
            RulesConfig::default(),
            0,
            StdRng::seed_from_u64(9),
            T0,
        );
        let mut ev = vec![];
        handle_command(&mut w, Command::ToggleStart, T0, &mut ev);
        // Park the food out of the way unless a test places it
        w.food.position = Pos::new(0, 9);
        w
    }

    fn place_food(w: &mut WorldState, at: Pos, kind: FoodKind) {
        w.food.position = at;
        w.food.kind = kind;
    }

    // ── Mode transitions ──

    #[test]
    fn start_menu_to_playing() {
        let mut w = WorldState::new(Bounds::new(10, 10), RulesConfig::default(), 0, StdRng::seed_from_u64(1), T0);
        let mut ev = vec![];
        // Pause and restart are ignored in the menu
        assert!(!handle_command(&mut w, Command::TogglePause, T0, &mut ev));
        assert!(!handle_command(&mut w, Command::Restart, T0, &mut ev));
        assert_eq!(w.mode, Mode::StartMenu);
        assert!(ev.is_empty());

        handle_command(&mut w, Command::ToggleStart, T0, &mut ev);
        assert_eq!(w.mode, Mode::Playing);
        assert_eq!(ev, vec![GameEvent::Started]);
    }

    #[test]
    fn no_movement_outside_playing() {
        let mut w = WorldState::new(Bounds::new(10, 10), RulesConfig::default(), 0, StdRng::seed_from_u64(1), T0);
        let head = w.snake.head();
        assert!(step(&mut w, T0).is_empty());
        assert_eq!(w.snake.head(), head);
        assert_eq!(w.tick, 0);
    }

    #[test]
    fn pause_toggles_and_freezes() {
        let mut w = playing_world();
        let mut ev = vec![];
        handle_command(&mut w, Command::TogglePause, T0, &mut ev);
        assert_eq!(w.mode, Mode::Paused);

        let head = w.snake.head();
        assert!(step(&mut w, T0).is_empty());
        assert_eq!(w.snake.head(), head);

        // Turns are not buffered while paused
        handle_command(&mut w, Command::Turn(Direction::Down), T0, &mut ev);
        handle_command(&mut w, Command::TogglePause, T0, &mut ev);
        assert_eq!(w.mode, Mode::Playing);
        assert_eq!(ev, vec![GameEvent::Paused, GameEvent::Resumed]);

        step(&mut w, T0);
        assert_eq!(w.snake.head(), head.step(Direction::Right));
    }

    #[test]
    fn quit_from_any_mode() {
        let mut w = playing_world();
        let mut ev = vec![];
        assert!(handle_command(&mut w, Command::Quit, T0, &mut ev));
        w.mode = Mode::Paused;
        assert!(handle_command(&mut w, Command::Quit, T0, &mut ev));
        w.mode = Mode::GameOver { reason: GameOverReason::WallCollision };
        assert!(handle_command(&mut w, Command::Quit, T0, &mut ev));
        assert!(ev.is_empty());
    }

    #[test]
    fn turn_command_steers_snake() {
        let mut w = playing_world();
        let mut ev = vec![];
        let head = w.snake.head();
        handle_command(&mut w, Command::Turn(Direction::Up), T0, &mut ev);
        step(&mut w, T0);
        assert_eq!(w.snake.head(), head.step(Direction::Up));
    }

    // ── Collision → game over ──

    #[test]
    fn wall_collision_ends_game_and_records_high_score() {
        let mut w = playing_world();
        w.high_score = 30;
        w.snake = Snake::from_body(&[Pos::new(9, 5)], Direction::Right);
        w.snake.add_score(80);

        let ev = step(&mut w, T0);
        assert_eq!(w.mode, Mode::GameOver { reason: GameOverReason::WallCollision });
        assert_eq!(w.high_score(), 80);
        assert_eq!(
            ev,
            vec![GameEvent::GameOver { reason: GameOverReason::WallCollision, score: 80, high_score: 80 }]
        );
    }

    #[test]
    fn lower_score_keeps_high_score() {
        let mut w = playing_world();
        w.high_score = 500;
        w.snake = Snake::from_body(&[Pos::new(5, 5), Pos::new(4, 5), Pos::new(3, 5)], Direction::Left);
        step(&mut w, T0);
        assert_eq!(w.game_over_reason(), Some(GameOverReason::SelfCollision));
        assert_eq!(w.high_score(), 500);
    }

    #[test]
    fn collision_skips_food_check() {
        let mut w = playing_world();
        w.snake = Snake::from_body(&[Pos::new(9, 5)], Direction::Right);
        place_food(&mut w, Pos::new(9, 5), FoodKind::Rare);
        step(&mut w, T0);
        assert_eq!(w.snake.score, 0);
    }

    #[test]
    fn restart_resets_round_but_not_high_score() {
        let mut w = playing_world();
        w.snake = Snake::from_body(&[Pos::new(9, 5)], Direction::Right);
        w.snake.add_score(120);
        w.level = 3;
        w.level_up_at = Some(T0);
        step(&mut w, T0);
        assert_eq!(w.tick, 1);

        let mut ev = vec![];
        let later = Duration::from_secs(4);
        handle_command(&mut w, Command::Restart, later, &mut ev);
        assert_eq!(ev, vec![GameEvent::Restarted]);
        assert_eq!(w.mode, Mode::Playing);
        assert_eq!(w.game_over_reason(), None);
        assert_eq!(w.snake.score, 0);
        assert_eq!(w.snake.body().len(), 1);
        assert_eq!(w.snake.head(), Pos::new(5, 5));
        assert_eq!(w.level, 1);
        assert_eq!(w.level_up_at, None);
        assert_eq!(w.tick, 0);
        assert_eq!(w.high_score(), 120);
        assert!(!w.snake.occupies(w.food.position));
        assert_eq!(w.food.spawned_at, later);
    }

    #[test]
    fn restart_on_smallest_board_puts_food_on_free_cell() {
        let mut w = WorldState::new(Bounds::new(1, 1), RulesConfig::default(), 0, StdRng::seed_from_u64(4), T0);
        let mut ev = vec![];
        handle_command(&mut w, Command::ToggleStart, T0, &mut ev);
        // Snake starts at (1, 0) heading right: straight into the wall
        step(&mut w, T0);
        assert_eq!(w.game_over_reason(), Some(GameOverReason::WallCollision));

        handle_command(&mut w, Command::Restart, T0, &mut ev);
        assert_eq!(w.snake.head(), Pos::new(1, 0));
        assert_eq!(w.food.position, Pos::new(0, 0));
    }

    // ── Food & scoring ──

    #[test]
    fn eating_basic_food_scores_ten() {
        let mut w = playing_world();
        place_food(&mut w, Pos::new(6, 5), FoodKind::Basic);
        let ev = step(&mut w, T0);
        assert_eq!(w.snake.score, 10);
        assert_eq!(w.snake.length, 2);
        assert_eq!(ev, vec![GameEvent::FoodEaten { kind: FoodKind::Basic, at: Pos::new(6, 5), points: 10 }]);
        assert!(!w.snake.occupies(w.food.position));

        // Body catches up with the new length on the following tick
        w.food.position = Pos::new(0, 0);
        step(&mut w, T0);
        assert_eq!(w.snake.body().len(), 2);
    }

    #[test]
    fn rare_food_crosses_level_boundary() {
        let mut w = playing_world();
        w.snake.add_score(45);
        place_food(&mut w, Pos::new(6, 5), FoodKind::Rare);
        let now = Duration::from_secs(12);

        let ev = step(&mut w, now);
        assert_eq!(w.snake.score, 75);
        assert_eq!(w.level, 2);
        assert_eq!(w.level_up_at, Some(now));
        assert!(ev.contains(&GameEvent::LevelUp { level: 2 }));
        assert!(w.level_banner_visible(now + Duration::from_millis(500)));
    }

    #[test]
    fn level_tracks_score_after_every_update() {
        let mut w = playing_world();
        let kinds = [FoodKind::Rare, FoodKind::Special, FoodKind::Basic, FoodKind::Rare, FoodKind::PowerUp];
        let mut last_level = w.level;
        // Head north from (5,5): five free cells before the wall
        w.snake.turn(Direction::Up);
        for kind in kinds {
            let next = w.snake.head().step(Direction::Up);
            place_food(&mut w, next, kind);
            step(&mut w, T0);
            assert_eq!(w.snake.head(), next);
            assert_eq!(w.level, 1 + w.snake.score / 50);
            assert!(w.level >= last_level);
            last_level = w.level;
        }
        assert_eq!(w.snake.score, 140);
    }

    #[test]
    fn power_up_food_activates_timer() {
        let mut w = playing_world();
        w.snake.add_score(50);
        w.level = 2;
        place_food(&mut w, Pos::new(6, 5), FoodKind::PowerUp);
        let t = Duration::from_secs(20);

        let ev = step(&mut w, t);
        assert_eq!(w.snake.score, 100);
        assert!(w.snake.power_up_active());
        assert!(ev.contains(&GameEvent::PowerUpActivated { until: t + Duration::from_secs(5) }));
        assert_eq!(w.tick_rate(), 24);

        w.food.position = Pos::new(0, 0);
        step(&mut w, t + Duration::from_millis(4900));
        assert!(w.snake.power_up_active());
        step(&mut w, t + Duration::from_secs(5));
        assert!(!w.snake.power_up_active());
        assert_eq!(w.tick_rate(), 12);
    }

    #[test]
    fn filling_the_board_is_a_win() {
        let mut w = WorldState::new(Bounds::new(2, 1), RulesConfig::default(), 0, StdRng::seed_from_u64(2), T0);
        let mut ev = vec![];
        handle_command(&mut w, Command::ToggleStart, T0, &mut ev);
        w.snake = Snake::from_body(&[Pos::new(0, 0)], Direction::Right);
        w.snake.grow(1);
        place_food(&mut w, Pos::new(1, 0), FoodKind::Basic);

        let ev = step(&mut w, T0);
        assert_eq!(w.game_over_reason(), Some(GameOverReason::BoardCleared));
        assert!(matches!(ev.last(), Some(GameEvent::GameOver { reason: GameOverReason::BoardCleared, .. })));
    }
}
