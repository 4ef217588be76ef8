/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;

use rand::rngs::StdRng;
use rand::SeedableRng;
use simplelog::WriteLogger;

use config::GameConfig;
use domain::food::FoodKind;
use domain::grid::Bounds;
use error::GameError;
use sim::clock::{Clock, SystemClock, TickPacer};
use sim::event::GameEvent;
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::{Sound, SoundEngine};

fn main() {
    let config = GameConfig::load();

    if let Err(e) = init_logging(&config) {
        eprintln!("Warning: {e}");
    }
    log::info!("snake-arcade {} starting", env!("CARGO_PKG_VERSION"));

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut clock = SystemClock::new();
    let bounds = resolve_bounds(&config, renderer.fit_grid());
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut world = WorldState::new(bounds, config.rules.clone(), 0, rng, clock.now());

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &mut clock, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop aborted: {e}");
        eprintln!("Game error: {e}");
    }

    log::info!("session over, high score {}", world.high_score());
    println!();
    println!("Thanks for playing Snake Arcade!");
    println!("High Score: {}", world.high_score());
}

fn init_logging(config: &GameConfig) -> Result<(), GameError> {
    let path = match &config.log_file {
        Some(p) => p,
        None => return Ok(()),
    };
    let file = File::create(path)
        .map_err(|source| GameError::LogFile { path: path.clone(), source })?;
    WriteLogger::init(config.log_level, simplelog::Config::default(), file)?;
    Ok(())
}

/// Configured size, clamped to what the terminal can show. Zero = fit.
fn resolve_bounds(config: &GameConfig, fit: Bounds) -> Bounds {
    let want_w = if config.grid.width == 0 { fit.width } else { config.grid.width as i32 };
    let want_h = if config.grid.height == 0 { fit.height } else { config.grid.height as i32 };
    if want_w > fit.width || want_h > fit.height {
        log::warn!(
            "grid {}x{} does not fit the terminal, clamping to {}x{}",
            want_w, want_h, fit.width, fit.height,
        );
    }
    Bounds::new(want_w.min(fit.width), want_h.min(fit.height))
}

/// One iteration = poll input → apply commands → step → render → sleep.
fn game_loop<C: Clock>(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    clock: &mut C,
    config: &GameConfig,
) -> Result<(), GameError> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        log::info!("gamepad detected");
    }
    let mut pacer = TickPacer::new(clock.now());

    loop {
        kb.drain_events();
        gp.update();

        let now = clock.now();
        let mut events = Vec::new();

        let commands: Vec<_> = kb.commands(world.mode)
            .into_iter()
            .chain(gp.commands(world.mode))
            .collect();
        for cmd in commands {
            if step::handle_command(world, cmd, now, &mut events) {
                return Ok(());
            }
        }

        events.extend(step::step(world, now));
        log_events(world, &events);
        process_sound_events(sound, &events);

        renderer.render(world, now)?;
        pacer.wait(clock, world.tick_interval());
    }
}

fn log_events(world: &WorldState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::Started => {
                log::info!("game started on {}x{} grid", world.bounds.width, world.bounds.height);
            }
            GameEvent::Paused => log::debug!("paused at tick {}", world.tick),
            GameEvent::Resumed => log::debug!("resumed at tick {}", world.tick),
            GameEvent::FoodEaten { kind, at, points } => {
                log::debug!("tick {}: ate {:?} at ({}, {}) for {} points", world.tick, kind, at.x, at.y, points);
            }
            GameEvent::PowerUpActivated { until } => {
                log::debug!("power-up active until {:.1}s", until.as_secs_f32());
            }
            GameEvent::LevelUp { level } => {
                log::debug!("level up: {} (score {})", level, world.snake.score);
            }
            GameEvent::GameOver { reason, score, high_score } => log::info!(
                "game over after {} ticks: {} (score {}, level {}, high score {})",
                world.tick, reason.label(), score, world.level, high_score,
            ),
            GameEvent::Restarted => log::info!("restarted (high score {})", world.high_score()),
        }
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        if let Some(s) = sound_for(event) {
            sfx.play(s);
        }
    }
}

fn sound_for(event: &GameEvent) -> Option<Sound> {
    match event {
        // The power-up chime replaces the eat blip
        GameEvent::FoodEaten { kind: FoodKind::PowerUp, .. } => None,
        GameEvent::FoodEaten { .. } => Some(Sound::Eat),
        GameEvent::PowerUpActivated { .. } => Some(Sound::PowerUp),
        GameEvent::LevelUp { .. } => Some(Sound::LevelUp),
        GameEvent::GameOver { .. } => Some(Sound::GameOver),
        GameEvent::Paused | GameEvent::Resumed => Some(Sound::Pause),
        GameEvent::Started | GameEvent::Restarted => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::grid::Pos;
    use crate::domain::snake::GameOverReason;

    #[test]
    fn eat_sound_skipped_for_power_up() {
        let eaten = |kind| GameEvent::FoodEaten { kind, at: Pos::new(1, 1), points: 10 };
        assert_eq!(sound_for(&eaten(FoodKind::Basic)), Some(Sound::Eat));
        assert_eq!(sound_for(&eaten(FoodKind::PowerUp)), None);
        assert_eq!(
            sound_for(&GameEvent::PowerUpActivated { until: Duration::from_secs(5) }),
            Some(Sound::PowerUp)
        );
    }

    #[test]
    fn mode_sounds() {
        assert_eq!(sound_for(&GameEvent::Paused), Some(Sound::Pause));
        assert_eq!(sound_for(&GameEvent::Resumed), Some(Sound::Pause));
        assert_eq!(sound_for(&GameEvent::LevelUp { level: 2 }), Some(Sound::LevelUp));
        let over = GameEvent::GameOver { reason: GameOverReason::SelfCollision, score: 0, high_score: 0 };
        assert_eq!(sound_for(&over), Some(Sound::GameOver));
        assert_eq!(sound_for(&GameEvent::Started), None);
    }

    #[test]
    fn every_event_kind_can_be_logged() {
        let world = WorldState::new(
            Bounds::new(10, 10),
            config::RulesConfig::default(),
            0,
            StdRng::seed_from_u64(3),
            Duration::ZERO,
        );
        let events = [
            GameEvent::Started,
            GameEvent::Paused,
            GameEvent::Resumed,
            GameEvent::FoodEaten { kind: FoodKind::Rare, at: Pos::new(2, 3), points: 30 },
            GameEvent::PowerUpActivated { until: Duration::from_secs(5) },
            GameEvent::LevelUp { level: 2 },
            GameEvent::GameOver { reason: GameOverReason::WallCollision, score: 30, high_score: 30 },
            GameEvent::Restarted,
        ];
        log_events(&world, &events);
        assert_eq!(events.iter().filter_map(sound_for).count(), 6);
    }

    #[test]
    fn bounds_fit_or_clamp() {
        let mut cfg = GameConfig::from_toml_str("");
        let fit = Bounds::new(40, 22);
        assert_eq!(resolve_bounds(&cfg, fit), fit);

        cfg.grid.width = 20;
        cfg.grid.height = 50;
        assert_eq!(resolve_bounds(&cfg, fit), Bounds::new(20, 22));
    }
}
