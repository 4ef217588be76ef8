/// Food item: one on the board at a time, moved (not recreated) when eaten.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use super::grid::{Bounds, Pos};

/// Random probes before falling back to a full scan of free cells.
const MAX_SPAWN_ATTEMPTS: usize = 64;

/// Spawn-in animation length.
const SPAWN_ANIM: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FoodKind {
    Basic,
    Special,
    Rare,
    PowerUp,
}

impl FoodKind {
    const ORDINARY: [FoodKind; 3] = [FoodKind::Basic, FoodKind::Special, FoodKind::Rare];

    pub fn score_value(self) -> u32 {
        match self {
            FoodKind::PowerUp => 50,
            FoodKind::Basic => 10,
            FoodKind::Special => 20,
            FoodKind::Rare => 30,
        }
    }
}

/// Kind selection parameters.
#[derive(Clone, Copy, Debug)]
pub struct SpawnPolicy {
    pub power_up_chance: f64,
    pub power_up_min_score: u32,
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        SpawnPolicy { power_up_chance: 0.1, power_up_min_score: 50 }
    }
}

#[derive(Clone, Debug)]
pub struct Food {
    pub position: Pos,
    pub kind: FoodKind,
    pub spawned_at: Duration,
}

impl Food {
    pub fn new() -> Self {
        Food { position: Pos::new(0, 0), kind: FoodKind::Basic, spawned_at: Duration::ZERO }
    }

    /// Move to a random free cell and roll a new kind.
    ///
    /// Returns the new position, or `None` if every cell is occupied
    /// (the food is left untouched in that case).
    pub fn respawn<R, F>(
        &mut self,
        bounds: Bounds,
        occupied: F,
        score: u32,
        policy: &SpawnPolicy,
        now: Duration,
        rng: &mut R,
    ) -> Option<Pos>
    where
        R: Rng + ?Sized,
        F: Fn(Pos) -> bool,
    {
        let position = sample_free_cell(bounds, &occupied, rng)?;

        self.position = position;
        self.kind = if rng.gen_bool(policy.power_up_chance) && score >= policy.power_up_min_score {
            FoodKind::PowerUp
        } else {
            *FoodKind::ORDINARY.choose(rng).unwrap_or(&FoodKind::Basic)
        };
        self.spawned_at = now;
        Some(position)
    }

    pub fn score_value(&self) -> u32 {
        self.kind.score_value()
    }

    /// Spawn-in easing: 0.1 right after spawning, 1.0 once the animation is done.
    pub fn spawn_scale(&self, now: Duration) -> f32 {
        let elapsed = now.saturating_sub(self.spawned_at).min(SPAWN_ANIM);
        0.1 + 0.9 * (elapsed.as_secs_f32() / SPAWN_ANIM.as_secs_f32())
    }
}

fn sample_free_cell<R, F>(bounds: Bounds, occupied: &F, rng: &mut R) -> Option<Pos>
where
    R: Rng + ?Sized,
    F: Fn(Pos) -> bool,
{
    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let p = Pos::new(rng.gen_range(0..bounds.width), rng.gen_range(0..bounds.height));
        if !occupied(p) {
            return Some(p);
        }
    }

    // Crowded board: pick uniformly among what's left
    log::debug!("food spawn fell back to free-cell scan");
    let free: Vec<Pos> = bounds.cells().filter(|&p| !occupied(p)).collect();
    free.choose(rng).copied()
}
