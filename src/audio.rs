//! Sound events
//!
//! The simulation queues named sound effects as side effects of state
//! transitions. Playback belongs to the host; it drains the queue once per
//! frame and hands each event to an `AudioSink`.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Round intro
    LevelStart,
    /// Player fired
    Shoot,
    /// Projectile hit a brick wall
    BrickHit,
    /// Projectile hit stone or the map edge
    SteelHit,
    /// Enemy destroyed
    TankExplosion,
    /// Player destroyed
    PlayerExplosion,
    /// Hit absorbed by a shield or a protection
    ShieldHit,
    /// Power-up collected
    Bonus,
    /// Extra life collected
    ExtraLife,
    /// Objective lost or all players out
    GameOver,
}

impl SoundEffect {
    /// Stable asset name
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::LevelStart => "level_starting",
            SoundEffect::Shoot => "shoot",
            SoundEffect::BrickHit => "brick_hit",
            SoundEffect::SteelHit => "steel_hit",
            SoundEffect::TankExplosion => "explosion",
            SoundEffect::PlayerExplosion => "player_explosion",
            SoundEffect::ShieldHit => "shield_hit",
            SoundEffect::Bonus => "bonus",
            SoundEffect::ExtraLife => "life",
            SoundEffect::GameOver => "game_over",
        }
    }
}

/// Playback backend
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);

    fn play_all(&mut self, effects: impl IntoIterator<Item = SoundEffect>)
    where
        Self: Sized,
    {
        for effect in effects {
            self.play(effect);
        }
    }
}

/// Logs each event; used by the headless runner
#[derive(Debug, Default)]
pub struct LogAudio {
    pub played: usize,
    muted: bool,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect) {
        if self.muted {
            return;
        }
        self.played += 1;
        log::debug!("sound: {}", effect.name());
    }
}
