// Falling emoji: one sprite per discrete gesture.
// Visual outcomes:
// - A glyph appears just above the top edge at a random x.
// - It slides straight down, reaching the bottom edge after the lifetime, fading as it goes.
// - Then it is gone. No collisions, no physics.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::gesture::GestureEvent;

/// Sprites start this far above the visible area (screen pixels).
pub const SPAWN_OFFSET_Y: f32 = -40.0;

/// One falling glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct EmojiSprite {
    /// Unique per spawner, increasing in spawn order.
    pub id: u64,
    /// Spawn instant on the spawner's clock.
    pub spawned_at: Duration,
    pub gesture: GestureEvent,
    pub glyph: &'static str,
    /// Horizontal position in screen pixels, fixed at spawn.
    pub x: f32,
    pub elapsed: Duration,
    lifetime: Duration,
}

impl EmojiSprite {
    /// Fall fraction in [0, 1]; linear in time.
    pub fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f32() / self.lifetime.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Vertical position: starts above the top, ends one viewport lower.
    pub fn y(&self, viewport_height: u32) -> f32 {
        SPAWN_OFFSET_Y + self.progress() * viewport_height as f32
    }

    /// 1 at spawn, 0 when it lands.
    pub fn opacity(&self) -> f32 {
        1.0 - self.progress()
    }

    #[inline]
    fn alive(&self) -> bool {
        self.elapsed < self.lifetime
    }
}

/// Owns every live sprite. Visual: whatever is in here is on screen.
pub struct EmojiSpawner {
    rng: StdRng,
    sprites: Vec<EmojiSprite>,
    lifetime: Duration,
    clock: Duration,
    next_id: u64,
}

impl EmojiSpawner {
    pub fn new(lifetime: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, sprites: Vec::new(), lifetime, clock: Duration::ZERO, next_id: 0 }
    }

    /// Drop one glyph for `gesture` at a random x in [0, viewport_width).
    pub fn spawn(&mut self, gesture: GestureEvent, viewport_width: u32) {
        let x = if viewport_width == 0 {
            0.0
        } else {
            self.rng.gen_range(0.0..viewport_width as f32)
        };
        let id = self.next_id;
        self.next_id += 1;
        let sprite = EmojiSprite {
            id,
            spawned_at: self.clock,
            gesture,
            glyph: gesture.glyph(),
            x,
            elapsed: Duration::ZERO,
            lifetime: self.lifetime,
        };
        debug!(id, ?gesture, x, "emoji spawned");
        self.sprites.push(sprite);
    }

    /// Advance every sprite by `dt`; expired ones are removed.
    pub fn tick(&mut self, dt: Duration) {
        self.clock += dt;
        let before = self.sprites.len();
        for s in &mut self.sprites {
            s.elapsed += dt;
        }
        // Keep spawn order so newer sprites draw on top.
        self.sprites.retain(EmojiSprite::alive);
        let expired = before - self.sprites.len();
        if expired > 0 {
            debug!(expired, live = self.sprites.len(), "emoji expired");
        }
    }

    pub fn sprites(&self) -> &[EmojiSprite] {
        &self.sprites
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}
