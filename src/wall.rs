//! The pixel wall: one owned context holding everything a tick touches.
//!
//! `PixelWall` owns the grid, the control scalars, the mode, the gesture
//! processor and the emoji spawner. Two entry points drive it, mirroring the
//! two callback sources of the running program:
//!
//! * [`PixelWall::tick`] once per display frame (sample + advance sprites);
//! * [`PixelWall::on_detection`] whenever the detector delivers a result.
//!
//! Both run on the same thread, so the sampler always sees a fully written
//! `ControlState`.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::{BLOCK_SCALE_RANGE, CELL_SIZE_RANGE, WallConfig};
use crate::control::ControlState;
use crate::emoji::{EmojiSpawner, EmojiSprite};
use crate::error::Result;
use crate::gesture::{GestureEvent, GestureProcessor};
use crate::grid::GridStore;
use crate::mode::{Mode, ModeController};
use crate::sampler::FrameSampler;
use crate::types::{Detection, FrameBuffer, LandmarkFrame, Viewport};

pub struct PixelWall {
    config: WallConfig,
    grid: GridStore,
    control: ControlState,
    mode: ModeController,
    gestures: GestureProcessor,
    sampler: FrameSampler,
    spawner: EmojiSpawner,
    /// Currently tracked hand, for the debug overlay.
    last_hand: Option<LandmarkFrame>,
}

impl PixelWall {
    pub fn new(config: WallConfig, viewport: Viewport) -> Result<Self> {
        config.validate()?;
        let grid = GridStore::new(viewport, config.cell_size, config.block_scale);
        let (columns, rows) = grid.dimensions();
        info!(columns, rows, cell_size = config.cell_size, "pixel wall ready");

        Ok(PixelWall {
            grid,
            control: ControlState::default(),
            mode: ModeController::new(config.initial_mode, config.reset_mode),
            gestures: GestureProcessor::from_config(&config),
            sampler: FrameSampler::default(),
            spawner: EmojiSpawner::new(config.sprite_lifetime, config.seed),
            last_hand: None,
            config,
        })
    }

    // ── per display frame ────────────────────────────────────────────────

    /// Sample `frame` into the grid (skipped if the frame is not ready) and
    /// advance falling sprites by `dt`. Returns whether the grid was resampled.
    pub fn tick(&mut self, frame: &FrameBuffer, dt: Duration) -> bool {
        let sampled = self.sampler.sample(frame, &mut self.grid, &self.control);
        self.spawner.tick(dt);
        sampled
    }

    // ── per detector result ──────────────────────────────────────────────

    /// Run the gesture processor on one detector result and route any
    /// discrete events to the spawner. Returns the events that fired.
    pub fn on_detection(&mut self, detection: &Detection, now: Instant) -> Vec<GestureEvent> {
        let hand = detection.hand();
        match hand {
            Some(h) => self.last_hand = Some(h.clone()),
            None => self.clear_last_hand(),
        }

        let mode = self.mode.mode();
        let events = self.gestures.on_landmarks(hand, mode, &mut self.control, now);
        if mode == Mode::Discrete {
            let width = self.grid.viewport().width;
            for &event in &events {
                self.spawner.spawn(event, width);
            }
        }
        events
    }

    // ── user input surface ───────────────────────────────────────────────

    /// Window resized: rebuild the grid for the new viewport.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.grid.viewport() {
            return;
        }
        self.grid.rebuild(viewport, self.config.cell_size, self.config.block_scale);
    }

    /// Change cell size (grid density); rebuilds. Clamped to the allowed range.
    pub fn set_cell_size(&mut self, cell_size: u32) {
        let cell_size = cell_size.clamp(CELL_SIZE_RANGE.0, CELL_SIZE_RANGE.1);
        if cell_size == self.config.cell_size {
            return;
        }
        self.config.cell_size = cell_size;
        let viewport = self.grid.viewport();
        self.grid.rebuild(viewport, cell_size, self.config.block_scale);
    }

    /// Change block size only; no rebuild.
    pub fn set_block_scale(&mut self, block_scale: f32) {
        let block_scale = block_scale.clamp(BLOCK_SCALE_RANGE.0, BLOCK_SCALE_RANGE.1);
        self.config.block_scale = block_scale;
        self.grid.set_block_scale(block_scale);
    }

    pub fn toggle_mode(&mut self) -> Mode {
        self.mode.toggle()
    }

    /// Neutral levels and the configured reset mode.
    pub fn reset(&mut self) {
        self.control.reset();
        let mode = self.mode.reset();
        info!(mode = mode.label(), "levels reset");
    }

    // ── read side for the render collaborator ────────────────────────────

    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    pub fn control(&self) -> &ControlState {
        &self.control
    }

    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub fn sprites(&self) -> &[EmojiSprite] {
        self.spawner.sprites()
    }

    pub fn last_hand(&self) -> Option<&LandmarkFrame> {
        self.last_hand.as_ref()
    }

    fn clear_last_hand(&mut self) {
        if self.last_hand.take().is_some() {
            debug!("hand overlay cleared");
        }
    }

    pub fn config(&self) -> &WallConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::poses;

    fn wall() -> PixelWall {
        let cfg = WallConfig { seed: Some(1), ..WallConfig::default() };
        PixelWall::new(cfg, Viewport::new(200, 100)).unwrap()
    }

    #[test]
    fn invalid_config_is_refused() {
        let cfg = WallConfig { smoothing: 0.0, ..WallConfig::default() };
        assert!(PixelWall::new(cfg, Viewport::new(100, 100)).is_err());
    }

    #[test]
    fn continuous_mode_never_spawns() {
        let mut w = wall();
        let events = w.on_detection(&Detection::Hand(poses::ok()), Instant::now());
        assert!(events.is_empty());
        assert!(w.sprites().is_empty());
    }

    #[test]
    fn discrete_gesture_spawns_one_sprite() {
        let mut w = wall();
        w.toggle_mode();
        let events = w.on_detection(&Detection::Hand(poses::ok()), Instant::now());
        assert_eq!(events, vec![GestureEvent::Ok]);
        assert_eq!(w.sprites().len(), 1);
        assert_eq!(w.sprites()[0].glyph, GestureEvent::Ok.glyph());
    }

    #[test]
    fn no_hand_keeps_levels_and_hides_overlay() {
        let mut w = wall();
        w.on_detection(&Detection::Hand(poses::thumb_at(0.9, 0.9)), Instant::now());
        assert!(w.last_hand().is_some());
        let levels = *w.control();
        w.on_detection(&Detection::NoHand, Instant::now());
        assert_eq!(*w.control(), levels);
        assert!(w.last_hand().is_none());
    }

    #[test]
    fn cell_size_rebuilds_but_block_scale_does_not() {
        let mut w = wall();
        w.set_cell_size(10);
        assert_eq!(w.grid().dimensions(), (20, 10));

        w.set_block_scale(0.5);
        assert_eq!(w.grid().dimensions(), (20, 10));
        assert!(w.grid().cells().iter().all(|c| c.scale[0] == 0.5));

        w.set_cell_size(1000);
        assert_eq!(w.grid().cell_size(), CELL_SIZE_RANGE.1);
        assert_eq!(w.config().cell_size, CELL_SIZE_RANGE.1);
        assert_eq!(w.config().block_scale, 0.5);
    }

    #[test]
    fn resize_relayouts_grid() {
        let mut w = wall();
        w.resize(Viewport::new(400, 400));
        assert_eq!(w.grid().dimensions(), (20, 20));
    }

    #[test]
    fn reset_restores_levels_and_mode() {
        let mut w = wall();
        for _ in 0..10 {
            w.on_detection(&Detection::Hand(poses::thumb_at(0.95, 0.95)), Instant::now());
        }
        assert_ne!(*w.control(), ControlState::default());
        w.toggle_mode();
        w.reset();
        assert_eq!(*w.control(), ControlState::default());
        assert_eq!(w.mode(), Mode::Continuous);
    }
}
