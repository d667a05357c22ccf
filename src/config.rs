//! Tunables for the wall, the gesture processor and the emoji spawner.
//!
//! Two behaviours differ between earlier builds of this demo: how a finger
//! distance becomes a gain, and which mode a reset lands in. Both are named
//! here instead of being baked into the processors.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::mode::Mode;

/// Screen pixels per grid cell.
pub const DEFAULT_CELL_SIZE: u32 = 20;
/// Visual size of a block relative to its cell.
pub const DEFAULT_BLOCK_SCALE: f32 = 0.9;
/// Blocks are thin slabs: fixed scale on the depth axis.
pub const BLOCK_DEPTH_SCALE: f32 = 0.1;
/// Luma (0..1) times this is the block's depth.
pub const DEPTH_MULTIPLIER: f32 = 5.0;
/// Exponential smoothing factor, applied once per detector callback.
pub const SMOOTHING_ALPHA: f32 = 0.1;
/// Every control scalar stays inside [GAIN_MIN, GAIN_MAX].
pub const GAIN_MIN: f32 = 0.5;
pub const GAIN_MAX: f32 = 2.0;
/// How long a falling emoji lives (and takes to cross the screen).
pub const SPRITE_LIFETIME: Duration = Duration::from_secs(2);

/// Limits for the interactive cell-size / block-scale controls.
pub const CELL_SIZE_RANGE: (u32, u32) = (4, 64);
pub const BLOCK_SCALE_RANGE: (f32, f32) = (0.1, 1.0);
/// Accepted playback rates for recorded landmarks (Hz).
pub const LANDMARK_RATE_RANGE: (f32, f32) = (0.1, 1000.0);

/// Finger distance (normalized landmark space) -> target gain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DistanceMapping {
    /// `clamp(d * factor, GAIN_MIN, GAIN_MAX)`.
    Linear { factor: f32 },
    /// Clamp `d` to `[near, far]`, then rescale linearly onto `[GAIN_MIN, GAIN_MAX]`.
    ClampRescale { near: f32, far: f32 },
}

impl DistanceMapping {
    pub const LINEAR: DistanceMapping = DistanceMapping::Linear { factor: 5.0 };
    pub const CLAMP_RESCALE: DistanceMapping = DistanceMapping::ClampRescale { near: 0.05, far: 0.3 };

    pub fn map(&self, d: f32) -> f32 {
        match *self {
            DistanceMapping::Linear { factor } => (d * factor).clamp(GAIN_MIN, GAIN_MAX),
            DistanceMapping::ClampRescale { near, far } => {
                let t = (d.clamp(near, far) - near) / (far - near);
                GAIN_MIN + t * (GAIN_MAX - GAIN_MIN)
            }
        }
    }
}

impl Default for DistanceMapping {
    fn default() -> Self {
        DistanceMapping::LINEAR
    }
}

/// When a held gesture produces events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GestureTrigger {
    /// Fire on every detector callback where the predicate holds.
    EveryCallback,
    /// Fire once when the predicate goes false -> true.
    #[default]
    RisingEdge,
    /// Fire at most once per interval while the predicate holds.
    Cooldown(Duration),
}

/// Everything the wall needs to know up front.
#[derive(Clone, Debug)]
pub struct WallConfig {
    pub cell_size: u32,
    pub block_scale: f32,
    pub smoothing: f32,
    pub mapping: DistanceMapping,
    pub initial_mode: Mode,
    /// Mode that the reset command forces.
    pub reset_mode: Mode,
    pub trigger: GestureTrigger,
    pub sprite_lifetime: Duration,
    /// Seed for emoji placement; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for WallConfig {
    fn default() -> Self {
        WallConfig {
            cell_size: DEFAULT_CELL_SIZE,
            block_scale: DEFAULT_BLOCK_SCALE,
            smoothing: SMOOTHING_ALPHA,
            mapping: DistanceMapping::default(),
            initial_mode: Mode::Continuous,
            reset_mode: Mode::Continuous,
            trigger: GestureTrigger::default(),
            sprite_lifetime: SPRITE_LIFETIME,
            seed: None,
        }
    }
}

impl WallConfig {
    pub fn validate(&self) -> Result<()> {
        let (min_cell, max_cell) = CELL_SIZE_RANGE;
        if !(min_cell..=max_cell).contains(&self.cell_size) {
            return Err(Error::InvalidConfig(format!(
                "cell size {} outside {min_cell}..={max_cell}",
                self.cell_size
            )));
        }
        let (min_scale, max_scale) = BLOCK_SCALE_RANGE;
        if !(min_scale..=max_scale).contains(&self.block_scale) {
            return Err(Error::InvalidConfig(format!(
                "block scale {} outside {min_scale}..={max_scale}",
                self.block_scale
            )));
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "smoothing {} outside (0, 1]",
                self.smoothing
            )));
        }
        match self.mapping {
            DistanceMapping::Linear { factor } if factor <= 0.0 => {
                return Err(Error::InvalidConfig("linear mapping factor must be positive".into()));
            }
            DistanceMapping::ClampRescale { near, far } if !(near >= 0.0 && near < far) => {
                return Err(Error::InvalidConfig(format!(
                    "clamp-rescale bounds [{near}, {far}] are inverted"
                )));
            }
            _ => {}
        }
        if self.sprite_lifetime.is_zero() {
            return Err(Error::InvalidConfig("sprite lifetime must be positive".into()));
        }
        Ok(())
    }
}
