//! # pixel_wall
//!
//! A live camera feed rendered as a wall of colored blocks. A tracked hand
//! steers the wall's color channels and brightness, or drops falling emoji.
//!
//! ## Per-frame pipeline
//!
//! ```text
//! VideoSource ──frame──▶ FrameSampler ──colors/depth──▶ GridStore ──▶ render
//!                              ▲
//!                        ControlState
//!                              ▲
//! detector ──▶ LandmarkSlot ──▶ GestureProcessor ──events──▶ EmojiSpawner ──▶ render
//! ```
//!
//! [`wall::PixelWall`] owns the grid, control scalars, mode, gesture
//! processor and spawner; the window loop drives it from two sources: the
//! display tick and the detector's latest result.
//!
//! ## Gesture → Action mapping
//!
//! | Mode | Hand | Effect |
//! |---|---|---|
//! | RGB | thumb ↔ index distance | red gain |
//! | RGB | thumb ↔ middle distance | green gain |
//! | RGB | thumb ↔ ring distance | blue gain |
//! | RGB | thumb ↔ pinky distance | brightness |
//! | EMOJI | OK sign | drop 👌 |
//! | EMOJI | peace sign | drop ✌️ |
//! | EMOJI | thumbs up | drop 👍 |
//!
//! ### Keyboard
//!
//! | Key | Action |
//! |---|---|
//! | `M` | Toggle RGB / EMOJI mode |
//! | `R` | Reset levels to 1.0 and mode to the reset target |
//! | `Up` / `Down` | Grid cell size (rebuilds the grid) |
//! | `Left` / `Right` | Block scale |
//! | `Escape` | Quit |

pub mod camera;
pub mod config;
pub mod control;
pub mod detector;
pub mod draw;
pub mod emoji;
pub mod error;
pub mod gesture;
pub mod grid;
pub mod mode;
pub mod render;
pub mod sampler;
pub mod types;
pub mod wall;

pub use error::{Error, Result};
