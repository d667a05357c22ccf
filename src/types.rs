// Core types shared by the sampler, the gesture processor and the window.

use crate::error::{Error, Result};
use serde::Deserialize;

#[derive(Clone, Debug, Default)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is (pixels); 0 = no frame yet
    pub height: usize,     // how tall the frame is (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB (same packing minifb expects)
}

impl FrameBuffer {
    /// Allocate a black frame of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Resize in place, keeping the allocation when it is already big enough.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.resize(width * height, 0);
    }

    /// A frame is usable once both dimensions are known and the buffer matches them.
    pub fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0 && self.pixels.len() == self.width * self.height
    }

    /// Fill every pixel with one color.
    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Read the RGB triplet at (x, y). Caller keeps (x, y) in bounds.
    #[inline]
    pub fn rgb_at(&self, x: usize, y: usize) -> (u8, u8, u8) {
        unpack_rgb(self.pixels[y * self.width + x])
    }
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack_rgb(px: u32) -> (u8, u8, u8) {
    (((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
}

/// Size of the visible area the grid is laid out on, in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/* ---------- Hand landmarks (output of the external detector) ---------- */

/// Number of points in one detected hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

/// One tracked point, normalized image space: x,y in [0,1], y grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Planar distance; z is ignored on purpose (normalized image space only).
    #[inline]
    pub fn distance(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Exactly one hand: 21 landmarks in detector order.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build from a detector's list; anything but 21 points is rejected.
    pub fn from_points(points: Vec<Landmark>) -> Result<Self> {
        let actual = points.len();
        let points: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| Error::LandmarkCount { expected: LANDMARK_COUNT, actual })?;
        Ok(Self { points })
    }

    #[inline]
    pub fn point(&self, index: usize) -> &Landmark {
        &self.points[index]
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    /// Distance between two landmarks of this hand.
    #[inline]
    pub fn dist(&self, a: usize, b: usize) -> f32 {
        self.points[a].distance(&self.points[b])
    }

    /// Move one landmark; handy for building poses.
    pub fn with_point(mut self, index: usize, x: f32, y: f32) -> Self {
        self.points[index] = Landmark::new(x, y);
        self
    }
}

/// What the detector reported for one of its callbacks.
#[derive(Clone, Debug, PartialEq)]
pub enum Detection {
    NoHand,
    Hand(LandmarkFrame),
}

impl Detection {
    pub fn hand(&self) -> Option<&LandmarkFrame> {
        match self {
            Detection::Hand(frame) => Some(frame),
            Detection::NoHand => None,
        }
    }
}
