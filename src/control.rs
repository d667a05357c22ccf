// The four scalars the hand controls. Written by the gesture processor,
// read by the frame sampler every tick.

use crate::config::{GAIN_MAX, GAIN_MIN};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlState {
    pub red_gain: f32,
    pub green_gain: f32,
    pub blue_gain: f32,
    pub brightness: f32,
}

impl Default for ControlState {
    fn default() -> Self {
        Self { red_gain: 1.0, green_gain: 1.0, blue_gain: 1.0, brightness: 1.0 }
    }
}

/// Which scalar a finger drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Brightness,
}

impl ControlState {
    /// Back to neutral: every scalar exactly 1.0.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn get(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Red => self.red_gain,
            Channel::Green => self.green_gain,
            Channel::Blue => self.blue_gain,
            Channel::Brightness => self.brightness,
        }
    }

    /// Store a value, clamped to the gain range.
    pub fn set(&mut self, channel: Channel, value: f32) {
        let v = value.clamp(GAIN_MIN, GAIN_MAX);
        match channel {
            Channel::Red => self.red_gain = v,
            Channel::Green => self.green_gain = v,
            Channel::Blue => self.blue_gain = v,
            Channel::Brightness => self.brightness = v,
        }
    }

    /// Move one scalar a fraction `alpha` of the way toward `target`.
    pub fn approach(&mut self, channel: Channel, target: f32, alpha: f32) {
        let old = self.get(channel);
        self.set(channel, lerp(old, target, alpha));
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
