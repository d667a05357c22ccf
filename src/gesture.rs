//! Gesture signal processing.
//!
//! Turns one detector result into either smoothed control scalars
//! (continuous mode) or discrete [`GestureEvent`]s (discrete mode).
//!
//! Smoothing runs once per detector callback, not per render tick, so the
//! response time follows the detector's cadence: with `alpha = 0.1` a step
//! change settles to within 1% after 44 callbacks.

use std::time::Instant;

use tracing::debug;

use crate::config::{DistanceMapping, GestureTrigger, WallConfig};
use crate::control::{Channel, ControlState};
use crate::mode::Mode;
use crate::types::{
    INDEX_TIP, LandmarkFrame, MIDDLE_TIP, PINKY_TIP, RING_TIP, THUMB_TIP, WRIST,
};

// Pose thresholds, normalized landmark space.
const OK_TOUCH: f32 = 0.07;
const FINGER_AWAY: f32 = 0.3;
const PEACE_FOLDED: f32 = 0.15;
const FIST_FOLDED: f32 = 0.2;

/// Which fingertip drives which scalar (distance measured from the thumb tip).
const FINGER_CHANNELS: [(usize, Channel); 4] = [
    (INDEX_TIP, Channel::Red),
    (MIDDLE_TIP, Channel::Green),
    (RING_TIP, Channel::Blue),
    (PINKY_TIP, Channel::Brightness),
];

const FINGERTIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// A recognized hand pose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureEvent {
    Ok,
    Peace,
    ThumbsUp,
}

impl GestureEvent {
    pub const ALL: [GestureEvent; 3] = [GestureEvent::Ok, GestureEvent::Peace, GestureEvent::ThumbsUp];

    /// Glyph dropped for this gesture.
    pub fn glyph(self) -> &'static str {
        match self {
            GestureEvent::Ok => "\u{1F44C}",
            GestureEvent::Peace => "\u{270C}\u{FE0F}",
            GestureEvent::ThumbsUp => "\u{1F44D}",
        }
    }

    /// Does this hand hold the pose?
    pub fn matches(self, hand: &LandmarkFrame) -> bool {
        match self {
            GestureEvent::Ok => is_ok(hand),
            GestureEvent::Peace => is_peace(hand),
            GestureEvent::ThumbsUp => is_thumbs_up(hand),
        }
    }

    fn index(self) -> usize {
        match self {
            GestureEvent::Ok => 0,
            GestureEvent::Peace => 1,
            GestureEvent::ThumbsUp => 2,
        }
    }
}

/// Thumb and index touch, the other three fingers spread away.
pub fn is_ok(hand: &LandmarkFrame) -> bool {
    hand.dist(THUMB_TIP, INDEX_TIP) < OK_TOUCH
        && hand.dist(THUMB_TIP, MIDDLE_TIP) > FINGER_AWAY
        && hand.dist(THUMB_TIP, RING_TIP) > FINGER_AWAY
        && hand.dist(THUMB_TIP, PINKY_TIP) > FINGER_AWAY
}

/// Index and middle away from the thumb, ring and pinky folded onto it.
pub fn is_peace(hand: &LandmarkFrame) -> bool {
    hand.dist(THUMB_TIP, INDEX_TIP) > FINGER_AWAY
        && hand.dist(THUMB_TIP, MIDDLE_TIP) > FINGER_AWAY
        && hand.dist(THUMB_TIP, RING_TIP) < PEACE_FOLDED
        && hand.dist(THUMB_TIP, PINKY_TIP) < PEACE_FOLDED
}

/// Thumb above the wrist (smaller y is higher) and all fingertips near the wrist.
pub fn is_thumbs_up(hand: &LandmarkFrame) -> bool {
    let thumb_up = hand.point(THUMB_TIP).y < hand.point(WRIST).y;
    thumb_up && FINGERTIPS.iter().all(|&tip| hand.dist(tip, WRIST) < FIST_FOLDED)
}

pub struct GestureProcessor {
    mapping: DistanceMapping,
    alpha: f32,
    trigger: GestureTrigger,
    // Per-gesture latch for RisingEdge, last fire time for Cooldown.
    held: [bool; 3],
    last_fired: [Option<Instant>; 3],
}

impl GestureProcessor {
    pub fn new(mapping: DistanceMapping, alpha: f32, trigger: GestureTrigger) -> Self {
        Self { mapping, alpha, trigger, held: [false; 3], last_fired: [None; 3] }
    }

    pub fn from_config(cfg: &WallConfig) -> Self {
        Self::new(cfg.mapping, cfg.smoothing, cfg.trigger)
    }

    /// Handle one detector callback.
    ///
    /// `None` (no hand) changes nothing and fires nothing.
    pub fn on_landmarks(
        &mut self,
        hand: Option<&LandmarkFrame>,
        mode: Mode,
        control: &mut ControlState,
        now: Instant,
    ) -> Vec<GestureEvent> {
        let Some(hand) = hand else {
            return Vec::new();
        };

        match mode {
            Mode::Continuous => {
                self.steer(hand, control);
                // Poses seen while steering should not count as "already held".
                self.held = [false; 3];
                Vec::new()
            }
            Mode::Discrete => self.classify(hand, now),
        }
    }

    fn steer(&self, hand: &LandmarkFrame, control: &mut ControlState) {
        for (tip, channel) in FINGER_CHANNELS {
            let target = self.mapping.map(hand.dist(THUMB_TIP, tip));
            control.approach(channel, target, self.alpha);
        }
    }

    fn classify(&mut self, hand: &LandmarkFrame, now: Instant) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        for gesture in GestureEvent::ALL {
            let i = gesture.index();
            let holds = gesture.matches(hand);
            let fire = holds
                && match self.trigger {
                    GestureTrigger::EveryCallback => true,
                    GestureTrigger::RisingEdge => !self.held[i],
                    GestureTrigger::Cooldown(interval) => self.last_fired[i]
                        .is_none_or(|at| now.saturating_duration_since(at) >= interval),
                };
            self.held[i] = holds;
            if fire {
                self.last_fired[i] = Some(now);
                debug!(?gesture, "gesture fired");
                events.push(gesture);
            }
        }
        events
    }
}

/// Canned poses, used by the simulated detector and by tests.
pub mod poses {
    use crate::types::{
        INDEX_TIP, LANDMARK_COUNT, Landmark, LandmarkFrame, MIDDLE_TIP, PINKY_TIP, RING_TIP,
        THUMB_TIP, WRIST,
    };

    /// A relaxed open hand; matches none of the poses.
    pub fn open_hand() -> LandmarkFrame {
        let mut points = [Landmark::new(0.5, 0.6); LANDMARK_COUNT];
        points[WRIST] = Landmark::new(0.5, 0.9);
        points[THUMB_TIP] = Landmark::new(0.25, 0.55);
        points[INDEX_TIP] = Landmark::new(0.38, 0.25);
        points[MIDDLE_TIP] = Landmark::new(0.5, 0.2);
        points[RING_TIP] = Landmark::new(0.62, 0.25);
        points[PINKY_TIP] = Landmark::new(0.72, 0.35);
        LandmarkFrame::new(points)
    }

    /// Thumb follows a pointer at (x, y); fingertips stay put.
    pub fn thumb_at(x: f32, y: f32) -> LandmarkFrame {
        open_hand().with_point(THUMB_TIP, x, y)
    }

    pub fn ok() -> LandmarkFrame {
        open_hand()
            .with_point(THUMB_TIP, 0.30, 0.40)
            .with_point(INDEX_TIP, 0.32, 0.42)
            .with_point(MIDDLE_TIP, 0.55, 0.05)
            .with_point(RING_TIP, 0.68, 0.08)
            .with_point(PINKY_TIP, 0.80, 0.15)
    }

    pub fn peace() -> LandmarkFrame {
        open_hand()
            .with_point(THUMB_TIP, 0.50, 0.60)
            .with_point(INDEX_TIP, 0.35, 0.15)
            .with_point(MIDDLE_TIP, 0.60, 0.10)
            .with_point(RING_TIP, 0.55, 0.55)
            .with_point(PINKY_TIP, 0.58, 0.62)
    }

    pub fn thumbs_up() -> LandmarkFrame {
        open_hand()
            .with_point(WRIST, 0.50, 0.80)
            .with_point(THUMB_TIP, 0.45, 0.40)
            .with_point(INDEX_TIP, 0.55, 0.70)
            .with_point(MIDDLE_TIP, 0.57, 0.74)
            .with_point(RING_TIP, 0.56, 0.78)
            .with_point(PINKY_TIP, 0.54, 0.82)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn processor(trigger: GestureTrigger) -> GestureProcessor {
        GestureProcessor::new(DistanceMapping::LINEAR, 0.1, trigger)
    }

    /// Thumb at the origin, index `d` away on the x axis, the rest far.
    fn ok_candidate(d: f32) -> LandmarkFrame {
        poses::open_hand()
            .with_point(THUMB_TIP, 0.0, 0.5)
            .with_point(INDEX_TIP, d, 0.5)
            .with_point(MIDDLE_TIP, 0.5, 0.5)
            .with_point(RING_TIP, 0.6, 0.5)
            .with_point(PINKY_TIP, 0.7, 0.5)
    }

    #[test]
    fn canned_poses_match_only_themselves() {
        assert!(is_ok(&poses::ok()));
        assert!(!is_peace(&poses::ok()));
        assert!(!is_thumbs_up(&poses::ok()));

        assert!(is_peace(&poses::peace()));
        assert!(!is_ok(&poses::peace()));
        assert!(!is_thumbs_up(&poses::peace()));

        assert!(is_thumbs_up(&poses::thumbs_up()));
        assert!(!is_ok(&poses::thumbs_up()));
        assert!(!is_peace(&poses::thumbs_up()));

        let open = poses::open_hand();
        assert!(GestureEvent::ALL.iter().all(|g| !g.matches(&open)));
    }

    #[test]
    fn ok_threshold_is_strict() {
        assert!(is_ok(&ok_candidate(0.069)));
        assert!(!is_ok(&ok_candidate(0.07)));
    }

    #[test]
    fn ok_needs_other_fingers_away() {
        let hand = ok_candidate(0.02).with_point(MIDDLE_TIP, 0.2, 0.5);
        assert!(!is_ok(&hand));
    }

    #[test]
    fn thumbs_up_needs_thumb_above_wrist() {
        let wrist_y = poses::thumbs_up().point(WRIST).y;
        let hand = poses::thumbs_up().with_point(THUMB_TIP, 0.45, wrist_y + 0.05);
        assert!(!is_thumbs_up(&hand));
    }

    #[test]
    fn no_hand_changes_nothing() {
        let mut p = processor(GestureTrigger::EveryCallback);
        let mut control = ControlState { red_gain: 1.3, ..ControlState::default() };
        let before = control;
        let now = Instant::now();
        assert!(p.on_landmarks(None, Mode::Continuous, &mut control, now).is_empty());
        assert!(p.on_landmarks(None, Mode::Discrete, &mut control, now).is_empty());
        assert_eq!(control, before);
    }

    #[test]
    fn continuous_mode_maps_fingers_to_channels() {
        let mut p = processor(GestureTrigger::EveryCallback);
        let mut control = ControlState::default();
        // index close (red down), middle far (green up)
        let hand = poses::open_hand()
            .with_point(THUMB_TIP, 0.0, 0.0)
            .with_point(INDEX_TIP, 0.05, 0.0)
            .with_point(MIDDLE_TIP, 0.6, 0.0)
            .with_point(RING_TIP, 0.2, 0.0)
            .with_point(PINKY_TIP, 0.3, 0.0);
        let events = p.on_landmarks(Some(&hand), Mode::Continuous, &mut control, Instant::now());
        assert!(events.is_empty());
        assert!((control.red_gain - 0.95).abs() < 1e-6);
        assert!((control.green_gain - 1.1).abs() < 1e-6);
        assert!((control.blue_gain - 1.0).abs() < 1e-6);
        assert!((control.brightness - 1.05).abs() < 1e-6);
    }

    #[test]
    fn smoothing_settles_within_44_callbacks() {
        let mut p = processor(GestureTrigger::EveryCallback);
        let mut control = ControlState::default();
        let hand = poses::thumb_at(0.25, 0.55).with_point(INDEX_TIP, 0.55, 0.55);
        let target = DistanceMapping::LINEAR.map(0.3);
        let now = Instant::now();
        for _ in 0..44 {
            p.on_landmarks(Some(&hand), Mode::Continuous, &mut control, now);
        }
        assert!((control.red_gain - target).abs() <= 0.01 * target);
    }

    #[test]
    fn discrete_mode_leaves_control_alone() {
        let mut p = processor(GestureTrigger::EveryCallback);
        let mut control = ControlState::default();
        let events = p.on_landmarks(Some(&poses::ok()), Mode::Discrete, &mut control, Instant::now());
        assert_eq!(events, vec![GestureEvent::Ok]);
        assert_eq!(control, ControlState::default());
    }

    #[test]
    fn every_callback_refires_while_held() {
        let mut p = processor(GestureTrigger::EveryCallback);
        let mut control = ControlState::default();
        let now = Instant::now();
        let fired: usize = (0..5)
            .map(|_| p.on_landmarks(Some(&poses::peace()), Mode::Discrete, &mut control, now).len())
            .sum();
        assert_eq!(fired, 5);
    }

    #[test]
    fn rising_edge_fires_once_per_hold() {
        let mut p = processor(GestureTrigger::RisingEdge);
        let mut control = ControlState::default();
        let now = Instant::now();
        let mut fired = 0;
        for _ in 0..5 {
            fired += p.on_landmarks(Some(&poses::peace()), Mode::Discrete, &mut control, now).len();
        }
        assert_eq!(fired, 1);

        // Release, then hold again.
        p.on_landmarks(Some(&poses::open_hand()), Mode::Discrete, &mut control, now);
        let again = p.on_landmarks(Some(&poses::peace()), Mode::Discrete, &mut control, now);
        assert_eq!(again, vec![GestureEvent::Peace]);
    }

    #[test]
    fn cooldown_limits_refire_rate() {
        let mut p = processor(GestureTrigger::Cooldown(Duration::from_millis(500)));
        let mut control = ControlState::default();
        let t0 = Instant::now();
        let hand = poses::thumbs_up();
        assert_eq!(p.on_landmarks(Some(&hand), Mode::Discrete, &mut control, t0).len(), 1);
        assert!(p.on_landmarks(Some(&hand), Mode::Discrete, &mut control, t0 + Duration::from_millis(200)).is_empty());
        assert_eq!(
            p.on_landmarks(Some(&hand), Mode::Discrete, &mut control, t0 + Duration::from_millis(500)),
            vec![GestureEvent::ThumbsUp]
        );
    }

    #[test]
    fn one_frame_can_match_several_poses() {
        // Pinched thumb and index held up over a loose fist: OK and thumbs-up at once.
        let hand = poses::open_hand()
            .with_point(WRIST, 0.5, 0.5)
            .with_point(THUMB_TIP, 0.5, 0.26)
            .with_point(INDEX_TIP, 0.5, 0.31)
            .with_point(MIDDLE_TIP, 0.5, 0.69)
            .with_point(RING_TIP, 0.6, 0.65)
            .with_point(PINKY_TIP, 0.4, 0.65);
        let mut p = processor(GestureTrigger::EveryCallback);
        let mut control = ControlState::default();
        let events = p.on_landmarks(Some(&hand), Mode::Discrete, &mut control, Instant::now());
        assert_eq!(events, vec![GestureEvent::Ok, GestureEvent::ThumbsUp]);
    }
}
