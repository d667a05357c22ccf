//! Hand-landmark detector boundary.
//!
//! Detectors run at their own cadence and push results into a
//! [`LandmarkSlot`]: a single-slot mailbox that only ever holds the latest
//! result. The render loop takes from it once per tick, so a slow or stalled
//! detector never blocks drawing, and a fast one never builds a backlog.

use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::config::LANDMARK_RATE_RANGE;
use crate::error::{Error, Result};
use crate::types::{Detection, Landmark, LandmarkFrame};

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSlot
// ════════════════════════════════════════════════════════════════════════════

/// Latest-result mailbox. Cloning shares the same slot.
#[derive(Clone, Default)]
pub struct LandmarkSlot {
    latest: Arc<Mutex<Option<Detection>>>,
}

impl LandmarkSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result, replacing anything not yet consumed.
    pub fn publish(&self, detection: Detection) {
        *self.latest.lock() = Some(detection);
    }

    /// Take the pending result, leaving the slot empty.
    pub fn take(&self) -> Option<Detection> {
        self.latest.lock().take()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkDetector trait + spawn helper
// ════════════════════════════════════════════════════════════════════════════

/// Stop request seen by a detector thread.
///
/// Raised when the owning [`DetectorHandle`] is dropped; [`StopSignal::wait`]
/// wakes up immediately at that point instead of finishing its timeout.
pub struct StopSignal {
    rx: Receiver<()>,
}

impl StopSignal {
    pub fn is_raised(&self) -> bool {
        !matches!(self.rx.try_recv(), Err(TryRecvError::Empty))
    }

    /// Sleep for up to `timeout`. Returns true if the stop was raised.
    pub fn wait(&self, timeout: Duration) -> bool {
        !matches!(self.rx.recv_timeout(timeout), Err(RecvTimeoutError::Timeout))
    }
}

/// Anything that can feed detections into a slot from its own thread.
pub trait LandmarkDetector: Send + 'static {
    /// Publish until `stop` is raised.
    fn run(self: Box<Self>, slot: LandmarkSlot, stop: StopSignal);
}

/// A running detector thread. Dropping it stops the thread and joins it.
pub struct DetectorHandle {
    stop: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl Drop for DetectorHandle {
    fn drop(&mut self) {
        // Disconnecting the channel is the stop request.
        self.stop.take();
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                error!("landmark detector thread panicked");
            }
        }
    }
}

/// Spawn a detector on its own thread, publishing into `slot`.
pub fn spawn_detector<D: LandmarkDetector>(detector: D, slot: LandmarkSlot) -> DetectorHandle {
    let (tx, rx) = mpsc::channel();
    let join = thread::spawn(move || Box::new(detector).run(slot, StopSignal { rx }));
    DetectorHandle { stop: Some(tx), join: Some(join) }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkReplay: recorded landmark stream
// ════════════════════════════════════════════════════════════════════════════

/// Plays back a recording of detector results at a fixed rate, looping.
///
/// Recording format is JSON lines, one detector callback per line:
/// `null` or `[]` for "no hand", otherwise an array of 21 `{"x":..,"y":..,"z":..}`
/// objects (`z` optional). Blank lines and lines starting with `#` are skipped.
pub struct LandmarkReplay {
    frames: Vec<Detection>,
    interval: Duration,
}

impl LandmarkReplay {
    pub fn new(frames: Vec<Detection>, rate_hz: f32) -> Result<Self> {
        if frames.is_empty() {
            return Err(Error::Landmarks { line: 0, reason: "recording has no frames".into() });
        }
        let (min_hz, max_hz) = LANDMARK_RATE_RANGE;
        if !(min_hz..=max_hz).contains(&rate_hz) {
            return Err(Error::InvalidConfig(format!(
                "landmark rate {rate_hz} Hz outside {min_hz}..={max_hz}"
            )));
        }
        let interval = Duration::try_from_secs_f32(1.0 / rate_hz)
            .map_err(|e| Error::InvalidConfig(format!("landmark rate {rate_hz} Hz: {e}")))?;
        Ok(Self { frames, interval })
    }

    pub fn from_file(path: &Path, rate_hz: f32) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let frames = parse_recording(&text)?;
        info!(path = %path.display(), frames = frames.len(), rate_hz, "landmark recording loaded");
        Self::new(frames, rate_hz)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl LandmarkDetector for LandmarkReplay {
    fn run(self: Box<Self>, slot: LandmarkSlot, stop: StopSignal) {
        for detection in self.frames.iter().cycle() {
            if stop.is_raised() {
                return;
            }
            slot.publish(detection.clone());
            if stop.wait(self.interval) {
                return;
            }
        }
    }
}

/// Parse a whole JSON-lines recording.
pub fn parse_recording(text: &str) -> Result<Vec<Detection>> {
    let mut frames = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        frames.push(parse_line(line, i + 1)?);
    }
    Ok(frames)
}

fn parse_line(line: &str, number: usize) -> Result<Detection> {
    let points: Option<Vec<Landmark>> = serde_json::from_str(line)
        .map_err(|e| Error::Landmarks { line: number, reason: e.to_string() })?;
    match points {
        None => Ok(Detection::NoHand),
        Some(points) if points.is_empty() => Ok(Detection::NoHand),
        Some(points) => match LandmarkFrame::from_points(points) {
            Ok(frame) => Ok(Detection::Hand(frame)),
            Err(e) => {
                warn!(line = number, "malformed landmark frame");
                Err(Error::Landmarks { line: number, reason: e.to_string() })
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LANDMARK_COUNT;

    fn hand_line(x: f32) -> String {
        let pts: Vec<String> = (0..LANDMARK_COUNT)
            .map(|_| format!("{{\"x\":{x},\"y\":0.5}}"))
            .collect();
        format!("[{}]", pts.join(","))
    }

    #[test]
    fn slot_keeps_only_latest() {
        let slot = LandmarkSlot::new();
        assert!(slot.take().is_none());
        slot.publish(Detection::NoHand);
        let hand = crate::gesture::poses::ok();
        slot.publish(Detection::Hand(hand.clone()));
        assert_eq!(slot.take(), Some(Detection::Hand(hand)));
        assert!(slot.take().is_none());
    }

    #[test]
    fn clones_share_the_slot() {
        let producer = LandmarkSlot::new();
        let consumer = producer.clone();
        producer.publish(Detection::NoHand);
        assert_eq!(consumer.take(), Some(Detection::NoHand));
    }

    #[test]
    fn recording_parses_hands_and_gaps() {
        let text = format!("# header\nnull\n\n[]\n{}\n", hand_line(0.25));
        let frames = parse_recording(&text).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], Detection::NoHand);
        assert_eq!(frames[1], Detection::NoHand);
        let hand = frames[2].hand().unwrap();
        assert_eq!(hand.point(0).x, 0.25);
        assert_eq!(hand.point(0).z, 0.0);
    }

    #[test]
    fn short_frame_reports_line_number() {
        let text = "null\n[{\"x\":0.1,\"y\":0.2}]\n";
        match parse_recording(text) {
            Err(Error::Landmarks { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(parse_recording("{oops"), Err(Error::Landmarks { line: 1, .. })));
    }

    #[test]
    fn empty_recording_is_rejected() {
        assert!(LandmarkReplay::new(Vec::new(), 30.0).is_err());
        assert!(LandmarkReplay::new(vec![Detection::NoHand], 0.0).is_err());
    }

    #[test]
    fn replay_rate_outside_limits_is_an_error() {
        let frames = || vec![Detection::NoHand];
        for hz in [1e-30, -1.0, f32::NAN, f32::INFINITY, 5000.0] {
            assert!(
                matches!(LandmarkReplay::new(frames(), hz), Err(Error::InvalidConfig(_))),
                "{hz} Hz accepted"
            );
        }
        let slow = LandmarkReplay::new(frames(), LANDMARK_RATE_RANGE.0).unwrap();
        assert!(slow.interval() > Duration::from_secs(9));
    }

    #[test]
    fn dropping_a_slow_replay_returns_promptly() {
        let slot = LandmarkSlot::new();
        let replay = LandmarkReplay::new(vec![Detection::NoHand], 0.5).unwrap();
        let handle = spawn_detector(replay, slot.clone());
        // Let the thread publish and start its 2 s wait.
        for _ in 0..200 {
            if slot.take().is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }

        let started = std::time::Instant::now();
        drop(handle);
        assert!(started.elapsed() < Duration::from_millis(500), "drop took {:?}", started.elapsed());
    }

    struct Panicking;

    impl LandmarkDetector for Panicking {
        fn run(self: Box<Self>, _slot: LandmarkSlot, _stop: StopSignal) {
            panic!("detector failed");
        }
    }

    #[test]
    fn panicking_detector_does_not_poison_drop() {
        let handle = spawn_detector(Panicking, LandmarkSlot::new());
        drop(handle);
    }

    #[test]
    fn replay_thread_publishes_into_slot() {
        let slot = LandmarkSlot::new();
        let replay = LandmarkReplay::new(vec![Detection::NoHand], 200.0).unwrap();
        let handle = spawn_detector(replay, slot.clone());
        let mut got = None;
        for _ in 0..200 {
            got = slot.take();
            if got.is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        drop(handle);
        assert_eq!(got, Some(Detection::NoHand));
    }
}
