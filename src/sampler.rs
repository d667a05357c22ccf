// Pixelation pass: map the live frame onto the coarse grid.
// Visual expectation: after `sample`, every block carries the color of one
// camera pixel (mirrored like a selfie view), tinted by the hand-controlled
// gains, and sticks out of the wall in proportion to how bright it is.

use crate::config::DEPTH_MULTIPLIER;
use crate::control::ControlState;
use crate::grid::GridStore;
use crate::types::FrameBuffer;

/// Rec. 601 luma weights.
const LUMA: [f32; 3] = [0.299, 0.587, 0.114];

#[derive(Clone, Copy, Debug)]
pub struct FrameSampler {
    depth_multiplier: f32,
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self { depth_multiplier: DEPTH_MULTIPLIER }
    }
}

/// Source-space step for one grid axis: floor(src / (viewport / cell)).
/// The divisor is the *unfloored* cell count, as the layout is computed.
fn step(source: usize, viewport: u32, cell_size: u32) -> i64 {
    let cells = viewport as f64 / cell_size as f64;
    (source as f64 / cells).floor() as i64
}

/// Gain first, brightness second, one clamp at the end.
#[inline]
fn apply_gain(value: u8, gain: f32, brightness: f32) -> f32 {
    (value as f32 * gain * brightness).clamp(0.0, 255.0)
}

impl FrameSampler {
    pub fn new(depth_multiplier: f32) -> Self {
        Self { depth_multiplier }
    }

    /// Overwrite every cell from `frame`. Returns false (and touches nothing)
    /// when the frame is not ready yet or the grid is empty.
    pub fn sample(&self, frame: &FrameBuffer, grid: &mut GridStore, control: &ControlState) -> bool {
        if !frame.is_ready() || grid.is_empty() {
            return false;
        }

        let viewport = grid.viewport();
        let cell_size = grid.cell_size();
        let step_x = step(frame.width, viewport.width, cell_size);
        let step_y = step(frame.height, viewport.height, cell_size);
        let max_x = frame.width as i64 - 1;
        let max_y = frame.height as i64 - 1;

        for cell in grid.cells_mut() {
            // Mirror horizontally (front camera), keep vertical as is.
            let sx = (max_x - cell.column as i64 * step_x).clamp(0, max_x) as usize;
            let sy = (cell.row as i64 * step_y).clamp(0, max_y) as usize;
            let (r, g, b) = frame.rgb_at(sx, sy);

            let out_r = apply_gain(r, control.red_gain, control.brightness);
            let out_g = apply_gain(g, control.green_gain, control.brightness);
            let out_b = apply_gain(b, control.blue_gain, control.brightness);

            let luma = (LUMA[0] * out_r + LUMA[1] * out_g + LUMA[2] * out_b) / 255.0;
            cell.set_sample(
                [out_r / 255.0, out_g / 255.0, out_b / 255.0],
                luma * self.depth_multiplier,
            );
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Viewport, pack_rgb};
    use proptest::prelude::*;

    fn uniform(w: usize, h: usize, color: u32) -> FrameBuffer {
        let mut fb = FrameBuffer::new(w, h);
        fb.fill(color);
        fb
    }

    #[test]
    fn unready_frame_is_skipped() {
        let mut grid = GridStore::new(Viewport::new(40, 40), 20, 0.9);
        grid.cells_mut()[0].set_sample([0.25, 0.5, 0.75], 1.0);
        let before = grid.cells().to_vec();

        let sampled = FrameSampler::default().sample(&FrameBuffer::default(), &mut grid, &ControlState::default());
        assert!(!sampled);
        assert_eq!(grid.cells(), before.as_slice());
    }

    #[test]
    fn pure_red_gives_red_blocks_and_fixed_depth() {
        let frame = uniform(64, 48, pack_rgb(255, 0, 0));
        let mut grid = GridStore::new(Viewport::new(200, 100), 20, 0.9);
        assert!(FrameSampler::default().sample(&frame, &mut grid, &ControlState::default()));
        for cell in grid.cells() {
            assert_eq!(cell.color, [1.0, 0.0, 0.0]);
            assert!((cell.depth - 1.495).abs() < 1e-5);
        }
    }

    #[test]
    fn horizontal_sampling_is_mirrored() {
        // Left half black, right half white; first column must read the right edge.
        let mut frame = FrameBuffer::new(40, 10);
        for y in 0..10 {
            for x in 20..40 {
                frame.pixels[y * 40 + x] = pack_rgb(255, 255, 255);
            }
        }
        let mut grid = GridStore::new(Viewport::new(40, 10), 10, 0.9);
        FrameSampler::default().sample(&frame, &mut grid, &ControlState::default());
        assert_eq!(grid.cell(0, 0).unwrap().color, [1.0, 1.0, 1.0]);
        assert_eq!(grid.cell(3, 0).unwrap().color, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn clamp_happens_after_both_multiplications() {
        // 200 * 2.0 * 0.5 = 200: clamping after the gain alone would give 127.5.
        let frame = uniform(4, 4, pack_rgb(200, 0, 0));
        let mut grid = GridStore::new(Viewport::new(20, 20), 10, 0.9);
        let control = ControlState { red_gain: 2.0, brightness: 0.5, ..ControlState::default() };
        FrameSampler::default().sample(&frame, &mut grid, &control);
        assert!((grid.cells()[0].color[0] - 200.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn small_source_with_large_grid_stays_in_bounds() {
        // 2x2 source, 10x8 grid: steps round to 0, coordinates clamp.
        let mut frame = FrameBuffer::new(2, 2);
        frame.pixels.copy_from_slice(&[
            pack_rgb(10, 20, 30), pack_rgb(250, 250, 250),
            pack_rgb(0, 0, 0), pack_rgb(128, 128, 128),
        ]);
        let mut grid = GridStore::new(Viewport::new(100, 80), 10, 0.9);
        let control = ControlState { red_gain: 2.0, green_gain: 2.0, blue_gain: 2.0, brightness: 2.0 };
        assert!(FrameSampler::default().sample(&frame, &mut grid, &control));
        for cell in grid.cells() {
            // top-right pixel, saturated
            assert_eq!(cell.color, [1.0, 1.0, 1.0]);
        }
    }

    proptest! {
        #[test]
        fn output_channels_stay_in_unit_range(
            r in any::<u8>(), g in any::<u8>(), b in any::<u8>(),
            rg in 0.5f32..=2.0, gg in 0.5f32..=2.0, bg in 0.5f32..=2.0, br in 0.5f32..=2.0,
        ) {
            let frame = uniform(2, 2, pack_rgb(r, g, b));
            let mut grid = GridStore::new(Viewport::new(60, 40), 20, 0.9);
            let control = ControlState { red_gain: rg, green_gain: gg, blue_gain: bg, brightness: br };
            FrameSampler::default().sample(&frame, &mut grid, &control);
            for cell in grid.cells() {
                for c in cell.color {
                    prop_assert!((0.0..=1.0).contains(&c));
                }
                prop_assert!(cell.depth >= 0.0 && cell.depth <= DEPTH_MULTIPLIER + 1e-4);
            }
        }
    }
}
