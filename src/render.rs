// Software render pass for the wall.
// Visual outcomes:
// - Every grid cell becomes a square slab; brighter cells stand further out,
//   drawn as a lifted face over a darker side.
// - Falling emoji show as colored glows with a short tag, fading as they land.
// - HUD: levels panel and mode label on the right, FPS and key hints on the left,
//   a red notice line when the camera or detector failed, and a mirrored
//   landmark preview while a hand is tracked.

use tracing::warn;

use crate::draw::{draw_glow, draw_line, draw_text_5x7, fill_rect, put_pixel, stroke_rect, text_width};
use crate::error::Result;
use crate::gesture::GestureEvent;
use crate::types::{FrameBuffer, LandmarkFrame, pack_rgb};
use crate::wall::PixelWall;

const BACKGROUND: u32 = 0x0000_1122;
const HUD_TEXT: u32 = 0x00E0_F7FF;
const PANEL_BG: u32 = 0x0000_0000;
const NOTICE: u32 = 0x00FF_5555;
const DEBUG_BORDER: u32 = 0x00FF_4D94;
const DEBUG_POINT: u32 = 0x0000_FFCC;

/// Pixels of lift per unit of depth, relative to the cell size.
const LIFT_PER_DEPTH: f32 = 0.08;

const DEBUG_W: i32 = 160;
const DEBUG_H: i32 = 120;
const SPRITE_RADIUS: i32 = 18;

/// Landmark pairs drawn as bones in the preview.
const HAND_BONES: [(usize, usize); 20] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (17, 18), (18, 19), (19, 20),
];

/// Text the window loop wants on screen this frame.
#[derive(Default)]
pub struct Hud {
    pub fps_text: String,
    pub notice: Option<String>,
}

impl Hud {
    /// Fold one `read_frame` outcome into the notice line.
    /// A read error shows until the next good frame; returns whether to sample.
    pub fn frame_result(&mut self, result: Result<bool>) -> bool {
        match result {
            Ok(ready) => {
                if ready {
                    self.notice = None;
                }
                ready
            }
            Err(e) => {
                warn!("{e}");
                self.notice = Some(e.to_string());
                false
            }
        }
    }
}

/// Short stand-in for the glyph (the bitmap font has no emoji) and its glow color.
fn sprite_style(gesture: GestureEvent) -> (&'static str, u32) {
    match gesture {
        GestureEvent::Ok => ("OK", 0x00FF_C850),
        GestureEvent::Peace => ("V", 0x0070_D0FF),
        GestureEvent::ThumbsUp => ("UP", 0x0080_FF80),
    }
}

#[inline]
fn scale_color(color: [f32; 3], k: f32) -> u32 {
    let c = |v: f32| (v * k * 255.0).round().clamp(0.0, 255.0) as u8;
    pack_rgb(c(color[0]), c(color[1]), c(color[2]))
}

/// Draw the whole frame into `fb` (sized to the window).
pub fn render_wall(fb: &mut FrameBuffer, wall: &PixelWall, hud: &Hud) {
    fb.fill(BACKGROUND);
    draw_blocks(fb, wall);
    draw_sprites(fb, wall);
    draw_panel(fb, wall);
    draw_status(fb, wall, hud);
    if let Some(hand) = wall.last_hand() {
        draw_hand_preview(fb, hand);
    }
}

fn draw_blocks(fb: &mut FrameBuffer, wall: &PixelWall) {
    let grid = wall.grid();
    let cell = grid.cell_size() as i32;
    for c in grid.cells() {
        let size = ((cell as f32 * c.scale[0]).round() as i32).max(1);
        let inset = (cell - size) / 2;
        let x = c.column as i32 * cell + inset;
        let y = c.row as i32 * cell + inset;
        let lift = (c.depth * cell as f32 * LIFT_PER_DEPTH).round() as i32;

        // Side face stays in place, front face moves up-left by the lift.
        if lift > 0 {
            fill_rect(fb, x, y, size, size, scale_color(c.color, 0.45));
        }
        fill_rect(fb, x - lift, y - lift, size, size, scale_color(c.color, 1.0));
    }
}

fn draw_sprites(fb: &mut FrameBuffer, wall: &PixelWall) {
    let height = wall.grid().viewport().height;
    for s in wall.sprites() {
        let (tag, color) = sprite_style(s.gesture);
        let cx = s.x.round() as i32;
        let cy = s.y(height).round() as i32 + SPRITE_RADIUS;
        let alpha = s.opacity();
        draw_glow(fb, cx, cy, SPRITE_RADIUS, color, alpha);
        if alpha > 0.2 {
            draw_text_5x7(fb, cx - text_width(tag) / 2, cy - 3, tag, 0x00FF_FFFF);
        }
    }
}

/// Levels panel (top right).
fn draw_panel(fb: &mut FrameBuffer, wall: &PixelWall) {
    let c = wall.control();
    let lines = [
        format!("R: {:.2}", c.red_gain),
        format!("G: {:.2}", c.green_gain),
        format!("B: {:.2}", c.blue_gain),
        format!("BRIGHTNESS: {:.2}", c.brightness),
        format!("MODE: {}", wall.mode().label()),
    ];
    let width = lines.iter().map(|l| text_width(l)).max().unwrap_or(0) + 16;
    let x = fb.width as i32 - width - 20;
    let y = 150;
    fill_rect(fb, x, y, width, lines.len() as i32 * 12 + 12, PANEL_BG);
    for (i, line) in lines.iter().enumerate() {
        draw_text_5x7(fb, x + 8, y + 8 + i as i32 * 12, line, HUD_TEXT);
    }
}

/// FPS, key hints and any error notice (left side).
fn draw_status(fb: &mut FrameBuffer, wall: &PixelWall, hud: &Hud) {
    let grid = wall.grid();
    let (cols, rows) = grid.dimensions();
    let line = format!(
        "{} | GRID {}X{} CELL {} SCALE {:.1}",
        hud.fps_text, cols, rows, grid.cell_size(), grid.block_scale()
    );
    draw_text_5x7(fb, 8, 8, &line, 0x00FF_FFFF);
    draw_text_5x7(fb, 8, 20, "M: MODE  R: RESET  UP/DOWN: CELL  LEFT/RIGHT: SCALE", HUD_TEXT);
    draw_text_5x7(fb, 8, 32, "HOLD LMB: HAND  1/2/3: OK/PEACE/THUMBS UP", HUD_TEXT);

    if let Some(notice) = &hud.notice {
        let y = fb.height as i32 - 16;
        draw_text_5x7(fb, 8, y, notice, NOTICE);
    }
}

/// Mirrored landmark preview (top right), like looking into a mirror.
fn draw_hand_preview(fb: &mut FrameBuffer, hand: &LandmarkFrame) {
    let ox = fb.width as i32 - DEBUG_W - 20;
    let oy = 20;
    fill_rect(fb, ox, oy, DEBUG_W, DEBUG_H, PANEL_BG);
    stroke_rect(fb, ox - 1, oy - 1, DEBUG_W + 2, DEBUG_H + 2, DEBUG_BORDER);

    let to_px = |i: usize| {
        let p = hand.point(i);
        let x = ox + ((1.0 - p.x) * DEBUG_W as f32).round() as i32;
        let y = oy + (p.y * DEBUG_H as f32).round() as i32;
        (x.clamp(ox, ox + DEBUG_W - 1), y.clamp(oy, oy + DEBUG_H - 1))
    };

    for (a, b) in HAND_BONES {
        let (x0, y0) = to_px(a);
        let (x1, y1) = to_px(b);
        draw_line(fb, x0, y0, x1, y1, 0x0040_8080);
    }
    for i in 0..hand.points().len() {
        let (x, y) = to_px(i);
        for (dx, dy) in [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)] {
            put_pixel(fb, x + dx, y + dy, DEBUG_POINT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WallConfig;
    use crate::error::Error;
    use crate::gesture::poses;
    use crate::types::{Detection, Viewport};
    use std::time::{Duration, Instant};

    #[test]
    fn red_wall_renders_red_blocks() {
        let cfg = WallConfig { block_scale: 1.0, ..WallConfig::default() };
        let mut wall = PixelWall::new(cfg, Viewport::new(100, 100)).unwrap();
        let mut frame = FrameBuffer::new(10, 10);
        frame.fill(pack_rgb(255, 0, 0));
        wall.tick(&frame, Duration::from_millis(16));

        let mut fb = FrameBuffer::new(100, 100);
        render_wall(&mut fb, &wall, &Hud::default());
        // Bottom-right corner is covered by a block's side face, away from the HUD text.
        let (r, g, b) = crate::types::unpack_rgb(fb.pixels[99 * 100 + 99]);
        assert!(r > 0 && g == 0 && b == 0);
    }

    #[test]
    fn frame_error_notice_clears_on_next_good_frame() {
        let mut hud = Hud::default();
        assert!(!hud.frame_result(Err(Error::CameraFrame("Fetch frame: timeout".into()))));
        assert!(hud.notice.as_deref().is_some_and(|n| n.contains("timeout")));

        // Not ready yet: nothing new to report either way.
        assert!(!hud.frame_result(Ok(false)));
        assert!(hud.notice.is_some());

        assert!(hud.frame_result(Ok(true)));
        assert!(hud.notice.is_none());
    }

    #[test]
    fn hand_preview_follows_tracking() {
        let mut wall = PixelWall::new(WallConfig::default(), Viewport::new(400, 300)).unwrap();
        let mut fb = FrameBuffer::new(400, 300);
        // Top-left corner of the preview border.
        let corner = (400 - DEBUG_W - 21) as usize + 19 * 400;

        wall.on_detection(&Detection::Hand(poses::open_hand()), Instant::now());
        render_wall(&mut fb, &wall, &Hud::default());
        assert_eq!(fb.pixels[corner], DEBUG_BORDER);

        wall.on_detection(&Detection::NoHand, Instant::now());
        render_wall(&mut fb, &wall, &Hud::default());
        assert_ne!(fb.pixels[corner], DEBUG_BORDER);
    }

    #[test]
    fn scale_color_clamps() {
        assert_eq!(scale_color([1.0, 0.5, 0.0], 2.0), pack_rgb(255, 255, 0));
    }
}
