// Window + software drawing utilities.
// Visual effects provided here:
// 1) A resizable window that shows the pixel wall.
// 2) Keyboard/mouse polling, including a stand-in hand for demos without a detector.
// 3) Pixel, rectangle, line and glow primitives plus a tiny 5x7 bitmap font for the HUD.

use crate::error::{Error, Result};
use crate::gesture::poses;
use crate::types::{Detection, FrameBuffer};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

/// Discrete commands from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    ToggleMode,
    Reset,
    /// Change cell size by this many pixels (grid density).
    CellSize(i32),
    /// Change block scale by this amount.
    BlockScale(f32),
}

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a resizable window.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    /// Visual: the window immediately displays the new image.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<()> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down (we'll exit when this is pressed).
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Current client-area size in pixels.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Commands whose keys went down since the last poll.
    pub fn poll_commands(&self) -> Vec<Command> {
        let once = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let repeat = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        let mut out = Vec::new();
        if once(Key::M) { out.push(Command::ToggleMode); }
        if once(Key::R) { out.push(Command::Reset); }
        if repeat(Key::Up) { out.push(Command::CellSize(2)); }
        if repeat(Key::Down) { out.push(Command::CellSize(-2)); }
        if repeat(Key::Right) { out.push(Command::BlockScale(0.1)); }
        if repeat(Key::Left) { out.push(Command::BlockScale(-0.1)); }
        out
    }

    /// Mouse position in window pixels (clamped to the window).
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| (x.max(0.0), y.max(0.0)))
    }

    /// Stand-in detector driven by the keyboard and mouse.
    /// 1 / 2 / 3 held -> OK / PEACE / THUMBS_UP pose.
    /// Left mouse held -> a hand whose thumb tip follows the pointer.
    /// Anything else -> no hand.
    pub fn simulated_detection(&self) -> Detection {
        if self.window.is_key_down(Key::Key1) {
            return Detection::Hand(poses::ok());
        }
        if self.window.is_key_down(Key::Key2) {
            return Detection::Hand(poses::peace());
        }
        if self.window.is_key_down(Key::Key3) {
            return Detection::Hand(poses::thumbs_up());
        }
        if self.window.get_mouse_down(MouseButton::Left) {
            if let Some((mx, my)) = self.mouse_pos() {
                let (w, h) = self.size();
                let nx = mx / w.max(1) as f32;
                let ny = my / h.max(1) as f32;
                // Screen is mirrored; landmarks live in camera space.
                return Detection::Hand(poses::thumb_at(1.0 - nx, ny));
            }
        }
        Detection::NoHand
    }
}

/* ---------- Software drawing: pixels, rectangles, lines, glows ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
/// Visual: the exact pixel at (x,y) changes color.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Solid rectangle, clipped to the frame.
pub fn fill_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(fb.width as i32);
    let y1 = (y + h).min(fb.height as i32);
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    for yy in y0..y1 {
        let row = yy as usize * fb.width;
        fb.pixels[row + x0 as usize..row + x1 as usize].fill(color);
    }
}

/// One-pixel rectangle outline.
pub fn stroke_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    draw_line(fb, x, y, x + w - 1, y, color);
    draw_line(fb, x, y + h - 1, x + w - 1, y + h - 1, color);
    draw_line(fb, x, y, x, y + h - 1, color);
    draw_line(fb, x + w - 1, y, x + w - 1, y + h - 1, color);
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
/// Visual: a straight 1-pixel line appears on top of the wall.
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Additive blend one RGB triplet at (x,y) with saturation to 255.
/// Visual: the pixel gets brighter/colored; repeated draws stack until white.
#[inline]
fn add_rgb_saturating(fb: &mut FrameBuffer, x: i32, y: i32, r: u8, g: u8, b: u8) {
    if x < 0 || y < 0 { return; }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height { return; }

    let idx = y * fb.width + x;
    let old = fb.pixels[idx];

    let nr = (((old >> 16) & 0xFF) as u16 + r as u16).min(255) as u32;
    let ng = (((old >> 8) & 0xFF) as u16 + g as u16).min(255) as u32;
    let nb = ((old & 0xFF) as u16 + b as u16).min(255) as u32;

    fb.pixels[idx] = (nr << 16) | (ng << 8) | nb;
}

/// Soft round glow centered at (cx,cy), additive.
/// `strength` in [0,1] scales brightness; `color` is 0x00RRGGBB.
/// Visual: a fuzzy dot of light, brightest in the middle.
pub fn draw_glow(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, color: u32, strength: f32) {
    if radius <= 0 || strength <= 0.0 { return; }
    let r2 = (radius * radius) as f32;
    let sigma = radius as f32 * 0.5; // softness; smaller = sharper edge
    let denom = 2.0 * sigma * sigma;
    let (base_r, base_g, base_b) = crate::types::unpack_rgb(color);

    // Scan just the bounding box (fast enough for small radii)
    for y in (cy - radius)..=(cy + radius) {
        for x in (cx - radius)..=(cx + radius) {
            let dx = (x - cx) as f32;
            let dy = (y - cy) as f32;
            let d2 = dx * dx + dy * dy;
            if d2 > r2 { continue; }

            // Gaussian falloff: 1.0 at center -> ~0 at edge
            let w = (-d2 / denom).exp() * strength;
            let r = (base_r as f32 * w).round().clamp(0.0, 255.0) as u8;
            let g = (base_g as f32 * w).round().clamp(0.0, 255.0) as u8;
            let b = (base_b as f32 * w).round().clamp(0.0, 255.0) as u8;
            add_rgb_saturating(fb, x, y, r, g, b);
        }
    }
}

/* ---------- 5x7 bitmap font (uppercase ASCII subset for the HUD) ---------- */

/// Return a 5x7 glyph bitmap. Each u8 is a row; the low 5 bits are the pixels
/// (bit 4 = leftmost). Lowercase letters render as uppercase.
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '/' => g!(0b00001,0b00001,0b00010,0b00100,0b01000,0b10000,0b10000),
        '!' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00000,0b00100),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y).
/// Visual: a tiny glyph appears with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        for (offset, c) in [(1, 0x0000_0000), (0, color)] {
            for (ry, rowbits) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (rowbits & (1 << (4 - rx))) != 0 {
                        put_pixel(fb, x + rx + offset, y + ry as i32 + offset, c);
                    }
                }
            }
        }
    }
}

/// Pixel width of `text` in the 5x7 font.
pub fn text_width(text: &str) -> i32 {
    text.chars().count() as i32 * 6
}

/// Draw a text string using 5x7 glyphs.
/// Visual: a compact HUD string appears; each glyph is 5x7 with 1-pixel spacing.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
}
