// What you SEE:
// • The camera (or a still picture) as a wall of colored blocks; bright blocks stand out.
// • RGB mode: pinch distances between thumb and each finger tint R/G/B and brightness.
// • EMOJI mode: OK / peace / thumbs-up drop a falling emoji.
// • M toggles mode, R resets, arrows change grid density and block size, ESC quits.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use tracing::{error, info};

use pixel_wall::camera::{CameraCapture, StillImageSource, VideoSource};
use pixel_wall::config::{DistanceMapping, GestureTrigger, WallConfig};
use pixel_wall::detector::{LandmarkReplay, LandmarkSlot, spawn_detector};
use pixel_wall::draw::{Command, Drawer};
use pixel_wall::mode::Mode;
use pixel_wall::render::{Hud, render_wall};
use pixel_wall::types::{FrameBuffer, Viewport};
use pixel_wall::wall::PixelWall;
use pixel_wall::Result;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MappingArg {
    /// clamp(d * 5, 0.5, 2.0)
    Linear,
    /// clamp d to [0.05, 0.3], rescale to [0.5, 2.0]
    ClampRescale,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Continuous,
    Discrete,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TriggerArg {
    /// Fire on every detector result while the pose is held
    Every,
    /// Fire once when the pose appears
    Edge,
    /// Fire at most once per --cooldown-ms while held
    Cooldown,
}

#[derive(Parser, Debug)]
#[command(name = "pixel-wall")]
#[command(about = "Live camera pixel wall steered by hand gestures")]
#[command(version)]
struct Cli {
    /// Camera index to open
    #[arg(short, long, default_value = "0")]
    camera: u32,

    /// Requested camera width
    #[arg(long, default_value = "640")]
    width: u32,

    /// Requested camera height
    #[arg(long, default_value = "480")]
    height: u32,

    /// Show a picture file instead of the camera
    #[arg(long)]
    image: Option<PathBuf>,

    /// Replay recorded hand landmarks (JSON lines) instead of the mouse/keyboard hand
    #[arg(long)]
    landmarks: Option<PathBuf>,

    /// Replay rate for --landmarks (0.1 to 1000 Hz)
    #[arg(long, default_value = "30")]
    landmark_hz: f32,

    /// Screen pixels per grid cell
    #[arg(long, default_value_t = pixel_wall::config::DEFAULT_CELL_SIZE)]
    cell_size: u32,

    /// Block size relative to its cell (0, 1]
    #[arg(long, default_value_t = pixel_wall::config::DEFAULT_BLOCK_SCALE)]
    block_scale: f32,

    /// Finger distance to gain mapping
    #[arg(long, value_enum, default_value = "linear")]
    mapping: MappingArg,

    /// Mode the reset key lands in
    #[arg(long, value_enum, default_value = "continuous")]
    reset_mode: ModeArg,

    /// When a held pose drops emoji
    #[arg(long, value_enum, default_value = "edge")]
    trigger: TriggerArg,

    /// Interval for --trigger cooldown
    #[arg(long, default_value = "500")]
    cooldown_ms: u64,
}

impl Cli {
    fn wall_config(&self) -> WallConfig {
        let mode = |m: ModeArg| match m {
            ModeArg::Continuous => Mode::Continuous,
            ModeArg::Discrete => Mode::Discrete,
        };
        WallConfig {
            cell_size: self.cell_size,
            block_scale: self.block_scale,
            mapping: match self.mapping {
                MappingArg::Linear => DistanceMapping::LINEAR,
                MappingArg::ClampRescale => DistanceMapping::CLAMP_RESCALE,
            },
            reset_mode: mode(self.reset_mode),
            trigger: match self.trigger {
                TriggerArg::Every => GestureTrigger::EveryCallback,
                TriggerArg::Edge => GestureTrigger::RisingEdge,
                TriggerArg::Cooldown => GestureTrigger::Cooldown(Duration::from_millis(self.cooldown_ms)),
            },
            ..WallConfig::default()
        }
    }
}

/// Open the requested source. A failed camera is reported, not fatal:
/// the wall keeps running (dark) with a notice on screen.
fn open_source(cli: &Cli) -> Result<(Option<Box<dyn VideoSource>>, Option<String>)> {
    if let Some(path) = &cli.image {
        return Ok((Some(Box::new(StillImageSource::open(path)?)), None));
    }
    match CameraCapture::new(cli.camera, cli.width, cli.height) {
        Ok(cam) => Ok((Some(Box::new(cam)), None)),
        Err(e) => {
            error!("{e}");
            Ok((None, Some(format!("CAMERA ERROR: {e}"))))
        }
    }
}

fn main() -> Result<()> {
    // RUST_LOG controls verbosity, e.g. RUST_LOG=pixel_wall=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = cli.wall_config();

    /* --- Video source + window setup ---
       Visual: window opens; blocks fill in as soon as the first frame arrives. */
    let (mut source, mut notice) = open_source(&cli)?;
    let (w, h) = source
        .as_ref()
        .and_then(|s| s.dimensions())
        .unwrap_or((cli.width, cli.height));
    let mut drawer = Drawer::new("Pixel Wall", w as usize, h as usize)?;

    let (win_w, win_h) = drawer.size();
    let mut wall = PixelWall::new(config, Viewport::new(win_w as u32, win_h as u32))?;

    /* --- Detector boundary ---
       Visual: with --landmarks the recorded hand drives the wall; otherwise
       hold LMB or 1/2/3 to stand in for a hand. */
    let slot = LandmarkSlot::new();
    let _replay = match &cli.landmarks {
        Some(path) => {
            let replay = LandmarkReplay::from_file(path, cli.landmark_hz)?;
            info!("landmark replay started");
            Some(spawn_detector(replay, slot.clone()))
        }
        None => None,
    };

    /* --- Reusable buffers ---
       `camera_frame` is the scratch frame the sampler reads; `screen` is what you see. */
    let mut camera_frame = FrameBuffer::default();
    let mut screen = FrameBuffer::new(win_w, win_h);
    let mut hud = Hud { fps_text: String::from("FPS: 0.0"), ..Hud::default() };
    hud.notice = notice.take();

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut last_frame_time = Instant::now();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();
        let dt = now - last_frame_time;
        last_frame_time = now;

        /* 1) Follow window size: the grid is laid out on the visible area. */
        let (win_w, win_h) = drawer.size();
        if (win_w, win_h) != (screen.width, screen.height) {
            screen.resize(win_w, win_h);
            wall.resize(Viewport::new(win_w as u32, win_h as u32));
        }

        /* 2) Keyboard commands */
        for cmd in drawer.poll_commands() {
            match cmd {
                Command::ToggleMode => { wall.toggle_mode(); }
                Command::Reset => wall.reset(),
                Command::CellSize(delta) => {
                    let next = wall.config().cell_size as i32 + delta;
                    wall.set_cell_size(next.max(1) as u32);
                }
                Command::BlockScale(delta) => wall.set_block_scale(wall.config().block_scale + delta),
            }
        }

        /* 3) Detector results: newest one only. */
        if cli.landmarks.is_none() {
            slot.publish(drawer.simulated_detection());
        }
        if let Some(detection) = slot.take() {
            wall.on_detection(&detection, now);
        }

        /* 4) Grab the current frame and resample the wall.
           Visual: block colors follow the camera; sprites keep falling either way. */
        let ready = match source.as_mut() {
            Some(src) => hud.frame_result(src.read_frame(&mut camera_frame)),
            None => false,
        };
        if ready {
            wall.tick(&camera_frame, dt);
        } else {
            // Still advance sprites; the sampler skips an unready frame.
            wall.tick(&FrameBuffer::default(), dt);
        }

        /* 5) Draw and present */
        render_wall(&mut screen, &wall, &hud);
        drawer.present(&screen)?;

        /* 6) FPS counter (logged + HUD once per second) */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            info!(fps, "frame rate");
            hud.fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    Ok(())
}
