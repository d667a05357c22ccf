// Video sources for the wall.
// Visual expectation: each tick the render loop calls `read_frame()` on one
// of these and gets the newest picture packed as 0x00RRGGBB into a buffer it
// reuses; the sampler then turns that picture into block colors.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{FrameBuffer, pack_rgb};

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

// `image` buffers are what both the camera decode and still pictures produce.
use image::RgbImage;
use tracing::info;

/// Anything that can hand the wall a frame on demand.
pub trait VideoSource {
    /// Decoded frame size, or `None` while the source has not resolved it yet.
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Write the current frame into `frame` (resizing it if needed).
    /// `Ok(false)` means "not ready yet, skip this tick".
    fn read_frame(&mut self, frame: &mut FrameBuffer) -> Result<bool>;
}

/// Pack an RGB image into the scratch frame, reusing its allocation.
pub fn copy_rgb_image(img: &RgbImage, frame: &mut FrameBuffer) {
    let (w, h) = img.dimensions();
    frame.resize(w as usize, h as usize);
    for (dst, px) in frame.pixels.iter_mut().zip(img.pixels()) {
        *dst = pack_rgb(px[0], px[1], px[2]);
    }
}

// A small wrapper around nokhwa::Camera so our main loop stays clean.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
}

impl CameraCapture {
    /// Open camera `index` near the requested resolution (falls back if not exact).
    /// Nothing reaches the screen until the first `read_frame`.
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self> {
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,                // target FPS
        );

        // Ask for RGB frames, closest match to our request.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req)
            .map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;

        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        // The actual stream might choose a slightly different resolution.
        let actual = cam.resolution();
        info!(index, width = actual.width(), height = actual.height(), "camera opened");

        Ok(Self {
            cam,
            width: actual.width(),
            height: actual.height(),
        })
    }
}

impl VideoSource for CameraCapture {
    fn dimensions(&self) -> Option<(u32, u32)> {
        (self.width > 0 && self.height > 0).then_some((self.width, self.height))
    }

    /// Grab one frame (blocks until the camera has one) and decode it to RGB.
    fn read_frame(&mut self, frame: &mut FrameBuffer) -> Result<bool> {
        if self.dimensions().is_none() {
            return Ok(false);
        }

        let raw = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

        let rgb_img = raw
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        // Pack inline: nokhwa hands back its own `image` buffer type.
        let (w, h) = rgb_img.dimensions();
        frame.resize(w as usize, h as usize);
        for (dst, px) in frame.pixels.iter_mut().zip(rgb_img.pixels()) {
            *dst = pack_rgb(px[0], px[1], px[2]);
        }
        Ok(frame.is_ready())
    }
}

/// A picture file served as a never-changing frame.
/// Visual: the wall shows the picture; gestures still tint it.
pub struct StillImageSource {
    image: RgbImage,
}

impl StillImageSource {
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path)?.to_rgb8();
        info!(path = %path.display(), width = image.width(), height = image.height(), "still image loaded");
        Ok(Self { image })
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }
}

impl VideoSource for StillImageSource {
    fn dimensions(&self) -> Option<(u32, u32)> {
        let (w, h) = self.image.dimensions();
        (w > 0 && h > 0).then_some((w, h))
    }

    fn read_frame(&mut self, frame: &mut FrameBuffer) -> Result<bool> {
        if self.dimensions().is_none() {
            return Ok(false);
        }
        // Same picture every tick; only copy when the scratch buffer is stale.
        let (w, h) = self.image.dimensions();
        if frame.width != w as usize || frame.height != h as usize {
            copy_rgb_image(&self.image, frame);
        }
        Ok(true)
    }
}
