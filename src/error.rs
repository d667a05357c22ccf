// One error type for the whole crate.
// Every variant states *where* things went wrong. The wall itself never fails
// mid-frame; these come from the edges (window, camera, files).
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed

    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed

    #[error("Camera init error: {0}")]
    CameraInit(String), // Opening/starting the camera failed

    #[error("Camera frame error: {0}")]
    CameraFrame(String), // Grabbing/decoding a frame failed

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError), // Still-image source could not be loaded

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Landmark recording line {line}: {reason}")]
    Landmarks { line: usize, reason: String },

    #[error("Expected {expected} hand landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
