//! Error types.
//!
//! [`StageError`] covers GPU setup, asset loading and decoding, animation
//! lookup and configuration. Public APIs return [`Result<T>`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StageError {
    // ========================================================================
    // GPU & Windowing
    // ========================================================================
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    #[error("Surface is not supported by the adapter")]
    SurfaceUnsupported,

    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    #[error("Window creation failed: {0}")]
    WindowCreateFailed(#[from] winit::error::OsError),

    // ========================================================================
    // Asset Loading
    // ========================================================================
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[cfg(feature = "http")]
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("HTTP response error: status {status} for {url}")]
    HttpResponseError { status: u16, url: String },

    #[error("Load task ended without a result: {0}")]
    LoadCancelled(String),

    #[error("Async runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    // ========================================================================
    // Decoding
    // ========================================================================
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    #[error("glTF error: {0}")]
    GltfError(String),

    #[error("Data URI error: {0}")]
    DataUriError(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    // ========================================================================
    // Animation
    // ========================================================================
    #[error("No animation clip in {0}")]
    MissingAnimation(String),

    // ========================================================================
    // Configuration
    // ========================================================================
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<image::ImageError> for StageError {
    fn from(err: image::ImageError) -> Self {
        StageError::ImageDecodeError(err.to_string())
    }
}

impl From<gltf::Error> for StageError {
    fn from(err: gltf::Error) -> Self {
        StageError::GltfError(err.to_string())
    }
}

/// Alias for `Result<T, StageError>`.
pub type Result<T> = std::result::Result<T, StageError>;
