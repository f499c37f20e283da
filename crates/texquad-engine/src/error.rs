use thiserror::Error;

use crate::image::ImageError;

/// Errors produced while setting up or drawing the textured quad.
///
/// Every variant is fatal for the current frame: nothing is presented after an
/// error is returned, and the host decides whether to tear down or retry.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The device reported an error while `op` was being recorded.
    #[error("{op}: gpu error: {message}")]
    GpuOperation { op: &'static str, message: String },

    /// WGSL source failed to parse or validate.
    #[error("shader `{label}` failed to compile:\n{message}")]
    ShaderCompile { label: &'static str, message: String },

    /// Module compiled but cannot be assembled into the quad pipeline.
    #[error("shader `{label}` failed to link: {message}")]
    ShaderLink { label: &'static str, message: String },

    /// A frame or texture operation was issued before setup completed.
    #[error("render state is not ready (surface not created or already destroyed)")]
    NotReady,

    /// Setup was requested twice within one surface lifetime.
    #[error("render state is already initialized for this surface")]
    AlreadyInitialized,

    #[error(transparent)]
    Image(#[from] ImageError),
}

impl RenderError {
    /// Returns `true` for errors raised by the device or shader toolchain,
    /// as opposed to lifecycle misuse.
    pub fn is_gpu_failure(&self) -> bool {
        matches!(
            self,
            Self::GpuOperation { .. } | Self::ShaderCompile { .. } | Self::ShaderLink { .. }
        )
    }
}
