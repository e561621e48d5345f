//! Error types for the Orbit WSI presentation engine
//!
//! This module defines the error types surfaced by the session API.
//! The transient swapchain-builder taxonomy (`SwapchainError`) lives with
//! the device contract in `device.rs` and never escapes the retry loops.

use std::fmt;

/// Result type for Orbit WSI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Orbit WSI errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Initialization failed (context, surface, or initial swapchain)
    InitializationFailed(String),

    /// The chosen GPU queue family cannot present to the created surface
    UnsupportedSurface,

    /// The swapchain is gone and could not be rebuilt; the session must be
    /// torn down and reinitialized by the caller
    SwapchainUnavailable,

    /// Presenting the current frame failed; the session forces a rebuild on
    /// the next frame but this frame is lost
    PresentFailed,

    /// Session API called in a state that does not allow it
    InvalidState(String),

    /// Backend-specific error (Vulkan, mock, etc.)
    BackendError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::UnsupportedSurface => write!(f, "Surface not supported by the present queue"),
            Error::SwapchainUnavailable => write!(f, "Swapchain unavailable"),
            Error::PresentFailed => write!(f, "Presentation failed"),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an ERROR entry and build an [`Error::BackendError`] from the same message
///
/// # Example
///
/// ```no_run
/// use orbit_wsi::wsi_err;
///
/// let err = wsi_err!("orbit::vulkan", "Failed to wait idle: {}", "device lost");
/// ```
#[macro_export]
macro_rules! wsi_err {
    ($source:expr, $($arg:tt)*) => {{
        $crate::wsi_error!($source, $($arg)*);
        $crate::orbit::Error::BackendError(format!($($arg)*))
    }};
}

/// Log an ERROR entry and return early with `Err(Error::BackendError(...))`
///
/// # Example
///
/// ```no_run
/// use orbit_wsi::wsi_bail;
///
/// fn adopt(images: &[u32]) -> orbit_wsi::orbit::Result<()> {
///     if images.is_empty() {
///         wsi_bail!("orbit::Session", "External image set is empty");
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! wsi_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::wsi_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
