/*!
# Orbit WSI

Core traits and types for the Orbit window-system-integration engine: the
presentation-surface lifecycle and frame-pacing session that keeps a valid,
synchronized chain of presentable images alive across the lifetime of an
application window.

The session state machine is platform- and API-agnostic: it drives a
[`platform::SurfacePlatform`] (window dimensions, liveness, input, timing,
event hooks) and a [`device::GpuDevice`] (swapchain building, image
acquisition, semaphore bookkeeping, presentation) through narrow trait
contracts. Backend implementations (Vulkan via `orbit_wsi_vulkan`) provide
concrete types for these traits.

## Architecture

- **Session**: the frame loop and recovery protocol (`begin_frame` /
  `end_frame`), including external-frame mode
- **SurfacePlatform**: platform-provider contract with lifecycle event hooks
- **GpuDevice / GpuSemaphore / GpuImage**: graphics-context capability traits
- **FrameTimer**: per-frame pacing, wall-clock or host-driven
*/

// Internal modules
mod error;
mod timer;
pub mod log;
pub mod device;
pub mod platform;
pub mod session;

// Mock collaborators for unit tests (no GPU required)
#[cfg(test)]
pub mod mock_device;
#[cfg(test)]
pub mod mock_platform;

// Main orbit namespace module
pub mod orbit {
    // Error types
    pub use crate::error::{Error, Result};

    // Session state machine
    pub use crate::session::Session;

    // Frame timing
    pub use crate::timer::FrameTimer;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        pub use crate::log::{set_logger, reset_logger};
        // Note: wsi_* macros are exported at the crate root
    }

    // Device sub-module with the graphics-context contract
    pub mod device {
        pub use crate::device::*;
    }

    // Platform sub-module with the provider contract
    pub mod platform {
        pub use crate::platform::*;
    }
}
