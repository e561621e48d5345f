//! GpuDevice trait - the narrow graphics-context contract driven by the session
//!
//! The session never talks to a GPU API directly. Everything it needs from
//! the graphics side (swapchain creation, image acquisition, semaphore
//! bookkeeping, presentation) goes through this trait, so the state machine
//! can be exercised with a mock device and implemented by any backend.

use crate::error::Result;

/// Pixel format of presentable images
///
/// Deliberately small: only the formats the swapchain builder can select.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    B8G8R8A8_UNORM,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    R8G8B8A8_SRGB,
    A8B8G8R8_SRGB,
    /// Backend format with no core equivalent
    Unknown,
}

/// Description of a created swapchain, reported back to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapchainDesc {
    pub width: u32,
    pub height: u32,
    pub image_count: u32,
    pub format: PixelFormat,
}

/// Transient swapchain-creation outcomes
///
/// These drive the session's internal retry loops and are never surfaced to
/// the caller; the caller only sees the fatal variants of [`crate::orbit::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapchainError {
    /// The surface currently has a degenerate extent (window minimized).
    /// Retried with backoff for as long as the platform reports the session
    /// alive.
    NoSurface,

    /// Swapchain creation failed. Retried a bounded number of times with a
    /// device idle and destroy in between, then reported fatal.
    Creation,
}

/// Outcome of an image acquisition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image was acquired at the given swapchain index
    Acquired(u32),

    /// The swapchain no longer matches the surface (out-of-date or
    /// suboptimal); the session must rebuild and retry the same frame
    OutOfDate,
}

/// GPU synchronization primitive handed between session, device, and caller
///
/// Ownership is strictly single-owner: a semaphore moves from the device's
/// pool to the session, to the device for a frame, and back (or out to an
/// external consumer). It must never be destroyed while its signalled/waited
/// status is unresolved.
pub trait GpuSemaphore {
    /// Mark the semaphore as signalled from outside the device's own
    /// submissions (e.g. by the presentation engine after an acquire)
    fn signal_external(&mut self);

    /// Whether the semaphore has a pending or delivered signal
    fn is_signalled(&self) -> bool;
}

/// Presentable image handle, backend-owned
///
/// The session only needs dimensions and format, to adopt externally
/// supplied image sets.
pub trait GpuImage {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn format(&self) -> PixelFormat;
}

/// The graphics-context contract required by [`crate::session::Session`]
///
/// Implementations own the GPU instance/device/queue handles and the
/// swapchain builder. All waits other than acquisition are bounded by driver
/// completion; `wait_idle` is the sole synchronization fence and must be
/// allowed to complete before any handle destruction.
pub trait GpuDevice {
    type Semaphore: GpuSemaphore;
    type Image: GpuImage;

    /// Install a 1-element placeholder image set so that device-created
    /// notifications can be delivered before any real surface exists
    fn init_placeholder_images(&mut self);

    /// Create the native presentation surface
    fn create_surface(&mut self) -> Result<()>;

    /// Whether the device's present queue family can present to the surface
    fn surface_supported(&self) -> Result<bool>;

    /// Destroy the surface if present (idempotent)
    fn destroy_surface(&mut self);

    /// Build a swapchain for the given desired extent, passing any previous
    /// swapchain as a recreation hint and destroying it immediately after
    /// the new one is created. On success the device owns the new image set.
    fn create_swapchain(
        &mut self,
        width: u32,
        height: u32,
    ) -> std::result::Result<SwapchainDesc, SwapchainError>;

    /// Destroy the swapchain if present (idempotent). The caller must have
    /// idled the device first.
    fn destroy_swapchain(&mut self);

    fn has_swapchain(&self) -> bool;

    /// Replace the image set with host-supplied images, bypassing the
    /// builder entirely
    fn install_external_images(&mut self, images: Vec<Self::Image>);

    /// Request an unsignalled semaphore from the recycling pool
    fn request_semaphore(&mut self) -> Result<Self::Semaphore>;

    /// Attempt to acquire the next swapchain image, with an unbounded wait.
    /// The given semaphore will be signalled by the presentation engine when
    /// the image is ready.
    fn acquire_image(&mut self, acquire: &Self::Semaphore) -> Result<AcquireOutcome>;

    /// Begin the device-side frame at the acquired image index
    fn begin_frame(&mut self, index: u32) -> Result<()>;

    /// Finalize the device-side frame. If the swapchain image was touched,
    /// this produces a signalled release semaphore retrievable via
    /// [`GpuDevice::consume_release_semaphore`].
    fn end_frame(&mut self) -> Result<()>;

    /// Whether anything was rendered into the swapchain image this frame
    fn swapchain_touched(&self) -> bool;

    /// Hand the acquire semaphore to the device for this frame (`None`
    /// clears any pending one)
    fn set_acquire_semaphore(&mut self, semaphore: Option<Self::Semaphore>);

    /// Take ownership of the frame's release semaphore, if one was produced
    fn consume_release_semaphore(&mut self) -> Option<Self::Semaphore>;

    /// Present the current image, waiting on the release semaphore. The
    /// semaphore is consumed unconditionally: recycled or deferred-destroyed
    /// on success, destroyed behind a device idle on failure.
    fn present(&mut self, release: Self::Semaphore, index: u32) -> Result<()>;

    /// Block until all submitted GPU work has completed
    fn wait_idle(&mut self);
}
