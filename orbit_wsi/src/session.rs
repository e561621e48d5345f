//! Session - the presentation-surface lifecycle and frame-pacing state machine
//!
//! Owns the swapchain (through the device contract), the acquire/release
//! semaphore hand-off, and the recovery protocol for asynchronous surface
//! invalidation (resize, minimize, out-of-date). Supports two operating
//! modes per frame: self-managed presentation, and externally injected
//! frames where a host compositor supplies the image index and
//! synchronization primitives.
//!
//! The frame API (`begin_frame` / `end_frame`) is driven by a single logical
//! producer thread; the session is not designed for concurrent invocation
//! and holds no internal locks.

use std::thread;
use std::time::Duration;

use crate::device::{AcquireOutcome, GpuDevice, GpuImage, GpuSemaphore, PixelFormat, SwapchainDesc, SwapchainError};
use crate::error::{Error, Result};
use crate::platform::SurfacePlatform;
use crate::{wsi_error, wsi_info, wsi_warn, wsi_bail};

const SRC: &str = "orbit::Session";

/// Bounded retry count for swapchain creation failures
const MAX_CREATION_RETRIES: u32 = 3;

/// Backoff while the surface has a degenerate extent (window minimized)
const NO_SURFACE_BACKOFF: Duration = Duration::from_millis(10);

/// Presentation session driving a platform surface and a GPU device
///
/// Lifecycle: `new` → `initialize` (or `init_external_context` +
/// `reinit_external_swapchain`) → `begin_frame`/`end_frame` per frame →
/// `deinit` (also run on drop).
pub struct Session<D: GpuDevice> {
    platform: Box<dyn SurfacePlatform<D>>,
    device: Option<D>,

    width: u32,
    height: u32,
    aspect_ratio: f32,
    format: PixelFormat,

    /// Image index selected for the in-progress frame
    swapchain_index: u32,

    /// False only between a successful acquire and the matching end of frame
    need_acquire: bool,

    frame_is_external: bool,
    external_frame_index: u32,
    external_frame_time: f64,
    external_acquire: Option<D::Semaphore>,
    external_release: Option<D::Semaphore>,
}

impl<D: GpuDevice> Session<D> {
    pub fn new(platform: Box<dyn SurfacePlatform<D>>) -> Self {
        Self {
            platform,
            device: None,
            width: 0,
            height: 0,
            aspect_ratio: 1.0,
            format: PixelFormat::Unknown,
            swapchain_index: 0,
            need_acquire: true,
            frame_is_external: false,
            external_frame_index: 0,
            external_frame_time: 0.0,
            external_acquire: None,
            external_release: None,
        }
    }

    /// Bind the device, create the surface, and build the initial swapchain
    ///
    /// The device gets a 1-element placeholder image set before the
    /// device-created event fires, so listeners can create resources before
    /// any real surface exists.
    pub fn initialize(&mut self, mut device: D) -> Result<()> {
        device.init_placeholder_images();
        self.platform.event_device_created(&device);

        if let Err(e) = device.create_surface() {
            return Err(Error::InitializationFailed(format!(
                "surface creation failed: {}",
                e
            )));
        }

        match device.surface_supported() {
            Ok(true) => {}
            Ok(false) => return Err(Error::UnsupportedSurface),
            Err(e) => {
                return Err(Error::InitializationFailed(format!(
                    "surface support query failed: {}",
                    e
                )))
            }
        }

        self.device = Some(device);

        let width = self.platform.surface_width();
        let height = self.platform.surface_height();
        self.aspect_ratio = self.platform.aspect_ratio();

        if self.blocking_create_swapchain(width, height).is_err() {
            return Err(Error::InitializationFailed(
                "initial swapchain creation failed".to_string(),
            ));
        }

        self.platform.frame_timer().reset();
        Ok(())
    }

    /// Bind an externally constructed device without creating a surface
    ///
    /// Used when a host compositor owns presentation; follow with
    /// [`Session::reinit_external_swapchain`] before the first frame.
    pub fn init_external_context(&mut self, mut device: D) -> Result<()> {
        device.init_placeholder_images();
        self.platform.event_device_created(&device);
        self.device = Some(device);
        Ok(())
    }

    /// Adopt a host-supplied image set in place of a built swapchain
    ///
    /// Dimensions and format are taken from the first image. Emits the
    /// destroyed/created event pair and resets frame timing.
    pub fn reinit_external_swapchain(&mut self, images: Vec<D::Image>) -> Result<()> {
        let Some(first) = images.first() else {
            wsi_bail!(SRC, "External image set is empty");
        };

        self.width = first.width();
        self.height = first.height();
        self.format = first.format();
        self.aspect_ratio = self.platform.aspect_ratio();

        let desc = SwapchainDesc {
            width: self.width,
            height: self.height,
            image_count: images.len() as u32,
            format: self.format,
        };

        wsi_info!(
            SRC,
            "Adopted external swapchain {}x{} (format: {:?}, {} images)",
            desc.width,
            desc.height,
            desc.format,
            desc.image_count
        );

        self.platform.event_swapchain_destroyed();
        if let Some(device) = self.device.as_ref() {
            self.platform
                .event_swapchain_created(device, &desc, self.aspect_ratio);
        }

        self.require_device_mut()?.install_external_images(images);
        self.platform.frame_timer().reset();
        self.external_acquire = None;
        self.external_release = None;
        self.need_acquire = true;
        Ok(())
    }

    /// Record a host-supplied frame: image index, optional acquire
    /// semaphore, and the host's frame timestamp in seconds
    ///
    /// The next `begin_frame` bypasses acquisition entirely.
    pub fn set_external_frame(
        &mut self,
        index: u32,
        acquire_semaphore: Option<D::Semaphore>,
        frame_time: f64,
    ) {
        self.external_frame_index = index;
        self.external_acquire = acquire_semaphore;
        self.external_frame_time = frame_time;
        self.frame_is_external = true;
    }

    /// Take ownership of the release semaphore produced by an external
    /// frame's `end_frame`
    pub fn consume_external_release_semaphore(&mut self) -> Option<D::Semaphore> {
        self.external_release.take()
    }

    /// Per-frame entry point: ensure a valid swapchain and acquire an image
    ///
    /// Idempotent while an acquisition is outstanding. On out-of-date or
    /// suboptimal acquisition the swapchain is rebuilt and the same frame's
    /// acquisition continues; no frame is silently dropped.
    pub fn begin_frame(&mut self) -> Result<()> {
        if self.frame_is_external {
            return self.begin_frame_external();
        }

        if !self.require_device()?.has_swapchain() || self.platform.should_resize() {
            let width = self.platform.surface_width();
            let height = self.platform.surface_height();
            if let Err(e) = self.update_framebuffer(width, height) {
                wsi_warn!(SRC, "Swapchain rebuild failed: {}", e);
            }
            self.platform.acknowledge_resize();
        }

        if !self.require_device()?.has_swapchain() {
            wsi_error!(SRC, "Completely lost swapchain, cannot continue");
            return Err(Error::SwapchainUnavailable);
        }

        if !self.need_acquire {
            return Ok(());
        }

        self.external_release = None;

        loop {
            let mut acquire = self.require_device_mut()?.request_semaphore()?;
            match self.require_device_mut()?.acquire_image(&acquire)? {
                AcquireOutcome::Acquired(index) => {
                    acquire.signal_external();

                    let frame_time = self.platform.frame_timer().frame();
                    let elapsed_time = self.platform.frame_timer().elapsed();

                    // Poll after acquire as well for optimal latency.
                    self.platform.poll_input();
                    self.platform.event_frame_tick(frame_time, elapsed_time);

                    self.swapchain_index = index;
                    self.require_device_mut()?.begin_frame(index)?;
                    if let Some(device) = self.device.as_ref() {
                        self.platform.event_swapchain_index(device, index);
                    }
                    self.require_device_mut()?
                        .set_acquire_semaphore(Some(acquire));
                    self.need_acquire = false;
                    return Ok(());
                }
                AcquireOutcome::OutOfDate => {
                    let (width, height) = (self.width, self.height);
                    {
                        let device = self.require_device_mut()?;
                        device.wait_idle();
                        device.destroy_swapchain();
                        device.set_acquire_semaphore(None);
                        device.consume_release_semaphore();
                    }
                    // The acquire semaphore was never waited on; safe to
                    // drop behind the idle above.
                    drop(acquire);

                    if self.blocking_create_swapchain(width, height).is_err() {
                        return Err(Error::SwapchainUnavailable);
                    }
                }
            }
        }
    }

    /// External-mode frame begin: timing, input, events, and the
    /// host-supplied acquire semaphore, with no acquisition
    fn begin_frame_external(&mut self) -> Result<()> {
        // Acquisition bookkeeping is the host's responsibility here.
        if !self.need_acquire {
            return Err(Error::InvalidState(
                "no external frame pending; call set_external_frame first".to_string(),
            ));
        }

        let frame_time = self
            .platform
            .frame_timer()
            .frame_external(self.external_frame_time);
        let elapsed_time = self.platform.frame_timer().elapsed();

        // Poll after acquire as well for optimal latency.
        self.platform.poll_input();

        self.swapchain_index = self.external_frame_index;
        self.platform.event_frame_tick(frame_time, elapsed_time);

        let index = self.swapchain_index;
        self.require_device_mut()?.begin_frame(index)?;
        if let Some(device) = self.device.as_ref() {
            self.platform.event_swapchain_index(device, index);
        }

        let acquire = self.external_acquire.take();
        self.require_device_mut()?.set_acquire_semaphore(acquire);
        self.need_acquire = false;
        Ok(())
    }

    /// Finalize the frame: present (self-managed) or capture the release
    /// semaphore for the external consumer
    ///
    /// If nothing rendered into the swapchain image this frame, the device
    /// is idled and no present happens; the acquisition stays valid for the
    /// next frame.
    pub fn end_frame(&mut self) -> Result<()> {
        self.require_device_mut()?.end_frame()?;

        if !self.require_device()?.swapchain_touched() {
            self.require_device_mut()?.wait_idle();
            return Ok(());
        }

        self.need_acquire = true;

        if self.frame_is_external {
            // Hand ownership of the release semaphore to the external user.
            self.external_release = self.require_device_mut()?.consume_release_semaphore();
            if self.external_release.is_none() {
                wsi_warn!(SRC, "External frame produced no release semaphore");
            }
            self.frame_is_external = false;
        } else {
            let index = self.swapchain_index;
            let Some(release) = self.require_device_mut()?.consume_release_semaphore() else {
                wsi_bail!(SRC, "Frame touched the swapchain but produced no release semaphore");
            };
            debug_assert!(release.is_signalled());

            if self.require_device_mut()?.present(release, index).is_err() {
                wsi_error!(SRC, "Presentation failed, forcing swapchain rebuild");
                let device = self.require_device_mut()?;
                device.wait_idle();
                device.destroy_swapchain();
                return Err(Error::PresentFailed);
            }
        }

        Ok(())
    }

    /// Force a device idle and a fresh blocking swapchain build at the given
    /// dimensions
    pub fn update_framebuffer(&mut self, width: u32, height: u32) -> Result<()> {
        self.require_device_mut()?.wait_idle();
        self.aspect_ratio = self.platform.aspect_ratio();
        self.blocking_create_swapchain(width, height)?;
        Ok(())
    }

    /// Tear the session down: idle, clear semaphore state, destroy swapchain
    /// and surface, and emit the destruction events. Idempotent.
    pub fn deinit(&mut self) {
        if let Some(mut device) = self.device.take() {
            self.platform.release_resources();

            device.wait_idle();
            device.set_acquire_semaphore(None);
            device.consume_release_semaphore();

            self.platform.event_swapchain_destroyed();
            device.destroy_swapchain();
            device.destroy_surface();

            self.platform.event_device_destroyed();
        }

        self.external_release = None;
        self.external_acquire = None;
        self.need_acquire = true;
    }

    // ===== ACCESSORS =====

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Image index of the in-progress frame
    pub fn swapchain_index(&self) -> u32 {
        self.swapchain_index
    }

    pub fn device(&self) -> Option<&D> {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> Option<&mut D> {
        self.device.as_mut()
    }

    pub fn platform(&self) -> &dyn SurfacePlatform<D> {
        self.platform.as_ref()
    }

    pub fn platform_mut(&mut self) -> &mut dyn SurfacePlatform<D> {
        self.platform.as_mut()
    }

    // ===== INTERNALS =====

    fn require_device(&self) -> Result<&D> {
        self.device
            .as_ref()
            .ok_or_else(|| Error::InvalidState("no device bound to session".to_string()))
    }

    fn require_device_mut(&mut self) -> Result<&mut D> {
        self.device
            .as_mut()
            .ok_or_else(|| Error::InvalidState("no device bound to session".to_string()))
    }

    /// Build a swapchain with the retry policy: bounded retries for creation
    /// failures, indefinite backoff for a degenerate surface while the
    /// platform stays alive
    ///
    /// On success, records the final extent/format and emits the
    /// destroyed-then-created event pair (always a pair, including the very
    /// first creation).
    fn blocking_create_swapchain(&mut self, width: u32, height: u32) -> Result<SwapchainDesc> {
        let mut retry_counter = 0u32;

        loop {
            match self.require_device_mut()?.create_swapchain(width, height) {
                Ok(desc) => {
                    self.width = desc.width;
                    self.height = desc.height;
                    self.format = desc.format;

                    wsi_info!(
                        SRC,
                        "Created swapchain {}x{} (format: {:?}, {} images)",
                        desc.width,
                        desc.height,
                        desc.format,
                        desc.image_count
                    );

                    self.platform.event_swapchain_destroyed();
                    if let Some(device) = self.device.as_ref() {
                        self.platform
                            .event_swapchain_created(device, &desc, self.aspect_ratio);
                    }
                    return Ok(desc);
                }
                Err(SwapchainError::Creation) => {
                    retry_counter += 1;
                    if retry_counter > MAX_CREATION_RETRIES {
                        wsi_error!(
                            SRC,
                            "Swapchain creation failed after {} retries",
                            MAX_CREATION_RETRIES
                        );
                        return Err(Error::SwapchainUnavailable);
                    }

                    // Try to not reuse the old swapchain on the next attempt.
                    let device = self.require_device_mut()?;
                    device.wait_idle();
                    device.destroy_swapchain();
                }
                Err(SwapchainError::NoSurface) => {
                    if !self.platform.alive() {
                        wsi_warn!(SRC, "Platform no longer alive, aborting swapchain creation");
                        return Err(Error::SwapchainUnavailable);
                    }
                    self.platform.poll_input();
                    thread::sleep(NO_SURFACE_BACKOFF);
                }
            }
        }
    }
}

impl<D: GpuDevice> Drop for Session<D> {
    fn drop(&mut self) {
        self.deinit();
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
