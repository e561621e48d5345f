//! SurfacePlatform trait - the platform-provider contract
//!
//! The platform side owns the native window, input polling, and frame
//! timing. The session consumes it through this interface and reports
//! lifecycle events back through the hooks.

use crate::device::{GpuDevice, SwapchainDesc};
use crate::timer::FrameTimer;

/// Platform surface provider consumed by [`crate::session::Session`]
///
/// Generic over the device type so event hooks can hand listeners the
/// concrete backend device. Event hooks have empty default bodies; the
/// session always emits swapchain created/destroyed hooks in matched pairs,
/// including a no-op destroy before the very first creation, so listeners
/// have a single codepath.
pub trait SurfacePlatform<D: GpuDevice> {
    /// Current surface width in pixels
    fn surface_width(&self) -> u32;

    /// Current surface height in pixels
    fn surface_height(&self) -> u32;

    fn aspect_ratio(&self) -> f32 {
        self.surface_width() as f32 / self.surface_height().max(1) as f32
    }

    /// Whether the platform has a pending resize request
    fn should_resize(&self) -> bool;

    /// Clear the pending resize request
    fn acknowledge_resize(&mut self);

    /// Whether the session should keep retrying transient surface loss.
    /// Returning false aborts the NoSurface backoff loop.
    fn alive(&self) -> bool;

    /// Pump the input subsystem. Called once per frame after acquisition
    /// (for optimal latency) and during surface-loss backoff.
    fn poll_input(&mut self);

    /// The frame timer driven by the session
    fn frame_timer(&mut self) -> &mut FrameTimer;

    /// Release platform-side resources during session teardown
    fn release_resources(&mut self) {}

    // ===== EVENT HOOKS =====

    /// The device exists and can service resource creation
    fn event_device_created(&mut self, _device: &D) {}

    /// The device is about to be torn down
    fn event_device_destroyed(&mut self) {}

    /// A swapchain was created; always preceded by a destroyed event
    fn event_swapchain_created(
        &mut self,
        _device: &D,
        _desc: &SwapchainDesc,
        _aspect_ratio: f32,
    ) {
    }

    /// The previous swapchain (if any) is gone
    fn event_swapchain_destroyed(&mut self) {}

    /// The index of the image the upcoming frame renders into
    fn event_swapchain_index(&mut self, _device: &D, _index: u32) {}

    /// A new frame began; `frame_time` is the delta and `elapsed_time` the
    /// total, both in seconds
    fn event_frame_tick(&mut self, _frame_time: f64, _elapsed_time: f64) {}
}
