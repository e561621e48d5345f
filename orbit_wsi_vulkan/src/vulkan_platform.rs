//! WindowPlatform - winit-backed surface provider
//!
//! Thin adapter from a winit window to the platform contract. The embedding
//! application owns the event loop; it forwards resize and close-requested
//! events here via [`WindowPlatform::notify_resize`] and
//! [`WindowPlatform::notify_closing`], and the session picks them up on the
//! next frame.

use orbit_wsi::orbit::platform::SurfacePlatform;
use orbit_wsi::orbit::FrameTimer;
use std::sync::Arc;
use winit::window::Window;

use crate::vulkan_device::VulkanDevice;

pub struct WindowPlatform {
    window: Arc<Window>,
    timer: FrameTimer,
    resize_requested: bool,
    closing: bool,
}

impl WindowPlatform {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            timer: FrameTimer::new(),
            resize_requested: false,
            closing: false,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Forward a window resize; the session rebuilds on its next frame
    pub fn notify_resize(&mut self) {
        self.resize_requested = true;
    }

    /// Forward a close request; pending surface-loss backoff aborts
    pub fn notify_closing(&mut self) {
        self.closing = true;
    }
}

impl SurfacePlatform<VulkanDevice> for WindowPlatform {
    fn surface_width(&self) -> u32 {
        self.window.inner_size().width.max(1)
    }

    fn surface_height(&self) -> u32 {
        self.window.inner_size().height.max(1)
    }

    fn should_resize(&self) -> bool {
        self.resize_requested
    }

    fn acknowledge_resize(&mut self) {
        self.resize_requested = false;
    }

    fn alive(&self) -> bool {
        !self.closing
    }

    fn poll_input(&mut self) {
        // Input is pumped by the embedding application's event loop; the
        // session only needs window redraws to keep coming.
        self.window.request_redraw();
    }

    fn frame_timer(&mut self) -> &mut FrameTimer {
        &mut self.timer
    }
}
