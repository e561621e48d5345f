/*!
# Orbit WSI - Vulkan Backend

Vulkan implementation of the Orbit WSI surface-session contracts, built on
the Ash bindings.

This crate provides the concrete device and platform types driven by
[`orbit_wsi::orbit::Session`]: a shared [`VulkanContext`] (instance, device,
queues), a [`VulkanDevice`] implementing the graphics-context contract
(surface, swapchain builder, semaphore recycling, presentation), and a
[`WindowPlatform`] adapting a winit window to the platform contract.

# Example

```no_run
use orbit_wsi::orbit::Session;
use orbit_wsi_vulkan::{VulkanContext, VulkanDevice, WindowPlatform};
use std::sync::Arc;

# fn run(window: Arc<winit::window::Window>) -> orbit_wsi::orbit::Result<()> {
use raw_window_handle::HasDisplayHandle;
let display = window.display_handle()
    .map_err(|e| orbit_wsi::orbit::Error::BackendError(e.to_string()))?
    .as_raw();
let context = Arc::new(VulkanContext::new(display)?);
let device = VulkanDevice::new(Arc::clone(&context), window.as_ref())?;
let platform = Box::new(WindowPlatform::new(window));

let mut session = Session::new(platform);
session.initialize(device)?;
loop {
    session.begin_frame()?;
    // record and submit rendering here, then:
    if let Some(device) = session.device_mut() {
        device.mark_swapchain_touched();
    }
    session.end_frame()?;
}
# }
```
*/

// Vulkan implementation modules
mod vulkan_context;
mod vulkan_device;
mod vulkan_platform;
mod vulkan_semaphore;
mod vulkan_swapchain;

#[cfg(feature = "vulkan-validation")]
mod debug;

pub use vulkan_context::VulkanContext;
pub use vulkan_device::{SwapchainImage, VulkanDevice};
pub use vulkan_platform::WindowPlatform;
pub use vulkan_semaphore::Semaphore;
pub use vulkan_swapchain::{pixel_format_from_vk, VSYNC_ENV};
