//! Semaphore - owned wrapper over a raw VkSemaphore
//!
//! Ownership is single-owner at every point: pool, session, device, or
//! external consumer. `into_raw()` transfers the raw handle out; a wrapper
//! still holding its handle destroys it on drop. The wrapper keeps the
//! context alive, so a semaphore handed to an external consumer can outlive
//! the device that minted it without dangling; callers must still idle the
//! device before dropping a semaphore whose signal/wait status is
//! unresolved.

use ash::vk;
use orbit_wsi::orbit::device::GpuSemaphore;
use std::sync::Arc;

use crate::vulkan_context::VulkanContext;

pub struct Semaphore {
    context: Arc<VulkanContext>,
    raw: vk::Semaphore,
    signalled: bool,
    recyclable: bool,
}

impl Semaphore {
    /// Wrap a raw semaphore handle. `recyclable` marks handles that may be
    /// returned to the device pool after their wait completes.
    pub(crate) fn from_raw(
        context: Arc<VulkanContext>,
        raw: vk::Semaphore,
        recyclable: bool,
    ) -> Self {
        Self {
            context,
            raw,
            signalled: false,
            recyclable,
        }
    }

    /// Wrap a host-owned semaphore for injection into an external frame.
    /// Never recycled into the device pool; destroyed on drop unless taken
    /// back with [`Semaphore::into_raw`].
    pub fn external(context: Arc<VulkanContext>, raw: vk::Semaphore) -> Self {
        Self::from_raw(context, raw, false)
    }

    pub fn raw(&self) -> vk::Semaphore {
        self.raw
    }

    pub fn can_recycle(&self) -> bool {
        self.recyclable
    }

    /// Release logical ownership of the raw handle; the wrapper will no
    /// longer destroy it
    pub fn into_raw(mut self) -> vk::Semaphore {
        std::mem::replace(&mut self.raw, vk::Semaphore::null())
    }
}

impl GpuSemaphore for Semaphore {
    fn signal_external(&mut self) {
        self.signalled = true;
    }

    fn is_signalled(&self) -> bool {
        self.signalled
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        if self.raw != vk::Semaphore::null() {
            unsafe {
                self.context.device().destroy_semaphore(self.raw, None);
            }
        }
    }
}
