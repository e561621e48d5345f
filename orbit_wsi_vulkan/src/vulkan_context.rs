//! VulkanContext - instance, physical device, logical device, and queue
//!
//! One context backs any number of surface sessions. The context owns the
//! instance and device handles and is dropped (destroying both) only once
//! every `Arc` to it is gone; semaphore wrappers hold such an `Arc`, so a
//! release semaphore handed to an external consumer keeps the device alive
//! until the wrapper is dropped or unwrapped.

use ash::vk;
use orbit_wsi::orbit::Result;
use orbit_wsi::{wsi_err, wsi_info};
use raw_window_handle::RawDisplayHandle;
use std::sync::Arc;

const SRC: &str = "orbit::vulkan";

pub struct VulkanContext {
    entry: ash::Entry,
    instance: ash::Instance,
    physical_device: vk::PhysicalDevice,
    device: Arc<ash::Device>,
    graphics_queue: vk::Queue,
    graphics_queue_family: u32,
    surface_loader: ash::khr::surface::Instance,

    #[cfg(feature = "vulkan-validation")]
    debug_utils_loader: Option<ash::ext::debug_utils::Instance>,
    #[cfg(feature = "vulkan-validation")]
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl VulkanContext {
    /// Create the Vulkan instance and logical device for the given display.
    ///
    /// Picks the first physical device with a graphics-capable queue family,
    /// preferring a discrete GPU when one is available. The graphics queue
    /// doubles as the present queue; surface support for it is verified per
    /// surface by [`VulkanContext::surface_supported`].
    pub fn new(display_handle: RawDisplayHandle) -> Result<Self> {
        let entry = unsafe { ash::Entry::load() }
            .map_err(|e| wsi_err!(SRC, "Failed to load Vulkan library: {}", e))?;

        let app_info = vk::ApplicationInfo::default()
            .application_name(c"orbit_wsi")
            .application_version(vk::make_api_version(0, 0, 1, 0))
            .engine_name(c"orbit")
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_2);

        let mut extension_names = ash_window::enumerate_required_extensions(display_handle)
            .map_err(|e| wsi_err!(SRC, "Failed to enumerate surface extensions: {:?}", e))?
            .to_vec();

        if cfg!(feature = "vulkan-validation") {
            extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
        }

        #[cfg(feature = "vulkan-validation")]
        let layer_names = crate::debug::validation_layers(&entry);
        #[cfg(not(feature = "vulkan-validation"))]
        let layer_names: Vec<*const std::ffi::c_char> = Vec::new();

        let instance_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_extension_names(&extension_names)
            .enabled_layer_names(&layer_names);

        let instance = unsafe { entry.create_instance(&instance_info, None) }
            .map_err(|e| wsi_err!(SRC, "Failed to create Vulkan instance: {:?}", e))?;

        #[cfg(feature = "vulkan-validation")]
        let (debug_utils_loader, debug_messenger) =
            crate::debug::setup_debug_messenger(&entry, &instance);

        let (physical_device, graphics_queue_family) =
            Self::pick_physical_device(&instance)?;

        let properties = unsafe { instance.get_physical_device_properties(physical_device) };
        wsi_info!(
            SRC,
            "Using GPU: {}",
            properties
                .device_name_as_c_str()
                .unwrap_or(c"unknown")
                .to_string_lossy()
        );

        let queue_priorities = [1.0f32];
        let queue_info = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(graphics_queue_family)
            .queue_priorities(&queue_priorities)];

        let device_extensions = [ash::khr::swapchain::NAME.as_ptr()];

        let device_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_info)
            .enabled_extension_names(&device_extensions);

        let device = unsafe { instance.create_device(physical_device, &device_info, None) }
            .map_err(|e| wsi_err!(SRC, "Failed to create logical device: {:?}", e))?;

        let graphics_queue = unsafe { device.get_device_queue(graphics_queue_family, 0) };

        let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

        Ok(Self {
            entry,
            instance,
            physical_device,
            device: Arc::new(device),
            graphics_queue,
            graphics_queue_family,
            surface_loader,
            #[cfg(feature = "vulkan-validation")]
            debug_utils_loader,
            #[cfg(feature = "vulkan-validation")]
            debug_messenger,
        })
    }

    /// First device with a graphics queue family; a discrete GPU replaces an
    /// earlier integrated pick.
    fn pick_physical_device(instance: &ash::Instance) -> Result<(vk::PhysicalDevice, u32)> {
        let physical_devices = unsafe { instance.enumerate_physical_devices() }
            .map_err(|e| wsi_err!(SRC, "Failed to enumerate physical devices: {:?}", e))?;

        let mut selected: Option<(vk::PhysicalDevice, u32, bool)> = None;
        for physical_device in physical_devices {
            let families = unsafe {
                instance.get_physical_device_queue_family_properties(physical_device)
            };
            let graphics_family = families
                .iter()
                .position(|f| f.queue_flags.contains(vk::QueueFlags::GRAPHICS));
            let Some(family) = graphics_family else {
                continue;
            };

            let properties = unsafe { instance.get_physical_device_properties(physical_device) };
            let discrete = properties.device_type == vk::PhysicalDeviceType::DISCRETE_GPU;

            match selected {
                None => selected = Some((physical_device, family as u32, discrete)),
                Some((_, _, false)) if discrete => {
                    selected = Some((physical_device, family as u32, true));
                }
                _ => {}
            }
        }

        match selected {
            Some((physical_device, family, _)) => Ok((physical_device, family)),
            None => Err(wsi_err!(SRC, "No GPU with a graphics queue family found")),
        }
    }

    /// Whether the graphics queue family can present to the given surface
    pub fn surface_supported(&self, surface: vk::SurfaceKHR) -> Result<bool> {
        unsafe {
            self.surface_loader.get_physical_device_surface_support(
                self.physical_device,
                self.graphics_queue_family,
                surface,
            )
        }
        .map_err(|e| wsi_err!(SRC, "Failed to query surface support: {:?}", e))
    }

    pub fn entry(&self) -> &ash::Entry {
        &self.entry
    }

    pub fn instance(&self) -> &ash::Instance {
        &self.instance
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn device(&self) -> &Arc<ash::Device> {
        &self.device
    }

    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    pub fn graphics_queue_family(&self) -> u32 {
        self.graphics_queue_family
    }

    pub fn surface_loader(&self) -> &ash::khr::surface::Instance {
        &self.surface_loader
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();
            self.device.destroy_device(None);

            #[cfg(feature = "vulkan-validation")]
            if let (Some(loader), Some(messenger)) =
                (self.debug_utils_loader.as_ref(), self.debug_messenger.take())
            {
                loader.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}
