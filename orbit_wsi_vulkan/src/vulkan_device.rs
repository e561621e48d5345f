//! VulkanDevice - the graphics-context contract implemented over ash
//!
//! Owns the surface, the swapchain and its images, the semaphore recycling
//! pool, and the empty-submission fence. Semaphores that have been handed to
//! the driver are parked in deferred lists and only recycled or destroyed
//! once the frame fence (or a full device idle) proves the wait completed.

use ash::vk;
use orbit_wsi::orbit::device::{
    AcquireOutcome, GpuDevice, GpuImage, GpuSemaphore, PixelFormat, SwapchainDesc, SwapchainError,
};
use orbit_wsi::orbit::Result;
use orbit_wsi::{wsi_debug, wsi_err, wsi_info, wsi_warn};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};
use std::sync::Arc;

use crate::vulkan_context::VulkanContext;
use crate::vulkan_semaphore::Semaphore;
use crate::vulkan_swapchain::{
    choose_composite_alpha, choose_extent, choose_image_count, choose_present_mode,
    choose_pre_transform, choose_surface_format, pixel_format_from_vk, surface_usable,
    swapchain_image_usage, vsync_enabled,
};

const SRC: &str = "orbit::vulkan";

// ============================================================================
// SwapchainImage
// ============================================================================

/// Presentable image handle. Either swapchain-owned (the driver destroys the
/// backing image with the swapchain) or externally supplied.
#[derive(Debug, Clone, Copy)]
pub struct SwapchainImage {
    raw: vk::Image,
    width: u32,
    height: u32,
    format: vk::Format,
}

impl SwapchainImage {
    pub fn new(raw: vk::Image, width: u32, height: u32, format: vk::Format) -> Self {
        Self {
            raw,
            width,
            height,
            format,
        }
    }

    fn placeholder() -> Self {
        Self::new(vk::Image::null(), 0, 0, vk::Format::UNDEFINED)
    }

    pub fn raw(&self) -> vk::Image {
        self.raw
    }

    pub fn vk_format(&self) -> vk::Format {
        self.format
    }
}

impl GpuImage for SwapchainImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> PixelFormat {
        pixel_format_from_vk(self.format)
    }
}

// ============================================================================
// VulkanDevice
// ============================================================================

pub struct VulkanDevice {
    context: Arc<VulkanContext>,
    swapchain_loader: ash::khr::swapchain::Device,

    display_handle: RawDisplayHandle,
    window_handle: RawWindowHandle,

    surface: vk::SurfaceKHR,
    swapchain: vk::SwapchainKHR,
    images: Vec<SwapchainImage>,

    current_index: u32,
    touched: bool,

    acquire_semaphore: Option<Semaphore>,
    release_semaphore: Option<Semaphore>,

    // Unsignalled semaphores ready for reuse
    semaphore_pool: Vec<vk::Semaphore>,
    // Waited-on semaphores; move back to the pool once the frame fence (or a
    // device idle) confirms completion
    recycle_pending: Vec<vk::Semaphore>,
    // Semaphores with unresolved state; destroyed once safe
    destroy_pending: Vec<vk::Semaphore>,

    submit_fence: vk::Fence,
    fence_pending: bool,
}

impl VulkanDevice {
    pub fn new(
        context: Arc<VulkanContext>,
        window: &(impl HasDisplayHandle + HasWindowHandle),
    ) -> Result<Self> {
        let display_handle = window
            .display_handle()
            .map_err(|e| wsi_err!(SRC, "Window has no display handle: {}", e))?
            .as_raw();
        let window_handle = window
            .window_handle()
            .map_err(|e| wsi_err!(SRC, "Window has no window handle: {}", e))?
            .as_raw();

        let swapchain_loader =
            ash::khr::swapchain::Device::new(context.instance(), context.device());

        let fence_info = vk::FenceCreateInfo::default();
        let submit_fence = unsafe { context.device().create_fence(&fence_info, None) }
            .map_err(|e| wsi_err!(SRC, "Failed to create frame fence: {:?}", e))?;

        Ok(Self {
            context,
            swapchain_loader,
            display_handle,
            window_handle,
            surface: vk::SurfaceKHR::null(),
            swapchain: vk::SwapchainKHR::null(),
            images: Vec::new(),
            current_index: 0,
            touched: false,
            acquire_semaphore: None,
            release_semaphore: None,
            semaphore_pool: Vec::new(),
            recycle_pending: Vec::new(),
            destroy_pending: Vec::new(),
            submit_fence,
            fence_pending: false,
        })
    }

    pub fn context(&self) -> &Arc<VulkanContext> {
        &self.context
    }

    /// Images of the current swapchain (or the externally installed set)
    pub fn images(&self) -> &[SwapchainImage] {
        &self.images
    }

    /// Image the current frame renders into
    pub fn current_image(&self) -> Option<&SwapchainImage> {
        self.images.get(self.current_index as usize)
    }

    /// Record that this frame rendered into the swapchain image. Frames that
    /// never touch the swapchain are finalized without a present.
    pub fn mark_swapchain_touched(&mut self) {
        self.touched = true;
    }

    fn obtain_raw_semaphore(&mut self) -> Result<vk::Semaphore> {
        if let Some(raw) = self.semaphore_pool.pop() {
            return Ok(raw);
        }
        let info = vk::SemaphoreCreateInfo::default();
        unsafe { self.context.device().create_semaphore(&info, None) }
            .map_err(|e| wsi_err!(SRC, "Failed to create semaphore: {:?}", e))
    }

    /// Recycle and destroy semaphores whose waits the frame fence has proven
    /// complete.
    fn drain_deferred_semaphores(&mut self) {
        let device = Arc::clone(self.context.device());
        self.semaphore_pool.extend(self.recycle_pending.drain(..));
        for raw in self.destroy_pending.drain(..) {
            unsafe { device.destroy_semaphore(raw, None) };
        }
    }
}

impl GpuDevice for VulkanDevice {
    type Semaphore = Semaphore;
    type Image = SwapchainImage;

    fn init_placeholder_images(&mut self) {
        self.images = vec![SwapchainImage::placeholder()];
    }

    fn create_surface(&mut self) -> Result<()> {
        if self.surface != vk::SurfaceKHR::null() {
            return Ok(());
        }
        self.surface = unsafe {
            ash_window::create_surface(
                self.context.entry(),
                self.context.instance(),
                self.display_handle,
                self.window_handle,
                None,
            )
        }
        .map_err(|e| wsi_err!(SRC, "Failed to create window surface: {:?}", e))?;
        Ok(())
    }

    fn surface_supported(&self) -> Result<bool> {
        self.context.surface_supported(self.surface)
    }

    fn destroy_surface(&mut self) {
        if self.surface != vk::SurfaceKHR::null() {
            unsafe {
                self.context
                    .surface_loader()
                    .destroy_surface(self.surface, None);
            }
            self.surface = vk::SurfaceKHR::null();
        }
    }

    fn create_swapchain(
        &mut self,
        width: u32,
        height: u32,
    ) -> std::result::Result<SwapchainDesc, SwapchainError> {
        let surface_loader = self.context.surface_loader();
        let physical_device = self.context.physical_device();

        let capabilities = unsafe {
            surface_loader.get_physical_device_surface_capabilities(physical_device, self.surface)
        }
        .map_err(|e| {
            wsi_warn!(SRC, "Failed to query surface capabilities: {:?}", e);
            SwapchainError::Creation
        })?;

        if !surface_usable(&capabilities) {
            return Err(SwapchainError::NoSurface);
        }

        let formats = unsafe {
            surface_loader.get_physical_device_surface_formats(physical_device, self.surface)
        }
        .map_err(|e| {
            wsi_warn!(SRC, "Failed to query surface formats: {:?}", e);
            SwapchainError::Creation
        })?;

        let Some(surface_format) = choose_surface_format(&formats) else {
            wsi_warn!(SRC, "Surface advertises no formats");
            return Err(SwapchainError::Creation);
        };

        let present_modes = unsafe {
            surface_loader.get_physical_device_surface_present_modes(physical_device, self.surface)
        }
        .map_err(|e| {
            wsi_warn!(SRC, "Failed to query present modes: {:?}", e);
            SwapchainError::Creation
        })?;

        let extent = choose_extent(&capabilities, width, height);
        if extent.width == 0 || extent.height == 0 {
            return Err(SwapchainError::NoSurface);
        }

        let present_mode = choose_present_mode(&present_modes, vsync_enabled());
        let image_count = choose_image_count(&capabilities);
        let pre_transform = choose_pre_transform(&capabilities);
        let composite_alpha = choose_composite_alpha(&capabilities);

        let old_swapchain = self.swapchain;
        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(self.surface)
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(swapchain_image_usage())
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(pre_transform)
            .composite_alpha(composite_alpha)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        let created = unsafe { self.swapchain_loader.create_swapchain(&create_info, None) };

        // The old swapchain is retired by the create call whether it
        // succeeded or not; its handle can go now.
        if old_swapchain != vk::SwapchainKHR::null() {
            unsafe { self.swapchain_loader.destroy_swapchain(old_swapchain, None) };
        }
        self.swapchain = vk::SwapchainKHR::null();
        self.images.clear();

        let swapchain = created.map_err(|e| {
            wsi_warn!(SRC, "Swapchain creation failed: {:?}", e);
            SwapchainError::Creation
        })?;

        let raw_images = unsafe { self.swapchain_loader.get_swapchain_images(swapchain) }
            .map_err(|e| {
                wsi_warn!(SRC, "Failed to query swapchain images: {:?}", e);
                unsafe { self.swapchain_loader.destroy_swapchain(swapchain, None) };
                SwapchainError::Creation
            })?;

        self.swapchain = swapchain;
        self.images = raw_images
            .into_iter()
            .map(|raw| SwapchainImage::new(raw, extent.width, extent.height, surface_format.format))
            .collect();

        wsi_info!(
            SRC,
            "Created swapchain {}x{} ({:?}, {:?}), {} images",
            extent.width,
            extent.height,
            surface_format.format,
            present_mode,
            self.images.len()
        );

        Ok(SwapchainDesc {
            width: extent.width,
            height: extent.height,
            image_count: self.images.len() as u32,
            format: pixel_format_from_vk(surface_format.format),
        })
    }

    fn destroy_swapchain(&mut self) {
        if self.swapchain != vk::SwapchainKHR::null() {
            unsafe {
                self.swapchain_loader.destroy_swapchain(self.swapchain, None);
            }
            self.swapchain = vk::SwapchainKHR::null();
        }
        self.images.clear();
    }

    fn has_swapchain(&self) -> bool {
        self.swapchain != vk::SwapchainKHR::null()
    }

    fn install_external_images(&mut self, images: Vec<SwapchainImage>) {
        wsi_debug!(SRC, "Installing {} external images", images.len());
        self.images = images;
    }

    fn request_semaphore(&mut self) -> Result<Semaphore> {
        let raw = self.obtain_raw_semaphore()?;
        Ok(Semaphore::from_raw(Arc::clone(&self.context), raw, true))
    }

    fn acquire_image(&mut self, acquire: &Semaphore) -> Result<AcquireOutcome> {
        let result = unsafe {
            self.swapchain_loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                acquire.raw(),
                vk::Fence::null(),
            )
        };
        match result {
            Ok((index, false)) => Ok(AcquireOutcome::Acquired(index)),
            // Suboptimal still acquired an image, but the chain no longer
            // matches the surface; rebuild rather than limp along
            Ok((_, true)) => Ok(AcquireOutcome::OutOfDate),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
            Err(e) => Err(wsi_err!(SRC, "Image acquisition failed: {:?}", e)),
        }
    }

    fn begin_frame(&mut self, index: u32) -> Result<()> {
        if self.fence_pending {
            let device = Arc::clone(self.context.device());
            unsafe {
                device
                    .wait_for_fences(&[self.submit_fence], true, u64::MAX)
                    .map_err(|e| wsi_err!(SRC, "Failed to wait for frame fence: {:?}", e))?;
                device
                    .reset_fences(&[self.submit_fence])
                    .map_err(|e| wsi_err!(SRC, "Failed to reset frame fence: {:?}", e))?;
            }
            self.fence_pending = false;
            self.drain_deferred_semaphores();
        }
        self.current_index = index;
        self.touched = false;
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        if !self.touched {
            return Ok(());
        }

        let release_raw = self.obtain_raw_semaphore()?;
        let acquire = self.acquire_semaphore.take();

        let signal_semaphores = [release_raw];
        let wait_semaphores;
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let submit = if let Some(ref acquire) = acquire {
            wait_semaphores = [acquire.raw()];
            vk::SubmitInfo::default()
                .wait_semaphores(&wait_semaphores)
                .wait_dst_stage_mask(&wait_stages)
                .signal_semaphores(&signal_semaphores)
        } else {
            vk::SubmitInfo::default().signal_semaphores(&signal_semaphores)
        };

        let device = Arc::clone(self.context.device());
        let submitted = unsafe {
            device.queue_submit(self.context.graphics_queue(), &[submit], self.submit_fence)
        };
        if let Err(e) = submitted {
            self.semaphore_pool.push(release_raw);
            if let Some(acquire) = acquire {
                self.destroy_pending.push(acquire.into_raw());
            }
            return Err(wsi_err!(SRC, "Failed to submit release signal: {:?}", e));
        }
        self.fence_pending = true;

        // Waited by the submission; reusable once the fence clears
        if let Some(acquire) = acquire {
            self.recycle_pending.push(acquire.into_raw());
        }

        let mut release = Semaphore::from_raw(Arc::clone(&self.context), release_raw, true);
        release.signal_external();
        self.release_semaphore = Some(release);
        Ok(())
    }

    fn swapchain_touched(&self) -> bool {
        self.touched
    }

    fn set_acquire_semaphore(&mut self, semaphore: Option<Semaphore>) {
        if let Some(old) = self.acquire_semaphore.take() {
            // Signal state unknown; destruction is deferred until proven safe
            self.destroy_pending.push(old.into_raw());
        }
        self.acquire_semaphore = semaphore;
    }

    fn consume_release_semaphore(&mut self) -> Option<Semaphore> {
        self.release_semaphore.take()
    }

    fn present(&mut self, release: Semaphore, index: u32) -> Result<()> {
        let recyclable = release.can_recycle();
        let wait_semaphores = [release.into_raw()];
        let swapchains = [self.swapchain];
        let image_indices = [index];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe {
            self.swapchain_loader
                .queue_present(self.context.graphics_queue(), &present_info)
        };

        match result {
            // Suboptimal presents fine; the next acquire reports it
            Ok(_) => {
                if recyclable {
                    self.recycle_pending.push(wait_semaphores[0]);
                } else {
                    self.destroy_pending.push(wait_semaphores[0]);
                }
                Ok(())
            }
            Err(e) => {
                let device = Arc::clone(self.context.device());
                unsafe {
                    device.device_wait_idle().ok();
                    device.destroy_semaphore(wait_semaphores[0], None);
                }
                Err(wsi_err!(SRC, "Presentation failed: {:?}", e))
            }
        }
    }

    fn wait_idle(&mut self) {
        let device = Arc::clone(self.context.device());
        unsafe {
            device.device_wait_idle().ok();
        }
        if self.fence_pending {
            unsafe {
                device.reset_fences(&[self.submit_fence]).ok();
            }
            self.fence_pending = false;
        }
        self.drain_deferred_semaphores();
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        let device = Arc::clone(self.context.device());
        unsafe {
            device.device_wait_idle().ok();
        }

        self.acquire_semaphore = None;
        self.release_semaphore = None;
        self.drain_deferred_semaphores();
        for raw in self.semaphore_pool.drain(..) {
            unsafe { device.destroy_semaphore(raw, None) };
        }
        unsafe {
            device.destroy_fence(self.submit_fence, None);
        }

        self.destroy_swapchain();
        self.destroy_surface();
    }
}
