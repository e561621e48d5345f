//! Mock GpuDevice for unit tests (no GPU required)
//!
//! Lets the session state machine be exercised without a graphics driver.
//! Acquire, creation, and present outcomes are scriptable per call;
//! counters record what the session actually did.

use std::collections::VecDeque;

use crate::device::{
    AcquireOutcome, GpuDevice, GpuImage, GpuSemaphore, PixelFormat, SwapchainDesc, SwapchainError,
};
use crate::error::{Error, Result};

// ============================================================================
// Mock Semaphore
// ============================================================================

#[derive(Debug, PartialEq, Eq)]
pub struct MockSemaphore {
    pub id: u32,
    pub signalled: bool,
}

impl GpuSemaphore for MockSemaphore {
    fn signal_external(&mut self) {
        self.signalled = true;
    }

    fn is_signalled(&self) -> bool {
        self.signalled
    }
}

// ============================================================================
// Mock Image
// ============================================================================

#[derive(Debug, Clone)]
pub struct MockImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl GpuImage for MockImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> PixelFormat {
        self.format
    }
}

// ============================================================================
// Mock Device
// ============================================================================

pub struct MockDevice {
    // Scriptable outcomes; when a queue is empty the default applies
    pub create_results: VecDeque<std::result::Result<(), SwapchainError>>,
    pub acquire_results: VecDeque<Result<AcquireOutcome>>,
    pub present_results: VecDeque<Result<()>>,

    pub surface_support: bool,
    pub surface_create_result: Result<()>,

    /// Value reported by swapchain_touched()
    pub touched: bool,

    // Observed state
    pub placeholder_inited: bool,
    pub surface_created: bool,
    pub surface_destroyed: bool,
    pub swapchain_alive: bool,
    pub external_images: Vec<MockImage>,

    pub acquire_semaphore: Option<MockSemaphore>,
    release_semaphore: Option<MockSemaphore>,

    // Counters
    pub create_calls: u32,
    pub destroy_calls: u32,
    pub acquire_calls: u32,
    pub wait_idle_calls: u32,
    pub end_frame_calls: u32,
    pub begin_frame_indices: Vec<u32>,
    pub presented_indices: Vec<u32>,
    pub recycled_semaphores: Vec<u32>,
    pub destroyed_semaphores: Vec<u32>,

    next_semaphore_id: u32,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            create_results: VecDeque::new(),
            acquire_results: VecDeque::new(),
            present_results: VecDeque::new(),
            surface_support: true,
            surface_create_result: Ok(()),
            touched: true,
            placeholder_inited: false,
            surface_created: false,
            surface_destroyed: false,
            swapchain_alive: false,
            external_images: Vec::new(),
            acquire_semaphore: None,
            release_semaphore: None,
            create_calls: 0,
            destroy_calls: 0,
            acquire_calls: 0,
            wait_idle_calls: 0,
            end_frame_calls: 0,
            begin_frame_indices: Vec::new(),
            presented_indices: Vec::new(),
            recycled_semaphores: Vec::new(),
            destroyed_semaphores: Vec::new(),
            next_semaphore_id: 0,
        }
    }

    /// Script the next `count` swapchain creations to fail with `err`
    pub fn script_create_failures(&mut self, err: SwapchainError, count: usize) {
        for _ in 0..count {
            self.create_results.push_back(Err(err));
        }
    }

    /// Script the next `count` acquisitions to report out-of-date
    pub fn script_out_of_date(&mut self, count: usize) {
        for _ in 0..count {
            self.acquire_results.push_back(Ok(AcquireOutcome::OutOfDate));
        }
    }

    fn next_semaphore(&mut self, signalled: bool) -> MockSemaphore {
        let id = self.next_semaphore_id;
        self.next_semaphore_id += 1;
        MockSemaphore { id, signalled }
    }
}

impl GpuDevice for MockDevice {
    type Semaphore = MockSemaphore;
    type Image = MockImage;

    fn init_placeholder_images(&mut self) {
        self.placeholder_inited = true;
    }

    fn create_surface(&mut self) -> Result<()> {
        self.surface_create_result.clone()?;
        self.surface_created = true;
        Ok(())
    }

    fn surface_supported(&self) -> Result<bool> {
        Ok(self.surface_support)
    }

    fn destroy_surface(&mut self) {
        if self.surface_created {
            self.surface_created = false;
            self.surface_destroyed = true;
        }
    }

    fn create_swapchain(
        &mut self,
        width: u32,
        height: u32,
    ) -> std::result::Result<SwapchainDesc, SwapchainError> {
        self.create_calls += 1;
        if let Some(scripted) = self.create_results.pop_front() {
            scripted?;
        }
        self.swapchain_alive = true;
        Ok(SwapchainDesc {
            width,
            height,
            image_count: 3,
            format: PixelFormat::B8G8R8A8_SRGB,
        })
    }

    fn destroy_swapchain(&mut self) {
        if self.swapchain_alive {
            self.swapchain_alive = false;
            self.destroy_calls += 1;
        }
    }

    fn has_swapchain(&self) -> bool {
        self.swapchain_alive
    }

    fn install_external_images(&mut self, images: Vec<MockImage>) {
        self.external_images = images;
        self.swapchain_alive = true;
    }

    fn request_semaphore(&mut self) -> Result<MockSemaphore> {
        Ok(self.next_semaphore(false))
    }

    fn acquire_image(&mut self, _acquire: &MockSemaphore) -> Result<AcquireOutcome> {
        self.acquire_calls += 1;
        match self.acquire_results.pop_front() {
            Some(scripted) => scripted,
            None => Ok(AcquireOutcome::Acquired(0)),
        }
    }

    fn begin_frame(&mut self, index: u32) -> Result<()> {
        self.begin_frame_indices.push(index);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        self.end_frame_calls += 1;
        if self.touched && self.release_semaphore.is_none() {
            let release = self.next_semaphore(true);
            self.release_semaphore = Some(release);
        }
        Ok(())
    }

    fn swapchain_touched(&self) -> bool {
        self.touched
    }

    fn set_acquire_semaphore(&mut self, semaphore: Option<MockSemaphore>) {
        self.acquire_semaphore = semaphore;
    }

    fn consume_release_semaphore(&mut self) -> Option<MockSemaphore> {
        self.release_semaphore.take()
    }

    fn present(&mut self, release: MockSemaphore, index: u32) -> Result<()> {
        self.presented_indices.push(index);
        let result = self
            .present_results
            .pop_front()
            .unwrap_or(Ok(()));
        match result {
            Ok(()) => {
                self.recycled_semaphores.push(release.id);
                Ok(())
            }
            Err(e) => {
                self.wait_idle_calls += 1;
                self.destroyed_semaphores.push(release.id);
                Err(e)
            }
        }
    }

    fn wait_idle(&mut self) {
        self.wait_idle_calls += 1;
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

// Keep Error usable in scripted queues
impl MockDevice {
    pub fn script_present_failure(&mut self) {
        self.present_results
            .push_back(Err(Error::BackendError("present failed".to_string())));
    }
}
