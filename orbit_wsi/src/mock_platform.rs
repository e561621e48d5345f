//! Mock SurfacePlatform for unit tests
//!
//! Records every event hook the session fires and exposes scriptable
//! dimensions, resize, and liveness state through a shared handle so tests
//! can mutate it while the session owns the platform box.

use std::sync::{Arc, Mutex};

use crate::device::SwapchainDesc;
use crate::mock_device::MockDevice;
use crate::platform::SurfacePlatform;
use crate::timer::FrameTimer;

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    DeviceCreated,
    DeviceDestroyed,
    SwapchainCreated(SwapchainDesc),
    SwapchainDestroyed,
    SwapchainIndex(u32),
    FrameTick,
}

#[derive(Debug)]
pub struct PlatformState {
    pub width: u32,
    pub height: u32,
    pub resize_requested: bool,
    pub alive: bool,
    pub events: Vec<PlatformEvent>,
    pub poll_input_calls: u32,
    pub acknowledge_calls: u32,
    pub released: bool,
}

impl PlatformState {
    /// Swapchain created/destroyed events in emission order
    pub fn swapchain_events(&self) -> Vec<&PlatformEvent> {
        self.events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    PlatformEvent::SwapchainCreated(_) | PlatformEvent::SwapchainDestroyed
                )
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&PlatformEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

pub struct MockPlatform {
    pub state: Arc<Mutex<PlatformState>>,
    timer: FrameTimer,
}

impl MockPlatform {
    /// Returns the platform and a shared handle to its scriptable state
    pub fn new(width: u32, height: u32) -> (Self, Arc<Mutex<PlatformState>>) {
        let state = Arc::new(Mutex::new(PlatformState {
            width,
            height,
            resize_requested: false,
            alive: true,
            events: Vec::new(),
            poll_input_calls: 0,
            acknowledge_calls: 0,
            released: false,
        }));
        let platform = Self {
            state: Arc::clone(&state),
            timer: FrameTimer::new(),
        };
        (platform, state)
    }

    fn record(&self, event: PlatformEvent) {
        self.state.lock().unwrap().events.push(event);
    }
}

impl SurfacePlatform<MockDevice> for MockPlatform {
    fn surface_width(&self) -> u32 {
        self.state.lock().unwrap().width
    }

    fn surface_height(&self) -> u32 {
        self.state.lock().unwrap().height
    }

    fn should_resize(&self) -> bool {
        self.state.lock().unwrap().resize_requested
    }

    fn acknowledge_resize(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.resize_requested = false;
        state.acknowledge_calls += 1;
    }

    fn alive(&self) -> bool {
        self.state.lock().unwrap().alive
    }

    fn poll_input(&mut self) {
        self.state.lock().unwrap().poll_input_calls += 1;
    }

    fn frame_timer(&mut self) -> &mut FrameTimer {
        &mut self.timer
    }

    fn release_resources(&mut self) {
        self.state.lock().unwrap().released = true;
    }

    fn event_device_created(&mut self, _device: &MockDevice) {
        self.record(PlatformEvent::DeviceCreated);
    }

    fn event_device_destroyed(&mut self) {
        self.record(PlatformEvent::DeviceDestroyed);
    }

    fn event_swapchain_created(
        &mut self,
        _device: &MockDevice,
        desc: &SwapchainDesc,
        _aspect_ratio: f32,
    ) {
        self.record(PlatformEvent::SwapchainCreated(*desc));
    }

    fn event_swapchain_destroyed(&mut self) {
        self.record(PlatformEvent::SwapchainDestroyed);
    }

    fn event_swapchain_index(&mut self, _device: &MockDevice, index: u32) {
        self.record(PlatformEvent::SwapchainIndex(index));
    }

    fn event_frame_tick(&mut self, _frame_time: f64, _elapsed_time: f64) {
        self.record(PlatformEvent::FrameTick);
    }
}
