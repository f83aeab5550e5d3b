use std::time::Duration;

use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowId};

use crate::device::{Gpu, GpuInit};

/// Pumps allowed for the platform to deliver `resumed` during creation.
const CREATE_PUMP_ATTEMPTS: usize = 16;

/// True when a pump result means the platform loop is gone.
fn pump_ended(status: &PumpStatus) -> bool {
    matches!(status, PumpStatus::Exit(_))
}

/// Window creation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Borderless fullscreen on the primary monitor.
    pub fullscreen: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "OpenGD".to_string(),
            width: 800,
            height: 800,
            fullscreen: false,
        }
    }
}

/// Close request flag. Once set it stays set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CloseLatch(bool);

impl CloseLatch {
    pub fn set(&mut self) {
        self.0 = true;
    }

    pub fn is_set(&self) -> bool {
        self.0
    }
}

#[self_referencing]
struct WindowSurface {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct PlatformState {
    settings: WindowSettings,
    gpu_init: GpuInit,

    surface: Option<WindowSurface>,
    init_error: Option<anyhow::Error>,

    close: CloseLatch,
    pending_resize: Option<PhysicalSize<u32>>,
}

impl PlatformState {
    fn new(settings: WindowSettings, gpu_init: GpuInit) -> Self {
        Self {
            settings,
            gpu_init,
            surface: None,
            init_error: None,
            close: CloseLatch::default(),
            pending_resize: None,
        }
    }

    fn create_surface(&self, event_loop: &ActiveEventLoop) -> Result<WindowSurface> {
        let mut attrs = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_resizable(false)
            .with_inner_size(PhysicalSize::new(self.settings.width, self.settings.height));

        if self.settings.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(event_loop.primary_monitor())));
        }

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        WindowSurfaceTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
    }

    /// Latches the close flag. Both the window's close button and the event
    /// loop exiting end up here.
    fn on_close(&mut self) {
        self.close.set();
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(surface) = self.surface.as_mut() {
            surface.with_gpu_mut(|gpu| gpu.resize(size));
        }
        self.pending_resize = Some(size);
    }
}

impl ApplicationHandler for PlatformState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() || self.init_error.is_some() {
            return;
        }

        match self.create_surface(event_loop) {
            Ok(surface) => {
                log::debug!(
                    "window created: {}x{} fullscreen={}",
                    self.settings.width,
                    self.settings.height,
                    self.settings.fullscreen
                );
                self.surface = Some(surface);
            }
            Err(e) => {
                log::error!("failed to create window surface: {e:#}");
                self.init_error = Some(e);
                self.on_close();
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::debug!("close requested");
                self.on_close();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = self
                    .surface
                    .as_ref()
                    .map(|s| s.with_window(|w| w.inner_size()));
                if let Some(size) = size {
                    self.resize(size);
                }
            }
            _ => {}
        }
    }
}

/// The event loop, its window and the GPU context bound to the window.
pub struct Platform {
    // Declared first so it is dropped before the event loop.
    state: PlatformState,
    event_loop: EventLoop<()>,
}

impl Platform {
    /// Creates the event loop and pumps it until the window and GPU
    /// context exist.
    pub fn create(settings: WindowSettings, gpu_init: GpuInit) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = PlatformState::new(settings, gpu_init);

        for _ in 0..CREATE_PUMP_ATTEMPTS {
            let status = event_loop.pump_app_events(Some(Duration::ZERO), &mut state);
            if let Some(e) = state.init_error.take() {
                return Err(e);
            }
            if state.surface.is_some() {
                break;
            }
            if let PumpStatus::Exit(code) = status {
                anyhow::bail!("event loop exited with code {code} before the window was created");
            }
        }

        anyhow::ensure!(state.surface.is_some(), "platform never delivered a resumed event");
        Ok(Self { state, event_loop })
    }

    /// Processes pending platform events without blocking.
    pub fn pump(&mut self) {
        let status = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state);
        if pump_ended(&status) {
            log::debug!("event loop exited");
            self.state.on_close();
        }
    }

    /// Latches the close flag without a platform event.
    pub fn request_close(&mut self) {
        self.state.on_close();
    }

    pub fn should_close(&self) -> bool {
        self.state.close.is_set()
    }

    /// Latest size change since the previous call, in physical pixels.
    pub fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.state.pending_resize.take().map(|s| (s.width, s.height))
    }

    /// The GPU context bound to the window.
    pub fn gpu(&self) -> Option<&Gpu<'_>> {
        self.state.surface.as_ref().map(|s| s.borrow_gpu())
    }

    pub fn with_gpu_mut<R>(&mut self, f: impl FnOnce(&mut Gpu<'_>) -> R) -> Option<R> {
        self.state.surface.as_mut().map(|s| s.with_gpu_mut(|gpu| f(gpu)))
    }

    /// Drawable size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        self.gpu()
            .map(|gpu| (gpu.size().width, gpu.size().height))
            .unwrap_or((self.state.settings.width, self.state.settings.height))
    }

    /// Destroys the GPU context and window, then the event loop.
    pub fn close(mut self) {
        self.state.surface = None;
        drop(self.event_loop);
        log::debug!("platform closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_latch_is_monotonic() {
        let mut latch = CloseLatch::default();
        assert!(!latch.is_set());
        latch.set();
        assert!(latch.is_set());
        latch.set();
        assert!(latch.is_set());
    }

    #[test]
    fn close_handling_latches_the_state() {
        let mut state = PlatformState::new(WindowSettings::default(), GpuInit::default());
        assert!(!state.close.is_set());

        state.on_close();
        assert!(state.close.is_set());

        // a later resize or second close never clears it
        state.resize(PhysicalSize::new(640, 480));
        state.on_close();
        assert!(state.close.is_set());
        assert_eq!(state.pending_resize, Some(PhysicalSize::new(640, 480)));
    }

    #[test]
    fn only_exit_status_ends_the_loop() {
        assert!(pump_ended(&PumpStatus::Exit(0)));
        assert!(pump_ended(&PumpStatus::Exit(3)));
        assert!(!pump_ended(&PumpStatus::Continue));
    }

    #[test]
    fn default_window_is_titled_opengd() {
        let settings = WindowSettings::default();
        assert_eq!(settings.title, "OpenGD");
        assert_eq!((settings.width, settings.height), (800, 800));
        assert!(!settings.fullscreen);
    }
}
