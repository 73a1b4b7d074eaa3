// Platform window: owns the native handle while open, answers geometry
// queries, and republishes window-system callbacks as queued events.

pub mod platform;

pub use platform::Platform;

use crate::error::{Error, Result};
use crate::event::{Event, EventQueue};
use crate::logger::{Actor, Level, Logger};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::sync::Arc;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::keyboard::ModifiersState;

/// Combined handle traits a graphics backend needs from a window.
pub trait WindowHandle: HasWindowHandle + HasDisplayHandle {}

impl<T: HasWindowHandle + HasDisplayHandle> WindowHandle for T {}

pub type SurfaceHandle = Arc<dyn WindowHandle + Send + Sync>;

/// What the renderer consumes from a window: pixel-exact surface sizing
/// must use `framebuffer_size`, never the logical size.
pub trait RenderTarget {
    fn is_open(&self) -> bool;
    fn framebuffer_size(&self) -> (u32, u32);
    fn surface_handle(&self) -> Option<SurfaceHandle>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Default,
    Custom {
        x: i32,
        y: i32,
    },
}

/// Optional upper bounds applied to every requested window size.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeLimits {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct WindowSettings {
    pub limits: SizeLimits,
    pub position: Position,
}

pub struct Window {
    id: u64,
    name: String,
    title: String,
    settings: WindowSettings,
    visible: bool,
    // Cached logical size; the framebuffer size is queried from the handle.
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    scale: f64,
    modifiers: ModifiersState,
    logger: Arc<Logger>,
    handle: Option<Arc<winit::window::Window>>,
}

impl Window {
    pub fn new(settings: WindowSettings, id: u64, logger: Arc<Logger>) -> Self {
        let name = format!("window_{id}");
        Self {
            id,
            title: name.clone(),
            name,
            settings,
            visible: false,
            width: 0,
            height: 0,
            x: 0,
            y: 0,
            scale: 1.0,
            modifiers: ModifiersState::empty(),
            logger,
            handle: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &WindowSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: WindowSettings) {
        if let Position::Custom { x, y } = settings.position {
            if self.x != x || self.y != y {
                self.reposition(x, y);
            }
        }
        self.settings = settings;
    }

    /// Creates the native window. The requested size is clamped to the
    /// configured limits; zero width or height is a programmer error.
    pub fn open(
        &mut self,
        platform: &mut Platform,
        title: &str,
        width: u32,
        height: u32,
        visible: bool,
    ) -> Result<()> {
        assert!(width > 0, "window width has to be >0");
        assert!(height > 0, "window height has to be >0");

        if self.handle.is_some() {
            return Err(Error::logic("window is already open"));
        }

        self.log(Level::Info, "initialisation");
        self.log(Level::Trace, "start initialisation");

        self.title = title.to_owned();
        let (width, height) = self.clamp_to_limits(width, height);
        self.width = width;
        self.height = height;
        self.visible = visible;

        let mut attrs = winit::window::WindowAttributes::default()
            .with_title(&self.title)
            .with_inner_size(LogicalSize::new(width, height))
            .with_visible(visible);
        if let Position::Custom { x, y } = self.settings.position {
            attrs = attrs.with_position(PhysicalPosition::new(x, y));
            self.x = x;
            self.y = y;
        }

        let handle = platform.create_window(attrs)?;
        self.scale = handle.scale_factor();
        self.handle = Some(Arc::new(handle));

        self.log(Level::Trace, "finish initialisation");
        Ok(())
    }

    /// Releases the native handle; `is_open` reports false afterwards.
    pub fn close(&mut self) {
        if self.handle.is_none() {
            return;
        }

        self.log(Level::Trace, "start shutdown");
        self.handle = None;
        self.log(Level::Trace, "finish shutdown");
        self.log(Level::Info, "shutdown");
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Pumps the platform event loop once without blocking. Callbacks fire
    /// synchronously and land in `events` as translated [`Event`]s.
    pub fn update(&mut self, platform: &mut Platform, events: &mut EventQueue) {
        platform.pump(self, events);
    }

    pub fn hide(&mut self) {
        self.visible = false;
        if let Some(handle) = &self.handle {
            handle.set_visible(false);
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
        if let Some(handle) = &self.handle {
            handle.set_visible(true);
        }
    }

    pub fn is_visible(&self) -> bool {
        match &self.handle {
            Some(handle) => handle.is_visible().unwrap_or(self.visible),
            None => false,
        }
    }

    /// Cached logical size: the requested or last reported window size in
    /// screen coordinates.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = self.clamp_to_limits(width, height);
        self.width = width;
        self.height = height;
        if let Some(handle) = &self.handle {
            let _ = handle.request_inner_size(LogicalSize::new(width, height));
        }
    }

    /// Pixel size of the renderable backing store. Differs from the logical
    /// size under display scaling.
    pub fn framebuffer_size(&self) -> (u32, u32) {
        match &self.handle {
            Some(handle) => {
                let size = handle.inner_size();
                (size.width, size.height)
            }
            None => (0, 0),
        }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn reposition(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
        if let Some(handle) = &self.handle {
            handle.set_outer_position(PhysicalPosition::new(x, y));
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
        if let Some(handle) = &self.handle {
            handle.set_title(&self.title);
        }
    }

    /// Folds a translated event into the cached geometry and publishes it.
    pub(crate) fn record(&mut self, event: Event, events: &mut EventQueue) {
        match &event {
            Event::WindowResized { width, height } => {
                self.width = *width;
                self.height = *height;
            }
            Event::WindowMoved { x, y } => {
                self.x = *x;
                self.y = *y;
            }
            Event::WindowScaleChanged { x, .. } => {
                self.scale = *x;
            }
            _ => {}
        }
        events.push(event);
    }

    pub(crate) fn native_id(&self) -> Option<winit::window::WindowId> {
        self.handle.as_ref().map(|handle| handle.id())
    }

    pub(crate) fn scale(&self) -> f64 {
        self.scale
    }

    pub(crate) fn modifiers(&self) -> ModifiersState {
        self.modifiers
    }

    pub(crate) fn set_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    fn log(&self, level: Level, message: &str) {
        self.logger.nlog(level, Actor::Core, &self.name, message);
    }

    fn clamp_to_limits(&self, width: u32, height: u32) -> (u32, u32) {
        let width = match self.settings.limits.width {
            Some(limit) => width.min(limit),
            None => width,
        };
        let height = match self.settings.limits.height {
            Some(limit) => height.min(limit),
            None => height,
        };
        (width, height)
    }
}

impl RenderTarget for Window {
    fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        Window::framebuffer_size(self)
    }

    fn surface_handle(&self) -> Option<SurfaceHandle> {
        self.handle
            .as_ref()
            .map(|handle| handle.clone() as SurfaceHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LoggerSettings;

    fn quiet_logger() -> Arc<Logger> {
        Logger::stderr(
            LoggerSettings {
                disabled: true,
                ..LoggerSettings::default()
            },
            "test",
        )
    }

    fn limited_window(limits: SizeLimits) -> Window {
        Window::new(
            WindowSettings {
                limits,
                position: Position::Default,
            },
            0,
            quiet_logger(),
        )
    }

    #[test]
    fn requested_sizes_never_exceed_configured_limits() {
        let window = limited_window(SizeLimits {
            width: Some(1280),
            height: Some(720),
        });
        assert_eq!(window.clamp_to_limits(1920, 1080), (1280, 720));
        assert_eq!(window.clamp_to_limits(640, 480), (640, 480));
        assert_eq!(window.clamp_to_limits(1280, 720), (1280, 720));
    }

    #[test]
    fn unset_limits_leave_sizes_untouched() {
        let window = limited_window(SizeLimits::default());
        assert_eq!(window.clamp_to_limits(3840, 2160), (3840, 2160));
    }

    #[test]
    fn resize_event_updates_cached_size_and_queues_exactly_one_event() {
        let mut window = limited_window(SizeLimits::default());
        let mut events = EventQueue::new();

        window.record(
            Event::WindowResized {
                width: 800,
                height: 600,
            },
            &mut events,
        );

        assert_eq!(window.size(), (800, 600));
        assert_eq!(events.len(), 1);
        assert_eq!(
            events.next(),
            Some(&Event::WindowResized {
                width: 800,
                height: 600
            })
        );
        assert_eq!(events.next(), None);
    }

    #[test]
    fn move_and_scale_events_update_cached_geometry() {
        let mut window = limited_window(SizeLimits::default());
        let mut events = EventQueue::new();

        window.record(Event::WindowMoved { x: 40, y: 60 }, &mut events);
        window.record(Event::WindowScaleChanged { x: 2.0, y: 2.0 }, &mut events);

        assert_eq!(window.position(), (40, 60));
        assert_eq!(window.scale(), 2.0);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn closed_window_reports_not_open_and_no_surface() {
        let window = limited_window(SizeLimits::default());
        assert!(!window.is_open());
        assert!(!window.is_visible());
        assert_eq!(window.framebuffer_size(), (0, 0));
        assert!(RenderTarget::surface_handle(&window).is_none());
    }
}
