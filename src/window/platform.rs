// Process-lifetime window-system context.
//
// The windowing library's global init lives here, not inside `Window`:
// exactly one `Platform` may exist at a time, created once by the
// application and shared by every window it opens. Window creation and
// event delivery both run through short, non-blocking pumps of the event
// loop.

use super::Window;
use crate::error::{Error, Result};
use crate::event::{Event, EventQueue};
use raw_window_handle::{HasDisplayHandle, RawDisplayHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseScrollDelta, StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::platform::pump_events::EventLoopExtPumpEvents;
use winit::window::{WindowAttributes, WindowId};

static PLATFORM_ALIVE: AtomicBool = AtomicBool::new(false);

pub struct Platform {
    event_loop: EventLoop<()>,
}

impl Platform {
    pub fn new() -> Result<Self> {
        if PLATFORM_ALIVE.swap(true, Ordering::SeqCst) {
            return Err(Error::logic("window system is already initialised"));
        }

        match EventLoop::new() {
            Ok(event_loop) => Ok(Self { event_loop }),
            Err(e) => {
                PLATFORM_ALIVE.store(false, Ordering::SeqCst);
                Err(Error::Platform(e.to_string()))
            }
        }
    }

    /// Display handle the graphics instance derives its platform surface
    /// extensions from.
    pub fn raw_display_handle(&self) -> Result<RawDisplayHandle> {
        Ok(self
            .event_loop
            .display_handle()
            .map_err(|e| Error::Platform(e.to_string()))?
            .as_raw())
    }

    /// Creates a native window. Creation has to run on the event loop, so
    /// the request is serviced by one zero-timeout pump.
    pub(crate) fn create_window(&mut self, attrs: WindowAttributes) -> Result<winit::window::Window> {
        let mut creator = Creator {
            attrs: Some(attrs),
            created: None,
            error: None,
        };
        self.event_loop
            .pump_app_events(Some(Duration::ZERO), &mut creator);

        match (creator.created, creator.error) {
            (Some(window), _) => Ok(window),
            (None, Some(error)) => Err(Error::Platform(error)),
            (None, None) => Err(Error::Platform(
                "event loop did not service the window request".to_owned(),
            )),
        }
    }

    /// One non-blocking event-loop pass; pending window-system events for
    /// `window` fire synchronously into `events`.
    pub(crate) fn pump(&mut self, window: &mut Window, events: &mut EventQueue) {
        let mut pump = Pump { window, events };
        self.event_loop
            .pump_app_events(Some(Duration::ZERO), &mut pump);
    }
}

impl Drop for Platform {
    fn drop(&mut self) {
        PLATFORM_ALIVE.store(false, Ordering::SeqCst);
    }
}

struct Creator {
    attrs: Option<WindowAttributes>,
    created: Option<winit::window::Window>,
    error: Option<String>,
}

impl Creator {
    fn create(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(attrs) = self.attrs.take() {
            match event_loop.create_window(attrs) {
                Ok(window) => self.created = Some(window),
                Err(e) => self.error = Some(e.to_string()),
            }
        }
    }
}

impl ApplicationHandler for Creator {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, _cause: StartCause) {
        self.create(event_loop);
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.create(event_loop);
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}
}

struct Pump<'a> {
    window: &'a mut Window,
    events: &'a mut EventQueue,
}

impl ApplicationHandler for Pump<'_> {
    fn resumed(&mut self, _: &ActiveEventLoop) {}

    fn window_event(&mut self, _: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.native_id() != Some(id) {
            return;
        }
        forward(self.window, event, self.events);
    }
}

/// Translates one platform callback into queued events. Occurrences the
/// window system does not surface (iconify/maximize transitions, monitor
/// and joystick hotplug) keep their `Event` variants but are never produced
/// by this binding.
fn forward(window: &mut Window, event: WindowEvent, events: &mut EventQueue) {
    let mods = window.modifiers();

    match event {
        WindowEvent::Moved(position) => {
            window.record(
                Event::WindowMoved {
                    x: position.x,
                    y: position.y,
                },
                events,
            );
        }
        WindowEvent::Resized(size) => {
            // The window system reports pixels; the window-resized event
            // carries screen coordinates and the framebuffer event carries
            // the pixel size.
            let logical: LogicalSize<u32> = size.to_logical(window.scale());
            window.record(
                Event::WindowResized {
                    width: logical.width,
                    height: logical.height,
                },
                events,
            );
            window.record(
                Event::FramebufferResized {
                    width: size.width,
                    height: size.height,
                },
                events,
            );
        }
        WindowEvent::CloseRequested => window.record(Event::WindowClosed, events),
        WindowEvent::RedrawRequested => window.record(Event::WindowRefreshed, events),
        WindowEvent::Focused(true) => window.record(Event::WindowFocused, events),
        WindowEvent::Focused(false) => window.record(Event::WindowDefocused, events),
        WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
            window.record(
                Event::WindowScaleChanged {
                    x: scale_factor,
                    y: scale_factor,
                },
                events,
            );
        }
        WindowEvent::MouseInput { state, button, .. } => {
            let event = match state {
                ElementState::Pressed => Event::ButtonPressed { button, mods },
                ElementState::Released => Event::ButtonReleased { button, mods },
            };
            window.record(event, events);
        }
        WindowEvent::CursorMoved { position, .. } => {
            window.record(
                Event::CursorMoved {
                    x: position.x,
                    y: position.y,
                },
                events,
            );
        }
        WindowEvent::CursorEntered { .. } => window.record(Event::CursorEntered, events),
        WindowEvent::CursorLeft { .. } => window.record(Event::CursorLeft, events),
        WindowEvent::MouseWheel { delta, .. } => {
            let (x, y) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (f64::from(x), f64::from(y)),
                MouseScrollDelta::PixelDelta(position) => (position.x, position.y),
            };
            window.record(Event::Scrolled { x, y }, events);
        }
        WindowEvent::KeyboardInput { event, .. } => {
            let state = event.state;
            let repeat = event.repeat;

            if let PhysicalKey::Code(key) = event.physical_key {
                let translated = match (state, repeat) {
                    (ElementState::Pressed, false) => Event::KeyPressed { key, mods },
                    (ElementState::Pressed, true) => Event::KeyRepeated { key, mods },
                    (ElementState::Released, _) => Event::KeyReleased { key, mods },
                };
                window.record(translated, events);
            }

            if state == ElementState::Pressed {
                if let Some(text) = event.text {
                    for codepoint in text.chars() {
                        window.record(Event::CodepointInput { codepoint }, events);
                    }
                }
            }
        }
        WindowEvent::ModifiersChanged(modifiers) => {
            window.set_modifiers(modifiers.state());
        }
        WindowEvent::DroppedFile(path) => {
            window.record(Event::FileDropped { paths: vec![path] }, events);
        }
        _ => {}
    }
}
