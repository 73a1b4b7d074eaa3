// Input and window events, translated from the platform layer into one
// tagged union the application drains from an `EventQueue`.

mod queue;

pub use queue::EventQueue;

use std::path::PathBuf;
use winit::event::MouseButton;
use winit::keyboard::{KeyCode, ModifiersState};

/// One window-system occurrence.
///
/// Events are immutable once constructed. `FileDropped` owns its path list;
/// the paths live exactly as long as the event does, so draining or
/// resetting the queue releases them.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    WindowMoved { x: i32, y: i32 },
    WindowResized { width: u32, height: u32 },
    WindowClosed,
    WindowRefreshed,
    WindowFocused,
    WindowDefocused,
    WindowIconified,
    WindowUniconified,
    WindowMaximized,
    WindowUnmaximized,
    WindowScaleChanged { x: f64, y: f64 },
    FramebufferResized { width: u32, height: u32 },
    ButtonPressed { button: MouseButton, mods: ModifiersState },
    ButtonReleased { button: MouseButton, mods: ModifiersState },
    CursorMoved { x: f64, y: f64 },
    CursorEntered,
    CursorLeft,
    Scrolled { x: f64, y: f64 },
    KeyPressed { key: KeyCode, mods: ModifiersState },
    KeyRepeated { key: KeyCode, mods: ModifiersState },
    KeyReleased { key: KeyCode, mods: ModifiersState },
    CodepointInput { codepoint: char },
    FileDropped { paths: Vec<PathBuf> },
    MonitorConnected { name: String },
    MonitorDisconnected { name: String },
    JoystickConnected { id: u32 },
    JoystickDisconnected { id: u32 },
}
