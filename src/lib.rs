//! Thin windowing and rendering layer over Vulkan and the native window
//! system: a device/swapchain/pipeline lifecycle with pre-recorded triangle
//! drawing, window event translation into a pollable queue, and a shared
//! leveled/actor-tagged log sink.

pub mod backend;
pub mod config;
pub mod error;
pub mod event;
pub mod logger;
pub mod renderer;
pub mod window;

pub use config::Config;
pub use error::{Error, Result};
pub use event::{Event, EventQueue};
pub use logger::{Actor, Level, Logger, LoggerSettings};
pub use renderer::{AppInfo, Renderer, RendererSettings, Shader, ShaderStage, Version};
pub use window::{Platform, RenderTarget, Window, WindowSettings};
