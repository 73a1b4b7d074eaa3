// Demo host: one window, one renderer, pre-loaded triangle shaders, and a
// poll/drain/draw main loop.

use anyhow::{Context, Result};
use easel::{
    Actor, AppInfo, Config, Event, EventQueue, Level, Logger, Platform, Renderer, ShaderStage,
    Version, Window,
};
use winit::keyboard::KeyCode;

fn main() -> Result<()> {
    let config = Config::load();

    let logger = match &config.log.file {
        Some(path) => Logger::file(config.logger_settings(), path, "easel")?,
        None => Logger::stderr(config.logger_settings(), "easel"),
    };
    logger.log(Level::Relevant, Actor::Client, "starting");

    let mut platform = Platform::new().context("failed to initialise the window system")?;
    let mut events = EventQueue::new();

    let mut window = Window::new(config.window_settings(), 0, logger.clone());
    window.open(
        &mut platform,
        &config.window.title,
        config.window.width,
        config.window.height,
        config.window.visible,
    )?;

    let info = AppInfo {
        app_name: config.window.title.clone(),
        app_version: Version::new(0, 1, 0),
        engine_name: "easel".to_owned(),
        engine_version: Version::new(0, 1, 0),
    };
    let mut renderer = Renderer::vulkan(
        config.renderer_settings(),
        info,
        0,
        logger.clone(),
        &platform,
    )?;

    renderer.load_shader(ShaderStage::Vertex, &config.shaders.vertex)?;
    renderer.load_shader(ShaderStage::Fragment, &config.shaders.fragment)?;

    renderer.start(&window)?;

    let mut running = true;
    while running {
        window.update(&mut platform, &mut events);

        while let Some(event) = events.next() {
            match event {
                Event::WindowClosed => running = false,
                Event::KeyPressed {
                    key: KeyCode::Escape,
                    ..
                } => running = false,
                Event::FramebufferResized { width, height } => {
                    renderer.resize(*width, *height);
                }
                _ => {}
            }
        }
        events.reset();

        if running {
            renderer.update()?;
        }
    }

    renderer.stop();
    window.close();
    logger.log(Level::Relevant, Actor::Client, "shutdown");
    Ok(())
}
