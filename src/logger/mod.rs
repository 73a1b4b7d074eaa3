// Leveled, actor-tagged text sink.
//
// Every component logs through one of these. The logger is the only part of
// the crate built for concurrent use: formatting state sits behind one mutex
// and the output writer behind a second, shareable one, so several
// renderer/window pairs on different threads may feed a single sink.

mod color;

use crate::error::{Error, Result};
use chrono::Local;
use parking_lot::Mutex;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Severity of a log line, ordered from chattiest to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Trace,
    Info,
    Relevant,
    Warn,
    Error,
    Critical,
}

impl Level {
    fn name(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Trace => "trace",
            Level::Info => "info",
            Level::Relevant => "relevant",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Critical => "critical",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Level::Debug => "",
            Level::Trace => color::FG_PURPLE,
            Level::Info => color::FG_CYAN,
            Level::Relevant => color::FG_YELLOW,
            Level::Warn => color::FG_ORANGE,
            Level::Error => color::FG_RED,
            Level::Critical => color::BG_RED,
        }
    }

    /// Parses a level name as used in the config file, case-insensitively.
    pub fn parse(name: &str) -> Option<Level> {
        match name.to_ascii_lowercase().as_str() {
            "debug" => Some(Level::Debug),
            "trace" => Some(Level::Trace),
            "info" => Some(Level::Info),
            "relevant" => Some(Level::Relevant),
            "warn" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "critical" => Some(Level::Critical),
            _ => None,
        }
    }
}

/// Origin of a log line: the library itself or the embedding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Core,
    Client,
}

impl Actor {
    fn name(self) -> &'static str {
        match self {
            Actor::Core => "core",
            Actor::Client => "client",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Actor::Core => color::FG_GREEN,
            Actor::Client => color::FG_BLUE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerSettings {
    pub disabled: bool,
    pub level_min: Level,
    pub timestamp: bool,
    pub thread_id: bool,
    pub color: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            disabled: false,
            level_min: Level::Debug,
            timestamp: true,
            thread_id: false,
            color: true,
        }
    }
}

/// Shared output target. The mutex is supplied by the owner so independent
/// loggers can serialize writes to the same file or stream.
pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Cached `HH:MM:SS` text, recomputed at most once per log call and only
/// when the wall-clock second actually changed.
struct ClockCache {
    second: i64,
    text: String,
}

impl ClockCache {
    fn stamp(&mut self) -> &str {
        let now = Local::now();
        let second = now.timestamp();
        if second != self.second {
            self.second = second;
            self.text = now.format("%H:%M:%S").to_string();
        }
        &self.text
    }
}

pub struct Logger {
    app_name: String,
    settings: LoggerSettings,
    clock: Mutex<ClockCache>,
    output: SharedWriter,
}

impl Logger {
    pub fn new(settings: LoggerSettings, output: SharedWriter, app_name: &str) -> Arc<Self> {
        Arc::new(Self {
            app_name: app_name.to_owned(),
            settings,
            clock: Mutex::new(ClockCache {
                second: i64::MIN,
                text: String::new(),
            }),
            output,
        })
    }

    pub fn stderr(settings: LoggerSettings, app_name: &str) -> Arc<Self> {
        let writer: SharedWriter = Arc::new(Mutex::new(Box::new(std::io::stderr())));
        Self::new(settings, writer, app_name)
    }

    /// Opens `path` for appending and logs into it. A target that cannot be
    /// opened is a configuration mistake, reported as a logic error.
    pub fn file(
        settings: LoggerSettings,
        path: impl AsRef<Path>,
        app_name: &str,
    ) -> Result<Arc<Self>> {
        let path = path.as_ref();
        let file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::logic(format!("failed to open log output {}: {e}", path.display())))?;
        let writer: SharedWriter = Arc::new(Mutex::new(Box::new(file)));
        Ok(Self::new(settings, writer, app_name))
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn settings(&self) -> &LoggerSettings {
        &self.settings
    }

    /// Emits one line tagged with actor and level.
    pub fn log(&self, level: Level, actor: Actor, message: &str) {
        self.write(level, actor, None, message);
    }

    /// Emits one line additionally prefixed with a component name such as
    /// `renderer_0` or `window_1`.
    pub fn nlog(&self, level: Level, actor: Actor, name: &str, message: &str) {
        self.write(level, actor, Some(name), message);
    }

    fn write(&self, level: Level, actor: Actor, name: Option<&str>, message: &str) {
        if self.settings.disabled || level < self.settings.level_min {
            return;
        }

        let mut line = String::with_capacity(64 + message.len());

        if self.settings.timestamp {
            // The clock cache is the only shared formatting state.
            let mut clock = self.clock.lock();
            line.push('[');
            line.push_str(clock.stamp());
            line.push(']');
        }

        if self.settings.thread_id {
            line.push_str(&format!("[{:?}]", std::thread::current().id()));
        }

        if self.settings.color {
            line.push_str(&format!(
                "[{}{}{}][{}{}{}]",
                actor.color(),
                actor.name(),
                color::RESET,
                level.color(),
                level.name(),
                color::RESET,
            ));
        } else {
            line.push_str(&format!("[{}][{}]", actor.name(), level.name()));
        }

        match name {
            Some(name) => line.push_str(&format!(" {name}: {message}\n")),
            None => line.push_str(&format!(" {message}\n")),
        }

        let mut out = self.output.lock();
        let _ = out.write_all(line.as_bytes());
        let _ = out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture_logger(settings: LoggerSettings) -> (Arc<Logger>, Capture) {
        let capture = Capture::default();
        let writer: SharedWriter = Arc::new(Mutex::new(Box::new(capture.clone())));
        (Logger::new(settings, writer, "test"), capture)
    }

    fn plain_settings() -> LoggerSettings {
        LoggerSettings {
            timestamp: false,
            thread_id: false,
            color: false,
            ..LoggerSettings::default()
        }
    }

    #[test]
    fn tags_actor_and_level() {
        let (logger, capture) = capture_logger(plain_settings());
        logger.log(Level::Info, Actor::Core, "hello");
        let text = String::from_utf8(capture.0.lock().clone()).unwrap();
        assert_eq!(text, "[core][info] hello\n");
    }

    #[test]
    fn named_lines_carry_the_component_name() {
        let (logger, capture) = capture_logger(plain_settings());
        logger.nlog(Level::Trace, Actor::Core, "renderer_0", "swapchain creation");
        let text = String::from_utf8(capture.0.lock().clone()).unwrap();
        assert_eq!(text, "[core][trace] renderer_0: swapchain creation\n");
    }

    #[test]
    fn lines_below_the_minimum_level_are_dropped() {
        let mut settings = plain_settings();
        settings.level_min = Level::Warn;
        let (logger, capture) = capture_logger(settings);
        logger.log(Level::Info, Actor::Client, "ignored");
        logger.log(Level::Error, Actor::Client, "kept");
        let text = String::from_utf8(capture.0.lock().clone()).unwrap();
        assert_eq!(text, "[client][error] kept\n");
    }

    #[test]
    fn disabled_logger_writes_nothing() {
        let mut settings = plain_settings();
        settings.disabled = true;
        let (logger, capture) = capture_logger(settings);
        logger.log(Level::Critical, Actor::Core, "dropped");
        assert!(capture.0.lock().is_empty());
    }

    #[test]
    fn levels_are_ordered() {
        assert!(Level::Debug < Level::Trace);
        assert!(Level::Trace < Level::Info);
        assert!(Level::Info < Level::Relevant);
        assert!(Level::Relevant < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Critical);
    }

    #[test]
    fn level_names_parse_back() {
        assert_eq!(Level::parse("WARN"), Some(Level::Warn));
        assert_eq!(Level::parse("relevant"), Some(Level::Relevant));
        assert_eq!(Level::parse("verbose"), None);
    }
}
