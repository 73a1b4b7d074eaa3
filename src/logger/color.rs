// ANSI escape sequences used by the logger when colored output is enabled.

pub const RESET: &str = "\x1b[0m";

pub const FG_RED: &str = "\x1b[31m";
pub const FG_GREEN: &str = "\x1b[32m";
pub const FG_BLUE: &str = "\x1b[34m";
pub const FG_PURPLE: &str = "\x1b[35m";
pub const FG_CYAN: &str = "\x1b[36m";
pub const FG_YELLOW: &str = "\x1b[33m";

pub const BG_RED: &str = "\x1b[41m";

// 256-color code; terminals without extended color support render it as-is.
pub const FG_ORANGE: &str = "\x1b[38;5;202m";
