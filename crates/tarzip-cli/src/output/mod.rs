//! Output formatting module.

mod formatter;
mod human;
mod json;

pub use formatter::OutputFormatter;

use crate::progress::Echo;
use human::HumanFormatter;
use json::JsonFormatter;

/// Creates the per-file result formatter matching the live output level.
pub fn create_formatter(echo: Echo) -> Box<dyn OutputFormatter> {
    match echo {
        Echo::Silent => Box::new(JsonFormatter),
        Echo::Quiet => Box::new(HumanFormatter::new(false, true)),
        Echo::Normal => Box::new(HumanFormatter::new(false, false)),
        Echo::Verbose => Box::new(HumanFormatter::new(true, false)),
    }
}
