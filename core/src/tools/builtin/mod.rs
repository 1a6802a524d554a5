//! Built-in tools and the manifest of tool sources

pub mod shell_echo;
pub mod time_now;
pub mod weather_tool;

pub use shell_echo::{ShellEchoSource, ShellEchoTool};
pub use time_now::{TimeNowSource, TimeNowTool};
pub use weather_tool::{weather_tool, WeatherToolSource};

use crate::tools::ToolSource;

/// Every tool source compiled into the binary, in discovery order
pub fn manifest() -> Vec<Box<dyn ToolSource>> {
    vec![
        Box::new(ShellEchoSource),
        Box::new(TimeNowSource),
        Box::new(WeatherToolSource),
    ]
}
