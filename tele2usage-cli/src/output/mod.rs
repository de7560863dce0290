//! Output formatting for CLI.

mod json;
mod text;

pub use json::{AccountInfoOutput, JsonFormatter};
pub use text::{TextFormatter, format_duration};
#[cfg(test)]
mod tests;
