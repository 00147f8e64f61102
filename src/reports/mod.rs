//! Rendering of a scorecard run.
//!
//! Both generators take the same [`Scorecard`] and write into any [`core::fmt::Write`]:
//! - **Console**: aligned, optionally colored text for the terminal
//! - **JSON**: the scorecard serialized as a pretty-printed document

mod console;
mod json;
mod scorecard;

pub use console::generate as generate_console;
pub use json::generate as generate_json;
pub use scorecard::Scorecard;
