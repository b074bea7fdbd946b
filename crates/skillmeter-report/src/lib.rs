//! skillmeter-report: Markdown and HTML renderings of a session report.
//!
//! Rendering is pure: every function returns a `String` and the caller
//! decides where it goes.

pub mod html;
pub mod markdown;

pub use html::generate_html;
pub use markdown::render_markdown;
