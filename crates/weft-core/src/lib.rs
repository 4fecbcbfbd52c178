#![forbid(unsafe_code)]

//! Core: pixel geometry and the logging facade shared by the Weft crates.

pub mod geometry;
pub mod logging;

pub use geometry::{Point, Rect, Size};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, trace, warn};
