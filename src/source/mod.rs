//! Item source: manifest loading, duration parsing, filtered item sequence.

pub mod duration;
pub mod items;
pub mod manifest;

pub use duration::{DurationError, parse_duration};
pub use items::ItemSource;
pub use manifest::{Descriptor, Group, load_manifest};
