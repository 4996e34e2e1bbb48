//! The four transformation strategies.

mod background;
mod document;
mod rasterize;
mod recompress;

pub use background::BackgroundRemoval;
pub use document::DocumentRender;
pub use rasterize::{Rasterization, PAGES_OPTION};
pub use recompress::{parse_quality, Recompression, QUALITY_OPTION};
