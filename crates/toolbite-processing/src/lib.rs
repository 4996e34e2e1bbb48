//! ToolBite Processing Library
//!
//! Transformation strategies, the engine adapters they wrap, and the
//! dispatcher that drives one request from validation to cleanup.

pub mod compression;
pub mod dispatch;
pub mod engines;
pub mod factory;
pub mod lifecycle;
pub mod pages;
pub mod strategies;
pub mod template;
pub mod traits;

// Re-export commonly used types
pub use compression::{ImageFamily, RecompressOutcome};
pub use dispatch::{Dispatched, Dispatcher, StrategyRegistry};
pub use engines::{
    BackgroundRemover, DocumentRenderer, HtmlConverter, PdfRasterizer, RenderSession,
};
pub use factory::Engines;
pub use lifecycle::{LifecycleState, RequestLifecycle};
pub use pages::PageSelection;
pub use strategies::{BackgroundRemoval, DocumentRender, Rasterization, Recompression};
pub use template::PageSetup;
pub use traits::{StoragePlan, TransformStrategy, Workspace};
