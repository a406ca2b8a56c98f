//! Source store abstraction layer

pub mod traits;

pub use traits::{RawDocument, SourceStore};
