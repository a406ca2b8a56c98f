//! Target store abstraction layer

pub mod traits;

pub use traits::{TargetStore, TargetTransaction};
