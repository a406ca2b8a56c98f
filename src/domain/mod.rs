//! Domain models and types for Catalog Sync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ExternalId`], [`PassId`])
//! - **Entity kinds** ([`EntityKind`]) naming the four synchronized collections
//! - **Typed records** ([`TypedRecord`]) produced by the record transformer
//! - **Statement values** ([`SqlValue`], [`SqlRow`]) shared by the engine and target adapters
//! - **Error types** ([`SyncError`], [`SourceError`], [`TargetError`], [`TransformError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SyncError>`]:
//!
//! ```rust
//! use catalog_sync::domain::{Result, SyncError};
//!
//! fn example() -> Result<()> {
//!     let config = catalog_sync::config::load_config("catalog-sync.toml")?;
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod errors;
pub mod ids;
pub mod records;
pub mod result;
pub mod value;

// Re-export commonly used types for convenience
pub use entity::EntityKind;
pub use errors::{SourceError, SyncError, TargetError, TransformError};
pub use ids::{ExternalId, PassId};
pub use records::{
    MonthlyInstallment, OfferRecord, ProductRecord, Promo, RowImage, ShopRecord,
    ShopReviewRecord, TypedRecord,
};
pub use result::Result;
pub use value::{SqlRow, SqlValue};
