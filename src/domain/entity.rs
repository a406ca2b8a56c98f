//! Entity kinds synchronized by the engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One kind of source document, each driven by its own pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Marketplace offers
    Offer,
    /// Catalog products
    Product,
    /// Merchant shops
    Shop,
    /// Reviews left on shops
    ShopReview,
}

impl EntityKind {
    /// Every entity kind, in the order pipelines are started
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Offer,
        EntityKind::Product,
        EntityKind::Shop,
        EntityKind::ShopReview,
    ];

    /// Configuration and log name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Offer => "offer",
            EntityKind::Product => "product",
            EntityKind::Shop => "shop",
            EntityKind::ShopReview => "shop_review",
        }
    }

    /// Default source collection name
    pub fn default_collection(&self) -> &'static str {
        match self {
            EntityKind::Offer => "offers",
            EntityKind::Product => "products",
            EntityKind::Shop => "shops",
            EntityKind::ShopReview => "shop_reviews",
        }
    }

    /// Target table holding the entity rows
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Offer => "offers",
            EntityKind::Product => "products",
            EntityKind::Shop => "shops",
            EntityKind::ShopReview => "shop_reviews",
        }
    }

    /// Plural label used in counter names, e.g. `success_processed_offers_total`
    pub fn metric_label(&self) -> &'static str {
        match self {
            EntityKind::Offer => "offers",
            EntityKind::Product => "products",
            EntityKind::Shop => "shops",
            EntityKind::ShopReview => "shop_reviews",
        }
    }

    /// Dense index, used for per-kind counter arrays
    pub fn index(&self) -> usize {
        match self {
            EntityKind::Offer => 0,
            EntityKind::Product => 1,
            EntityKind::Shop => 2,
            EntityKind::ShopReview => 3,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offer" => Ok(EntityKind::Offer),
            "product" => Ok(EntityKind::Product),
            "shop" => Ok(EntityKind::Shop),
            "shop_review" => Ok(EntityKind::ShopReview),
            other => Err(format!(
                "Unknown entity kind '{other}'. Must be one of: offer, product, shop, shop_review"
            )),
        }
    }
}
