//! Typed records produced by the record transformer
//!
//! Each record carries the already-validated column values for one source
//! document. [`RowImage`] is the flat column list handed to the upsert
//! executor.

use super::entity::EntityKind;
use super::ids::ExternalId;
use super::value::SqlValue;

/// Column values for one target row, keyed by the external identifier
///
/// `columns` never contains the key column itself.
#[derive(Debug, Clone, PartialEq)]
pub struct RowImage {
    /// Target table
    pub table: &'static str,
    /// External identifier, stored in the `id` column
    pub key: ExternalId,
    /// Mutable columns in statement order
    pub columns: Vec<(&'static str, SqlValue)>,
}

impl RowImage {
    /// Column names in statement order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|(name, _)| *name).collect()
    }

    /// Column values in statement order
    pub fn values(&self) -> Vec<SqlValue> {
        self.columns.iter().map(|(_, value)| value.clone()).collect()
    }
}

/// A validated source document of any entity kind
#[derive(Debug, Clone, PartialEq)]
pub enum TypedRecord {
    Offer(OfferRecord),
    Product(ProductRecord),
    Shop(ShopRecord),
    ShopReview(ShopReviewRecord),
}

impl TypedRecord {
    /// External identifier of the record
    pub fn id(&self) -> &ExternalId {
        match self {
            TypedRecord::Offer(r) => &r.id,
            TypedRecord::Product(r) => &r.id,
            TypedRecord::Shop(r) => &r.id,
            TypedRecord::ShopReview(r) => &r.id,
        }
    }

    /// Entity kind of the record
    pub fn kind(&self) -> EntityKind {
        match self {
            TypedRecord::Offer(_) => EntityKind::Offer,
            TypedRecord::Product(_) => EntityKind::Product,
            TypedRecord::Shop(_) => EntityKind::Shop,
            TypedRecord::ShopReview(_) => EntityKind::ShopReview,
        }
    }
}

/// Marketplace offer
#[derive(Debug, Clone, PartialEq)]
pub struct OfferRecord {
    pub id: ExternalId,
    pub product_id: Option<String>,
    pub category: Option<String>,
    pub shop_id: Option<String>,
    pub availability_date: Option<String>,
    pub delivery: Option<String>,
    pub delivery_duration: Option<String>,
    pub kaspi_delivery: Option<bool>,
    pub kd_destination_city: Option<String>,
    pub kd_pickup_date: Option<String>,
    pub located_in_point: Option<String>,
    pub shop_rating: Option<f64>,
    pub shop_reviews_quantity: Option<i64>,
    pub preorder: Option<bool>,
    pub price: Option<f64>,
}

impl OfferRecord {
    pub fn row(&self) -> RowImage {
        RowImage {
            table: EntityKind::Offer.table(),
            key: self.id.clone(),
            columns: vec![
                ("product_id", self.product_id.clone().into()),
                ("category", self.category.clone().into()),
                ("shop_id", self.shop_id.clone().into()),
                ("availability_date", self.availability_date.clone().into()),
                ("delivery", self.delivery.clone().into()),
                ("delivery_duration", self.delivery_duration.clone().into()),
                ("kaspi_delivery", self.kaspi_delivery.into()),
                ("kd_destination_city", self.kd_destination_city.clone().into()),
                ("kd_pickup_date", self.kd_pickup_date.clone().into()),
                ("located_in_point", self.located_in_point.clone().into()),
                ("shop_rating", self.shop_rating.into()),
                ("shop_reviews_quantity", self.shop_reviews_quantity.into()),
                ("preorder", self.preorder.into()),
                ("price", self.price.into()),
            ],
        }
    }
}

/// Monthly installment plan attached to a product
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyInstallment {
    pub installment_id: i64,
    pub installment: bool,
    pub formatted_per_month: String,
}

/// Promotion attached to a product
#[derive(Debug, Clone, PartialEq)]
pub struct Promo {
    pub code: String,
    pub comment: Option<String>,
    pub promo_type: String,
    pub priority: i64,
}

/// Catalog product with its dimension references and dependent rows
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub id: ExternalId,
    pub adjusted_rating: Option<f64>,
    /// Brand name, resolved to `brand_id` inside the record transaction
    pub brand: Option<String>,
    /// Category names, in source order
    pub categories: Vec<String>,
    /// Category codes, in source order
    pub category_codes: Vec<String>,
    pub category_id: i64,
    pub created_time: Option<String>,
    pub credit_monthly_price: Option<f64>,
    pub currency: Option<String>,
    pub delivery_duration: Option<String>,
    pub discount: Option<f64>,
    pub has_variants: Option<bool>,
    pub loan_available: Option<bool>,
    pub monthly_installment: Option<MonthlyInstallment>,
    pub promos: Vec<Promo>,
    pub rating: Option<f64>,
    pub reviews_link: Option<String>,
    pub reviews_quantity: Option<i64>,
    pub link: Option<String>,
    pub title: Option<String>,
    pub unit_price: Option<f64>,
    pub unit_sale_price: Option<f64>,
    pub weight: Option<f64>,
}

impl ProductRecord {
    /// Builds the product row once the brand surrogate id is known
    pub fn row(&self, brand_id: Option<i64>) -> RowImage {
        RowImage {
            table: EntityKind::Product.table(),
            key: self.id.clone(),
            columns: vec![
                ("adjusted_rating", self.adjusted_rating.into()),
                ("brand_id", brand_id.into()),
                ("category_id", self.category_id.into()),
                ("created_time", self.created_time.clone().into()),
                ("credit_monthly_price", self.credit_monthly_price.into()),
                ("currency", self.currency.clone().into()),
                ("delivery_duration", self.delivery_duration.clone().into()),
                ("discount", self.discount.into()),
                ("has_variants", self.has_variants.into()),
                ("loan_available", self.loan_available.into()),
                ("rating", self.rating.into()),
                ("reviews_link", self.reviews_link.clone().into()),
                ("reviews_quantity", self.reviews_quantity.into()),
                ("link", self.link.clone().into()),
                ("title", self.title.clone().into()),
                ("unit_price", self.unit_price.into()),
                ("unit_sale_price", self.unit_sale_price.into()),
                ("weight", self.weight.into()),
            ],
        }
    }
}

/// Merchant shop
#[derive(Debug, Clone, PartialEq)]
pub struct ShopRecord {
    pub id: ExternalId,
    pub name: Option<String>,
}

impl ShopRecord {
    pub fn row(&self) -> RowImage {
        RowImage {
            table: EntityKind::Shop.table(),
            key: self.id.clone(),
            columns: vec![("name", self.name.clone().into())],
        }
    }
}

/// Review left on a shop
#[derive(Debug, Clone, PartialEq)]
pub struct ShopReviewRecord {
    pub id: ExternalId,
    pub shop_id: String,
    pub rating: Option<f64>,
    pub author: Option<String>,
    pub comment: Option<String>,
    pub date: Option<String>,
}

impl ShopReviewRecord {
    pub fn row(&self) -> RowImage {
        RowImage {
            table: EntityKind::ShopReview.table(),
            key: self.id.clone(),
            columns: vec![
                ("shop_id", self.shop_id.clone().into()),
                ("rating", self.rating.into()),
                ("author", self.author.clone().into()),
                ("comment", self.comment.clone().into()),
                ("date", self.date.clone().into()),
            ],
        }
    }
}
