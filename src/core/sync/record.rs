//! Processing of a single source document
//!
//! Each document is transformed, then written in its own transaction:
//! dimension resolution, association rows, the entity upsert and, for
//! products, the dependent installment and promo rows. Any error rolls the
//! whole record back; the runner decides what that means for the pass.

use super::dimension::{Dimension, DimensionResolver};
use super::sql;
use super::upsert::{upsert, UpsertOutcome};
use crate::adapters::source::RawDocument;
use crate::adapters::target::{TargetStore, TargetTransaction};
use crate::core::transform::transform;
use crate::domain::{EntityKind, ExternalId, ProductRecord, Result, SqlValue, TypedRecord};
use std::collections::HashSet;
use std::sync::Arc;

/// Writes one document per transaction into the target store
pub struct RecordProcessor {
    target: Arc<dyn TargetStore>,
    resolver: DimensionResolver,
}

impl RecordProcessor {
    pub fn new(target: Arc<dyn TargetStore>, resolver: DimensionResolver) -> Self {
        Self { target, resolver }
    }

    /// Transform `document` and write it atomically
    ///
    /// Malformed documents are rejected before a transaction is opened.
    ///
    /// # Errors
    ///
    /// Returns a transform error for a malformed document, or a target error
    /// if any statement or the commit fails. Nothing from the record is kept
    /// in either case.
    pub async fn process(&self, kind: EntityKind, document: &RawDocument) -> Result<UpsertOutcome> {
        let record = transform(kind, document)?;

        let mut tx = self.target.begin().await?;
        let applied = self.apply(tx.as_mut(), &record).await;
        match applied {
            Ok(outcome) => {
                tx.commit().await?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(
                        record_id = %record.id(),
                        error = %rollback_err,
                        "Rollback failed"
                    );
                }
                Err(e)
            }
        }
    }

    async fn apply(
        &self,
        tx: &mut dyn TargetTransaction,
        record: &TypedRecord,
    ) -> Result<UpsertOutcome> {
        match record {
            TypedRecord::Offer(offer) => upsert(tx, &offer.row()).await,
            TypedRecord::Shop(shop) => upsert(tx, &shop.row()).await,
            TypedRecord::ShopReview(review) => upsert(tx, &review.row()).await,
            TypedRecord::Product(product) => self.apply_product(tx, product).await,
        }
    }

    async fn apply_product(
        &self,
        tx: &mut dyn TargetTransaction,
        product: &ProductRecord,
    ) -> Result<UpsertOutcome> {
        let brand_id = match &product.brand {
            Some(brand) => Some(self.resolver.resolve(tx, Dimension::Brand, brand).await?),
            None => None,
        };

        for name in distinct(&product.categories) {
            let category_id = self.resolver.resolve(tx, Dimension::Category, name).await?;
            associate(tx, "product_categories", "category_id", &product.id, category_id).await?;
        }

        for code in distinct(&product.category_codes) {
            let code_id = self
                .resolver
                .resolve(tx, Dimension::CategoryCode, code)
                .await?;
            associate(tx, "product_category_codes", "category_code_id", &product.id, code_id)
                .await?;
        }

        let outcome = upsert(tx, &product.row(brand_id)).await?;
        let product_id = SqlValue::from(product.id.as_str());

        if let Some(installment) = &product.monthly_installment {
            tx.exec(
                sql::UPSERT_INSTALLMENT,
                &[
                    product_id.clone(),
                    installment.installment_id.into(),
                    installment.installment.into(),
                    installment.formatted_per_month.as_str().into(),
                ],
            )
            .await?;
        }

        for promo in &product.promos {
            tx.exec(
                sql::UPSERT_PROMO,
                &[
                    product_id.clone(),
                    promo.code.as_str().into(),
                    promo.comment.clone().into(),
                    promo.promo_type.as_str().into(),
                    promo.priority.into(),
                ],
            )
            .await?;
        }

        Ok(outcome)
    }
}

/// Insert one association row without letting its failure poison the record
async fn associate(
    tx: &mut dyn TargetTransaction,
    table: &'static str,
    dimension_column: &'static str,
    product_id: &ExternalId,
    dimension_id: i64,
) -> Result<()> {
    let statement = sql::association_insert(table, dimension_column);
    let params = [SqlValue::from(product_id.as_str()), SqlValue::Int(dimension_id)];

    tx.exec(sql::SAVEPOINT, &[]).await?;
    if let Err(e) = tx.exec(&statement, &params).await {
        tracing::warn!(
            table,
            record_id = %product_id,
            dimension_id,
            error = %e,
            "Association insert failed, continuing"
        );
        tx.exec(sql::ROLLBACK_TO_SAVEPOINT, &[]).await?;
    }
    tx.exec(sql::RELEASE_SAVEPOINT, &[]).await?;
    Ok(())
}

/// Values in first-seen order without repeats
fn distinct(values: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(String::as_str)
        .filter(|v| seen.insert(*v))
        .collect()
}
