//! Integration tests for record processing and pipeline passes
//!
//! These tests run the real transformer, dimension resolver, upsert executor
//! and pipeline runner against in-memory stores and verify that:
//! - Repeated passes converge to the same target state
//! - Dimension rows are shared and keep their surrogate ids
//! - A bad record never stops its neighbours
//! - Pages cover the collection exactly once
//! - Pass-level failures abort only the current pass

mod support;

use catalog_sync::adapters::source::RawDocument;
use catalog_sync::core::metrics::{CounterSink, CounterSnapshot};
use catalog_sync::core::sync::{DimensionResolver, PipelineRunner, RecordProcessor, UpsertOutcome};
use catalog_sync::domain::{EntityKind, SqlValue, SyncError, TargetError};
use fake::faker::company::en::CompanyName;
use fake::Fake;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use support::{offer, product, review, shop, MemorySource, MemoryTarget};
use tokio::sync::watch;

fn doc(value: Value) -> RawDocument {
    value.as_object().cloned().unwrap()
}

fn processor(target: &MemoryTarget) -> Arc<RecordProcessor> {
    Arc::new(RecordProcessor::new(
        Arc::new(target.clone()),
        DimensionResolver::new(3),
    ))
}

struct Harness {
    source: Arc<MemorySource>,
    target: MemoryTarget,
    metrics: Arc<CounterSink>,
    _shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Harness {
    fn new(source: MemorySource) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            source: Arc::new(source),
            target: MemoryTarget::new(),
            metrics: Arc::new(CounterSink::new()),
            _shutdown_tx: shutdown_tx,
            shutdown_rx,
        }
    }

    fn runner(&self, kind: EntityKind, collection: &str) -> PipelineRunner {
        PipelineRunner::new(
            kind,
            collection,
            self.source.clone(),
            processor(&self.target),
            self.metrics.clone(),
            self.shutdown_rx.clone(),
        )
        .with_idle_interval(Duration::ZERO)
    }
}

#[tokio::test]
async fn test_shop_insert_then_update() {
    let target = MemoryTarget::new();
    let processor = processor(&target);

    let outcome = processor
        .process(EntityKind::Shop, &doc(shop("s1", "Acme")))
        .await
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Inserted);

    let outcome = processor
        .process(EntityKind::Shop, &doc(shop("s1", "Acme Corp")))
        .await
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated);

    let db = target.snapshot().await;
    assert_eq!(db.count("shops"), 1);
    let row = db.find("shops", "id", "s1").unwrap();
    assert_eq!(row.get("name"), Some(&SqlValue::Text("Acme Corp".into())));
    assert_eq!(target.commits(), 2);
}

#[tokio::test]
async fn test_offer_and_review_columns() {
    let target = MemoryTarget::new();
    let processor = processor(&target);

    processor
        .process(EntityKind::Offer, &doc(offer("o1", 199990.0)))
        .await
        .unwrap();
    processor
        .process(EntityKind::ShopReview, &doc(review("r1", "s1")))
        .await
        .unwrap();

    let db = target.snapshot().await;
    let offer = db.find("offers", "id", "o1").unwrap();
    assert_eq!(offer.get("product_id"), Some(&SqlValue::Text("p-1".into())));
    assert_eq!(offer.get("shop_id"), Some(&SqlValue::Text("s1".into())));
    assert_eq!(offer.get("shop_reviews_quantity"), Some(&SqlValue::Int(120)));
    assert_eq!(offer.get("price"), Some(&SqlValue::Float(199990.0)));

    let review = db.find("shop_reviews", "id", "r1").unwrap();
    assert_eq!(review.get("shop_id"), Some(&SqlValue::Text("s1".into())));
    assert_eq!(
        review.get("comment"),
        Some(&SqlValue::Text("Fast delivery".into()))
    );
}

#[tokio::test]
async fn test_product_categories_create_dimensions_and_associations() {
    let target = MemoryTarget::new();
    let processor = processor(&target);
    let document = doc(product("p1", Some("Apple"), &["Electronics", "Phones"], &["SMART"]));

    processor
        .process(EntityKind::Product, &document)
        .await
        .unwrap();

    let db = target.snapshot().await;
    assert_eq!(db.count("categories"), 2);
    assert_eq!(db.count("product_categories"), 2);
    assert_eq!(db.count("category_codes"), 1);
    assert_eq!(db.count("product_category_codes"), 1);
    assert_eq!(db.count("brands"), 1);

    let brand_id = db.dimension_id("brands", "name", "Apple").unwrap();
    let product = db.find("products", "id", "p1").unwrap();
    assert_eq!(product.get("brand_id"), Some(&SqlValue::Int(brand_id)));
    assert_eq!(product.get("category_id"), Some(&SqlValue::Int(1234)));

    let electronics = db.dimension_id("categories", "name", "Electronics").unwrap();
    assert!(db
        .rows("product_categories")
        .iter()
        .any(|r| r.get("product_id") == Some(&SqlValue::Text("p1".into()))
            && r.get("category_id") == Some(&SqlValue::Int(electronics))));
}

#[tokio::test]
async fn test_product_reprocessing_is_idempotent() {
    let target = MemoryTarget::new();
    let processor = processor(&target);
    let document = doc(product("p1", Some("Apple"), &["Electronics", "Phones"], &["SMART"]));

    processor
        .process(EntityKind::Product, &document)
        .await
        .unwrap();
    let first = target.snapshot().await;

    let outcome = processor
        .process(EntityKind::Product, &document)
        .await
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated);
    let second = target.snapshot().await;

    for table in [
        "products",
        "brands",
        "categories",
        "category_codes",
        "product_categories",
        "product_category_codes",
    ] {
        assert_eq!(first.count(table), second.count(table), "{table}");
    }
    assert_eq!(
        first.dimension_id("categories", "name", "Phones"),
        second.dimension_id("categories", "name", "Phones")
    );
    assert_eq!(
        first.dimension_id("brands", "name", "Apple"),
        second.dimension_id("brands", "name", "Apple")
    );
}

#[tokio::test]
async fn test_products_share_dimension_rows() {
    let target = MemoryTarget::new();
    let processor = processor(&target);

    processor
        .process(
            EntityKind::Product,
            &doc(product("p1", Some("Apple"), &["Phones"], &[])),
        )
        .await
        .unwrap();
    processor
        .process(
            EntityKind::Product,
            &doc(product("p2", Some("Apple"), &["Phones", "Phones"], &[])),
        )
        .await
        .unwrap();

    let db = target.snapshot().await;
    assert_eq!(db.count("brands"), 1);
    assert_eq!(db.count("categories"), 1);
    assert_eq!(db.count("product_categories"), 2);

    let p1 = db.find("products", "id", "p1").unwrap();
    let p2 = db.find("products", "id", "p2").unwrap();
    assert_eq!(p1.get("brand_id"), p2.get("brand_id"));
}

#[tokio::test]
async fn test_product_without_brand_has_null_brand_id() {
    let target = MemoryTarget::new();
    let processor = processor(&target);

    processor
        .process(EntityKind::Product, &doc(product("p1", None, &[], &[])))
        .await
        .unwrap();

    let db = target.snapshot().await;
    assert_eq!(db.count("brands"), 0);
    let row = db.find("products", "id", "p1").unwrap();
    assert_eq!(row.get("brand_id"), Some(&SqlValue::Null));
}

#[tokio::test]
async fn test_installment_and_promos_are_upserted() {
    let target = MemoryTarget::new();
    let processor = processor(&target);

    let mut document = product("p1", Some("Apple"), &["Phones"], &[]);
    document["monthlyInstallment"] = json!({
        "id": 3.0,
        "installment": true,
        "formattedPerMonth": "16 666 ₸ x 12"
    });
    document["promo"] = json!([
        {"priority": 1, "code": "BLACKFRIDAY", "text": "Sale", "type": "DISCOUNT"}
    ]);
    processor
        .process(EntityKind::Product, &doc(document.clone()))
        .await
        .unwrap();

    document["promo"][0]["text"] = json!("Extended sale");
    document["monthlyInstallment"]["installment"] = json!(false);
    processor
        .process(EntityKind::Product, &doc(document))
        .await
        .unwrap();

    let db = target.snapshot().await;
    assert_eq!(db.count("product_monthly_installments"), 1);
    assert_eq!(db.count("product_promos"), 1);

    let installment = db
        .find("product_monthly_installments", "product_id", "p1")
        .unwrap();
    assert_eq!(installment.get("installment_id"), Some(&SqlValue::Int(3)));
    assert_eq!(installment.get("installment"), Some(&SqlValue::Bool(false)));

    let promo = db.find("product_promos", "product_id", "p1").unwrap();
    assert_eq!(
        promo.get("comment"),
        Some(&SqlValue::Text("Extended sale".into()))
    );
    assert_eq!(promo.get("priority"), Some(&SqlValue::Int(1)));
}

#[tokio::test]
async fn test_failed_association_keeps_record() {
    let target = MemoryTarget::new();
    target.fail_statements_containing("INSERT INTO product_categories");
    let processor = processor(&target);

    processor
        .process(
            EntityKind::Product,
            &doc(product("p1", Some("Apple"), &["Electronics"], &["SMART"])),
        )
        .await
        .unwrap();

    let db = target.snapshot().await;
    assert_eq!(db.count("products"), 1);
    assert_eq!(db.count("categories"), 1);
    assert_eq!(db.count("product_categories"), 0);
    assert_eq!(db.count("product_category_codes"), 1);
}

#[tokio::test]
async fn test_failed_write_rolls_back_whole_record() {
    let target = MemoryTarget::new();
    target.fail_statements_containing("INSERT INTO product_promos");
    let processor = processor(&target);

    let mut document = product("p1", Some("Apple"), &["Phones"], &[]);
    document["promo"] = json!([{"priority": 2, "code": "X", "type": "DISCOUNT"}]);

    let result = processor
        .process(EntityKind::Product, &doc(document))
        .await;
    assert!(matches!(
        result,
        Err(SyncError::Target(TargetError::ExecFailed(_)))
    ));

    let db = target.snapshot().await;
    assert_eq!(db.count("products"), 0);
    assert_eq!(db.count("brands"), 0);
    assert_eq!(db.count("categories"), 0);
    assert_eq!(target.rollbacks(), 1);
}

#[tokio::test]
async fn test_rejected_commit_discards_record() {
    let target = MemoryTarget::new();
    target.fail_next_commits(1);
    let processor = processor(&target);

    let result = processor
        .process(EntityKind::Shop, &doc(shop("s1", "Acme")))
        .await;
    assert!(matches!(
        result,
        Err(SyncError::Target(TargetError::CommitFailed(_)))
    ));
    assert_eq!(target.snapshot().await.count("shops"), 0);

    processor
        .process(EntityKind::Shop, &doc(shop("s1", "Acme")))
        .await
        .unwrap();
    assert_eq!(target.snapshot().await.count("shops"), 1);
}

#[tokio::test]
async fn test_malformed_document_never_opens_transaction() {
    let target = MemoryTarget::new();
    let processor = processor(&target);

    let mut document = product("p1", None, &[], &[]);
    document["categoryId"] = json!("abc");

    let result = processor
        .process(EntityKind::Product, &doc(document))
        .await;
    assert!(matches!(result, Err(SyncError::Transform(_))));
    assert_eq!(target.commits(), 0);
    assert_eq!(target.rollbacks(), 0);
    assert!(target.statements().is_empty());
}

#[tokio::test]
async fn test_pass_isolates_bad_records() {
    let harness = Harness::new(MemorySource::new().with_collection(
        "shops",
        vec![
            shop("s1", "Acme"),
            json!({"_id": 42, "name": "Numeric id"}),
            shop("s3", "Globex"),
        ],
    ));
    let mut runner = harness.runner(EntityKind::Shop, "shops");

    let pass = runner.run_pass().await;

    assert!(pass.abort_reason.is_none());
    assert_eq!(pass.total_count, 3);
    assert_eq!(pass.succeeded, 2);
    assert_eq!(pass.failed, 1);

    let counters = harness.metrics.snapshot(EntityKind::Shop);
    assert_eq!(counters.success, 2);
    assert_eq!(counters.failed, 1);

    let db = harness.target.snapshot().await;
    assert_eq!(db.count("shops"), 2);
    assert!(db.find("shops", "id", "s3").is_some());
}

#[tokio::test]
async fn test_unavailable_target_fails_records_not_pass() {
    let harness = Harness::new(
        MemorySource::new().with_collection("shops", vec![shop("s1", "Acme"), shop("s2", "Globex")]),
    );
    harness.target.set_unavailable(true);
    let mut runner = harness.runner(EntityKind::Shop, "shops");

    let pass = runner.run_pass().await;

    assert!(pass.abort_reason.is_none());
    assert_eq!(pass.failed, 2);
    assert_eq!(pass.succeeded, 0);
}

#[tokio::test]
async fn test_pages_cover_collection_exactly_once() {
    let shops = (0..2500)
        .map(|i| shop(&format!("s{i}"), &format!("Shop {i}")))
        .collect();
    let harness = Harness::new(MemorySource::new().with_collection("shops", shops));
    let mut runner = harness.runner(EntityKind::Shop, "shops");

    let pass = runner.run_pass().await;

    assert_eq!(pass.pages, 3);
    assert_eq!(pass.succeeded, 2500);
    assert_eq!(
        harness.source.fetches(),
        vec![
            ("shops".to_string(), 0, 1000),
            ("shops".to_string(), 1000, 1000),
            ("shops".to_string(), 2000, 500),
        ]
    );
    assert_eq!(harness.target.snapshot().await.count("shops"), 2500);
    assert_eq!(harness.metrics.snapshot(EntityKind::Shop).success, 2500);
}

#[tokio::test]
async fn test_empty_collection_completes_without_fetching() {
    let harness = Harness::new(MemorySource::new().with_collection("shops", vec![]));
    let mut runner = harness.runner(EntityKind::Shop, "shops");

    let pass = runner.run_pass().await;

    assert!(pass.abort_reason.is_none());
    assert_eq!(pass.total_count, 0);
    assert_eq!(pass.pages, 0);
    assert!(harness.source.fetches().is_empty());
}

#[tokio::test]
async fn test_repeated_passes_converge() {
    let names: Vec<String> = (0..25).map(|_| CompanyName().fake::<String>()).collect();
    let shops = names
        .iter()
        .enumerate()
        .map(|(i, name)| shop(&format!("s{i}"), name))
        .collect();
    let harness = Harness::new(MemorySource::new().with_collection("shops", shops));

    let report = harness
        .runner(EntityKind::Shop, "shops")
        .with_page_size(10)
        .with_max_passes(Some(3))
        .run()
        .await;

    assert_eq!(report.passes_completed, 3);
    assert_eq!(report.passes_aborted, 0);
    assert_eq!(report.succeeded, 75);
    assert!(!report.interrupted);

    let db = harness.target.snapshot().await;
    assert_eq!(db.count("shops"), 25);
    let row = db.find("shops", "id", "s7").unwrap();
    assert_eq!(row.get("name"), Some(&SqlValue::Text(names[7].clone())));
}

#[tokio::test]
async fn test_later_pass_picks_up_source_changes() {
    let harness = Harness::new(MemorySource::new().with_collection("shops", vec![shop("s1", "Acme")]));
    let mut runner = harness.runner(EntityKind::Shop, "shops");

    runner.run_pass().await;
    harness
        .source
        .set_collection("shops", vec![shop("s1", "Acme Corp"), shop("s2", "Globex")]);
    runner.run_pass().await;

    let db = harness.target.snapshot().await;
    assert_eq!(db.count("shops"), 2);
    assert_eq!(
        db.find("shops", "id", "s1").unwrap().get("name"),
        Some(&SqlValue::Text("Acme Corp".into()))
    );
}

#[tokio::test]
async fn test_fetch_failure_aborts_pass() {
    let shops = (0..5).map(|i| shop(&format!("s{i}"), "Shop")).collect();
    let harness = Harness::new(MemorySource::new().with_collection("shops", shops));
    harness.source.fail_fetch_at(Some(2));
    let mut runner = harness.runner(EntityKind::Shop, "shops").with_page_size(2);

    let pass = runner.run_pass().await;

    assert!(pass.abort_reason.is_some());
    assert_eq!(pass.pages, 1);
    assert_eq!(pass.succeeded, 2);
    assert_eq!(harness.source.fetches().len(), 2);

    harness.source.fail_fetch_at(None);
    let pass = runner.run_pass().await;
    assert!(pass.abort_reason.is_none());
    assert_eq!(pass.succeeded, 5);
}

#[tokio::test]
async fn test_count_failure_aborts_every_pass() {
    let harness = Harness::new(MemorySource::new().with_collection("shops", vec![shop("s1", "Acme")]));
    harness.source.fail_count(true);

    let report = harness
        .runner(EntityKind::Shop, "shops")
        .with_max_passes(Some(2))
        .run()
        .await;

    assert_eq!(report.passes_aborted, 2);
    assert_eq!(report.passes_completed, 0);
    assert!(harness.source.fetches().is_empty());
    assert_eq!(harness.target.snapshot().await.count("shops"), 0);
}

#[tokio::test]
async fn test_unknown_collection_aborts_pass() {
    let harness = Harness::new(MemorySource::new());
    let mut runner = harness.runner(EntityKind::Offer, "offers");

    let pass = runner.run_pass().await;

    let reason = pass.abort_reason.unwrap();
    assert!(reason.contains("not found"), "{reason}");
}

#[tokio::test]
async fn test_metrics_render_per_entity_totals() {
    let harness = Harness::new(
        MemorySource::new()
            .with_collection("offers", vec![offer("o1", 10.0), json!({"name": "no id"})])
            .with_collection("shop_reviews", vec![review("r1", "s1")]),
    );

    harness.runner(EntityKind::Offer, "offers").run_pass().await;
    harness
        .runner(EntityKind::ShopReview, "shop_reviews")
        .run_pass()
        .await;

    let text = harness.metrics.render_prometheus();
    assert!(text.contains("success_processed_offers_total 1\n"));
    assert!(text.contains("failed_processed_offers_total 1\n"));
    assert!(text.contains("success_processed_shop_reviews_total 1\n"));
    assert!(text.contains("failed_processed_products_total 0\n"));
}

#[tokio::test]
async fn test_pass_summary_carries_running_totals() {
    let harness = Harness::new(
        MemorySource::new().with_collection("offers", vec![offer("o1", 10.0), json!({"name": "no id"})]),
    );
    let mut runner = harness.runner(EntityKind::Offer, "offers");

    let first = runner.run_pass().await;
    assert_eq!(first.totals, CounterSnapshot { success: 1, failed: 1 });

    let second = runner.run_pass().await;
    assert_eq!(second.succeeded, 1);
    assert_eq!(second.totals, CounterSnapshot { success: 2, failed: 2 });
    assert_eq!(second.totals, harness.metrics.snapshot(EntityKind::Offer));
}
