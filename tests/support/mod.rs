//! In-memory stores shared by the integration tests
//!
//! `MemorySource` serves documents from vectors. `MemoryTarget` interprets the
//! statement shapes the engine emits against a small table model with unique
//! keys, identity columns, savepoints and PostgreSQL-style aborted
//! transactions.

#![allow(dead_code)]

use async_trait::async_trait;
use catalog_sync::adapters::source::{RawDocument, SourceStore};
use catalog_sync::adapters::target::{TargetStore, TargetTransaction};
use catalog_sync::domain::{Result, SourceError, SqlRow, SqlValue, TargetError};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Mutex as AsyncMutex, OwnedMutexGuard};

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemorySource {
    collections: Mutex<HashMap<String, Vec<RawDocument>>>,
    fetches: Mutex<Vec<(String, u64, u64)>>,
    fail_count: AtomicBool,
    fail_fetch_at: Mutex<Option<u64>>,
    fetch_delay: Mutex<Duration>,
    shutdown_on_fetch: Mutex<Option<watch::Sender<bool>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(self, name: &str, documents: Vec<Value>) -> Self {
        self.set_collection(name, documents);
        self
    }

    pub fn set_collection(&self, name: &str, documents: Vec<Value>) {
        let documents = documents
            .into_iter()
            .map(|d| d.as_object().cloned().expect("document must be an object"))
            .collect();
        self.collections
            .lock()
            .unwrap()
            .insert(name.to_string(), documents);
    }

    pub fn fail_count(&self, fail: bool) {
        self.fail_count.store(fail, Ordering::SeqCst);
    }

    pub fn fail_fetch_at(&self, offset: Option<u64>) {
        *self.fail_fetch_at.lock().unwrap() = offset;
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = delay;
    }

    /// Signal shutdown right after the next page has been served
    pub fn shutdown_after_next_fetch(&self, sender: watch::Sender<bool>) {
        *self.shutdown_on_fetch.lock().unwrap() = Some(sender);
    }

    /// `(collection, offset, limit)` of every fetch, in call order
    pub fn fetches(&self) -> Vec<(String, u64, u64)> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceStore for MemorySource {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        if self.fail_count.load(Ordering::SeqCst) {
            return Err(SourceError::QueryFailed("count timed out".to_string()).into());
        }
        let collections = self.collections.lock().unwrap();
        let documents = collections.get(collection).ok_or_else(|| SourceError::NotFound {
            kind: "collection",
            name: collection.to_string(),
        })?;
        Ok(documents.len() as u64)
    }

    async fn fetch_page(
        &self,
        collection: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<RawDocument>> {
        self.fetches
            .lock()
            .unwrap()
            .push((collection.to_string(), offset, limit));

        let fail_here = *self.fail_fetch_at.lock().unwrap() == Some(offset);
        if fail_here {
            return Err(SourceError::QueryFailed("cursor killed".to_string()).into());
        }

        let delay = *self.fetch_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let page = {
            let collections = self.collections.lock().unwrap();
            let documents = collections.get(collection).ok_or_else(|| SourceError::NotFound {
                kind: "collection",
                name: collection.to_string(),
            })?;
            documents
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect()
        };

        if let Some(sender) = self.shutdown_on_fetch.lock().unwrap().take() {
            let _ = sender.send(true);
        }

        Ok(page)
    }

    fn database_name(&self) -> &str {
        "memory"
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

pub type Row = BTreeMap<String, SqlValue>;

#[derive(Debug, Clone, Default)]
pub struct Database {
    tables: BTreeMap<String, Vec<Row>>,
    next_id: i64,
}

impl Database {
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables.get(table).cloned().unwrap_or_default()
    }

    pub fn count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, Vec::len)
    }

    pub fn find(&self, table: &str, column: &str, value: impl Into<SqlValue>) -> Option<Row> {
        let value = value.into();
        self.tables
            .get(table)?
            .iter()
            .find(|row| row.get(column) == Some(&value))
            .cloned()
    }

    /// Surrogate id of a dimension row
    pub fn dimension_id(&self, table: &str, key_column: &str, key: &str) -> Option<i64> {
        self.find(table, key_column, key)
            .and_then(|row| row.get("id").and_then(SqlValue::as_i64))
    }

    fn select_id(&self, table: &str, column: &str, value: &SqlValue) -> Option<SqlRow> {
        self.tables
            .get(table)?
            .iter()
            .find(|row| row.get(column) == Some(value))
            .map(|row| SqlRow::new(vec![row.get("id").cloned().unwrap_or(SqlValue::Null)]))
    }

    fn insert(&mut self, table: &str, mut row: Row, conflict: &Conflict) -> Result<u64> {
        let key = unique_key(table);
        let rows = self.tables.entry(table.to_string()).or_default();

        if let Some(existing) = rows
            .iter_mut()
            .find(|r| key.iter().all(|k| r.get(*k) == row.get(*k)))
        {
            return match conflict {
                Conflict::Error => Err(TargetError::ExecFailed(format!(
                    "duplicate key value violates unique constraint on {table}"
                ))
                .into()),
                Conflict::Ignore => Ok(0),
                Conflict::Update(columns) => {
                    for column in columns {
                        let value = row.get(column).cloned().unwrap_or(SqlValue::Null);
                        existing.insert(column.clone(), value);
                    }
                    Ok(1)
                }
            };
        }

        if has_identity(table) {
            self.next_id += 1;
            row.insert("id".to_string(), SqlValue::Int(self.next_id));
        }
        self.tables.entry(table.to_string()).or_default().push(row);
        Ok(1)
    }

    fn update(&mut self, table: &str, assignments: &[(String, SqlValue)], key: &SqlValue) -> u64 {
        let mut affected = 0;
        if let Some(rows) = self.tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| r.get("id") == Some(key)) {
                for (column, value) in assignments {
                    row.insert(column.clone(), value.clone());
                }
                affected += 1;
            }
        }
        affected
    }
}

fn unique_key(table: &str) -> &'static [&'static str] {
    match table {
        "brands" | "categories" => &["name"],
        "category_codes" => &["code"],
        "product_categories" => &["product_id", "category_id"],
        "product_category_codes" => &["product_id", "category_code_id"],
        "product_monthly_installments" => &["product_id", "installment_id"],
        "product_promos" => &["product_id", "code"],
        _ => &["id"],
    }
}

fn has_identity(table: &str) -> bool {
    matches!(table, "brands" | "categories" | "category_codes")
}

#[derive(Debug)]
enum Conflict {
    Error,
    Ignore,
    Update(Vec<String>),
}

#[derive(Debug)]
enum Statement {
    Select { table: String, column: String },
    Insert { table: String, columns: Vec<String>, conflict: Conflict },
    Update { table: String, columns: Vec<String>, key_param: usize },
    Savepoint,
    RollbackToSavepoint,
    ReleaseSavepoint,
}

fn parse(statement: &str) -> Option<Statement> {
    if statement.starts_with("SAVEPOINT ") {
        return Some(Statement::Savepoint);
    }
    if statement.starts_with("ROLLBACK TO SAVEPOINT ") {
        return Some(Statement::RollbackToSavepoint);
    }
    if statement.starts_with("RELEASE SAVEPOINT ") {
        return Some(Statement::ReleaseSavepoint);
    }

    if let Some(rest) = statement.strip_prefix("SELECT id FROM ") {
        let words: Vec<&str> = rest.split_whitespace().collect();
        if let [table, "WHERE", column, "=", "$1"] = words.as_slice() {
            return Some(Statement::Select {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        return None;
    }

    if let Some(rest) = statement.strip_prefix("INSERT INTO ") {
        let (table, rest) = rest.split_once(' ')?;
        let open = rest.find('(')?;
        let close = rest.find(')')?;
        let columns = split_list(&rest[open + 1..close]);

        let conflict = if rest.contains("DO NOTHING") {
            Conflict::Ignore
        } else if let Some((_, set)) = rest.split_once("DO UPDATE SET ") {
            Conflict::Update(
                set.split(", ")
                    .filter_map(|a| a.split_once(" = ").map(|(c, _)| c.trim().to_string()))
                    .collect(),
            )
        } else {
            Conflict::Error
        };

        return Some(Statement::Insert {
            table: table.to_string(),
            columns,
            conflict,
        });
    }

    if let Some(rest) = statement.strip_prefix("UPDATE ") {
        let (table, rest) = rest.split_once(" SET ")?;
        let (set, condition) = rest.rsplit_once(" WHERE ")?;
        let columns = set
            .split(", ")
            .filter_map(|a| a.split_once(" = ").map(|(c, _)| c.to_string()))
            .collect();
        let key_param = condition.strip_prefix("id = $")?.trim().parse().ok()?;
        return Some(Statement::Update {
            table: table.to_string(),
            columns,
            key_param,
        });
    }

    None
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|c| c.trim().to_string()).collect()
}

#[derive(Default)]
struct Faults {
    unavailable: AtomicBool,
    failing_statements: Mutex<Vec<String>>,
    failing_commits: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    statements: Mutex<Vec<String>>,
    begin_delay: Mutex<Duration>,
    shutdown_on_commit: Mutex<Option<(usize, watch::Sender<bool>)>>,
}

/// Relational target kept in memory
///
/// Transactions are serialized: `begin` holds the database lock until the
/// transaction commits or rolls back.
#[derive(Clone, Default)]
pub struct MemoryTarget {
    db: Arc<AsyncMutex<Database>>,
    faults: Arc<Faults>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed state
    pub async fn snapshot(&self) -> Database {
        self.db.lock().await.clone()
    }

    /// Every statement containing `fragment` fails
    pub fn fail_statements_containing(&self, fragment: &str) {
        self.faults
            .failing_statements
            .lock()
            .unwrap()
            .push(fragment.to_string());
    }

    pub fn clear_statement_failures(&self) {
        self.faults.failing_statements.lock().unwrap().clear();
    }

    /// The next `n` commits are rejected
    pub fn fail_next_commits(&self, n: usize) {
        self.faults.failing_commits.store(n, Ordering::SeqCst);
    }

    /// Every `begin` waits this long before taking the database lock
    pub fn set_begin_delay(&self, delay: Duration) {
        *self.faults.begin_delay.lock().unwrap() = delay;
    }

    /// Signal shutdown as soon as `commits` transactions have committed
    pub fn shutdown_after_commits(&self, commits: usize, sender: watch::Sender<bool>) {
        *self.faults.shutdown_on_commit.lock().unwrap() = Some((commits, sender));
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn commits(&self) -> usize {
        self.faults.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.faults.rollbacks.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> Vec<String> {
        self.faults.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl TargetStore for MemoryTarget {
    async fn ping(&self) -> Result<()> {
        if self.faults.unavailable.load(Ordering::SeqCst) {
            return Err(TargetError::ConnectionFailed("connection refused".to_string()).into());
        }
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn TargetTransaction>> {
        if self.faults.unavailable.load(Ordering::SeqCst) {
            return Err(TargetError::ConnectionFailed("connection refused".to_string()).into());
        }
        let delay = *self.faults.begin_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let guard = self.db.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            working,
            savepoint: None,
            aborted: false,
            faults: self.faults.clone(),
        }))
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<Database>,
    working: Database,
    savepoint: Option<Database>,
    aborted: bool,
    faults: Arc<Faults>,
}

impl MemoryTransaction {
    fn run(&mut self, statement: &str, params: &[SqlValue]) -> std::result::Result<Outcome, String> {
        self.faults
            .statements
            .lock()
            .unwrap()
            .push(statement.to_string());

        let parsed = parse(statement).ok_or_else(|| format!("unsupported statement: {statement}"))?;

        if let Statement::RollbackToSavepoint = parsed {
            let saved = self
                .savepoint
                .clone()
                .ok_or_else(|| "savepoint does not exist".to_string())?;
            self.working = saved;
            self.aborted = false;
            return Ok(Outcome::Affected(0));
        }

        if self.aborted {
            return Err("current transaction is aborted".to_string());
        }

        let injected = self
            .faults
            .failing_statements
            .lock()
            .unwrap()
            .iter()
            .any(|fragment| statement.contains(fragment.as_str()));
        if injected {
            self.aborted = true;
            return Err(format!("injected failure: {statement}"));
        }

        let result = self.apply(parsed, params);
        if result.is_err() {
            self.aborted = true;
        }
        result
    }

    fn apply(&mut self, parsed: Statement, params: &[SqlValue]) -> std::result::Result<Outcome, String> {
        match parsed {
            Statement::Savepoint => {
                self.savepoint = Some(self.working.clone());
                Ok(Outcome::Affected(0))
            }
            Statement::ReleaseSavepoint => {
                self.savepoint = None;
                Ok(Outcome::Affected(0))
            }
            Statement::RollbackToSavepoint => Ok(Outcome::Affected(0)),
            Statement::Select { table, column } => {
                let value = params.first().ok_or("missing parameter $1")?;
                Ok(Outcome::Row(self.working.select_id(&table, &column, value)))
            }
            Statement::Insert {
                table,
                columns,
                conflict,
            } => {
                if columns.len() != params.len() {
                    return Err(format!(
                        "{} columns but {} parameters",
                        columns.len(),
                        params.len()
                    ));
                }
                let row = columns.into_iter().zip(params.iter().cloned()).collect();
                self.working
                    .insert(&table, row, &conflict)
                    .map(Outcome::Affected)
                    .map_err(|e| e.to_string())
            }
            Statement::Update {
                table,
                columns,
                key_param,
            } => {
                let key = params
                    .get(key_param - 1)
                    .ok_or_else(|| format!("missing parameter ${key_param}"))?;
                let assignments: Vec<_> = columns.into_iter().zip(params.iter().cloned()).collect();
                Ok(Outcome::Affected(self.working.update(&table, &assignments, key)))
            }
        }
    }
}

enum Outcome {
    Row(Option<SqlRow>),
    Affected(u64),
}

#[async_trait]
impl TargetTransaction for MemoryTransaction {
    async fn query_row(&mut self, statement: &str, params: &[SqlValue]) -> Result<Option<SqlRow>> {
        match self.run(statement, params) {
            Ok(Outcome::Row(row)) => Ok(row),
            Ok(Outcome::Affected(_)) => Ok(None),
            Err(e) => Err(TargetError::QueryFailed(e).into()),
        }
    }

    async fn exec(&mut self, statement: &str, params: &[SqlValue]) -> Result<u64> {
        match self.run(statement, params) {
            Ok(Outcome::Affected(n)) => Ok(n),
            Ok(Outcome::Row(row)) => Ok(u64::from(row.is_some())),
            Err(e) => Err(TargetError::ExecFailed(e).into()),
        }
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        if self.aborted {
            self.faults.rollbacks.fetch_add(1, Ordering::SeqCst);
            return Err(TargetError::CommitFailed("transaction was aborted".to_string()).into());
        }

        let rejected = self
            .faults
            .failing_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rejected {
            self.faults.rollbacks.fetch_add(1, Ordering::SeqCst);
            return Err(TargetError::CommitFailed("serialization failure".to_string()).into());
        }

        let working = std::mem::take(&mut self.working);
        *self.guard = working;
        let committed = self.faults.commits.fetch_add(1, Ordering::SeqCst) + 1;

        let mut shutdown = self.faults.shutdown_on_commit.lock().unwrap();
        if shutdown.as_ref().is_some_and(|(after, _)| committed >= *after) {
            if let Some((_, sender)) = shutdown.take() {
                let _ = sender.send(true);
            }
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.faults.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

pub fn shop(id: &str, name: &str) -> Value {
    json!({ "_id": id, "name": name })
}

pub fn offer(id: &str, price: f64) -> Value {
    json!({
        "_id": id,
        "masterSku": "p-1",
        "masterCategory": "Smartphones",
        "merchantId": "s1",
        "kaspiDelivery": true,
        "merchantRating": 4.8,
        "merchantReviewsQuantity": 120,
        "price": price,
    })
}

pub fn review(id: &str, shop_id: &str) -> Value {
    json!({
        "_id": id,
        "merchant_id": shop_id,
        "rating": 5,
        "author": "Aigerim",
        "comment": { "text": "Fast delivery" },
        "date": "2024-02-11T10:00:00Z",
    })
}

pub fn product(id: &str, brand: Option<&str>, categories: &[&str], codes: &[&str]) -> Value {
    json!({
        "_id": id,
        "brand": brand,
        "category": categories,
        "categoryCodes": codes,
        "categoryId": "1234",
        "currency": "KZT",
        "title": "Smartphone X 128GB",
        "unitPrice": 199990.0,
        "rating": 4.7,
        "reviewsQuantity": 321,
    })
}
