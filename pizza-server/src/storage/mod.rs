//! redb-based storage for offers and orders
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `offers` | `code` (uppercase) | `Offer` (JSON) | Coupon definitions + usage counters |
//! | `orders` | `order_id` | `Order` (JSON) | Order records |
//! | `user_orders` | `user_id` | `order_id` (multimap) | Orders per user |
//! | `counters` | name | `u64` | Aggregate counters |
//!
//! # Concurrency
//!
//! redb allows a single write transaction at a time. Every read-modify-write
//! below (coupon redemption + order insert, stage updates, offer edits) runs
//! inside one write transaction, so concurrent requests are serialized and
//! cannot lose updates or over-redeem a coupon.

use redb::{
    Database, MultimapTableDefinition, ReadableDatabase, ReadableMultimapTable, ReadableTable,
    TableDefinition, WriteTransaction,
};
use shared::models::{Offer, Order};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::offers::OfferLookup;

/// key = offer code, value = JSON-serialized Offer
const OFFERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("offers");

/// key = order id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// key = user id, values = order ids
const USER_ORDERS_TABLE: MultimapTableDefinition<&str, &str> =
    MultimapTableDefinition::new("user_orders");

const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const ORDER_COUNT_KEY: &str = "order_count";
const REDEMPTION_COUNT_KEY: &str = "redemption_count";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Offer not found: {0}")]
    OfferNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Aggregate counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub order_count: u64,
    pub redemption_count: u64,
}

/// Offer and order storage backed by redb
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(OFFERS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_multimap_table(USER_ORDERS_TABLE)?;
            let _ = write_txn.open_table(COUNTERS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    // ========== Offers ==========

    pub fn get_offer(&self, code: &str) -> StorageResult<Option<Offer>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(OFFERS_TABLE)?;
        match table.get(code)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All offers, sorted by code
    pub fn list_offers(&self) -> StorageResult<Vec<Offer>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(OFFERS_TABLE)?;
        let mut offers = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            offers.push(serde_json::from_slice::<Offer>(value.value())?);
        }
        Ok(offers)
    }

    /// Insert an offer unless its code is taken. Returns `false` on conflict.
    pub fn insert_offer(&self, offer: &Offer) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        if read_offer(&txn, &offer.code)?.is_some() {
            return Ok(false);
        }
        write_offer(&txn, offer)?;
        txn.commit()?;
        Ok(true)
    }

    /// Read-modify-write one offer inside a single write transaction
    ///
    /// Nothing is written when `f` fails.
    pub fn update_offer<E, F>(&self, code: &str, f: F) -> Result<Offer, E>
    where
        E: From<StorageError>,
        F: FnOnce(&mut Offer) -> Result<(), E>,
    {
        let txn = self.db.begin_write().map_err(StorageError::from)?;
        let mut offer = read_offer(&txn, code)?
            .ok_or_else(|| StorageError::OfferNotFound(code.to_string()))?;
        f(&mut offer)?;
        write_offer(&txn, &offer)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(offer)
    }

    // ========== Orders ==========

    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All orders, newest first
    pub fn list_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            orders.push(serde_json::from_slice::<Order>(value.value())?);
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Orders placed by one user, newest first
    pub fn list_orders_by_user(&self, user_id: &str) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_multimap_table(USER_ORDERS_TABLE)?;
        let orders_table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for id in index.get(user_id)? {
            let id = id?;
            if let Some(value) = orders_table.get(id.value())? {
                orders.push(serde_json::from_slice::<Order>(value.value())?);
            }
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Insert a new order, running `build` inside the same write transaction
    ///
    /// `build` sees the transaction through [`StoreTxn`] (so it can validate a
    /// coupon against current counters) and returns the order together with
    /// the redeemed offer, if any. The offer, the order, the user index and
    /// the counters are committed together; when `build` fails nothing is
    /// written.
    pub fn create_order_with_offer<E, F>(&self, build: F) -> Result<Order, E>
    where
        E: From<StorageError>,
        F: FnOnce(&StoreTxn<'_>) -> Result<(Order, Option<Offer>), E>,
    {
        let txn = self.db.begin_write().map_err(StorageError::from)?;
        let (order, redeemed) = build(&StoreTxn { txn: &txn })?;

        if let Some(offer) = &redeemed {
            write_offer(&txn, offer)?;
            bump_counter(&txn, REDEMPTION_COUNT_KEY)?;
        }
        insert_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        Ok(order)
    }

    /// Read-modify-write one order inside a single write transaction
    ///
    /// Nothing is written when `f` fails.
    pub fn update_order<E, F>(&self, order_id: &str, f: F) -> Result<Order, E>
    where
        E: From<StorageError>,
        F: FnOnce(&mut Order) -> Result<(), E>,
    {
        let txn = self.db.begin_write().map_err(StorageError::from)?;
        let mut order = read_order(&txn, order_id)?
            .ok_or_else(|| StorageError::OrderNotFound(order_id.to_string()))?;
        f(&mut order)?;
        write_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(order)
    }

    // ========== Counters ==========

    pub fn stats(&self) -> StorageResult<StoreStats> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COUNTERS_TABLE)?;
        let get = |key: &str| -> StorageResult<u64> {
            Ok(table.get(key)?.map(|g| g.value()).unwrap_or(0))
        };
        Ok(StoreStats {
            order_count: get(ORDER_COUNT_KEY)?,
            redemption_count: get(REDEMPTION_COUNT_KEY)?,
        })
    }
}

impl OfferLookup for Store {
    fn find_active_offer_by_code(&self, code: &str) -> StorageResult<Option<Offer>> {
        Ok(self.get_offer(code)?.filter(|o| o.active))
    }

    fn count_orders_by_user(&self, user_id: &str) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_multimap_table(USER_ORDERS_TABLE)?;
        count_values(index.get(user_id)?)
    }
}

/// Read view of an open write transaction
pub struct StoreTxn<'a> {
    txn: &'a WriteTransaction,
}

impl OfferLookup for StoreTxn<'_> {
    fn find_active_offer_by_code(&self, code: &str) -> StorageResult<Option<Offer>> {
        Ok(read_offer(self.txn, code)?.filter(|o| o.active))
    }

    fn count_orders_by_user(&self, user_id: &str) -> StorageResult<u64> {
        let index = self.txn.open_multimap_table(USER_ORDERS_TABLE)?;
        count_values(index.get(user_id)?)
    }
}

fn count_values<V: redb::Key + 'static>(
    values: redb::MultimapValue<'_, V>,
) -> StorageResult<u64> {
    let mut count = 0;
    for value in values {
        value?;
        count += 1;
    }
    Ok(count)
}

// ========== Transaction helpers ==========

fn read_offer(txn: &WriteTransaction, code: &str) -> StorageResult<Option<Offer>> {
    let table = txn.open_table(OFFERS_TABLE)?;
    match table.get(code)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

fn write_offer(txn: &WriteTransaction, offer: &Offer) -> StorageResult<()> {
    let bytes = serde_json::to_vec(offer)?;
    let mut table = txn.open_table(OFFERS_TABLE)?;
    table.insert(offer.code.as_str(), bytes.as_slice())?;
    Ok(())
}

fn read_order(txn: &WriteTransaction, order_id: &str) -> StorageResult<Option<Order>> {
    let table = txn.open_table(ORDERS_TABLE)?;
    match table.get(order_id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

fn write_order(txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
    let bytes = serde_json::to_vec(order)?;
    let mut table = txn.open_table(ORDERS_TABLE)?;
    table.insert(order.id.as_str(), bytes.as_slice())?;
    Ok(())
}

fn insert_order(txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
    write_order(txn, order)?;
    if let Some(user_id) = &order.user_id {
        let mut index = txn.open_multimap_table(USER_ORDERS_TABLE)?;
        index.insert(user_id.as_str(), order.id.as_str())?;
    }
    bump_counter(txn, ORDER_COUNT_KEY)
}

fn bump_counter(txn: &WriteTransaction, key: &str) -> StorageResult<()> {
    let mut table = txn.open_table(COUNTERS_TABLE)?;
    let current = table.get(key)?.map(|g| g.value()).unwrap_or(0);
    table.insert(key, current + 1)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use shared::models::{CustomerInfo, OfferType, Stage, StatusEntry};

    fn offer(code: &str) -> Offer {
        let now = Utc::now();
        Offer {
            code: code.to_string(),
            offer_type: OfferType::Fixed,
            value: 100.0,
            min_order_amount: None,
            max_discount: None,
            valid_from: None,
            valid_to: None,
            usage_limit_total: Some(5),
            usage_limit_per_user: 1,
            used_count: 0,
            user_usage: vec![],
            active: true,
            first_order_only: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn order(id: &str, user_id: Option<&str>, age_minutes: i64) -> Order {
        let created_at = Utc::now() - Duration::minutes(age_minutes);
        Order {
            id: id.to_string(),
            user_id: user_id.map(str::to_string),
            customer: CustomerInfo::default(),
            items: vec![],
            subtotal: 1000.0,
            discount: 0.0,
            total: 1000.0,
            current_stage: Stage::Placed,
            status: Stage::Placed.name().to_string(),
            status_history: vec![StatusEntry::new(Stage::Placed, created_at)],
            applied_offer: None,
            created_at,
            estimated_delivery_time: created_at + Duration::minutes(45),
            actual_delivery_time: None,
            cancelled_at: None,
        }
    }

    #[test]
    fn test_offer_insert_get_and_conflict() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.insert_offer(&offer("SAVE")).unwrap());
        assert!(!store.insert_offer(&offer("SAVE")).unwrap());
        assert_eq!(store.get_offer("SAVE").unwrap().unwrap().value, 100.0);
        assert!(store.get_offer("save").unwrap().is_none());
    }

    #[test]
    fn test_find_active_skips_inactive() {
        let store = Store::open_in_memory().unwrap();
        let mut o = offer("OLD");
        o.active = false;
        store.insert_offer(&o).unwrap();
        assert!(store.find_active_offer_by_code("OLD").unwrap().is_none());
        assert_eq!(store.list_offers().unwrap().len(), 1);
    }

    #[test]
    fn test_update_offer_failure_writes_nothing() {
        let store = Store::open_in_memory().unwrap();
        store.insert_offer(&offer("SAVE")).unwrap();

        let result: Result<Offer, StorageError> = store.update_offer("SAVE", |o| {
            o.value = 1.0;
            Err(StorageError::OfferNotFound("forced".into()))
        });
        assert!(result.is_err());
        assert_eq!(store.get_offer("SAVE").unwrap().unwrap().value, 100.0);

        let missing: Result<Offer, StorageError> = store.update_offer("NOPE", |_| Ok(()));
        assert!(matches!(missing, Err(StorageError::OfferNotFound(_))));
    }

    #[test]
    fn test_create_order_indexes_user_and_counts() {
        let store = Store::open_in_memory().unwrap();
        for (id, user, age) in [("a", Some("u1"), 30), ("b", Some("u1"), 10), ("c", None, 5)] {
            store
                .create_order_with_offer(|_| Ok::<_, StorageError>((order(id, user, age), None)))
                .unwrap();
        }

        let mine = store.list_orders_by_user("u1").unwrap();
        assert_eq!(
            mine.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec!["b", "a"]
        );
        assert_eq!(store.count_orders_by_user("u1").unwrap(), 2);
        assert_eq!(store.count_orders_by_user("nobody").unwrap(), 0);
        assert_eq!(store.list_orders().unwrap().len(), 3);
        assert_eq!(store.stats().unwrap().order_count, 3);
    }

    #[test]
    fn test_create_order_with_offer_commits_both() {
        let store = Store::open_in_memory().unwrap();
        store.insert_offer(&offer("SAVE")).unwrap();

        store
            .create_order_with_offer(|txn| {
                let mut o = txn
                    .find_active_offer_by_code("SAVE")?
                    .expect("offer visible inside txn");
                o.record_usage(Some("u1"));
                Ok::<_, StorageError>((order("x", Some("u1"), 0), Some(o)))
            })
            .unwrap();

        let saved = store.get_offer("SAVE").unwrap().unwrap();
        assert_eq!(saved.used_count, 1);
        assert_eq!(saved.usage_for("u1"), 1);
        assert!(store.get_order("x").unwrap().is_some());
        assert_eq!(store.stats().unwrap().redemption_count, 1);
    }

    #[test]
    fn test_create_order_aborts_on_build_error() {
        let store = Store::open_in_memory().unwrap();
        let result = store.create_order_with_offer(|_| {
            Err::<(Order, Option<Offer>), _>(StorageError::OfferNotFound("X".into()))
        });
        assert!(result.is_err());
        assert!(store.list_orders().unwrap().is_empty());
        assert_eq!(store.stats().unwrap(), StoreStats::default());
    }

    #[test]
    fn test_update_order_missing() {
        let store = Store::open_in_memory().unwrap();
        let result: Result<Order, StorageError> = store.update_order("ghost", |_| Ok(()));
        assert!(matches!(result, Err(StorageError::OrderNotFound(_))));
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pizza.redb");
        {
            let store = Store::open(&path).unwrap();
            store.insert_offer(&offer("KEEP")).unwrap();
        }
        let reopened = Store::open(&path).unwrap();
        assert!(reopened.get_offer("KEEP").unwrap().is_some());
    }
}
