//! Order Repository
//!
//! Persistence for orders. All mutations flow through the lifecycle
//! engine; this layer only reads and writes documents.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult};
use shared::models::Order;

const SELECT_ORDER: &str = "SELECT *, <string>id AS id FROM order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn key_of(id: &str) -> String {
        id.strip_prefix("order:").unwrap_or(id).to_string()
    }

    /// Find all orders, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(format!("{SELECT_ORDER} ORDER BY created_at DESC"))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let key = Self::key_of(id);
        let orders: Vec<Order> = self
            .base
            .db()
            .query(format!("{SELECT_ORDER} WHERE id = type::thing('order', $key)"))
            .bind(("key", key))
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Persist a freshly assembled order
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let key = Uuid::new_v4().simple().to_string();
        self.base
            .db()
            .query("CREATE type::thing('order', $key) CONTENT $data RETURN NONE")
            .bind(("key", key.clone()))
            .bind(("data", order))
            .await?
            .check()?;

        self.find_by_id(&key)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Persist the full state of an existing order
    ///
    /// The lifecycle engine mutates a copy in memory (merge sub-records,
    /// append timeline events) and saves it back whole. Existing
    /// timeline entries are never rewritten by the engine; the hash
    /// chain makes tampering detectable.
    pub async fn save(&self, order: &Order) -> RepoResult<Order> {
        let id = order
            .id
            .as_deref()
            .ok_or_else(|| RepoError::Validation("order id is required for save".into()))?;
        let key = Self::key_of(id);

        let mut data = order.clone();
        data.id = None; // record id is the address, not content

        self.base
            .db()
            .query("UPDATE type::thing('order', $key) CONTENT $data RETURN NONE")
            .bind(("key", key.clone()))
            .bind(("data", data))
            .await?
            .check()?;

        self.find_by_id(&key)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Whether any order references the product
    ///
    /// Used to reject product deletion while history depends on it.
    pub async fn references_product(&self, product_id: &str) -> RepoResult<bool> {
        #[derive(serde::Deserialize)]
        struct Row {
            count: i64,
        }

        let product_id = product_id.to_string();
        let rows: Vec<Row> = self
            .base
            .db()
            .query(
                "SELECT count() AS count FROM order \
                 WHERE $product_id IN items[*].product_id GROUP ALL",
            )
            .bind(("product_id", product_id))
            .await?
            .take(0)?;

        Ok(rows.first().map(|r| r.count > 0).unwrap_or(false))
    }
}
