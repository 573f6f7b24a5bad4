//! Database Module
//!
//! Embedded SurrealDB storage. `DbService::new` opens the datastore and
//! applies the schema definitions the repositories rely on.

pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "reef";
const DATABASE: &str = "store";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk datastore
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::Database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database ready (SurrealDB embedded, path={db_path})");

        Ok(Self { db })
    }

    /// In-memory datastore, used by the test suites
    pub async fn memory() -> Result<Self, AppError> {
        use surrealdb::engine::local::Mem;

        let db: Surreal<Db> = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {e}")))?;
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::Database(format!("Failed to select namespace: {e}")))?;
        define_schema(&db).await?;
        Ok(Self { db })
    }
}

/// Uniqueness constraints live in the database, not in application
/// logic: duplicate SKU / slug / order number / username writes fail at
/// the index even when a racing request slips past the pre-checks.
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS product_sku ON product FIELDS sku UNIQUE;
        DEFINE INDEX IF NOT EXISTS product_slug ON product FIELDS slug UNIQUE;
        DEFINE INDEX IF NOT EXISTS category_slug ON category FIELDS slug UNIQUE;
        DEFINE INDEX IF NOT EXISTS order_number ON order FIELDS order_number UNIQUE;
        DEFINE INDEX IF NOT EXISTS user_username ON user FIELDS username UNIQUE;
        "#,
    )
    .await
    .map_err(|e| AppError::Database(format!("Failed to define schema: {e}")))?;
    Ok(())
}
