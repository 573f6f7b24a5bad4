//! Category Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult};
use crate::catalog;
use shared::models::{Category, CategoryCreate, CategoryUpdate};

const SELECT_CATEGORY: &str = "SELECT *, <string>id AS id FROM category";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn key_of(id: &str) -> String {
        id.strip_prefix("category:").unwrap_or(id).to_string()
    }

    /// Find all active categories
    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query(format!(
                "{SELECT_CATEGORY} WHERE is_active = true ORDER BY sort_order"
            ))
            .await?
            .take(0)?;
        Ok(categories)
    }

    /// Find category by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Category>> {
        let key = Self::key_of(id);
        let categories: Vec<Category> = self
            .base
            .db()
            .query(format!("{SELECT_CATEGORY} WHERE id = type::thing('category', $key)"))
            .bind(("key", key))
            .await?
            .take(0)?;
        Ok(categories.into_iter().next())
    }

    /// Create a new category
    ///
    /// A sibling with the same name under the same parent is a
    /// conflict, as is a duplicate slug anywhere.
    pub async fn create(&self, data: CategoryCreate) -> RepoResult<Category> {
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation("name is required".into()));
        }

        let slug = data
            .slug
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| catalog::slugify(&data.name));

        self.ensure_unique_sibling(&data.name, data.parent.as_deref(), None)
            .await?;
        self.ensure_unique_slug(&slug, None).await?;

        let category = Category {
            id: None,
            name: data.name,
            slug,
            parent: data.parent,
            image: data.image,
            sort_order: data.sort_order.unwrap_or(0),
            is_active: true,
        };

        let key = Uuid::new_v4().simple().to_string();
        self.base
            .db()
            .query("CREATE type::thing('category', $key) CONTENT $data RETURN NONE")
            .bind(("key", key.clone()))
            .bind(("data", category))
            .await?
            .check()?;

        self.find_by_id(&key)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }

    /// Update a category
    pub async fn update(&self, id: &str, data: CategoryUpdate) -> RepoResult<Category> {
        let key = Self::key_of(id);

        let existing = self
            .find_by_id(&key)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Category {} not found", id)))?;

        if data.name.is_some() || data.parent.is_some() {
            let name = data.name.as_deref().unwrap_or(&existing.name);
            let parent = data.parent.as_deref().or(existing.parent.as_deref());
            self.ensure_unique_sibling(name, parent, Some(&key)).await?;
        }
        if let Some(ref slug) = data.slug {
            self.ensure_unique_slug(slug, Some(&key)).await?;
        }

        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() { set_parts.push("name = $name"); }
        if data.slug.is_some() { set_parts.push("slug = $slug"); }
        if data.parent.is_some() { set_parts.push("parent = $parent"); }
        if data.image.is_some() { set_parts.push("image = $image"); }
        if data.sort_order.is_some() { set_parts.push("sort_order = $sort_order"); }
        if data.is_active.is_some() { set_parts.push("is_active = $is_active"); }

        if set_parts.is_empty() {
            return Ok(existing);
        }

        let query_str = format!(
            "UPDATE type::thing('category', $key) SET {} RETURN NONE",
            set_parts.join(", ")
        );
        let mut query = self.base.db().query(query_str).bind(("key", key.clone()));

        if let Some(v) = data.name { query = query.bind(("name", v)); }
        if let Some(v) = data.slug { query = query.bind(("slug", v)); }
        if let Some(v) = data.parent { query = query.bind(("parent", v)); }
        if let Some(v) = data.image { query = query.bind(("image", v)); }
        if let Some(v) = data.sort_order { query = query.bind(("sort_order", v)); }
        if let Some(v) = data.is_active { query = query.bind(("is_active", v)); }

        query.await?.check()?;

        self.find_by_id(&key)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Category {} not found", id)))
    }

    /// Hard delete a category
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let existing = self.find_by_id(id).await?;
        if existing.is_none() {
            return Err(RepoError::NotFound(format!("Category {} not found", id)));
        }
        let key = Self::key_of(id);
        self.base
            .db()
            .query("DELETE type::thing('category', $key)")
            .bind(("key", key))
            .await?
            .check()?;
        Ok(())
    }

    async fn ensure_unique_sibling(
        &self,
        name: &str,
        parent: Option<&str>,
        exclude_key: Option<&str>,
    ) -> RepoResult<()> {
        #[derive(serde::Deserialize)]
        struct Row {
            id: String,
        }

        let mut query = self.base.db().query(
            "SELECT <string>id AS id FROM category \
             WHERE name = $name AND (parent = $parent OR (parent IS NONE AND $parent IS NONE))",
        );
        query = query
            .bind(("name", name.to_string()))
            .bind(("parent", parent.map(|p| p.to_string())));

        let rows: Vec<Row> = query.await?.take(0)?;
        let exclude = exclude_key.map(|k| format!("category:{k}"));
        if rows.iter().any(|r| exclude.as_deref() != Some(r.id.as_str())) {
            return Err(RepoError::Duplicate(format!(
                "Category {} under the same parent",
                name
            )));
        }
        Ok(())
    }

    async fn ensure_unique_slug(&self, slug: &str, exclude_key: Option<&str>) -> RepoResult<()> {
        #[derive(serde::Deserialize)]
        struct Row {
            id: String,
        }

        let rows: Vec<Row> = self
            .base
            .db()
            .query("SELECT <string>id AS id FROM category WHERE slug = $slug")
            .bind(("slug", slug.to_string()))
            .await?
            .take(0)?;

        let exclude = exclude_key.map(|k| format!("category:{k}"));
        if rows.iter().any(|r| exclude.as_deref() != Some(r.id.as_str())) {
            return Err(RepoError::Duplicate(format!("slug {}", slug)));
        }
        Ok(())
    }
}
