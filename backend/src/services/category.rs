//! Category service

use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::repository::{PgRepository, Repository};
use shared::access::Identity;
use shared::models::{Category, CategoryDraft, CategoryInput};
use shared::validation::validate_name;

/// Category management
#[derive(Clone)]
pub struct CategoryService {
    categories: PgRepository<Category>,
}

impl CategoryService {
    pub fn new(db: PgPool) -> Self {
        Self {
            categories: PgRepository::new(db),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Category>> {
        self.categories.get_all(None).await
    }

    pub async fn get(&self, id: i64) -> AppResult<Category> {
        self.categories.require(id).await
    }

    /// Create a category; the name must not be in use
    pub async fn create(&self, identity: &Identity, input: CategoryInput) -> AppResult<Category> {
        input.validate()?;
        let name = checked_name(&input.name)?;
        if self.categories.name_taken(&name, None).await? {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let category = self
            .categories
            .add(&CategoryDraft {
                name,
                created_by: identity.name.clone(),
                created_date: Utc::now(),
            })
            .await?;

        tracing::info!("Category {} created by {}", category.name, identity.name);
        Ok(category)
    }

    /// Rename a category; the new name must not belong to another one
    pub async fn update(&self, id: i64, input: CategoryInput) -> AppResult<Category> {
        let current = self.categories.require(id).await?;
        input.validate()?;
        let name = checked_name(&input.name)?;
        if self.categories.name_taken(&name, Some(id)).await? {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        self.categories
            .update(
                id,
                &CategoryDraft {
                    name,
                    created_by: current.created_by,
                    created_date: current.created_date,
                },
            )
            .await
    }

    /// Delete a category; its products are left uncategorized
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.categories.delete(id).await?;
        tracing::info!("Category {} deleted", id);
        Ok(())
    }
}

fn checked_name(name: &str) -> AppResult<String> {
    validate_name(name).map_err(|message| AppError::validation("name", message))?;
    Ok(name.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_duplicate_name_rejected_without_insert() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new().connect(&url).await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let service = CategoryService::new(pool.clone());
        let admin = Identity {
            user_id: Uuid::new_v4(),
            name: "admin".to_string(),
            roles: vec![],
        };
        let name = format!("Tools {}", Uuid::new_v4());

        service
            .create(&admin, CategoryInput { name: name.clone() })
            .await
            .unwrap();
        let err = service
            .create(&admin, CategoryInput { name: name.clone() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEntry(ref field) if field == "name"));

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE name = $1")
            .bind(&name)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_checked_name_trims() {
        assert_eq!(checked_name("  Tools ").unwrap(), "Tools");
        assert!(checked_name("   ").is_err());
    }
}
