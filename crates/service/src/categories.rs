use models::category;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use tracing::info;

use crate::errors::ServiceError;

pub async fn list_categories(
    db: &DatabaseConnection,
) -> Result<Vec<category::Model>, ServiceError> {
    Ok(category::Entity::find().order_by_asc(category::Column::Name).all(db).await?)
}

/// Create a category; names are unique ignoring case.
pub async fn create_category(
    db: &DatabaseConnection,
    name: &str,
    description: Option<String>,
) -> Result<category::Model, ServiceError> {
    if category::find_by_name(db, name).await?.is_some() {
        return Err(ServiceError::Conflict(format!("Category '{}' already exists", name.trim())));
    }
    let created = category::create(db, name, description).await?;
    info!(event = "category_created", category_id = %created.id, name = %created.name);
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use uuid::Uuid;

    #[tokio::test]
    async fn duplicate_names_conflict() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let name = format!("Cat {}", Uuid::new_v4());
        create_category(&db, &name, None).await?;
        let err = create_category(&db, &name.to_uppercase(), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert!(list_categories(&db).await?.iter().any(|c| c.name == name));
        Ok(())
    }
}
