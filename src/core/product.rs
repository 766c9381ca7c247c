//! Product business logic - The priced catalog of exams, PT passes and retail goods.
//!
//! The catalog is the production price source. Seed entries from the config
//! file fill it on first start; after that only admins change it.

use crate::{
    config::ProductSeed,
    core::{access::AccessContext, pricing::MAX_AMOUNT},
    entities::{Category, Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Fields of a product as entered by an admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    /// Pricing category
    pub category: Category,
    /// Product name, unique within its category
    pub name: String,
    /// Price when no role-specific price applies
    pub base_price: i64,
    /// PT price for senior trainers
    pub senior_price: Option<i64>,
    /// PT price for standard trainers
    pub standard_price: Option<i64>,
    /// Group PT classes ignore the trainer's role
    pub is_group: bool,
}

impl ProductDraft {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Product name cannot be empty"));
        }
        let prices = [Some(self.base_price), self.senior_price, self.standard_price];
        if prices.into_iter().flatten().any(|p| p < 0) {
            return Err(Error::validation("Prices cannot be negative"));
        }
        if prices.into_iter().flatten().any(|p| p > MAX_AMOUNT) {
            return Err(Error::validation(format!(
                "Prices cannot exceed {MAX_AMOUNT} won"
            )));
        }
        Ok(())
    }
}

impl From<&ProductSeed> for ProductDraft {
    fn from(seed: &ProductSeed) -> Self {
        Self {
            category: seed.category,
            name: seed.name.clone(),
            base_price: seed.base_price,
            senior_price: seed.senior_price,
            standard_price: seed.standard_price,
            is_group: seed.is_group,
        }
    }
}

/// The whole catalog, ordered by category and then name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_catalog(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Category)
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product(db: &DatabaseConnection, product_id: i64) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a product by category and exact name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn find_product(
    db: &DatabaseConnection,
    category: Category,
    name: &str,
) -> Result<Option<product::Model>> {
    Product::find()
        .filter(product::Column::Category.eq(category))
        .filter(product::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

fn duplicate_error(draft: &ProductDraft) -> Error {
    Error::validation(format!(
        "A {} product named '{}' already exists",
        draft.category,
        draft.name.trim()
    ))
}

/// Adds a product to the catalog.
///
/// # Errors
/// Returns an error if:
/// - The context is not admin
/// - The name is empty or a price is negative
/// - The category already has a product with this name
/// - The database insert fails
pub async fn create_product(
    db: &DatabaseConnection,
    access: &AccessContext,
    draft: ProductDraft,
) -> Result<product::Model> {
    access.require_admin()?;
    draft.validate()?;

    if find_product(db, draft.category, &draft.name).await?.is_some() {
        return Err(duplicate_error(&draft));
    }

    let now = chrono::Utc::now().naive_utc();
    let created = product::ActiveModel {
        category: Set(draft.category),
        name: Set(draft.name.trim().to_string()),
        base_price: Set(draft.base_price),
        senior_price: Set(draft.senior_price),
        standard_price: Set(draft.standard_price),
        is_group: Set(draft.is_group),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Product '{}' ({}) added at {} by {}",
        created.name,
        created.category,
        created.base_price,
        access.actor()
    );
    Ok(created)
}

/// Replaces every field of an existing product.
///
/// Sales already recorded keep the price they were sold at.
///
/// # Errors
/// Returns an error if:
/// - The context is not admin
/// - The draft fails validation or collides with another product
/// - The product does not exist
/// - The database update fails
pub async fn update_product(
    db: &DatabaseConnection,
    access: &AccessContext,
    product_id: i64,
    draft: ProductDraft,
) -> Result<product::Model> {
    access.require_admin()?;
    draft.validate()?;

    let existing = get_product(db, product_id).await?.ok_or(Error::NotFound {
        entity: "Product",
        id: product_id,
    })?;
    let clash = find_product(db, draft.category, &draft.name).await?;
    if clash.is_some_and(|other| other.id != product_id) {
        return Err(duplicate_error(&draft));
    }

    let mut active: product::ActiveModel = existing.into();
    active.category = Set(draft.category);
    active.name = Set(draft.name.trim().to_string());
    active.base_price = Set(draft.base_price);
    active.senior_price = Set(draft.senior_price);
    active.standard_price = Set(draft.standard_price);
    active.is_group = Set(draft.is_group);
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let updated = active.update(db).await?;
    info!("Product #{} updated by {}", updated.id, access.actor());
    Ok(updated)
}

/// Removes a product from the catalog. Recorded sales keep its name and price.
///
/// # Errors
/// Returns an error if:
/// - The context is not admin
/// - The product does not exist
/// - The database delete fails
pub async fn delete_product(
    db: &DatabaseConnection,
    access: &AccessContext,
    product_id: i64,
) -> Result<()> {
    access.require_admin()?;

    let result = Product::delete_by_id(product_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Product",
            id: product_id,
        });
    }
    info!("Product #{product_id} removed by {}", access.actor());
    Ok(())
}

/// Fills an empty catalog from the seed list.
///
/// Runs at startup, before any user can unlock admin mode. A catalog that
/// already holds any product is left alone, so products removed by an admin
/// stay removed across restarts. Returns how many products were inserted.
///
/// # Errors
/// Returns an error if a seed is invalid, two seeds share a category and
/// name, or a database operation fails. No seed is inserted in that case.
pub async fn seed_catalog(db: &DatabaseConnection, seeds: &[ProductSeed]) -> Result<usize> {
    if seeds.is_empty() || Product::find().one(db).await?.is_some() {
        return Ok(0);
    }

    let drafts: Vec<ProductDraft> = seeds.iter().map(ProductDraft::from).collect();
    for (i, draft) in drafts.iter().enumerate() {
        draft.validate()?;
        let repeated = drafts[..i]
            .iter()
            .any(|p| p.category == draft.category && p.name.trim() == draft.name.trim());
        if repeated {
            return Err(duplicate_error(draft));
        }
    }

    let now = chrono::Utc::now().naive_utc();
    let txn = db.begin().await?;
    for draft in &drafts {
        product::ActiveModel {
            category: Set(draft.category),
            name: Set(draft.name.trim().to_string()),
            base_price: Set(draft.base_price),
            senior_price: Set(draft.senior_price),
            standard_price: Set(draft.standard_price),
            is_group: Set(draft.is_group),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    info!("Seeded {} product(s) into the catalog", drafts.len());
    Ok(drafts.len())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn draft(category: Category, name: &str, base_price: i64) -> ProductDraft {
        ProductDraft {
            category,
            name: name.to_string(),
            base_price,
            senior_price: None,
            standard_price: None,
            is_group: false,
        }
    }

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_product(&db, &admin(), draft(Category::Retail, "  ", 100)).await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        let result = create_product(&db, &admin(), draft(Category::Retail, "ZT", -1)).await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        let mut negative_role_price = draft(Category::PersonalTraining, "Pass", 10);
        negative_role_price.senior_price = Some(-5);
        let result = create_product(&db, &admin(), negative_role_price).await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        let result =
            create_product(&db, &admin(), draft(Category::Retail, "ZT", MAX_AMOUNT + 1)).await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        let read_only = AccessContext::read_only("visitor");
        let result = create_product(&db, &read_only, draft(Category::Retail, "ZT", 1)).await;
        assert!(matches!(result, Err(Error::Unauthorized { actor: _ })));

        Ok(())
    }

    #[tokio::test]
    async fn test_catalog_is_ordered_by_category_then_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_product(&db, &admin(), draft(Category::Retail, "ZT", 55_000)).await?;
        create_product(&db, &admin(), draft(Category::Exam, "Posture", 100_000)).await?;
        create_product(&db, &admin(), draft(Category::Retail, "Gatorade", 2_000)).await?;
        create_product(&db, &admin(), draft(Category::Exam, "Basic", 100_000)).await?;

        let names: Vec<String> = get_catalog(&db).await?.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Basic", "Posture", "Gatorade", "ZT"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_name_in_category_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_product(&db, &admin(), draft(Category::Retail, "ZT", 55_000)).await?;

        let result = create_product(&db, &admin(), draft(Category::Retail, " ZT ", 1)).await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        // same name in another category is a different product
        create_product(&db, &admin(), draft(Category::Exam, "ZT", 1)).await?;
        assert_eq!(get_catalog(&db).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_product() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_product(&db, &admin(), draft(Category::Retail, "ZT", 55_000)).await?;
        let other = create_product(&db, &admin(), draft(Category::Retail, "ZB", 346_000)).await?;

        let mut change = draft(Category::Retail, "ZT Pro", 60_000);
        let updated = update_product(&db, &admin(), created.id, change.clone()).await?;
        assert_eq!(updated.name, "ZT Pro");
        assert_eq!(updated.base_price, 60_000);
        assert_eq!(updated.created_at, created.created_at);

        // saving under its own name is fine, taking another product's name is not
        update_product(&db, &admin(), created.id, change.clone()).await?;
        change.name = "ZB".to_string();
        let result = update_product(&db, &admin(), created.id, change).await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        delete_product(&db, &admin(), other.id).await?;
        assert!(get_product(&db, other.id).await?.is_none());
        assert!(matches!(
            delete_product(&db, &admin(), other.id).await,
            Err(Error::NotFound {
                entity: "Product",
                id: _
            })
        ));
        assert!(matches!(
            update_product(&db, &admin(), 999, draft(Category::Exam, "X", 1)).await,
            Err(Error::NotFound { entity: _, id: 999 })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let seeds = sample_seeds();

        let inserted = seed_catalog(&db, &seeds).await?;
        assert_eq!(inserted, seeds.len());
        assert_eq!(seed_catalog(&db, &seeds).await?, 0);
        assert_eq!(get_catalog(&db).await?.len(), seeds.len());

        let pass = find_product(&db, Category::PersonalTraining, "1회권")
            .await?
            .unwrap();
        assert_eq!(pass.senior_price, Some(100_000));
        assert_eq!(pass.standard_price, Some(80_000));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_keeps_admin_edits() -> Result<()> {
        let db = setup_test_db().await?;
        let seeds = sample_seeds();
        seed_catalog(&db, &seeds).await?;

        let exam = find_product(&db, Category::Exam, "기본검사").await?.unwrap();
        update_product(&db, &admin(), exam.id, draft(Category::Exam, "기본검사", 110_000)).await?;
        seed_catalog(&db, &seeds).await?;

        let exam = get_product(&db, exam.id).await?.unwrap();
        assert_eq!(exam.base_price, 110_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_removed_seed_product_stays_removed() -> Result<()> {
        let db = setup_test_db().await?;
        let seeds = sample_seeds();
        seed_catalog(&db, &seeds).await?;

        let zt = find_product(&db, Category::Retail, "ZT").await?.unwrap();
        delete_product(&db, &admin(), zt.id).await?;

        // next startup
        assert_eq!(seed_catalog(&db, &seeds).await?, 0);
        assert!(find_product(&db, Category::Retail, "ZT").await?.is_none());
        assert_eq!(get_catalog(&db).await?.len(), seeds.len() - 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_skips_a_catalog_built_by_hand() -> Result<()> {
        let db = setup_test_db().await?;
        create_product(&db, &admin(), draft(Category::Retail, "Gatorade", 2_000)).await?;

        assert_eq!(seed_catalog(&db, &sample_seeds()).await?, 0);
        assert_eq!(get_catalog(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_rejects_bad_seed_lists() -> Result<()> {
        let db = setup_test_db().await?;
        let mut seeds = sample_seeds();
        seeds.push(seeds[0].clone());
        let result = seed_catalog(&db, &seeds).await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        let mut seeds = sample_seeds();
        seeds[1].senior_price = Some(-1);
        let result = seed_catalog(&db, &seeds).await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        assert!(get_catalog(&db).await?.is_empty());
        Ok(())
    }
}
