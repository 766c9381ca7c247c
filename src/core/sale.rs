//! Sale business logic - Recording daily revenue.
//!
//! A sale is priced when it is recorded: the trainer's role at that moment and
//! the resolved prices are stored with it, so later catalog edits or staff
//! removal do not change past revenue.

use crate::{
    config::ProductSeed,
    core::{
        access::AccessContext,
        pricing::{PriceQuote, quote_sale},
        product, staff,
    },
    entities::{Category, DiscountTier, PaymentMethod, Sale, StaffRole, sale},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// A sale as entered by an admin; prices are filled in by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    /// Day of the sale
    pub date: NaiveDate,
    /// Pricing category
    pub category: Category,
    /// Product name as in the catalog
    pub product: String,
    /// Credited staff member
    pub staff_id: Option<i64>,
    /// Discount applied to the base price
    pub discount: DiscountTier,
    /// How the customer paid
    pub payment_method: PaymentMethod,
}

async fn price(
    db: &DatabaseConnection,
    legacy: &[ProductSeed],
    new_sale: &NewSale,
) -> Result<(Option<StaffRole>, PriceQuote)> {
    let product_name = new_sale.product.trim();
    if product_name.is_empty() {
        return Err(Error::validation("Product name cannot be empty"));
    }

    let role = match new_sale.staff_id {
        Some(staff_id) => Some(
            staff::get_staff_by_id(db, staff_id)
                .await?
                .ok_or(Error::NotFound {
                    entity: "Staff",
                    id: staff_id,
                })?
                .role,
        ),
        None => None,
    };

    let catalog = product::get_catalog(db).await?;
    let quote = quote_sale(
        &catalog,
        legacy,
        new_sale.category,
        product_name,
        role,
        new_sale.discount,
    );
    if quote.base_price == 0 {
        return Err(Error::UnpricedProduct {
            category: new_sale.category,
            product: product_name.to_string(),
        });
    }
    Ok((role, quote))
}

/// Prices and stores a sale.
///
/// The staff member's current role decides PT pricing and is stored with the
/// sale. A product that resolves to no price is refused.
///
/// # Errors
/// Returns an error if:
/// - The context is not admin
/// - The product name is empty or the staff member does not exist
/// - The product has no price ([`Error::UnpricedProduct`]); nothing is stored
/// - A database operation fails
pub async fn record_sale(
    db: &DatabaseConnection,
    access: &AccessContext,
    legacy: &[ProductSeed],
    new_sale: NewSale,
) -> Result<sale::Model> {
    access.require_admin()?;
    let (role, quote) = price(db, legacy, &new_sale).await?;

    let recorded = sale::ActiveModel {
        date: Set(new_sale.date.to_string()),
        category: Set(new_sale.category),
        product: Set(new_sale.product.trim().to_string()),
        staff_id: Set(new_sale.staff_id),
        staff_role: Set(role),
        discount: Set(new_sale.discount),
        payment_method: Set(new_sale.payment_method),
        base_price: Set(quote.base_price),
        final_price: Set(quote.final_price),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Sale #{} recorded by {}: {} '{}' {} -> {}",
        recorded.id,
        access.actor(),
        recorded.category,
        recorded.product,
        recorded.base_price,
        recorded.final_price
    );
    Ok(recorded)
}

/// Replaces a sale's fields and prices it again. Concurrent edits are
/// last-write-wins.
///
/// # Errors
/// Same as [`record_sale`], plus [`Error::NotFound`] for a missing sale.
pub async fn update_sale(
    db: &DatabaseConnection,
    access: &AccessContext,
    legacy: &[ProductSeed],
    sale_id: i64,
    changes: NewSale,
) -> Result<sale::Model> {
    access.require_admin()?;

    let existing = get_sale(db, sale_id).await?.ok_or(Error::NotFound {
        entity: "Sale",
        id: sale_id,
    })?;
    let (role, quote) = price(db, legacy, &changes).await?;

    let mut active: sale::ActiveModel = existing.into();
    active.date = Set(changes.date.to_string());
    active.category = Set(changes.category);
    active.product = Set(changes.product.trim().to_string());
    active.staff_id = Set(changes.staff_id);
    active.staff_role = Set(role);
    active.discount = Set(changes.discount);
    active.payment_method = Set(changes.payment_method);
    active.base_price = Set(quote.base_price);
    active.final_price = Set(quote.final_price);

    let updated = active.update(db).await?;
    info!("Sale #{sale_id} updated by {}", access.actor());
    Ok(updated)
}

/// Deletes a sale.
///
/// # Errors
/// Returns an error if the context is not admin, the sale does not exist, or
/// the database delete fails.
pub async fn delete_sale(db: &DatabaseConnection, access: &AccessContext, sale_id: i64) -> Result<()> {
    access.require_admin()?;

    let result = Sale::delete_by_id(sale_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Sale",
            id: sale_id,
        });
    }
    info!("Sale #{sale_id} deleted by {}", access.actor());
    Ok(())
}

/// All sales ordered by date, then by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_sales(db: &DatabaseConnection) -> Result<Vec<sale::Model>> {
    Sale::find()
        .order_by_asc(sale::Column::Date)
        .order_by_asc(sale::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a sale by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_sale(db: &DatabaseConnection, sale_id: i64) -> Result<Option<sale::Model>> {
    Sale::find_by_id(sale_id).one(db).await.map_err(Into::into)
}
