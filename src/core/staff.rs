//! Staff business logic - Trainers and clinicians credited with sales.
//!
//! Staff rows are created, edited and removed by an admin. Sales keep the role
//! their trainer had when they were priced. Removing a staff member keeps
//! their sales and clears the staff reference on them.

use crate::{
    core::access::AccessContext,
    entities::{Sale, Staff, StaffRole, sale, staff},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::info;

/// Adds a staff member.
///
/// # Errors
/// Returns an error if:
/// - The context is not admin
/// - The name is empty or whitespace-only
/// - The database insert fails
pub async fn create_staff(
    db: &DatabaseConnection,
    access: &AccessContext,
    name: &str,
    role: StaffRole,
) -> Result<staff::Model> {
    access.require_admin()?;

    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Staff name cannot be empty"));
    }

    let member = staff::ActiveModel {
        name: Set(name.to_string()),
        role: Set(role),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Staff '{}' ({}) added by {}", member.name, role, access.actor());
    Ok(member)
}

/// All staff members in creation order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_staff(db: &DatabaseConnection) -> Result<Vec<staff::Model>> {
    Staff::find()
        .order_by_asc(staff::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Looks up a staff member by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_staff_by_id(
    db: &DatabaseConnection,
    staff_id: i64,
) -> Result<Option<staff::Model>> {
    Staff::find_by_id(staff_id).one(db).await.map_err(Into::into)
}

/// Looks up the earliest staff member with exactly this name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_staff_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<staff::Model>> {
    Staff::find()
        .filter(staff::Column::Name.eq(name.trim()))
        .order_by_asc(staff::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Renames a staff member or changes their role.
///
/// Only future sales are priced with the new role; recorded sales keep the
/// role snapshot they were stored with.
///
/// # Errors
/// Returns an error if:
/// - The context is not admin
/// - The name is empty or whitespace-only
/// - The staff member does not exist
/// - The database update fails
pub async fn update_staff(
    db: &DatabaseConnection,
    access: &AccessContext,
    staff_id: i64,
    name: &str,
    role: StaffRole,
) -> Result<staff::Model> {
    access.require_admin()?;

    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Staff name cannot be empty"));
    }

    let existing = get_staff_by_id(db, staff_id).await?.ok_or(Error::NotFound {
        entity: "Staff",
        id: staff_id,
    })?;
    let previous_role = existing.role;

    let mut active: staff::ActiveModel = existing.into();
    active.name = Set(name.to_string());
    active.role = Set(role);
    let updated = active.update(db).await?;

    info!(
        "Staff #{} updated by {}: '{}' {} -> {}",
        updated.id,
        access.actor(),
        updated.name,
        previous_role,
        updated.role
    );
    Ok(updated)
}

/// Removes a staff member and detaches their sales.
///
/// The sales stay in the ledger with `staff_id` and `staff_role` cleared.
/// Both writes commit together. Returns how many sales were detached.
///
/// # Errors
/// Returns an error if:
/// - The context is not admin
/// - The staff member does not exist
/// - Any database operation fails (nothing is changed in that case)
pub async fn delete_staff(
    db: &DatabaseConnection,
    access: &AccessContext,
    staff_id: i64,
) -> Result<u64> {
    access.require_admin()?;

    let txn = db.begin().await?;

    let member = Staff::find_by_id(staff_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "Staff",
            id: staff_id,
        })?;

    let detached = Sale::update_many()
        .col_expr(sale::Column::StaffId, Expr::value(Option::<i64>::None))
        .col_expr(sale::Column::StaffRole, Expr::value(Option::<String>::None))
        .filter(sale::Column::StaffId.eq(staff_id))
        .exec(&txn)
        .await?
        .rows_affected;

    Staff::delete_by_id(staff_id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "Staff '{}' removed by {}; {detached} sale(s) detached",
        member.name,
        access.actor()
    );
    Ok(detached)
}
