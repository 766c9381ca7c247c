//! Expense business logic - Card and cash payments made by the clinic.
//!
//! Expenses are entered one at a time or imported in bulk from a card
//! statement. A bulk import is all or nothing.

use crate::{
    core::{access::AccessContext, pricing::MAX_AMOUNT},
    entities::{Expense, expense},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// An expense ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    /// Day of the payment
    pub date: NaiveDate,
    /// Merchant or payee
    pub store_name: String,
    /// Last four digits of the card, or empty
    pub last4: String,
    /// Amount paid, in won
    pub amount: i64,
}

impl NewExpense {
    fn validate(&self) -> Result<()> {
        if self.store_name.trim().is_empty() {
            return Err(Error::validation("Store name cannot be empty"));
        }
        if self.amount <= 0 {
            return Err(Error::validation(format!(
                "Expense amount must be positive, got {}",
                self.amount
            )));
        }
        if self.amount > MAX_AMOUNT {
            return Err(Error::validation(format!(
                "Expense amount cannot exceed {MAX_AMOUNT} won, got {}",
                self.amount
            )));
        }
        let last4 = self.last4.trim();
        if !last4.is_empty() && (last4.len() != 4 || !last4.chars().all(|c| c.is_ascii_digit())) {
            return Err(Error::validation(format!(
                "Card suffix must be four digits, got '{last4}'"
            )));
        }
        Ok(())
    }

    fn into_active_model(self, now: DateTime) -> expense::ActiveModel {
        expense::ActiveModel {
            date: Set(self.date.to_string()),
            store_name: Set(self.store_name.trim().to_string()),
            last4: Set(self.last4.trim().to_string()),
            amount: Set(self.amount),
            created_at: Set(now),
            ..Default::default()
        }
    }
}

/// Stores one expense.
///
/// # Errors
/// Returns an error if:
/// - The context is not admin
/// - The store name is empty, the amount is not positive, or the card suffix
///   is not four digits
/// - The database insert fails
pub async fn create_expense(
    db: &DatabaseConnection,
    access: &AccessContext,
    new_expense: NewExpense,
) -> Result<expense::Model> {
    access.require_admin()?;
    new_expense.validate()?;

    let created = new_expense
        .into_active_model(chrono::Utc::now().naive_utc())
        .insert(db)
        .await?;
    info!(
        "Expense #{} ({} at '{}') added by {}",
        created.id,
        created.amount,
        created.store_name,
        access.actor()
    );
    Ok(created)
}

/// Stores a batch of expenses in one transaction.
///
/// Every row is validated before anything is written; a single bad row or a
/// failed insert leaves the store unchanged. Returns how many rows were
/// stored.
///
/// # Errors
/// Returns an error if the context is not admin, any row is invalid, or a
/// database operation fails.
pub async fn import_expenses(
    db: &DatabaseConnection,
    access: &AccessContext,
    rows: Vec<NewExpense>,
) -> Result<usize> {
    access.require_admin()?;
    for row in &rows {
        row.validate()?;
    }
    if rows.is_empty() {
        return Ok(0);
    }

    let count = rows.len();
    let now = chrono::Utc::now().naive_utc();
    let txn = db.begin().await?;
    for row in rows {
        row.into_active_model(now).insert(&txn).await?;
    }
    txn.commit().await?;

    info!("Imported {count} expense(s) for {}", access.actor());
    Ok(count)
}

/// Retrieves an expense by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_expense(
    db: &DatabaseConnection,
    expense_id: i64,
) -> Result<Option<expense::Model>> {
    Expense::find_by_id(expense_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All expenses ordered by date, then by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_expenses(db: &DatabaseConnection) -> Result<Vec<expense::Model>> {
    Expense::find()
        .order_by_asc(expense::Column::Date)
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces every field of an expense.
///
/// # Errors
/// Returns an error if:
/// - The context is not admin
/// - The new values fail the same checks as [`create_expense`]
/// - The expense does not exist
/// - The database update fails
pub async fn update_expense(
    db: &DatabaseConnection,
    access: &AccessContext,
    expense_id: i64,
    changes: NewExpense,
) -> Result<expense::Model> {
    access.require_admin()?;
    changes.validate()?;

    let existing = get_expense(db, expense_id).await?.ok_or(Error::NotFound {
        entity: "Expense",
        id: expense_id,
    })?;

    let mut active: expense::ActiveModel = existing.into();
    active.date = Set(changes.date.to_string());
    active.store_name = Set(changes.store_name.trim().to_string());
    active.last4 = Set(changes.last4.trim().to_string());
    active.amount = Set(changes.amount);

    let updated = active.update(db).await?;
    info!("Expense #{expense_id} updated by {}", access.actor());
    Ok(updated)
}

/// Deletes an expense.
///
/// # Errors
/// Returns an error if the context is not admin, the expense does not exist,
/// or the database delete fails.
pub async fn delete_expense(
    db: &DatabaseConnection,
    access: &AccessContext,
    expense_id: i64,
) -> Result<()> {
    access.require_admin()?;

    let result = Expense::delete_by_id(expense_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Expense",
            id: expense_id,
        });
    }
    info!("Expense #{expense_id} deleted by {}", access.actor());
    Ok(())
}
