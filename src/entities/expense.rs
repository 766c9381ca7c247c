//! Expense entity - One card or cash payment made by the clinic.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Calendar day of the payment, `YYYY-MM-DD`
    pub date: String,
    /// Payee or store name
    pub store_name: String,
    /// Last four digits of the paying card; empty when unknown
    pub last4: String,
    /// Amount paid, always positive
    pub amount: i64,
    /// When the expense was recorded
    pub created_at: DateTime,
}

/// `Expense` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
