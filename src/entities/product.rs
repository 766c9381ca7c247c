//! Product entity - The priced catalog of exams, PT passes and retail goods.
//!
//! Prices are whole currency units. `senior_price` and `standard_price` only
//! apply to individual (non-group) personal-training passes.

use super::sea_orm_active_enums::Category;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Pricing category
    pub category: Category,
    /// Name shown on forms (e.g., "10-session pass")
    pub name: String,
    /// Price used when no role-specific price applies
    pub base_price: i64,
    /// PT price when sold by a senior trainer
    pub senior_price: Option<i64>,
    /// PT price when sold by a standard trainer
    pub standard_price: Option<i64>,
    /// Group classes are priced the same regardless of trainer
    pub is_group: bool,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// Products are referenced from sales by name, not by key
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
