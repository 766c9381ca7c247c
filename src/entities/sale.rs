//! Sale entity - One line of daily revenue.
//!
//! Category, product name and the staff role are denormalized so a sale keeps
//! its meaning after catalog edits or staff removal.
use super::sea_orm_active_enums::{Category, DiscountTier, PaymentMethod, StaffRole};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    /// Unique identifier for the sale
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Calendar day of the sale, `YYYY-MM-DD`
    pub date: String,
    /// Pricing category at time of sale
    pub category: Category,
    /// Product name at time of sale
    pub product: String,
    /// Credited staff member, cleared when they are removed
    pub staff_id: Option<i64>,
    /// Staff role snapshot taken when the sale was recorded
    pub staff_role: Option<StaffRole>,
    /// Discount tier applied
    pub discount: DiscountTier,
    /// How the customer paid
    pub payment_method: PaymentMethod,
    /// Unit price before discount
    pub base_price: i64,
    /// `round(base_price * (1 - rate))`
    pub final_price: i64,
    /// When the sale was recorded
    pub created_at: DateTime,
}

/// Defines relationships between Sale and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sale may be credited to one staff member
    #[sea_orm(
        belongs_to = "super::staff::Entity",
        from = "Column::StaffId",
        to = "super::staff::Column::Id",
        on_delete = "SetNull"
    )]
    Staff,
}

impl Related<super::staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
