//! Entity module - Contains all SeaORM entity definitions for the ledger store.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod expense;
pub mod product;
pub mod sale;
pub mod sea_orm_active_enums;
pub mod staff;

// Re-export specific types to avoid conflicts
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use sale::{Column as SaleColumn, Entity as Sale, Model as SaleModel};
pub use sea_orm_active_enums::{Category, DiscountTier, PaymentMethod, StaffRole, UnknownVariant};
pub use staff::{Column as StaffColumn, Entity as Staff, Model as StaffModel};
