//! String-backed enums stored in ledger columns.
//!
//! Each enum persists as its lowercase key (e.g. `"personal_training"`) and
//! parses from either the key or the labels used on the clinic's paper forms.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Kind of thing sold; determines which pricing rules apply.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Exercise examination service
    #[sea_orm(string_value = "exam")]
    Exam,
    /// Personal-training pass (individual or group)
    #[sea_orm(string_value = "personal_training")]
    PersonalTraining,
    /// Retail product
    #[sea_orm(string_value = "retail")]
    Retail,
}

/// Staff rank; affects personal-training prices.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    /// Team lead rank
    #[sea_orm(string_value = "senior")]
    Senior,
    /// Regular trainer rank
    #[sea_orm(string_value = "standard")]
    Standard,
}

/// Discount level applied to a sale's base price.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DiscountTier {
    /// No discount
    #[default]
    #[sea_orm(string_value = "none")]
    NoDiscount,
    /// 10% off
    #[sea_orm(string_value = "tier1")]
    Tier1,
    /// 20% off
    #[sea_orm(string_value = "tier2")]
    Tier2,
    /// 30% off
    #[sea_orm(string_value = "tier3")]
    Tier3,
}

/// How a sale was paid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit or debit card
    #[sea_orm(string_value = "card")]
    Card,
    /// Cash
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Bank transfer
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
}

impl Category {
    /// Stable key, identical to the stored value.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Exam => "exam",
            Self::PersonalTraining => "personal_training",
            Self::Retail => "retail",
        }
    }

    /// Default human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Exam => "Exam",
            Self::PersonalTraining => "PT",
            Self::Retail => "Retail",
        }
    }
}

impl StaffRole {
    /// Stable key, identical to the stored value.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Senior => "senior",
            Self::Standard => "standard",
        }
    }

    /// Default human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Senior => "Senior",
            Self::Standard => "Standard",
        }
    }
}

impl DiscountTier {
    /// Stable key, identical to the stored value.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::NoDiscount => "none",
            Self::Tier1 => "tier1",
            Self::Tier2 => "tier2",
            Self::Tier3 => "tier3",
        }
    }

    /// Reduction in whole percent.
    #[must_use]
    pub const fn percent(self) -> i64 {
        match self {
            Self::NoDiscount => 0,
            Self::Tier1 => 10,
            Self::Tier2 => 20,
            Self::Tier3 => 30,
        }
    }

    /// Reduction as a fraction of the base price.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rate(self) -> f64 {
        self.percent() as f64 / 100.0
    }

    /// Default human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoDiscount => "No discount",
            Self::Tier1 => "10%",
            Self::Tier2 => "20%",
            Self::Tier3 => "30%",
        }
    }
}

impl PaymentMethod {
    /// Stable key, identical to the stored value.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Cash => "cash",
            Self::BankTransfer => "bank_transfer",
        }
    }

    /// Default human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Card => "Card",
            Self::Cash => "Cash",
            Self::BankTransfer => "Bank transfer",
        }
    }
}

macro_rules! display_as_key {
    ($($ty:ty),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.key())
                }
            }
        )+
    };
}

display_as_key!(Category, StaffRole, DiscountTier, PaymentMethod);

/// Returned when a string names none of an enum's variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    /// Which enum was being parsed
    pub kind: &'static str,
    /// The rejected input
    pub input: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid {}", self.input, self.kind)
    }
}

impl std::error::Error for UnknownVariant {}

fn normalize(input: &str) -> String {
    input.trim().to_lowercase().replace([' ', '-'], "_")
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "exam" | "운동_검사" | "운동검사" => Ok(Self::Exam),
            "personal_training" | "pt" => Ok(Self::PersonalTraining),
            "retail" | "product" | "상품" => Ok(Self::Retail),
            _ => Err(UnknownVariant {
                kind: "category",
                input: s.to_string(),
            }),
        }
    }
}

impl FromStr for StaffRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "senior" | "팀장" => Ok(Self::Senior),
            "standard" | "일반" => Ok(Self::Standard),
            _ => Err(UnknownVariant {
                kind: "staff role",
                input: s.to_string(),
            }),
        }
    }
}

impl FromStr for DiscountTier {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "none" | "0" | "0%" | "no_discount" | "할인_없음" | "할인없음" => Ok(Self::NoDiscount),
            "tier1" | "10" | "10%" => Ok(Self::Tier1),
            "tier2" | "20" | "20%" => Ok(Self::Tier2),
            "tier3" | "30" | "30%" => Ok(Self::Tier3),
            _ => Err(UnknownVariant {
                kind: "discount tier",
                input: s.to_string(),
            }),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "card" | "카드" => Ok(Self::Card),
            "cash" | "현금" => Ok(Self::Cash),
            "bank_transfer" | "transfer" | "계좌_이체" | "계좌이체" => Ok(Self::BankTransfer),
            _ => Err(UnknownVariant {
                kind: "payment method",
                input: s.to_string(),
            }),
        }
    }
}
