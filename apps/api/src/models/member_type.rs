//! Membership tier model for Trellis
//!
//! There are exactly two tiers, identified by a fixed enumerated id rather
//! than a UUID.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Membership tier identifier stored as varchar
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "varchar", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberTypeId {
    Basic,
    Business,
}

impl MemberTypeId {
    /// All tiers in id order
    pub const ALL: [Self; 2] = [Self::Basic, Self::Business];

    /// Stored string form of the id
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Business => "BUSINESS",
        }
    }
}

impl std::fmt::Display for MemberTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership tier record from the member_types table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct MemberType {
    /// Tier identifier
    pub id: MemberTypeId,

    /// Discount percentage granted by the tier
    pub discount: f64,

    /// Monthly post allowance
    pub posts_limit_per_month: i32,
}

impl MemberType {
    /// Seed rows present in every store
    pub fn seed() -> Vec<Self> {
        vec![
            Self {
                id: MemberTypeId::Basic,
                discount: 2.3,
                posts_limit_per_month: 20,
            },
            Self {
                id: MemberTypeId::Business,
                discount: 7.7,
                posts_limit_per_month: 100,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_type_id_string_forms() {
        assert_eq!(MemberTypeId::Basic.as_str(), "BASIC");
        assert_eq!(MemberTypeId::Business.to_string(), "BUSINESS");
        assert_eq!(
            serde_json::to_value(MemberTypeId::Business).unwrap(),
            "BUSINESS"
        );
    }

    #[test]
    fn test_seed_covers_every_tier() {
        let ids: Vec<_> = MemberType::seed().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, MemberTypeId::ALL.to_vec());
    }
}
