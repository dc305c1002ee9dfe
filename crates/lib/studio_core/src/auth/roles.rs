//! Roles and the permission bit set they map to.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A set of capabilities, stored as bit flags.
///
/// Checks use set semantics, so roles do not have to nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Permissions(u32);

impl Permissions {
    pub const NONE: Permissions = Permissions(0);
    pub const WRITE_REVIEWS: Permissions = Permissions(0x01);
    pub const MODERATE_REVIEWS: Permissions = Permissions(0x02);
    pub const MANAGE_CLASSES: Permissions = Permissions(0x04);
    pub const ADMIN: Permissions = Permissions(0x80);

    pub const fn from_bits(bits: u32) -> Self {
        Permissions(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn union(self, other: Permissions) -> Permissions {
        Permissions(self.0 | other.0)
    }

    /// True when every bit of `required` is present.
    pub const fn contains(self, required: Permissions) -> bool {
        self.0 & required.0 == required.0
    }
}

impl BitOr for Permissions {
    type Output = Permissions;

    fn bitor(self, rhs: Permissions) -> Permissions {
        self.union(rhs)
    }
}

/// Coarse identity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Administrator,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Moderator, Role::Administrator];

    /// Static role → permission mapping.
    pub const fn permissions(self) -> Permissions {
        match self {
            Role::User => Permissions::WRITE_REVIEWS,
            Role::Moderator => Permissions::WRITE_REVIEWS.union(Permissions::MODERATE_REVIEWS),
            Role::Administrator => Permissions::WRITE_REVIEWS
                .union(Permissions::MODERATE_REVIEWS)
                .union(Permissions::MANAGE_CLASSES)
                .union(Permissions::ADMIN),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Administrator => "administrator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
