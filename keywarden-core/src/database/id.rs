//! Stable identity of groups and entries

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// 128-bit identity derived 1:1 from a node's UUID
///
/// Used as the lookup key for navigation, for example jumping to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u128);

impl ItemId {
    /// Derives the identity of a node
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.as_u128())
    }

    /// The node UUID this identity was derived from
    #[must_use]
    pub const fn as_uuid(self) -> Uuid {
        Uuid::from_u128(self.0)
    }

    /// Raw 128-bit value
    #[must_use]
    pub const fn as_u128(self) -> u128 {
        self.0
    }
}

impl From<Uuid> for ItemId {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_uuid())
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self::from_uuid)
    }
}
