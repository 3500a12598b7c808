use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// A role name from `GET /admin/{id}/roles`, compared exactly as sent.
///
/// Only the three manager roles gate anything in the panel; any other name
/// the backend assigns is carried along and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const PRODUCT_MANAGER: Role = Role(Cow::Borrowed("Product Manager"));
    pub const INVENTORY_MANAGER: Role = Role(Cow::Borrowed("Inventory Manager"));
    pub const ORDER_MANAGER: Role = Role(Cow::Borrowed("Order Manager"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this role opens one of the dashboards.
    pub fn is_manager_role(&self) -> bool {
        [Self::PRODUCT_MANAGER, Self::INVENTORY_MANAGER, Self::ORDER_MANAGER].contains(self)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
