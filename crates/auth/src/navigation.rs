//! Role-gated dashboards.

use serde::{Deserialize, Serialize};

use crate::{AuthError, Role};

/// Body of `GET /admin/{id}/roles`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRoles {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub is_super_admin: bool,
}

impl AdminRoles {
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Super admins bypass per-item role checks.
    pub fn can_access(&self, dashboard: Dashboard) -> bool {
        self.is_super_admin || self.has_role(&dashboard.required_role())
    }
}

/// A navigation entry of the admin panel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dashboard {
    Products,
    Inventory,
    Orders,
}

impl Dashboard {
    /// Navigation order, also the landing preference after login.
    pub const ALL: [Dashboard; 3] = [Dashboard::Products, Dashboard::Inventory, Dashboard::Orders];

    pub fn label(&self) -> &'static str {
        match self {
            Dashboard::Products => "Product Dashboard",
            Dashboard::Inventory => "Inventory Dashboard",
            Dashboard::Orders => "Orders Dashboard",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Dashboard::Products => "/dashboard",
            Dashboard::Inventory => "/inventory",
            Dashboard::Orders => "/orders",
        }
    }

    pub fn required_role(&self) -> Role {
        match self {
            Dashboard::Products => Role::PRODUCT_MANAGER,
            Dashboard::Inventory => Role::INVENTORY_MANAGER,
            Dashboard::Orders => Role::ORDER_MANAGER,
        }
    }
}

/// Dashboards shown in the navigation drawer, in navigation order.
pub fn visible_navigation(access: &AdminRoles) -> Vec<Dashboard> {
    Dashboard::ALL
        .into_iter()
        .filter(|d| access.can_access(*d))
        .collect()
}

/// Where to send an admin right after login.
///
/// Listed roles decide, in navigation order; a super admin without any listed
/// role lands on the product dashboard.
pub fn landing_route(access: &AdminRoles) -> Result<Dashboard, AuthError> {
    Dashboard::ALL
        .into_iter()
        .find(|d| access.has_role(&d.required_role()))
        .or(access.is_super_admin.then_some(Dashboard::Products))
        .ok_or(AuthError::NoAccessibleDashboard)
}
