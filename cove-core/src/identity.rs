use serde::{Deserialize, Serialize};

/// Roles supplied by the external auth layer. The core only cares whether
/// a caller may drive operational transitions (check-in/check-out/cancel);
/// everything finer-grained is presentation logic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
    Seller,
    Customer,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            "seller" => Some(Role::Seller),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }

    /// Whether this role may operate the reservation lifecycle.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Staff)
    }
}
