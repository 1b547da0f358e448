//! Role → operation policy.
//!
//! Every guarded operation is listed here and answered for every role with an
//! exhaustive match, so the compiler points at this file whenever a role or an
//! operation is added.

use crate::Role;

/// Operations that pass through the access control guard.
///
/// Public operations (registration, login, catalog reads) never reach the
/// guard and are therefore not listed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    CatalogCreate,
    CatalogUpdate,
    CatalogDelete,
    CatalogPurchase,
    CatalogRestock,
    UsersList,
    WhoAmI,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::CatalogCreate => "catalog.create",
            Operation::CatalogUpdate => "catalog.update",
            Operation::CatalogDelete => "catalog.delete",
            Operation::CatalogPurchase => "catalog.purchase",
            Operation::CatalogRestock => "catalog.restock",
            Operation::UsersList => "users.list",
            Operation::WhoAmI => "auth.me",
        }
    }

    pub fn permits(self, role: Role) -> bool {
        match role {
            Role::Admin => true,
            Role::User => match self {
                Operation::CatalogPurchase | Operation::WhoAmI => true,
                Operation::CatalogCreate
                | Operation::CatalogUpdate
                | Operation::CatalogDelete
                | Operation::CatalogRestock
                | Operation::UsersList => false,
            },
        }
    }

    /// Roles admitted to this operation.
    pub fn allowed_roles(self) -> Vec<Role> {
        Role::ALL.into_iter().filter(|r| self.permits(*r)).collect()
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_only_operations() {
        for op in [
            Operation::CatalogCreate,
            Operation::CatalogUpdate,
            Operation::CatalogDelete,
            Operation::CatalogRestock,
            Operation::UsersList,
        ] {
            assert_eq!(op.allowed_roles(), vec![Role::Admin], "{op}");
        }
    }

    #[test]
    fn purchase_is_open_to_every_role() {
        assert_eq!(Operation::CatalogPurchase.allowed_roles(), Role::ALL.to_vec());
        assert_eq!(Operation::WhoAmI.allowed_roles(), Role::ALL.to_vec());
    }
}
