//! Role-based capabilities for repair requests.
//!
//! The capability set is a pure lookup per role. The backend enforces the
//! same rules on every endpoint; checking here only gives a faster, clearer
//! error before the round trip.

use crate::domain::Role;

/// What a role may do to a repair request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// May change the request status.
    pub edit_status: bool,
    /// May assign or unassign a technician.
    pub assign_technician: bool,
    /// May edit the estimated cost.
    pub edit_estimated_cost: bool,
    /// May edit the actual cost.
    pub edit_actual_cost: bool,
    /// May upload attachments.
    pub upload_file: bool,
    /// May delete attachments.
    pub delete_file: bool,
    /// May see cost fields at all.
    pub view_cost: bool,
}

impl Capabilities {
    /// The most restrictive set: a plain requester can only view their own
    /// requests and add nothing but new tickets.
    pub const NONE: Capabilities = Capabilities {
        edit_status: false,
        assign_technician: false,
        edit_estimated_cost: false,
        edit_actual_cost: false,
        upload_file: false,
        delete_file: false,
        view_cost: false,
    };
}

impl Role {
    /// Capability set for this role.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Role::User => Capabilities::NONE,
            Role::Technician => Capabilities {
                edit_status: true,
                assign_technician: false,
                edit_estimated_cost: false,
                edit_actual_cost: true,
                upload_file: true,
                delete_file: true,
                view_cost: true,
            },
            Role::Admin => Capabilities {
                edit_status: true,
                assign_technician: true,
                edit_estimated_cost: true,
                edit_actual_cost: false,
                upload_file: false,
                delete_file: true,
                view_cost: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_has_no_capabilities() {
        assert_eq!(Role::User.capabilities(), Capabilities::NONE);
    }

    #[test]
    fn test_technician_capabilities() {
        let caps = Role::Technician.capabilities();
        assert!(caps.edit_status);
        assert!(!caps.assign_technician);
        assert!(!caps.edit_estimated_cost);
        assert!(caps.edit_actual_cost);
        assert!(caps.upload_file);
        assert!(caps.delete_file);
        assert!(caps.view_cost);
    }

    #[test]
    fn test_admin_capabilities() {
        let caps = Role::Admin.capabilities();
        assert!(caps.edit_status);
        assert!(caps.assign_technician);
        assert!(caps.edit_estimated_cost);
        assert!(!caps.edit_actual_cost);
        assert!(!caps.upload_file);
        assert!(caps.delete_file);
        assert!(caps.view_cost);
    }

    #[test]
    fn test_only_admin_assigns() {
        for role in Role::ALL {
            assert_eq!(role.capabilities().assign_technician, role == Role::Admin);
        }
    }

    #[test]
    fn test_cost_edit_is_split_between_roles() {
        // Estimated cost belongs to admins, actual cost to technicians;
        // no role edits both.
        for role in Role::ALL {
            let caps = role.capabilities();
            assert!(!(caps.edit_estimated_cost && caps.edit_actual_cost));
        }
    }
}
