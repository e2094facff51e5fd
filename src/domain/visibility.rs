//! Role-scoped request visibility.
//!
//! This filter is a UX convenience, not access control: it only narrows an
//! already-fetched list so each role sees what their dashboard should show.
//! Any client can skip it, so the backend must enforce the same rule on
//! every endpoint independently.

use crate::domain::{RepairRequest, Role, User};

/// Narrow a request list to what `user` should see.
///
/// - `user` → requests they filed (`requester_id`)
/// - `technician` → requests assigned to them (`assigned_to`)
/// - `admin` → everything
///
/// Idempotent: filtering an already-filtered list returns the same set.
pub fn visible_requests(requests: &[RepairRequest], user: &User) -> Vec<RepairRequest> {
    requests
        .iter()
        .filter(|req| is_visible(req, user))
        .cloned()
        .collect()
}

fn is_visible(request: &RepairRequest, user: &User) -> bool {
    match user.role {
        Role::User => request.requester_id == user.id,
        Role::Technician => request.assigned_to == Some(user.id),
        Role::Admin => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, RequestStatus};

    fn user(id: i64, role: Role) -> User {
        User {
            id,
            username: format!("u{}", id),
            email: format!("u{}@example.com", id),
            full_name: format!("User {}", id),
            phone: None,
            role,
            department: None,
            is_active: true,
            created_at: String::new(),
        }
    }

    fn request(id: i64, requester_id: i64, assigned_to: Option<i64>) -> RepairRequest {
        RepairRequest {
            id,
            ticket_number: format!("REQ-{:04}", id),
            title: "x".to_string(),
            description: String::new(),
            category_id: None,
            category_name: None,
            priority: Priority::Normal,
            status: RequestStatus::Pending,
            location: String::new(),
            contact_phone: None,
            requester_id,
            requester_name: None,
            assigned_to,
            technician_name: None,
            estimated_cost: None,
            actual_cost: None,
            created_at: String::new(),
        }
    }

    fn sample() -> Vec<RepairRequest> {
        vec![
            request(1, 10, Some(20)),
            request(2, 10, None),
            request(3, 11, Some(21)),
            request(4, 12, Some(20)),
        ]
    }

    #[test]
    fn test_requester_sees_only_their_own() {
        let visible = visible_requests(&sample(), &user(10, Role::User));
        let ids: Vec<i64> = visible.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_technician_sees_only_assigned() {
        let visible = visible_requests(&sample(), &user(20, Role::Technician));
        let ids: Vec<i64> = visible.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_technician_with_no_assignments_sees_nothing() {
        let visible = visible_requests(&sample(), &user(99, Role::Technician));
        assert!(visible.is_empty());
    }

    #[test]
    fn test_admin_sees_everything() {
        let visible = visible_requests(&sample(), &user(1, Role::Admin));
        assert_eq!(visible.len(), 4);
    }

    #[test]
    fn test_filter_is_idempotent() {
        for role in Role::ALL {
            let u = user(10, role);
            let once = visible_requests(&sample(), &u);
            let twice = visible_requests(&once, &u);
            let once_ids: Vec<i64> = once.iter().map(|r| r.id).collect();
            let twice_ids: Vec<i64> = twice.iter().map(|r| r.id).collect();
            assert_eq!(once_ids, twice_ids);
        }
    }
}
