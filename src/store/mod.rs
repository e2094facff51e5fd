//! The fetched snapshot and the mutation-and-reload protocol.
//!
//! The client never patches state locally: every collection is a
//! read-through copy of the last API response, and every mutation is
//! followed by a full [`Workspace::refresh`]. A refresh that fails after a
//! successful mutation leaves the previous snapshot in place; callers
//! surface that as a warning rather than rolling anything back.

use anyhow::Result;

use crate::api::ApiClient;
use crate::domain::{visible_requests, Priority, RepairRequest, RequestStatus, Role, User};
use crate::session::Session;

/// Dashboard counters computed from the visible snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub urgent: usize,
    /// Sum of actual costs across the visible requests.
    pub total_cost: f64,
}

impl DashboardStats {
    pub fn compute(requests: &[RepairRequest]) -> Self {
        DashboardStats {
            total: requests.len(),
            pending: count_status(requests, RequestStatus::Pending),
            in_progress: count_status(requests, RequestStatus::InProgress),
            completed: count_status(requests, RequestStatus::Completed),
            urgent: requests
                .iter()
                .filter(|r| r.priority == Priority::Urgent)
                .count(),
            total_cost: requests.iter().filter_map(|r| r.actual_cost).sum(),
        }
    }
}

fn count_status(requests: &[RepairRequest], status: RequestStatus) -> usize {
    requests.iter().filter(|r| r.status == status).count()
}

/// The last fetched state of the world, scoped to the acting user.
///
/// `requests` has the visibility filter already applied; `users` is only
/// populated for admins (the backend rejects `/users` for everyone else).
#[derive(Default)]
pub struct Workspace {
    pub requests: Vec<RepairRequest>,
    pub categories: Vec<crate::domain::Category>,
    pub users: Vec<User>,
    pub technicians: Vec<User>,
    pub stats: DashboardStats,
}

impl Workspace {
    /// Fetch everything this user's dashboard needs, concurrently, and
    /// recompute the stats. Called once at startup and again after every
    /// mutation.
    pub async fn refresh(client: &ApiClient, session: &Session) -> Result<Workspace> {
        let is_admin = session.user.role == Role::Admin;

        let (requests, categories, users) = futures::try_join!(
            client.list_requests(),
            client.list_categories(),
            async {
                if is_admin {
                    client.list_users().await
                } else {
                    Ok(Vec::new())
                }
            },
        )?;

        let requests = visible_requests(&requests, &session.user);
        let technicians: Vec<User> = users.iter().filter(|u| u.is_technician()).cloned().collect();
        let stats = DashboardStats::compute(&requests);

        Ok(Workspace {
            requests,
            categories,
            users,
            technicians,
            stats,
        })
    }

    /// Look up a visible request by id or ticket number.
    pub fn find_request(&self, key: &str) -> Option<&RepairRequest> {
        if let Ok(id) = key.parse::<i64>() {
            if let Some(req) = self.requests.iter().find(|r| r.id == id) {
                return Some(req);
            }
        }
        self.requests
            .iter()
            .find(|r| r.ticket_number.eq_ignore_ascii_case(key))
    }

    /// Resolve a technician by id, username or full name (admin data only).
    pub fn find_technician(&self, key: &str) -> Option<&User> {
        if let Ok(id) = key.parse::<i64>() {
            if let Some(tech) = self.technicians.iter().find(|t| t.id == id) {
                return Some(tech);
            }
        }
        self.technicians
            .iter()
            .find(|t| t.username.eq_ignore_ascii_case(key) || t.full_name.eq_ignore_ascii_case(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(status: RequestStatus, priority: Priority, cost: Option<f64>) -> RepairRequest {
        RepairRequest {
            id: 1,
            ticket_number: "REQ-0001".to_string(),
            title: String::new(),
            description: String::new(),
            category_id: None,
            category_name: None,
            priority,
            status,
            location: String::new(),
            contact_phone: None,
            requester_id: 1,
            requester_name: None,
            assigned_to: None,
            technician_name: None,
            estimated_cost: None,
            actual_cost: cost,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(DashboardStats::compute(&[]), DashboardStats::default());
    }

    #[test]
    fn test_stats_counts_and_cost() {
        let requests = vec![
            request(RequestStatus::Pending, Priority::Urgent, None),
            request(RequestStatus::InProgress, Priority::Normal, Some(150.0)),
            request(RequestStatus::Completed, Priority::Urgent, Some(200.5)),
            request(RequestStatus::Cancelled, Priority::High, None),
        ];
        let stats = DashboardStats::compute(&requests);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.urgent, 2);
        assert!((stats.total_cost - 350.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_find_request_by_id_and_ticket() {
        let mut ws = Workspace::default();
        let mut req = request(RequestStatus::Pending, Priority::Normal, None);
        req.id = 42;
        req.ticket_number = "REQ-0042".to_string();
        ws.requests.push(req);

        assert!(ws.find_request("42").is_some());
        assert!(ws.find_request("req-0042").is_some());
        assert!(ws.find_request("REQ-9999").is_none());
    }
}
