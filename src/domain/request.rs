//! Repair request model and mutation payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Priority, RequestStatus};

/// A repair request as returned by the backend.
///
/// `requester_id` is set at creation and never reassigned. `assigned_to` is
/// nullable and only settable by an admin. `ticket_number` is the display
/// key, assigned server-side from the configured prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairRequest {
    pub id: i64,
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub priority: Priority,
    pub status: RequestStatus,
    pub location: String,
    pub contact_phone: Option<String>,
    pub requester_id: i64,
    pub requester_name: Option<String>,
    pub assigned_to: Option<i64>,
    pub technician_name: Option<String>,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub created_at: String,
}

impl RepairRequest {
    /// Calendar date of `created_at`, if it parses.
    ///
    /// The backend is not consistent about timestamp formats, so this
    /// accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and bare dates.
    pub fn created_date(&self) -> Option<NaiveDate> {
        parse_date(&self.created_at)
    }

    /// Case-insensitive match against title, ticket number or location.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self.ticket_number.to_lowercase().contains(&term)
            || self.location.to_lowercase().contains(&term)
    }
}

/// Parse a backend timestamp down to its calendar date.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Payload for `POST /repair-requests`.
#[derive(Debug, Clone, Serialize)]
pub struct NewRepairRequest {
    pub title: String,
    pub description: String,
    pub category_id: Option<i64>,
    pub priority: Priority,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}

/// Sparse payload for `PUT /repair-requests/:id`.
///
/// Only the fields the caller is allowed to touch are serialized; the
/// backend treats absent fields as unchanged. `assigned_to` is doubly
/// optional so an admin can distinguish "leave as is" (`None`) from
/// "unassign" (`Some(None)`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateRepairRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_cost: Option<f64>,
}

impl UpdateRepairRequest {
    /// True when no field would be serialized.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.assigned_to.is_none()
            && self.estimated_cost.is_none()
            && self.actual_cost.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RepairRequest {
        RepairRequest {
            id: 1,
            ticket_number: "REQ-0001".to_string(),
            title: "Broken aircon in lab 3".to_string(),
            description: "Unit drips and does not cool".to_string(),
            category_id: Some(2),
            category_name: Some("HVAC".to_string()),
            priority: Priority::High,
            status: RequestStatus::Pending,
            location: "Building B, Lab 3".to_string(),
            contact_phone: None,
            requester_id: 10,
            requester_name: Some("Somchai".to_string()),
            assigned_to: None,
            technician_name: None,
            estimated_cost: None,
            actual_cost: None,
            created_at: "2025-06-01T09:30:00Z".to_string(),
        }
    }

    #[test]
    fn test_created_date_accepts_common_formats() {
        let mut req = request();
        assert_eq!(
            req.created_date(),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );

        req.created_at = "2025-06-01 09:30:00".to_string();
        assert_eq!(req.created_date(), NaiveDate::from_ymd_opt(2025, 6, 1));

        req.created_at = "2025-06-01".to_string();
        assert_eq!(req.created_date(), NaiveDate::from_ymd_opt(2025, 6, 1));

        req.created_at = "yesterday".to_string();
        assert_eq!(req.created_date(), None);
    }

    #[test]
    fn test_search_matches_title_ticket_and_location() {
        let req = request();
        assert!(req.matches_search("aircon"));
        assert!(req.matches_search("req-0001"));
        assert!(req.matches_search("lab 3"));
        assert!(!req.matches_search("plumbing"));
    }

    #[test]
    fn test_update_payload_serializes_sparsely() {
        let update = UpdateRepairRequest {
            status: Some(RequestStatus::Completed),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "completed" }));
    }

    #[test]
    fn test_update_payload_unassign_serializes_null() {
        let update = UpdateRepairRequest {
            assigned_to: Some(None),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "assigned_to": null }));
    }

    #[test]
    fn test_update_payload_is_empty() {
        assert!(UpdateRepairRequest::default().is_empty());
        assert!(!UpdateRepairRequest {
            actual_cost: Some(120.0),
            ..Default::default()
        }
        .is_empty());
    }
}
