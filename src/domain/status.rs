//! Request status and priority enumerations.
//!
//! Both are closed sets matching the backend's wire values. The status set
//! has a nominal progression (pending → assigned → in_progress → completed,
//! with cancelled reachable from any non-terminal state) but the client does
//! not enforce a transition graph: any role allowed to edit the status may
//! write any value, matching the backend's behavior.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a repair request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    /// All statuses in display order.
    pub const ALL: [RequestStatus; 5] = [
        RequestStatus::Pending,
        RequestStatus::Assigned,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Assigned => "assigned",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Assigned => "Assigned",
            RequestStatus::InProgress => "In progress",
            RequestStatus::Completed => "Completed",
            RequestStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "assigned" => Ok(RequestStatus::Assigned),
            "in_progress" => Ok(RequestStatus::InProgress),
            "completed" => Ok(RequestStatus::Completed),
            "cancelled" => Ok(RequestStatus::Cancelled),
            other => Err(format!(
                "unknown status '{}' (expected one of: pending, assigned, in_progress, completed, cancelled)",
                other
            )),
        }
    }
}

/// Priority of a repair request. Display sort order only; no scheduling
/// semantics are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Normal, Priority::High, Priority::Urgent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Normal => "Normal",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(format!(
                "unknown priority '{}' (expected normal, high or urgent)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_form_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let parsed: RequestStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(parsed, RequestStatus::InProgress);
    }

    #[test]
    fn test_status_from_str_matches_wire_form() {
        for status in RequestStatus::ALL {
            assert_eq!(RequestStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(RequestStatus::from_str("done").is_err());
    }

    #[test]
    fn test_priority_from_str_matches_wire_form() {
        for priority in Priority::ALL {
            assert_eq!(Priority::from_str(priority.as_str()).unwrap(), priority);
        }
        assert!(Priority::from_str("critical").is_err());
    }
}
