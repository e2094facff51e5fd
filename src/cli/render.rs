//! Terminal output helpers shared by the command handlers.

use crate::domain::{RepairRequest, Role, User};

/// Truncate a string to `max` characters, adding an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Format a cost value for display.
pub fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// What the list is scoped to, per role.
pub fn scope_line(user: &User) -> &'static str {
    match user.role {
        Role::User => "your requests",
        Role::Technician => "requests assigned to you",
        Role::Admin => "all requests",
    }
}

/// Fixed-width request table.
pub fn request_table<'a>(requests: impl Iterator<Item = &'a RepairRequest>, user: &User) {
    let show_cost = user.role.capabilities().view_cost;
    println!(
        "{:<10}  {:<32}  {:<12}  {:<8}  {:<20}{}",
        "TICKET",
        "TITLE",
        "STATUS",
        "PRIORITY",
        "ASSIGNEE",
        if show_cost { "  COST" } else { "" }
    );
    println!("{}", "-".repeat(if show_cost { 96 } else { 88 }));

    let mut any = false;
    for req in requests {
        any = true;
        let assignee = req.technician_name.as_deref().unwrap_or("-");
        let cost = if show_cost {
            format!("  {}", req.actual_cost.map(money).unwrap_or_else(|| "-".to_string()))
        } else {
            String::new()
        };
        println!(
            "{:<10}  {:<32}  {:<12}  {:<8}  {:<20}{}",
            truncate(&req.ticket_number, 10),
            truncate(&req.title, 32),
            req.status.label(),
            req.priority.as_str(),
            truncate(assignee, 20),
            cost
        );
    }
    if !any {
        println!("(no requests)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long request title", 10), "a very ...");
    }

    #[test]
    fn test_money() {
        assert_eq!(money(1250.5), "1250.50");
        assert_eq!(money(0.0), "0.00");
    }
}
