//! Repair request and attachment commands.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cli::{render, App};
use crate::domain::{
    NewRepairRequest, Priority, RepairRequest, RequestStatus, Role, UpdateRepairRequest,
};
use crate::session::Session;
use crate::store::Workspace;

#[derive(Subcommand, Debug)]
pub enum RequestsCommands {
    /// List visible requests, with optional client-side filters
    List {
        /// Filter by status (pending, assigned, in_progress, completed, cancelled)
        #[arg(long)]
        status: Option<String>,
        /// Filter by priority (normal, high, urgent)
        #[arg(long)]
        priority: Option<String>,
        /// Match against title, ticket number or location
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one request with its comments and attachments
    Show {
        /// Request id or ticket number
        request: String,
    },

    /// File a new repair request
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Category id or name
        #[arg(long)]
        category: Option<String>,
        /// normal, high or urgent
        #[arg(long, default_value = "normal")]
        priority: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        contact_phone: Option<String>,
    },

    /// Update status, assignment or costs
    Update {
        /// Request id or ticket number
        request: String,
        /// New status
        #[arg(long)]
        status: Option<String>,
        /// Assign a technician by id, username or name (admin)
        #[arg(long)]
        assign: Option<String>,
        /// Clear the assignment (admin)
        #[arg(long, conflicts_with = "assign")]
        unassign: bool,
        /// Estimated cost (admin)
        #[arg(long)]
        estimated_cost: Option<f64>,
        /// Actual cost (technician)
        #[arg(long)]
        actual_cost: Option<f64>,
        /// Add a work comment along with the update
        #[arg(long)]
        comment: Option<String>,
    },

    /// Add a work comment
    Comment {
        /// Request id or ticket number
        request: String,
        /// Comment text
        text: String,
    },

    /// Delete a request (admin)
    Delete {
        /// Request id or ticket number
        request: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum AttachmentsCommands {
    /// List attachments on a request
    List {
        /// Request id or ticket number
        request: String,
    },

    /// Upload a file to a request (technician)
    Upload {
        /// Request id or ticket number
        request: String,
        /// File to upload
        file: PathBuf,
    },

    /// Delete an attachment by id (technician or admin)
    Delete {
        /// Attachment id
        id: i64,
    },
}

pub async fn run(app: &mut App, cmd: &RequestsCommands) -> Result<()> {
    let session = app.session().await?;
    match cmd {
        RequestsCommands::List {
            status,
            priority,
            search,
        } => cmd_list(app, &session, status.as_deref(), priority.as_deref(), search.as_deref()).await,
        RequestsCommands::Show { request } => cmd_show(app, &session, request).await,
        RequestsCommands::New {
            title,
            description,
            category,
            priority,
            location,
            contact_phone,
        } => {
            cmd_new(
                app,
                &session,
                title,
                description,
                category.as_deref(),
                priority,
                location,
                contact_phone.clone(),
            )
            .await
        }
        RequestsCommands::Update {
            request,
            status,
            assign,
            unassign,
            estimated_cost,
            actual_cost,
            comment,
        } => {
            cmd_update(
                app,
                &session,
                request,
                status.as_deref(),
                assign.as_deref(),
                *unassign,
                *estimated_cost,
                *actual_cost,
                comment.as_deref(),
            )
            .await
        }
        RequestsCommands::Comment { request, text } => cmd_comment(app, &session, request, text).await,
        RequestsCommands::Delete { request, yes } => cmd_delete(app, &session, request, *yes).await,
    }
}

/// Resolve a request argument (id or ticket number) to its numeric id,
/// scoped to what the user can see.
async fn resolve_request(
    app: &App,
    session: &Session,
    key: &str,
) -> Result<(Workspace, i64)> {
    let workspace = Workspace::refresh(&app.client, session)
        .await
        .context("Failed to load requests")?;
    let id = workspace
        .find_request(key)
        .map(|req| req.id)
        .with_context(|| format!("No visible request matches '{}'", key))?;
    Ok((workspace, id))
}

async fn cmd_list(
    app: &mut App,
    session: &Session,
    status: Option<&str>,
    priority: Option<&str>,
    search: Option<&str>,
) -> Result<()> {
    let status = status.map(RequestStatus::from_str).transpose().map_err(anyhow::Error::msg)?;
    let priority = priority.map(Priority::from_str).transpose().map_err(anyhow::Error::msg)?;

    let workspace = Workspace::refresh(&app.client, session)
        .await
        .context("Failed to load requests")?;

    let filtered: Vec<&RepairRequest> = workspace
        .requests
        .iter()
        .filter(|req| status.map_or(true, |s| req.status == s))
        .filter(|req| priority.map_or(true, |p| req.priority == p))
        .filter(|req| search.map_or(true, |term| req.matches_search(term)))
        .collect();

    println!();
    println!(
        "Showing {} of {} ({})",
        filtered.len(),
        workspace.requests.len(),
        render::scope_line(&session.user)
    );
    println!();
    render::request_table(filtered.into_iter(), &session.user);
    Ok(())
}

async fn cmd_show(app: &mut App, session: &Session, request: &str) -> Result<()> {
    let (_, id) = resolve_request(app, session, request).await?;
    let detail = app
        .client
        .get_request(id)
        .await
        .with_context(|| format!("Failed to load request {}", id))?;
    let caps = session.user.role.capabilities();
    let req = &detail.request;

    println!();
    println!("{}  #{}", req.title, req.ticket_number);
    println!("{}", "-".repeat(60));
    println!("Status:      {}", req.status.label());
    println!("Priority:    {}", req.priority.label());
    if let Some(category) = &req.category_name {
        println!("Category:    {}", category);
    }
    println!("Location:    {}", req.location);
    if let Some(phone) = &req.contact_phone {
        println!("Contact:     {}", phone);
    }
    println!(
        "Requester:   {}",
        req.requester_name.as_deref().unwrap_or("-")
    );
    if session.user.role != Role::User {
        println!(
            "Assignee:    {}",
            req.technician_name.as_deref().unwrap_or("(unassigned)")
        );
    }
    println!("Created:     {}", req.created_at);

    if caps.view_cost {
        println!();
        println!(
            "Estimated cost: {}",
            req.estimated_cost.map(render::money).unwrap_or_else(|| "-".to_string())
        );
        println!(
            "Actual cost:    {}",
            req.actual_cost.map(render::money).unwrap_or_else(|| "-".to_string())
        );
        if let (Some(estimated), Some(actual)) = (req.estimated_cost, req.actual_cost) {
            let diff = actual - estimated;
            if diff.abs() > f64::EPSILON {
                println!(
                    "Variance:       {} ({})",
                    render::money(diff.abs()),
                    if diff > 0.0 { "over" } else { "under" }
                );
            }
        }
    }

    println!();
    println!("Description:");
    println!("  {}", req.description.replace('\n', "\n  "));

    println!();
    println!("Activity:");
    if detail.comments.is_empty() {
        println!("  (no comments)");
    }
    for comment in &detail.comments {
        println!(
            "  [{}] {}: {}",
            comment.created_at,
            comment.user_name.as_deref().unwrap_or("?"),
            comment.comment
        );
    }

    // Attachments are a technician/admin surface in the dashboard.
    if session.user.role != Role::User {
        let attachments = app
            .client
            .list_attachments(id)
            .await
            .context("Failed to load attachments")?;
        println!();
        println!("Attachments:");
        if attachments.is_empty() {
            println!("  (none)");
        }
        for att in &attachments {
            println!(
                "  #{} {} ({}) uploaded by {}",
                att.id,
                att.file_name,
                att.size_display(),
                att.uploader_name.as_deref().unwrap_or("?")
            );
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_new(
    app: &mut App,
    session: &Session,
    title: &str,
    description: &str,
    category: Option<&str>,
    priority: &str,
    location: &str,
    contact_phone: Option<String>,
) -> Result<()> {
    // Technicians work tickets, they do not file them.
    if session.user.role == Role::Technician {
        bail!("technicians cannot file new requests; ask a requester or an admin");
    }
    let priority = Priority::from_str(priority).map_err(anyhow::Error::msg)?;

    let workspace = Workspace::refresh(&app.client, session)
        .await
        .context("Failed to load categories")?;
    let category_id = match category {
        Some(key) => Some(resolve_category(&workspace, key)?),
        None => None,
    };

    let new_request = NewRepairRequest {
        title: title.to_string(),
        description: description.to_string(),
        category_id,
        priority,
        location: location.to_string(),
        contact_phone,
    };

    match app.client.create_request(&new_request).await {
        Ok(()) => {
            app.notices.success("repair request submitted");
            if let Some(workspace) = app.reload(session).await {
                println!();
                render::request_table(workspace.requests.iter().take(6), &session.user);
            }
            Ok(())
        }
        Err(err) => {
            app.notices.error(format!("could not submit request: {}", err));
            Ok(())
        }
    }
}

fn resolve_category(workspace: &Workspace, key: &str) -> Result<i64> {
    if let Ok(id) = key.parse::<i64>() {
        if workspace.categories.iter().any(|c| c.id == id) {
            return Ok(id);
        }
    }
    workspace
        .categories
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(key))
        .map(|c| c.id)
        .with_context(|| format!("No category matches '{}'", key))
}

#[allow(clippy::too_many_arguments)]
async fn cmd_update(
    app: &mut App,
    session: &Session,
    request: &str,
    status: Option<&str>,
    assign: Option<&str>,
    unassign: bool,
    estimated_cost: Option<f64>,
    actual_cost: Option<f64>,
    comment: Option<&str>,
) -> Result<()> {
    let caps = session.user.role.capabilities();

    if status.is_some() && !caps.edit_status {
        bail!("your role cannot change request status; the backend enforces this as well");
    }
    if (assign.is_some() || unassign) && !caps.assign_technician {
        bail!("only admins can assign technicians; the backend enforces this as well");
    }
    if estimated_cost.is_some() && !caps.edit_estimated_cost {
        bail!("only admins can edit the estimated cost");
    }
    if actual_cost.is_some() && !caps.edit_actual_cost {
        bail!("only technicians can edit the actual cost");
    }
    if comment.is_some() && session.user.role == Role::User {
        bail!("your role cannot add work comments");
    }

    let status = status.map(RequestStatus::from_str).transpose().map_err(anyhow::Error::msg)?;
    let (workspace, id) = resolve_request(app, session, request).await?;

    let assigned_to = if unassign {
        Some(None)
    } else if let Some(key) = assign {
        let tech = workspace
            .find_technician(key)
            .with_context(|| format!("No technician matches '{}'", key))?;
        Some(Some(tech.id))
    } else {
        None
    };

    let update = UpdateRepairRequest {
        status,
        assigned_to,
        estimated_cost,
        actual_cost,
    };
    if update.is_empty() && comment.is_none() {
        bail!("nothing to update; pass at least one of --status/--assign/--unassign/--estimated-cost/--actual-cost/--comment");
    }

    if !update.is_empty() {
        app.client
            .update_request(id, &update)
            .await
            .context("Failed to update request")?;
        // The comment rides along with the save; if only the comment fails
        // the save still counts, downgraded to a partial-success notice.
        if let Some(text) = comment {
            if let Err(err) = app.client.add_comment(id, text).await {
                tracing::error!(error = %err, request = id, "comment save failed");
                app.notices.push_inline(
                    crate::notify::Kind::Info,
                    "changes saved, but the comment could not be added",
                );
            }
        }
    } else if let Some(text) = comment {
        app.client
            .add_comment(id, text)
            .await
            .context("Failed to add comment")?;
    }

    app.notices.success("changes saved");
    if let Some(workspace) = app.reload(session).await {
        if let Some(req) = workspace.requests.iter().find(|r| r.id == id) {
            println!();
            render::request_table(std::iter::once(req), &session.user);
        }
    }
    Ok(())
}

async fn cmd_comment(app: &mut App, session: &Session, request: &str, text: &str) -> Result<()> {
    if session.user.role == Role::User {
        bail!("your role cannot add work comments");
    }
    let (_, id) = resolve_request(app, session, request).await?;
    app.client
        .add_comment(id, text)
        .await
        .context("Failed to add comment")?;
    app.notices.success("comment added");
    Ok(())
}

async fn cmd_delete(app: &mut App, session: &Session, request: &str, yes: bool) -> Result<()> {
    if session.user.role != Role::Admin {
        bail!("only admins can delete requests; the backend enforces this as well");
    }
    if !yes {
        bail!("refusing to delete without --yes");
    }
    let (_, id) = resolve_request(app, session, request).await?;
    app.client
        .delete_request(id)
        .await
        .context("Failed to delete request")?;
    app.notices.success("request deleted");
    app.reload(session).await;
    Ok(())
}

// -------------------------------------------------------------------------
// Attachments
// -------------------------------------------------------------------------

pub async fn run_attachments(app: &mut App, cmd: &AttachmentsCommands) -> Result<()> {
    let session = app.session().await?;
    match cmd {
        AttachmentsCommands::List { request } => {
            let (_, id) = resolve_request(app, &session, request).await?;
            let attachments = app
                .client
                .list_attachments(id)
                .await
                .context("Failed to load attachments")?;
            if attachments.is_empty() {
                println!("No attachments.");
            }
            for att in &attachments {
                println!(
                    "#{:<5} {:<32} {:>10}  {}",
                    att.id,
                    render::truncate(&att.file_name, 32),
                    att.size_display(),
                    att.uploader_name.as_deref().unwrap_or("?")
                );
            }
            Ok(())
        }
        AttachmentsCommands::Upload { request, file } => {
            let caps = session.user.role.capabilities();
            if !caps.upload_file {
                bail!("your role cannot upload files; the backend enforces this as well");
            }
            let (_, id) = resolve_request(app, &session, request).await?;
            app.client
                .upload_attachment(id, file)
                .await
                .with_context(|| format!("Failed to upload {}", file.display()))?;
            app.notices.success("file uploaded");
            Ok(())
        }
        AttachmentsCommands::Delete { id } => {
            let caps = session.user.role.capabilities();
            if !caps.delete_file {
                bail!("your role cannot delete files; the backend enforces this as well");
            }
            app.client
                .delete_attachment(*id)
                .await
                .context("Failed to delete attachment")?;
            app.notices.success("file deleted");
            Ok(())
        }
    }
}
