//! Command-line interface for fixdesk.
//!
//! Every view of the ticketing dashboard maps to a subcommand here:
//! `dashboard` and `requests` for the day-to-day flow, `users`,
//! `categories`, `settings` and `reports` for the admin surface. Each
//! mutating command follows the same protocol: call the endpoint, refresh
//! the full snapshot on success, surface a notification.

mod admin;
mod render;
mod requests;
mod reports;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::api::ApiClient;
use crate::config::Config;
use crate::domain::Role;
use crate::notify::NotificationCenter;
use crate::session::{Session, SessionStore};
use crate::store::Workspace;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "fixdesk")]
#[command(author, version, about = "A command-line client for maintenance repair ticketing", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "fixdesk.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Backend API URL (overrides the config file)
    #[arg(long, env = "FIXDESK_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and persist the session token
    Login {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Password (can also be set via FIXDESK_PASSWORD)
        #[arg(short, long, env = "FIXDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Drop the persisted session token
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Check whether the backend is reachable
    Health,

    /// Show the dashboard: counters and recent requests
    Dashboard,

    /// Repair request commands
    #[command(subcommand)]
    Requests(requests::RequestsCommands),

    /// Attachment commands
    #[command(subcommand)]
    Attachments(requests::AttachmentsCommands),

    /// User management (admin)
    #[command(subcommand)]
    Users(admin::UsersCommands),

    /// Category management (admin)
    #[command(subcommand)]
    Categories(admin::CategoriesCommands),

    /// System settings (admin)
    #[command(subcommand)]
    Settings(admin::SettingsCommands),

    /// Reports and CSV export (admin)
    #[command(subcommand)]
    Reports(reports::ReportsCommands),
}

/// Everything a command handler needs: the configured client, the token
/// store and the notification center the handler reports through.
pub struct App {
    pub client: ApiClient,
    pub store: SessionStore,
    pub notices: NotificationCenter,
}

impl App {
    pub fn new(cli: &Cli, config: &Config) -> App {
        let mut api = config.api.clone();
        if let Some(url) = &cli.api_url {
            api.base_url = url.clone();
        }
        App {
            client: ApiClient::new(&api),
            store: SessionStore::new(&config.session.token_file),
            notices: NotificationCenter::new(),
        }
    }

    /// Resume the persisted session or explain how to log in.
    pub async fn session(&mut self) -> Result<Session> {
        Session::resume(&mut self.client, &self.store)
            .await
            .map_err(|err| {
                if err.is_auth() {
                    anyhow::anyhow!("{}. Use `fixdesk login` to authenticate.", err)
                } else {
                    anyhow::Error::from(err).context("Failed to reach the backend")
                }
            })
    }

    /// Refresh the snapshot after a successful mutation. A failed refresh
    /// leaves stale data on screen; report it but do not fail the command.
    pub async fn reload(&mut self, session: &Session) -> Option<Workspace> {
        match Workspace::refresh(&self.client, session).await {
            Ok(workspace) => Some(workspace),
            Err(err) => {
                self.notices.info(format!(
                    "saved, but reloading data failed ({}); the view may be stale",
                    err
                ));
                None
            }
        }
    }

    /// Print collected notifications and fold errors into the exit status.
    pub fn finish(mut self) -> Result<()> {
        let had_errors = self.notices.has_errors();
        for notice in self.notices.drain() {
            match notice.kind {
                crate::notify::Kind::Error => eprintln!("{} {}", notice.kind.tag(), notice.message),
                _ => println!("{} {}", notice.kind.tag(), notice.message),
            }
        }
        if had_errors {
            bail!("command finished with errors");
        }
        Ok(())
    }
}

/// Fail unless the session belongs to an admin.
pub fn require_admin(session: &Session) -> Result<()> {
    if session.user.role != Role::Admin {
        bail!(
            "this command requires the admin role (you are logged in as {}); the backend enforces this as well",
            session.user.role
        );
    }
    Ok(())
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, config: &Config) -> Result<()> {
    let mut app = App::new(cli, config);
    match &cli.command {
        Commands::Login { username, password } => cmd_login(&mut app, username, password).await?,
        Commands::Logout => cmd_logout(&mut app)?,
        Commands::Whoami => cmd_whoami(&mut app).await?,
        Commands::Health => cmd_health(&app).await?,
        Commands::Dashboard => cmd_dashboard(&mut app).await?,
        Commands::Requests(cmd) => requests::run(&mut app, cmd).await?,
        Commands::Attachments(cmd) => requests::run_attachments(&mut app, cmd).await?,
        Commands::Users(cmd) => admin::run_users(&mut app, cmd).await?,
        Commands::Categories(cmd) => admin::run_categories(&mut app, cmd).await?,
        Commands::Settings(cmd) => admin::run_settings(&mut app, cmd).await?,
        Commands::Reports(cmd) => reports::run(&mut app, cmd).await?,
    }
    app.finish()
}

async fn cmd_login(app: &mut App, username: &str, password: &str) -> Result<()> {
    let session = Session::login(&mut app.client, &app.store, username, password)
        .await
        .context("Login failed")?;
    println!(
        "Logged in as {} ({})",
        session.user.full_name,
        session.user.role.label()
    );
    app.notices.success("session saved");
    Ok(())
}

fn cmd_logout(app: &mut App) -> Result<()> {
    Session::logout(&mut app.client, &app.store)?;
    println!("Logged out.");
    Ok(())
}

async fn cmd_whoami(app: &mut App) -> Result<()> {
    let session = app.session().await?;
    let user = &session.user;
    println!("{} <{}>", user.full_name, user.email);
    println!("Username:   {}", user.username);
    println!("Role:       {}", user.role.label());
    if let Some(department) = &user.department {
        println!("Department: {}", department);
    }
    println!(
        "Account:    {}",
        if user.is_active { "active" } else { "disabled" }
    );
    Ok(())
}

async fn cmd_health(app: &App) -> Result<()> {
    println!("Checking {}...", app.client.base_url());
    if app.client.health().await {
        println!("[OK] backend is reachable");
        Ok(())
    } else {
        bail!("backend did not answer the health check")
    }
}

async fn cmd_dashboard(app: &mut App) -> Result<()> {
    let session = app.session().await?;
    let workspace = Workspace::refresh(&app.client, &session)
        .await
        .context("Failed to load dashboard data")?;

    let stats = &workspace.stats;
    println!();
    println!("=== Dashboard ({}) ===", render::scope_line(&session.user));
    println!();
    println!("  Total:        {}", stats.total);
    println!("  Pending:      {}", stats.pending);
    println!("  In progress:  {}", stats.in_progress);
    println!("  Completed:    {}", stats.completed);
    println!("  Urgent:       {}", stats.urgent);

    if session.user.role.capabilities().view_cost && stats.total_cost > 0.0 {
        println!();
        println!("  Actual cost to date: {}", render::money(stats.total_cost));
    }

    println!();
    println!("Recent requests:");
    render::request_table(workspace.requests.iter().take(6), &session.user);
    Ok(())
}
