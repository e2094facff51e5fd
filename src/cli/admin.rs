//! Admin-only commands: users, categories and system settings.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use std::str::FromStr;

use crate::cli::{render, require_admin, App};
use crate::domain::category::CategoryPayload;
use crate::domain::settings::KNOWN_KEYS;
use crate::domain::user::{NewUser, UpdateUser};
use crate::domain::{Category, Role, User};

#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// List user accounts
    List {
        /// Filter by role (user, technician, admin)
        #[arg(long)]
        role: Option<String>,
        /// Show only active (or, with =false, disabled) accounts
        #[arg(long)]
        active: Option<bool>,
        /// Match against username, full name or email
        #[arg(long)]
        search: Option<String>,
    },

    /// Create a user account
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// Initial password (can also be set via FIXDESK_NEW_PASSWORD)
        #[arg(long, env = "FIXDESK_NEW_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        phone: Option<String>,
        /// user, technician or admin (immutable after creation)
        #[arg(long, default_value = "user")]
        role: String,
        #[arg(long)]
        department: Option<String>,
    },

    /// Edit a user account (username and role cannot change)
    Edit {
        /// User id or username
        user: String,
        #[arg(long)]
        email: Option<String>,
        /// New password
        #[arg(long, env = "FIXDESK_NEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },

    /// Re-enable a disabled account
    Activate {
        /// User id or username
        user: String,
    },

    /// Disable an account (accounts are never deleted)
    Deactivate {
        /// User id or username
        user: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoriesCommands {
    /// List repair categories
    List,

    /// Create a category
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Rename or re-describe a category
    Edit {
        /// Category id or name
        category: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a category
    Delete {
        /// Category id or name
        category: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the current settings
    Show,

    /// Set one setting and save the whole map back
    Set {
        /// Setting key, e.g. company_name or max_file_size
        key: String,
        /// New value
        value: String,
    },
}

// -------------------------------------------------------------------------
// Users
// -------------------------------------------------------------------------

pub async fn run_users(app: &mut App, cmd: &UsersCommands) -> Result<()> {
    let session = app.session().await?;
    require_admin(&session)?;

    match cmd {
        UsersCommands::List {
            role,
            active,
            search,
        } => {
            let role = role
                .as_deref()
                .map(Role::from_str)
                .transpose()
                .map_err(anyhow::Error::msg)?;
            let users = app.client.list_users().await.context("Failed to load users")?;
            let filtered: Vec<&User> = users
                .iter()
                .filter(|u| role.map_or(true, |r| u.role == r))
                .filter(|u| active.map_or(true, |a| u.is_active == a))
                .filter(|u| {
                    search.as_deref().map_or(true, |term| {
                        let term = term.to_lowercase();
                        u.username.to_lowercase().contains(&term)
                            || u.full_name.to_lowercase().contains(&term)
                            || u.email.to_lowercase().contains(&term)
                    })
                })
                .collect();

            println!(
                "{:<5}  {:<16}  {:<24}  {:<12}  {:<8}  {}",
                "ID", "USERNAME", "NAME", "ROLE", "ACTIVE", "EMAIL"
            );
            println!("{}", "-".repeat(88));
            for user in &filtered {
                println!(
                    "{:<5}  {:<16}  {:<24}  {:<12}  {:<8}  {}",
                    user.id,
                    render::truncate(&user.username, 16),
                    render::truncate(&user.full_name, 24),
                    user.role.label(),
                    if user.is_active { "yes" } else { "no" },
                    user.email
                );
            }
            println!();
            println!("{} of {} accounts", filtered.len(), users.len());
            Ok(())
        }

        UsersCommands::Add {
            username,
            email,
            password,
            full_name,
            phone,
            role,
            department,
        } => {
            let role = Role::from_str(role).map_err(anyhow::Error::msg)?;
            let new_user = NewUser {
                username: username.clone(),
                email: email.clone(),
                password: password.clone(),
                full_name: full_name.clone(),
                phone: phone.clone(),
                role,
                department: department.clone(),
            };
            app.client
                .create_user(&new_user)
                .await
                .with_context(|| format!("Failed to create user {}", username))?;
            app.notices.success(format!("user {} created", username));
            Ok(())
        }

        UsersCommands::Edit {
            user,
            email,
            password,
            full_name,
            phone,
            department,
        } => {
            if email.is_none()
                && password.is_none()
                && full_name.is_none()
                && phone.is_none()
                && department.is_none()
            {
                bail!("nothing to update; pass at least one field flag");
            }
            let target = resolve_user(app, user).await?;
            let update = UpdateUser {
                email: email.clone(),
                password: password.clone(),
                full_name: full_name.clone(),
                phone: phone.clone(),
                department: department.clone(),
                is_active: None,
            };
            app.client
                .update_user(target.id, &update)
                .await
                .with_context(|| format!("Failed to update user {}", target.username))?;
            app.notices.success(format!("user {} updated", target.username));
            Ok(())
        }

        UsersCommands::Activate { user } => set_active(app, user, true).await,
        UsersCommands::Deactivate { user } => set_active(app, user, false).await,
    }
}

async fn resolve_user(app: &App, key: &str) -> Result<User> {
    let users = app.client.list_users().await.context("Failed to load users")?;
    users
        .into_iter()
        .find(|u| {
            key.parse::<i64>().map_or(false, |id| u.id == id)
                || u.username.eq_ignore_ascii_case(key)
        })
        .with_context(|| format!("No user matches '{}'", key))
}

async fn set_active(app: &mut App, key: &str, active: bool) -> Result<()> {
    let target = resolve_user(app, key).await?;
    let update = UpdateUser {
        is_active: Some(active),
        ..Default::default()
    };
    app.client
        .update_user(target.id, &update)
        .await
        .with_context(|| format!("Failed to update user {}", target.username))?;
    app.notices.success(format!(
        "user {} {}",
        target.username,
        if active { "activated" } else { "deactivated" }
    ));
    Ok(())
}

// -------------------------------------------------------------------------
// Categories
// -------------------------------------------------------------------------

pub async fn run_categories(app: &mut App, cmd: &CategoriesCommands) -> Result<()> {
    let session = app.session().await?;
    require_admin(&session)?;

    match cmd {
        CategoriesCommands::List => {
            let categories = app
                .client
                .list_categories()
                .await
                .context("Failed to load categories")?;
            if categories.is_empty() {
                println!("No categories.");
            }
            for category in &categories {
                println!(
                    "{:<5}  {:<24}  {}",
                    category.id,
                    render::truncate(&category.name, 24),
                    category.description.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }

        CategoriesCommands::Add { name, description } => {
            let payload = CategoryPayload {
                name: name.clone(),
                description: description.clone(),
            };
            app.client
                .create_category(&payload)
                .await
                .with_context(|| format!("Failed to create category {}", name))?;
            app.notices.success(format!("category {} created", name));
            Ok(())
        }

        CategoriesCommands::Edit {
            category,
            name,
            description,
        } => {
            let target = resolve_category(app, category).await?;
            let payload = CategoryPayload {
                name: name.clone().unwrap_or_else(|| target.name.clone()),
                description: description.clone().or_else(|| target.description.clone()),
            };
            app.client
                .update_category(target.id, &payload)
                .await
                .with_context(|| format!("Failed to update category {}", target.name))?;
            app.notices.success(format!("category {} updated", payload.name));
            Ok(())
        }

        CategoriesCommands::Delete { category } => {
            let target = resolve_category(app, category).await?;
            app.client
                .delete_category(target.id)
                .await
                .with_context(|| format!("Failed to delete category {}", target.name))?;
            app.notices.success(format!("category {} deleted", target.name));
            Ok(())
        }
    }
}

async fn resolve_category(app: &App, key: &str) -> Result<Category> {
    let categories = app
        .client
        .list_categories()
        .await
        .context("Failed to load categories")?;
    categories
        .into_iter()
        .find(|c| {
            key.parse::<i64>().map_or(false, |id| c.id == id)
                || c.name.eq_ignore_ascii_case(key)
        })
        .with_context(|| format!("No category matches '{}'", key))
}

// -------------------------------------------------------------------------
// Settings
// -------------------------------------------------------------------------

pub async fn run_settings(app: &mut App, cmd: &SettingsCommands) -> Result<()> {
    let session = app.session().await?;
    require_admin(&session)?;

    match cmd {
        SettingsCommands::Show => {
            let settings = app
                .client
                .get_settings()
                .await
                .context("Failed to load settings")?;
            for (key, value) in settings.iter() {
                println!("{:<24} = {}", key, value);
            }
            Ok(())
        }

        SettingsCommands::Set { key, value } => {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                app.notices.info(format!(
                    "'{}' is not a known setting key; saving it anyway",
                    key
                ));
            }
            // Read-modify-write: the save carries the whole flattened map.
            let mut settings = app
                .client
                .get_settings()
                .await
                .context("Failed to load settings")?;
            settings.set(key.clone(), value.clone());
            app.client
                .update_settings(&settings)
                .await
                .context("Failed to save settings")?;
            app.notices.success(format!("{} = {}", key, value));
            Ok(())
        }
    }
}
