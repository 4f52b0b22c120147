//! Renova daemon for background task processing.
//!
//! This daemon runs scheduled tasks in the background, allowing:
//! - Scheduled publication of projects, listings and editorials
//! - Instagram feed cache refreshes
//! - Orphaned media sweeps
//!
//! The daemon communicates with the admin CLI via the shared SQLite
//! database.
//!
//! ## Usage
//!
//! ```bash
//! renova-daemon              # Run in foreground
//! renova-daemon --once       # Process pending tasks once and exit
//! ```
//!
//! ## systemd Service
//!
//! Install the service file and enable:
//! ```bash
//! sudo cp renova.service /etc/systemd/system/
//! sudo systemctl enable --now renova
//! ```

use anyhow::{Context, Result};
use chrono::{Local, NaiveTime};
use rusqlite::Connection;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};
use walkdir::WalkDir;

/// Daemon configuration
struct DaemonConfig {
    /// Poll interval for checking new tasks (seconds)
    poll_interval: u64,
    /// Run once and exit
    once: bool,
    /// Config path override
    config_path: Option<PathBuf>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval: 60,
            once: false,
            config_path: None,
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let daemon_config = parse_args();

    // Initialize logging
    init_logging()?;

    info!("Renova daemon starting...");

    // Load application config
    let config = load_config(&daemon_config)?;
    info!("Config loaded");

    // Open database
    let db = open_database(config.db_path())?;
    info!("Database opened at {:?}", config.db_path());

    // Main loop
    if daemon_config.once {
        info!("Running in single-shot mode");
        process_pending_tasks(&db, &config)?;
    } else {
        info!(
            "Running in daemon mode, polling every {} seconds",
            daemon_config.poll_interval
        );
        run_daemon_loop(&db, &config, daemon_config.poll_interval)?;
    }

    info!("Renova daemon stopped");
    Ok(())
}

fn parse_args() -> DaemonConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = DaemonConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--once" | "-1" => {
                config.once = true;
            }
            "--interval" | "-i" => {
                if i + 1 < args.len() {
                    if let Ok(interval) = args[i + 1].parse() {
                        config.poll_interval = interval;
                    }
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    config
}

fn print_help() {
    println!(
        r#"renova-daemon - Background task processor for Renova

USAGE:
    renova-daemon [OPTIONS]

OPTIONS:
    --once, -1          Process pending tasks once and exit
    --interval, -i N    Poll interval in seconds (default: 60)
    --config, -c PATH   Path to config file
    --help, -h          Show this help message

ENVIRONMENT:
    RENOVA_CONFIG       Path to config file (overrides default location)
    RUST_LOG            Log level (trace, debug, info, warn, error)

The daemon processes scheduled tasks stored in the database:
  - Scheduled publication of projects, listings and editorials
  - Instagram feed cache refreshes
  - Orphaned media sweeps

Install as systemd service:
    sudo cp renova.service /etc/systemd/system/
    sudo systemctl enable --now renova
"#
    );
}

fn init_logging() -> Result<()> {
    use tracing_subscriber::prelude::*;

    // Try to use journald on Linux
    #[cfg(target_os = "linux")]
    {
        if let Ok(journald_layer) = tracing_journald::layer() {
            let subscriber = tracing_subscriber::registry()
                .with(journald_layer)
                .with(tracing_subscriber::filter::EnvFilter::new(
                    std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
                ));
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set tracing subscriber")?;
            return Ok(());
        }
    }

    // Fall back to stderr
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    Ok(())
}

fn config_path() -> PathBuf {
    // Check environment variable
    if let Ok(path) = std::env::var("RENOVA_CONFIG") {
        return PathBuf::from(path);
    }

    // Default config location
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("renova")
        .join("config.toml")
}

/// Application config (subset needed by daemon)
#[derive(Debug, Clone, Deserialize, Default)]
struct AppConfig {
    #[serde(default)]
    database: DatabaseConfig,

    #[serde(default)]
    storage: StorageConfig,

    #[serde(default)]
    instagram: InstagramConfig,

    #[serde(default)]
    schedule: ScheduleConfig,
}

impl AppConfig {
    /// Get the database path (SQLite)
    fn db_path(&self) -> &PathBuf {
        &self.database.sqlite_path
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    sqlite_path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct StorageConfig {
    #[serde(default = "default_media_root")]
    media_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            media_root: default_media_root(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct InstagramConfig {
    #[serde(default = "default_instagram_api_base")]
    api_base: String,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default = "default_feed_limit")]
    feed_limit: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ScheduleConfig {
    #[serde(default)]
    default_hours_start: Option<u8>,
    #[serde(default)]
    default_hours_end: Option<u8>,
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("renova")
        .join("renova.db")
}

fn default_media_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("renova")
        .join("media")
}

fn default_instagram_api_base() -> String {
    "https://graph.instagram.com".to_string()
}

fn default_feed_limit() -> usize {
    12
}

fn load_config(daemon_config: &DaemonConfig) -> Result<AppConfig> {
    let path = daemon_config.config_path.clone().unwrap_or_else(config_path);

    if path.exists() {
        let content = std::fs::read_to_string(&path).context("Failed to read config file")?;
        let config: AppConfig = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    } else {
        warn!("Config file not found at {:?}, using defaults", path);
        Ok(AppConfig::default())
    }
}

fn open_database(path: &PathBuf) -> Result<Connection> {
    let conn = Connection::open(path).context("Failed to open database")?;
    conn.pragma_update(None, "foreign_keys", true)
        .context("Failed to enable foreign keys")?;
    Ok(conn)
}

fn run_daemon_loop(db: &Connection, config: &AppConfig, poll_interval: u64) -> Result<()> {
    loop {
        // Check if we should process (based on hours of operation)
        if within_hours(
            config.schedule.default_hours_start,
            config.schedule.default_hours_end,
        ) {
            if let Err(e) = process_pending_tasks(db, config) {
                error!("Error processing tasks: {}", e);
            }
        } else {
            info!("Outside hours of operation, skipping this cycle");
        }

        // Sleep until next poll
        thread::sleep(Duration::from_secs(poll_interval));
    }
}

/// Hours-of-operation window check. No window configured means always
/// on; a start after the end is an overnight window (22:00 - 06:00).
fn within_hours(start: Option<u8>, end: Option<u8>) -> bool {
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        _ => return true,
    };

    let now = Local::now().time();
    let start_time = NaiveTime::from_hms_opt(start as u32, 0, 0).unwrap_or(NaiveTime::MIN);
    let end_time = NaiveTime::from_hms_opt(end as u32, 0, 0).unwrap_or(NaiveTime::MIN);

    if start <= end {
        now >= start_time && now < end_time
    } else {
        now >= start_time || now < end_time
    }
}

fn process_pending_tasks(db: &Connection, config: &AppConfig) -> Result<()> {
    // Get pending tasks ordered by scheduled time
    let mut stmt = db.prepare(
        r#"
        SELECT id, task_type, target, scheduled_at, hours_start, hours_end
        FROM scheduled_tasks
        WHERE status = 'pending'
          AND datetime(scheduled_at) <= datetime('now')
        ORDER BY scheduled_at ASC
        LIMIT 10
        "#,
    )?;

    let tasks: Vec<PendingTask> = stmt
        .query_map([], |row| {
            Ok(PendingTask {
                id: row.get(0)?,
                task_type: row.get(1)?,
                target: row.get(2)?,
                hours_start: row.get::<_, Option<i64>>(4)?.map(|v| v as u8),
                hours_end: row.get::<_, Option<i64>>(5)?.map(|v| v as u8),
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    if tasks.is_empty() {
        info!("No pending tasks");
        return Ok(());
    }

    info!("Found {} pending task(s)", tasks.len());

    for task in tasks {
        // Check task-specific hours of operation
        if !within_hours(task.hours_start, task.hours_end) {
            info!("Task {} outside its hours of operation, skipping", task.id);
            continue;
        }

        info!("Processing task {} ({})", task.id, task.task_type);

        // Mark as running
        db.execute(
            "UPDATE scheduled_tasks SET status = 'running', started_at = CURRENT_TIMESTAMP WHERE id = ?",
            [task.id],
        )?;

        // Execute the task
        let result = execute_task(&task, config, db);

        // Update status based on result
        match result {
            Ok(()) => {
                info!("Task {} completed successfully", task.id);
                db.execute(
                    "UPDATE scheduled_tasks SET status = 'completed', completed_at = CURRENT_TIMESTAMP WHERE id = ?",
                    [task.id],
                )?;
            }
            Err(e) => {
                error!("Task {} failed: {}", task.id, e);
                db.execute(
                    "UPDATE scheduled_tasks SET status = 'failed', error_message = ?, completed_at = CURRENT_TIMESTAMP WHERE id = ?",
                    rusqlite::params![e.to_string(), task.id],
                )?;
            }
        }
    }

    Ok(())
}

struct PendingTask {
    id: i64,
    task_type: String,
    target: String,
    hours_start: Option<u8>,
    hours_end: Option<u8>,
}

fn execute_task(task: &PendingTask, config: &AppConfig, db: &Connection) -> Result<()> {
    match task.task_type.as_str() {
        "Publish" => execute_publish_task(&task.target, db),
        "InstagramRefresh" => execute_instagram_refresh(config, db),
        "OrphanSweep" => execute_orphan_sweep(config, db),
        _ => {
            warn!("Unknown task type: {}", task.task_type);
            Ok(())
        }
    }
}

/// Publish the content named by a `kind:slug` target.
fn execute_publish_task(target: &str, db: &Connection) -> Result<()> {
    let (kind, slug) = target
        .split_once(':')
        .with_context(|| format!("Malformed publish target '{}'", target))?;

    let table = match kind {
        "project" => "projects",
        "listing" => "listings",
        "editorial" => "editorials",
        _ => anyhow::bail!("Unknown publish kind '{}'", kind),
    };

    let updated = db.execute(
        &format!(
            r#"
            UPDATE {}
            SET is_published = 1,
                published_at = COALESCE(published_at, CURRENT_TIMESTAMP),
                updated_at = CURRENT_TIMESTAMP
            WHERE slug = ?
            "#,
            table
        ),
        [slug],
    )?;

    if updated == 0 {
        anyhow::bail!("No {} with slug '{}'", kind, slug);
    }

    info!("Published {} '{}'", kind, slug);
    Ok(())
}

/// Fetch the Instagram feed and overwrite the cache row.
fn execute_instagram_refresh(config: &AppConfig, db: &Connection) -> Result<()> {
    let token = config
        .instagram
        .access_token
        .as_deref()
        .context("Instagram access token not configured")?;

    let url = format!(
        "{}/me/media",
        config.instagram.api_base.trim_end_matches('/')
    );
    let response: serde_json::Value = ureq::get(&url)
        .query(
            "fields",
            "id,caption,media_type,media_url,permalink,thumbnail_url,timestamp",
        )
        .query("limit", &config.instagram.feed_limit.to_string())
        .query("access_token", token)
        .call()
        .context("Failed to fetch Instagram feed")?
        .into_json()
        .context("Failed to parse Instagram feed")?;

    let posts = response["data"]
        .as_array()
        .context("No data array in Instagram response")?;
    let payload = serde_json::to_string(posts)?;

    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();
    db.execute(
        r#"
        INSERT INTO instagram_cache (id, payload, fetched_at)
        VALUES (1, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            payload = excluded.payload,
            fetched_at = excluded.fetched_at
        "#,
        rusqlite::params![payload, now],
    )?;

    info!("Cached {} Instagram post(s)", posts.len());
    Ok(())
}

/// Delete stored objects the catalog no longer references.
fn execute_orphan_sweep(config: &AppConfig, db: &Connection) -> Result<()> {
    let mut stmt = db.prepare(
        r#"
        SELECT storage_path FROM project_images WHERE storage_path IS NOT NULL
        UNION
        SELECT storage_path FROM listing_images WHERE storage_path IS NOT NULL
        "#,
    )?;
    let referenced: HashSet<String> = stmt
        .query_map([], |row| row.get(0))?
        .filter_map(|r| r.ok())
        .collect();

    let root = &config.storage.media_root;
    if !root.exists() {
        info!("Media root {:?} does not exist, nothing to sweep", root);
        return Ok(());
    }

    let mut deleted = 0usize;
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = match entry.path().strip_prefix(root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => continue,
        };
        if referenced.contains(&rel) {
            continue;
        }
        match std::fs::remove_file(entry.path()) {
            Ok(()) => deleted += 1,
            Err(e) => warn!("Failed to delete orphan {}: {}", rel, e),
        }
    }

    info!("Sweep complete: {} orphaned object(s) deleted", deleted);
    Ok(())
}
