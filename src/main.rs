mod config;
mod db;
mod export;
mod instagram;
mod llm;
mod logging;
mod media;
mod storage;

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::Config;
use db::{Database, Project, ScheduledTaskType};
use export::ExportFormat;
use llm::DraftClient;
use media::{ImageTag, MediaSet, PairSide};
use storage::MediaStore;

struct CliArgs {
    config_path: Option<PathBuf>,
    command: Vec<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = None;
    let mut command = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("renova {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            arg => {
                command.push(arg.to_string());
            }
        }
        i += 1;
    }

    CliArgs { config_path, command }
}

fn print_help() {
    println!(
        r#"renova - content backend for a property-development studio site

USAGE:
    renova [OPTIONS] <COMMAND>

COMMANDS:
    init                                    Create the database and media root
    status                                  Show catalog counts and overdue schedules
    new <kind> <slug> <title>               Create a project, listing or editorial
    list <kind> [--all]                     List published (or all) content
    describe <project-slug> <summary>       Set a project's summary text
    delete <kind> <slug>                    Delete content and its images
    import <kind> <slug> <directory>        Import a directory of images
    delete-image <kind> <image-id>          Delete one image (object + catalog row)
    media <kind> <slug>                     Show a project's (or listing's) images
    tag <project-slug> <image-id> <tag>     Toggle before/after/gallery on an image
    caption <project-slug> <image-id> <txt> Set an image caption
    pair <project-slug> <before> <after>    Create a before/after pair
    unpair <project-slug> <pair-id>         Delete a pair
    relabel <project-slug> <pair-id> <txt>  Give a pair a custom label
    repair <project-slug> <pair-id> <side> <image-id>
                                            Reassign one side of a pair
    move-image <project-slug> <from> <to>   Reorder images (0-based positions)
    move-pair <project-slug> <from> <to>    Reorder pairs (labels renumber)
    hero <project-slug> <image-id|none>     Set or clear a project's hero image
    publish <kind> <slug>                   Publish a project, listing or editorial
    unpublish <kind> <slug>                 Take it off the public site again
    schedule <kind> <slug> <when>           Schedule publication (ISO timestamp)
    tasks                                   List pending scheduled tasks
    run-tasks                               Process due scheduled tasks once
    cancel <task-id>                        Cancel a scheduled task
    draft <project-slug>                    Draft an editorial about a project
    export <output-path>                    Export listings (format from extension)
    instagram-refresh                       Fetch the feed and refresh the cache
    instagram-show                          Print the cached feed, if fresh
    setting <key> [value]                   Get or set a site setting
    settings                                List all site settings
    sweep                                   Delete stored objects the catalog dropped

    <kind> is one of: project, listing, editorial

OPTIONS:
    --config, -c PATH   Path to config file
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    RENOVA_CONFIG       Path to config file (overrides default location)
    RENOVA_LOG          Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/renova/config.toml

See also: renova-daemon --help"#
    );
}

fn main() -> Result<()> {
    let args = parse_args();

    // Initialize logging (uses journald on Linux, file fallback otherwise)
    let _ = logging::init(Some(Config::config_dir().join("logs")));

    // Load configuration
    let config = match &args.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if args.command.is_empty() {
        print_help();
        std::process::exit(1);
    }

    let db = Database::open(&config.database)?;
    db.initialize()?;
    let store = MediaStore::new(&config.storage);

    let command: Vec<&str> = args.command.iter().map(|s| s.as_str()).collect();
    match command.as_slice() {
        ["init"] => cmd_init(&config),
        ["status"] => cmd_status(&db, &config),
        ["new", kind, slug, title @ ..] if !title.is_empty() => {
            cmd_new(&db, kind, slug, &title.join(" "))
        }
        ["list", kind] => cmd_list(&db, kind, false),
        ["list", kind, "--all"] => cmd_list(&db, kind, true),
        ["describe", slug, summary @ ..] if !summary.is_empty() => {
            cmd_describe(&db, slug, &summary.join(" "))
        }
        ["delete", kind, slug] => cmd_delete(&db, kind, slug),
        ["import", kind, slug, directory] => {
            cmd_import(&db, &store, &config, kind, slug, Path::new(directory))
        }
        ["delete-image", kind, image_id] => cmd_delete_image(&db, &store, kind, image_id),
        ["media", kind, slug] => cmd_media(&db, &config, kind, slug),
        ["tag", slug, image_id, tag] => cmd_tag(&db, &config, slug, image_id, tag),
        ["caption", slug, image_id, text @ ..] if !text.is_empty() => {
            cmd_caption(&db, &config, slug, image_id, &text.join(" "))
        }
        ["pair", slug, before, after] => cmd_pair(&db, &config, slug, before, after),
        ["unpair", slug, pair_id] => cmd_unpair(&db, &config, slug, pair_id),
        ["relabel", slug, pair_id, label @ ..] if !label.is_empty() => {
            cmd_relabel(&db, &config, slug, pair_id, &label.join(" "))
        }
        ["repair", slug, pair_id, side, image_id] => {
            cmd_repair(&db, &config, slug, pair_id, side, image_id)
        }
        ["move-image", slug, from, to] => cmd_move(&db, &config, slug, from, to, Collection::Images),
        ["move-pair", slug, from, to] => cmd_move(&db, &config, slug, from, to, Collection::Pairs),
        ["hero", slug, image_id] => cmd_hero(&db, &config, slug, image_id),
        ["publish", kind, slug] => cmd_set_published(&db, kind, slug, true),
        ["unpublish", kind, slug] => cmd_set_published(&db, kind, slug, false),
        ["schedule", kind, slug, when] => cmd_schedule(&db, &config, kind, slug, when),
        ["tasks"] => cmd_tasks(&db),
        ["run-tasks"] => cmd_run_tasks(&db, &store, &config),
        ["cancel", task_id] => cmd_cancel(&db, task_id),
        ["draft", slug] => cmd_draft(&db, &store, &config, slug),
        ["export", output] => cmd_export(&db, Path::new(output)),
        ["instagram-refresh"] => cmd_instagram_refresh(&db, &config),
        ["instagram-show"] => cmd_instagram_show(&db, &config),
        ["setting", key] => cmd_setting_get(&db, key),
        ["setting", key, value] => cmd_setting_set(&db, key, value),
        ["settings"] => cmd_settings(&db),
        ["sweep"] => cmd_sweep(&db, &store),
        _ => {
            eprintln!("Unknown command: {}", args.command.join(" "));
            print_help();
            std::process::exit(1);
        }
    }
}

fn cmd_init(config: &Config) -> Result<()> {
    // Database and schema were created on open; make sure the media
    // root exists too.
    std::fs::create_dir_all(&config.storage.media_root)?;
    println!("Database ready at {}", config.db_path().display());
    println!("Media root ready at {}", config.storage.media_root.display());
    Ok(())
}

fn cmd_status(db: &Database, config: &Config) -> Result<()> {
    println!("Projects:   {}", db.count_projects()?);
    println!("Images:     {}", db.count_project_images()?);
    println!("Listings:   {}", db.count_listings()?);
    println!("Editorials: {}", db.count_editorials()?);

    if config.schedule.check_overdue_on_startup {
        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        let overdue = db.get_overdue_schedules(&now)?;
        if !overdue.is_empty() {
            println!();
            println!("{} overdue scheduled task(s):", overdue.len());
            for task in overdue {
                println!(
                    "  #{} {} {} (due {})",
                    task.id,
                    task.task_type.display_name(),
                    task.target,
                    task.scheduled_at
                );
            }
            println!("Run renova-daemon (or renova run-tasks) to process them.");
        }
    }
    Ok(())
}

fn cmd_new(db: &Database, kind: &str, slug: &str, title: &str) -> Result<()> {
    let id = match kind {
        "project" => db.create_project(slug, title)?,
        "listing" => db.create_listing(slug, title)?,
        "editorial" => db.create_editorial(slug, title)?,
        _ => anyhow::bail!("unknown kind '{}', expected project, listing or editorial", kind),
    };
    println!("Created {} '{}' (id {})", kind, slug, id);
    Ok(())
}

fn cmd_list(db: &Database, kind: &str, include_unpublished: bool) -> Result<()> {
    match kind {
        "project" => {
            for project in db.list_projects(include_unpublished)? {
                println!(
                    "{:<30} {} {}",
                    project.slug,
                    if project.is_published { "published" } else { "draft" },
                    project.title
                );
            }
        }
        "listing" => {
            for listing in db.list_listings(include_unpublished)? {
                println!(
                    "{:<30} {:<11} {}",
                    listing.slug,
                    listing.status.as_str(),
                    listing.title
                );
            }
        }
        "editorial" => {
            for editorial in db.list_editorials(include_unpublished)? {
                let marker = if editorial.is_ai_drafted { " [ai draft]" } else { "" };
                println!(
                    "{:<30} {} {}{}",
                    editorial.slug,
                    if editorial.is_published { "published" } else { "draft" },
                    editorial.title,
                    marker
                );
            }
        }
        _ => anyhow::bail!("unknown kind '{}', expected project, listing or editorial", kind),
    }
    Ok(())
}

fn cmd_describe(db: &Database, slug: &str, summary: &str) -> Result<()> {
    let project = db
        .get_project(slug)?
        .with_context(|| format!("no project with slug '{}'", slug))?;
    db.update_project_details(
        project.id,
        &db::ProjectDetails {
            summary: Some(summary.to_string()),
            ..Default::default()
        },
    )?;
    println!("Updated summary of '{}'", slug);
    Ok(())
}

fn cmd_delete(db: &Database, kind: &str, slug: &str) -> Result<()> {
    let deleted = match kind {
        "project" => match db.get_project(slug)? {
            Some(project) => db.delete_project(project.id)?,
            None => false,
        },
        "listing" => match db.get_listing(slug)? {
            Some(listing) => db.delete_listing(listing.id)?,
            None => false,
        },
        "editorial" => match db.get_editorial(slug)? {
            Some(editorial) => db.delete_editorial(editorial.id)?,
            None => false,
        },
        _ => anyhow::bail!("unknown kind '{}', expected project, listing or editorial", kind),
    };
    if deleted {
        println!("Deleted {} '{}'. Stored objects are reclaimed by the next sweep.", kind, slug);
    } else {
        println!("No {} with slug '{}'", kind, slug);
    }
    Ok(())
}

fn cmd_import(
    db: &Database,
    store: &MediaStore,
    config: &Config,
    kind: &str,
    slug: &str,
    directory: &Path,
) -> Result<()> {
    let files = storage::discover_images(directory, &config.media.image_extensions);
    if files.is_empty() {
        println!("No images found in {}", directory.display());
        return Ok(());
    }

    match kind {
        "project" => {
            let project = db
                .get_project(slug)?
                .with_context(|| format!("no project with slug '{}'", slug))?;
            let report = storage::import_batch(db, store, project.id, slug, &files)?;
            println!("Imported {} image(s) for '{}'", report.added, slug);
            for (path, error) in &report.failed {
                eprintln!("  failed: {}: {}", path.display(), error);
            }
        }
        "listing" => {
            let listing = db
                .get_listing(slug)?
                .with_context(|| format!("no listing with slug '{}'", slug))?;
            let mut added = 0;
            for file in &files {
                match store.import_file(slug, file) {
                    Ok(object) => {
                        db.insert_listing_image(listing.id, &object.url, Some(&object.storage_path))?;
                        added += 1;
                    }
                    Err(e) => eprintln!("  failed: {}: {}", file.display(), e),
                }
            }
            println!("Imported {} image(s) for '{}'", added, slug);
        }
        _ => anyhow::bail!("unknown kind '{}', expected project or listing", kind),
    }
    Ok(())
}

fn cmd_delete_image(db: &Database, store: &MediaStore, kind: &str, image_id: &str) -> Result<()> {
    let image_id: i64 = image_id.parse().context("image id must be a number")?;
    match kind {
        "project" => media::delete_image(db, store, image_id)?,
        "listing" => media::delete_listing_image(db, store, image_id)?,
        _ => anyhow::bail!("unknown kind '{}', expected project or listing", kind),
    }
    println!("Deleted {} image {}", kind, image_id);
    Ok(())
}

/// Load a project and its media set for one of the editing commands.
fn load_set(db: &Database, config: &Config, slug: &str) -> Result<(Project, MediaSet)> {
    let project = db
        .get_project(slug)?
        .with_context(|| format!("no project with slug '{}'", slug))?;
    let set = media::load(db, project.id, config.media.max_pairs)?;
    Ok((project, set))
}

fn cmd_media(db: &Database, config: &Config, kind: &str, slug: &str) -> Result<()> {
    match kind {
        "project" => {
            let (_, set) = load_set(db, config, slug)?;
            println!("Images:");
            for image in set.images() {
                let tags: Vec<&str> = image.tags.iter().map(|t| t.as_str()).collect();
                let hero = if set.hero_image_id() == Some(image.id) { " [hero]" } else { "" };
                println!(
                    "  #{:<4} [{}]{} {} {}",
                    image.id,
                    tags.join(", "),
                    hero,
                    image.url,
                    image.caption.as_deref().unwrap_or("")
                );
            }
            println!("Pairs:");
            for pair in set.pairs() {
                println!(
                    "  #{:<4} {:<20} before={:?} after={:?}",
                    pair.id, pair.label, pair.before_image_id, pair.after_image_id
                );
            }
        }
        "listing" => {
            let listing = db
                .get_listing(slug)?
                .with_context(|| format!("no listing with slug '{}'", slug))?;
            for image in db.get_listing_images(listing.id)? {
                println!("  #{:<4} {:>3} {}", image.id, image.position, image.url);
            }
        }
        _ => anyhow::bail!("unknown kind '{}', expected project or listing", kind),
    }
    Ok(())
}

fn cmd_tag(db: &Database, config: &Config, slug: &str, image_id: &str, tag: &str) -> Result<()> {
    let image_id: i64 = image_id.parse().context("image id must be a number")?;
    let tag = ImageTag::from_str(tag)
        .with_context(|| format!("unknown tag '{}', expected before, after or gallery", tag))?;
    let (project, mut set) = load_set(db, config, slug)?;
    let tags: Vec<&'static str> = set
        .toggle_tag(image_id, tag)?
        .iter()
        .map(|t| t.as_str())
        .collect();
    media::save(db, project.id, &set)?;
    println!("Image {} is now tagged [{}]", image_id, tags.join(", "));
    Ok(())
}

fn cmd_caption(
    db: &Database,
    config: &Config,
    slug: &str,
    image_id: &str,
    text: &str,
) -> Result<()> {
    let image_id: i64 = image_id.parse().context("image id must be a number")?;
    let (project, mut set) = load_set(db, config, slug)?;
    let alt_text = set
        .images()
        .iter()
        .find(|i| i.id == image_id)
        .and_then(|i| i.alt_text.clone());
    set.set_image_text(image_id, Some(text.to_string()), alt_text)?;
    media::save(db, project.id, &set)?;
    println!("Captioned image {}", image_id);
    Ok(())
}

fn cmd_pair(db: &Database, config: &Config, slug: &str, before: &str, after: &str) -> Result<()> {
    let before: i64 = before.parse().context("image id must be a number")?;
    let after: i64 = after.parse().context("image id must be a number")?;
    let (project, mut set) = load_set(db, config, slug)?;
    let label = set.create_pair(before, after)?.label.clone();
    media::save(db, project.id, &set)?;
    println!("Created pair '{}'", label);
    Ok(())
}

fn cmd_unpair(db: &Database, config: &Config, slug: &str, pair_id: &str) -> Result<()> {
    let pair_id: i64 = pair_id.parse().context("pair id must be a number")?;
    let (project, mut set) = load_set(db, config, slug)?;
    let removed = set.delete_pair(pair_id)?;
    media::save(db, project.id, &set)?;
    println!("Deleted pair '{}'", removed.label);
    Ok(())
}

fn cmd_relabel(
    db: &Database,
    config: &Config,
    slug: &str,
    pair_id: &str,
    label: &str,
) -> Result<()> {
    let pair_id: i64 = pair_id.parse().context("pair id must be a number")?;
    let (project, mut set) = load_set(db, config, slug)?;
    set.relabel_pair(pair_id, label)?;
    media::save(db, project.id, &set)?;
    println!("Relabeled pair {} to '{}'", pair_id, label);
    Ok(())
}

fn cmd_repair(
    db: &Database,
    config: &Config,
    slug: &str,
    pair_id: &str,
    side: &str,
    image_id: &str,
) -> Result<()> {
    let pair_id: i64 = pair_id.parse().context("pair id must be a number")?;
    let image_id: i64 = image_id.parse().context("image id must be a number")?;
    let side = match side {
        "before" => PairSide::Before,
        "after" => PairSide::After,
        _ => anyhow::bail!("unknown side '{}', expected before or after", side),
    };
    let (project, mut set) = load_set(db, config, slug)?;
    set.assign_pair_side(pair_id, side, image_id)?;
    media::save(db, project.id, &set)?;
    println!("Pair {} now uses image {} on the {} side", pair_id, image_id, side_name(side));
    Ok(())
}

fn side_name(side: PairSide) -> &'static str {
    match side {
        PairSide::Before => "before",
        PairSide::After => "after",
    }
}

enum Collection {
    Images,
    Pairs,
}

fn cmd_move(
    db: &Database,
    config: &Config,
    slug: &str,
    from: &str,
    to: &str,
    collection: Collection,
) -> Result<()> {
    let from: usize = from.parse().context("position must be a number")?;
    let to: usize = to.parse().context("position must be a number")?;
    let (project, mut set) = load_set(db, config, slug)?;
    match collection {
        Collection::Images => set.reorder_images(from, to)?,
        Collection::Pairs => set.reorder_pairs(from, to)?,
    }
    media::save(db, project.id, &set)?;
    println!("Moved position {} to {}", from, to);
    Ok(())
}

fn cmd_hero(db: &Database, config: &Config, slug: &str, image_id: &str) -> Result<()> {
    let (project, mut set) = load_set(db, config, slug)?;
    if image_id == "none" {
        set.set_hero(None)?;
        media::save(db, project.id, &set)?;
        println!("Cleared hero of '{}'", slug);
        return Ok(());
    }
    let image_id: i64 = image_id.parse().context("image id must be a number")?;
    set.set_hero(Some(image_id))?;
    media::save(db, project.id, &set)?;
    println!("Hero of '{}' set to image {}", slug, image_id);
    Ok(())
}

fn cmd_set_published(db: &Database, kind: &str, slug: &str, published: bool) -> Result<()> {
    match kind {
        "project" => {
            let project = db
                .get_project(slug)?
                .with_context(|| format!("no project with slug '{}'", slug))?;
            db.set_project_published(project.id, published)?;
        }
        "listing" => {
            let listing = db
                .get_listing(slug)?
                .with_context(|| format!("no listing with slug '{}'", slug))?;
            db.set_listing_published(listing.id, published)?;
        }
        "editorial" => {
            let editorial = db
                .get_editorial(slug)?
                .with_context(|| format!("no editorial with slug '{}'", slug))?;
            db.set_editorial_published(editorial.id, published)?;
        }
        _ => anyhow::bail!("unknown kind '{}', expected project, listing or editorial", kind),
    }
    println!(
        "{} '{}' is now {}",
        kind,
        slug,
        if published { "published" } else { "unpublished" }
    );
    Ok(())
}

fn cmd_schedule(db: &Database, config: &Config, kind: &str, slug: &str, when: &str) -> Result<()> {
    // Make sure the target exists before scheduling its publication.
    let exists = match kind {
        "project" => db.get_project(slug)?.is_some(),
        "listing" => db.get_listing(slug)?.is_some(),
        "editorial" => db.get_editorial(slug)?.is_some(),
        _ => anyhow::bail!("unknown kind '{}', expected project, listing or editorial", kind),
    };
    if !exists {
        anyhow::bail!("no {} with slug '{}'", kind, slug);
    }

    let target = format!("{}:{}", kind, slug);
    let id = db.create_scheduled_task(
        ScheduledTaskType::Publish,
        &target,
        when,
        config.schedule.default_hours_start,
        config.schedule.default_hours_end,
    )?;
    println!("Scheduled publish of {} at {} (task #{})", target, when, id);
    Ok(())
}

fn cmd_tasks(db: &Database) -> Result<()> {
    let tasks = db.get_pending_schedules()?;
    if tasks.is_empty() {
        println!("No pending tasks");
        return Ok(());
    }
    for task in tasks {
        println!(
            "#{:<4} {:<18} {:<30} due {}",
            task.id,
            task.task_type.display_name(),
            task.target,
            task.scheduled_at
        );
    }
    Ok(())
}

/// Process due tasks once, the same work the daemon does on its poll
/// loop, but through the facade. Useful without a running daemon.
fn cmd_run_tasks(db: &Database, store: &MediaStore, config: &Config) -> Result<()> {
    let tasks = db.get_due_pending_tasks(10)?;
    if tasks.is_empty() {
        println!("No due tasks");
        return Ok(());
    }

    for task in tasks {
        db.mark_task_running(task.id)?;
        let result = match task.task_type {
            ScheduledTaskType::Publish => task
                .target
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("malformed publish target '{}'", task.target))
                .and_then(|(kind, slug)| cmd_set_published(db, kind, slug, true)),
            ScheduledTaskType::InstagramRefresh => {
                instagram::refresh_cache(db, &config.instagram).map(|_| ())
            }
            ScheduledTaskType::OrphanSweep => {
                let referenced: HashSet<String> = db.all_storage_paths()?.into_iter().collect();
                store.sweep_orphans(&referenced).map(|_| ())
            }
        };
        match result {
            Ok(()) => {
                db.mark_task_completed(task.id)?;
                println!("Task #{} completed", task.id);
            }
            Err(e) => {
                db.mark_task_failed(task.id, &e.to_string())?;
                eprintln!("Task #{} failed: {}", task.id, e);
            }
        }
    }
    Ok(())
}

fn cmd_cancel(db: &Database, task_id: &str) -> Result<()> {
    let task_id: i64 = task_id.parse().context("task id must be a number")?;
    db.cancel_schedule(task_id)?;
    println!("Cancelled task #{}", task_id);
    Ok(())
}

fn cmd_draft(db: &Database, store: &MediaStore, config: &Config, slug: &str) -> Result<()> {
    let project = db
        .get_project(slug)?
        .with_context(|| format!("no project with slug '{}'", slug))?;
    let set = media::load(db, project.id, config.media.max_pairs)?;

    // Attach up to three stored images as visual grounding, preferring
    // the "after" shots.
    let mut picks: Vec<&str> = set
        .images()
        .iter()
        .filter(|i| i.tags.contains(&ImageTag::After))
        .filter_map(|i| i.storage_path.as_deref())
        .collect();
    picks.extend(
        set.images()
            .iter()
            .filter(|i| !i.tags.contains(&ImageTag::After))
            .filter_map(|i| i.storage_path.as_deref()),
    );
    let image_paths: Vec<PathBuf> = picks.iter().take(3).map(|p| store.root().join(p)).collect();
    let image_refs: Vec<&Path> = image_paths.iter().map(|p| p.as_path()).collect();

    let client = DraftClient::from_config(&config.llm);
    println!("Drafting with {} ...", client.provider_name());
    let draft = client.draft_editorial(&project, &image_refs)?;

    let editorial_slug = format!("{}-journal", slug);
    db.upsert_editorial_draft(
        &editorial_slug,
        &draft.title,
        draft.excerpt.as_deref(),
        &draft.body,
        true,
    )?;
    println!("Draft saved as editorial '{}' (unpublished)", editorial_slug);
    Ok(())
}

fn cmd_export(db: &Database, output: &Path) -> Result<()> {
    let format = ExportFormat::from_path(output).unwrap_or(ExportFormat::Csv);
    let count = export::export_listings(db, output, format)?;
    println!(
        "Exported {} listing(s) to {} ({})",
        count,
        output.display(),
        format.name()
    );
    Ok(())
}

fn cmd_instagram_refresh(db: &Database, config: &Config) -> Result<()> {
    let count = instagram::refresh_cache(db, &config.instagram)?;
    println!("Cached {} Instagram post(s)", count);
    Ok(())
}

fn cmd_instagram_show(db: &Database, config: &Config) -> Result<()> {
    match instagram::cached_posts(db, &config.instagram)? {
        Some(posts) => {
            for post in posts {
                println!(
                    "{:<12} {:<8} {}",
                    post.id,
                    post.media_type,
                    post.caption.as_deref().unwrap_or("-")
                );
            }
        }
        None => println!("Cache is empty or stale; run instagram-refresh"),
    }
    Ok(())
}

fn cmd_setting_get(db: &Database, key: &str) -> Result<()> {
    match db.get_setting(key)? {
        Some(value) => println!("{}", value),
        None => println!("(unset)"),
    }
    Ok(())
}

fn cmd_setting_set(db: &Database, key: &str, value: &str) -> Result<()> {
    db.set_setting(key, value)?;
    println!("Set {} = {}", key, value);
    Ok(())
}

fn cmd_settings(db: &Database) -> Result<()> {
    for (key, value) in db.all_settings()? {
        println!("{} = {}", key, value);
    }
    Ok(())
}

fn cmd_sweep(db: &Database, store: &MediaStore) -> Result<()> {
    let referenced: HashSet<String> = db.all_storage_paths()?.into_iter().collect();
    let result = store.sweep_orphans(&referenced)?;
    println!(
        "Deleted {} orphaned object(s), freed {} bytes",
        result.files_deleted, result.bytes_freed
    );
    Ok(())
}
