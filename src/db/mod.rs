mod schema;
pub mod editorials;
pub mod instagram;
pub mod listings;
pub mod projects;
pub mod schedule;
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "postgres")]
pub mod postgres_schema;

use anyhow::Result;

pub use editorials::Editorial;
pub use instagram::CachedFeed;
pub use listings::{Listing, ListingImage, ListingStatus};
pub use projects::{Project, ProjectDetails};
pub use schedule::{ScheduleStatus, ScheduledTask, ScheduledTaskType};
pub use schema::{MIGRATIONS, SCHEMA};

use crate::config::DatabaseConfig;
#[cfg(feature = "postgres")]
use crate::config::DatabaseType;
use crate::media::{ImagePair, MediaSet, ProjectImage};

/// Listing data for export (database-layer struct so the export module
/// stays backend-agnostic).
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExportedListingRow {
    pub slug: String,
    pub title: String,
    pub address: Option<String>,
    pub price_cents: Option<i64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub area_sqm: Option<f64>,
    pub status: String,
    pub is_published: bool,
    pub published_at: Option<String>,
    pub image_count: i64,
}

/// Macro to dispatch a method call to the active backend variant.
macro_rules! dispatch {
    // No arguments beyond self
    ($self:expr, $method:ident()) => {
        match &$self.inner {
            DatabaseInner::Sqlite(db) => db.$method(),
            #[cfg(feature = "postgres")]
            DatabaseInner::Postgres(db) => db.$method(),
        }
    };
    // With arguments
    ($self:expr, $method:ident($($arg:expr),+ $(,)?)) => {
        match &$self.inner {
            DatabaseInner::Sqlite(db) => db.$method($($arg),+),
            #[cfg(feature = "postgres")]
            DatabaseInner::Postgres(db) => db.$method($($arg),+),
        }
    };
}

enum DatabaseInner {
    Sqlite(sqlite::SqliteDb),
    #[cfg(feature = "postgres")]
    Postgres(postgres::PgDb),
}

pub struct Database {
    inner: DatabaseInner,
}

impl Database {
    /// Open a database connection based on the provided configuration.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        #[cfg(feature = "postgres")]
        {
            if config.backend == DatabaseType::Postgresql {
                let url = config
                    .postgresql_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("PostgreSQL URL not configured"))?;
                let pool_size = config.pool_size.unwrap_or(10);
                let pg = postgres::PgDb::open(url, pool_size)?;
                return Ok(Self { inner: DatabaseInner::Postgres(pg) });
            }
        }

        let db = sqlite::SqliteDb::open(&config.sqlite_path)?;
        Ok(Self { inner: DatabaseInner::Sqlite(db) })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let db = sqlite::SqliteDb::open_in_memory()?;
        Ok(Self { inner: DatabaseInner::Sqlite(db) })
    }

    pub fn initialize(&self) -> Result<()> {
        dispatch!(self, initialize())
    }

    // ========================================================================
    // Project operations
    // ========================================================================

    pub fn create_project(&self, slug: &str, title: &str) -> Result<i64> {
        dispatch!(self, create_project(slug, title))
    }

    pub fn get_project(&self, slug: &str) -> Result<Option<Project>> {
        dispatch!(self, get_project(slug))
    }

    pub fn list_projects(&self, include_unpublished: bool) -> Result<Vec<Project>> {
        dispatch!(self, list_projects(include_unpublished))
    }

    pub fn update_project_details(&self, id: i64, details: &ProjectDetails) -> Result<()> {
        dispatch!(self, update_project_details(id, details))
    }

    pub fn set_project_published(&self, id: i64, published: bool) -> Result<()> {
        dispatch!(self, set_project_published(id, published))
    }

    pub fn delete_project(&self, id: i64) -> Result<bool> {
        dispatch!(self, delete_project(id))
    }

    pub fn set_project_hero(&self, project_id: i64, image_id: Option<i64>) -> Result<()> {
        dispatch!(self, set_project_hero(project_id, image_id))
    }

    // ========================================================================
    // Project media operations
    // ========================================================================

    pub fn insert_project_image(
        &self,
        project_id: i64,
        url: &str,
        storage_path: Option<&str>,
        caption: Option<&str>,
        alt_text: Option<&str>,
    ) -> Result<i64> {
        dispatch!(self, insert_project_image(project_id, url, storage_path, caption, alt_text))
    }

    pub fn get_project_image(&self, image_id: i64) -> Result<Option<ProjectImage>> {
        dispatch!(self, get_project_image(image_id))
    }

    pub fn get_project_media(
        &self,
        project_id: i64,
    ) -> Result<(Vec<ProjectImage>, Vec<ImagePair>, Option<i64>)> {
        dispatch!(self, get_project_media(project_id))
    }

    pub fn delete_project_image(&self, image_id: i64) -> Result<bool> {
        dispatch!(self, delete_project_image(image_id))
    }

    pub fn save_project_media(&self, project_id: i64, set: &MediaSet) -> Result<()> {
        dispatch!(self, save_project_media(project_id, set))
    }

    pub fn all_storage_paths(&self) -> Result<Vec<String>> {
        dispatch!(self, all_storage_paths())
    }

    // ========================================================================
    // Listing operations
    // ========================================================================

    pub fn create_listing(&self, slug: &str, title: &str) -> Result<i64> {
        dispatch!(self, create_listing(slug, title))
    }

    pub fn get_listing(&self, slug: &str) -> Result<Option<Listing>> {
        dispatch!(self, get_listing(slug))
    }

    pub fn list_listings(&self, include_unpublished: bool) -> Result<Vec<Listing>> {
        dispatch!(self, list_listings(include_unpublished))
    }

    pub fn set_listing_published(&self, id: i64, published: bool) -> Result<()> {
        dispatch!(self, set_listing_published(id, published))
    }

    pub fn set_listing_status(&self, id: i64, status: ListingStatus) -> Result<()> {
        dispatch!(self, set_listing_status(id, status))
    }

    pub fn delete_listing(&self, id: i64) -> Result<bool> {
        dispatch!(self, delete_listing(id))
    }

    pub fn insert_listing_image(
        &self,
        listing_id: i64,
        url: &str,
        storage_path: Option<&str>,
    ) -> Result<i64> {
        dispatch!(self, insert_listing_image(listing_id, url, storage_path))
    }

    pub fn get_listing_images(&self, listing_id: i64) -> Result<Vec<ListingImage>> {
        dispatch!(self, get_listing_images(listing_id))
    }

    pub fn get_listing_image(&self, image_id: i64) -> Result<Option<ListingImage>> {
        dispatch!(self, get_listing_image(image_id))
    }

    pub fn delete_listing_image(&self, image_id: i64) -> Result<bool> {
        dispatch!(self, delete_listing_image(image_id))
    }

    pub fn get_listings_for_export(&self) -> Result<Vec<ExportedListingRow>> {
        dispatch!(self, get_listings_for_export())
    }

    // ========================================================================
    // Editorial operations
    // ========================================================================

    pub fn create_editorial(&self, slug: &str, title: &str) -> Result<i64> {
        dispatch!(self, create_editorial(slug, title))
    }

    pub fn upsert_editorial_draft(
        &self,
        slug: &str,
        title: &str,
        excerpt: Option<&str>,
        body: &str,
        ai_drafted: bool,
    ) -> Result<i64> {
        dispatch!(self, upsert_editorial_draft(slug, title, excerpt, body, ai_drafted))
    }

    pub fn get_editorial(&self, slug: &str) -> Result<Option<Editorial>> {
        dispatch!(self, get_editorial(slug))
    }

    pub fn list_editorials(&self, include_unpublished: bool) -> Result<Vec<Editorial>> {
        dispatch!(self, list_editorials(include_unpublished))
    }

    pub fn set_editorial_published(&self, id: i64, published: bool) -> Result<()> {
        dispatch!(self, set_editorial_published(id, published))
    }

    pub fn delete_editorial(&self, id: i64) -> Result<bool> {
        dispatch!(self, delete_editorial(id))
    }

    // ========================================================================
    // Instagram cache operations
    // ========================================================================

    pub fn get_cached_feed(&self) -> Result<Option<CachedFeed>> {
        dispatch!(self, get_cached_feed())
    }

    pub fn store_cached_feed(&self, payload: &str) -> Result<()> {
        dispatch!(self, store_cached_feed(payload))
    }

    // ========================================================================
    // Site settings operations
    // ========================================================================

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        dispatch!(self, get_setting(key))
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        dispatch!(self, set_setting(key, value))
    }

    pub fn all_settings(&self) -> Result<Vec<(String, String)>> {
        dispatch!(self, all_settings())
    }

    // ========================================================================
    // Schedule operations
    // ========================================================================

    pub fn create_scheduled_task(
        &self,
        task_type: ScheduledTaskType,
        target: &str,
        scheduled_at: &str,
        hours_start: Option<u8>,
        hours_end: Option<u8>,
    ) -> Result<i64> {
        dispatch!(self, create_scheduled_task(task_type, target, scheduled_at, hours_start, hours_end))
    }

    pub fn get_pending_schedules(&self) -> Result<Vec<ScheduledTask>> {
        dispatch!(self, get_pending_schedules())
    }

    pub fn get_overdue_schedules(&self, now: &str) -> Result<Vec<ScheduledTask>> {
        dispatch!(self, get_overdue_schedules(now))
    }

    pub fn get_due_pending_tasks(&self, limit: usize) -> Result<Vec<ScheduledTask>> {
        dispatch!(self, get_due_pending_tasks(limit))
    }

    pub fn mark_task_running(&self, task_id: i64) -> Result<()> {
        dispatch!(self, mark_task_running(task_id))
    }

    pub fn mark_task_completed(&self, task_id: i64) -> Result<()> {
        dispatch!(self, mark_task_completed(task_id))
    }

    pub fn mark_task_failed(&self, task_id: i64, error: &str) -> Result<()> {
        dispatch!(self, mark_task_failed(task_id, error))
    }

    pub fn cancel_schedule(&self, task_id: i64) -> Result<()> {
        dispatch!(self, cancel_schedule(task_id))
    }

    // ========================================================================
    // Counts (status reporting)
    // ========================================================================

    pub fn count_projects(&self) -> Result<i64> {
        dispatch!(self, count_projects())
    }

    pub fn count_listings(&self) -> Result<i64> {
        dispatch!(self, count_listings())
    }

    pub fn count_editorials(&self) -> Result<i64> {
        dispatch!(self, count_editorials())
    }

    pub fn count_project_images(&self) -> Result<i64> {
        dispatch!(self, count_project_images())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{self, ImageTag, MediaSet, DEFAULT_MAX_PAIRS};

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    fn project_with_images(db: &Database, slug: &str, count: usize) -> (i64, Vec<i64>) {
        let project_id = db.create_project(slug, "Test project").unwrap();
        let mut image_ids = Vec::new();
        for i in 0..count {
            let id = db
                .insert_project_image(
                    project_id,
                    &format!("https://cdn.test/{}/{}.jpg", slug, i),
                    Some(&format!("{}/{}.jpg", slug, i)),
                    None,
                    None,
                )
                .unwrap();
            image_ids.push(id);
        }
        (project_id, image_ids)
    }

    #[test]
    fn test_project_crud_and_publish_gate() {
        let db = test_db();
        let id = db.create_project("villa-aurelia", "Villa Aurelia").unwrap();

        let project = db.get_project("villa-aurelia").unwrap().unwrap();
        assert_eq!(project.id, id);
        assert!(!project.is_published);
        assert!(project.published_at.is_none());
        assert!(db.list_projects(false).unwrap().is_empty());

        db.set_project_published(id, true).unwrap();
        let project = db.get_project("villa-aurelia").unwrap().unwrap();
        assert!(project.is_published);
        assert!(project.published_at.is_some());
        assert_eq!(db.list_projects(false).unwrap().len(), 1);

        // Unpublishing keeps the original publication timestamp.
        db.set_project_published(id, false).unwrap();
        let project = db.get_project("villa-aurelia").unwrap().unwrap();
        assert!(!project.is_published);
        assert!(project.published_at.is_some());

        assert!(db.delete_project(id).unwrap());
        assert!(db.get_project("villa-aurelia").unwrap().is_none());
    }

    #[test]
    fn test_update_project_details_partial() {
        let db = test_db();
        let id = db.create_project("casa-rosa", "Casa Rosa").unwrap();
        db.update_project_details(
            id,
            &ProjectDetails {
                summary: Some("A pink house".to_string()),
                location: Some("Lisbon".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let project = db.get_project("casa-rosa").unwrap().unwrap();
        assert_eq!(project.title, "Casa Rosa");
        assert_eq!(project.summary.as_deref(), Some("A pink house"));
        assert_eq!(project.location.as_deref(), Some("Lisbon"));
    }

    #[test]
    fn test_image_insert_keeps_order() {
        let db = test_db();
        let (project_id, image_ids) = project_with_images(&db, "casa-01", 3);
        let (images, pairs, hero) = db.get_project_media(project_id).unwrap();
        let ids: Vec<i64> = images.iter().map(|i| i.id).collect();
        assert_eq!(ids, image_ids);
        assert!(pairs.is_empty());
        assert_eq!(hero, None);
    }

    #[test]
    fn test_save_project_media_round_trip() {
        let db = test_db();
        let (project_id, ids) = project_with_images(&db, "casa-02", 3);

        let mut set = media::load(&db, project_id, DEFAULT_MAX_PAIRS).unwrap();
        set.toggle_tag(ids[0], ImageTag::Before).unwrap();
        set.toggle_tag(ids[1], ImageTag::After).unwrap();
        set.toggle_tag(ids[1], ImageTag::Gallery).unwrap();
        set.create_pair(ids[0], ids[1]).unwrap();
        set.set_hero(Some(ids[2])).unwrap();
        set.set_image_text(ids[2], Some("Facade".to_string()), Some("Street view".to_string()))
            .unwrap();
        set.reorder_images(2, 0).unwrap();
        media::save(&db, project_id, &set).unwrap();

        let (images, pairs, hero) = db.get_project_media(project_id).unwrap();
        assert_eq!(images[0].id, ids[2]);
        assert_eq!(images[0].caption.as_deref(), Some("Facade"));
        assert!(images
            .iter()
            .find(|i| i.id == ids[0])
            .unwrap()
            .tags
            .contains(&ImageTag::Before));
        let after_tags = &images.iter().find(|i| i.id == ids[1]).unwrap().tags;
        assert!(after_tags.contains(&ImageTag::After));
        assert!(after_tags.contains(&ImageTag::Gallery));
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].label, "Before & After 1");
        assert_eq!(pairs[0].before_image_id, Some(ids[0]));
        assert_eq!(pairs[0].after_image_id, Some(ids[1]));
        assert_eq!(hero, Some(ids[2]));
    }

    #[test]
    fn test_save_drops_images_removed_from_set() {
        let db = test_db();
        let (project_id, ids) = project_with_images(&db, "casa-03", 3);

        let mut set = media::load(&db, project_id, DEFAULT_MAX_PAIRS).unwrap();
        set.remove_image(ids[1]).unwrap();
        media::save(&db, project_id, &set).unwrap();

        let (images, _, _) = db.get_project_media(project_id).unwrap();
        let remaining: Vec<i64> = images.iter().map(|i| i.id).collect();
        assert_eq!(remaining, vec![ids[0], ids[2]]);
    }

    #[test]
    fn test_save_rejects_foreign_image_id() {
        let db = test_db();
        let (project_id, _) = project_with_images(&db, "casa-04", 1);
        let (_, other_ids) = project_with_images(&db, "casa-05", 1);

        let mut set = media::load(&db, project_id, DEFAULT_MAX_PAIRS).unwrap();
        set.push_image(crate::media::ProjectImage::new(
            other_ids[0],
            "https://cdn.test/intruder.jpg",
        ))
        .unwrap();
        assert!(media::save(&db, project_id, &set).is_err());

        // The rejected save left the other project untouched.
        let (other_images, _, _) = db
            .get_project_media(db.get_project("casa-05").unwrap().unwrap().id)
            .unwrap();
        assert_eq!(other_images.len(), 1);
    }

    #[test]
    fn test_save_rejects_invalid_set() {
        let db = test_db();
        let (project_id, ids) = project_with_images(&db, "casa-06", 2);

        let mut set = media::load(&db, project_id, DEFAULT_MAX_PAIRS).unwrap();
        set.toggle_tag(ids[0], ImageTag::Before).unwrap();
        set.create_pair(ids[0], ids[1]).unwrap();
        media::save(&db, project_id, &set).unwrap();

        // Hand the database a poisoned set, as a hostile client might.
        let (mut images, pairs, hero) = db.get_project_media(project_id).unwrap();
        images[0].tags.insert(ImageTag::After);
        let bad = MediaSet::from_parts(images, pairs, hero, DEFAULT_MAX_PAIRS);
        assert!(db.save_project_media(project_id, &bad).is_err());

        // Stored tags are unchanged.
        let (images, _, _) = db.get_project_media(project_id).unwrap();
        assert_eq!(images[0].tags.len(), 1);
    }

    #[test]
    fn test_delete_image_clears_pair_side_and_hero() {
        let db = test_db();
        let (project_id, ids) = project_with_images(&db, "casa-07", 2);

        let mut set = media::load(&db, project_id, DEFAULT_MAX_PAIRS).unwrap();
        set.create_pair(ids[0], ids[1]).unwrap();
        set.set_hero(Some(ids[0])).unwrap();
        media::save(&db, project_id, &set).unwrap();

        assert!(db.delete_project_image(ids[0]).unwrap());

        let (images, pairs, hero) = db.get_project_media(project_id).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].before_image_id, None);
        assert_eq!(pairs[0].after_image_id, Some(ids[1]));
        assert_eq!(hero, None);
    }

    #[test]
    fn test_delete_project_cascades() {
        let db = test_db();
        let (project_id, ids) = project_with_images(&db, "casa-08", 2);
        let mut set = media::load(&db, project_id, DEFAULT_MAX_PAIRS).unwrap();
        set.create_pair(ids[0], ids[1]).unwrap();
        media::save(&db, project_id, &set).unwrap();

        db.delete_project(project_id).unwrap();
        assert_eq!(db.count_project_images().unwrap(), 0);
        assert!(db.get_project_image(ids[0]).unwrap().is_none());
    }

    #[test]
    fn test_set_project_hero_rejects_other_projects_image() {
        let db = test_db();
        let (project_id, _) = project_with_images(&db, "casa-09", 1);
        let (_, other_ids) = project_with_images(&db, "casa-10", 1);

        assert!(db.set_project_hero(project_id, Some(other_ids[0])).is_err());
        db.set_project_hero(project_id, None).unwrap();
    }

    #[test]
    fn test_storage_paths_union() {
        let db = test_db();
        let (_, _) = project_with_images(&db, "casa-11", 2);
        let listing_id = db.create_listing("flat-12", "Flat 12").unwrap();
        db.insert_listing_image(listing_id, "https://cdn.test/flat.jpg", Some("flat-12/0.jpg"))
            .unwrap();
        db.insert_listing_image(listing_id, "https://elsewhere.test/x.jpg", None)
            .unwrap();

        let paths = db.all_storage_paths().unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths.contains(&"flat-12/0.jpg".to_string()));
    }

    #[test]
    fn test_listing_crud() {
        let db = test_db();
        let id = db.create_listing("flat-01", "Bright flat").unwrap();
        db.set_listing_status(id, ListingStatus::UnderOffer).unwrap();
        db.set_listing_published(id, true).unwrap();

        let listing = db.get_listing("flat-01").unwrap().unwrap();
        assert_eq!(listing.status, ListingStatus::UnderOffer);
        assert!(listing.is_published);

        let rows = db.get_listings_for_export().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, "under_offer");

        db.delete_listing(id).unwrap();
        assert!(db.get_listing("flat-01").unwrap().is_none());
    }

    #[test]
    fn test_editorial_draft_upsert() {
        let db = test_db();
        let id = db
            .upsert_editorial_draft("spring-notes", "Spring notes", Some("On light"), "Body v1", true)
            .unwrap();
        let again = db
            .upsert_editorial_draft("spring-notes", "Spring notes", Some("On light"), "Body v2", true)
            .unwrap();
        assert_eq!(id, again);

        let editorial = db.get_editorial("spring-notes").unwrap().unwrap();
        assert_eq!(editorial.body.as_deref(), Some("Body v2"));
        assert!(editorial.is_ai_drafted);
        assert!(!editorial.is_published);

        db.set_editorial_published(id, true).unwrap();
        assert_eq!(db.list_editorials(false).unwrap().len(), 1);
    }

    #[test]
    fn test_instagram_cache_single_row() {
        let db = test_db();
        assert!(db.get_cached_feed().unwrap().is_none());

        db.store_cached_feed(r#"{"data":[]}"#).unwrap();
        db.store_cached_feed(r#"{"data":[{"id":"1"}]}"#).unwrap();

        let feed = db.get_cached_feed().unwrap().unwrap();
        assert_eq!(feed.payload, r#"{"data":[{"id":"1"}]}"#);
    }

    #[test]
    fn test_settings_round_trip() {
        let db = test_db();
        db.set_setting("contact_email", "studio@example.com").unwrap();
        db.set_setting("contact_email", "hello@example.com").unwrap();
        assert_eq!(
            db.get_setting("contact_email").unwrap().as_deref(),
            Some("hello@example.com")
        );
        assert!(db.get_setting("missing").unwrap().is_none());
        assert_eq!(db.all_settings().unwrap().len(), 1);
    }

    #[test]
    fn test_schedule_lifecycle() {
        let db = test_db();
        let id = db
            .create_scheduled_task(
                ScheduledTaskType::Publish,
                "project:casa-01",
                "2000-01-01T00:00:00",
                None,
                None,
            )
            .unwrap();

        let due = db.get_due_pending_tasks(10).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].task_type, ScheduledTaskType::Publish);
        assert_eq!(due[0].target, "project:casa-01");

        db.mark_task_running(id).unwrap();
        assert!(db.get_due_pending_tasks(10).unwrap().is_empty());
        db.mark_task_failed(id, "no such project").unwrap();

        let overdue = db.get_overdue_schedules("2100-01-01T00:00:00").unwrap();
        assert!(overdue.is_empty());
    }
}
