//! SQLite backend implementation.

use anyhow::Result;
use rusqlite::Connection;
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::editorials::Editorial;
use super::instagram::CachedFeed;
use super::listings::{Listing, ListingImage, ListingStatus};
use super::projects::{Project, ProjectDetails};
use super::schedule::{ScheduleStatus, ScheduledTask, ScheduledTaskType};
use super::schema::{MIGRATIONS, SCHEMA};
use super::ExportedListingRow;
use crate::media::{ImagePair, ImageTag, MediaSet, ProjectImage};

pub struct SqliteDb {
    pub(crate) conn: Connection,
}

fn row_to_project(row: &rusqlite::Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        summary: row.get(3)?,
        body: row.get(4)?,
        location: row.get(5)?,
        completed_year: row.get(6)?,
        hero_image_id: row.get(7)?,
        is_published: row.get::<_, i64>(8)? != 0,
        published_at: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

const PROJECT_COLUMNS: &str = "id, slug, title, summary, body, location, completed_year, \
     hero_image_id, is_published, published_at, created_at, updated_at";

fn row_to_listing(row: &rusqlite::Row) -> rusqlite::Result<Listing> {
    let status_str: String = row.get(9)?;
    Ok(Listing {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        address: row.get(4)?,
        price_cents: row.get(5)?,
        bedrooms: row.get(6)?,
        bathrooms: row.get(7)?,
        area_sqm: row.get(8)?,
        status: ListingStatus::from_str(&status_str).unwrap_or(ListingStatus::Available),
        is_published: row.get::<_, i64>(10)? != 0,
        published_at: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

const LISTING_COLUMNS: &str = "id, slug, title, description, address, price_cents, bedrooms, \
     bathrooms, area_sqm, status, is_published, published_at, created_at, updated_at";

fn row_to_editorial(row: &rusqlite::Row) -> rusqlite::Result<Editorial> {
    Ok(Editorial {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        excerpt: row.get(3)?,
        body: row.get(4)?,
        cover_image_url: row.get(5)?,
        is_ai_drafted: row.get::<_, i64>(6)? != 0,
        is_published: row.get::<_, i64>(7)? != 0,
        published_at: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

const EDITORIAL_COLUMNS: &str = "id, slug, title, excerpt, body, cover_image_url, \
     is_ai_drafted, is_published, published_at, created_at, updated_at";

fn row_to_scheduled_task(row: &rusqlite::Row) -> rusqlite::Result<ScheduledTask> {
    let task_type_str: String = row.get(1)?;
    let task_type =
        ScheduledTaskType::from_str(&task_type_str).unwrap_or(ScheduledTaskType::OrphanSweep);
    let status_str: String = row.get(6)?;
    let status = ScheduleStatus::from_str(&status_str).unwrap_or(ScheduleStatus::Pending);
    Ok(ScheduledTask {
        id: row.get(0)?,
        task_type,
        target: row.get(2)?,
        scheduled_at: row.get(3)?,
        hours_start: row.get::<_, Option<i64>>(4)?.map(|v| v as u8),
        hours_end: row.get::<_, Option<i64>>(5)?.map(|v| v as u8),
        status,
        created_at: row.get(7)?,
        started_at: row.get(8)?,
        completed_at: row.get(9)?,
        error_message: row.get(10)?,
    })
}

const TASK_COLUMNS: &str = "id, task_type, target, scheduled_at, hours_start, hours_end, \
     status, created_at, started_at, completed_at, error_message";

impl SqliteDb {
    pub fn open(path: &PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        // Cascades and SET NULL actions carry real semantics here.
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn })
    }

    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        self.run_migrations()?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        for migration in MIGRATIONS {
            let _ = self.conn.execute(migration, []);
        }
        Ok(())
    }

    // ========================================================================
    // Project operations
    // ========================================================================

    pub fn create_project(&self, slug: &str, title: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO projects (slug, title) VALUES (?, ?)",
            rusqlite::params![slug, title],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_project(&self, slug: &str) -> Result<Option<Project>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM projects WHERE slug = ?", PROJECT_COLUMNS),
            [slug],
            row_to_project,
        );
        match result {
            Ok(project) => Ok(Some(project)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_projects(&self, include_unpublished: bool) -> Result<Vec<Project>> {
        let sql = if include_unpublished {
            format!("SELECT {} FROM projects ORDER BY created_at DESC", PROJECT_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM projects WHERE is_published = 1 ORDER BY published_at DESC",
                PROJECT_COLUMNS
            )
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let projects = stmt
            .query_map([], row_to_project)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(projects)
    }

    pub fn update_project_details(&self, id: i64, details: &ProjectDetails) -> Result<()> {
        self.conn.execute(
            r#"
            UPDATE projects
            SET title = COALESCE(?, title),
                summary = COALESCE(?, summary),
                body = COALESCE(?, body),
                location = COALESCE(?, location),
                completed_year = COALESCE(?, completed_year),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
            rusqlite::params![
                details.title,
                details.summary,
                details.body,
                details.location,
                details.completed_year,
                id,
            ],
        )?;
        Ok(())
    }

    pub fn set_project_published(&self, id: i64, published: bool) -> Result<()> {
        if published {
            self.conn.execute(
                r#"
                UPDATE projects
                SET is_published = 1,
                    published_at = COALESCE(published_at, CURRENT_TIMESTAMP),
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ?
                "#,
                [id],
            )?;
        } else {
            self.conn.execute(
                "UPDATE projects SET is_published = 0, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                [id],
            )?;
        }
        Ok(())
    }

    pub fn delete_project(&self, id: i64) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM projects WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }

    pub fn set_project_hero(&self, project_id: i64, image_id: Option<i64>) -> Result<()> {
        match image_id {
            Some(image_id) => {
                let updated = self.conn.execute(
                    r#"
                    UPDATE projects
                    SET hero_image_id = ?, updated_at = CURRENT_TIMESTAMP
                    WHERE id = ?
                      AND EXISTS (
                          SELECT 1 FROM project_images WHERE id = ? AND project_id = ?
                      )
                    "#,
                    rusqlite::params![image_id, project_id, image_id, project_id],
                )?;
                if updated == 0 {
                    anyhow::bail!(
                        "image {} does not belong to project {}",
                        image_id,
                        project_id
                    );
                }
            }
            None => {
                self.conn.execute(
                    "UPDATE projects SET hero_image_id = NULL, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                    [project_id],
                )?;
            }
        }
        Ok(())
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
        self.conn.execute(
            r#"
            INSERT INTO project_images (project_id, url, storage_path, caption, alt_text, position)
            VALUES (?, ?, ?, ?, ?,
                    (SELECT COALESCE(MAX(position) + 1, 0) FROM project_images WHERE project_id = ?))
            "#,
            rusqlite::params![project_id, url, storage_path, caption, alt_text, project_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_project_image(&self, image_id: i64) -> Result<Option<ProjectImage>> {
        let result = self.conn.query_row(
            "SELECT id, url, storage_path, caption, alt_text FROM project_images WHERE id = ?",
            [image_id],
            |row| {
                Ok(ProjectImage {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    storage_path: row.get(2)?,
                    tags: BTreeSet::new(),
                    caption: row.get(3)?,
                    alt_text: row.get(4)?,
                })
            },
        );
        let mut image = match result {
            Ok(image) => image,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut stmt = self
            .conn
            .prepare("SELECT tag FROM image_tags WHERE image_id = ?")?;
        let tags: Vec<String> = stmt
            .query_map([image_id], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        image.tags = tags.iter().filter_map(|t| ImageTag::from_str(t)).collect();
        Ok(Some(image))
    }

    pub fn get_project_media(
        &self,
        project_id: i64,
    ) -> Result<(Vec<ProjectImage>, Vec<ImagePair>, Option<i64>)> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, url, storage_path, caption, alt_text
            FROM project_images
            WHERE project_id = ?
            ORDER BY position, id
            "#,
        )?;
        let mut images: Vec<ProjectImage> = stmt
            .query_map([project_id], |row| {
                Ok(ProjectImage {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    storage_path: row.get(2)?,
                    tags: BTreeSet::new(),
                    caption: row.get(3)?,
                    alt_text: row.get(4)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        let mut stmt = self.conn.prepare(
            r#"
            SELECT t.image_id, t.tag
            FROM image_tags t
            JOIN project_images i ON i.id = t.image_id
            WHERE i.project_id = ?
            "#,
        )?;
        let tag_rows: Vec<(i64, String)> = stmt
            .query_map([project_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .filter_map(|r| r.ok())
            .collect();
        for (image_id, tag) in tag_rows {
            if let Some(tag) = ImageTag::from_str(&tag) {
                if let Some(image) = images.iter_mut().find(|i| i.id == image_id) {
                    image.tags.insert(tag);
                }
            }
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, label, before_image_id, after_image_id
            FROM image_pairs
            WHERE project_id = ?
            ORDER BY position, id
            "#,
        )?;
        let pairs: Vec<ImagePair> = stmt
            .query_map([project_id], |row| {
                Ok(ImagePair {
                    id: row.get(0)?,
                    label: row.get(1)?,
                    before_image_id: row.get(2)?,
                    after_image_id: row.get(3)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        let hero = self.conn.query_row(
            "SELECT hero_image_id FROM projects WHERE id = ?",
            [project_id],
            |row| row.get::<_, Option<i64>>(0),
        );
        let hero = match hero {
            Ok(hero) => hero,
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        Ok((images, pairs, hero))
    }

    pub fn delete_project_image(&self, image_id: i64) -> Result<bool> {
        // Pair sides and the hero pointer are cleared by ON DELETE SET NULL.
        let deleted = self
            .conn
            .execute("DELETE FROM project_images WHERE id = ?", [image_id])?;
        Ok(deleted > 0)
    }

    /// Persist an edited media set in one transaction: image metadata
    /// and ordering, tag rows, the pair collection (replaced wholesale)
    /// and the hero pointer. Images missing from the set are removed
    /// from the catalog; their stored objects are reclaimed by the next
    /// orphan sweep. An image id that does not belong to the project
    /// aborts the whole save.
    pub fn save_project_media(&self, project_id: i64, set: &MediaSet) -> Result<()> {
        set.validate()?;
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "UPDATE projects SET hero_image_id = NULL WHERE id = ?",
            [project_id],
        )?;

        if set.images().is_empty() {
            tx.execute(
                "DELETE FROM project_images WHERE project_id = ?",
                [project_id],
            )?;
        } else {
            let kept: Vec<String> = set.images().iter().map(|i| i.id.to_string()).collect();
            tx.execute(
                &format!(
                    "DELETE FROM project_images WHERE project_id = ? AND id NOT IN ({})",
                    kept.join(", ")
                ),
                [project_id],
            )?;
        }

        for (position, image) in set.images().iter().enumerate() {
            let updated = tx.execute(
                r#"
                UPDATE project_images
                SET caption = ?, alt_text = ?, position = ?
                WHERE id = ? AND project_id = ?
                "#,
                rusqlite::params![
                    image.caption,
                    image.alt_text,
                    position as i64,
                    image.id,
                    project_id,
                ],
            )?;
            if updated == 0 {
                anyhow::bail!(
                    "image {} does not belong to project {}",
                    image.id,
                    project_id
                );
            }
            tx.execute("DELETE FROM image_tags WHERE image_id = ?", [image.id])?;
            for tag in &image.tags {
                tx.execute(
                    "INSERT INTO image_tags (image_id, tag) VALUES (?, ?)",
                    rusqlite::params![image.id, tag.as_str()],
                )?;
            }
        }

        tx.execute(
            "DELETE FROM image_pairs WHERE project_id = ?",
            [project_id],
        )?;
        for (position, pair) in set.pairs().iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO image_pairs (project_id, label, before_image_id, after_image_id, position)
                VALUES (?, ?, ?, ?, ?)
                "#,
                rusqlite::params![
                    project_id,
                    pair.label,
                    pair.before_image_id,
                    pair.after_image_id,
                    position as i64,
                ],
            )?;
        }

        match set.hero_image_id() {
            Some(hero) => {
                let updated = tx.execute(
                    r#"
                    UPDATE projects
                    SET hero_image_id = ?, updated_at = CURRENT_TIMESTAMP
                    WHERE id = ?
                      AND EXISTS (
                          SELECT 1 FROM project_images WHERE id = ? AND project_id = ?
                      )
                    "#,
                    rusqlite::params![hero, project_id, hero, project_id],
                )?;
                if updated == 0 {
                    anyhow::bail!("hero image {} does not belong to project {}", hero, project_id);
                }
            }
            None => {
                tx.execute(
                    "UPDATE projects SET updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                    [project_id],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Every storage path referenced by the catalog, across projects
    /// and listings. Used by the orphan sweep.
    pub fn all_storage_paths(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT storage_path FROM project_images WHERE storage_path IS NOT NULL
            UNION
            SELECT storage_path FROM listing_images WHERE storage_path IS NOT NULL
            "#,
        )?;
        let paths = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(paths)
    }

    // ========================================================================
    // Listing operations
    // ========================================================================

    pub fn create_listing(&self, slug: &str, title: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO listings (slug, title) VALUES (?, ?)",
            rusqlite::params![slug, title],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_listing(&self, slug: &str) -> Result<Option<Listing>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM listings WHERE slug = ?", LISTING_COLUMNS),
            [slug],
            row_to_listing,
        );
        match result {
            Ok(listing) => Ok(Some(listing)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_listings(&self, include_unpublished: bool) -> Result<Vec<Listing>> {
        let sql = if include_unpublished {
            format!("SELECT {} FROM listings ORDER BY created_at DESC", LISTING_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM listings WHERE is_published = 1 ORDER BY published_at DESC",
                LISTING_COLUMNS
            )
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let listings = stmt
            .query_map([], row_to_listing)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(listings)
    }

    pub fn set_listing_published(&self, id: i64, published: bool) -> Result<()> {
        if published {
            self.conn.execute(
                r#"
                UPDATE listings
                SET is_published = 1,
                    published_at = COALESCE(published_at, CURRENT_TIMESTAMP),
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ?
                "#,
                [id],
            )?;
        } else {
            self.conn.execute(
                "UPDATE listings SET is_published = 0, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                [id],
            )?;
        }
        Ok(())
    }

    pub fn set_listing_status(&self, id: i64, status: ListingStatus) -> Result<()> {
        self.conn.execute(
            "UPDATE listings SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            rusqlite::params![status.as_str(), id],
        )?;
        Ok(())
    }

    pub fn delete_listing(&self, id: i64) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM listings WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }

    pub fn insert_listing_image(
        &self,
        listing_id: i64,
        url: &str,
        storage_path: Option<&str>,
    ) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO listing_images (listing_id, url, storage_path, position)
            VALUES (?, ?, ?,
                    (SELECT COALESCE(MAX(position) + 1, 0) FROM listing_images WHERE listing_id = ?))
            "#,
            rusqlite::params![listing_id, url, storage_path, listing_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_listing_images(&self, listing_id: i64) -> Result<Vec<ListingImage>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, listing_id, url, storage_path, position
            FROM listing_images
            WHERE listing_id = ?
            ORDER BY position, id
            "#,
        )?;
        let images = stmt
            .query_map([listing_id], |row| {
                Ok(ListingImage {
                    id: row.get(0)?,
                    listing_id: row.get(1)?,
                    url: row.get(2)?,
                    storage_path: row.get(3)?,
                    position: row.get(4)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(images)
    }

    pub fn get_listing_image(&self, image_id: i64) -> Result<Option<ListingImage>> {
        let result = self.conn.query_row(
            "SELECT id, listing_id, url, storage_path, position FROM listing_images WHERE id = ?",
            [image_id],
            |row| {
                Ok(ListingImage {
                    id: row.get(0)?,
                    listing_id: row.get(1)?,
                    url: row.get(2)?,
                    storage_path: row.get(3)?,
                    position: row.get(4)?,
                })
            },
        );
        match result {
            Ok(image) => Ok(Some(image)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete_listing_image(&self, image_id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM listing_images WHERE id = ?", [image_id])?;
        Ok(deleted > 0)
    }

    pub fn get_listings_for_export(&self) -> Result<Vec<ExportedListingRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT l.slug, l.title, l.address, l.price_cents, l.bedrooms, l.bathrooms,
                   l.area_sqm, l.status, l.is_published, l.published_at,
                   (SELECT COUNT(*) FROM listing_images li WHERE li.listing_id = l.id)
            FROM listings l
            ORDER BY l.slug
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ExportedListingRow {
                    slug: row.get(0)?,
                    title: row.get(1)?,
                    address: row.get(2)?,
                    price_cents: row.get(3)?,
                    bedrooms: row.get(4)?,
                    bathrooms: row.get(5)?,
                    area_sqm: row.get(6)?,
                    status: row.get(7)?,
                    is_published: row.get::<_, i64>(8)? != 0,
                    published_at: row.get(9)?,
                    image_count: row.get(10)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    // ========================================================================
    // Editorial operations
    // ========================================================================

    pub fn create_editorial(&self, slug: &str, title: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO editorials (slug, title) VALUES (?, ?)",
            rusqlite::params![slug, title],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert or refresh a draft, keyed by slug. Drafting is idempotent
    /// per slug so re-running the assistant replaces the previous text.
    pub fn upsert_editorial_draft(
        &self,
        slug: &str,
        title: &str,
        excerpt: Option<&str>,
        body: &str,
        ai_drafted: bool,
    ) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO editorials (slug, title, excerpt, body, is_ai_drafted)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(slug) DO UPDATE SET
                title = excluded.title,
                excerpt = excluded.excerpt,
                body = excluded.body,
                is_ai_drafted = excluded.is_ai_drafted,
                updated_at = CURRENT_TIMESTAMP
            "#,
            rusqlite::params![slug, title, excerpt, body, ai_drafted as i64],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM editorials WHERE slug = ?",
            [slug],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn get_editorial(&self, slug: &str) -> Result<Option<Editorial>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM editorials WHERE slug = ?", EDITORIAL_COLUMNS),
            [slug],
            row_to_editorial,
        );
        match result {
            Ok(editorial) => Ok(Some(editorial)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_editorials(&self, include_unpublished: bool) -> Result<Vec<Editorial>> {
        let sql = if include_unpublished {
            format!("SELECT {} FROM editorials ORDER BY created_at DESC", EDITORIAL_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM editorials WHERE is_published = 1 ORDER BY published_at DESC",
                EDITORIAL_COLUMNS
            )
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let editorials = stmt
            .query_map([], row_to_editorial)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(editorials)
    }

    pub fn set_editorial_published(&self, id: i64, published: bool) -> Result<()> {
        if published {
            self.conn.execute(
                r#"
                UPDATE editorials
                SET is_published = 1,
                    published_at = COALESCE(published_at, CURRENT_TIMESTAMP),
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ?
                "#,
                [id],
            )?;
        } else {
            self.conn.execute(
                "UPDATE editorials SET is_published = 0, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                [id],
            )?;
        }
        Ok(())
    }

    pub fn delete_editorial(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM editorials WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }

    // ========================================================================
    // Instagram cache operations
    // ========================================================================

    pub fn get_cached_feed(&self) -> Result<Option<CachedFeed>> {
        let result = self.conn.query_row(
            "SELECT payload, fetched_at FROM instagram_cache WHERE id = 1",
            [],
            |row| {
                Ok(CachedFeed {
                    payload: row.get(0)?,
                    fetched_at: row.get(1)?,
                })
            },
        );
        match result {
            Ok(feed) => Ok(Some(feed)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn store_cached_feed(&self, payload: &str) -> Result<()> {
        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        self.conn.execute(
            r#"
            INSERT INTO instagram_cache (id, payload, fetched_at)
            VALUES (1, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                payload = excluded.payload,
                fetched_at = excluded.fetched_at
            "#,
            rusqlite::params![payload, now],
        )?;
        Ok(())
    }

    // ========================================================================
    // Site settings operations
    // ========================================================================

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT value FROM site_settings WHERE key = ?",
            [key],
            |row| row.get(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO site_settings (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP
            "#,
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    pub fn all_settings(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM site_settings ORDER BY key")?;
        let settings = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(settings)
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
        self.conn.execute(
            r#"
            INSERT INTO scheduled_tasks (task_type, target, scheduled_at, hours_start, hours_end)
            VALUES (?, ?, ?, ?, ?)
            "#,
            rusqlite::params![task_type.as_str(), target, scheduled_at, hours_start, hours_end],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_pending_schedules(&self) -> Result<Vec<ScheduledTask>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM scheduled_tasks WHERE status = 'pending' ORDER BY scheduled_at ASC",
            TASK_COLUMNS
        ))?;
        let tasks = stmt
            .query_map([], row_to_scheduled_task)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(tasks)
    }

    pub fn get_overdue_schedules(&self, now: &str) -> Result<Vec<ScheduledTask>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM scheduled_tasks WHERE status = 'pending' AND scheduled_at < ? ORDER BY scheduled_at ASC",
            TASK_COLUMNS
        ))?;
        let tasks = stmt
            .query_map([now], row_to_scheduled_task)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(tasks)
    }

    pub fn get_due_pending_tasks(&self, limit: usize) -> Result<Vec<ScheduledTask>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {}
            FROM scheduled_tasks
            WHERE status = 'pending'
              AND datetime(scheduled_at) <= datetime('now')
            ORDER BY scheduled_at ASC
            LIMIT ?
            "#,
            TASK_COLUMNS
        ))?;
        let tasks = stmt
            .query_map([limit as i64], row_to_scheduled_task)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(tasks)
    }

    pub fn mark_task_running(&self, task_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE scheduled_tasks SET status = 'running', started_at = CURRENT_TIMESTAMP WHERE id = ?",
            [task_id],
        )?;
        Ok(())
    }

    pub fn mark_task_completed(&self, task_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE scheduled_tasks SET status = 'completed', completed_at = CURRENT_TIMESTAMP WHERE id = ?",
            [task_id],
        )?;
        Ok(())
    }

    pub fn mark_task_failed(&self, task_id: i64, error: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE scheduled_tasks SET status = 'failed', error_message = ?, completed_at = CURRENT_TIMESTAMP WHERE id = ?",
            rusqlite::params![error, task_id],
        )?;
        Ok(())
    }

    pub fn cancel_schedule(&self, task_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE scheduled_tasks SET status = 'cancelled', completed_at = CURRENT_TIMESTAMP WHERE id = ?",
            [task_id],
        )?;
        Ok(())
    }

    // ========================================================================
    // Counts (status reporting)
    // ========================================================================

    pub fn count_projects(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_listings(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_editorials(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM editorials", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_project_images(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM project_images", [], |row| row.get(0))?;
        Ok(count)
    }
}
