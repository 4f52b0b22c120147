//! PostgreSQL backend implementation.

use anyhow::Result;
use postgres::NoTls;
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;
use std::collections::BTreeSet;

use super::editorials::Editorial;
use super::instagram::CachedFeed;
use super::listings::{Listing, ListingImage, ListingStatus};
use super::postgres_schema::POSTGRES_SCHEMA;
use super::projects::{Project, ProjectDetails};
use super::schedule::{ScheduleStatus, ScheduledTask, ScheduledTaskType};
use super::ExportedListingRow;
use crate::media::{ImagePair, ImageTag, MediaSet, ProjectImage};

pub struct PgDb {
    pool: Pool<PostgresConnectionManager<NoTls>>,
}

fn row_to_project(row: &postgres::Row) -> Project {
    Project {
        id: row.get(0),
        slug: row.get(1),
        title: row.get(2),
        summary: row.get(3),
        body: row.get(4),
        location: row.get(5),
        completed_year: row.get(6),
        hero_image_id: row.get(7),
        is_published: row.get(8),
        published_at: row.get(9),
        created_at: row.get(10),
        updated_at: row.get(11),
    }
}

const PROJECT_COLUMNS: &str = "id, slug, title, summary, body, location, completed_year, \
     hero_image_id, is_published, published_at, created_at, updated_at";

fn row_to_listing(row: &postgres::Row) -> Listing {
    let status_str: String = row.get(9);
    Listing {
        id: row.get(0),
        slug: row.get(1),
        title: row.get(2),
        description: row.get(3),
        address: row.get(4),
        price_cents: row.get(5),
        bedrooms: row.get(6),
        bathrooms: row.get(7),
        area_sqm: row.get(8),
        status: ListingStatus::from_str(&status_str).unwrap_or(ListingStatus::Available),
        is_published: row.get(10),
        published_at: row.get(11),
        created_at: row.get(12),
        updated_at: row.get(13),
    }
}

const LISTING_COLUMNS: &str = "id, slug, title, description, address, price_cents, bedrooms, \
     bathrooms, area_sqm, status, is_published, published_at, created_at, updated_at";

fn row_to_editorial(row: &postgres::Row) -> Editorial {
    Editorial {
        id: row.get(0),
        slug: row.get(1),
        title: row.get(2),
        excerpt: row.get(3),
        body: row.get(4),
        cover_image_url: row.get(5),
        is_ai_drafted: row.get(6),
        is_published: row.get(7),
        published_at: row.get(8),
        created_at: row.get(9),
        updated_at: row.get(10),
    }
}

const EDITORIAL_COLUMNS: &str = "id, slug, title, excerpt, body, cover_image_url, \
     is_ai_drafted, is_published, published_at, created_at, updated_at";

fn row_to_scheduled_task(row: &postgres::Row) -> ScheduledTask {
    let task_type_str: String = row.get(1);
    let task_type =
        ScheduledTaskType::from_str(&task_type_str).unwrap_or(ScheduledTaskType::OrphanSweep);
    let status_str: String = row.get(6);
    let status = ScheduleStatus::from_str(&status_str).unwrap_or(ScheduleStatus::Pending);
    let hours_start: Option<i32> = row.get(4);
    let hours_end: Option<i32> = row.get(5);
    ScheduledTask {
        id: row.get(0),
        task_type,
        target: row.get(2),
        scheduled_at: row.get(3),
        hours_start: hours_start.map(|v| v as u8),
        hours_end: hours_end.map(|v| v as u8),
        status,
        created_at: row.get(7),
        started_at: row.get(8),
        completed_at: row.get(9),
        error_message: row.get(10),
    }
}

const TASK_COLUMNS: &str = "id, task_type, target, scheduled_at, hours_start, hours_end, \
     status, created_at, started_at, completed_at, error_message";

impl PgDb {
    pub fn open(url: &str, pool_size: u32) -> Result<Self> {
        let manager = PostgresConnectionManager::new(url.parse()?, NoTls);
        let pool = Pool::builder().max_size(pool_size).build(manager)?;
        Ok(Self { pool })
    }

    pub fn initialize(&self) -> Result<()> {
        let mut client = self.pool.get()?;
        client.batch_execute(POSTGRES_SCHEMA)?;
        Ok(())
    }

    // ========================================================================
    // Project operations
    // ========================================================================

    pub fn create_project(&self, slug: &str, title: &str) -> Result<i64> {
        let mut client = self.pool.get()?;
        let row = client.query_one(
            "INSERT INTO projects (slug, title) VALUES ($1, $2) RETURNING id",
            &[&slug, &title],
        )?;
        Ok(row.get(0))
    }

    pub fn get_project(&self, slug: &str) -> Result<Option<Project>> {
        let mut client = self.pool.get()?;
        let sql = format!("SELECT {} FROM projects WHERE slug = $1", PROJECT_COLUMNS);
        let row = client.query_opt(sql.as_str(), &[&slug])?;
        Ok(row.map(|r| row_to_project(&r)))
    }

    pub fn list_projects(&self, include_unpublished: bool) -> Result<Vec<Project>> {
        let sql = if include_unpublished {
            format!("SELECT {} FROM projects ORDER BY created_at DESC", PROJECT_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM projects WHERE is_published ORDER BY published_at DESC",
                PROJECT_COLUMNS
            )
        };
        let mut client = self.pool.get()?;
        let rows = client.query(sql.as_str(), &[])?;
        Ok(rows.iter().map(row_to_project).collect())
    }

    pub fn update_project_details(&self, id: i64, details: &ProjectDetails) -> Result<()> {
        let mut client = self.pool.get()?;
        client.execute(
            r#"
            UPDATE projects
            SET title = COALESCE($1, title),
                summary = COALESCE($2, summary),
                body = COALESCE($3, body),
                location = COALESCE($4, location),
                completed_year = COALESCE($5, completed_year),
                updated_at = NOW()::TEXT
            WHERE id = $6
            "#,
            &[
                &details.title,
                &details.summary,
                &details.body,
                &details.location,
                &details.completed_year,
                &id,
            ],
        )?;
        Ok(())
    }

    pub fn set_project_published(&self, id: i64, published: bool) -> Result<()> {
        let mut client = self.pool.get()?;
        if published {
            client.execute(
                r#"
                UPDATE projects
                SET is_published = TRUE,
                    published_at = COALESCE(published_at, NOW()::TEXT),
                    updated_at = NOW()::TEXT
                WHERE id = $1
                "#,
                &[&id],
            )?;
        } else {
            client.execute(
                "UPDATE projects SET is_published = FALSE, updated_at = NOW()::TEXT WHERE id = $1",
                &[&id],
            )?;
        }
        Ok(())
    }

    pub fn delete_project(&self, id: i64) -> Result<bool> {
        let mut client = self.pool.get()?;
        let deleted = client.execute("DELETE FROM projects WHERE id = $1", &[&id])?;
        Ok(deleted > 0)
    }

    pub fn set_project_hero(&self, project_id: i64, image_id: Option<i64>) -> Result<()> {
        let mut client = self.pool.get()?;
        match image_id {
            Some(image_id) => {
                let updated = client.execute(
                    r#"
                    UPDATE projects
                    SET hero_image_id = $1, updated_at = NOW()::TEXT
                    WHERE id = $2
                      AND EXISTS (
                          SELECT 1 FROM project_images WHERE id = $1 AND project_id = $2
                      )
                    "#,
                    &[&image_id, &project_id],
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
                client.execute(
                    "UPDATE projects SET hero_image_id = NULL, updated_at = NOW()::TEXT WHERE id = $1",
                    &[&project_id],
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
        let mut client = self.pool.get()?;
        let row = client.query_one(
            r#"
            INSERT INTO project_images (project_id, url, storage_path, caption, alt_text, position)
            VALUES ($1, $2, $3, $4, $5,
                    (SELECT COALESCE(MAX(position) + 1, 0) FROM project_images WHERE project_id = $1))
            RETURNING id
            "#,
            &[&project_id, &url, &storage_path, &caption, &alt_text],
        )?;
        Ok(row.get(0))
    }

    pub fn get_project_image(&self, image_id: i64) -> Result<Option<ProjectImage>> {
        let mut client = self.pool.get()?;
        let row = client.query_opt(
            "SELECT id, url, storage_path, caption, alt_text FROM project_images WHERE id = $1",
            &[&image_id],
        )?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut image = ProjectImage {
            id: row.get(0),
            url: row.get(1),
            storage_path: row.get(2),
            tags: BTreeSet::new(),
            caption: row.get(3),
            alt_text: row.get(4),
        };
        let tag_rows = client.query(
            "SELECT tag FROM image_tags WHERE image_id = $1",
            &[&image_id],
        )?;
        image.tags = tag_rows
            .iter()
            .filter_map(|r| ImageTag::from_str(r.get(0)))
            .collect();
        Ok(Some(image))
    }

    pub fn get_project_media(
        &self,
        project_id: i64,
    ) -> Result<(Vec<ProjectImage>, Vec<ImagePair>, Option<i64>)> {
        let mut client = self.pool.get()?;
        let rows = client.query(
            r#"
            SELECT id, url, storage_path, caption, alt_text
            FROM project_images
            WHERE project_id = $1
            ORDER BY position, id
            "#,
            &[&project_id],
        )?;
        let mut images: Vec<ProjectImage> = rows
            .iter()
            .map(|row| ProjectImage {
                id: row.get(0),
                url: row.get(1),
                storage_path: row.get(2),
                tags: BTreeSet::new(),
                caption: row.get(3),
                alt_text: row.get(4),
            })
            .collect();

        let tag_rows = client.query(
            r#"
            SELECT t.image_id, t.tag
            FROM image_tags t
            JOIN project_images i ON i.id = t.image_id
            WHERE i.project_id = $1
            "#,
            &[&project_id],
        )?;
        for row in &tag_rows {
            let image_id: i64 = row.get(0);
            if let Some(tag) = ImageTag::from_str(row.get(1)) {
                if let Some(image) = images.iter_mut().find(|i| i.id == image_id) {
                    image.tags.insert(tag);
                }
            }
        }

        let pair_rows = client.query(
            r#"
            SELECT id, label, before_image_id, after_image_id
            FROM image_pairs
            WHERE project_id = $1
            ORDER BY position, id
            "#,
            &[&project_id],
        )?;
        let pairs: Vec<ImagePair> = pair_rows
            .iter()
            .map(|row| ImagePair {
                id: row.get(0),
                label: row.get(1),
                before_image_id: row.get(2),
                after_image_id: row.get(3),
            })
            .collect();

        let hero_row = client.query_opt(
            "SELECT hero_image_id FROM projects WHERE id = $1",
            &[&project_id],
        )?;
        let hero = hero_row.and_then(|r| r.get::<_, Option<i64>>(0));

        Ok((images, pairs, hero))
    }

    pub fn delete_project_image(&self, image_id: i64) -> Result<bool> {
        // Pair sides and the hero pointer are cleared by ON DELETE SET NULL.
        let mut client = self.pool.get()?;
        let deleted = client.execute("DELETE FROM project_images WHERE id = $1", &[&image_id])?;
        Ok(deleted > 0)
    }

    pub fn save_project_media(&self, project_id: i64, set: &MediaSet) -> Result<()> {
        set.validate()?;
        let mut client = self.pool.get()?;
        let mut tx = client.transaction()?;

        tx.execute(
            "UPDATE projects SET hero_image_id = NULL WHERE id = $1",
            &[&project_id],
        )?;

        if set.images().is_empty() {
            tx.execute(
                "DELETE FROM project_images WHERE project_id = $1",
                &[&project_id],
            )?;
        } else {
            let kept: Vec<String> = set.images().iter().map(|i| i.id.to_string()).collect();
            let sql = format!(
                "DELETE FROM project_images WHERE project_id = $1 AND id NOT IN ({})",
                kept.join(", ")
            );
            tx.execute(sql.as_str(), &[&project_id])?;
        }

        for (position, image) in set.images().iter().enumerate() {
            let updated = tx.execute(
                r#"
                UPDATE project_images
                SET caption = $1, alt_text = $2, position = $3
                WHERE id = $4 AND project_id = $5
                "#,
                &[
                    &image.caption,
                    &image.alt_text,
                    &(position as i64),
                    &image.id,
                    &project_id,
                ],
            )?;
            if updated == 0 {
                anyhow::bail!(
                    "image {} does not belong to project {}",
                    image.id,
                    project_id
                );
            }
            tx.execute("DELETE FROM image_tags WHERE image_id = $1", &[&image.id])?;
            for tag in &image.tags {
                tx.execute(
                    "INSERT INTO image_tags (image_id, tag) VALUES ($1, $2)",
                    &[&image.id, &tag.as_str()],
                )?;
            }
        }

        tx.execute(
            "DELETE FROM image_pairs WHERE project_id = $1",
            &[&project_id],
        )?;
        for (position, pair) in set.pairs().iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO image_pairs (project_id, label, before_image_id, after_image_id, position)
                VALUES ($1, $2, $3, $4, $5)
                "#,
                &[
                    &project_id,
                    &pair.label,
                    &pair.before_image_id,
                    &pair.after_image_id,
                    &(position as i64),
                ],
            )?;
        }

        match set.hero_image_id() {
            Some(hero) => {
                let updated = tx.execute(
                    r#"
                    UPDATE projects
                    SET hero_image_id = $1, updated_at = NOW()::TEXT
                    WHERE id = $2
                      AND EXISTS (
                          SELECT 1 FROM project_images WHERE id = $1 AND project_id = $2
                      )
                    "#,
                    &[&hero, &project_id],
                )?;
                if updated == 0 {
                    anyhow::bail!("hero image {} does not belong to project {}", hero, project_id);
                }
            }
            None => {
                tx.execute(
                    "UPDATE projects SET updated_at = NOW()::TEXT WHERE id = $1",
                    &[&project_id],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    pub fn all_storage_paths(&self) -> Result<Vec<String>> {
        let mut client = self.pool.get()?;
        let rows = client.query(
            r#"
            SELECT storage_path FROM project_images WHERE storage_path IS NOT NULL
            UNION
            SELECT storage_path FROM listing_images WHERE storage_path IS NOT NULL
            "#,
            &[],
        )?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    // ========================================================================
    // Listing operations
    // ========================================================================

    pub fn create_listing(&self, slug: &str, title: &str) -> Result<i64> {
        let mut client = self.pool.get()?;
        let row = client.query_one(
            "INSERT INTO listings (slug, title) VALUES ($1, $2) RETURNING id",
            &[&slug, &title],
        )?;
        Ok(row.get(0))
    }

    pub fn get_listing(&self, slug: &str) -> Result<Option<Listing>> {
        let mut client = self.pool.get()?;
        let sql = format!("SELECT {} FROM listings WHERE slug = $1", LISTING_COLUMNS);
        let row = client.query_opt(sql.as_str(), &[&slug])?;
        Ok(row.map(|r| row_to_listing(&r)))
    }

    pub fn list_listings(&self, include_unpublished: bool) -> Result<Vec<Listing>> {
        let sql = if include_unpublished {
            format!("SELECT {} FROM listings ORDER BY created_at DESC", LISTING_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM listings WHERE is_published ORDER BY published_at DESC",
                LISTING_COLUMNS
            )
        };
        let mut client = self.pool.get()?;
        let rows = client.query(sql.as_str(), &[])?;
        Ok(rows.iter().map(row_to_listing).collect())
    }

    pub fn set_listing_published(&self, id: i64, published: bool) -> Result<()> {
        let mut client = self.pool.get()?;
        if published {
            client.execute(
                r#"
                UPDATE listings
                SET is_published = TRUE,
                    published_at = COALESCE(published_at, NOW()::TEXT),
                    updated_at = NOW()::TEXT
                WHERE id = $1
                "#,
                &[&id],
            )?;
        } else {
            client.execute(
                "UPDATE listings SET is_published = FALSE, updated_at = NOW()::TEXT WHERE id = $1",
                &[&id],
            )?;
        }
        Ok(())
    }

    pub fn set_listing_status(&self, id: i64, status: ListingStatus) -> Result<()> {
        let mut client = self.pool.get()?;
        client.execute(
            "UPDATE listings SET status = $1, updated_at = NOW()::TEXT WHERE id = $2",
            &[&status.as_str(), &id],
        )?;
        Ok(())
    }

    pub fn delete_listing(&self, id: i64) -> Result<bool> {
        let mut client = self.pool.get()?;
        let deleted = client.execute("DELETE FROM listings WHERE id = $1", &[&id])?;
        Ok(deleted > 0)
    }

    pub fn insert_listing_image(
        &self,
        listing_id: i64,
        url: &str,
        storage_path: Option<&str>,
    ) -> Result<i64> {
        let mut client = self.pool.get()?;
        let row = client.query_one(
            r#"
            INSERT INTO listing_images (listing_id, url, storage_path, position)
            VALUES ($1, $2, $3,
                    (SELECT COALESCE(MAX(position) + 1, 0) FROM listing_images WHERE listing_id = $1))
            RETURNING id
            "#,
            &[&listing_id, &url, &storage_path],
        )?;
        Ok(row.get(0))
    }

    pub fn get_listing_images(&self, listing_id: i64) -> Result<Vec<ListingImage>> {
        let mut client = self.pool.get()?;
        let rows = client.query(
            r#"
            SELECT id, listing_id, url, storage_path, position
            FROM listing_images
            WHERE listing_id = $1
            ORDER BY position, id
            "#,
            &[&listing_id],
        )?;
        Ok(rows
            .iter()
            .map(|row| ListingImage {
                id: row.get(0),
                listing_id: row.get(1),
                url: row.get(2),
                storage_path: row.get(3),
                position: row.get(4),
            })
            .collect())
    }

    pub fn get_listing_image(&self, image_id: i64) -> Result<Option<ListingImage>> {
        let mut client = self.pool.get()?;
        let row = client.query_opt(
            "SELECT id, listing_id, url, storage_path, position FROM listing_images WHERE id = $1",
            &[&image_id],
        )?;
        Ok(row.map(|row| ListingImage {
            id: row.get(0),
            listing_id: row.get(1),
            url: row.get(2),
            storage_path: row.get(3),
            position: row.get(4),
        }))
    }

    pub fn delete_listing_image(&self, image_id: i64) -> Result<bool> {
        let mut client = self.pool.get()?;
        let deleted = client.execute("DELETE FROM listing_images WHERE id = $1", &[&image_id])?;
        Ok(deleted > 0)
    }

    pub fn get_listings_for_export(&self) -> Result<Vec<ExportedListingRow>> {
        let mut client = self.pool.get()?;
        let rows = client.query(
            r#"
            SELECT l.slug, l.title, l.address, l.price_cents, l.bedrooms, l.bathrooms,
                   l.area_sqm, l.status, l.is_published, l.published_at,
                   (SELECT COUNT(*) FROM listing_images li WHERE li.listing_id = l.id)
            FROM listings l
            ORDER BY l.slug
            "#,
            &[],
        )?;
        Ok(rows
            .iter()
            .map(|row| ExportedListingRow {
                slug: row.get(0),
                title: row.get(1),
                address: row.get(2),
                price_cents: row.get(3),
                bedrooms: row.get(4),
                bathrooms: row.get(5),
                area_sqm: row.get(6),
                status: row.get(7),
                is_published: row.get(8),
                published_at: row.get(9),
                image_count: row.get(10),
            })
            .collect())
    }

    // ========================================================================
    // Editorial operations
    // ========================================================================

    pub fn create_editorial(&self, slug: &str, title: &str) -> Result<i64> {
        let mut client = self.pool.get()?;
        let row = client.query_one(
            "INSERT INTO editorials (slug, title) VALUES ($1, $2) RETURNING id",
            &[&slug, &title],
        )?;
        Ok(row.get(0))
    }

    pub fn upsert_editorial_draft(
        &self,
        slug: &str,
        title: &str,
        excerpt: Option<&str>,
        body: &str,
        ai_drafted: bool,
    ) -> Result<i64> {
        let mut client = self.pool.get()?;
        let row = client.query_one(
            r#"
            INSERT INTO editorials (slug, title, excerpt, body, is_ai_drafted)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (slug) DO UPDATE SET
                title = excluded.title,
                excerpt = excluded.excerpt,
                body = excluded.body,
                is_ai_drafted = excluded.is_ai_drafted,
                updated_at = NOW()::TEXT
            RETURNING id
            "#,
            &[&slug, &title, &excerpt, &body, &ai_drafted],
        )?;
        Ok(row.get(0))
    }

    pub fn get_editorial(&self, slug: &str) -> Result<Option<Editorial>> {
        let mut client = self.pool.get()?;
        let sql = format!("SELECT {} FROM editorials WHERE slug = $1", EDITORIAL_COLUMNS);
        let row = client.query_opt(sql.as_str(), &[&slug])?;
        Ok(row.map(|r| row_to_editorial(&r)))
    }

    pub fn list_editorials(&self, include_unpublished: bool) -> Result<Vec<Editorial>> {
        let sql = if include_unpublished {
            format!("SELECT {} FROM editorials ORDER BY created_at DESC", EDITORIAL_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM editorials WHERE is_published ORDER BY published_at DESC",
                EDITORIAL_COLUMNS
            )
        };
        let mut client = self.pool.get()?;
        let rows = client.query(sql.as_str(), &[])?;
        Ok(rows.iter().map(row_to_editorial).collect())
    }

    pub fn set_editorial_published(&self, id: i64, published: bool) -> Result<()> {
        let mut client = self.pool.get()?;
        if published {
            client.execute(
                r#"
                UPDATE editorials
                SET is_published = TRUE,
                    published_at = COALESCE(published_at, NOW()::TEXT),
                    updated_at = NOW()::TEXT
                WHERE id = $1
                "#,
                &[&id],
            )?;
        } else {
            client.execute(
                "UPDATE editorials SET is_published = FALSE, updated_at = NOW()::TEXT WHERE id = $1",
                &[&id],
            )?;
        }
        Ok(())
    }

    pub fn delete_editorial(&self, id: i64) -> Result<bool> {
        let mut client = self.pool.get()?;
        let deleted = client.execute("DELETE FROM editorials WHERE id = $1", &[&id])?;
        Ok(deleted > 0)
    }

    // ========================================================================
    // Instagram cache operations
    // ========================================================================

    pub fn get_cached_feed(&self) -> Result<Option<CachedFeed>> {
        let mut client = self.pool.get()?;
        let row = client.query_opt(
            "SELECT payload, fetched_at FROM instagram_cache WHERE id = 1",
            &[],
        )?;
        Ok(row.map(|r| CachedFeed {
            payload: r.get(0),
            fetched_at: r.get(1),
        }))
    }

    pub fn store_cached_feed(&self, payload: &str) -> Result<()> {
        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        let mut client = self.pool.get()?;
        client.execute(
            r#"
            INSERT INTO instagram_cache (id, payload, fetched_at)
            VALUES (1, $1, $2)
            ON CONFLICT (id) DO UPDATE SET
                payload = excluded.payload,
                fetched_at = excluded.fetched_at
            "#,
            &[&payload, &now],
        )?;
        Ok(())
    }

    // ========================================================================
    // Site settings operations
    // ========================================================================

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut client = self.pool.get()?;
        let row = client.query_opt("SELECT value FROM site_settings WHERE key = $1", &[&key])?;
        Ok(row.map(|r| r.get(0)))
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let mut client = self.pool.get()?;
        client.execute(
            r#"
            INSERT INTO site_settings (key, value, updated_at)
            VALUES ($1, $2, NOW()::TEXT)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = NOW()::TEXT
            "#,
            &[&key, &value],
        )?;
        Ok(())
    }

    pub fn all_settings(&self) -> Result<Vec<(String, String)>> {
        let mut client = self.pool.get()?;
        let rows = client.query("SELECT key, value FROM site_settings ORDER BY key", &[])?;
        Ok(rows.iter().map(|r| (r.get(0), r.get(1))).collect())
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
        let mut client = self.pool.get()?;
        let row = client.query_one(
            r#"
            INSERT INTO scheduled_tasks (task_type, target, scheduled_at, hours_start, hours_end)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
            &[
                &task_type.as_str(),
                &target,
                &scheduled_at,
                &hours_start.map(|v| v as i32),
                &hours_end.map(|v| v as i32),
            ],
        )?;
        Ok(row.get(0))
    }

    pub fn get_pending_schedules(&self) -> Result<Vec<ScheduledTask>> {
        let mut client = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM scheduled_tasks WHERE status = 'pending' ORDER BY scheduled_at ASC",
            TASK_COLUMNS
        );
        let rows = client.query(sql.as_str(), &[])?;
        Ok(rows.iter().map(row_to_scheduled_task).collect())
    }

    pub fn get_overdue_schedules(&self, now: &str) -> Result<Vec<ScheduledTask>> {
        let mut client = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM scheduled_tasks WHERE status = 'pending' AND scheduled_at < $1 ORDER BY scheduled_at ASC",
            TASK_COLUMNS
        );
        let rows = client.query(sql.as_str(), &[&now])?;
        Ok(rows.iter().map(row_to_scheduled_task).collect())
    }

    pub fn get_due_pending_tasks(&self, limit: usize) -> Result<Vec<ScheduledTask>> {
        let mut client = self.pool.get()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM scheduled_tasks
            WHERE status = 'pending'
              AND scheduled_at::TIMESTAMP <= (NOW() AT TIME ZONE 'utc')
            ORDER BY scheduled_at ASC
            LIMIT $1
            "#,
            TASK_COLUMNS
        );
        let rows = client.query(sql.as_str(), &[&(limit as i64)])?;
        Ok(rows.iter().map(row_to_scheduled_task).collect())
    }

    pub fn mark_task_running(&self, task_id: i64) -> Result<()> {
        let mut client = self.pool.get()?;
        client.execute(
            "UPDATE scheduled_tasks SET status = 'running', started_at = NOW()::TEXT WHERE id = $1",
            &[&task_id],
        )?;
        Ok(())
    }

    pub fn mark_task_completed(&self, task_id: i64) -> Result<()> {
        let mut client = self.pool.get()?;
        client.execute(
            "UPDATE scheduled_tasks SET status = 'completed', completed_at = NOW()::TEXT WHERE id = $1",
            &[&task_id],
        )?;
        Ok(())
    }

    pub fn mark_task_failed(&self, task_id: i64, error: &str) -> Result<()> {
        let mut client = self.pool.get()?;
        client.execute(
            "UPDATE scheduled_tasks SET status = 'failed', error_message = $1, completed_at = NOW()::TEXT WHERE id = $2",
            &[&error, &task_id],
        )?;
        Ok(())
    }

    pub fn cancel_schedule(&self, task_id: i64) -> Result<()> {
        let mut client = self.pool.get()?;
        client.execute(
            "UPDATE scheduled_tasks SET status = 'cancelled', completed_at = NOW()::TEXT WHERE id = $1",
            &[&task_id],
        )?;
        Ok(())
    }

    // ========================================================================
    // Counts (status reporting)
    // ========================================================================

    pub fn count_projects(&self) -> Result<i64> {
        let mut client = self.pool.get()?;
        let row = client.query_one("SELECT COUNT(*) FROM projects", &[])?;
        Ok(row.get(0))
    }

    pub fn count_listings(&self) -> Result<i64> {
        let mut client = self.pool.get()?;
        let row = client.query_one("SELECT COUNT(*) FROM listings", &[])?;
        Ok(row.get(0))
    }

    pub fn count_editorials(&self) -> Result<i64> {
        let mut client = self.pool.get()?;
        let row = client.query_one("SELECT COUNT(*) FROM editorials", &[])?;
        Ok(row.get(0))
    }

    pub fn count_project_images(&self) -> Result<i64> {
        let mut client = self.pool.get()?;
        let row = client.query_one("SELECT COUNT(*) FROM project_images", &[])?;
        Ok(row.get(0))
    }
}
