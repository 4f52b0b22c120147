pub const POSTGRES_SCHEMA: &str = r#"
-- PostgreSQL schema for Renova

CREATE TABLE IF NOT EXISTS projects (
    id BIGSERIAL PRIMARY KEY,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    summary TEXT,
    body TEXT,
    location TEXT,
    completed_year BIGINT,

    -- FK added below, after project_images exists
    hero_image_id BIGINT,

    is_published BOOLEAN NOT NULL DEFAULT FALSE,
    published_at TEXT,

    created_at TEXT NOT NULL DEFAULT (NOW()::TEXT),
    updated_at TEXT NOT NULL DEFAULT (NOW()::TEXT)
);

CREATE INDEX IF NOT EXISTS idx_projects_published ON projects(is_published);

CREATE TABLE IF NOT EXISTS project_images (
    id BIGSERIAL PRIMARY KEY,
    project_id BIGINT NOT NULL,
    url TEXT NOT NULL,
    storage_path TEXT,
    caption TEXT,
    alt_text TEXT,
    position BIGINT NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (NOW()::TEXT),
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_project_images_project ON project_images(project_id, position);

-- The hero pointer references a child table, so the constraint is added
-- once both tables exist; guarded so re-running the schema is harmless.
DO $$
BEGIN
    IF NOT EXISTS (
        SELECT 1 FROM pg_constraint WHERE conname = 'projects_hero_image_fk'
    ) THEN
        ALTER TABLE projects
            ADD CONSTRAINT projects_hero_image_fk
            FOREIGN KEY (hero_image_id) REFERENCES project_images(id) ON DELETE SET NULL;
    END IF;
END
$$;

CREATE TABLE IF NOT EXISTS image_tags (
    image_id BIGINT NOT NULL,
    tag TEXT NOT NULL CHECK (tag IN ('before', 'after', 'gallery')),
    PRIMARY KEY (image_id, tag),
    FOREIGN KEY (image_id) REFERENCES project_images(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_image_tags_tag ON image_tags(tag);

CREATE TABLE IF NOT EXISTS image_pairs (
    id BIGSERIAL PRIMARY KEY,
    project_id BIGINT NOT NULL,
    label TEXT NOT NULL,
    before_image_id BIGINT,
    after_image_id BIGINT,
    position BIGINT NOT NULL DEFAULT 0,
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE,
    FOREIGN KEY (before_image_id) REFERENCES project_images(id) ON DELETE SET NULL,
    FOREIGN KEY (after_image_id) REFERENCES project_images(id) ON DELETE SET NULL,
    CHECK (before_image_id IS NULL OR after_image_id IS NULL
           OR before_image_id <> after_image_id)
);

CREATE INDEX IF NOT EXISTS idx_image_pairs_project ON image_pairs(project_id, position);

CREATE TABLE IF NOT EXISTS listings (
    id BIGSERIAL PRIMARY KEY,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    description TEXT,
    address TEXT,
    price_cents BIGINT,
    bedrooms BIGINT,
    bathrooms BIGINT,
    area_sqm DOUBLE PRECISION,
    status TEXT NOT NULL DEFAULT 'available',
    is_published BOOLEAN NOT NULL DEFAULT FALSE,
    published_at TEXT,
    created_at TEXT NOT NULL DEFAULT (NOW()::TEXT),
    updated_at TEXT NOT NULL DEFAULT (NOW()::TEXT)
);

CREATE INDEX IF NOT EXISTS idx_listings_status ON listings(status);

CREATE TABLE IF NOT EXISTS listing_images (
    id BIGSERIAL PRIMARY KEY,
    listing_id BIGINT NOT NULL,
    url TEXT NOT NULL,
    storage_path TEXT,
    position BIGINT NOT NULL DEFAULT 0,
    FOREIGN KEY (listing_id) REFERENCES listings(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_listing_images_listing ON listing_images(listing_id, position);

CREATE TABLE IF NOT EXISTS editorials (
    id BIGSERIAL PRIMARY KEY,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    excerpt TEXT,
    body TEXT,
    cover_image_url TEXT,
    is_ai_drafted BOOLEAN NOT NULL DEFAULT FALSE,
    is_published BOOLEAN NOT NULL DEFAULT FALSE,
    published_at TEXT,
    created_at TEXT NOT NULL DEFAULT (NOW()::TEXT),
    updated_at TEXT NOT NULL DEFAULT (NOW()::TEXT)
);

CREATE TABLE IF NOT EXISTS instagram_cache (
    id BIGINT PRIMARY KEY CHECK (id = 1),
    payload TEXT NOT NULL,
    fetched_at TEXT NOT NULL DEFAULT (NOW()::TEXT)
);

CREATE TABLE IF NOT EXISTS site_settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (NOW()::TEXT)
);

CREATE TABLE IF NOT EXISTS scheduled_tasks (
    id BIGSERIAL PRIMARY KEY,
    task_type TEXT NOT NULL,
    target TEXT NOT NULL,
    scheduled_at TEXT NOT NULL,
    hours_start INTEGER,
    hours_end INTEGER,
    status TEXT DEFAULT 'pending',
    created_at TEXT DEFAULT (NOW()::TEXT),
    started_at TEXT,
    completed_at TEXT,
    error_message TEXT
);

CREATE INDEX IF NOT EXISTS idx_scheduled_tasks_status ON scheduled_tasks(status);
CREATE INDEX IF NOT EXISTS idx_scheduled_tasks_scheduled_at ON scheduled_tasks(scheduled_at);
"#;
