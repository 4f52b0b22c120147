pub const SCHEMA: &str = r#"
-- Projects: renovation case studies
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    summary TEXT,
    body TEXT,
    location TEXT,
    completed_year INTEGER,

    -- Hero pointer: one of this project's own images. The image table
    -- references projects in turn; SQLite resolves the cycle because
    -- foreign keys are only checked on DML.
    hero_image_id INTEGER REFERENCES project_images(id) ON DELETE SET NULL,

    -- Publication gate for the public site
    is_published INTEGER NOT NULL DEFAULT 0,
    published_at TEXT,

    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_projects_published ON projects(is_published);

-- Project images: ordered child rows, one per stored binary
CREATE TABLE IF NOT EXISTS project_images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    storage_path TEXT,       -- key into the media store, NULL for external URLs
    caption TEXT,
    alt_text TEXT,
    position INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_project_images_project ON project_images(project_id, position);

-- Category tags on project images. 'before' and 'after' are mutually
-- exclusive per image; the editing layer enforces that.
CREATE TABLE IF NOT EXISTS image_tags (
    image_id INTEGER NOT NULL,
    tag TEXT NOT NULL CHECK (tag IN ('before', 'after', 'gallery')),
    PRIMARY KEY (image_id, tag),
    FOREIGN KEY (image_id) REFERENCES project_images(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_image_tags_tag ON image_tags(tag);

-- Before/after pairs: ordered, labeled, sides nullable so a pair can
-- survive losing one image until the admin reassigns or deletes it
CREATE TABLE IF NOT EXISTS image_pairs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    label TEXT NOT NULL,
    before_image_id INTEGER,
    after_image_id INTEGER,
    position INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE,
    FOREIGN KEY (before_image_id) REFERENCES project_images(id) ON DELETE SET NULL,
    FOREIGN KEY (after_image_id) REFERENCES project_images(id) ON DELETE SET NULL,
    CHECK (before_image_id IS NULL OR after_image_id IS NULL
           OR before_image_id <> after_image_id)
);

CREATE INDEX IF NOT EXISTS idx_image_pairs_project ON image_pairs(project_id, position);

-- Real-estate listings
CREATE TABLE IF NOT EXISTS listings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    description TEXT,
    address TEXT,
    price_cents INTEGER,
    bedrooms INTEGER,
    bathrooms INTEGER,
    area_sqm REAL,
    status TEXT NOT NULL DEFAULT 'available',  -- 'available', 'under_offer', 'sold'
    is_published INTEGER NOT NULL DEFAULT 0,
    published_at TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_listings_status ON listings(status);

-- Listing images: the simple ordered model, no tags or pairs
CREATE TABLE IF NOT EXISTS listing_images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    listing_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    storage_path TEXT,
    position INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (listing_id) REFERENCES listings(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_listing_images_listing ON listing_images(listing_id, position);

-- Editorials: blog-style articles, some drafted by the LLM
CREATE TABLE IF NOT EXISTS editorials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    excerpt TEXT,
    body TEXT,
    cover_image_url TEXT,
    is_ai_drafted INTEGER NOT NULL DEFAULT 0,
    is_published INTEGER NOT NULL DEFAULT 0,
    published_at TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Instagram feed cache: a single denormalized row holding the last
-- fetched payload
CREATE TABLE IF NOT EXISTS instagram_cache (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    payload TEXT NOT NULL,   -- raw feed JSON
    fetched_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Site settings: key/value
CREATE TABLE IF NOT EXISTS site_settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Scheduled tasks for the background worker
CREATE TABLE IF NOT EXISTS scheduled_tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_type TEXT NOT NULL,           -- 'Publish', 'InstagramRefresh', 'OrphanSweep'
    target TEXT NOT NULL,              -- e.g. 'project:villa-aurelia', '' for sweeps
    scheduled_at TEXT NOT NULL,        -- ISO timestamp when task should run
    hours_start INTEGER,               -- Optional hour of day to start (0-23)
    hours_end INTEGER,                 -- Optional hour of day to end (0-23)
    status TEXT DEFAULT 'pending',     -- pending/running/completed/cancelled/failed
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    started_at TEXT,
    completed_at TEXT,
    error_message TEXT
);

CREATE INDEX IF NOT EXISTS idx_scheduled_tasks_status ON scheduled_tasks(status);
CREATE INDEX IF NOT EXISTS idx_scheduled_tasks_scheduled_at ON scheduled_tasks(scheduled_at);
"#;

/// Additive migrations for databases created before a column existed.
/// Failures (column already present) are ignored by the runner.
pub const MIGRATIONS: &[&str] = &[
    "ALTER TABLE editorials ADD COLUMN cover_image_url TEXT",
    "ALTER TABLE listings ADD COLUMN area_sqm REAL",
    "ALTER TABLE projects ADD COLUMN completed_year INTEGER",
];
