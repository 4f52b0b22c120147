use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::db::{Database, ExportedListingRow};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Csv => "CSV",
        }
    }

    /// Infer the format from an output path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("json") => Some(ExportFormat::Json),
            Some("csv") => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

/// Export listings from the database to a file. Returns the number of
/// rows written.
pub fn export_listings(db: &Database, output_path: &Path, format: ExportFormat) -> Result<usize> {
    let rows = db.get_listings_for_export()?;
    let count = rows.len();

    match format {
        ExportFormat::Json => export_json(&rows, output_path)?,
        ExportFormat::Csv => export_csv(&rows, output_path)?,
    }

    Ok(count)
}

fn export_json(rows: &[ExportedListingRow], output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(rows)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn export_csv(rows: &[ExportedListingRow], output_path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(output_path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ListingStatus;

    fn db_with_listings() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let id = db.create_listing("flat-01", "Bright flat").unwrap();
        db.set_listing_status(id, ListingStatus::Sold).unwrap();
        db.insert_listing_image(id, "https://cdn.test/flat.jpg", Some("flat-01/0.jpg"))
            .unwrap();
        db.create_listing("flat-02", "Garden flat").unwrap();
        db
    }

    #[test]
    fn test_export_csv() {
        let db = db_with_listings();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.csv");

        let count = export_listings(&db, &path, ExportFormat::Csv).unwrap();
        assert_eq!(count, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("slug,title,"));
        assert!(content.contains("flat-01"));
        assert!(content.contains("sold"));
    }

    #[test]
    fn test_export_json() {
        let db = db_with_listings();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.json");

        export_listings(&db, &path, ExportFormat::Json).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["image_count"], 1);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out.CSV")), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_path(Path::new("out.json")), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::from_path(Path::new("out.xml")), None);
    }
}
