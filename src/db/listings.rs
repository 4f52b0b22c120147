//! Types for real-estate listings.

/// Sale status of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
    Available,
    UnderOffer,
    Sold,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Available => "available",
            ListingStatus::UnderOffer => "under_offer",
            ListingStatus::Sold => "sold",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "available" => Some(ListingStatus::Available),
            "under_offer" => Some(ListingStatus::UnderOffer),
            "sold" => Some(ListingStatus::Sold),
            _ => None,
        }
    }
}

/// A property for sale.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Listing {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub price_cents: Option<i64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub area_sqm: Option<f64>,
    pub status: ListingStatus,
    pub is_published: bool,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One image attached to a listing. Listings use the plain ordered
/// model: no tags, no pairs.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct ListingImage {
    pub id: i64,
    pub listing_id: i64,
    pub url: String,
    pub storage_path: Option<String>,
    pub position: i64,
}
