//! Shop (business) Model

use serde::{Deserialize, Serialize};

/// Supported display locales
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Uz,
    Ru,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Uz, Locale::Ru];
}

/// Parallel strings for each supported locale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub uz: String,
    pub ru: String,
}

impl LocalizedText {
    /// Same text in every locale
    pub fn uniform(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            en: text.clone(),
            uz: text.clone(),
            ru: text,
        }
    }

    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::Uz => &self.uz,
            Locale::Ru => &self.ru,
        }
    }
}

/// Closed set of shop categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShopCategory {
    #[serde(rename = "Barbershop")]
    Barbershop,
    #[serde(rename = "Hair Salon")]
    HairSalon,
    #[serde(rename = "Nail Salon")]
    NailSalon,
}

impl ShopCategory {
    pub const ALL: [ShopCategory; 3] = [
        ShopCategory::Barbershop,
        ShopCategory::HairSalon,
        ShopCategory::NailSalon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Barbershop => "Barbershop",
            Self::HairSalon => "Hair Salon",
            Self::NailSalon => "Nail Salon",
        }
    }
}

impl std::fmt::Display for ShopCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShopCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Longitude/latitude point
///
/// Serialized as a GeoJSON `Point`: `{"type":"Point","coordinates":[lng,lat]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoJsonPoint", into = "GeoJsonPoint")]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Finite and inside the WGS84 coordinate range
    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

#[derive(Serialize, Deserialize)]
struct GeoJsonPoint {
    #[serde(rename = "type")]
    kind: String,
    coordinates: [f64; 2],
}

impl TryFrom<GeoJsonPoint> for GeoPoint {
    type Error = String;

    fn try_from(value: GeoJsonPoint) -> Result<Self, Self::Error> {
        if value.kind != "Point" {
            return Err(format!("unsupported geometry type: {}", value.kind));
        }
        Ok(GeoPoint::new(value.coordinates[0], value.coordinates[1]))
    }
}

impl From<GeoPoint> for GeoJsonPoint {
    fn from(value: GeoPoint) -> Self {
        GeoJsonPoint {
            kind: "Point".to_string(),
            coordinates: [value.longitude, value.latitude],
        }
    }
}

/// A bookable service offered by a shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopService {
    pub name: LocalizedText,
    pub price: f64,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// Opening hours shared by a set of days (`from`/`to` as `HH:MM`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub days: Vec<DayOfWeek>,
    pub from: String,
    pub to: String,
}

/// Shop entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    /// Catalog id
    pub id: i64,
    pub name: LocalizedText,
    pub category: ShopCategory,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default = "default_true")]
    pub is_operational: bool,
    #[serde(default)]
    pub reviews_count: u32,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub services: Vec<ShopService>,
    #[serde(default)]
    pub working_hours: Vec<WorkingHours>,
    /// 1 (cheapest) ..= 4
    #[serde(default)]
    pub price_tier: Option<u8>,
    #[serde(default)]
    pub is_promoted: bool,
    /// Lower rank is shown first; only meaningful when `is_promoted`
    #[serde(default)]
    pub promotion_rank: Option<i32>,
    #[serde(default)]
    pub is_editors_choice: bool,
}

fn default_true() -> bool {
    true
}

impl Shop {
    /// Location if present and usable for distance queries
    pub fn valid_location(&self) -> Option<GeoPoint> {
        self.location.filter(GeoPoint::is_valid)
    }
}

/// Shop with optional distance annotation (kilometers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedShop {
    #[serde(flatten)]
    pub shop: Shop,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

/// `{latitude, longitude}` as sent by the mini-app
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<UserLocation> for GeoPoint {
    fn from(value: UserLocation) -> Self {
        GeoPoint::new(value.longitude, value.latitude)
    }
}

/// `POST /api/shops/search-shops` body
///
/// Numeric fields arrive as raw JSON values so that malformed input can be
/// reported as a validation error instead of a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchShopsRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price_tiers: Option<Vec<serde_json::Value>>,
    pub sort_by: Option<String>,
    pub editors_choice: Option<bool>,
    pub user_location: Option<UserLocation>,
    pub locale: Option<Locale>,
    pub page: Option<serde_json::Value>,
    pub limit: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_shops: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchShopsResponse {
    pub shops: Vec<RankedShop>,
    pub pagination: Pagination,
}

/// `POST /api/shops/discovery-search` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRequest {
    pub search_term: Option<String>,
    pub category: Option<String>,
    pub user_location: Option<UserLocation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResponse {
    pub advertised_shops: Vec<RankedShop>,
    pub editors_choice_shops: Vec<RankedShop>,
    pub top_rated_shops: Vec<RankedShop>,
    pub best_price_shops: Vec<RankedShop>,
    pub near_you_shops: Vec<RankedShop>,
}

/// `GET /api/shops/service/{id}/availability` response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub working_hours: Vec<WorkingHours>,
    pub booked_slots: Vec<chrono::DateTime<chrono::Utc>>,
}
