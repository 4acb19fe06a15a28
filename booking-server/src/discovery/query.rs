//! 请求解析与校验
//!
//! Raw request bodies are loosely typed (the mini-app sends numbers as
//! numbers or strings); everything is normalized here before it reaches the
//! engine.

use serde_json::Value;
use shared::models::{
    DiscoveryRequest, GeoPoint, SearchShopsRequest, ShopCategory, UserLocation,
};
use shared::{AppError, ErrorCode};
use thiserror::Error;

use crate::store::{NameMatch, RepoError, ShopFilter};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("{0}")]
    Validation(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

impl From<DiscoveryError> for AppError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::Validation(msg) => AppError::validation(msg),
            DiscoveryError::UnknownCategory(name) => {
                AppError::new(ErrorCode::CategoryInvalid).with_detail("category", name)
            }
            DiscoveryError::Repo(e) => e.into(),
        }
    }
}

/// Secondary sort key of a search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Default,
    Rating,
    Reviews,
    Distance,
}

impl std::str::FromStr for SortKey {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "default" => Ok(Self::Default),
            "rating" => Ok(Self::Rating),
            "reviews" => Ok(Self::Reviews),
            "distance" => Ok(Self::Distance),
            other => Err(DiscoveryError::Validation(format!(
                "sortBy must be one of rating, distance, reviews, default (got {other:?})"
            ))),
        }
    }
}

/// Validated `search-shops` request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub filter: ShopFilter,
    pub origin: Option<GeoPoint>,
    pub sort: SortKey,
    pub page: u32,
    pub limit: u32,
}

impl SearchQuery {
    pub fn from_request(req: SearchShopsRequest) -> DiscoveryResult<Self> {
        let page = parse_count(req.page.as_ref(), "page")?.unwrap_or(1);
        if page < 1 {
            return Err(DiscoveryError::Validation("page must be at least 1".into()));
        }
        let limit = parse_count(req.limit.as_ref(), "limit")?.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(DiscoveryError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let price_tiers = req
            .price_tiers
            .unwrap_or_default()
            .iter()
            .map(parse_tier)
            .collect::<DiscoveryResult<Vec<u8>>>()?;

        let sort = match req.sort_by.as_deref() {
            Some(s) => s.parse()?,
            None => SortKey::Default,
        };

        let locale = req.locale.unwrap_or_default();
        let name = non_blank(req.name).map(|n| NameMatch::InLocale(locale, n));

        Ok(Self {
            filter: ShopFilter {
                include_closed: false,
                category: parse_category(req.category)?,
                price_tiers,
                // false 等同于不过滤
                editors_choice: req.editors_choice.filter(|flag| *flag),
                name,
            },
            origin: parse_origin(req.user_location)?,
            sort,
            page,
            limit,
        })
    }

    /// Number of results skipped before this page
    pub fn skip(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

/// Validated `discovery-search` request
#[derive(Debug, Clone, PartialEq)]
pub struct SectionsQuery {
    pub filter: ShopFilter,
    pub origin: Option<GeoPoint>,
}

impl SectionsQuery {
    pub fn from_request(req: DiscoveryRequest) -> DiscoveryResult<Self> {
        Ok(Self {
            filter: ShopFilter {
                category: parse_category(req.category)?,
                name: non_blank(req.search_term).map(NameMatch::AnyLocale),
                ..ShopFilter::operational()
            },
            origin: parse_origin(req.user_location)?,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_category(value: Option<String>) -> DiscoveryResult<Option<ShopCategory>> {
    match non_blank(value) {
        None => Ok(None),
        Some(name) => name
            .parse::<ShopCategory>()
            .map(Some)
            .map_err(|_| DiscoveryError::UnknownCategory(name)),
    }
}

fn parse_origin(location: Option<UserLocation>) -> DiscoveryResult<Option<GeoPoint>> {
    let Some(location) = location else {
        return Ok(None);
    };
    let point = GeoPoint::from(location);
    if !point.is_valid() {
        return Err(DiscoveryError::Validation(
            "userLocation must have latitude in [-90, 90] and longitude in [-180, 180]".into(),
        ));
    }
    Ok(Some(point))
}

/// Non-negative integer sent as a number or a numeric string
fn parse_count(value: Option<&Value>, field: &str) -> DiscoveryResult<Option<u32>> {
    let invalid = || DiscoveryError::Validation(format!("{field} must be a positive integer"));
    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    let n = parsed.ok_or_else(invalid)?;
    u32::try_from(n).map(Some).map_err(|_| invalid())
}

fn parse_tier(value: &Value) -> DiscoveryResult<u8> {
    parse_count(Some(value), "priceTiers")?
        .and_then(|n| u8::try_from(n).ok())
        .filter(|n| (1..=4).contains(n))
        .ok_or_else(|| DiscoveryError::Validation("priceTiers entries must be between 1 and 4".into()))
}
