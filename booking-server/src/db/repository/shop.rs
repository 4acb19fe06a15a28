//! Shop Repository
//!
//! 店铺目录只读查询 + 目录导入用的 upsert

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::{
    GeoPoint, LocalizedText, Shop, ShopCategory, ShopService, WorkingHours,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::store::{NameMatch, RepoError, RepoResult, ShopCatalog, ShopFilter};

/// 坐标存储 (不使用 GeoJSON，避免被解析为 geometry 类型)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct LocationRow {
    lng: f64,
    lat: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ShopRow {
    catalog_id: i64,
    name: LocalizedText,
    category: ShopCategory,
    #[serde(default)]
    description: LocalizedText,
    #[serde(default)]
    image: String,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    rating: f64,
    is_operational: bool,
    #[serde(default)]
    reviews_count: u32,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    location: Option<LocationRow>,
    #[serde(default)]
    services: Vec<ShopService>,
    #[serde(default)]
    working_hours: Vec<WorkingHours>,
    #[serde(default)]
    price_tier: Option<u8>,
    #[serde(default)]
    is_promoted: bool,
    #[serde(default)]
    promotion_rank: Option<i32>,
    #[serde(default)]
    is_editors_choice: bool,
}

impl From<Shop> for ShopRow {
    fn from(s: Shop) -> Self {
        Self {
            catalog_id: s.id,
            name: s.name,
            category: s.category,
            description: s.description,
            image: s.image,
            images: s.images,
            rating: s.rating,
            is_operational: s.is_operational,
            reviews_count: s.reviews_count,
            phone: s.phone,
            address: s.address,
            location: s.location.map(|p| LocationRow {
                lng: p.longitude,
                lat: p.latitude,
            }),
            services: s.services,
            working_hours: s.working_hours,
            price_tier: s.price_tier,
            is_promoted: s.is_promoted,
            promotion_rank: s.promotion_rank,
            is_editors_choice: s.is_editors_choice,
        }
    }
}

impl From<ShopRow> for Shop {
    fn from(r: ShopRow) -> Self {
        Self {
            id: r.catalog_id,
            name: r.name,
            category: r.category,
            description: r.description,
            image: r.image,
            images: r.images,
            rating: r.rating,
            is_operational: r.is_operational,
            reviews_count: r.reviews_count,
            phone: r.phone,
            address: r.address,
            location: r.location.map(|l| GeoPoint::new(l.lng, l.lat)),
            services: r.services,
            working_hours: r.working_hours,
            price_tier: r.price_tier,
            is_promoted: r.is_promoted,
            promotion_rank: r.promotion_rank,
            is_editors_choice: r.is_editors_choice,
        }
    }
}

fn locale_field(locale: shared::models::Locale) -> &'static str {
    match locale {
        shared::models::Locale::En => "name.en",
        shared::models::Locale::Uz => "name.uz",
        shared::models::Locale::Ru => "name.ru",
    }
}

fn name_condition(field: &str) -> String {
    format!("string::contains(string::lowercase({field}), $needle)")
}

#[derive(Clone)]
pub struct ShopRepository {
    db: Surreal<Db>,
}

impl ShopRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// 按目录 id 写入或覆盖店铺 (目录导入 / 测试)
    pub async fn upsert(&self, shop: Shop) -> RepoResult<Shop> {
        let id = shop.id;
        let mut result = self
            .db
            .query("UPSERT type::thing('shop', $id) CONTENT $data")
            .bind(("id", id))
            .bind(("data", ShopRow::from(shop)))
            .await?;
        let rows: Vec<ShopRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(Shop::from)
            .ok_or_else(|| RepoError::Database(format!("Failed to upsert shop {id}")))
    }
}

#[async_trait]
impl ShopCatalog for ShopRepository {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Shop>> {
        let mut result = self
            .db
            .query("SELECT * FROM shop WHERE catalog_id = $id LIMIT 1")
            .bind(("id", id))
            .await?;
        let rows: Vec<ShopRow> = result.take(0)?;
        Ok(rows.into_iter().next().map(Shop::from))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<Shop>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut result = self
            .db
            .query("SELECT * FROM shop WHERE catalog_id INSIDE $ids")
            .bind(("ids", ids.to_vec()))
            .await?;
        let rows: Vec<ShopRow> = result.take(0)?;
        Ok(rows.into_iter().map(Shop::from).collect())
    }

    async fn find_matching(&self, filter: &ShopFilter) -> RepoResult<Vec<Shop>> {
        let mut conditions: Vec<String> = Vec::new();

        if !filter.include_closed {
            conditions.push("is_operational = true".into());
        }
        if filter.category.is_some() {
            conditions.push("category = $category".into());
        }
        if !filter.price_tiers.is_empty() {
            conditions.push("price_tier INSIDE $tiers".into());
        }
        if filter.editors_choice.is_some() {
            conditions.push("is_editors_choice = $editors_choice".into());
        }
        match &filter.name {
            Some(NameMatch::InLocale(locale, _)) => {
                conditions.push(name_condition(locale_field(*locale)));
            }
            Some(NameMatch::AnyLocale(_)) => {
                let any: Vec<String> = ["name.en", "name.uz", "name.ru"]
                    .iter()
                    .map(|f| name_condition(f))
                    .collect();
                conditions.push(format!("({})", any.join(" OR ")));
            }
            None => {}
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let sql = format!("SELECT * FROM shop{where_clause} ORDER BY catalog_id ASC");

        let mut qb = self.db.query(&sql);
        if let Some(category) = filter.category {
            qb = qb.bind(("category", category.as_str().to_string()));
        }
        if !filter.price_tiers.is_empty() {
            qb = qb.bind(("tiers", filter.price_tiers.clone()));
        }
        if let Some(flag) = filter.editors_choice {
            qb = qb.bind(("editors_choice", flag));
        }
        if let Some(name) = &filter.name {
            qb = qb.bind(("needle", name.needle()));
        }

        let mut result = qb.await?;
        let rows: Vec<ShopRow> = result.take(0)?;
        Ok(rows.into_iter().map(Shop::from).collect())
    }
}
