//! Discovery / ranking engine
//!
//! 目录查询只负责过滤 (match 阶段)；距离标注、排序、分组、分面和分页都在
//! 这里对匹配结果计算，方便用纯函数测试。

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use shared::models::{
    DiscoveryResponse, GeoPoint, Pagination, RankedShop, SearchShopsResponse, Shop, ShopCategory,
};

use super::geo::haversine_km;
use super::query::{DiscoveryResult, SearchQuery, SectionsQuery, SortKey};
use crate::store::{ShopCatalog, ShopFilter};

/// Shops per home feed category
pub const HOME_FEED_BUCKET: usize = 10;
/// Promoted placements in the discovery view
pub const ADVERTISED_CAP: usize = 5;
/// Every other discovery section
pub const SECTION_CAP: usize = 10;

/// Home feed: category → best rated shops
pub type HomeFeed = BTreeMap<ShopCategory, Vec<Shop>>;

pub struct DiscoveryEngine {
    catalog: Arc<dyn ShopCatalog>,
}

impl DiscoveryEngine {
    pub fn new(catalog: Arc<dyn ShopCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn home_feed(&self) -> DiscoveryResult<HomeFeed> {
        let shops = self
            .catalog
            .find_matching(&ShopFilter::operational())
            .await?;
        Ok(group_home_feed(shops))
    }

    pub async fn search(&self, query: &SearchQuery) -> DiscoveryResult<SearchShopsResponse> {
        let shops = self.catalog.find_matching(&query.filter).await?;
        tracing::debug!(matched = shops.len(), page = query.page, "Search shops");
        Ok(rank_search(shops, query))
    }

    pub async fn sections(&self, query: &SectionsQuery) -> DiscoveryResult<DiscoveryResponse> {
        let shops = self.catalog.find_matching(&query.filter).await?;
        Ok(build_sections(shops, query.origin))
    }
}

// ========== Pure ranking ==========

fn by_rating_desc(a: &Shop, b: &Shop) -> Ordering {
    b.rating.total_cmp(&a.rating)
}

fn by_id(a: &Shop, b: &Shop) -> Ordering {
    a.id.cmp(&b.id)
}

/// Missing rank sorts after every present rank
fn by_promotion_rank(a: &Shop, b: &Shop) -> Ordering {
    match (a.promotion_rank, b.promotion_rank) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Promoted first, promoted among themselves by rank
fn promotion_order(a: &Shop, b: &Shop) -> Ordering {
    b.is_promoted.cmp(&a.is_promoted).then_with(|| {
        if a.is_promoted && b.is_promoted {
            by_promotion_rank(a, b)
        } else {
            Ordering::Equal
        }
    })
}

fn by_distance(a: &RankedShop, b: &RankedShop) -> Ordering {
    let a = a.distance.unwrap_or(f64::INFINITY);
    let b = b.distance.unwrap_or(f64::INFINITY);
    a.total_cmp(&b)
}

fn annotate(shop: Shop, origin: Option<GeoPoint>) -> RankedShop {
    let distance = origin
        .zip(shop.valid_location())
        .map(|(o, p)| haversine_km(o, p));
    RankedShop { shop, distance }
}

/// Group operational shops by category, best rated first, capped per bucket
pub fn group_home_feed(shops: Vec<Shop>) -> HomeFeed {
    let mut feed = HomeFeed::new();
    for shop in shops {
        feed.entry(shop.category).or_default().push(shop);
    }
    for bucket in feed.values_mut() {
        bucket.sort_by(|a, b| by_rating_desc(a, b).then_with(|| by_id(a, b)));
        bucket.truncate(HOME_FEED_BUCKET);
    }
    feed
}

/// Order, annotate and paginate matched shops
pub fn rank_search(shops: Vec<Shop>, query: &SearchQuery) -> SearchShopsResponse {
    let origin = query.origin;
    let mut ranked: Vec<RankedShop> = shops
        .into_iter()
        .filter(|s| origin.is_none() || s.valid_location().is_some())
        .map(|s| annotate(s, origin))
        .collect();

    let key = match (query.sort, origin) {
        (SortKey::Default | SortKey::Distance, Some(_)) => SortKey::Distance,
        (SortKey::Default | SortKey::Distance, None) => SortKey::Rating,
        (other, _) => other,
    };

    ranked.sort_by(|a, b| {
        promotion_order(&a.shop, &b.shop)
            .then_with(|| match key {
                SortKey::Reviews => b.shop.reviews_count.cmp(&a.shop.reviews_count),
                SortKey::Distance => by_distance(a, b),
                SortKey::Rating | SortKey::Default => by_rating_desc(&a.shop, &b.shop),
            })
            .then_with(|| by_id(&a.shop, &b.shop))
    });

    let total = ranked.len() as u64;
    let limit = u64::from(query.limit);
    let total_pages = total.div_ceil(limit) as u32;

    let shops = ranked
        .into_iter()
        .skip(query.skip())
        .take(query.limit as usize)
        .collect();

    SearchShopsResponse {
        shops,
        pagination: Pagination {
            current_page: query.page,
            total_pages,
            total_shops: total,
        },
    }
}

fn top<F>(pool: &[RankedShop], keep: impl Fn(&RankedShop) -> bool, cmp: F, cap: usize) -> Vec<RankedShop>
where
    F: Fn(&RankedShop, &RankedShop) -> Ordering,
{
    let mut picked: Vec<RankedShop> = pool.iter().filter(|s| keep(s)).cloned().collect();
    picked.sort_by(|a, b| cmp(a, b).then_with(|| by_id(&a.shop, &b.shop)));
    picked.truncate(cap);
    picked
}

/// Five discovery placements over one matched set; a shop may appear in several
pub fn build_sections(shops: Vec<Shop>, origin: Option<GeoPoint>) -> DiscoveryResponse {
    let pool: Vec<RankedShop> = shops.into_iter().map(|s| annotate(s, origin)).collect();

    let advertised_shops = top(
        &pool,
        |s| s.shop.is_promoted,
        |a, b| by_promotion_rank(&a.shop, &b.shop),
        ADVERTISED_CAP,
    );
    let editors_choice_shops = top(
        &pool,
        |s| s.shop.is_editors_choice && !s.shop.is_promoted,
        |a, b| by_rating_desc(&a.shop, &b.shop),
        SECTION_CAP,
    );
    let top_rated_shops = top(
        &pool,
        |s| !s.shop.is_promoted,
        |a, b| {
            by_rating_desc(&a.shop, &b.shop)
                .then_with(|| b.shop.reviews_count.cmp(&a.shop.reviews_count))
        },
        SECTION_CAP,
    );
    let best_price_shops = top(
        &pool,
        |s| !s.shop.is_promoted,
        |a, b| {
            let tier = |s: &RankedShop| s.shop.price_tier.map_or(u16::MAX, u16::from);
            tier(a)
                .cmp(&tier(b))
                .then_with(|| by_rating_desc(&a.shop, &b.shop))
        },
        SECTION_CAP,
    );
    let near_you_shops = if origin.is_some() {
        top(
            &pool,
            |s| !s.shop.is_promoted && s.distance.is_some(),
            by_distance,
            SECTION_CAP,
        )
    } else {
        Vec::new()
    };

    DiscoveryResponse {
        advertised_shops,
        editors_choice_shops,
        top_rated_shops,
        best_price_shops,
        near_you_shops,
    }
}
