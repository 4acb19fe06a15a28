//! Shops API Handlers

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    http::StatusCode,
};
use shared::AppResult;
use shared::models::{
    Availability, BookingAck, BookingRequest, DiscoveryRequest, DiscoveryResponse,
    SearchShopsRequest, SearchShopsResponse,
};

use crate::core::ServerState;
use crate::discovery::{HomeFeed, SearchQuery, SectionsQuery};

/// GET /api/shops/home-feed
pub async fn home_feed(State(state): State<ServerState>) -> AppResult<Json<HomeFeed>> {
    let feed = state.discovery.home_feed().await?;
    Ok(Json(feed))
}

/// POST /api/shops/search-shops
pub async fn search_shops(
    State(state): State<ServerState>,
    payload: Result<Json<SearchShopsRequest>, JsonRejection>,
) -> AppResult<Json<SearchShopsResponse>> {
    let Json(req) = payload?;
    let query = SearchQuery::from_request(req)?;
    let result = state.discovery.search(&query).await?;
    Ok(Json(result))
}

/// POST /api/shops/discovery-search
pub async fn discovery_search(
    State(state): State<ServerState>,
    payload: Result<Json<DiscoveryRequest>, JsonRejection>,
) -> AppResult<Json<DiscoveryResponse>> {
    let Json(req) = payload?;
    let query = SectionsQuery::from_request(req)?;
    let sections = state.discovery.sections(&query).await?;
    Ok(Json(sections))
}

/// POST /api/shops/booking-requests - 201 + bookingId
pub async fn create_booking(
    State(state): State<ServerState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BookingAck>)> {
    let Json(req) = payload?;
    let booking = state.manager.submit(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(BookingAck {
            message: "Booking request sent successfully!".to_string(),
            booking_id: booking.id,
        }),
    ))
}

/// GET /api/shops/service/{id}/availability
pub async fn availability(
    State(state): State<ServerState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Availability>> {
    let Path(shop_id) = path?;
    let availability = state.manager.availability(shop_id).await?;
    Ok(Json(availability))
}
