//! api.rs: HTTP surface over the store and the analytics engine.
//!
//! Handlers fetch record snapshots from the store, run the engine, and return
//! JSON. Caller identity comes from the `x-owner-id` header set by the
//! authentication layer in front of this service.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::engine::{AnalyticsEngine, AnalyticsSummary, SummaryOptions};
use crate::error::{ApiError, ApiResult};
use crate::ingest::tag_comment;
use crate::loyalty::{LoyaltyAccount, LoyaltyError};
use crate::metrics;
use crate::models::{feedback_url, Aspect, FeedbackRecord, Ratings, Restaurant, RestaurantKind, Table};
use crate::store::FeedbackStore;
use crate::trend::{default_range, select_range, TrendPoint};
use crate::weeks::{SharedClock, WeekLabel};

pub const OWNER_HEADER: &str = "x-owner-id";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FeedbackStore>,
    pub engine: AnalyticsEngine,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn FeedbackStore>, clock: SharedClock) -> Self {
        Self {
            store,
            engine: AnalyticsEngine::new(clock),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/restaurants", post(create_restaurant).get(list_restaurants))
        .route(
            "/restaurants/{id}",
            get(get_restaurant).put(update_restaurant).delete(delete_restaurant),
        )
        .route("/restaurants/{id}/tables", get(list_tables))
        .route("/tables", post(create_table))
        .route("/tables/{id}", get(get_table).put(update_table).delete(delete_table))
        .route("/feedback", post(submit_feedback))
        .route("/feedback/restaurant/{id}", get(restaurant_feedback))
        .route("/feedback/table/{id}", get(table_feedback))
        .route(
            "/feedback/{id}",
            get(get_feedback).put(update_feedback).delete(delete_feedback),
        )
        .route("/loyalty", get(get_loyalty))
        .route("/loyalty/add", post(add_loyalty_points))
        .route("/loyalty/redeem", post(redeem_reward))
        .route("/analytics", get(fleet_analytics))
        .route("/analytics/restaurant/{id}", get(restaurant_analytics))
        .route("/analytics/table/{id}", get(table_analytics))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Authenticated caller, taken from [`OWNER_HEADER`].
#[derive(Debug, Clone)]
pub struct OwnerId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for OwnerId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| OwnerId(s.to_string()))
            .ok_or(ApiError::Unauthorized)
    }
}

/* ----------------------------
Restaurants & tables
---------------------------- */

#[derive(Debug, Deserialize)]
struct NewRestaurant {
    name: String,
    num_tables: u32,
    #[serde(default)]
    photo: Option<String>,
    #[serde(default)]
    specialty: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    opening_date: Option<DateTime<Utc>>,
    #[serde(default, rename = "type")]
    kind: RestaurantKind,
    #[serde(default)]
    branch_number: Option<String>,
}

async fn create_restaurant(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Json(body): Json<NewRestaurant>,
) -> ApiResult<(StatusCode, Json<Restaurant>)> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".into()));
    }
    let restaurant = Restaurant {
        id: Uuid::new_v4().to_string(),
        name: body.name.trim().to_string(),
        owner,
        num_tables: body.num_tables,
        photo: body.photo,
        specialty: body.specialty,
        description: body.description,
        location: body.location,
        opening_date: body.opening_date,
        kind: body.kind,
        branch_number: body.branch_number,
        created_at: state.engine.now(),
    };
    state.store.insert_restaurant(restaurant.clone())?;
    info!(restaurant_id = %restaurant.id, owner = %restaurant.owner, "restaurant created");
    Ok((StatusCode::CREATED, Json(restaurant)))
}

async fn list_restaurants(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
) -> ApiResult<Json<Vec<Restaurant>>> {
    Ok(Json(state.store.restaurants_by_owner(&owner)?))
}

async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Restaurant>> {
    Ok(Json(find_restaurant(&state, &id)?))
}

fn find_restaurant(state: &AppState, id: &str) -> ApiResult<Restaurant> {
    state
        .store
        .restaurant(id)?
        .ok_or_else(|| ApiError::NotFound("Restaurant not found".into()))
}

fn owned_restaurant(state: &AppState, id: &str, owner: &str) -> ApiResult<Restaurant> {
    let r = find_restaurant(state, id)?;
    if r.owner != owner {
        return Err(ApiError::Forbidden("Unauthorized".into()));
    }
    Ok(r)
}

/// Table plus the restaurant it belongs to, which the caller must own.
fn owned_table(state: &AppState, id: &str, owner: &str) -> ApiResult<(Table, Restaurant)> {
    let table = state
        .store
        .table(id)?
        .ok_or_else(|| ApiError::NotFound("Table not found".into()))?;
    let restaurant = owned_restaurant(state, &table.restaurant, owner)?;
    Ok((table, restaurant))
}

/// Analytics scopes whose summaries no longer reflect the store after a write:
/// the restaurant, the given tables, and the owner's fleet.
fn stale_scopes(restaurant: &Restaurant, tables: &[&str]) -> Vec<String> {
    let mut out = vec![format!("restaurant:{}", restaurant.id)];
    out.extend(tables.iter().map(|t| format!("table:{t}")));
    out.push(format!("owner:{}", restaurant.owner));
    out
}

#[derive(Debug, Serialize)]
struct Deleted {
    message: &'static str,
    stale: Vec<String>,
}

impl Deleted {
    fn new(stale: Vec<String>) -> Json<Self> {
        Json(Self {
            message: "Deleted",
            stale,
        })
    }
}

/// Every field optional; absent fields keep their stored value.
#[derive(Debug, Deserialize)]
struct RestaurantChanges {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    num_tables: Option<u32>,
    #[serde(default)]
    photo: Option<String>,
    #[serde(default)]
    specialty: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    opening_date: Option<DateTime<Utc>>,
    #[serde(default, rename = "type")]
    kind: Option<RestaurantKind>,
    #[serde(default)]
    branch_number: Option<String>,
}

impl RestaurantChanges {
    fn apply(self, r: &mut Restaurant) -> ApiResult<()> {
        if let Some(name) = self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ApiError::BadRequest("name is required".into()));
            }
            r.name = name.to_string();
        }
        if let Some(n) = self.num_tables {
            r.num_tables = n;
        }
        if let Some(kind) = self.kind {
            r.kind = kind;
        }
        r.photo = self.photo.or(r.photo.take());
        r.specialty = self.specialty.or(r.specialty.take());
        r.description = self.description.or(r.description.take());
        r.location = self.location.or(r.location.take());
        r.opening_date = self.opening_date.or(r.opening_date.take());
        r.branch_number = self.branch_number.or(r.branch_number.take());
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RestaurantWritten {
    restaurant: Restaurant,
    stale: Vec<String>,
}

async fn update_restaurant(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
    Json(body): Json<RestaurantChanges>,
) -> ApiResult<Json<RestaurantWritten>> {
    let mut restaurant = owned_restaurant(&state, &id, &owner)?;
    body.apply(&mut restaurant)?;
    if !state.store.update_restaurant(restaurant.clone())? {
        return Err(ApiError::NotFound("Restaurant not found".into()));
    }
    info!(restaurant_id = %id, owner = %owner, "restaurant updated");
    let stale = stale_scopes(&restaurant, &[]);
    Ok(Json(RestaurantWritten { restaurant, stale }))
}

async fn delete_restaurant(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> ApiResult<Json<Deleted>> {
    let restaurant = owned_restaurant(&state, &id, &owner)?;
    let tables = state.store.tables_by_restaurant(&id)?;
    state.store.delete_restaurant(&id)?;
    info!(restaurant_id = %id, owner = %owner, tables = tables.len(), "restaurant deleted");
    let ids: Vec<&str> = tables.iter().map(|t| t.id.as_str()).collect();
    Ok(Deleted::new(stale_scopes(&restaurant, &ids)))
}

#[derive(Debug, Deserialize)]
struct NewTable {
    restaurant_id: String,
    table_number: u32,
}

async fn create_table(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Json(body): Json<NewTable>,
) -> ApiResult<(StatusCode, Json<Table>)> {
    let restaurant = owned_restaurant(&state, &body.restaurant_id, &owner)?;
    if state
        .store
        .find_table(&restaurant.id, body.table_number)?
        .is_some()
    {
        return Err(ApiError::BadRequest("Table number already exists".into()));
    }
    let table = Table {
        id: Uuid::new_v4().to_string(),
        feedback_url: feedback_url(&state.config.frontend_url, &restaurant.id, body.table_number),
        restaurant: restaurant.id,
        table_number: body.table_number,
        created_at: state.engine.now(),
    };
    state.store.insert_table(table.clone())?;
    info!(table_id = %table.id, restaurant_id = %table.restaurant, number = table.table_number, "table created");
    Ok((StatusCode::CREATED, Json(table)))
}

async fn list_tables(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Table>>> {
    owned_restaurant(&state, &id, &owner)?;
    Ok(Json(state.store.tables_by_restaurant(&id)?))
}

async fn get_table(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> ApiResult<Json<Table>> {
    Ok(Json(owned_table(&state, &id, &owner)?.0))
}

#[derive(Debug, Deserialize)]
struct TableChanges {
    #[serde(default)]
    table_number: Option<u32>,
}

#[derive(Debug, Serialize)]
struct TableWritten {
    table: Table,
    stale: Vec<String>,
}

/// Renumbering re-issues the QR link; the table id and its feedback stay.
async fn update_table(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
    Json(body): Json<TableChanges>,
) -> ApiResult<Json<TableWritten>> {
    let (mut table, restaurant) = owned_table(&state, &id, &owner)?;
    if let Some(n) = body.table_number.filter(|&n| n != table.table_number) {
        if state.store.find_table(&restaurant.id, n)?.is_some() {
            return Err(ApiError::BadRequest("Table number already exists".into()));
        }
        table.table_number = n;
        table.feedback_url = feedback_url(&state.config.frontend_url, &restaurant.id, n);
    }
    if !state.store.update_table(table.clone())? {
        return Err(ApiError::NotFound("Table not found".into()));
    }
    info!(table_id = %table.id, number = table.table_number, "table updated");
    let stale = stale_scopes(&restaurant, &[table.id.as_str()]);
    Ok(Json(TableWritten { table, stale }))
}

async fn delete_table(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> ApiResult<Json<Deleted>> {
    let (table, restaurant) = owned_table(&state, &id, &owner)?;
    state.store.delete_table(&id)?;
    info!(table_id = %id, restaurant_id = %restaurant.id, "table deleted");
    Ok(Deleted::new(stale_scopes(&restaurant, &[table.id.as_str()])))
}

/* ----------------------------
Feedback ingestion
---------------------------- */

#[derive(Debug, Deserialize)]
struct NewFeedback {
    #[serde(default)]
    table: Option<String>,
    #[serde(default)]
    restaurant: Option<String>,
    #[serde(default)]
    table_number: Option<u32>,
    #[serde(default)]
    ratings: Option<Ratings>,
    #[serde(default)]
    comments: Option<String>,
    #[serde(default)]
    customer_name: Option<String>,
    #[serde(default)]
    customer_phone: Option<String>,
}

#[derive(Debug, Serialize)]
struct FeedbackWritten {
    feedback: FeedbackRecord,
    /// Analytics scopes whose summaries no longer reflect the store.
    stale: Vec<String>,
}

fn resolve_table(state: &AppState, body: &NewFeedback) -> ApiResult<Table> {
    let by_id = match body.table.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(id) => state.store.table(id)?,
        None => None,
    };
    let found = match (by_id, body.restaurant.as_deref(), body.table_number) {
        (Some(t), _, _) => Some(t),
        (None, Some(rid), Some(n)) => state.store.find_table(rid, n)?,
        _ => None,
    };
    found.ok_or_else(|| ApiError::BadRequest("Table not found".into()))
}

fn validate_ratings(ratings: &Ratings) -> ApiResult<()> {
    for aspect in Aspect::ALL {
        if let Some(v) = ratings.get(aspect) {
            if !(1..=5).contains(&v) {
                return Err(ApiError::BadRequest(format!(
                    "rating for {aspect:?} must be between 1 and 5, got {v}"
                )));
            }
        }
    }
    Ok(())
}

async fn submit_feedback(
    State(state): State<AppState>,
    Json(body): Json<NewFeedback>,
) -> ApiResult<(StatusCode, Json<FeedbackWritten>)> {
    let table = resolve_table(&state, &body).inspect_err(|_| {
        metrics::record_rejected("table");
        warn!(table = ?body.table, restaurant = ?body.restaurant, "feedback for unknown table");
    })?;
    if let Some(r) = &body.ratings {
        validate_ratings(r).inspect_err(|e| {
            metrics::record_rejected("ratings");
            warn!(error = %e, "feedback rejected");
        })?;
    }
    let restaurant = find_restaurant(&state, &table.restaurant)?;

    let tag = tag_comment(state.engine.analyzer(), body.comments.as_deref());
    let record = FeedbackRecord {
        id: Uuid::new_v4().to_string(),
        table_ref: table.id.clone(),
        ratings: body.ratings,
        comments: body.comments,
        created_at: state.engine.now(),
        customer_name: body.customer_name,
        customer_phone: body.customer_phone,
        sentiment: Some(tag.sentiment),
        keywords: tag.keywords,
    };
    state.store.insert_feedback(record.clone())?;
    metrics::record_ingested();
    info!(
        feedback_id = %record.id,
        table_id = %table.id,
        sentiment = ?tag.sentiment,
        lexicon = %tag.lexicon,
        "feedback stored"
    );

    let stale = stale_scopes(&restaurant, &[table.id.as_str()]);
    Ok((
        StatusCode::CREATED,
        Json(FeedbackWritten {
            feedback: record,
            stale,
        }),
    ))
}

async fn restaurant_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<FeedbackRecord>>> {
    find_restaurant(&state, &id)?;
    Ok(Json(state.store.feedback_by_restaurant(&id)?))
}

async fn table_feedback(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<FeedbackRecord>>> {
    owned_table(&state, &id, &owner)?;
    let mut records = state.store.feedback_by_table(&id)?;
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(records))
}

fn owned_feedback(
    state: &AppState,
    id: &str,
    owner: &str,
) -> ApiResult<(FeedbackRecord, Table, Restaurant)> {
    let record = state
        .store
        .feedback(id)?
        .ok_or_else(|| ApiError::NotFound("Feedback not found".into()))?;
    let (table, restaurant) = owned_table(state, &record.table_ref, owner)?;
    Ok((record, table, restaurant))
}

async fn get_feedback(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> ApiResult<Json<FeedbackRecord>> {
    Ok(Json(owned_feedback(&state, &id, &owner)?.0))
}

#[derive(Debug, Deserialize)]
struct FeedbackChanges {
    #[serde(default)]
    ratings: Option<Ratings>,
    #[serde(default)]
    comments: Option<String>,
    #[serde(default)]
    customer_name: Option<String>,
    #[serde(default)]
    customer_phone: Option<String>,
}

/// Edits keep the original timestamp and table; a new comment is re-tagged.
async fn update_feedback(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
    Json(body): Json<FeedbackChanges>,
) -> ApiResult<Json<FeedbackWritten>> {
    let (mut record, table, restaurant) = owned_feedback(&state, &id, &owner)?;
    if let Some(r) = body.ratings {
        validate_ratings(&r)?;
        record.ratings = Some(r);
    }
    if let Some(c) = body.comments {
        let tag = tag_comment(state.engine.analyzer(), Some(c.as_str()));
        record.comments = Some(c);
        record.sentiment = Some(tag.sentiment);
        record.keywords = tag.keywords;
    }
    record.customer_name = body.customer_name.or(record.customer_name);
    record.customer_phone = body.customer_phone.or(record.customer_phone);

    if !state.store.update_feedback(record.clone())? {
        return Err(ApiError::NotFound("Feedback not found".into()));
    }
    info!(feedback_id = %id, table_id = %table.id, "feedback updated");
    let stale = stale_scopes(&restaurant, &[table.id.as_str()]);
    Ok(Json(FeedbackWritten {
        feedback: record,
        stale,
    }))
}

async fn delete_feedback(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> ApiResult<Json<Deleted>> {
    let (_, table, restaurant) = owned_feedback(&state, &id, &owner)?;
    state.store.delete_feedback(&id)?;
    info!(feedback_id = %id, table_id = %table.id, "feedback deleted");
    Ok(Deleted::new(stale_scopes(&restaurant, &[table.id.as_str()])))
}

/* ----------------------------
Loyalty
---------------------------- */

async fn get_loyalty(
    State(state): State<AppState>,
    OwnerId(user): OwnerId,
) -> ApiResult<Json<LoyaltyAccount>> {
    let account = state
        .store
        .loyalty(&user)?
        .unwrap_or_else(|| LoyaltyAccount::new(user));
    Ok(Json(account))
}

#[derive(Debug, Deserialize)]
struct AddPoints {
    points: u32,
}

#[derive(Debug, Deserialize)]
struct Redeem {
    #[serde(default)]
    reward: String,
}

/// Domain refusals become 400s; anything else is a store failure.
fn loyalty_error(err: anyhow::Error) -> ApiError {
    match err.downcast::<LoyaltyError>() {
        Ok(refused) => ApiError::BadRequest(refused.to_string()),
        Err(other) => ApiError::Internal(other),
    }
}

async fn add_loyalty_points(
    State(state): State<AppState>,
    OwnerId(user): OwnerId,
    Json(body): Json<AddPoints>,
) -> ApiResult<Json<LoyaltyAccount>> {
    let now = state.engine.now();
    let account = state
        .store
        .update_loyalty(&user, &mut |a: &mut LoyaltyAccount| {
            a.add_points(body.points, now).map_err(anyhow::Error::from)
        })
        .map_err(loyalty_error)?;
    info!(user = %user, added = body.points, balance = account.points, "loyalty points added");
    Ok(Json(account))
}

async fn redeem_reward(
    State(state): State<AppState>,
    OwnerId(user): OwnerId,
    Json(body): Json<Redeem>,
) -> ApiResult<Json<LoyaltyAccount>> {
    let now = state.engine.now();
    let account = state
        .store
        .update_loyalty(&user, &mut |a: &mut LoyaltyAccount| {
            a.redeem(&body.reward, now).map_err(anyhow::Error::from)
        })
        .map_err(loyalty_error)?;
    info!(user = %user, reward = %body.reward, balance = account.points, "reward redeemed");
    Ok(Json(account))
}

/* ----------------------------
Analytics
---------------------------- */

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

/// Which slice of the weekly series was returned, and what could be picked.
#[derive(Debug, Serialize)]
struct TrendWindow {
    from: Option<WeekLabel>,
    to: Option<WeekLabel>,
    available: Vec<WeekLabel>,
}

fn parse_week(raw: Option<&str>) -> ApiResult<Option<WeekLabel>> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<WeekLabel>())
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Narrow `summary.weekly_trend` to the requested (or default) window.
fn apply_window(summary: &mut AnalyticsSummary, q: &RangeQuery, default_weeks: usize) -> ApiResult<TrendWindow> {
    let from = parse_week(q.from.as_deref())?;
    let to = parse_week(q.to.as_deref())?;
    let full: Vec<TrendPoint> = summary.weekly_trend.take().unwrap_or_default();
    let available = full.iter().map(|p| p.week).collect();

    let fallback = default_range(&full, default_weeks);
    let from = from.or(fallback.map(|r| r.0));
    let to = to.or(fallback.map(|r| r.1));
    let selected = match (from, to) {
        (Some(f), Some(t)) => select_range(&full, f, t).to_vec(),
        _ => full,
    };
    summary.weekly_trend = Some(selected);
    Ok(TrendWindow { from, to, available })
}

#[derive(Debug, Serialize)]
struct RestaurantReport {
    restaurant: Restaurant,
    summary: AnalyticsSummary,
    trend_window: TrendWindow,
    recent: Vec<FeedbackRecord>,
}

async fn restaurant_analytics(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<RangeQuery>,
) -> ApiResult<Json<RestaurantReport>> {
    let restaurant = find_restaurant(&state, &id)?;
    let records = state.store.feedback_by_restaurant(&id)?;
    let numbers: HashMap<String, u32> = state
        .store
        .tables_by_restaurant(&id)?
        .into_iter()
        .map(|t| (t.id, t.table_number))
        .collect();

    let opts = SummaryOptions::default()
        .cloud(state.config.analytics.keyword_cloud_restaurant)
        .with_tables(numbers)
        .with_trend();
    let mut summary = state.engine.summarize_with(&records, &opts);
    let trend_window = apply_window(&mut summary, &q, state.config.analytics.trend_default_weeks)?;
    metrics::record_summary("restaurant", records.len());
    debug!(restaurant_id = %id, records = records.len(), "restaurant analytics");

    // records are already newest first
    let recent = records
        .into_iter()
        .take(state.config.analytics.recent_feedback)
        .collect();
    Ok(Json(RestaurantReport {
        restaurant,
        summary,
        trend_window,
        recent,
    }))
}

#[derive(Debug, Serialize)]
struct TableReport {
    table: Table,
    summary: AnalyticsSummary,
}

async fn table_analytics(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> ApiResult<Json<TableReport>> {
    let table = state
        .store
        .table(&id)?
        .ok_or_else(|| ApiError::NotFound("Table not found".into()))?;
    owned_restaurant(&state, &table.restaurant, &owner)?;
    let records = state.store.feedback_by_table(&id)?;
    let opts = SummaryOptions::default().cloud(state.config.analytics.keyword_cloud_restaurant);
    let summary = state.engine.summarize_with(&records, &opts);
    metrics::record_summary("table", records.len());
    Ok(Json(TableReport { table, summary }))
}

#[derive(Debug, Serialize)]
struct RestaurantOverview {
    restaurant: Restaurant,
    summary: AnalyticsSummary,
}

#[derive(Debug, Serialize)]
struct FleetReport {
    summary: AnalyticsSummary,
    trend_window: TrendWindow,
    restaurants: Vec<RestaurantOverview>,
}

async fn fleet_analytics(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Query(q): Query<RangeQuery>,
) -> ApiResult<Json<FleetReport>> {
    let restaurants = state.store.restaurants_by_owner(&owner)?;

    let mut records = Vec::new();
    let mut table_to_restaurant = HashMap::new();
    for r in &restaurants {
        for t in state.store.tables_by_restaurant(&r.id)? {
            table_to_restaurant.insert(t.id, r.id.clone());
        }
        records.extend(state.store.feedback_by_restaurant(&r.id)?);
    }

    let cfg = &state.config.analytics;
    let fleet_opts = SummaryOptions::default()
        .cloud(cfg.keyword_cloud_fleet)
        .with_trend();
    let mut summary = state.engine.summarize_with(&records, &fleet_opts);
    let trend_window = apply_window(&mut summary, &q, cfg.trend_default_weeks)?;

    let per_opts = SummaryOptions::default().cloud(cfg.keyword_cloud_restaurant);
    let mut by_id: HashMap<String, AnalyticsSummary> = state
        .engine
        .summarize_restaurants(&records, &table_to_restaurant, &per_opts)
        .into_iter()
        .collect();
    let overviews = restaurants
        .into_iter()
        .map(|r| {
            let summary = by_id
                .remove(&r.id)
                .unwrap_or_else(|| state.engine.summarize_with(&[], &per_opts));
            RestaurantOverview { restaurant: r, summary }
        })
        .collect();

    metrics::record_summary("fleet", records.len());
    debug!(owner = %owner, records = records.len(), "fleet analytics");
    Ok(Json(FleetReport {
        summary,
        trend_window,
        restaurants: overviews,
    }))
}
