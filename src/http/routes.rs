use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::community::{NewPost, NewQuestion, RECOMMENDATIONS};
use crate::error::{AppError, AppResult};
use crate::models::location::Coordinates;
use crate::models::sos_alert::AlertStatus;
use crate::panels::analytics::{self, AnalyticsQuery, IncidentAnalytics};
use crate::panels::dashboard::{self, DashboardStats};
use crate::panels::incidents::{self, AlertQuery};
use crate::panels::tourists::{self, TouristQuery, TouristSummary};
use crate::panels::{reports, zones, Filter};
use crate::services::digital_id::{self, IdCard, ScannedId};
use crate::services::registration::{self, RegistrationForm};
use crate::sos::dispatch::{self, SosRequest};
use crate::sos::location::ReportedPosition;
use crate::sos::sessions::HoldStatus;
use crate::state::AppState;

type SharedState = State<Arc<AppState>>;

pub async fn register_handler(
    State(state): SharedState,
    Json(form): Json<RegistrationForm>,
) -> AppResult<impl IntoResponse> {
    let profile = registration::register(state.store.as_ref(), form, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[derive(Debug, Deserialize)]
pub struct TouristParams {
    search: Option<String>,
    id_status: Option<String>,
}

pub async fn tourists_handler(
    State(state): SharedState,
    Query(params): Query<TouristParams>,
) -> AppResult<Json<Vec<TouristSummary>>> {
    let query = TouristQuery {
        search: params.search.unwrap_or_default(),
        id_state: Filter::parse(params.id_status.as_deref())?,
    };
    let today = Utc::now().date_naive();
    Ok(Json(
        tourists::list_tourists(state.store.as_ref(), &query, today).await?,
    ))
}

pub async fn digital_id_handler(
    State(state): SharedState,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<IdCard>> {
    let now = Utc::now();
    let id = digital_id::get_or_issue(
        state.store.as_ref(),
        user_id,
        state.settings.digital_id_validity_days,
        now,
    )
    .await?;
    Ok(Json(IdCard::new(id, now)))
}

pub async fn qr_handler(
    State(state): SharedState,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let store = state.store.as_ref();
    let id = store
        .digital_id_by_user(user_id)
        .await?
        .ok_or(AppError::NotFound("digital ID"))?;
    let profile = store.profile_by_user(user_id).await?;
    Ok(Json(digital_id::qr_payload(
        &id,
        profile.as_ref(),
        &state.settings.verification_base_url,
        Utc::now(),
    )))
}

#[derive(Debug, Serialize)]
pub struct ScanResult {
    scanned_id: ScannedId,
    tourist: TouristSummary,
}

pub async fn scan_handler(
    State(state): SharedState,
    Path(code): Path<String>,
) -> AppResult<Json<ScanResult>> {
    let store = state.store.as_ref();
    let (scanned_id, _) = digital_id::scan(store, &code).await?;
    let tourist = tourists::lookup_scanned(store, &scanned_id, Utc::now().date_naive()).await?;
    Ok(Json(ScanResult {
        scanned_id,
        tourist,
    }))
}

/// What the tourist's device sends with an SOS press.
#[derive(Debug, Deserialize)]
pub struct SosPayload {
    user_id: Uuid,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    location_denied: bool,
}

impl SosPayload {
    fn position(&self) -> ReportedPosition {
        let coordinates = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        };
        ReportedPosition::new(coordinates, self.location_denied)
    }
}

pub async fn press_hold_handler(
    State(state): SharedState,
    Json(payload): Json<SosPayload>,
) -> impl IntoResponse {
    let status = state
        .holds
        .press(
            state.store.clone(),
            state.settings.sos.clone(),
            SosRequest::manual(payload.user_id),
            payload.position(),
        )
        .await;
    (StatusCode::CREATED, Json(status))
}

pub async fn hold_status_handler(
    State(state): SharedState,
    Path(id): Path<Uuid>,
) -> AppResult<Json<HoldStatus>> {
    state
        .holds
        .status(id)
        .await
        .map(Json)
        .ok_or(AppError::NotFound("SOS hold"))
}

pub async fn release_hold_handler(
    State(state): SharedState,
    Path(id): Path<Uuid>,
) -> AppResult<Json<HoldStatus>> {
    state
        .holds
        .release(id)
        .await
        .map(Json)
        .ok_or(AppError::NotFound("SOS hold"))
}

pub async fn sos_handler(
    State(state): SharedState,
    Json(payload): Json<SosPayload>,
) -> AppResult<impl IntoResponse> {
    let confirmation = dispatch::dispatch(
        state.store.as_ref(),
        &state.settings.sos,
        SosRequest::manual(payload.user_id),
        &payload.position(),
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

#[derive(Debug, Deserialize)]
pub struct AlertParams {
    status: Option<String>,
    severity: Option<String>,
}

pub async fn alerts_handler(
    State(state): SharedState,
    Query(params): Query<AlertParams>,
) -> AppResult<impl IntoResponse> {
    let query = AlertQuery {
        status: Filter::parse(params.status.as_deref())?,
        severity: Filter::parse(params.severity.as_deref())?,
    };
    let alerts = incidents::list_alerts(
        state.store.as_ref(),
        state.settings.alert_list_limit,
        &query,
    )
    .await?;
    Ok(Json(alerts))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    status: String,
}

pub async fn alert_status_handler(
    State(state): SharedState,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> AppResult<impl IntoResponse> {
    let status = update.status.trim().parse::<AlertStatus>()?;
    let alert = incidents::update_status(state.store.as_ref(), id, status, Utc::now()).await?;
    Ok(Json(alert))
}

#[derive(Debug, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    author: String,
    #[serde(default)]
    note: String,
}

pub async fn alert_note_handler(
    State(state): SharedState,
    Path(id): Path<Uuid>,
    Json(input): Json<NoteInput>,
) -> AppResult<impl IntoResponse> {
    let alert =
        incidents::add_note(state.store.as_ref(), id, &input.author, &input.note, Utc::now())
            .await?;
    Ok(Json(alert))
}

#[derive(Debug, Deserialize)]
pub struct ReportParams {
    user_id: Option<Uuid>,
    status: Option<String>,
}

pub async fn efir_handler(
    State(state): SharedState,
    Query(params): Query<ReportParams>,
) -> AppResult<impl IntoResponse> {
    let status = Filter::parse(params.status.as_deref())?;
    let reports = reports::list_reports(state.store.as_ref(), params.user_id, status).await?;
    Ok(Json(reports))
}

pub async fn danger_zones_handler(State(state): SharedState) -> AppResult<impl IntoResponse> {
    Ok(Json(zones::active(state.store.as_ref()).await?))
}

pub async fn create_danger_zone_handler(
    State(state): SharedState,
    Json(zone): Json<zones::NewDangerZone>,
) -> AppResult<impl IntoResponse> {
    let zone = zones::create(state.store.as_ref(), zone, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(zone)))
}

pub async fn dashboard_handler(State(state): SharedState) -> AppResult<Json<DashboardStats>> {
    let stats = dashboard::stats(state.store.as_ref(), state.settings.alert_list_limit).await?;
    Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    search: Option<String>,
    #[serde(rename = "type")]
    alert_type: Option<String>,
    status: Option<String>,
}

pub async fn analytics_handler(
    State(state): SharedState,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<IncidentAnalytics>> {
    let query = AnalyticsQuery {
        search: params.search.unwrap_or_default(),
        alert_type: Filter::parse(params.alert_type.as_deref())?,
        status: Filter::parse(params.status.as_deref())?,
    };
    let summary = analytics::incident_analytics(
        state.store.as_ref(),
        state.settings.alert_list_limit,
        &query,
    )
    .await?;
    Ok(Json(summary))
}

pub async fn feed_handler(State(state): SharedState) -> impl IntoResponse {
    Json(state.community.feed().await)
}

pub async fn share_post_handler(
    State(state): SharedState,
    Json(post): Json<NewPost>,
) -> AppResult<impl IntoResponse> {
    let post = state.community.share_post(post, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

#[derive(Debug, Deserialize)]
pub struct QuestionParams {
    category: Option<String>,
}

pub async fn questions_handler(
    State(state): SharedState,
    Query(params): Query<QuestionParams>,
) -> AppResult<impl IntoResponse> {
    let category = Filter::parse(params.category.as_deref())?;
    Ok(Json(state.community.questions(category).await))
}

pub async fn ask_handler(
    State(state): SharedState,
    Json(question): Json<NewQuestion>,
) -> AppResult<impl IntoResponse> {
    let question = state.community.ask(question, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn answers_handler(
    State(state): SharedState,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(state.community.answers(id).await?))
}

pub async fn recommendations_handler() -> impl IntoResponse {
    Json(&RECOMMENDATIONS)
}
