use crate::aggregate::{RegistrantFilter, aggregate, apply_filters};
use crate::capacity::{TableSpots, table_spots};
use crate::dates::{EVENT_WEEKDAY, date_key, default_trend_range, next_event_date, parse_date_key, weekdays_in_range};
use crate::errors::AppError;
use crate::imaging::{UPLOAD_MIME, compress_image, decode_base64_image, encode_base64, upload_filename};
use crate::labels::{gallery_caption, gallery_display_date};
use crate::models::{
    DateQuery, DeleteRequest, DiagnosticResponse, FeedbackRequest, GalleryCard, LatestResponse, LoginRequest,
    NextEventResponse, Registrant, RegistrationConfirmation, RegistrationRequest, RegistrationStatus,
    StatusMessage, SummaryQuery, SummaryResponse, TrendQuery, TrendResponse, UploadPayload, UploadRequest,
};
use crate::state::AppState;
use crate::storage::{ADMIN_FLAG_KEY, registered_flag_key};
use crate::ticker::TickerView;
use crate::trend::fetch_trend;
use crate::ui::{IndexView, render_admin, render_index};
use crate::visitor::Visitor;
use axum::{
    extract::{Query, State},
    http::Uri,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Json,
};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

pub async fn index(State(state): State<AppState>, Extension(visitor): Extension<Visitor>) -> Html<String> {
    let view = IndexView {
        date: today_event_key(),
        features: state.config.features,
        is_admin: state.is_admin(&visitor).await,
    };
    Html(render_index(&view))
}

pub async fn admin_page(State(state): State<AppState>, Extension(visitor): Extension<Visitor>) -> Response {
    if !state.is_admin(&visitor).await {
        info!("admin page requested without admin flag, redirecting");
        return Redirect::to("/").into_response();
    }
    let date = today_event_key();
    let (start, end) = default_trend_range(Local::now().date_naive());
    Html(render_admin(&date, &date_key(start), &date_key(end))).into_response()
}

pub async fn next_event() -> Json<NextEventResponse> {
    Json(NextEventResponse {
        date: today_event_key(),
    })
}

pub async fn ticker(State(state): State<AppState>) -> Json<TickerView> {
    let date = next_event_date();
    let key = date_key(date);
    let view = match state.gateway.latest(date).await {
        Ok(latest) => TickerView::from_latest(&key, &latest),
        Err(err) => {
            warn!("could not fetch ticker, using fallback: {err}");
            TickerView::open(&key)
        }
    };
    Json(view)
}

pub async fn spots(State(state): State<AppState>) -> Json<Vec<TableSpots>> {
    let latest = latest_or_empty(&state, next_event_date()).await;
    Json(table_spots(latest.registrants(), &state.config.capacity))
}

pub async fn registration_status(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Query(query): Query<DateQuery>,
) -> Result<Json<RegistrationStatus>, AppError> {
    let date = date_key(requested_date(query.date.as_deref())?);
    let registered = state.store.is_set(&visitor, &registered_flag_key(&date)).await;
    Ok(Json(RegistrationStatus { date, registered }))
}

pub async fn register(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Json(payload): Json<RegistrationRequest>,
) -> Result<Json<RegistrationConfirmation>, AppError> {
    let name = payload.name.trim();
    let table = payload.table.trim();
    if name.is_empty() || table.is_empty() {
        return Err(AppError::bad_request("name and table are required"));
    }
    let date = parse_date_key(&payload.date)
        .map(date_key)
        .ok_or_else(|| AppError::bad_request("date must be YYYY-MM-DD"))?;

    let flag = registered_flag_key(&date);
    if state.store.is_set(&visitor, &flag).await {
        return Err(AppError::conflict(
            "You have already registered for this date! Please contact us if you need to change something.",
        ));
    }

    let request = RegistrationRequest {
        name: name.to_string(),
        table: table.to_string(),
        date: date.clone(),
    };
    state.gateway.register(&request).await;
    state.store.set(&visitor, &flag, "true").await?;
    info!(%date, table = %request.table, "registration submitted");

    Ok(Json(RegistrationConfirmation {
        message: format!(
            "Thanks {}! We've added you to the {} table for {}.",
            request.name, request.table, request.date
        ),
        name: request.name,
        table: request.table,
        date: request.date,
    }))
}

pub async fn feedback(
    State(state): State<AppState>,
    Json(payload): Json<FeedbackRequest>,
) -> Json<StatusMessage> {
    state.gateway.feedback(&payload).await;
    Json(StatusMessage::ok("Thank you for your feedback!"))
}

pub async fn gallery(State(state): State<AppState>, Extension(visitor): Extension<Visitor>) -> Json<Vec<GalleryCard>> {
    let is_admin = state.is_admin(&visitor).await;
    let entries = match state.gateway.gallery().await {
        Ok(entries) => entries,
        Err(err) => {
            warn!("gallery load error: {err}");
            Vec::new()
        }
    };
    let cards = entries
        .into_iter()
        .map(|entry| GalleryCard {
            display_date: entry.date.as_deref().map(gallery_display_date).unwrap_or_default(),
            caption: gallery_caption(&entry).to_string(),
            delete_key: if is_admin { entry.delete_key.clone() } else { None },
            url: entry.url,
        })
        .collect();
    Json(cards)
}

pub async fn gallery_upload(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Json(payload): Json<UploadPayload>,
) -> Result<Json<StatusMessage>, AppError> {
    require_admin(&state, &visitor).await?;
    let date = parse_date_key(&payload.date)
        .map(date_key)
        .ok_or_else(|| AppError::bad_request("date must be YYYY-MM-DD"))?;

    let raw = decode_base64_image(&payload.image)?;
    let compressed = compress_image(&raw)?;
    let request = UploadRequest {
        image: encode_base64(&compressed),
        mime_type: UPLOAD_MIME.to_string(),
        filename: upload_filename(Local::now().timestamp_millis()),
        date,
        name: "Admin".to_string(),
    };
    state.gateway.upload(&request).await?;
    info!(filename = %request.filename, bytes = compressed.len(), "photo uploaded");
    Ok(Json(StatusMessage::ok("Done!")))
}

pub async fn gallery_delete(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Json(payload): Json<DeleteRequest>,
) -> Result<Json<StatusMessage>, AppError> {
    require_admin(&state, &visitor).await?;
    if payload.key.trim().is_empty() {
        return Err(AppError::bad_request("key is required"));
    }
    state.gateway.delete(payload.key.trim()).await?;
    Ok(Json(StatusMessage::ok("Photo deleted")))
}

pub async fn admin_login(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<StatusMessage>, AppError> {
    if !state.config.accepts_admin_password(&payload.password) {
        return Err(AppError::unauthorized("Incorrect password"));
    }
    state.store.set(&visitor, ADMIN_FLAG_KEY, "true").await?;
    Ok(Json(StatusMessage::ok("Logged in")))
}

pub async fn admin_logout(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
) -> Result<Json<StatusMessage>, AppError> {
    state.store.remove(&visitor, ADMIN_FLAG_KEY).await?;
    Ok(Json(StatusMessage::ok("Logged out")))
}

pub async fn admin_summary(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    require_admin(&state, &visitor).await?;
    let date = requested_date(query.date.as_deref())?;
    let filter = RegistrantFilter {
        table: query.table.map(|table| table.trim().to_string()).filter(|table| !table.is_empty()),
    };
    let latest = state.gateway.latest(date).await?;
    let registrants = apply_filters(latest.registrants(), &filter);
    info!(%date, count = registrants.len(), "admin data received");

    let aggregation = aggregate(registrants.iter().copied());
    let spots = table_spots(latest.registrants(), &state.config.capacity);
    let charts = state.charts.lock().await.render_summary(&aggregation);

    Ok(Json(SummaryResponse {
        date: date_key(date),
        aggregation,
        spots,
        charts,
    }))
}

pub async fn admin_trend(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<TrendResponse>, AppError> {
    require_admin(&state, &visitor).await?;
    let (default_start, default_end) = default_trend_range(Local::now().date_naive());
    let start = optional_date(query.start.as_deref())?.unwrap_or(default_start);
    let end = optional_date(query.end.as_deref())?.unwrap_or(default_end);

    let meetups = weekdays_in_range(EVENT_WEEKDAY, start, end).count();
    if meetups == 0 {
        info!(%start, %end, "no meetups in requested trend range");
    }
    let points = fetch_trend(&state.gateway, start, end).await;
    let chart = state.charts.lock().await.render_trend(&points);

    Ok(Json(TrendResponse {
        start: date_key(start),
        end: date_key(end),
        points,
        chart,
    }))
}

pub async fn admin_diagnostic(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
) -> Result<Json<DiagnosticResponse>, AppError> {
    require_admin(&state, &visitor).await?;
    let dummy = [
        Registrant::at_table("free-talk"),
        Registrant::at_table("it"),
        Registrant::at_table("it"),
    ];
    let aggregation = aggregate(&dummy);
    let chart = state.charts.lock().await.render_summary(&aggregation).tables;
    Ok(Json(DiagnosticResponse {
        ok: true,
        message: "Attempted to render dummy data (1 Free Talk, 2 IT).".to_string(),
        chart,
    }))
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("no route for {}", uri.path()))
}

async fn require_admin(state: &AppState, visitor: &Visitor) -> Result<(), AppError> {
    if state.is_admin(visitor).await {
        Ok(())
    } else {
        Err(AppError::unauthorized("admin login required"))
    }
}

async fn latest_or_empty(state: &AppState, date: NaiveDate) -> LatestResponse {
    match state.gateway.latest(date).await {
        Ok(latest) => latest,
        Err(err) => {
            warn!(%date, "error fetching capacity: {err}");
            LatestResponse::default()
        }
    }
}

fn requested_date(value: Option<&str>) -> Result<NaiveDate, AppError> {
    Ok(optional_date(value)?.unwrap_or_else(next_event_date))
}

fn optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(raw) => parse_date_key(raw)
            .map(Some)
            .ok_or_else(|| AppError::bad_request(format!("invalid date '{raw}', expected YYYY-MM-DD"))),
        None => Ok(None),
    }
}

fn today_event_key() -> String {
    date_key(next_event_date())
}
