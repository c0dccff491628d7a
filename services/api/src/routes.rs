use crate::infra::{parse_choice, AppState, ExportScope, FleetState, VehicleListParams};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use fleet_telematics::assistant::{FleetAssistant, Intent, SUGGESTED_QUESTIONS};
use fleet_telematics::chat::{ChatConversation, ChatMessage};
use fleet_telematics::error::AppError;
use fleet_telematics::fleet::alerts::MaintenanceItem;
use fleet_telematics::fleet::domain::{EngineTelemetry, VehicleView};
use fleet_telematics::fleet::export::ExportKind;
use fleet_telematics::fleet::health::HealthBreakdown;
use fleet_telematics::fleet::rules::{RuleEdit, RuleKind};
use fleet_telematics::fleet::trends::telemetry_history;
use fleet_telematics::fleet::triggers::currently_triggering;
use fleet_telematics::fleet::{
    sample, AlertFeedEntry, AlertFilter, DtcDetail, FleetMetrics, FleetTrends, HealthBand,
    HealthScorer, HistoryRange, MonitoringRule, Page, Severity, TelemetrySample, ThresholdRule,
    TriggeredAlert, VehicleAlertSummary,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FleetSummaryResponse {
    pub(crate) metrics: FleetMetrics,
    pub(crate) health_distribution: Vec<HealthBandCount>,
    pub(crate) maintenance_percentage: f64,
    pub(crate) efficiency_below_baseline: bool,
    pub(crate) idle_fuel_above_threshold: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthBandCount {
    pub(crate) band: HealthBand,
    pub(crate) label: &'static str,
    pub(crate) count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VehicleDetailResponse {
    pub(crate) vehicle: VehicleView,
    pub(crate) health: HealthBreakdown,
    pub(crate) telemetry: EngineTelemetry,
    pub(crate) dtcs: Vec<DtcDetail>,
    pub(crate) maintenance: Vec<MaintenanceItem>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HistoryParams {
    pub(crate) range: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VehicleHistoryResponse {
    pub(crate) vehicle_id: String,
    pub(crate) range: &'static str,
    pub(crate) label: &'static str,
    pub(crate) samples: Vec<TelemetrySample>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TriggeringResponse {
    pub(crate) rules: Vec<ThresholdRule>,
    pub(crate) triggering: Vec<TriggeredAlert>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AlertParams {
    pub(crate) severity: Option<String>,
    pub(crate) search: Option<String>,
}

impl AlertParams {
    fn into_filter(self) -> Result<AlertFilter, AppError> {
        Ok(AlertFilter {
            severity: parse_choice("severity", self.severity.as_deref(), Severity::parse)?,
            search: self.search,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MaintenanceParams {
    pub(crate) vehicle: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RuleCategoryView {
    pub(crate) category: String,
    pub(crate) enabled: usize,
    pub(crate) rules: Vec<MonitoringRule>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RuleListParams {
    #[serde(rename = "type")]
    pub(crate) kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AskRequest {
    pub(crate) question: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AskResponse {
    pub(crate) intent: Intent,
    pub(crate) answer: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendMessageRequest {
    pub(crate) content: String,
    /// Hold the response until the assistant reply is written.
    #[serde(default)]
    pub(crate) wait: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendMessageResponse {
    pub(crate) conversation_id: u64,
    pub(crate) message: ChatMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reply: Option<ChatMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExportParams {
    pub(crate) vehicle: Option<String>,
    pub(crate) severity: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) date: Option<String>,
}

pub(crate) fn fleet_router(state: FleetState) -> Router {
    Router::new()
        .route("/api/v1/fleet/summary", get(fleet_summary))
        .route("/api/v1/fleet/trends", get(fleet_trends))
        .route("/api/v1/vehicles", get(list_vehicles))
        .route("/api/v1/vehicles/:vehicle_id", get(vehicle_detail))
        .route("/api/v1/vehicles/:vehicle_id/history", get(vehicle_history))
        .route("/api/v1/alerts", get(alert_feed))
        .route("/api/v1/alerts/triggering", get(triggering_alerts))
        .route("/api/v1/alerts/vehicles", get(vehicles_by_alerts))
        .route("/api/v1/maintenance", get(maintenance_schedule))
        .route("/api/v1/rules", get(list_rules))
        .route("/api/v1/rules/:rule_id", post(edit_rule))
        .route("/api/v1/assistant/ask", post(ask_assistant))
        .route(
            "/api/v1/assistant/suggestions",
            get(|| async { Json(SUGGESTED_QUESTIONS) }),
        )
        .route(
            "/api/v1/conversations",
            get(list_conversations).post(start_conversation),
        )
        .route(
            "/api/v1/conversations/:conversation_id",
            get(get_conversation).delete(delete_conversation),
        )
        .route(
            "/api/v1/conversations/:conversation_id/messages",
            post(send_message),
        )
        .route("/api/v1/exports/:kind", get(export_csv))
        .with_state(state)
}

pub(crate) fn with_fleet_routes(state: FleetState) -> Router {
    fleet_router(state)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn fleet_summary(State(state): State<FleetState>) -> Json<FleetSummaryResponse> {
    let snapshot = &state.data.snapshot;
    let health_distribution = HealthScorer::distribution(&snapshot.vehicles)
        .into_iter()
        .map(|(band, count)| HealthBandCount {
            band,
            label: band.label(),
            count,
        })
        .collect();

    Json(FleetSummaryResponse {
        metrics: snapshot.metrics.clone(),
        health_distribution,
        maintenance_percentage: snapshot.metrics.maintenance_percentage(),
        efficiency_below_baseline: snapshot.metrics.efficiency_below_baseline(),
        idle_fuel_above_threshold: snapshot.metrics.idle_fuel_above_threshold(),
    })
}

pub(crate) async fn fleet_trends(State(state): State<FleetState>) -> Json<FleetTrends> {
    Json(FleetTrends::clone(&state.data.trends))
}

pub(crate) async fn list_vehicles(
    State(state): State<FleetState>,
    Query(params): Query<VehicleListParams>,
) -> Result<Json<Page<VehicleView>>, AppError> {
    let query = params.into_query()?;
    let page = query.run(&state.data.snapshot.vehicles);

    Ok(Json(Page {
        items: page.items.iter().map(|vehicle| vehicle.to_view()).collect(),
        page: page.page,
        total_pages: page.total_pages,
        total_items: page.total_items,
    }))
}

pub(crate) async fn vehicle_detail(
    State(state): State<FleetState>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<VehicleDetailResponse>, AppError> {
    let vehicle = state
        .data
        .snapshot
        .vehicle(&vehicle_id)
        .ok_or_else(|| AppError::NotFound(format!("vehicle {vehicle_id}")))?;

    Ok(Json(VehicleDetailResponse {
        vehicle: vehicle.to_view(),
        health: vehicle.health_breakdown(),
        telemetry: vehicle.telemetry.clone(),
        dtcs: sample::dtc_details(&vehicle.id),
        maintenance: state
            .data
            .maintenance_items(Some(&vehicle.id))
            .into_iter()
            .cloned()
            .collect(),
    }))
}

pub(crate) async fn vehicle_history(
    State(state): State<FleetState>,
    Path(vehicle_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<VehicleHistoryResponse>, AppError> {
    let range = parse_choice("history range", params.range.as_deref(), HistoryRange::parse)?
        .unwrap_or_default();
    let vehicle = state
        .data
        .snapshot
        .vehicle(&vehicle_id)
        .ok_or_else(|| AppError::NotFound(format!("vehicle {vehicle_id}")))?;

    Ok(Json(VehicleHistoryResponse {
        vehicle_id: vehicle.id.clone(),
        range: range.key(),
        label: range.label(),
        samples: telemetry_history(vehicle, range),
    }))
}

pub(crate) async fn alert_feed(
    State(state): State<FleetState>,
    Query(params): Query<AlertParams>,
) -> Result<Json<Vec<AlertFeedEntry>>, AppError> {
    let filter = params.into_filter()?;
    Ok(Json(
        filter
            .apply_to_feed(&state.data.alert_feed)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

pub(crate) async fn vehicles_by_alerts(
    State(state): State<FleetState>,
    Query(params): Query<AlertParams>,
) -> Result<Json<Vec<VehicleAlertSummary>>, AppError> {
    let filter = params.into_filter()?;
    let ranked = VehicleAlertSummary::rank(&state.data.snapshot.vehicles);
    Ok(Json(
        filter
            .apply_to_summaries(&ranked)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

pub(crate) async fn triggering_alerts(
    State(state): State<FleetState>,
) -> Json<TriggeringResponse> {
    let rules = &state.data.threshold_rules;
    Json(TriggeringResponse {
        triggering: currently_triggering(rules, &state.data.snapshot.vehicles),
        rules: rules.to_vec(),
    })
}

pub(crate) async fn maintenance_schedule(
    State(state): State<FleetState>,
    Query(params): Query<MaintenanceParams>,
) -> Json<Vec<MaintenanceItem>> {
    Json(
        state
            .data
            .maintenance_items(params.vehicle.as_deref())
            .into_iter()
            .cloned()
            .collect(),
    )
}

pub(crate) async fn list_rules(
    State(state): State<FleetState>,
    Query(params): Query<RuleListParams>,
) -> Result<Json<Vec<RuleCategoryView>>, AppError> {
    let kind = parse_choice("rule type", params.kind.as_deref(), RuleKind::parse)?;
    let book = state.rules.lock().await;

    let categories = book
        .grouped()
        .into_iter()
        .map(|group| RuleCategoryView {
            category: group.category.to_string(),
            enabled: group.enabled_count(),
            rules: group
                .rules
                .into_iter()
                .filter(|rule| kind.map_or(true, |kind| rule.kind == kind))
                .cloned()
                .collect(),
        })
        .filter(|view| !view.rules.is_empty())
        .collect();
    Ok(Json(categories))
}

pub(crate) async fn edit_rule(
    State(state): State<FleetState>,
    Path(rule_id): Path<u32>,
    Json(edit): Json<RuleEdit>,
) -> Result<Json<MonitoringRule>, AppError> {
    let mut book = state.rules.lock().await;
    book.apply(rule_id, edit)?;
    let rule = book
        .get(rule_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("rule {rule_id}")))?;
    tracing::info!(rule = rule_id, ?edit, "monitoring rule updated");
    Ok(Json(rule))
}

pub(crate) async fn ask_assistant(
    State(state): State<FleetState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let question = payload.question.trim();
    if question.is_empty() {
        return Err(AppError::BadRequest("question must not be empty".to_string()));
    }

    let snapshot = &state.data.snapshot;
    Ok(Json(AskResponse {
        intent: Intent::classify(question),
        answer: FleetAssistant.respond(question, &snapshot.metrics, &snapshot.vehicles),
    }))
}

pub(crate) async fn list_conversations(
    State(state): State<FleetState>,
) -> Json<Vec<ChatConversation>> {
    Json(state.chat.conversations().await)
}

pub(crate) async fn start_conversation(
    State(state): State<FleetState>,
) -> Result<(StatusCode, Json<ChatConversation>), AppError> {
    let conversation = state.chat.start_conversation().await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

pub(crate) async fn get_conversation(
    State(state): State<FleetState>,
    Path(conversation_id): Path<u64>,
) -> Result<Json<ChatConversation>, AppError> {
    state
        .chat
        .conversation(conversation_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("conversation {conversation_id}")))
}

pub(crate) async fn delete_conversation(
    State(state): State<FleetState>,
    Path(conversation_id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.chat.delete(conversation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn send_message(
    State(state): State<FleetState>,
    Path(conversation_id): Path<u64>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), AppError> {
    let ticket = state
        .chat
        .send_to(conversation_id, &payload.content)
        .await?;
    let message = ticket.message.clone();

    if !payload.wait {
        return Ok((
            StatusCode::ACCEPTED,
            Json(SendMessageResponse {
                conversation_id,
                message,
                reply: None,
            }),
        ));
    }

    let reply = ticket.reply().await?;
    Ok((
        StatusCode::OK,
        Json(SendMessageResponse {
            conversation_id,
            message,
            reply: Some(reply),
        }),
    ))
}

pub(crate) async fn export_csv(
    State(state): State<FleetState>,
    Path(kind): Path<String>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, AppError> {
    let kind = ExportKind::parse(&kind)
        .ok_or_else(|| AppError::NotFound(format!("export '{kind}'")))?;
    let date = match params.date.as_deref() {
        Some(raw) => crate::infra::parse_date(raw).map_err(AppError::BadRequest)?,
        None => Local::now().date_naive(),
    };
    let scope = ExportScope {
        vehicle: params.vehicle,
        alerts: AlertParams {
            severity: params.severity,
            search: params.search,
        }
        .into_filter()?,
    };

    let body = state.data.export(kind, &scope)?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, attachment(kind, date)),
        ],
        body,
    ))
}

fn attachment(kind: ExportKind, date: NaiveDate) -> String {
    format!("attachment; filename=\"{}\"", kind.file_name(date))
}
