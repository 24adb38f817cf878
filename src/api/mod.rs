use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    AllocationParams, Benchmark, Debt, Entry, InputError, Investment, Ledger, LedgerError,
    PaymentStrategy, ProjectionReport, RecordId, ReportOptions, build_report, non_negative,
    validate_horizon,
};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Invalid API JSON payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Ledger(LedgerError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.status(), &self.to_string())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliStrategy {
    Avalanche,
    Scheduled,
}

impl From<CliStrategy> for PaymentStrategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Avalanche => PaymentStrategy::Avalanche,
            CliStrategy::Scheduled => PaymentStrategy::Scheduled,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliBenchmark {
    Fixed,
    InvestmentMean,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiStrategy {
    #[serde(alias = "debtAvalanche", alias = "debt-avalanche")]
    Avalanche,
    #[serde(alias = "current-payment", alias = "currentPayment")]
    Scheduled,
}

impl From<ApiStrategy> for CliStrategy {
    fn from(value: ApiStrategy) -> Self {
        match value {
            ApiStrategy::Avalanche => CliStrategy::Avalanche,
            ApiStrategy::Scheduled => CliStrategy::Scheduled,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiBenchmark {
    Fixed,
    #[serde(alias = "investmentMean", alias = "investment_mean", alias = "mean")]
    InvestmentMean,
}

impl From<ApiBenchmark> for CliBenchmark {
    fn from(value: ApiBenchmark) -> Self {
        match value {
            ApiBenchmark::Fixed => CliBenchmark::Fixed,
            ApiBenchmark::InvestmentMean => CliBenchmark::InvestmentMean,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    monthly_budget: Option<f64>,
    debt_allocation: Option<f64>,
    debt_allocation_fraction: Option<f64>,
    horizon_months: Option<u32>,
    strategy: Option<ApiStrategy>,
    pooled_initial: Option<f64>,
    pooled_return_rate: Option<f64>,
    rollover_unspent: Option<bool>,

    benchmark: Option<ApiBenchmark>,
    benchmark_rate: Option<f64>,
    start_date: Option<NaiveDate>,

    debts: Option<Vec<Debt>>,
    investments: Option<Vec<Investment>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ParamsPayload {
    monthly_budget: Option<f64>,
    debt_allocation: Option<f64>,
    debt_allocation_fraction: Option<f64>,
    strategy: Option<ApiStrategy>,
    pooled_initial: Option<f64>,
    pooled_return_rate: Option<f64>,
    rollover_unspent: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ReportQuery {
    horizon_months: Option<u32>,
    benchmark: Option<ApiBenchmark>,
    benchmark_rate: Option<f64>,
    start_date: Option<NaiveDate>,
}

#[derive(Parser, Debug)]
#[command(
    name = "networth",
    about = "Debt paydown vs investment net worth projection (debt avalanche + compounding)"
)]
struct Cli {
    #[arg(long, default_value_t = 1000.0, help = "Cash available each month")]
    monthly_budget: f64,
    #[arg(
        long,
        default_value_t = 500.0,
        help = "Part of the monthly budget earmarked for debt payments"
    )]
    debt_allocation: f64,
    #[arg(
        long,
        help = "Debt allocation as a fraction of the budget (0..=1); overrides --debt-allocation"
    )]
    debt_allocation_fraction: Option<f64>,
    #[arg(long, default_value_t = 60, help = "Projection horizon in months")]
    horizon_months: u32,
    #[arg(long, value_enum, default_value_t = CliStrategy::Avalanche)]
    strategy: CliStrategy,
    #[arg(long, default_value_t = 0.0, help = "Starting value of the pooled investment")]
    pooled_initial: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Annual return of the pooled investment in percent"
    )]
    pooled_return_rate: f64,
    #[arg(
        long,
        help = "Keep debt allocation freed by retired debts out of the pooled investment"
    )]
    no_rollover: bool,
    #[arg(long, value_enum, default_value_t = CliBenchmark::Fixed)]
    benchmark: CliBenchmark,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Fixed benchmark return in percent used by the recommendation"
    )]
    benchmark_rate: f64,
    #[arg(long, help = "Month 0 of the projection (YYYY-MM-DD); defaults to today")]
    start_date: Option<NaiveDate>,
    #[arg(
        long = "debt",
        value_parser = parse_debt_arg,
        help = "NAME:PRINCIPAL:RATE:MIN[:CURRENT], repeatable"
    )]
    debts: Vec<Debt>,
    #[arg(
        long = "investment",
        value_parser = parse_investment_arg,
        help = "NAME:AMOUNT:MONTHLY_CONTRIBUTION:RATE, repeatable"
    )]
    investments: Vec<Investment>,
}

#[derive(Debug)]
struct ApiRequest {
    debts: Vec<Debt>,
    investments: Vec<Investment>,
    params: AllocationParams,
    horizon_months: u32,
    options: ReportOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    params: AllocationParams,
    start_date: NaiveDate,
    #[serde(flatten)]
    report: ProjectionReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse<'a> {
    params: &'a AllocationParams,
    debts: &'a [Entry<Debt>],
    investments: &'a [Entry<Investment>],
}

#[derive(Debug, Serialize)]
struct CreatedResponse {
    id: RecordId,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Clone)]
struct AppState {
    ledger: Arc<RwLock<Ledger>>,
}

fn parse_number(field: &str, raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("{field} must be a number, got {raw:?}"))
}

fn parse_debt_arg(raw: &str) -> Result<Debt, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    if !(4..=5).contains(&parts.len()) {
        return Err(format!(
            "expected NAME:PRINCIPAL:RATE:MIN[:CURRENT], got {raw:?}"
        ));
    }
    let debt = Debt {
        name: parts[0].trim().to_string(),
        principal: parse_number("principal", parts[1])?,
        annual_interest_rate: parse_number("rate", parts[2])?,
        minimum_payment: parse_number("minimum payment", parts[3])?,
        current_payment: match parts.get(4) {
            Some(raw) => Some(parse_number("current payment", raw)?),
            None => None,
        },
    };
    debt.validate().map_err(|e| e.to_string())?;
    Ok(debt)
}

fn parse_investment_arg(raw: &str) -> Result<Investment, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "expected NAME:AMOUNT:MONTHLY_CONTRIBUTION:RATE, got {raw:?}"
        ));
    }
    let investment = Investment {
        name: parts[0].trim().to_string(),
        current_amount: parse_number("amount", parts[1])?,
        monthly_contribution: parse_number("monthly contribution", parts[2])?,
        annual_return_rate: parse_number("rate", parts[3])?,
    };
    investment.validate().map_err(|e| e.to_string())?;
    Ok(investment)
}

fn report_options(
    benchmark: CliBenchmark,
    benchmark_rate: f64,
    start_date: Option<NaiveDate>,
) -> Result<ReportOptions, InputError> {
    non_negative("benchmark rate", benchmark_rate)?;
    let benchmark = match benchmark {
        CliBenchmark::Fixed => Benchmark::Fixed(benchmark_rate),
        CliBenchmark::InvestmentMean => Benchmark::InvestmentMean,
    };
    Ok(ReportOptions {
        start_date: start_date.unwrap_or_else(|| chrono::Local::now().date_naive()),
        benchmark,
    })
}

fn build_params(
    monthly_budget: f64,
    debt_allocation: f64,
    debt_allocation_fraction: Option<f64>,
) -> Result<AllocationParams, InputError> {
    match debt_allocation_fraction {
        Some(fraction) => AllocationParams::from_fraction(monthly_budget, fraction),
        None => AllocationParams::new(monthly_budget, debt_allocation),
    }
}

fn build_request(cli: Cli) -> Result<ApiRequest, InputError> {
    validate_horizon(cli.horizon_months)?;
    for debt in &cli.debts {
        debt.validate()?;
    }
    for investment in &cli.investments {
        investment.validate()?;
    }

    let mut params = build_params(
        cli.monthly_budget,
        cli.debt_allocation,
        cli.debt_allocation_fraction,
    )?;
    params.strategy = cli.strategy.into();
    params.pooled_initial = cli.pooled_initial;
    params.pooled_return_rate = cli.pooled_return_rate;
    params.rollover_unspent = !cli.no_rollover;
    params.validate()?;

    let options = report_options(cli.benchmark, cli.benchmark_rate, cli.start_date)?;

    Ok(ApiRequest {
        debts: cli.debts,
        investments: cli.investments,
        params,
        horizon_months: cli.horizon_months,
        options,
    })
}

fn run_request(request: ApiRequest) -> ProjectResponse {
    let report = build_report(
        &request.debts,
        &request.investments,
        &request.params,
        request.horizon_months,
        &request.options,
    );
    ProjectResponse {
        params: request.params,
        start_date: request.options.start_date,
        report,
    }
}

/// One-shot projection from command-line arguments, returned as pretty JSON.
pub fn run_cli<I, T>(args: I) -> Result<String, ApiError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| e.exit());
    let request = build_request(cli)?;
    let response = run_request(request);
    Ok(serde_json::to_string_pretty(&response)?)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let default_cli = default_cli_for_api();
    let params = build_params(
        default_cli.monthly_budget,
        default_cli.debt_allocation,
        default_cli.debt_allocation_fraction,
    )
    .unwrap_or_default();
    let state = AppState {
        ledger: Arc::new(RwLock::new(Ledger::new(params))),
    };

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "net worth HTTP API listening");
    tracing::info!("Local access: http://127.0.0.1:{port}/api/session");

    axum::serve(listener, router(state)).await
}

fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/project",
            get(project_query_handler).post(project_handler),
        )
        .route("/api/session", get(session_handler))
        .route("/api/session/projection", get(session_projection_handler))
        .route("/api/params", put(params_handler))
        .route("/api/debts", post(add_debt_handler))
        .route(
            "/api/debts/:id",
            put(update_debt_handler).delete(remove_debt_handler),
        )
        .route("/api/investments", post(add_investment_handler))
        .route(
            "/api/investments/:id",
            put(update_investment_handler).delete(remove_investment_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_query_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler(Json(payload)).await
}

async fn project_handler(Json(payload): Json<ProjectPayload>) -> Response {
    match api_request_from_payload(payload) {
        Ok(request) => json_response(StatusCode::OK, run_request(request)),
        Err(err) => err.into_response(),
    }
}

async fn session_handler(State(state): State<AppState>) -> Response {
    let ledger = state.ledger.read();
    json_response(
        StatusCode::OK,
        SessionResponse {
            params: ledger.params(),
            debts: ledger.debts(),
            investments: ledger.investments(),
        },
    )
}

async fn session_projection_handler(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let defaults = default_cli_for_api();
    let horizon_months = query.horizon_months.unwrap_or(defaults.horizon_months);
    if let Err(err) = validate_horizon(horizon_months) {
        return ApiError::from(err).into_response();
    }
    let options = match report_options(
        query.benchmark.map(Into::into).unwrap_or(defaults.benchmark),
        query.benchmark_rate.unwrap_or(defaults.benchmark_rate),
        query.start_date,
    ) {
        Ok(options) => options,
        Err(err) => return ApiError::from(err).into_response(),
    };

    let ledger = state.ledger.read();
    let response = ProjectResponse {
        params: ledger.params().clone(),
        start_date: options.start_date,
        report: ledger.project(horizon_months, &options),
    };
    json_response(StatusCode::OK, response)
}

async fn params_handler(
    State(state): State<AppState>,
    Json(payload): Json<ParamsPayload>,
) -> Response {
    let mut ledger = state.ledger.write();
    let params = match params_from_payload(ledger.params(), payload) {
        Ok(params) => params,
        Err(err) => return ApiError::from(err).into_response(),
    };
    match ledger.set_params(params) {
        Ok(()) => json_response(StatusCode::OK, ledger.params()),
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn add_debt_handler(State(state): State<AppState>, Json(debt): Json<Debt>) -> Response {
    match state.ledger.write().add_debt(debt) {
        Ok(id) => json_response(StatusCode::CREATED, CreatedResponse { id }),
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn update_debt_handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(debt): Json<Debt>,
) -> Response {
    match state.ledger.write().update_debt(id, debt) {
        Ok(()) => json_response(StatusCode::OK, CreatedResponse { id }),
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn remove_debt_handler(State(state): State<AppState>, Path(id): Path<RecordId>) -> Response {
    match state.ledger.write().remove_debt(id) {
        Ok(debt) => json_response(StatusCode::OK, debt),
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn add_investment_handler(
    State(state): State<AppState>,
    Json(investment): Json<Investment>,
) -> Response {
    match state.ledger.write().add_investment(investment) {
        Ok(id) => json_response(StatusCode::CREATED, CreatedResponse { id }),
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn update_investment_handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(investment): Json<Investment>,
) -> Response {
    match state.ledger.write().update_investment(id, investment) {
        Ok(()) => json_response(StatusCode::OK, CreatedResponse { id }),
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn remove_investment_handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Response {
    match state.ledger.write().remove_investment(id) {
        Ok(investment) => json_response(StatusCode::OK, investment),
        Err(err) => ApiError::from(err).into_response(),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, ApiError> {
    let payload = serde_json::from_str::<ProjectPayload>(json)?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ProjectPayload) -> Result<ApiRequest, ApiError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.monthly_budget {
        cli.monthly_budget = v;
    }
    if let Some(v) = payload.debt_allocation {
        cli.debt_allocation = v;
    }
    if let Some(v) = payload.debt_allocation_fraction {
        cli.debt_allocation_fraction = Some(v);
    }
    if let Some(v) = payload.horizon_months {
        cli.horizon_months = v;
    }
    if let Some(v) = payload.strategy {
        cli.strategy = v.into();
    }
    if let Some(v) = payload.pooled_initial {
        cli.pooled_initial = v;
    }
    if let Some(v) = payload.pooled_return_rate {
        cli.pooled_return_rate = v;
    }
    if let Some(v) = payload.rollover_unspent {
        cli.no_rollover = !v;
    }

    if let Some(v) = payload.benchmark {
        cli.benchmark = v.into();
    }
    if let Some(v) = payload.benchmark_rate {
        cli.benchmark_rate = v;
    }
    if let Some(v) = payload.start_date {
        cli.start_date = Some(v);
    }

    if let Some(v) = payload.debts {
        cli.debts = v;
    }
    if let Some(v) = payload.investments {
        cli.investments = v;
    }

    Ok(build_request(cli)?)
}

fn params_from_payload(
    current: &AllocationParams,
    payload: ParamsPayload,
) -> Result<AllocationParams, InputError> {
    let monthly_budget = payload.monthly_budget.unwrap_or(current.monthly_budget);
    let debt_allocation = payload.debt_allocation.unwrap_or(current.debt_allocation);
    let mut params = build_params(
        monthly_budget,
        debt_allocation,
        payload.debt_allocation_fraction,
    )?;
    params.strategy = payload
        .strategy
        .map(|v| CliStrategy::from(v).into())
        .unwrap_or(current.strategy);
    params.pooled_initial = payload.pooled_initial.unwrap_or(current.pooled_initial);
    params.pooled_return_rate = payload
        .pooled_return_rate
        .unwrap_or(current.pooled_return_rate);
    params.rollover_unspent = payload
        .rollover_unspent
        .unwrap_or(current.rollover_unspent);
    params.validate()?;
    Ok(params)
}

fn default_cli_for_api() -> Cli {
    Cli {
        monthly_budget: 1_000.0,
        debt_allocation: 500.0,
        debt_allocation_fraction: None,
        horizon_months: 60,
        strategy: CliStrategy::Avalanche,
        pooled_initial: 0.0,
        pooled_return_rate: 7.0,
        no_rollover: false,
        benchmark: CliBenchmark::Fixed,
        benchmark_rate: 7.0,
        start_date: None,
        debts: Vec::new(),
        investments: Vec::new(),
    }
}
