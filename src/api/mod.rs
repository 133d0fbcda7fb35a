use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Datelike;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    GoalSolveConfig, GoalSolveResult, GoalType, MortgageInputs, ProjectionError, SavingsInputs,
    TimeSeries, mortgage_figures, project_mortgage_vs_rent, project_simple_savings, solve_goal,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliGoalType {
    RequiredSavingsRate,
    RequiredAnnualReturn,
}

impl From<CliGoalType> for GoalType {
    fn from(value: CliGoalType) -> Self {
        match value {
            CliGoalType::RequiredSavingsRate => GoalType::RequiredSavingsRate,
            CliGoalType::RequiredAnnualReturn => GoalType::RequiredAnnualReturn,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiGoalType {
    #[serde(alias = "requiredSavingsRate", alias = "required_savings_rate")]
    RequiredSavingsRate,
    #[serde(alias = "requiredAnnualReturn", alias = "required_annual_return")]
    RequiredAnnualReturn,
}

impl From<ApiGoalType> for CliGoalType {
    fn from(value: ApiGoalType) -> Self {
        match value {
            ApiGoalType::RequiredSavingsRate => CliGoalType::RequiredSavingsRate,
            ApiGoalType::RequiredAnnualReturn => CliGoalType::RequiredAnnualReturn,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SavingsPayload {
    period_years: Option<u32>,
    monthly_salary: Option<f64>,
    savings_rate: Option<f64>,
    annual_return: Option<f64>,
    current_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MortgagePayload {
    deposit: Option<f64>,
    mortgage_principal: Option<f64>,
    mortgage_term_years: Option<u32>,
    annual_interest_rate: Option<f64>,
    monthly_rent: Option<f64>,
    annual_return: Option<f64>,
    current_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoalPayload {
    period_years: Option<u32>,
    monthly_salary: Option<f64>,
    savings_rate: Option<f64>,
    annual_return: Option<f64>,
    current_year: Option<i32>,
    goal_type: Option<ApiGoalType>,
    target_amount: Option<f64>,
    search_min: Option<f64>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(
    name = "moneygraph",
    about = "Savings and mortgage projection charts over a multi-year horizon"
)]
struct Cli {
    #[arg(long, default_value_t = 35, help = "Savings horizon in years")]
    period_years: u32,
    #[arg(long, default_value_t = 1800.0, help = "Monthly take-home income")]
    monthly_salary: f64,
    #[arg(
        long,
        default_value_t = 0.2,
        help = "Fraction of income put aside each month, e.g. 0.2"
    )]
    savings_rate: f64,
    #[arg(
        long,
        default_value_t = 0.05,
        help = "Expected annual return on invested savings as a fraction, e.g. 0.05"
    )]
    annual_return: f64,
    #[arg(long, default_value_t = 30_000.0, help = "Cash deposit paid up front")]
    deposit: f64,
    #[arg(long, default_value_t = 300_000.0, help = "Mortgage principal borrowed")]
    mortgage_principal: f64,
    #[arg(long, default_value_t = 28, help = "Mortgage term in years")]
    mortgage_term_years: u32,
    #[arg(
        long,
        default_value_t = 0.03,
        help = "Annual mortgage interest rate as a fraction, e.g. 0.03"
    )]
    annual_interest_rate: f64,
    #[arg(
        long,
        default_value_t = 1250.0,
        help = "Monthly rent for the comparison scenario"
    )]
    monthly_rent: f64,
    #[arg(
        long,
        help = "First projected year; defaults to the calendar year of the host clock"
    )]
    current_year: Option<i32>,
    #[arg(
        long,
        value_enum,
        default_value_t = CliGoalType::RequiredSavingsRate,
        help = "Which savings parameter the goal solver searches over"
    )]
    goal_type: CliGoalType,
    #[arg(
        long,
        default_value_t = 1_000_000.0,
        help = "Amount the invested savings should reach by the end of the horizon"
    )]
    target_amount: f64,
    #[arg(long, default_value_t = 0.0, help = "Lower bound of the goal search")]
    search_min: f64,
    #[arg(long, default_value_t = 1.0, help = "Upper bound of the goal search")]
    search_max: f64,
    #[arg(long, default_value_t = 1e-4, help = "Goal search interval tolerance")]
    tolerance: f64,
    #[arg(long, default_value_t = 48, help = "Goal search iteration cap")]
    max_iterations: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SavingsResponse {
    current_year: i32,
    period_years: u32,
    series: Vec<TimeSeries>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MortgageResponse {
    current_year: i32,
    mortgage_term_years: u32,
    property_price: f64,
    monthly_mortgage_payment: f64,
    monthly_investable: f64,
    series: Vec<TimeSeries>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoalResponse {
    current_year: i32,
    goal: GoalSolveResult,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn default_cli_for_api() -> Cli {
    Cli {
        period_years: 35,
        monthly_salary: 1_800.0,
        savings_rate: 0.2,
        annual_return: 0.05,
        deposit: 30_000.0,
        mortgage_principal: 300_000.0,
        mortgage_term_years: 28,
        annual_interest_rate: 0.03,
        monthly_rent: 1_250.0,
        current_year: None,
        goal_type: CliGoalType::RequiredSavingsRate,
        target_amount: 1_000_000.0,
        search_min: 0.0,
        search_max: 1.0,
        tolerance: 1e-4,
        max_iterations: 48,
    }
}

fn resolve_current_year(requested: Option<i32>) -> i32 {
    requested.unwrap_or_else(|| chrono::Utc::now().year())
}

fn savings_inputs_from_payload(payload: SavingsPayload) -> SavingsInputs {
    let cli = default_cli_for_api();
    SavingsInputs {
        period_years: payload.period_years.unwrap_or(cli.period_years),
        monthly_salary: payload.monthly_salary.unwrap_or(cli.monthly_salary),
        savings_rate: payload.savings_rate.unwrap_or(cli.savings_rate),
        annual_return: payload.annual_return.unwrap_or(cli.annual_return),
        current_year: resolve_current_year(payload.current_year.or(cli.current_year)),
    }
}

fn mortgage_inputs_from_payload(payload: MortgagePayload) -> MortgageInputs {
    let cli = default_cli_for_api();
    MortgageInputs {
        deposit: payload.deposit.unwrap_or(cli.deposit),
        mortgage_principal: payload.mortgage_principal.unwrap_or(cli.mortgage_principal),
        mortgage_term_years: payload
            .mortgage_term_years
            .unwrap_or(cli.mortgage_term_years),
        annual_interest_rate: payload
            .annual_interest_rate
            .unwrap_or(cli.annual_interest_rate),
        monthly_rent: payload.monthly_rent.unwrap_or(cli.monthly_rent),
        annual_return: payload.annual_return.unwrap_or(cli.annual_return),
        current_year: resolve_current_year(payload.current_year.or(cli.current_year)),
    }
}

fn goal_request_from_payload(payload: GoalPayload) -> (SavingsInputs, GoalSolveConfig) {
    let cli = default_cli_for_api();
    let inputs = SavingsInputs {
        period_years: payload.period_years.unwrap_or(cli.period_years),
        monthly_salary: payload.monthly_salary.unwrap_or(cli.monthly_salary),
        savings_rate: payload.savings_rate.unwrap_or(cli.savings_rate),
        annual_return: payload.annual_return.unwrap_or(cli.annual_return),
        current_year: resolve_current_year(payload.current_year.or(cli.current_year)),
    };
    let goal_type: CliGoalType = payload
        .goal_type
        .map(CliGoalType::from)
        .unwrap_or(cli.goal_type);
    let config = GoalSolveConfig {
        goal_type: goal_type.into(),
        target_amount: payload.target_amount.unwrap_or(cli.target_amount),
        search_min: payload.search_min.unwrap_or(cli.search_min),
        search_max: payload.search_max.unwrap_or(cli.search_max),
        tolerance: payload.tolerance.unwrap_or(cli.tolerance),
        max_iterations: payload.max_iterations.unwrap_or(cli.max_iterations),
    };
    (inputs, config)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/savings",
            get(savings_get_handler).post(savings_post_handler),
        )
        .route(
            "/api/mortgage",
            get(mortgage_get_handler).post(mortgage_post_handler),
        )
        .route("/api/goal", get(goal_get_handler).post(goal_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    log::info!("moneygraph HTTP API listening on http://{addr}");
    log::info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn savings_get_handler(Query(payload): Query<SavingsPayload>) -> Response {
    savings_handler_impl(payload).await
}

async fn savings_post_handler(Json(payload): Json<SavingsPayload>) -> Response {
    savings_handler_impl(payload).await
}

async fn savings_handler_impl(payload: SavingsPayload) -> Response {
    let inputs = savings_inputs_from_payload(payload);
    match project_simple_savings(&inputs) {
        Ok(result) => json_response(
            StatusCode::OK,
            SavingsResponse {
                current_year: inputs.current_year,
                period_years: inputs.period_years,
                series: result.series,
            },
        ),
        Err(err) => reject(err),
    }
}

async fn mortgage_get_handler(Query(payload): Query<MortgagePayload>) -> Response {
    mortgage_handler_impl(payload).await
}

async fn mortgage_post_handler(Json(payload): Json<MortgagePayload>) -> Response {
    mortgage_handler_impl(payload).await
}

async fn mortgage_handler_impl(payload: MortgagePayload) -> Response {
    let inputs = mortgage_inputs_from_payload(payload);
    let figures = match mortgage_figures(&inputs) {
        Ok(figures) => figures,
        Err(err) => return reject(err),
    };
    match project_mortgage_vs_rent(&inputs) {
        Ok(result) => json_response(
            StatusCode::OK,
            MortgageResponse {
                current_year: inputs.current_year,
                mortgage_term_years: inputs.mortgage_term_years,
                property_price: figures.property_price,
                monthly_mortgage_payment: figures.monthly_payment,
                monthly_investable: figures.monthly_investable,
                series: result.series,
            },
        ),
        Err(err) => reject(err),
    }
}

async fn goal_get_handler(Query(payload): Query<GoalPayload>) -> Response {
    goal_handler_impl(payload).await
}

async fn goal_post_handler(Json(payload): Json<GoalPayload>) -> Response {
    goal_handler_impl(payload).await
}

async fn goal_handler_impl(payload: GoalPayload) -> Response {
    let (inputs, config) = goal_request_from_payload(payload);
    match solve_goal(&inputs, config) {
        Ok(goal) => json_response(
            StatusCode::OK,
            GoalResponse {
                current_year: inputs.current_year,
                goal,
            },
        ),
        Err(err) => reject(err),
    }
}

fn reject(err: ProjectionError) -> Response {
    let msg = err.to_string();
    log::warn!("rejected projection request: {msg}");
    error_response(StatusCode::BAD_REQUEST, &msg)
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
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
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn savings_payload_parses_web_keys() {
        let json = r#"{
          "periodYears": 20,
          "monthlySalary": 2500,
          "savingsRate": 0.25,
          "annualReturn": 0.07,
          "currentYear": 2024
        }"#;
        let payload = serde_json::from_str::<SavingsPayload>(json).expect("json should parse");
        let inputs = savings_inputs_from_payload(payload);

        assert_eq!(inputs.period_years, 20);
        assert_approx(inputs.monthly_salary, 2_500.0);
        assert_approx(inputs.savings_rate, 0.25);
        assert_approx(inputs.annual_return, 0.07);
        assert_eq!(inputs.current_year, 2_024);
    }

    #[test]
    fn savings_payload_defaults_match_the_form_defaults() {
        let payload = serde_json::from_str::<SavingsPayload>("{}").expect("json should parse");
        let inputs = savings_inputs_from_payload(payload);

        assert_eq!(inputs.period_years, 35);
        assert_approx(inputs.monthly_salary, 1_800.0);
        assert_approx(inputs.savings_rate, 0.2);
        assert_approx(inputs.annual_return, 0.05);
    }

    #[test]
    fn mortgage_payload_parses_web_keys_and_defaults() {
        let json = r#"{
          "deposit": 40000,
          "annualInterestRate": 0.04,
          "currentYear": 2024
        }"#;
        let payload = serde_json::from_str::<MortgagePayload>(json).expect("json should parse");
        let inputs = mortgage_inputs_from_payload(payload);

        assert_approx(inputs.deposit, 40_000.0);
        assert_approx(inputs.annual_interest_rate, 0.04);
        assert_approx(inputs.mortgage_principal, 300_000.0);
        assert_eq!(inputs.mortgage_term_years, 28);
        assert_approx(inputs.monthly_rent, 1_250.0);
        assert_approx(inputs.annual_return, 0.05);
        assert_eq!(inputs.current_year, 2_024);
    }

    #[test]
    fn goal_payload_parses_kebab_and_camel_goal_types() {
        let kebab = r#"{"goalType": "required-annual-return", "currentYear": 2024}"#;
        let payload = serde_json::from_str::<GoalPayload>(kebab).expect("json should parse");
        let (_, config) = goal_request_from_payload(payload);
        assert_eq!(config.goal_type, GoalType::RequiredAnnualReturn);

        let camel = r#"{"goalType": "requiredSavingsRate", "targetAmount": 500000}"#;
        let payload = serde_json::from_str::<GoalPayload>(camel).expect("json should parse");
        let (_, config) = goal_request_from_payload(payload);
        assert_eq!(config.goal_type, GoalType::RequiredSavingsRate);
        assert_approx(config.target_amount, 500_000.0);
    }

    #[test]
    fn goal_defaults_target_a_million_within_unit_bounds() {
        let payload = serde_json::from_str::<GoalPayload>("{}").expect("json should parse");
        let (inputs, config) = goal_request_from_payload(payload);

        assert_eq!(config.goal_type, GoalType::RequiredSavingsRate);
        assert_approx(config.target_amount, 1_000_000.0);
        assert_approx(config.search_min, 0.0);
        assert_approx(config.search_max, 1.0);
        assert_eq!(config.max_iterations, 48);
        assert_eq!(inputs.period_years, 35);
    }

    #[test]
    fn explicit_current_year_bypasses_the_clock() {
        let payload = SavingsPayload {
            current_year: Some(1_999),
            ..SavingsPayload::default()
        };
        let inputs = savings_inputs_from_payload(payload);
        assert_eq!(inputs.current_year, 1_999);
    }

    #[test]
    fn savings_response_serializes_expected_fields() {
        let payload = serde_json::from_str::<SavingsPayload>(r#"{"currentYear": 2024}"#)
            .expect("json should parse");
        let inputs = savings_inputs_from_payload(payload);
        let result = project_simple_savings(&inputs).expect("valid inputs");
        let response = SavingsResponse {
            current_year: inputs.current_year,
            period_years: inputs.period_years,
            series: result.series,
        };

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"currentYear\""));
        assert!(json.contains("\"periodYears\""));
        assert!(json.contains("\"series\""));
        assert!(json.contains("\"Annual salary\""));
        assert!(json.contains("\"Savings (invested)\""));
    }

    #[test]
    fn mortgage_response_serializes_expected_fields() {
        let payload = serde_json::from_str::<MortgagePayload>(r#"{"currentYear": 2024}"#)
            .expect("json should parse");
        let inputs = mortgage_inputs_from_payload(payload);
        let figures = mortgage_figures(&inputs).expect("valid inputs");
        let result = project_mortgage_vs_rent(&inputs).expect("valid inputs");
        let response = MortgageResponse {
            current_year: inputs.current_year,
            mortgage_term_years: inputs.mortgage_term_years,
            property_price: figures.property_price,
            monthly_mortgage_payment: figures.monthly_payment,
            monthly_investable: figures.monthly_investable,
            series: result.series,
        };

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"monthlyMortgagePayment\":1321.0"));
        assert!(json.contains("\"monthlyInvestable\":71.0"));
        assert!(json.contains("\"propertyPrice\":330000.0"));
        assert!(json.contains("\"Annual mortgage\""));
        assert!(json.contains("\"Remainder (invested)\""));
    }

    #[test]
    fn goal_response_serializes_solver_outcome() {
        let payload = serde_json::from_str::<GoalPayload>(r#"{"currentYear": 2024}"#)
            .expect("json should parse");
        let (inputs, config) = goal_request_from_payload(payload);
        let goal = solve_goal(&inputs, config).expect("must solve");
        let response = GoalResponse {
            current_year: inputs.current_year,
            goal,
        };

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"goalType\":\"required-savings-rate\""));
        assert!(json.contains("\"targetAmount\""));
        assert!(json.contains("\"solvedValue\""));
        assert!(json.contains("\"feasible\""));
        assert!(json.contains("\"iterations\""));
    }

    #[test]
    fn engine_rejections_surface_the_field_name() {
        let payload = serde_json::from_str::<SavingsPayload>(
            r#"{"savingsRate": 1.5, "currentYear": 2024}"#,
        )
        .expect("json should parse");
        let inputs = savings_inputs_from_payload(payload);
        let err = project_simple_savings(&inputs).expect_err("must reject rate above 1");
        assert!(err.to_string().contains("savings_rate"));
    }
}
