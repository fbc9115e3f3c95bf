use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::warn;

use hr_roster_core::EmployeesService;
use hr_roster_storage::{Database, EmployeeRepository};

use crate::{employees, telemetry};

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    storage: Database,
    employees: EmployeesService<EmployeeRepository>,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, storage: Database) -> Self {
        let employees = EmployeesService::new(storage.employees());
        Self {
            metrics,
            storage,
            employees,
        }
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn storage(&self) -> &Database {
        &self.storage
    }

    pub fn employees(&self) -> &EmployeesService<EmployeeRepository> {
        &self.employees
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/employees", employee_collection())
        .route("/employees/:id", employee_item())
        // Location headers point at the capitalized path.
        .route("/Employees", employee_collection())
        .route("/Employees/:id", employee_item())
        .with_state(state)
}

fn employee_collection() -> MethodRouter<AppState> {
    get(employees::list).put(employees::add)
}

fn employee_item() -> MethodRouter<AppState> {
    get(employees::get).post(employees::update_status)
}

async fn healthz(State(state): State<AppState>) -> StatusCode {
    match state.storage().ping().await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            warn!(stage = "storage", error = %err, "health check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn metrics(State(state): State<AppState>) -> Response {
    let body = telemetry::render_metrics(state.metrics());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        Body::from(body),
    )
        .into_response()
}
