use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{debug, error, info};

use hr_roster_core::{Employee, EmployeeStatus, ServiceError};
use hr_roster_storage::EmployeeStoreError;

use crate::problem::ProblemResponse;
use crate::router::AppState;
use crate::telemetry::record_request;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    status: Option<String>,
}

/// `GET /employees[?status=]`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Employee>>, ProblemResponse> {
    let service = state.employees();
    let result = match query.status.as_deref().filter(|value| !value.is_empty()) {
        Some(keyword) => service.list_by_status(keyword).await,
        None => service.list_all().await,
    };

    let employees = result.map_err(|err| service_failure("list", None, err))?;
    record_request("list", "ok");
    Ok(Json(employees))
}

/// `GET /employees/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Result<Json<Employee>, ProblemResponse> {
    let employee = state
        .employees()
        .get_by_id(&employee_id)
        .await
        .map_err(|err| service_failure("get", Some(employee_id.as_str()), err))?;

    match employee {
        Some(employee) => {
            record_request("get", "ok");
            Ok(Json(employee))
        }
        None => {
            record_request("get", "not_found");
            Err(ProblemResponse::not_found(&employee_id))
        }
    }
}

/// `PUT /employees`
pub async fn add(
    State(state): State<AppState>,
    payload: Result<Json<Employee>, JsonRejection>,
) -> Result<Response, ProblemResponse> {
    let Json(employee) = payload.map_err(|rejection| rejected_body("add", "invalid_body", rejection))?;
    let employee_id = employee.employee_id.clone();
    let added = state
        .employees()
        .add(employee)
        .await
        .map_err(|err| service_failure("add", Some(employee_id.as_str()), err))?;

    info!(stage = "api", employee_id = %added.employee_id, status = %added.employee_status(), "employee created");
    record_request("add", "ok");

    let location = format!("/Employees/{}", added.employee_id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(added)).into_response())
}

/// `POST /employees/{id}` with `{"status": "active" | "inactive"}`
pub async fn update_status(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<StatusCode, ProblemResponse> {
    let Json(request) = payload
        .map_err(|rejection| rejected_body("update_status", "invalid_status", rejection))?;
    let keyword = request.status.unwrap_or_default();
    if let Err(err) = keyword.parse::<EmployeeStatus>() {
        record_request("update_status", "invalid_status");
        return Err(ProblemResponse::bad_request("invalid_status", err.to_string()));
    }

    let updated = state
        .employees()
        .update_status(&employee_id, &keyword)
        .await
        .map_err(|err| service_failure("update_status", Some(employee_id.as_str()), err))?;

    match updated {
        Some(employee) => {
            info!(stage = "api", employee_id = %employee.employee_id, status = %employee.employee_status(), "employee status updated");
            record_request("update_status", "ok");
            Ok(StatusCode::OK)
        }
        None => {
            record_request("update_status", "not_found");
            Err(ProblemResponse::not_found(&employee_id))
        }
    }
}

/// A body that is not JSON or does not fit the expected shape.
fn rejected_body(
    operation: &'static str,
    problem_type: &'static str,
    rejection: JsonRejection,
) -> ProblemResponse {
    debug!(stage = "api", operation, error = %rejection.body_text(), "request body rejected");
    record_request(operation, problem_type);
    ProblemResponse::bad_request(problem_type, rejection.body_text())
}

fn service_failure(
    operation: &'static str,
    employee_id: Option<&str>,
    err: ServiceError<EmployeeStoreError>,
) -> ProblemResponse {
    match err {
        ServiceError::Duplicate(id) => {
            info!(stage = "api", employee_id = %id, "duplicate employee rejected");
            record_request(operation, "duplicate");
            ProblemResponse::bad_request(
                "duplicate_employee",
                format!("an employee with id '{id}' already exists"),
            )
        }
        ServiceError::MissingEmployeeId => {
            record_request(operation, "invalid_employee");
            ProblemResponse::bad_request("missing_employee_id", "employeeId must not be empty")
        }
        ServiceError::Storage(err) => {
            error!(stage = "api", operation, employee_id = employee_id.unwrap_or_default(), error = %err, "employee store failure");
            record_request(operation, "error");
            ProblemResponse::storage()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use hr_roster_core::Employee;
    use hr_roster_storage::Database;

    use crate::router::{app_router, AppState};
    use crate::telemetry;

    async fn setup_state() -> AppState {
        let metrics = telemetry::init_metrics().expect("metrics init");
        let database = Database::connect("sqlite::memory:?cache=shared")
            .await
            .expect("connect");
        database.run_migrations().await.expect("migrations");
        AppState::new(metrics, database)
    }

    async fn seeded_state() -> AppState {
        let state = setup_state().await;
        for employee in [Employee::new("e1", true), Employee::new("e2", false)] {
            state.employees().add(employee).await.expect("seed");
        }
        state
    }

    async fn send(state: &AppState, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        app_router(state.clone())
            .oneshot(request)
            .await
            .expect("handler should respond")
    }

    async fn read_json(response: Response) -> Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should read")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn ids(value: &Value) -> Vec<String> {
        value
            .as_array()
            .expect("array")
            .iter()
            .map(|item| item["employeeId"].as_str().expect("id").to_string())
            .collect()
    }

    #[tokio::test]
    async fn list_without_query_returns_all() {
        let state = seeded_state().await;

        let response = send(&state, Method::GET, "/employees", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ids(&read_json(response).await), vec!["e1", "e2"]);
    }

    #[tokio::test]
    async fn list_with_empty_status_returns_all() {
        let state = seeded_state().await;

        let response = send(&state, Method::GET, "/employees?status=", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ids(&read_json(response).await).len(), 2);
    }

    #[tokio::test]
    async fn list_filters_by_status_keyword() {
        let state = seeded_state().await;

        let response = send(&state, Method::GET, "/employees?status=Active", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ids(&read_json(response).await), vec!["e1"]);

        let response = send(&state, Method::GET, "/employees?status=inactive", None).await;
        assert_eq!(ids(&read_json(response).await), vec!["e2"]);

        let response = send(&state, Method::GET, "/employees?status=unknown", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ids(&read_json(response).await), vec!["e2"]);
    }

    #[tokio::test]
    async fn get_returns_record_or_not_found() {
        let state = seeded_state().await;

        let response = send(&state, Method::GET, "/employees/e1", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            read_json(response).await,
            json!({"employeeId": "e1", "firstName": null, "lastName": null, "status": true})
        );

        let response = send(&state, Method::GET, "/employees/missing", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(read_json(response).await["type"], "employee_not_found");
    }

    #[tokio::test]
    async fn add_returns_created_with_location() {
        let state = seeded_state().await;
        let body = json!({"employeeId": "e3", "firstName": "Grace", "lastName": "Hopper", "status": true});

        let response = send(&state, Method::PUT, "/employees", Some(body.clone())).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).expect("location"),
            "/Employees/e3"
        );
        assert_eq!(read_json(response).await, body);

        let response = send(&state, Method::GET, "/Employees/e3", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await, body);
    }

    #[tokio::test]
    async fn add_defaults_missing_status_to_inactive() {
        let state = setup_state().await;

        let response = send(&state, Method::PUT, "/employees", Some(json!({"employeeId": "e9"}))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(read_json(response).await["status"], false);
    }

    #[tokio::test]
    async fn add_duplicate_returns_bad_request_and_keeps_store() {
        let state = seeded_state().await;

        let response = send(
            &state,
            Method::PUT,
            "/employees",
            Some(json!({"employeeId": "e1", "status": false})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["type"], "duplicate_employee");

        let all = state.employees().list_all().await.expect("list");
        assert_eq!(all.len(), 2);
        assert_eq!(
            state.employees().get_by_id("e1").await.expect("get"),
            Some(Employee::new("e1", true))
        );
    }

    #[tokio::test]
    async fn add_blank_id_returns_bad_request() {
        let state = setup_state().await;

        let response = send(&state, Method::PUT, "/employees", Some(json!({"employeeId": ""}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["type"], "missing_employee_id");
    }

    #[tokio::test]
    async fn update_status_returns_empty_ok() {
        let state = seeded_state().await;

        let response = send(
            &state,
            Method::POST,
            "/employees/e2",
            Some(json!({"status": "ACTIVE"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        assert!(bytes.is_empty());

        let response = send(&state, Method::GET, "/employees?status=active", None).await;
        assert_eq!(ids(&read_json(response).await), vec!["e1", "e2"]);
    }

    #[tokio::test]
    async fn update_status_rejects_invalid_keyword_before_lookup() {
        let state = seeded_state().await;

        let response = send(
            &state,
            Method::POST,
            "/employees/missing",
            Some(json!({"status": "non valid status"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["type"], "invalid_status");

        let response = send(&state, Method::POST, "/employees/e1", Some(json!({}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_status_rejects_non_string_status() {
        let state = seeded_state().await;

        for body in [json!({"status": 5}), json!({"status": true})] {
            let response = send(&state, Method::POST, "/employees/e1", Some(body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                response.headers().get(header::CONTENT_TYPE).expect("content type"),
                "application/problem+json"
            );
            assert_eq!(read_json(response).await["type"], "invalid_status");
        }

        let active = state.employees().list_by_status("active").await.expect("list");
        assert_eq!(active, vec![Employee::new("e1", true)]);
    }

    #[tokio::test]
    async fn add_rejects_mistyped_body() {
        let state = seeded_state().await;

        let response = send(&state, Method::PUT, "/employees", Some(json!({"employeeId": 7}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).expect("content type"),
            "application/problem+json"
        );
        assert_eq!(read_json(response).await["type"], "invalid_body");

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/employees")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .expect("request");
        let response = app_router(state.clone())
            .oneshot(request)
            .await
            .expect("handler should respond");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["type"], "invalid_body");

        assert_eq!(state.employees().list_all().await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn update_status_unknown_employee_returns_not_found() {
        let state = seeded_state().await;

        let response = send(
            &state,
            Method::POST,
            "/employees/missing",
            Some(json!({"status": "active"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let active = state.employees().list_by_status("active").await.expect("list");
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn storage_failure_maps_to_internal_error() {
        let state = seeded_state().await;
        state.storage().close().await;

        let response = send(&state, Method::GET, "/employees", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read_json(response).await["type"], "storage_error");
    }
}
