use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use hr_roster_core::{Employee, EmployeeStatus};

/// Client for the roster HTTP API.
#[derive(Clone)]
pub struct RosterClient {
    http: Client,
    base_url: Url,
}

impl RosterClient {
    /// Creates a new client. `base_url` should end with a `/` so that paths
    /// are joined below it.
    pub fn new(base_url: Url, http: Client) -> Self {
        Self { http, base_url }
    }

    /// Lists every employee.
    pub async fn list_employees(&self) -> Result<Vec<Employee>, ClientError> {
        let url = self.base_url.join("employees")?;
        let response = self.http.get(url).send().await?;
        parse_json(response).await
    }

    /// Lists employees filtered by a status keyword.
    pub async fn list_by_status(&self, status: &str) -> Result<Vec<Employee>, ClientError> {
        let mut url = self.base_url.join("employees")?;
        url.query_pairs_mut().append_pair("status", status);

        let response = self.http.get(url).send().await?;
        parse_json(response).await
    }

    /// Fetches a single employee, `None` when the API answers 404.
    pub async fn fetch_employee(&self, employee_id: &str) -> Result<Option<Employee>, ClientError> {
        let url = self.employee_url(employee_id)?;
        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        parse_json(response).await.map(Some)
    }

    /// Creates an employee, returning the record echoed back by the API.
    pub async fn add_employee(&self, employee: &Employee) -> Result<Employee, ClientError> {
        let url = self.base_url.join("employees")?;
        let response = self.http.put(url).json(employee).send().await?;
        parse_json(response).await
    }

    /// Sets the status of an employee using a keyword.
    pub async fn change_status(&self, employee_id: &str, status: &str) -> Result<(), ClientError> {
        let url = self.employee_url(employee_id)?;
        let body = serde_json::json!({ "status": status });
        let response = self.http.post(url).json(&body).send().await?;
        ensure_success(response).await
    }

    fn employee_url(&self, employee_id: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.join("employees/")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(employee_id);
        Ok(url)
    }
}

/// Keyword that flips an employee whose current status flag is `current`.
pub fn toggled_status(current: bool) -> &'static str {
    if current {
        EmployeeStatus::Inactive.as_str()
    } else {
        EmployeeStatus::Active.as_str()
    }
}

/// Errors produced by the roster client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build url: {0}")]
    Url(#[from] url::ParseError),
    #[error("base url cannot hold path segments: {0}")]
    BaseUrl(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

async fn ensure_success(response: Response) -> Result<(), ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status { status, body });
    }
    Ok(())
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status { status, body });
    }
    Ok(response.json::<T>().await?)
}
