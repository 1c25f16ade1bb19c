//! HTTP client for the external person registry.
//!
//! The engine only ever searches, fetches and creates people; everything
//! else about the registry (deduplication, id assignment, contact history)
//! lives on the server side.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Result, RosterError};
use crate::models::{Organization, Person, PersonFormData, Role, Sport};
use crate::registry::{ApiError, PersonRegistry, ReferenceData};

/// Default base URL for the registry API; overridable through `Config`.
pub const DEFAULT_BASE_URL: &str = "https://registry.rosterbook.org/api";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Registry client. Clone is cheap - reqwest::Client uses Arc internally
/// for connection pooling.
#[derive(Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RegistryClient {
    pub fn new(base_url: Option<String>, timeout_secs: Option<u64>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(
                timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS),
            ))
            .build()
            .map_err(ApiError::from)?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            token: None,
        })
    }

    /// Create a client with the given bearer token, sharing the connection
    /// pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| RosterError::Dependency(e.into()))?,
            );
        }
        Ok(headers)
    }

    /// Check if a response is successful, folding the body into the error
    /// if not. Failed calls are surfaced immediately; the caller may
    /// re-invoke manually, so there is no retry loop here.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// GET a reference-data collection. These endpoints return plain arrays.
    async fn fetch_list<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)?;

        let response = Self::check_response(response).await?;
        let items: Vec<T> = response.json().await.map_err(ApiError::from)?;
        debug!(path = path, count = items.len(), "Fetched reference data");
        Ok(items)
    }

    fn parse_person_list(text: &str) -> Result<Vec<Person>> {
        // Direct array first, then the wrapped shapes the registry has been
        // seen to produce
        if let Ok(persons) = serde_json::from_str::<Vec<Person>>(text) {
            return Ok(persons);
        }

        #[derive(Deserialize)]
        struct PersonsWrapper {
            #[serde(default, alias = "data", alias = "members")]
            persons: Vec<Person>,
        }

        if let Ok(wrapper) = serde_json::from_str::<PersonsWrapper>(text) {
            return Ok(wrapper.persons);
        }

        warn!("Failed to parse registry search response");
        let snippet: String = text.chars().take(200).collect();
        Err(ApiError::InvalidResponse(format!("unexpected search payload: {}", snippet)).into())
    }
}

#[async_trait]
impl PersonRegistry for RegistryClient {
    /// Case-insensitive partial match over name, personal id and phone;
    /// the matching itself happens server-side.
    async fn search(&self, query: &str) -> Result<Vec<Person>> {
        let url = format!("{}/persons", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("query", query)])
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)?;

        let response = Self::check_response(response).await?;
        let text = response.text().await.map_err(ApiError::from)?;
        let persons = Self::parse_person_list(&text)?;
        debug!(query = query, count = persons.len(), "Registry search");
        Ok(persons)
    }

    async fn create(&self, form: &PersonFormData) -> Result<Person> {
        form.validate()?;
        let url = format!("{}/persons", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(form)
            .send()
            .await
            .map_err(ApiError::from)?;

        let response = Self::check_response(response).await?;
        let person: Person = response.json().await.map_err(ApiError::from)?;
        debug!(person_id = person.id, "Created person in registry");
        Ok(person)
    }

    async fn get(&self, id: i64) -> Result<Person> {
        let url = format!("{}/persons/{}", self.base_url, id);

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(RosterError::NotFound {
                entity: "person",
                id,
            });
        }
        let response = Self::check_response(response).await?;
        Ok(response.json().await.map_err(ApiError::from)?)
    }
}

#[async_trait]
impl ReferenceData for RegistryClient {
    async fn list_roles(&self) -> Result<Vec<Role>> {
        self.fetch_list("roles").await
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>> {
        self.fetch_list("organizations").await
    }

    async fn list_sports(&self) -> Result<Vec<Sport>> {
        self.fetch_list("sports").await
    }
}
