//! HTTP client for the entity management service

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use std::path::Path;

use super::constants::{CSV_MIME, form_fields, headers};
use super::models::{
    AccessToken, EntityKind, EntityTypeFindRequest, EntityTypeFindResponse, EntityTypeMatch,
    LoginRequest, LoginResponse, MappingIds, MappingResponse, UserRolePayload,
};
use crate::config::{EnvironmentConfig, RunConfig};

/// Calls the pipeline makes against the remote service.
///
/// Every method fails on anything but HTTP 200; the error names the URL and
/// status so the driver can report it verbatim.
#[async_trait]
pub trait EntityService: Send + Sync {
    /// Exchange the configured credentials for an access token
    async fn login(&self) -> Result<AccessToken>;

    async fn create_entity_types(&self, token: &AccessToken, csv: &Path) -> Result<()>;

    async fn create_entities(&self, token: &AccessToken, kind: EntityKind, csv: &Path) -> Result<()>;

    /// Upload `entityCSV.csv` and get back the server-computed id pairs
    async fn generate_mapping(&self, token: &AccessToken, csv: &Path) -> Result<MappingIds>;

    async fn upload_mapping(&self, token: &AccessToken, csv: &Path) -> Result<()>;

    /// Look up entity types whose name equals `name` exactly
    async fn find_entity_type(&self, name: &str) -> Result<Vec<EntityTypeMatch>>;

    async fn create_user_role(&self, token: &AccessToken, payload: &UserRolePayload) -> Result<()>;
}

/// reqwest-backed [`EntityService`]
pub struct EntityClient {
    http: reqwest::Client,
    env: EnvironmentConfig,
}

impl EntityClient {
    /// Build a client for the run's environment. No request is sent here.
    pub fn new(config: &RunConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build().context("Failed to build HTTP client")?,
            env: config.environment.clone(),
        })
    }

    /// POST one CSV file as multipart form data under `field`
    async fn post_csv(&self, token: &AccessToken, url: &str, field: &'static str, csv: &Path) -> Result<Response> {
        let bytes = tokio::fs::read(csv)
            .await
            .with_context(|| format!("Failed to read {}", csv.display()))?;

        let file_name = csv
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.csv", field));

        let part = Part::bytes(bytes).file_name(file_name).mime_str(CSV_MIME)?;
        let form = Form::new().part(field, part);

        debug!("POST {} ({} from {})", url, field, csv.display());
        let response = self
            .http
            .post(url)
            .header(headers::AUTH_TOKEN, token.as_str())
            .header(headers::INTERNAL_ACCESS_TOKEN, &self.env.internal_access_token)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        ensure_ok(url, response).await
    }
}

/// Pass a 200 response through; turn anything else into an error carrying
/// the URL, status code and response body.
async fn ensure_ok(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    bail!("{} returned status {}: {}", url, status.as_u16(), body.trim())
}

#[async_trait]
impl EntityService for EntityClient {
    async fn login(&self) -> Result<AccessToken> {
        let url = self.env.login_url();
        let body = LoginRequest {
            email: &self.env.email,
            password: &self.env.password,
        };

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, &self.env.content_type)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let login: LoginResponse = ensure_ok(&url, response)
            .await?
            .json()
            .await
            .with_context(|| format!("Unexpected login response from {}", url))?;

        info!("Access token issued by {}", self.env.user_host);
        Ok(AccessToken::new(login.result.access_token))
    }

    async fn create_entity_types(&self, token: &AccessToken, csv: &Path) -> Result<()> {
        let url = self.env.entity_url(&self.env.entity_type_bulk_create);
        self.post_csv(token, &url, form_fields::ENTITY_TYPES, csv).await?;
        Ok(())
    }

    async fn create_entities(&self, token: &AccessToken, kind: EntityKind, csv: &Path) -> Result<()> {
        let url = format!("{}{}", self.env.entity_url(&self.env.entities_bulk_create), kind);
        self.post_csv(token, &url, form_fields::ENTITIES, csv).await?;
        Ok(())
    }

    async fn generate_mapping(&self, token: &AccessToken, csv: &Path) -> Result<MappingIds> {
        let url = self.env.entity_url(&self.env.generate_mapping_csv);
        let mapping: MappingResponse = self
            .post_csv(token, &url, form_fields::ENTITY_CSV, csv)
            .await?
            .json()
            .await
            .with_context(|| format!("Malformed mapping response from {}", url))?;
        Ok(mapping.result)
    }

    async fn upload_mapping(&self, token: &AccessToken, csv: &Path) -> Result<()> {
        let url = self.env.entity_url(&self.env.mapping_entities);
        self.post_csv(token, &url, form_fields::ENTITY_MAP, csv).await?;
        Ok(())
    }

    async fn find_entity_type(&self, name: &str) -> Result<Vec<EntityTypeMatch>> {
        let url = self.env.entity_url(&self.env.entity_type_find);

        let response = self
            .http
            .post(&url)
            .header(headers::INTERNAL_ACCESS_TOKEN, &self.env.internal_access_token)
            .json(&EntityTypeFindRequest::by_name(name))
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let found: EntityTypeFindResponse = ensure_ok(&url, response)
            .await
            .with_context(|| format!("Entity type lookup failed for: {}", name))?
            .json()
            .await
            .with_context(|| format!("Malformed entity type response for: {}", name))?;

        debug!("Entity type lookup '{}' returned {} match(es)", name, found.result.len());
        Ok(found.result)
    }

    async fn create_user_role(&self, token: &AccessToken, payload: &UserRolePayload) -> Result<()> {
        let url = self.env.entity_url(&self.env.create_user_data);

        let response = self
            .http
            .post(&url)
            .header(headers::AUTH_TOKEN, token.as_str())
            .header(headers::INTERNAL_ACCESS_TOKEN, &self.env.internal_access_token)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        ensure_ok(&url, response).await?;
        Ok(())
    }
}
