//! In-memory [`EntityService`] that records every call

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::client::EntityService;
use super::models::{AccessToken, EntityKind, EntityTypeMatch, MappingIds, UserRolePayload};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login,
    CreateEntityTypes(PathBuf),
    CreateEntities(EntityKind, PathBuf),
    GenerateMapping(PathBuf),
    UploadMapping(PathBuf),
    FindEntityType(String),
    CreateUserRole(UserRolePayload),
}

#[derive(Default)]
pub struct FakeService {
    calls: Mutex<Vec<Call>>,
    pub fail_login: bool,
    /// Kinds whose upload answers with a server error
    pub failing_kinds: Vec<EntityKind>,
    pub mapping: MappingIds,
    /// Lookup results by trimmed name; unknown names return no matches
    pub entity_types: HashMap<String, Vec<EntityTypeMatch>>,
    /// Role titles whose creation is rejected
    pub failing_titles: Vec<String>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity_type(mut self, name: &str, id: &str) -> Self {
        self.entity_types
            .entry(name.to_string())
            .or_default()
            .push(EntityTypeMatch {
                id: id.to_string(),
                name: Some(name.to_string()),
            });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created_roles(&self) -> Vec<UserRolePayload> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateUserRole(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl EntityService for FakeService {
    async fn login(&self) -> Result<AccessToken> {
        self.record(Call::Login);
        if self.fail_login {
            return Err(anyhow!("https://users.test/login returned status 401: invalid credentials"));
        }
        Ok(AccessToken::new("test-token"))
    }

    async fn create_entity_types(&self, _token: &AccessToken, csv: &Path) -> Result<()> {
        self.record(Call::CreateEntityTypes(csv.to_path_buf()));
        Ok(())
    }

    async fn create_entities(&self, _token: &AccessToken, kind: EntityKind, csv: &Path) -> Result<()> {
        self.record(Call::CreateEntities(kind, csv.to_path_buf()));
        if self.failing_kinds.contains(&kind) {
            return Err(anyhow!("https://entities.test/bulkCreate{} returned status 400: bad rows", kind));
        }
        Ok(())
    }

    async fn generate_mapping(&self, _token: &AccessToken, csv: &Path) -> Result<MappingIds> {
        self.record(Call::GenerateMapping(csv.to_path_buf()));
        Ok(self.mapping.clone())
    }

    async fn upload_mapping(&self, _token: &AccessToken, csv: &Path) -> Result<()> {
        self.record(Call::UploadMapping(csv.to_path_buf()));
        Ok(())
    }

    async fn find_entity_type(&self, name: &str) -> Result<Vec<EntityTypeMatch>> {
        self.record(Call::FindEntityType(name.to_string()));
        Ok(self.entity_types.get(name).cloned().unwrap_or_default())
    }

    async fn create_user_role(&self, _token: &AccessToken, payload: &UserRolePayload) -> Result<()> {
        self.record(Call::CreateUserRole(payload.clone()));
        if self.failing_titles.contains(&payload.title) {
            return Err(anyhow!("https://entities.test/userRoleExtension/create returned status 400: duplicate"));
        }
        Ok(())
    }
}
