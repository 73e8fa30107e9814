//! Request and response shapes of the entity management service

use serde::{Deserialize, Serialize};

/// Access token returned by login. Held in memory for one run only.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Level of the administrative hierarchy. Each kind has its own sheet and
/// its own bulk-create URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    State,
    District,
    Block,
    Cluster,
    School,
}

impl EntityKind {
    /// Upload order, parents before children
    pub const ALL: [EntityKind; 5] = [
        EntityKind::State,
        EntityKind::District,
        EntityKind::Block,
        EntityKind::Cluster,
        EntityKind::School,
    ];

    /// Sheet name, CSV stem and URL suffix for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::State => "state",
            EntityKind::District => "district",
            EntityKind::Block => "block",
            EntityKind::Cluster => "cluster",
            EntityKind::School => "school",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub result: LoginResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResult {
    pub access_token: String,
}

/// Parent and child ids computed by the service from `entityCSV.csv`.
/// Index `i` of one list belongs with index `i` of the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingIds {
    pub parent_entity_ids: Vec<String>,
    pub child_entity_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MappingResponse {
    pub result: MappingIds,
}

#[derive(Debug, Serialize)]
pub(crate) struct EntityTypeFindRequest<'a> {
    pub query: EntityTypeQuery<'a>,
    pub projection: [&'static str; 1],
}

#[derive(Debug, Serialize)]
pub(crate) struct EntityTypeQuery<'a> {
    pub name: &'a str,
}

impl<'a> EntityTypeFindRequest<'a> {
    pub fn by_name(name: &'a str) -> Self {
        Self {
            query: EntityTypeQuery { name },
            projection: ["name"],
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntityTypeFindResponse {
    #[serde(default)]
    pub result: Vec<EntityTypeMatch>,
}

/// One entity type returned by a name lookup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntityTypeMatch {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Entity type reference embedded in a user role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTypeRef {
    pub entity_type: String,
    pub entity_type_id: String,
}

/// Body of a user-role creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRolePayload {
    pub title: String,
    pub user_role_id: String,
    pub code: String,
    pub status: String,
    pub entity_types: Vec<EntityTypeRef>,
}
