//! Per-environment endpoint and credential settings

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Overrides `email` from the configuration file when set
pub const EMAIL_ENV_VAR: &str = "ENTITY_LOADER_EMAIL";
/// Overrides `password` from the configuration file when set
pub const PASSWORD_ENV_VAR: &str = "ENTITY_LOADER_PASSWORD";

/// One named environment section.
///
/// Key names follow the deployment config files already in use, which is why
/// they mix casing styles.
#[derive(Clone, Deserialize)]
pub struct EnvironmentConfig {
    /// Base URL of the user service (login)
    #[serde(rename = "elevateuserhost")]
    pub user_host: String,
    #[serde(rename = "userlogin")]
    pub user_login: String,
    /// Content type sent with the login request
    #[serde(rename = "content-type")]
    pub content_type: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "internal-access-token")]
    pub internal_access_token: String,

    /// Base URL of the entity management service
    #[serde(rename = "elevateentityhost")]
    pub entity_host: String,
    #[serde(rename = "EntityTypeBulkCreate")]
    pub entity_type_bulk_create: String,
    /// Prefix of the per-kind upload path; the kind name is appended
    #[serde(rename = "EntitiesBulkCreate")]
    pub entities_bulk_create: String,
    #[serde(rename = "GeneratMappingCSVAPI")]
    pub generate_mapping_csv: String,
    #[serde(rename = "MappingEntities")]
    pub mapping_entities: String,
    #[serde(rename = "CreateUserData")]
    pub create_user_data: String,
    #[serde(rename = "EntityTypeFind")]
    pub entity_type_find: String,

    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub mapping_header: Option<[String; 2]>,
}

impl EnvironmentConfig {
    pub fn login_url(&self) -> String {
        format!("{}{}", self.user_host, self.user_login)
    }

    pub fn entity_url(&self, path: &str) -> String {
        format!("{}{}", self.entity_host, path)
    }

    /// Replace credentials with values from the process environment, if any
    pub fn with_credential_overrides(mut self, email: Option<String>, password: Option<String>) -> Self {
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            debug!("Using login email from {}", EMAIL_ENV_VAR);
            self.email = email;
        }
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            debug!("Using login password from {}", PASSWORD_ENV_VAR);
            self.password = password;
        }
        self
    }
}

impl std::fmt::Debug for EnvironmentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentConfig")
            .field("user_host", &self.user_host)
            .field("entity_host", &self.entity_host)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("internal_access_token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Read the configuration file and pick out one environment.
///
/// Credentials from `ENTITY_LOADER_EMAIL` / `ENTITY_LOADER_PASSWORD` (which may
/// come from a `.env` file) take precedence over the file.
pub fn load_environment(path: &Path, name: &str) -> Result<EnvironmentConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("{} is an invalid environment: cannot read {}", name, path.display()))?;

    let environment = parse_environment(&content, name)?;

    Ok(environment.with_credential_overrides(
        std::env::var(EMAIL_ENV_VAR).ok(),
        std::env::var(PASSWORD_ENV_VAR).ok(),
    ))
}

/// Parse configuration text and deserialize the section called `name`.
///
/// A missing section and an incomplete one are reported the same way: the
/// environment is invalid.
pub fn parse_environment(content: &str, name: &str) -> Result<EnvironmentConfig> {
    let table: toml::Table = toml::from_str(content).context("Failed to parse configuration file")?;

    let section = table
        .get(name)
        .cloned()
        .ok_or_else(|| anyhow!("{} is an invalid environment", name))?;

    section.try_into::<EnvironmentConfig>().map_err(|e| {
        debug!("Environment '{}' failed to deserialize: {}", name, e);
        anyhow!("{} is an invalid environment: {}", name, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_section(name: &str) -> String {
        format!(
            r#"
[{name}]
elevateuserhost = "https://users.example.org"
userlogin = "/user/v1/account/login"
content-type = "application/json"
email = "ops@example.org"
password = "secret"
internal-access-token = "internal"
elevateentityhost = "https://entities.example.org"
EntityTypeBulkCreate = "/entity/v1/entityTypes/bulkCreate"
EntitiesBulkCreate = "/entity/v1/entities/bulkCreate?type="
GeneratMappingCSVAPI = "/entity/v1/entities/createMappingCsv"
MappingEntities = "/entity/v1/entities/mappingUpload"
CreateUserData = "/entity/v1/userRoleExtension/create"
EntityTypeFind = "/entity/v1/entityTypes/find"
"#
        )
    }

    #[test]
    fn test_parse_named_environment() {
        let env = parse_environment(&full_section("qa"), "qa").unwrap();
        assert_eq!(env.login_url(), "https://users.example.org/user/v1/account/login");
        assert_eq!(
            env.entity_url(&env.entity_type_find),
            "https://entities.example.org/entity/v1/entityTypes/find"
        );
        assert_eq!(env.timeout_secs, None);
        assert!(env.mapping_header.is_none());
    }

    #[test]
    fn test_unknown_environment_is_named_in_error() {
        let err = parse_environment(&full_section("qa"), "prod").unwrap_err();
        assert_eq!(err.to_string(), "prod is an invalid environment");
    }

    #[test]
    fn test_incomplete_environment_is_invalid() {
        let content = r#"
[partial]
elevateuserhost = "https://users.example.org"
userlogin = "/login"
"#;
        let err = parse_environment(content, "partial").unwrap_err();
        assert!(err.to_string().starts_with("partial is an invalid environment"));
    }

    #[test]
    fn test_incomplete_sibling_does_not_block_valid_environment() {
        let content = format!("{}\n[broken]\nuserlogin = \"/login\"\n", full_section("qa"));
        assert!(parse_environment(&content, "qa").is_ok());
    }

    #[test]
    fn test_mapping_header_override() {
        let content = format!(
            "{}mapping_header = [\"parentEntityId\", \"childEntityId\"]\n",
            full_section("qa")
        );
        let env = parse_environment(&content, "qa").unwrap();
        assert_eq!(
            env.mapping_header,
            Some(["parentEntityId".to_string(), "childEntityId".to_string()])
        );
    }

    #[test]
    fn test_credential_overrides_skip_empty_values() {
        let env = parse_environment(&full_section("qa"), "qa")
            .unwrap()
            .with_credential_overrides(Some("other@example.org".to_string()), Some(String::new()));
        assert_eq!(env.email, "other@example.org");
        assert_eq!(env.password, "secret");
    }

    #[test]
    fn test_missing_file_names_environment_and_path() {
        let err = load_environment(Path::new("does/not/exist.toml"), "qa").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("qa is an invalid environment"));
        assert!(message.contains("does/not/exist.toml"));
    }
}
