//! User-role creation from `UserExtension.csv`
//!
//! Rows are processed in file order. The first row that fails (unreadable
//! row, unknown entity type, rejected create) stops the loop; later rows are
//! never attempted.

use anyhow::{Context, Result, bail};
use colored::*;
use log::{debug, warn};
use serde::Deserialize;
use std::path::Path;

use crate::api::constants::DEFAULT_ROLE_STATUS;
use crate::api::{AccessToken, EntityService, EntityTypeRef, UserRolePayload};

/// One `UserExtension.csv` row. Unknown columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRoleRow {
    pub title: String,
    #[serde(rename = "userRoleId")]
    pub user_role_id: String,
    pub code: String,
    #[serde(rename = "entityType")]
    pub entity_type: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl UserRoleRow {
    pub fn into_payload(self, entity_type_id: String) -> UserRolePayload {
        let status = self
            .status
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ROLE_STATUS.to_string());

        UserRolePayload {
            title: self.title,
            user_role_id: self.user_role_id,
            code: self.code,
            status,
            entity_types: vec![EntityTypeRef {
                entity_type: self.entity_type,
                entity_type_id,
            }],
        }
    }
}

/// Resolve an entity type name to its id.
///
/// The lookup matches the trimmed name exactly. If the service returns more
/// than one match the first is used.
pub async fn resolve_entity_type(service: &dyn EntityService, name: &str) -> Result<String> {
    let matches = service
        .find_entity_type(name.trim())
        .await
        .with_context(|| format!("Entity type lookup failed for: {}", name))?;

    match matches.as_slice() {
        [] => bail!("No valid entity type found for: {}", name),
        [only] => {
            debug!("Entity type '{}' resolved to {} ({:?})", name.trim(), only.id, only.name);
            Ok(only.id.clone())
        }
        [first, ..] => {
            warn!(
                "Entity type '{}' matched {} records; using the first ({})",
                name.trim(),
                matches.len(),
                first.id
            );
            Ok(first.id.clone())
        }
    }
}

async fn submit_row(service: &dyn EntityService, token: &AccessToken, row: UserRoleRow) -> Result<()> {
    let entity_type_id = resolve_entity_type(service, &row.entity_type).await?;
    let payload = row.into_payload(entity_type_id);

    debug!("Creating user role {:?}", payload);
    service
        .create_user_role(token, &payload)
        .await
        .with_context(|| format!("User creation failed for title: {}", payload.title))?;

    println!("    {} {}", "User creation succeeded for title:".green(), payload.title);
    Ok(())
}

/// Create one user role per row of `csv_path`, stopping at the first failure.
/// Returns how many roles were created.
pub async fn load_user_roles(service: &dyn EntityService, token: &AccessToken, csv_path: &Path) -> Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open {}", csv_path.display()))?;

    let mut created = 0;
    for (index, row) in reader.deserialize::<UserRoleRow>().enumerate() {
        // Line 1 is the header
        let line = index + 2;

        let result = match row {
            Ok(row) => submit_row(service, token, row).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = result {
            return Err(e.context(format!(
                "Error processing row {} of {}; stopped after {} user role(s) created",
                line,
                csv_path.display(),
                created
            )));
        }
        created += 1;
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeService};
    use std::fs;

    fn write_csv(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("UserExtension.csv");
        fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_rows_submitted_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(
            dir.path(),
            "title,userRoleId,code,entityType\n\
             Head Master,7,head_master,school\n\
             BEO,8,beo, block \n",
        );
        let service = FakeService::new()
            .with_entity_type("school", "et-school")
            .with_entity_type("block", "et-block");

        let created = load_user_roles(&service, &AccessToken::new("t"), &csv).await.unwrap();

        assert_eq!(created, 2);
        let roles = service.created_roles();
        assert_eq!(roles[0].title, "Head Master");
        assert_eq!(roles[0].status, "ACTIVE");
        assert_eq!(roles[0].entity_types[0].entity_type_id, "et-school");
        // Lookup uses the trimmed name, the payload keeps the cell as written
        assert!(service.calls().contains(&Call::FindEntityType("block".to_string())));
        assert_eq!(roles[1].entity_types[0].entity_type, " block ");
    }

    #[tokio::test]
    async fn test_failed_lookup_stops_remaining_rows() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(
            dir.path(),
            "title,userRoleId,code,entityType\n\
             A,1,a,school\n\
             B,2,b,school\n\
             C,3,c,school\n\
             D,4,d,district\n\
             E,5,e,school\n",
        );
        let service = FakeService::new().with_entity_type("school", "et-school");

        let err = load_user_roles(&service, &AccessToken::new("t"), &csv)
            .await
            .unwrap_err();

        let titles: Vec<String> = service.created_roles().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        let lookups = service
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::FindEntityType(_)))
            .count();
        assert_eq!(lookups, 4);

        let message = format!("{:#}", err);
        assert!(message.contains("row 5"));
        assert!(message.contains("stopped after 3 user role(s) created"));
        assert!(message.contains("No valid entity type found for: district"));
    }

    #[tokio::test]
    async fn test_rejected_create_stops_loop() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(
            dir.path(),
            "title,userRoleId,code,entityType\nA,1,a,school\nB,2,b,school\nC,3,c,school\n",
        );
        let mut service = FakeService::new().with_entity_type("school", "et-school");
        service.failing_titles = vec!["B".to_string()];

        assert!(load_user_roles(&service, &AccessToken::new("t"), &csv).await.is_err());

        let titles: Vec<String> = service.created_roles().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_row_missing_column_stops_loop() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(dir.path(), "title,userRoleId,entityType\nA,1,school\n");
        let service = FakeService::new().with_entity_type("school", "et-school");

        let err = load_user_roles(&service, &AccessToken::new("t"), &csv)
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("row 2"));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_status_column_used_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(
            dir.path(),
            "title,userRoleId,code,entityType,status\nA,1,a,school,INACTIVE\nB,2,b,school,\n",
        );
        let service = FakeService::new().with_entity_type("school", "et-school");

        load_user_roles(&service, &AccessToken::new("t"), &csv).await.unwrap();

        let statuses: Vec<String> = service.created_roles().into_iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec!["INACTIVE", "ACTIVE"]);
    }

    #[tokio::test]
    async fn test_first_of_several_matches_is_used() {
        let service = FakeService::new()
            .with_entity_type("school", "first")
            .with_entity_type("school", "second");

        let id = resolve_entity_type(&service, "school").await.unwrap();
        assert_eq!(id, "first");
    }

    #[test]
    fn test_payload_defaults_status() {
        let row = UserRoleRow {
            title: "BEO".to_string(),
            user_role_id: "8".to_string(),
            code: "beo".to_string(),
            entity_type: "block".to_string(),
            status: Some("  ".to_string()),
        };
        let payload = row.into_payload("et-block".to_string());
        assert_eq!(payload.status, "ACTIVE");
        assert_eq!(
            payload.entity_types,
            vec![EntityTypeRef {
                entity_type: "block".to_string(),
                entity_type_id: "et-block".to_string(),
            }]
        );
    }
}
