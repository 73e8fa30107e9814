//! Load pipeline
//!
//! An ordered list of stages, each reading what earlier stages left in the
//! [`PipelineContext`]. Stages report a [`StageOutcome`] instead of exiting;
//! [`run_pipeline`] stops at the first fatal outcome and nothing already sent
//! to the service is rolled back.

pub mod mapping;
pub mod stages;
pub mod user_roles;

use anyhow::{Context, Result};
use colored::*;
use log::error;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::api::{AccessToken, EntityKind, EntityService};
use crate::config::RunConfig;

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidateTemplate,
    ConvertSheets,
    Authenticate,
    CreateEntityTypes,
    CreateEntities,
    GenerateMapping,
    UploadMapping,
    LoadUserRoles,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::ValidateTemplate,
        Stage::ConvertSheets,
        Stage::Authenticate,
        Stage::CreateEntityTypes,
        Stage::CreateEntities,
        Stage::GenerateMapping,
        Stage::UploadMapping,
        Stage::LoadUserRoles,
    ];

    /// Progress line printed when the stage starts
    pub fn description(&self) -> &'static str {
        match self {
            Stage::ValidateTemplate => "Checking workbook template",
            Stage::ConvertSheets => "Converting sheets to CSV",
            Stage::Authenticate => "Generating access token",
            Stage::CreateEntityTypes => "Creating entity types",
            Stage::CreateEntities => "Uploading entities",
            Stage::GenerateMapping => "Generating mapping CSV",
            Stage::UploadMapping => "Mapping entities",
            Stage::LoadUserRoles => "Creating user roles",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::ValidateTemplate => "template validation",
            Stage::ConvertSheets => "sheet conversion",
            Stage::Authenticate => "authentication",
            Stage::CreateEntityTypes => "entity type bulk create",
            Stage::CreateEntities => "entity bulk create",
            Stage::GenerateMapping => "mapping generation",
            Stage::UploadMapping => "entity mapping",
            Stage::LoadUserRoles => "user role creation",
        };
        f.write_str(name)
    }
}

/// What a stage reports back to the driver
#[derive(Debug)]
pub enum StageOutcome {
    Success,
    /// The stage finished but left some items out; each entry says which and why
    Skipped(Vec<String>),
    /// The run cannot continue
    Fatal(anyhow::Error),
}

/// State handed from stage to stage
#[derive(Debug, Default)]
pub struct PipelineContext {
    pub token: Option<AccessToken>,
    /// CSV written for each converted sheet
    pub sheet_csvs: BTreeMap<String, PathBuf>,
    pub uploaded_kinds: Vec<EntityKind>,
    pub mapping_csv: Option<PathBuf>,
    pub mapping_pairs: usize,
    pub user_roles_created: usize,
}

impl PipelineContext {
    pub fn token(&self) -> Result<&AccessToken> {
        self.token
            .as_ref()
            .context("No access token; authentication has not run")
    }

    pub fn sheet_csv(&self, sheet_name: &str) -> Option<&Path> {
        self.sheet_csvs.get(sheet_name).map(PathBuf::as_path)
    }

    /// CSV for a sheet later stages cannot do without
    pub fn require_sheet_csv(&self, sheet_name: &str) -> Result<&Path> {
        self.sheet_csv(sheet_name)
            .with_context(|| format!("{}.csv was not produced by sheet conversion", sheet_name))
    }
}

/// Summary of a run that got through every stage
#[derive(Debug)]
pub struct PipelineReport {
    pub context: PipelineContext,
    pub skipped: Vec<(Stage, Vec<String>)>,
}

/// Run one stage and fold its error, if any, into [`StageOutcome::Fatal`]
pub async fn run_stage(
    stage: Stage,
    config: &RunConfig,
    service: &dyn EntityService,
    ctx: &mut PipelineContext,
) -> StageOutcome {
    let result = match stage {
        Stage::ValidateTemplate => stages::validate_template(config),
        Stage::ConvertSheets => stages::convert_sheets(config, ctx),
        Stage::Authenticate => stages::authenticate(service, ctx).await,
        Stage::CreateEntityTypes => stages::create_entity_types(service, ctx).await,
        Stage::CreateEntities => stages::create_entities(service, ctx).await,
        Stage::GenerateMapping => stages::generate_mapping(config, service, ctx).await,
        Stage::UploadMapping => stages::upload_mapping(service, ctx).await,
        Stage::LoadUserRoles => stages::load_user_roles(service, ctx).await,
    };

    result.unwrap_or_else(StageOutcome::Fatal)
}

/// Run every stage in order. The first fatal outcome ends the run and is
/// returned as the error; skips are collected into the report.
pub async fn run_pipeline(config: &RunConfig, service: &dyn EntityService) -> Result<PipelineReport> {
    let mut ctx = PipelineContext::default();
    let mut skipped = Vec::new();

    for stage in Stage::ALL {
        println!("{} {}", "--->".cyan().bold(), stage.description());

        match run_stage(stage, config, service, &mut ctx).await {
            StageOutcome::Success => {}
            StageOutcome::Skipped(reasons) => {
                for reason in &reasons {
                    println!("    {} {}", "skipped:".yellow(), reason);
                }
                skipped.push((stage, reasons));
            }
            StageOutcome::Fatal(e) => {
                error!("Stage '{}' failed: {:#}", stage, e);
                return Err(e.context(format!("{} failed", stage)));
            }
        }
    }

    Ok(PipelineReport {
        context: ctx,
        skipped,
    })
}
