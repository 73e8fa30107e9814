//! One function per pipeline stage

use anyhow::{Context, Result};
use colored::*;
use log::{info, warn};

use super::{PipelineContext, StageOutcome, mapping, user_roles};
use crate::api::{EntityKind, EntityService};
use crate::config::RunConfig;
use crate::workbook::{self, ENTITY_CSV_SHEET, ENTITY_TYPE_SHEET, USER_EXTENSION_SHEET};

/// Refuse to go on unless the workbook's sheets match the template exactly
pub fn validate_template(config: &RunConfig) -> Result<StageOutcome> {
    let sheet_names = workbook::read_sheet_names(config.workbook())?;
    workbook::validate_sheet_names(&sheet_names)?;

    println!("    Entity Management Template detected.");
    Ok(StageOutcome::Success)
}

/// Write one CSV per sheet. Sheets that fail are skipped, not fatal.
pub fn convert_sheets(config: &RunConfig, ctx: &mut PipelineContext) -> Result<StageOutcome> {
    let report = workbook::convert_sheets(config.workbook(), &config.output_dir)?;

    for (sheet_name, path) in report.written {
        println!("    Saved {} to {}", sheet_name, path.display());
        ctx.sheet_csvs.insert(sheet_name, path);
    }

    if report.failed.is_empty() {
        return Ok(StageOutcome::Success);
    }

    Ok(StageOutcome::Skipped(
        report
            .failed
            .into_iter()
            .map(|f| format!("sheet '{}': {}", f.sheet_name, f.reason))
            .collect(),
    ))
}

pub async fn authenticate(service: &dyn EntityService, ctx: &mut PipelineContext) -> Result<StageOutcome> {
    let token = service
        .login()
        .await
        .context("Error in generating Access token")?;

    ctx.token = Some(token);
    println!("    {}", "Access Token Generated!".green());
    Ok(StageOutcome::Success)
}

pub async fn create_entity_types(service: &dyn EntityService, ctx: &mut PipelineContext) -> Result<StageOutcome> {
    let csv = ctx.require_sheet_csv(ENTITY_TYPE_SHEET)?;

    service
        .create_entity_types(ctx.token()?, csv)
        .await
        .context("Entity Type Bulk Create failed")?;

    println!("    {}", "Entity types created".green());
    Ok(StageOutcome::Success)
}

/// Upload each entity kind in hierarchy order.
///
/// A kind with no CSV on disk is skipped; a kind the service rejects ends
/// the run.
pub async fn create_entities(service: &dyn EntityService, ctx: &mut PipelineContext) -> Result<StageOutcome> {
    let token = ctx.token()?.clone();
    let mut skipped = Vec::new();

    for kind in EntityKind::ALL {
        let csv = match ctx.sheet_csv(kind.as_str()).filter(|p| p.is_file()) {
            Some(path) => path.to_path_buf(),
            None => {
                warn!("No CSV for {}, skipping upload", kind);
                skipped.push(format!("File {}.csv not found. Skipping {}.", kind, kind));
                continue;
            }
        };

        service
            .create_entities(&token, kind, &csv)
            .await
            .with_context(|| format!("Upload failed for {}", kind))?;

        println!("    {} {} data", "Successfully uploaded".green(), kind);
        ctx.uploaded_kinds.push(kind);
    }

    if skipped.is_empty() {
        Ok(StageOutcome::Success)
    } else {
        Ok(StageOutcome::Skipped(skipped))
    }
}

/// Post `entityCSV.csv` and write the returned id pairs to `mapping.csv`
pub async fn generate_mapping(
    config: &RunConfig,
    service: &dyn EntityService,
    ctx: &mut PipelineContext,
) -> Result<StageOutcome> {
    let csv = ctx.require_sheet_csv(ENTITY_CSV_SHEET)?;

    let ids = service
        .generate_mapping(ctx.token()?, csv)
        .await
        .context("Generating Mapping CSV failed")?;

    let pairs = mapping::pair_ids(ids)?;
    let path = config.mapping_csv_path();
    mapping::write_mapping_csv(&path, &config.mapping_header, &pairs)?;

    info!("Wrote {} mapping pairs", pairs.len());
    println!("    Mapping CSV successfully created at {}", path.display());
    ctx.mapping_pairs = pairs.len();
    ctx.mapping_csv = Some(path);
    Ok(StageOutcome::Success)
}

pub async fn upload_mapping(service: &dyn EntityService, ctx: &mut PipelineContext) -> Result<StageOutcome> {
    let csv = ctx
        .mapping_csv
        .as_deref()
        .context("mapping.csv was not generated")?;

    service
        .upload_mapping(ctx.token()?, csv)
        .await
        .context("Entity Mapping failed")?;

    println!("    {}", "Mapping Entities Success".green());
    Ok(StageOutcome::Success)
}

pub async fn load_user_roles(service: &dyn EntityService, ctx: &mut PipelineContext) -> Result<StageOutcome> {
    let csv = ctx.require_sheet_csv(USER_EXTENSION_SHEET)?.to_path_buf();
    let token = ctx.token()?.clone();

    let created = user_roles::load_user_roles(service, &token, &csv).await?;

    ctx.user_roles_created = created;
    Ok(StageOutcome::Success)
}
