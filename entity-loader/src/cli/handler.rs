//! Runs one load from parsed arguments

use anyhow::Result;
use colored::*;
use log::info;

use super::Cli;
use crate::api::EntityClient;
use crate::config::{self, RunConfig};
use crate::pipeline;

/// Resolve the environment, then run the pipeline against it.
///
/// The environment is checked before the workbook is opened or any client is
/// built, so a bad `--env` never reaches the network.
pub async fn handle_load_command(args: Cli) -> Result<()> {
    let environment = config::load_environment(&args.config, &args.env)?;
    println!(
        "=================== Environment set to {} =====================",
        args.env.bright_green().bold()
    );

    let run_config = RunConfig::new(
        args.env,
        environment,
        args.entity_file,
        args.output_dir,
        args.timeout,
    );
    info!("Run configuration: {:?}", run_config);

    let client = EntityClient::new(&run_config)?;
    let report = pipeline::run_pipeline(&run_config, &client).await?;

    let ctx = &report.context;
    println!();
    println!("{}", "Entity load complete".green().bold());
    println!("  Entity kinds uploaded: {}", ctx.uploaded_kinds.len());
    println!("  Mapping pairs:         {}", ctx.mapping_pairs);
    println!("  User roles created:    {}", ctx.user_roles_created);
    for (stage, reasons) in &report.skipped {
        println!("  {} {} ({} item(s) skipped)", "Partial:".yellow(), stage, reasons.len());
    }

    Ok(())
}
