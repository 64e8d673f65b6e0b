use anyhow::{Context, Result};
use clap::Parser;
use decaf_rename::cli::Cli;
use decaf_rename::{
    init_telemetry, ConversionOutcome, DecafConfig, FileJob, Git2Operations, MigrationPipeline,
    MigrationReport, PipelineOptions, ProcessConverter, StandardFileSystem, Step,
};
use decaf_rename::migration::StepDetail;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = DecafConfig::load()?;
    cli.apply_to(&mut config);
    init_telemetry(config.logging.format)?;

    tokio::runtime::Runtime::new()?.block_on(async { migrate_command(&cli, &config).await })
}

async fn migrate_command(cli: &Cli, config: &DecafConfig) -> Result<ExitCode> {
    let job = FileJob::new(&cli.file, config.pipeline.allow_unchanged)?;

    // Refuse to touch the file at all outside a repository
    let vcs = Git2Operations::discover(".").context("decaf-rename must run inside a git working tree")?;

    let converter = ProcessConverter::new(
        config.converter.program.clone(),
        config.converter.args.clone(),
        config.converter.wait,
    );
    let pipeline = MigrationPipeline::new(
        Arc::new(StandardFileSystem),
        Arc::new(vcs),
        Arc::new(converter),
        PipelineOptions {
            failure_policy: config.pipeline.failure_policy,
        },
    );

    let report = pipeline.run(&job).await;
    print_summary(&job, config, &report);

    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_summary(job: &FileJob, config: &DecafConfig, report: &MigrationReport) {
    if report.succeeded() {
        println!("✅ {}", job.commit_message());
        if let Some(hash) = report.commit_hash() {
            println!("  🔖 Commit: {}", &hash[..hash.len().min(12)]);
        }
        match report.record_for(Step::Convert).map(|r| &r.result) {
            Some(Ok(StepDetail::Converted(ConversionOutcome::Detached { pid }))) => {
                let pid = pid.map_or_else(|| "unknown".to_string(), |p| p.to_string());
                println!("  🚀 {} launched in the background (pid {pid})", config.converter.program);
            }
            _ => println!("  ☕ {} finished on {}", config.converter.program, job.source_path.display()),
        }
        return;
    }

    println!(
        "❌ Migration of {} ended in state {:?} with failed steps:",
        job.source_path.display(),
        report.state()
    );
    for (step, error) in report.failures() {
        println!("  • {step}: {error}");
    }
    println!("  ⚠️  Check the working tree and {} before retrying", job.backup_path.display());
}
