use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cupcake::core::models::{DEFAULT_SCHEDULE, DEFAULT_STORAGE_CLASS};
use cupcake::core::{NewJob, NewProfile, format_ago};
use cupcake::resources::Outcome;
use cupcake::{Dashboard, cli, config, context, logging};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "cupcake")]
#[command(about = "Live client for the Cupcake S3 backup dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./cupcake.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigArgs,
}

#[derive(Args, Serialize)]
struct ConfigArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    server_url: Option<String>,

    /// Log at debug level
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard
    Tui {
        /// Page to open, e.g. "#/jobs"
        fragment: Option<String>,
    },
    /// List jobs
    Jobs,
    /// List profiles
    Profiles,
    /// Create or delete a profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Create or delete a job
    #[command(subcommand)]
    Job(JobCommand),
    /// List a job's archived logs, or print one of them
    Logs {
        job: String,
        #[arg(long)]
        index: Option<usize>,
    },
    /// Show one job's transfer counters and last run
    Stats { job: String },
    /// Follow a job's live log
    Tail { job: String },
    /// Show server health
    Health,
    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum ProfileCommand {
    Add {
        name: String,
        #[arg(long)]
        access_key_id: String,
        #[arg(long)]
        secret_access_key: String,
        #[arg(long, default_value = "")]
        region: String,
        #[arg(long, default_value = "")]
        role_arn: String,
    },
    Rm { name: String },
}

#[derive(Subcommand)]
enum JobCommand {
    Add {
        name: String,
        #[arg(long, default_value = DEFAULT_SCHEDULE)]
        schedule: String,
        #[arg(long)]
        source: String,
        #[arg(long)]
        destination: String,
        #[arg(long)]
        profile: String,
        #[arg(long, default_value = DEFAULT_STORAGE_CLASS)]
        storage_class: String,
    },
    Rm { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::AppConfig::new(cli.config.as_deref(), Some(&cli.overrides))?;

    let mut log_config = config.log_config();
    if matches!(cli.command, Commands::Tui { .. }) {
        log_config.file = Some(config.log_file.clone());
    }
    logging::init(log_config)?;

    let ctx = context::AppContext::new(config)?;

    match cli.command {
        Commands::Tui { fragment } => {
            let dashboard = Dashboard::from_context(&ctx);
            cli::tui::run(dashboard, fragment)
                .await
                .context("Failed to run dashboard")?
        }
        Commands::Jobs => run_jobs(&ctx).await.context("Failed to list jobs")?,
        Commands::Profiles => run_profiles(&ctx).await.context("Failed to list profiles")?,
        Commands::Profile(command) => run_profile(&ctx, command).await?,
        Commands::Job(command) => run_job(&ctx, command).await?,
        Commands::Logs { job, index } => run_logs(&ctx, &job, index)
            .await
            .context("Failed to fetch logs")?,
        Commands::Stats { job } => run_stats(&ctx, &job)
            .await
            .context("Failed to fetch job stats")?,
        Commands::Tail { job } => run_tail(&ctx, &job).await?,
        Commands::Health => run_health(&ctx).await.context("Failed to check health")?,
        Commands::Config => print!("{}", ctx.config.to_toml()?),
    }

    Ok(())
}

async fn run_jobs(ctx: &context::AppContext) -> Result<()> {
    let jobs = ctx.api.list_jobs().await?;
    if jobs.is_empty() {
        println!("No jobs");
    }
    for job in jobs {
        let last_run = job
            .last_run
            .map(format_ago)
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{:<20} {:<14} {:<16} up {:>6}  down {:>6}  del {:>6}  {}",
            job.name,
            job.schedule,
            last_run,
            job.uploaded,
            job.downloaded,
            job.deleted,
            job.destination.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

async fn run_profiles(ctx: &context::AppContext) -> Result<()> {
    let profiles = ctx.api.list_profiles().await?;
    if profiles.is_empty() {
        println!("No profiles");
    }
    for profile in profiles {
        println!("{:<20} {:<12} {}", profile.name, profile.region, profile.role_arn);
    }
    Ok(())
}

async fn run_profile(ctx: &context::AppContext, command: ProfileCommand) -> Result<()> {
    let dashboard = Dashboard::from_context(ctx);
    let outcome = match command {
        ProfileCommand::Add {
            name,
            access_key_id,
            secret_access_key,
            region,
            role_arn,
        } => {
            let profile = NewProfile {
                name,
                aws_access_key_id: access_key_id,
                aws_secret_access_key: secret_access_key,
                region,
                role_arn,
            };
            dashboard.resources().create_profile(&profile).await
        }
        ProfileCommand::Rm { name } => dashboard.delete_profile(&name).await,
    };
    dashboard.shutdown().await;
    report(outcome)
}

async fn run_job(ctx: &context::AppContext, command: JobCommand) -> Result<()> {
    let dashboard = Dashboard::from_context(ctx);
    let outcome = match command {
        JobCommand::Add {
            name,
            schedule,
            source,
            destination,
            profile,
            storage_class,
        } => {
            let job = NewJob {
                name,
                schedule,
                source,
                destination,
                profile,
                storage_class,
            };
            dashboard.resources().create_job(&job).await
        }
        JobCommand::Rm { name } => dashboard.delete_job(&name).await,
    };
    dashboard.shutdown().await;
    report(outcome)
}

fn report(outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Applied => {
            println!("Done");
            Ok(())
        }
        Outcome::Rejected => anyhow::bail!("The server did not confirm the change"),
        Outcome::Failed => anyhow::bail!("The request failed, see the log for details"),
    }
}

async fn run_logs(ctx: &context::AppContext, job: &str, index: Option<usize>) -> Result<()> {
    match index {
        Some(index) => print!("{}", ctx.api.fetch_historical_log(job, index).await?),
        None => {
            let listing = ctx.api.list_job_logs(job).await?;
            for (i, path) in listing.entries().iter().enumerate() {
                println!("{:>3}  {}", i + 1, path);
            }
        }
    }
    Ok(())
}

async fn run_stats(ctx: &context::AppContext, job: &str) -> Result<()> {
    let stats = ctx.api.job_stats(job).await?;
    let last_run = stats
        .last_run
        .map(format_ago)
        .unwrap_or_else(|| "never".to_string());
    println!("last run    {}", last_run);
    println!("uploaded    {}", stats.uploaded);
    println!("downloaded  {}", stats.downloaded);
    println!("deleted     {}", stats.deleted);
    Ok(())
}

async fn run_tail(ctx: &context::AppContext, job: &str) -> Result<()> {
    let dashboard = Dashboard::from_context(ctx);
    let mut updates = dashboard.state().subscribe_log_tail();
    dashboard.log_tail().open(job).await?;

    let mut printed = 0;
    let mut check = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let tail = updates.borrow_and_update().clone();
                if tail.buffer.len() > printed {
                    print!("{}", &tail.buffer[printed..]);
                    printed = tail.buffer.len();
                }
            }
            _ = check.tick() => {
                if !dashboard.log_tail().is_streaming().await {
                    break;
                }
            }
        }
    }

    let tail = dashboard.state().log_tail();
    if tail.buffer.len() > printed {
        print!("{}", &tail.buffer[printed..]);
    }

    dashboard.shutdown().await;
    Ok(())
}

async fn run_health(ctx: &context::AppContext) -> Result<()> {
    let health = ctx.api.health().await?;
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(())
}
