use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use coolify_client::config::Settings;
use coolify_client::{format_api_error, ApiError, CoolifyClient};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command-line client for the Coolify API
#[derive(Parser, Debug)]
#[command(name = "coolify", version, about, long_about = None)]
struct Args {
    /// Coolify base URL (overrides API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// API token (overrides API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// API version to try first (overrides API_VERSION)
    #[arg(long, global = true)]
    api_version: Option<String>,

    /// Log failed responses with sanitized bodies (implies --log-level debug)
    #[arg(long, global = true)]
    debug: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(ClapArgs, Debug, Clone, Copy)]
struct PageArgs {
    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Items per page
    #[arg(long, default_value_t = 5)]
    per_page: u32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Applications
    #[command(subcommand)]
    Apps(AppCommand),
    /// Deployments
    #[command(subcommand)]
    Deployments(DeploymentCommand),
    /// Environments
    #[command(subcommand)]
    Environments(EnvironmentCommand),
    /// Databases
    #[command(subcommand)]
    Databases(DatabaseCommand),
    /// First page of every resource list, fetched concurrently
    Overview {
        #[arg(long, default_value_t = 5)]
        per_page: u32,
    },
}

#[derive(Subcommand, Debug)]
enum AppCommand {
    List(PageArgs),
    Get { uuid: String },
    /// Deploy the application
    Start {
        uuid: String,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        instant: bool,
    },
    Stop { uuid: String },
    Restart { uuid: String },
    Delete { uuid: String },
    Logs {
        uuid: String,
        /// Number of lines; all when omitted
        #[arg(long, allow_negative_numbers = true)]
        lines: Option<i64>,
    },
    Envs { uuid: String },
    Deployments {
        uuid: String,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Subcommand, Debug)]
enum DeploymentCommand {
    List(PageArgs),
    Get { uuid: String },
}

#[derive(Subcommand, Debug)]
enum EnvironmentCommand {
    List(PageArgs),
}

#[derive(Subcommand, Debug)]
enum DatabaseCommand {
    List(PageArgs),
    Get { uuid: String },
    Start { uuid: String },
    Stop { uuid: String },
    Restart { uuid: String },
    Delete { uuid: String },
}

/// `--debug` raises anything quieter than debug so sanitized failure bodies
/// reach the log file
fn effective_log_level(level: LogLevel, debug: bool) -> LogLevel {
    match level {
        LogLevel::Off | LogLevel::Error | LogLevel::Warn | LogLevel::Info if debug => {
            LogLevel::Debug
        }
        level => level,
    }
}

fn setup_logging(
    level: LogLevel,
    debug: bool,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let level = effective_log_level(level, debug);
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("coolify started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("coolify-client").join("coolify.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".coolify-client").join("coolify.log");
    }
    PathBuf::from("coolify.log")
}

fn resolve_settings(args: &Args) -> Settings {
    let mut settings = Settings::load();
    if let Some(url) = &args.api_url {
        settings.api_url = Some(url.clone());
    }
    if let Some(token) = &args.token {
        settings.api_token = Some(token.clone());
    }
    if let Some(version) = &args.api_version {
        settings.api_version = Some(version.clone());
    }
    if args.debug {
        settings.debug = true;
    }
    settings
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // A missing .env is normal
    let _ = dotenv::dotenv();

    let args = Args::parse();
    let settings = resolve_settings(&args);

    let _log_guard = setup_logging(args.log_level, settings.debug)?;

    let client = settings.build_client()?;
    tracing::info!(
        "Using Coolify at {} (API {})",
        client.base_url(),
        client.api_version()
    );

    match run(&client, args.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            match err.downcast_ref::<ApiError>() {
                Some(api_err) => {
                    tracing::error!("Command failed (status {:?}): {}", api_err.status(), api_err);
                    eprintln!("Error: {}", format_api_error(api_err));
                }
                None => {
                    tracing::error!("Command failed: {:#}", err);
                    eprintln!("Error: {:#}", err);
                }
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{}", rendered);
    Ok(())
}

async fn run(client: &CoolifyClient, command: Command) -> Result<()> {
    match command {
        Command::Apps(cmd) => run_apps(client, cmd).await,
        Command::Deployments(DeploymentCommand::List(p)) => {
            print_json(&client.list_deployments(p.page, p.per_page).await?)
        }
        Command::Deployments(DeploymentCommand::Get { uuid }) => {
            print_json(client.get_deployment(&uuid).await?.as_ref())
        }
        Command::Environments(EnvironmentCommand::List(p)) => {
            print_json(&client.list_environments(p.page, p.per_page).await?)
        }
        Command::Databases(cmd) => run_databases(client, cmd).await,
        Command::Overview { per_page } => {
            let (apps, deployments, environments, databases) = futures::try_join!(
                client.list_applications(1, per_page),
                client.list_deployments(1, per_page),
                client.list_environments(1, per_page),
                client.list_databases(1, per_page),
            )?;
            print_json(&serde_json::json!({
                "applications": apps,
                "deployments": deployments,
                "environments": environments,
                "databases": databases,
            }))
        }
    }
}

async fn run_apps(client: &CoolifyClient, cmd: AppCommand) -> Result<()> {
    match cmd {
        AppCommand::List(p) => print_json(&client.list_applications(p.page, p.per_page).await?),
        AppCommand::Get { uuid } => print_json(client.get_application(&uuid).await?.as_ref()),
        AppCommand::Start {
            uuid,
            force,
            instant,
        } => print_json(&client.start_application(&uuid, force, instant).await?),
        AppCommand::Stop { uuid } => print_json(&client.stop_application(&uuid).await?),
        AppCommand::Restart { uuid } => print_json(&client.restart_application(&uuid).await?),
        AppCommand::Delete { uuid } => {
            client.delete_application(&uuid).await?;
            print_json(&serde_json::json!({ "deleted": uuid }))
        }
        AppCommand::Logs { uuid, lines } => {
            println!("{}", client.get_application_logs(&uuid, lines).await?);
            Ok(())
        }
        AppCommand::Envs { uuid } => print_json(&client.get_application_envs(&uuid).await?),
        AppCommand::Deployments { uuid, page } => print_json(
            &client
                .list_application_deployments(&uuid, page.page, page.per_page)
                .await?,
        ),
    }
}

async fn run_databases(client: &CoolifyClient, cmd: DatabaseCommand) -> Result<()> {
    match cmd {
        DatabaseCommand::List(p) => print_json(&client.list_databases(p.page, p.per_page).await?),
        DatabaseCommand::Get { uuid } => print_json(client.get_database(&uuid).await?.as_ref()),
        DatabaseCommand::Start { uuid } => print_json(&client.start_database(&uuid).await?),
        DatabaseCommand::Stop { uuid } => print_json(&client.stop_database(&uuid).await?),
        DatabaseCommand::Restart { uuid } => print_json(&client.restart_database(&uuid).await?),
        DatabaseCommand::Delete { uuid } => {
            client.delete_database(&uuid).await?;
            print_json(&serde_json::json!({ "deleted": uuid }))
        }
    }
}
