use anyhow::Result;
use cfngen::aws::client::CfnClient;
use cfngen::aws::error::format_aws_error;
use cfngen::config::Config;
use cfngen::interact::{Reporter, TerminalPrompter, TerminalReporter};
use cfngen::model::TemplateFormat;
use cfngen::workflow::resources::DEFAULT_RESOURCES_FILE;
use cfngen::workflow::template::{DEFAULT_INPUT_FILE, DEFAULT_TEMPLATE_FILE};
use cfngen::workflow::{
    list_all_scans, run_resources, run_template, ResourcesOptions, Session, TemplateOptions,
};
use cfngen::WorkflowError;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Generate CloudFormation templates from existing AWS resources
#[derive(Parser, Debug)]
#[command(name = "cfngen", version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// AWS region (defaults to AWS_REGION, then AWS_DEFAULT_REGION)
    #[arg(long, global = true)]
    region: Option<String>,

    /// Seconds between two status polls
    #[arg(long, global = true, value_name = "SECS")]
    poll_interval: Option<u64>,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan resources and save the ones not managed by a stack
    Resources {
        /// Start a new resource scan
        #[arg(long)]
        new_scan: bool,

        /// Pick an existing resource scan
        #[arg(long)]
        from_scan: bool,

        /// Where to save the resource list
        #[arg(short, long, default_value = DEFAULT_RESOURCES_FILE)]
        output: PathBuf,
    },

    /// Generate a template from a resource list or an existing stack
    Template {
        /// Resource list produced by `cfngen resources`
        #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
        input: PathBuf,

        /// Where to save the template
        #[arg(short, long, default_value = DEFAULT_TEMPLATE_FILE)]
        output: PathBuf,

        /// Generate from the resources of an existing stack instead of the input file
        #[arg(long, value_name = "NAME")]
        from_stack: Option<String>,

        /// Template body format
        #[arg(long, value_enum, default_value = "json")]
        format: TemplateFormat,
    },

    /// List existing resource scans
    Scans,
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

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
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

    tracing::info!("cfngen started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("cfngen").join("cfngen.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".cfngen").join("cfngen.log");
    }
    PathBuf::from("cfngen.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level).unwrap_or_else(|e| {
        eprintln!("Logging disabled: {e}");
        None
    });

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("Error: {}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load();
    let region = config.effective_region(args.region.as_deref());
    let poll_interval = config.effective_poll_interval(args.poll_interval);

    if args.region.is_some() {
        if let Err(e) = config.set_region(&region) {
            tracing::warn!("Failed to save config: {}", e);
        }
    }

    tracing::info!("Using region {}, poll interval {:?}", region, poll_interval);

    let client = CfnClient::new(&region).await;
    let reporter = TerminalReporter::new();
    let session = Session {
        api: &client,
        prompter: &TerminalPrompter,
        reporter: &reporter,
        poll_interval,
    };

    match args.command {
        Command::Resources {
            new_scan,
            from_scan,
            output,
        } => {
            let options = ResourcesOptions {
                new_scan,
                from_scan,
                output,
            };
            run_resources(&session, &options).await?;
        }
        Command::Template {
            input,
            output,
            from_stack,
            format,
        } => {
            let options = TemplateOptions {
                input,
                output,
                from_stack,
                format,
            };
            run_template(&session, &options).await?;
        }
        Command::Scans => {
            let scans = list_all_scans(&session).await?;
            if scans.is_empty() {
                reporter.info(&format!("No resource scans in {}", client.region()));
            }
            for scan in &scans {
                let line = match scan.percentage_completed {
                    Some(p) if scan.status != cfngen::model::ScanStatus::Complete => {
                        format!("{}  ({:.0}%)", scan.summary_line(), p)
                    }
                    _ => scan.summary_line(),
                };
                println!("{}", line);
            }
        }
    }

    Ok(())
}

/// Errors cfngen classified itself are already phrased for the operator; remote errors go
/// through the AWS formatter.
fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<WorkflowError>() {
        Some(workflow_error) => workflow_error.to_string(),
        None => format_aws_error(err),
    }
}
