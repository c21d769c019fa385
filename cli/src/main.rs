//! Invitely CLI - operator tooling for the Invitely guard core
//!
//! Exercises the fingerprint, anti-fraud, plan-access and link-quota logic
//! from the command line without the web stack.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use invitely_cli::{
    commands::{self, simulate_quota::SimulateQuotaRequest, LinkKindArg, OutputFormat},
    InvitelyCliConfig,
};
use invitely_core::FingerprintInputs;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "invitely",
    version,
    about = "Guest identity, anti-fraud and link-quota tooling for Invitely",
    author = "Invitely Team"
)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, global = true)]
    output: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Derive a device fingerprint from browser signals
    Fingerprint {
        #[arg(long)]
        user_agent: String,

        /// Screen resolution, e.g. 1920x1080
        #[arg(long)]
        screen_resolution: String,

        /// Timezone offset in minutes as reported by the browser
        #[arg(long, allow_hyphen_values = true)]
        timezone_offset: String,

        /// Comma separated language list
        #[arg(long)]
        languages: String,

        #[arg(long)]
        canvas_hash: Option<String>,

        #[arg(long)]
        webgl_hash: Option<String>,

        #[arg(long)]
        fonts: Option<String>,

        #[arg(long)]
        platform: Option<String>,
    },

    /// Validate a client-supplied fingerprint
    Validate {
        fingerprint: String,
    },

    /// Run the suspicious-activity heuristic for one request
    Assess {
        #[arg(long)]
        ip: String,

        #[arg(long)]
        user_agent: String,

        /// Registrations already seen from this IP inside the window
        #[arg(long)]
        recent_count: u32,

        /// Window length in minutes (defaults to the configured window)
        #[arg(long)]
        window_minutes: Option<u32>,
    },

    /// Check whether a plan unlocks content gated at another plan
    CanAccess {
        #[arg(long)]
        user_plan: String,

        #[arg(long)]
        target_plan: String,
    },

    /// Race concurrent guests against a link allowance
    SimulateQuota {
        /// Regular links granted
        #[arg(long)]
        regular: u32,

        /// Test links granted
        #[arg(long, default_value = "0")]
        test: u32,

        /// Guests attempting to consume a link
        #[arg(long)]
        guests: u32,

        /// Concurrent workers (defaults to INVITELY_SIMULATION_WORKERS)
        #[arg(long)]
        workers: Option<usize>,

        /// Which allowance the guests consume
        #[arg(long, value_enum, default_value = "regular")]
        kind: LinkKindArg,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = InvitelyCliConfig::new();

    let default_output_format = parse_output_format(&config.default_output_format)?;
    let output_format = cli.output.unwrap_or(default_output_format);

    let result = execute_command(&cli, &config, output_format).await;

    match result {
        Ok(output) => match output_format {
            OutputFormat::Human => println!("{output}"),
            OutputFormat::Json => {
                let data = serde_json::from_str::<serde_json::Value>(&output)
                    .unwrap_or(serde_json::Value::String(output));
                let json_output = serde_json::json!({
                    "success": true,
                    "data": data
                });
                println!("{}", serde_json::to_string_pretty(&json_output)?);
            }
        },
        Err(e) => {
            match output_format {
                OutputFormat::Human => eprintln!("Error: {e}"),
                OutputFormat::Json => {
                    let json_output = serde_json::json!({
                        "success": false,
                        "error": e.to_string()
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Parse output format from string
fn parse_output_format(format_str: &str) -> Result<OutputFormat> {
    match format_str.to_lowercase().as_str() {
        "human" => Ok(OutputFormat::Human),
        "json" => Ok(OutputFormat::Json),
        _ => Err(anyhow::anyhow!("Invalid output format: {}", format_str)),
    }
}

async fn execute_command(
    cli: &Cli,
    config: &InvitelyCliConfig,
    output_format: OutputFormat,
) -> Result<String> {
    match &cli.command {
        Commands::Fingerprint {
            user_agent,
            screen_resolution,
            timezone_offset,
            languages,
            canvas_hash,
            webgl_hash,
            fonts,
            platform,
        } => {
            let inputs = FingerprintInputs {
                user_agent: user_agent.clone(),
                screen_resolution: screen_resolution.clone(),
                timezone_offset: timezone_offset.clone(),
                languages: languages.clone(),
                canvas_hash: canvas_hash.clone(),
                webgl_hash: webgl_hash.clone(),
                fonts: fonts.clone(),
                platform: platform.clone(),
            };
            commands::execute_fingerprint(&inputs, output_format)
        }

        Commands::Validate { fingerprint } => {
            commands::execute_validate(fingerprint, output_format)
        }

        Commands::Assess {
            ip,
            user_agent,
            recent_count,
            window_minutes,
        } => commands::execute_assess(
            &config.activity_policy,
            ip,
            user_agent,
            *recent_count,
            *window_minutes,
            output_format,
        ),

        Commands::CanAccess {
            user_plan,
            target_plan,
        } => commands::execute_can_access(user_plan, target_plan, output_format),

        Commands::SimulateQuota {
            regular,
            test,
            guests,
            workers,
            kind,
        } => {
            let request = SimulateQuotaRequest {
                regular: *regular,
                test: *test,
                guests: *guests,
                workers: workers.unwrap_or(config.simulation_workers),
                kind: (*kind).into(),
            };
            commands::execute_simulate_quota(&request, output_format).await
        }
    }
}
