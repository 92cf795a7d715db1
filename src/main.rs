use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use cloudtrail_audit_tools::commands;
use cloudtrail_audit_tools::config::{
    LocalSettings, OutputSettings, PipelineConfig, S3Settings, DEFAULT_SHARD_DEPTH,
    DEFAULT_THREADS,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cloudtrail-audit")]
#[command(about = "Reconstruct a principal's AWS activity from CloudTrail logs", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a CloudTrail archive in S3
    Analyze {
        /// Bucket CloudTrail delivers to
        #[arg(long)]
        bucket: String,

        /// Key prefix to analyze (e.g., "AWSLogs/111122223333/CloudTrail/")
        #[arg(long)]
        prefix: String,

        /// Named AWS profile
        #[arg(long)]
        profile: Option<String>,

        /// AWS region (defaults to the profile or environment)
        #[arg(long)]
        region: Option<String>,

        /// Custom S3 endpoint (LocalStack, MinIO, ...)
        #[arg(long)]
        endpoint_url: Option<String>,

        /// Principal ARN to analyze (defaults to the caller identity)
        #[arg(long)]
        identity: Option<String>,

        /// Concurrent workers for listing and processing
        #[arg(long, default_value_t = DEFAULT_THREADS, value_parser = parse_threads)]
        threads: usize,

        /// Prefix levels explored when splitting the archive into shards
        #[arg(long, default_value_t = DEFAULT_SHARD_DEPTH)]
        shard_depth: usize,

        /// Write the report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: text, csv, or json (default: from file extension)
        #[arg(long)]
        format: Option<String>,
    },

    /// Analyze a local directory mirror of a CloudTrail archive
    AnalyzeLocal {
        /// Root directory of the mirror
        dir: PathBuf,

        /// Key prefix relative to the root
        #[arg(long, default_value = "")]
        prefix: String,

        /// Principal ARN to analyze
        #[arg(long)]
        identity: String,

        /// Concurrent workers for listing and processing
        #[arg(long, default_value_t = DEFAULT_THREADS, value_parser = parse_threads)]
        threads: usize,

        /// Prefix levels explored when splitting the archive into shards
        #[arg(long, default_value_t = DEFAULT_SHARD_DEPTH)]
        shard_depth: usize,

        /// Write the report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: text, csv, or json (default: from file extension)
        #[arg(long)]
        format: Option<String>,
    },

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn parse_threads(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "cloudtrail_audit_tools=debug"
    } else {
        "cloudtrail_audit_tools=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            bucket,
            prefix,
            profile,
            region,
            endpoint_url,
            identity,
            threads,
            shard_depth,
            output,
            format,
        } => {
            let settings = S3Settings {
                bucket,
                prefix,
                profile,
                region,
                endpoint_url,
                identity,
                pipeline: PipelineConfig::default()
                    .with_threads(threads)
                    .with_shard_depth(shard_depth),
                output: OutputSettings {
                    path: output,
                    format,
                },
            };
            commands::analyze::run(&settings).await
        }
        Commands::AnalyzeLocal {
            dir,
            prefix,
            identity,
            threads,
            shard_depth,
            output,
            format,
        } => {
            let settings = LocalSettings {
                root: dir,
                prefix,
                identity,
                pipeline: PipelineConfig::default()
                    .with_threads(threads)
                    .with_shard_depth(shard_depth),
                output: OutputSettings {
                    path: output,
                    format,
                },
            };
            commands::analyze_local::run(&settings).await
        }
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "cloudtrail-audit", &mut std::io::stdout());
            Ok(())
        }
    }
}
