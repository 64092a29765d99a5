// # zonesync - Zone Synchronizer
//
// Thin integration layer over zonesync-core. All reconciliation logic lives
// in the core crate; this binary only:
//
// 1. Parses flags (or loads a JSON config file)
// 2. Initializes logging and the runtime
// 3. Registers the directory and zone store plugins
// 4. Runs one reconciliation and maps the outcome to an exit code
//
// ## Configuration
//
// Every flag can also be set through the environment:
//
// - `ZONESYNC_ZONE_ID`, `ZONESYNC_ZONE_NAME`: Hosted zone to reconcile
// - `ZONESYNC_TAG`: Tag holding the hostname (default `Name`)
// - `ZONESYNC_FQDN`: Tag values are FQDNs; only the first label is used
// - `ZONESYNC_VPC_IDS`: Comma-separated VPCs to include
// - `ZONESYNC_INCLUDE_EC2`: Include instances outside any VPC
// - `ZONESYNC_REGION`: AWS region override
// - `ZONESYNC_BATCH_SIZE`, `ZONESYNC_TTL`, `ZONESYNC_DRY_RUN`
// - `ZONESYNC_LOG_LEVEL`: trace, debug, info, warn, error
// - `ZONESYNC_CONFIG`: JSON `SyncConfig` file (zone and sync flags are then ignored)
//
// ## Example
//
// ```bash
// zonesync --vpc-id vpc-0abc --fqdn --dry-run Z0123456789 example.com
// ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;
use zonesync_core::config::{DirectoryConfig, EngineConfig, SyncConfig, ZoneConfig, ZoneStoreConfig};
use zonesync_core::model::ChangeAction;
use zonesync_core::registry::Registry;
use zonesync_core::traits::HostFilter;
use zonesync_core::{Error, Reconciler};

/// Exit codes for different termination scenarios
///
/// - 0: Run completed (converged, applied or dry-run)
/// - 1: Configuration or startup error
/// - 2: Runtime error (collaborator failure or inconsistent snapshots)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZonesyncExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<ZonesyncExitCode> for ExitCode {
    fn from(code: ZonesyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Publish tagged EC2 instances as A records in a Route53 hosted zone
#[derive(Debug, Parser)]
#[command(name = "zonesync", version, about)]
struct Cli {
    /// Hosted zone id (with or without the /hostedzone/ prefix)
    #[arg(env = "ZONESYNC_ZONE_ID", required_unless_present = "config")]
    zone_id: Option<String>,

    /// Zone name, e.g. example.com
    #[arg(env = "ZONESYNC_ZONE_NAME", required_unless_present = "config")]
    zone_name: Option<String>,

    /// Instance tag holding the hostname
    #[arg(long, env = "ZONESYNC_TAG", default_value = "Name")]
    tag: String,

    /// Tag values are FQDNs; only the first label is used
    #[arg(long, env = "ZONESYNC_FQDN")]
    fqdn: bool,

    /// Include instances that are not in any VPC
    #[arg(long, env = "ZONESYNC_INCLUDE_EC2")]
    include_ec2: bool,

    /// VPC whose instances are published (repeatable)
    #[arg(long = "vpc-id", env = "ZONESYNC_VPC_IDS", value_delimiter = ',')]
    vpc_ids: Vec<String>,

    /// AWS region override
    #[arg(long, env = "ZONESYNC_REGION")]
    region: Option<String>,

    /// Maximum changes per ChangeResourceRecordSets call
    #[arg(long, env = "ZONESYNC_BATCH_SIZE", default_value_t = 100)]
    batch_size: usize,

    /// TTL of created records, in seconds
    #[arg(long, env = "ZONESYNC_TTL", default_value_t = zonesync_core::model::DEFAULT_TTL)]
    ttl: u32,

    /// Log the planned changes without submitting them
    #[arg(long, env = "ZONESYNC_DRY_RUN")]
    dry_run: bool,

    /// Log level
    #[arg(
        long,
        env = "ZONESYNC_LOG_LEVEL",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    log_level: String,

    /// JSON configuration file
    #[arg(long, env = "ZONESYNC_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Build the sync configuration from the file or the flags
    fn sync_config(&self) -> Result<SyncConfig> {
        let config = match &self.config {
            Some(path) => SyncConfig::from_json_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => SyncConfig {
                zone: ZoneConfig::new(
                    self.zone_id.clone().unwrap_or_default(),
                    self.zone_name.clone().unwrap_or_default(),
                ),
                filter: HostFilter::new(self.tag.clone())
                    .with_fqdn_names(self.fqdn)
                    .with_vpc_ids(self.vpc_ids.iter().cloned())
                    .with_classic(self.include_ec2),
                directory: DirectoryConfig::Ec2 {
                    region: self.region.clone(),
                },
                zone_store: ZoneStoreConfig::Route53 {
                    region: self.region.clone(),
                },
                engine: EngineConfig {
                    batch_size: self.batch_size,
                    default_ttl: self.ttl,
                    dry_run: self.dry_run,
                },
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn log_level(&self) -> Level {
        match self.log_level.as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Registry with every plugin compiled into this binary
fn registry() -> Registry {
    let registry = Registry::with_builtins();

    #[cfg(feature = "ec2")]
    zonesync_directory_ec2::register(&registry);

    #[cfg(feature = "route53")]
    zonesync_provider_route53::register(&registry);

    registry
}

/// Exit code for an error raised while running
fn exit_code_for(err: &Error) -> ZonesyncExitCode {
    match err {
        Error::Config(_) => ZonesyncExitCode::ConfigError,
        _ => ZonesyncExitCode::RuntimeError,
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also land here
            let _ = e.print();
            return if e.use_stderr() {
                ZonesyncExitCode::ConfigError
            } else {
                ZonesyncExitCode::Success
            }
            .into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ZonesyncExitCode::ConfigError.into();
    }

    let config = match cli.sync_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return ZonesyncExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ZonesyncExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run(&config).await {
            Ok(()) => ZonesyncExitCode::Success,
            Err(e) => {
                error!("Reconciliation failed: {}", e);
                exit_code_for(&e)
            }
        }
    });

    result.into()
}

/// Run one reconciliation
async fn run(config: &SyncConfig) -> zonesync_core::Result<()> {
    let registry = registry();
    info!(
        "Directories: {:?}, zone stores: {:?}",
        registry.list_directories(),
        registry.list_zone_stores()
    );

    let directory = registry.create_directory(&config.directory).await?;
    let zone_store = registry.create_zone_store(&config.zone_store).await?;

    let reconciler = Reconciler::new(directory, zone_store, config)?;
    let report = reconciler.run().await?;

    let elapsed = report.finished_at - report.started_at;
    if report.is_converged() {
        info!(
            "{} host(s) already published in {}",
            report.live_hosts,
            config.zone.zone_name
        );
    } else {
        info!(
            "{}{} create, {} upsert, {} delete in {} ms",
            if report.dry_run { "[DRY-RUN] " } else { "" },
            report.count(ChangeAction::Create),
            report.count(ChangeAction::Upsert),
            report.count(ChangeAction::Delete),
            elapsed.num_milliseconds()
        );
    }
    Ok(())
}
