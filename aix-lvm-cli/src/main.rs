// SPDX-License-Identifier: GPL-3.0-only

//! aix-vg - declarative AIX volume group management
//!
//! Each invocation inspects the host, compares it with the declared volume
//! groups and runs at most one `mkvg`/`extendvg` per group. Results are
//! printed to stdout as JSON; errors go to stderr with a distinct exit status.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use aix_lvm_sys::error::EXIT_FAILURE;
use aix_lvm_sys::{CommandRunner, ConvergeError, Converger, Inspector, MembershipCheck, SystemRunner};
use aix_lvm_types::{ChangeResult, VolumeGroupAction, VolumeGroupSpec};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};

mod config;
mod logging;

use config::Config;

#[derive(Parser)]
#[command(name = "aix-vg")]
#[command(version, about = "Converge AIX LVM volume groups to a declared state", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Inspect the host but only log the mutating command
    #[arg(long, global = true)]
    dry_run: bool,

    /// How existing membership of a physical volume is decided
    #[arg(long, global = true, value_enum)]
    membership: Option<Membership>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Membership {
    /// Compare VGDA and ODM volume group identifiers
    Vgid,
    /// Compare the volume group column of lspv
    VgName,
}

impl From<Membership> for MembershipCheck {
    fn from(value: Membership) -> Self {
        match value {
            Membership::Vgid => MembershipCheck::Vgid,
            Membership::VgName => MembershipCheck::VgName,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a volume group unless it already exists
    Create {
        /// Volume group name
        name: String,
        /// Physical volumes, in the order given to mkvg
        #[arg(required = true)]
        physical_volumes: Vec<String>,
        /// Physical partition size (mkvg -s)
        #[arg(short = 's', long)]
        physical_partition_size: Option<String>,
        /// Overwrite existing signatures on the physical volumes (mkvg -f)
        #[arg(short = 'f', long)]
        wipe_signatures: bool,
    },
    /// Add declared physical volumes that are not yet members
    Extend {
        /// Volume group name
        name: String,
        /// Physical volumes that must belong to the group
        #[arg(required = true)]
        physical_volumes: Vec<String>,
    },
    /// Converge every volume group declared in a configuration file
    Apply {
        /// Configuration file (defaults to --config)
        file: Option<PathBuf>,
    },
    /// Print the physical volume table as JSON
    Pvs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("aix-vg: {error:#}");
            let code = error
                .downcast_ref::<ConvergeError>()
                .map(ConvergeError::exit_code)
                .unwrap_or(EXIT_FAILURE);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let has_config = config_path(&cli).is_some();
    let config = resolve_config(&cli)?;

    logging::init(&config.log);
    info!("aix-vg v{}", env!("CARGO_PKG_VERSION"));

    if !config.dry_run && !matches!(cli.command, Commands::Pvs) && unsafe { libc::geteuid() } != 0
    {
        warn!("Not running as root; mkvg and extendvg will likely be refused");
    }

    let inspector = Inspector::with_tools(SystemRunner, config.tools.clone());
    let converger = Converger::new(inspector).with_options(config.converge_options());

    match cli.command {
        Commands::Create {
            name,
            physical_volumes,
            physical_partition_size,
            wipe_signatures,
        } => {
            let mut spec =
                VolumeGroupSpec::new(name, physical_volumes).with_wipe_signatures(wipe_signatures);
            if let Some(size) = physical_partition_size {
                spec = spec.with_physical_partition_size(size);
            }
            print_json(&converger.converge(&spec)?)
        }
        Commands::Extend {
            name,
            physical_volumes,
        } => {
            let spec = VolumeGroupSpec::new(name, physical_volumes)
                .with_action(VolumeGroupAction::Extend);
            print_json(&converger.converge(&spec)?)
        }
        Commands::Apply { .. } => {
            if !has_config {
                bail!("apply needs a configuration file (aix-vg apply FILE or --config FILE)");
            }
            let declared = config.volume_groups;
            if declared.is_empty() {
                bail!("configuration declares no [[volume_group]] entries");
            }
            print_json(&apply(&converger, &declared)?)
        }
        Commands::Pvs => print_json(&converger.inspector().physical_volumes()?),
    }
}

/// `apply FILE` reads FILE; everything else reads `--config`
fn config_path(cli: &Cli) -> Option<&Path> {
    match &cli.command {
        Commands::Apply { file: Some(file) } => Some(file.as_path()),
        _ => cli.config.as_deref(),
    }
}

/// File settings, or defaults without a file, with command line flags on top
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match config_path(cli) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    config.dry_run |= cli.dry_run;
    if let Some(membership) = cli.membership {
        config.membership = membership.into();
    }
    config.log.level = config.log.level.raised(cli.verbose);
    if let Some(file) = &cli.log_file {
        config.log.file = Some(file.clone());
    }
    Ok(config)
}

/// Converge each declared group in order, stopping at the first error
fn apply<R: CommandRunner>(
    converger: &Converger<R>,
    declared: &[VolumeGroupSpec],
) -> Result<Vec<ChangeResult>> {
    let mut results = Vec::with_capacity(declared.len());
    for spec in declared {
        let result = converger
            .converge(spec)
            .with_context(|| format!("{} volume group '{}'", spec.action, spec.name))?;
        results.push(result);
    }

    let changed = results.iter().filter(|result| result.changed).count();
    info!("{} of {} volume group(s) changed", changed, results.len());
    Ok(results)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
