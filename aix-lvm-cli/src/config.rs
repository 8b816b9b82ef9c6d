// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};

use aix_lvm_sys::{ConvergeOptions, LvmTools, MembershipCheck};
use aix_lvm_types::VolumeGroupSpec;
use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LoggingLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// One step more verbose per `-v`
    pub fn raised(self, steps: u8) -> Self {
        let levels = [
            Self::Error,
            Self::Warn,
            Self::Info,
            Self::Debug,
            Self::Trace,
        ];
        let current = levels.iter().position(|level| *level == self).unwrap_or(2);
        levels[(current + usize::from(steps)).min(levels.len() - 1)]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LoggingLevel,

    /// Append logs to this file in addition to stderr
    pub file: Option<PathBuf>,
}

/// Contents of an `aix-vg` TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,
    pub dry_run: bool,
    pub membership: MembershipCheck,
    pub tools: LvmTools,

    #[serde(rename = "volume_group")]
    pub volume_groups: Vec<VolumeGroupSpec>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading configuration {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("loading configuration {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Every declared volume group must be valid before anything runs
    pub fn validate(&self) -> anyhow::Result<()> {
        for (index, spec) in self.volume_groups.iter().enumerate() {
            spec.validate()
                .with_context(|| format!("volume_group[{index}] ('{}')", spec.name))?;
        }
        Ok(())
    }

    pub fn converge_options(&self) -> ConvergeOptions {
        ConvergeOptions {
            dry_run: self.dry_run,
            membership: self.membership,
        }
    }
}
