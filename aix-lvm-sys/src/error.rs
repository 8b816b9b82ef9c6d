// SPDX-License-Identifier: GPL-3.0-only

use aix_lvm_types::SpecError;
use thiserror::Error;

/// Exit status for infrastructure failures and failed mutating commands
pub const EXIT_FAILURE: i32 = 1;
/// Exit status when the target volume group does not exist
pub const EXIT_INVALID_VOLUME_GROUP: i32 = 2;
/// Exit status when a declared physical volume does not exist
pub const EXIT_INVALID_PHYSICAL_VOLUME: i32 = 3;
/// Exit status when a declared physical volume belongs to another volume group
pub const EXIT_PHYSICAL_VOLUME_IN_USE: i32 = 4;
/// Exit status for a declaration that fails validation
pub const EXIT_INVALID_SPEC: i32 = 5;

/// Error types for system-level operations
#[derive(Error, Debug)]
pub enum SysError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("`{command}` failed ({}): {stderr}", exit_label(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Unexpected output from `{command}`: {reason}")]
    UnexpectedOutput { command: String, reason: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Result type alias for system operations
pub type Result<T> = std::result::Result<T, SysError>;

/// Reasons a convergence run stops without reaching the declared state
#[derive(Error, Debug)]
pub enum ConvergeError {
    #[error("invalid volume group declaration: {0}")]
    InvalidSpec(#[from] SpecError),

    #[error("VG {0} is not a valid volume group")]
    VolumeGroupMissing(String),

    #[error("PV {0} is not a valid physical volume")]
    PhysicalVolumeMissing(String),

    #[error("PV {pv} is already a member of another volume group ({owner})")]
    PhysicalVolumeInUse { pv: String, owner: String },

    #[error(transparent)]
    Sys(#[from] SysError),
}

impl ConvergeError {
    /// Process exit status reported for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidSpec(_) => EXIT_INVALID_SPEC,
            Self::VolumeGroupMissing(_) => EXIT_INVALID_VOLUME_GROUP,
            Self::PhysicalVolumeMissing(_) => EXIT_INVALID_PHYSICAL_VOLUME,
            Self::PhysicalVolumeInUse { .. } => EXIT_PHYSICAL_VOLUME_IN_USE,
            Self::Sys(_) => EXIT_FAILURE,
        }
    }

    /// Misconfigured declaration rather than a host or tooling fault
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::VolumeGroupMissing(_)
                | Self::PhysicalVolumeMissing(_)
                | Self::PhysicalVolumeInUse { .. }
        )
    }
}
