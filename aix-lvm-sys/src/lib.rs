// SPDX-License-Identifier: GPL-3.0-only

//! Low-level AIX LVM operations
//!
//! This crate talks to the AIX LVM command set directly:
//! - Read-only inspection (`lspv`, `lsvg`, `readvgda`, `getlvodm`)
//! - Volume group creation and extension (`mkvg`, `extendvg`)
//! - Convergence of a declared [`VolumeGroupSpec`](aix_lvm_types::VolumeGroupSpec)
//!
//! Every command goes through a [`CommandRunner`], so callers can swap the
//! host for a simulated one. Mutating commands require root on the target.

pub mod converge;
pub mod error;
pub mod inspector;
pub mod runner;
pub mod tools;

pub use converge::{ConvergeOptions, Converger, MembershipCheck, extendvg_args, mkvg_args};
pub use error::{ConvergeError, Result, SysError};
pub use inspector::Inspector;
pub use runner::{CommandOutput, CommandRunner, SystemRunner, render};
pub use tools::LvmTools;
