// SPDX-License-Identifier: GPL-3.0-only

//! Canonical models for AIX volume group convergence
//!
//! These types are shared by the whole stack:
//!
//! - **aix-lvm-sys**: inspects the host and converges it towards a [`VolumeGroupSpec`]
//! - **aix-lvm-cli**: loads specs from configuration and reports [`ChangeResult`]s
//! - **aix-lvm-testing**: drives the engine against a simulated host
//!
//! ## Declared vs. observed
//!
//! - [`VolumeGroupSpec`] → what the operator wants, validated before anything runs
//! - [`PhysicalVolumeInfo`] → one row of `lspv`, read fresh on every invocation
//! - [`ChangeResult`] → whether an invocation mutated the host

pub mod change;
pub mod lvm;
pub mod spec;

pub use change::ChangeResult;
pub use lvm::{PhysicalVolumeInfo, PvAssignment};
pub use spec::{
    PhysicalVolumes, SpecError, VolumeGroupAction, VolumeGroupSpec, is_valid_partition_size,
    is_valid_volume_group_name,
};
