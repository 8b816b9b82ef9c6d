// SPDX-License-Identifier: GPL-3.0-only

//! Volume group convergence
//!
//! [`Converger::converge`] compares a [`VolumeGroupSpec`] with what the
//! [`Inspector`] reports and issues at most one mutating command. Every
//! precondition is checked before that command runs, so a failed run never
//! leaves a partial extension behind.

use aix_lvm_types::{ChangeResult, PvAssignment, VolumeGroupAction, VolumeGroupSpec};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConvergeError;
use crate::inspector::Inspector;
use crate::runner::{CommandRunner, render};

pub use crate::inspector::MembershipCheck;

/// Engine settings that do not belong to a single volume group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergeOptions {
    /// Inspect as usual but only log the mutating command
    pub dry_run: bool,

    pub membership: MembershipCheck,
}

/// Drives the host towards declared volume group state
pub struct Converger<R> {
    inspector: Inspector<R>,
    options: ConvergeOptions,
}

impl<R: CommandRunner> Converger<R> {
    pub fn new(inspector: Inspector<R>) -> Self {
        Self {
            inspector,
            options: ConvergeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConvergeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn inspector(&self) -> &Inspector<R> {
        &self.inspector
    }

    pub fn options(&self) -> ConvergeOptions {
        self.options
    }

    /// Validate `spec` and apply its action
    pub fn converge(&self, spec: &VolumeGroupSpec) -> Result<ChangeResult, ConvergeError> {
        spec.validate()?;

        match spec.action {
            VolumeGroupAction::Create => self.create(spec),
            VolumeGroupAction::Extend => self.extend(spec),
        }
    }

    fn create(&self, spec: &VolumeGroupSpec) -> Result<ChangeResult, ConvergeError> {
        let name = &spec.name;

        if self.inspector.volume_group_exists(name)? {
            info!("Volume group '{}' already exists. Not creating...", name);
            return Ok(ChangeResult::unchanged(name, VolumeGroupAction::Create));
        }

        info!("Volume group '{}' does not exist. Creating...", name);
        let mkvg = self.inspector.tools().mkvg.clone();
        let command = self.mutate(&mkvg, &mkvg_args(spec))?;

        Ok(ChangeResult::changed(
            name,
            VolumeGroupAction::Create,
            spec.physical_volumes.clone(),
            command,
        )
        .with_dry_run(self.options.dry_run))
    }

    fn extend(&self, spec: &VolumeGroupSpec) -> Result<ChangeResult, ConvergeError> {
        let name = &spec.name;

        if !self.inspector.volume_group_exists(name)? {
            return Err(ConvergeError::VolumeGroupMissing(name.clone()));
        }

        let pvs_to_add = self.pending_members(spec)?;
        if pvs_to_add.is_empty() {
            info!(
                "Volume group '{}' already contains {}. Not extending...",
                name,
                spec.physical_volumes.join(" ")
            );
            return Ok(ChangeResult::unchanged(name, VolumeGroupAction::Extend));
        }

        info!(
            "Extending volume group '{}' with physical volume(s): {}",
            name,
            pvs_to_add.join(" ")
        );
        let extendvg = self.inspector.tools().extendvg.clone();
        let command = self.mutate(&extendvg, &extendvg_args(name, &pvs_to_add))?;

        Ok(
            ChangeResult::changed(name, VolumeGroupAction::Extend, pvs_to_add, command)
                .with_dry_run(self.options.dry_run),
        )
    }

    /// Declared devices that are free and must be added, in declared order.
    ///
    /// Fails on the first device that is missing or owned by another group.
    fn pending_members(&self, spec: &VolumeGroupSpec) -> Result<Vec<String>, ConvergeError> {
        let known = self.inspector.physical_volumes()?;
        let mut pvs_to_add = Vec::new();

        for pv_name in &spec.physical_volumes {
            let pv = known
                .iter()
                .find(|pv| &pv.device == pv_name)
                .ok_or_else(|| ConvergeError::PhysicalVolumeMissing(pv_name.clone()))?;

            match &pv.assignment {
                PvAssignment::Unassigned => pvs_to_add.push(pv_name.clone()),
                PvAssignment::VolumeGroup(owner) => {
                    if !self
                        .inspector
                        .physical_volume_in_group(pv, &spec.name, self.options.membership)?
                    {
                        return Err(ConvergeError::PhysicalVolumeInUse {
                            pv: pv_name.clone(),
                            owner: owner.clone(),
                        });
                    }
                    debug!("{} is already a member of {}", pv_name, spec.name);
                }
            }
        }

        Ok(pvs_to_add)
    }

    /// Run one mutating command, returning its rendered form
    fn mutate(&self, program: &str, args: &[String]) -> Result<String, ConvergeError> {
        let command = render(program, args);

        if self.options.dry_run {
            info!("Dry run, not executing lvm command: '{}'", command);
            return Ok(command);
        }

        debug!("Executing lvm command: '{}'", command);
        self.inspector
            .runner()
            .run(program, args)?
            .into_success(&command)?;
        Ok(command)
    }
}

/// `mkvg [-f] [-s <size>] -y <name> <pv>...`
pub fn mkvg_args(spec: &VolumeGroupSpec) -> Vec<String> {
    let mut args = Vec::new();
    if spec.wipe_signatures {
        args.push("-f".to_string());
    }
    if let Some(size) = &spec.physical_partition_size {
        args.push("-s".to_string());
        args.push(size.clone());
    }
    args.push("-y".to_string());
    args.push(spec.name.clone());
    args.extend(spec.physical_volumes.iter().cloned());
    args
}

/// `extendvg <name> <pv>...`
pub fn extendvg_args(name: &str, pvs: &[String]) -> Vec<String> {
    let mut args = Vec::with_capacity(pvs.len() + 1);
    args.push(name.to_string());
    args.extend(pvs.iter().cloned());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn mkvg_keeps_declared_order() {
        let spec = VolumeGroupSpec::new("datavg", ["hdisk3", "hdisk1", "hdisk2"]);
        assert_eq!(
            mkvg_args(&spec),
            strings(&["-y", "datavg", "hdisk3", "hdisk1", "hdisk2"])
        );
    }

    #[test]
    fn mkvg_adds_force_and_partition_size() {
        let spec = VolumeGroupSpec::new("datavg", "hdisk1")
            .with_wipe_signatures(true)
            .with_physical_partition_size("64");
        assert_eq!(
            mkvg_args(&spec),
            strings(&["-f", "-s", "64", "-y", "datavg", "hdisk1"])
        );
    }

    #[test]
    fn extendvg_passes_duplicates_through() {
        assert_eq!(
            extendvg_args("datavg", &strings(&["hdisk2", "hdisk2"])),
            strings(&["datavg", "hdisk2", "hdisk2"])
        );
    }

    #[test]
    fn options_default_to_live_vgid_runs() {
        let options = ConvergeOptions::default();
        assert!(!options.dry_run);
        assert_eq!(options.membership, MembershipCheck::Vgid);
    }
}
