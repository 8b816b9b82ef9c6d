// SPDX-License-Identifier: GPL-3.0-only

//! Read-only AIX LVM queries
//!
//! Nothing here is cached: every call spawns the underlying command again, so
//! each answer reflects the host at the moment of the call.

use std::collections::BTreeSet;

use aix_lvm_types::{PhysicalVolumeInfo, PvAssignment};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SysError};
use crate::runner::{CommandOutput, CommandRunner, render};
use crate::tools::LvmTools;

/// Field `readvgda -q` prints before the volume group identifier.
const VGDA_VGID_FIELD: &str = "VGID:";

/// How "is this physical volume a member of that volume group" is decided
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MembershipCheck {
    /// Compare the VGID in the disk's VGDA (`readvgda`) with the ODM VGID (`getlvodm`)
    #[default]
    Vgid,

    /// Compare the volume group column of `lspv` with the target name
    VgName,
}

/// Point-in-time view of the host's LVM state
pub struct Inspector<R> {
    runner: R,
    tools: LvmTools,
}

impl<R: CommandRunner> Inspector<R> {
    pub fn new(runner: R) -> Self {
        Self::with_tools(runner, LvmTools::default())
    }

    pub fn with_tools(runner: R, tools: LvmTools) -> Self {
        Self { runner, tools }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn tools(&self) -> &LvmTools {
        &self.tools
    }

    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        debug!("Executing lvm query: '{}'", render(program, args));
        self.runner.run(program, args)
    }

    /// Parsed `lspv` table
    pub fn physical_volumes(&self) -> Result<Vec<PhysicalVolumeInfo>> {
        let output = self
            .run(&self.tools.lspv, &[])?
            .into_success(&self.tools.lspv)?;
        let pvs = parse_lspv(&output.stdout);
        if pvs.is_empty() && !output.stdout.trim().is_empty() {
            return Err(SysError::UnexpectedOutput {
                command: self.tools.lspv.clone(),
                reason: "no physical volume rows".to_string(),
            });
        }
        Ok(pvs)
    }

    /// Device names of every physical volume visible to the OS
    pub fn list_physical_volumes(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .physical_volumes()?
            .into_iter()
            .map(|pv| pv.device)
            .collect())
    }

    /// The `lspv` row for one device, if the OS knows it
    pub fn physical_volume(&self, pv_name: &str) -> Result<Option<PhysicalVolumeInfo>> {
        Ok(self
            .physical_volumes()?
            .into_iter()
            .find(|pv| pv.device == pv_name))
    }

    /// `lsvg <name>` exits zero only for a registered volume group
    pub fn volume_group_exists(&self, name: &str) -> Result<bool> {
        let output = self.run(&self.tools.lsvg, &[name.to_string()])?;
        Ok(output.success())
    }

    /// VGID recorded in the VGDA of a physical volume.
    ///
    /// `None` when `readvgda` cannot read the VGDA; a readable VGDA without a
    /// `VGID:` line is an error.
    pub fn physical_volume_group_id(&self, pv_name: &str) -> Result<Option<String>> {
        let args = ["-q".to_string(), pv_name.to_string()];
        let output = self.run(&self.tools.readvgda, &args)?;
        if !output.success() {
            return Ok(None);
        }
        parse_vgda_vgid(&output.stdout)
            .map(Some)
            .ok_or_else(|| SysError::UnexpectedOutput {
                command: render(&self.tools.readvgda, &args),
                reason: format!("no {VGDA_VGID_FIELD} line"),
            })
    }

    /// VGID the ODM holds for a volume group
    pub fn volume_group_id(&self, vg_name: &str) -> Result<Option<String>> {
        let args = ["-v".to_string(), vg_name.to_string()];
        let output = self.run(&self.tools.getlvodm, &args)?;
        if !output.success() {
            return Ok(None);
        }
        parse_odm_vgid(&output.stdout)
            .map(Some)
            .ok_or_else(|| SysError::UnexpectedOutput {
                command: render(&self.tools.getlvodm, &args),
                reason: "empty output".to_string(),
            })
    }

    /// Whether `pv` is already a member of `vg`
    pub fn physical_volume_in_group(
        &self,
        pv: &PhysicalVolumeInfo,
        vg_name: &str,
        check: MembershipCheck,
    ) -> Result<bool> {
        match check {
            MembershipCheck::VgName => Ok(pv.volume_group() == Some(vg_name)),
            MembershipCheck::Vgid => {
                let pv_vgid = self.physical_volume_group_id(&pv.device)?;
                let vg_vgid = self.volume_group_id(vg_name)?;
                let member = same_vgid(pv_vgid.as_deref(), vg_vgid.as_deref());

                if !member && pv.volume_group() == Some(vg_name) {
                    warn!(
                        "lspv lists {} in {} but its VGDA VGID {:?} does not match ODM VGID {:?}; \
                         consider the vg-name membership check",
                        pv.device, vg_name, pv_vgid, vg_vgid
                    );
                }
                Ok(member)
            }
        }
    }
}

fn parse_lspv(output: &str) -> Vec<PhysicalVolumeInfo> {
    output
        .lines()
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 3 {
                return None;
            }
            let pvid = if cols[1].eq_ignore_ascii_case("none") {
                None
            } else {
                Some(cols[1].to_string())
            };

            Some(PhysicalVolumeInfo {
                device: cols[0].to_string(),
                pvid,
                assignment: PvAssignment::from_lspv_field(cols[2]),
                state: cols.get(3).map(|state| state.to_string()),
            })
        })
        .collect()
}

fn parse_vgda_vgid(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        if fields.next()? != VGDA_VGID_FIELD {
            return None;
        }
        fields.next().map(str::to_string)
    })
}

fn parse_odm_vgid(output: &str) -> Option<String> {
    output.split_whitespace().next().map(str::to_string)
}

fn same_vgid(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            let (a, b) = (a.trim(), b.trim());
            !a.is_empty() && a.eq_ignore_ascii_case(b)
        }
        _ => false,
    }
}
