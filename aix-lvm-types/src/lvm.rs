//! AIX LVM observed types
//!
//! Types describing physical volumes as reported by `lspv`.

use serde::{Deserialize, Serialize};

/// Literal `lspv` writes in the volume group column of an unassigned disk.
const UNASSIGNED: &str = "None";

/// Volume group ownership of a physical volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum PvAssignment {
    /// Not a member of any volume group
    Unassigned,

    /// Member of the named volume group
    VolumeGroup(String),
}

impl PvAssignment {
    /// Interpret the third `lspv` column
    pub fn from_lspv_field(field: &str) -> Self {
        let field = field.trim();
        if field.is_empty() || field == UNASSIGNED {
            Self::Unassigned
        } else {
            Self::VolumeGroup(field.to_string())
        }
    }

    /// Check if the physical volume belongs to any volume group
    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::VolumeGroup(_))
    }

    /// Name of the owning volume group, if any
    pub fn volume_group(&self) -> Option<&str> {
        match self {
            Self::Unassigned => None,
            Self::VolumeGroup(name) => Some(name),
        }
    }
}

/// Physical volume information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalVolumeInfo {
    /// Device name (e.g., "hdisk1")
    pub device: String,

    /// Physical volume identifier (None if the disk has no PVID yet)
    pub pvid: Option<String>,

    /// Owning volume group
    pub assignment: PvAssignment,

    /// Volume group state column (e.g., "active"), when present
    pub state: Option<String>,
}

impl PhysicalVolumeInfo {
    /// Check if this PV is assigned to a VG
    pub fn is_assigned(&self) -> bool {
        self.assignment.is_assigned()
    }

    /// Name of the owning volume group, if any
    pub fn volume_group(&self) -> Option<&str> {
        self.assignment.volume_group()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_column_means_unassigned() {
        assert_eq!(PvAssignment::from_lspv_field("None"), PvAssignment::Unassigned);
        assert_eq!(PvAssignment::from_lspv_field(""), PvAssignment::Unassigned);
        assert_eq!(
            PvAssignment::from_lspv_field("datavg"),
            PvAssignment::VolumeGroup("datavg".to_string())
        );
    }

    #[test]
    fn lowercase_none_is_a_group_name() {
        // lspv prints "none" for a missing PVID, but only "None" for a missing group
        assert!(PvAssignment::from_lspv_field("none").is_assigned());
    }
}
