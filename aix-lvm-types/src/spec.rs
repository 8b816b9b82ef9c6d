// SPDX-License-Identifier: GPL-3.0-only

//! Declared volume group state
//!
//! A [`VolumeGroupSpec`] is built once per invocation, validated, handed to the
//! convergence engine and then dropped.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Unit suffixes accepted after the digits of a physical partition size.
const PARTITION_SIZE_UNITS: &str = "bBsSkKmMgGtTpPeE";

/// What to do with a declared volume group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeGroupAction {
    /// Create the volume group if it does not exist
    #[default]
    Create,

    /// Add any declared physical volumes that are not yet members
    Extend,
}

impl VolumeGroupAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Extend => "extend",
        }
    }
}

impl fmt::Display for VolumeGroupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical volumes as written by the operator: one device or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhysicalVolumes {
    One(String),
    Many(Vec<String>),
}

impl PhysicalVolumes {
    /// Flatten into an ordered device list
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(device) => vec![device],
            Self::Many(devices) => devices,
        }
    }
}

impl From<&str> for PhysicalVolumes {
    fn from(device: &str) -> Self {
        Self::One(device.to_string())
    }
}

impl From<String> for PhysicalVolumes {
    fn from(device: String) -> Self {
        Self::One(device)
    }
}

impl From<Vec<String>> for PhysicalVolumes {
    fn from(devices: Vec<String>) -> Self {
        Self::Many(devices)
    }
}

impl From<Vec<&str>> for PhysicalVolumes {
    fn from(devices: Vec<&str>) -> Self {
        Self::Many(devices.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PhysicalVolumes {
    fn from(devices: [&str; N]) -> Self {
        Self::Many(devices.iter().map(|device| device.to_string()).collect())
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    PhysicalVolumes::deserialize(deserializer).map(PhysicalVolumes::into_vec)
}

/// Validation failures for a declared volume group
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("volume group name must not be empty")]
    EmptyName,

    #[error("volume group name '{0}' may only contain letters, digits, '_', '+', '.' and '-'")]
    InvalidName(String),

    #[error("volume group name cannot be '.' or '..'")]
    ReservedName(String),

    #[error("volume group '{name}' declares no physical volumes")]
    NoPhysicalVolumes { name: String },

    #[error("volume group '{name}' declares an invalid physical volume '{device}'")]
    InvalidPhysicalVolume { name: String, device: String },

    #[error("volume group '{name}' has invalid physical partition size '{size}'")]
    InvalidPartitionSize { name: String, size: String },
}

/// Declared volume group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeGroupSpec {
    /// Volume group name
    pub name: String,

    /// Member devices, in the order they are handed to `mkvg`/`extendvg`
    #[serde(deserialize_with = "one_or_many")]
    pub physical_volumes: Vec<String>,

    /// Allocation granularity passed to `mkvg -s`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_partition_size: Option<String>,

    /// Pass `-f` to `mkvg`, overwriting existing signatures
    #[serde(default)]
    pub wipe_signatures: bool,

    #[serde(default)]
    pub action: VolumeGroupAction,
}

impl VolumeGroupSpec {
    /// Declare a volume group to be created from the given devices
    pub fn new(name: impl Into<String>, physical_volumes: impl Into<PhysicalVolumes>) -> Self {
        Self {
            name: name.into(),
            physical_volumes: physical_volumes.into().into_vec(),
            physical_partition_size: None,
            wipe_signatures: false,
            action: VolumeGroupAction::default(),
        }
    }

    pub fn with_action(mut self, action: VolumeGroupAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_physical_partition_size(mut self, size: impl Into<String>) -> Self {
        self.physical_partition_size = Some(size.into());
        self
    }

    pub fn with_wipe_signatures(mut self, wipe: bool) -> Self {
        self.wipe_signatures = wipe;
        self
    }

    /// Check every declared attribute
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.name.is_empty() {
            return Err(SpecError::EmptyName);
        }
        if self.name == "." || self.name == ".." {
            return Err(SpecError::ReservedName(self.name.clone()));
        }
        if !is_valid_volume_group_name(&self.name) {
            return Err(SpecError::InvalidName(self.name.clone()));
        }

        if self.physical_volumes.is_empty() {
            return Err(SpecError::NoPhysicalVolumes {
                name: self.name.clone(),
            });
        }
        if let Some(device) = self
            .physical_volumes
            .iter()
            .find(|device| device.is_empty() || device.chars().any(char::is_whitespace))
        {
            return Err(SpecError::InvalidPhysicalVolume {
                name: self.name.clone(),
                device: device.clone(),
            });
        }

        if let Some(size) = &self.physical_partition_size
            && !is_valid_partition_size(size)
        {
            return Err(SpecError::InvalidPartitionSize {
                name: self.name.clone(),
                size: size.clone(),
            });
        }

        Ok(())
    }
}

/// Whole-string match of `[\w+.-]+`
pub fn is_valid_volume_group_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '.' | '-'))
}

/// Whole-string match of `\d+[bBsSkKmMgGtTpPeE]?`
pub fn is_valid_partition_size(size: &str) -> bool {
    let digits = size.strip_suffix(|c: char| PARTITION_SIZE_UNITS.contains(c)).unwrap_or(size);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_string_and_single_element_list_are_equivalent() {
        let scalar: VolumeGroupSpec =
            toml::from_str("name = \"datavg\"\nphysical_volumes = \"hdisk1\"\n").unwrap();
        let list: VolumeGroupSpec =
            toml::from_str("name = \"datavg\"\nphysical_volumes = [\"hdisk1\"]\n").unwrap();

        assert_eq!(scalar, list);
        assert_eq!(scalar.physical_volumes, vec!["hdisk1".to_string()]);
        assert_eq!(
            VolumeGroupSpec::new("datavg", "hdisk1"),
            VolumeGroupSpec::new("datavg", vec!["hdisk1"])
        );
    }

    #[test]
    fn defaults_apply_when_omitted() {
        let spec: VolumeGroupSpec =
            serde_json::from_str(r#"{"name":"datavg","physical_volumes":["hdisk1","hdisk2"]}"#)
                .unwrap();

        assert_eq!(spec.action, VolumeGroupAction::Create);
        assert!(!spec.wipe_signatures);
        assert_eq!(spec.physical_partition_size, None);
    }

    #[test]
    fn action_is_lowercase_on_the_wire() {
        let spec: VolumeGroupSpec = toml::from_str(
            "name = \"datavg\"\nphysical_volumes = [\"hdisk1\"]\naction = \"extend\"\n",
        )
        .unwrap();
        assert_eq!(spec.action, VolumeGroupAction::Extend);
        assert_eq!(VolumeGroupAction::Extend.to_string(), "extend");
    }

    #[test]
    fn rejects_bad_names() {
        assert_eq!(
            VolumeGroupSpec::new("", "hdisk1").validate(),
            Err(SpecError::EmptyName)
        );
        assert!(matches!(
            VolumeGroupSpec::new("..", "hdisk1").validate(),
            Err(SpecError::ReservedName(_))
        ));
        assert!(matches!(
            VolumeGroupSpec::new("data vg", "hdisk1").validate(),
            Err(SpecError::InvalidName(_))
        ));
        assert!(VolumeGroupSpec::new("data_vg.01+x-y", "hdisk1").validate().is_ok());
    }

    #[test]
    fn rejects_empty_or_blank_physical_volumes() {
        assert!(matches!(
            VolumeGroupSpec::new("datavg", Vec::<String>::new()).validate(),
            Err(SpecError::NoPhysicalVolumes { .. })
        ));
        assert!(matches!(
            VolumeGroupSpec::new("datavg", ["hdisk1", ""]).validate(),
            Err(SpecError::InvalidPhysicalVolume { .. })
        ));
        assert!(matches!(
            VolumeGroupSpec::new("datavg", "hdisk1 hdisk2").validate(),
            Err(SpecError::InvalidPhysicalVolume { .. })
        ));
    }

    #[test]
    fn partition_size_accepts_optional_unit() {
        assert!(is_valid_partition_size("64"));
        assert!(is_valid_partition_size("256M"));
        assert!(is_valid_partition_size("1g"));
        assert!(!is_valid_partition_size("M"));
        assert!(!is_valid_partition_size("64MB"));
        assert!(!is_valid_partition_size("-64"));
        assert!(!is_valid_partition_size(""));

        let spec = VolumeGroupSpec::new("datavg", "hdisk1").with_physical_partition_size("big");
        assert!(matches!(
            spec.validate(),
            Err(SpecError::InvalidPartitionSize { .. })
        ));
    }
}
