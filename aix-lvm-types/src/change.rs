use serde::{Deserialize, Serialize};

use crate::VolumeGroupAction;

/// Outcome of converging one volume group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeResult {
    /// Volume group name
    pub volume_group: String,

    pub action: VolumeGroupAction,

    /// Whether this invocation mutated (or, in a dry run, would mutate) the host
    pub changed: bool,

    /// Devices handed to `mkvg`/`extendvg`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub physical_volumes: Vec<String>,

    /// Rendered mutating command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default)]
    pub dry_run: bool,
}

impl ChangeResult {
    /// The host already matched the declaration
    pub fn unchanged(volume_group: impl Into<String>, action: VolumeGroupAction) -> Self {
        Self {
            volume_group: volume_group.into(),
            action,
            changed: false,
            physical_volumes: Vec::new(),
            command: None,
            dry_run: false,
        }
    }

    /// A mutating command ran with the given devices
    pub fn changed(
        volume_group: impl Into<String>,
        action: VolumeGroupAction,
        physical_volumes: Vec<String>,
        command: String,
    ) -> Self {
        Self {
            volume_group: volume_group.into(),
            action,
            changed: true,
            physical_volumes,
            command: Some(command),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
