use serde::{Deserialize, Serialize};

/// Program names (or absolute paths) of the AIX LVM commands in use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LvmTools {
    pub lspv: String,
    pub lsvg: String,
    pub readvgda: String,
    pub getlvodm: String,
    pub mkvg: String,
    pub extendvg: String,
}

impl Default for LvmTools {
    fn default() -> Self {
        Self {
            lspv: "lspv".to_string(),
            lsvg: "lsvg".to_string(),
            readvgda: "readvgda".to_string(),
            getlvodm: "getlvodm".to_string(),
            mkvg: "mkvg".to_string(),
            extendvg: "extendvg".to_string(),
        }
    }
}
