use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TwisterLangError};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DaemonConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub token: Option<String>,
}

impl DaemonConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| TwisterLangError::Config(e.to_string()))?;
        let config: DaemonConfig =
            serde_json::from_str(&content).map_err(|e| TwisterLangError::Config(e.to_string()))?;
        Ok(config)
    }
}
