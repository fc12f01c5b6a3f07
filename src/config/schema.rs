use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scoring::AnalysisConfig;

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding store.json (default: ~/.config/convo-score/)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub analysis: Option<AnalysisConfig>,
}
