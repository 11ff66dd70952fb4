use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};

/// Display settings for CLI output
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct DisplaySettings {
    /// Use colors in terminal output
    /// Default: true
    pub colors: Option<bool>,

    /// Show unicode symbols in output
    /// Default: true
    pub icons: Option<bool>,
}

impl DisplaySettings {
    pub fn colors(&self) -> bool {
        self.colors.unwrap_or(true)
    }

    pub fn icons(&self) -> bool {
        self.icons.unwrap_or(true)
    }
}
