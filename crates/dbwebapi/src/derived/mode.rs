use std::fmt;

use serde::Serialize;

/// Operating mode of the derived-parameters cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// No detection job is feeding invalidations; entries expire quickly
    #[default]
    Idle,
    /// A detection job invalidates altered procedures; entries live long
    Watching,
}

impl CacheMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Watching => "watching",
        }
    }

    #[must_use]
    pub const fn is_watching(&self) -> bool {
        matches!(self, Self::Watching)
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
