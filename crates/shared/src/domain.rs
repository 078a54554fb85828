use serde::{Deserialize, Serialize};

/// Backend model identifier. The backend treats these as opaque lookup
/// keys (names or numeric ids serialized as text), so the client does too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelRef(pub String);

impl ModelRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One independently resettable viewer surface. `Main` is the sole slot
/// in single-view mode; `Left`/`Right` are the dual-view pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerSlot {
    Main,
    Left,
    Right,
}
