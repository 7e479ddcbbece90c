// ── Controller identity ──

use serde::{Deserialize, Serialize};

/// Model and firmware as reported by the controller.
///
/// Both stay `None` until the corresponding frame has been seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub model: Option<String>,
    pub firmware: Option<String>,
}
