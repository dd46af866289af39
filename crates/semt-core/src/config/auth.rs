//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// JWT validation configuration.
///
/// Token issuance lives in the platform's auth service; this service only
/// validates access tokens presented by clients and internal callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret shared with the token issuer.
    pub jwt_secret: String,
    /// Clock-skew leeway in seconds for expiry validation.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

fn default_leeway() -> u64 {
    5
}
