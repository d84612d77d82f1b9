use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The persisted login credential and its cached role.
///
/// No expiry is tracked here; the server is the only authority on whether
/// the token is still valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Role string returned at login ("admin" or "user"), cached for display
    /// before the first verify completes.
    pub role: String,
    /// When the credentials were written.
    pub saved_at: DateTime<Utc>,
    /// Opaque bearer token issued by the backend.
    pub token: String,
}
