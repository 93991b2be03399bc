use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The only access level tokens are issued with today.
pub const ACCESS_AUTH: &str = "auth";

/// JWT payload bound to a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,      // user ID
    pub access: String, // access level, always "auth" for now
    pub jti: Uuid,      // keeps tokens from the same second distinct
    pub iat: usize,     // issued at (unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>, // only present when a TTL is configured
}
