//! Token verification port.
//!
//! Provider-agnostic: implementations exist for a locally-held symmetric key
//! (system-to-system and tests) and for remotely-fetched asymmetric key sets
//! (federated identity). The session gateway only ever sees this trait.

use async_trait::async_trait;

use crate::domain::{AuthContext, AuthError};

/// Verifies a bearer token and extracts the caller's identity.
///
/// # Contract
///
/// Implementations must:
/// - select the verifying configuration by the token's issuer claim,
///   failing with [`AuthError::UnknownIssuer`] when none matches;
/// - verify the signature and the standard temporal claims with a small
///   clock-skew allowance;
/// - reject issuer and audience mismatches;
/// - extract scopes from a space-delimited `scope` claim or a `scp` list,
///   defaulting to the empty set.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` and return the context it carries.
    async fn verify(&self, token: &str) -> Result<AuthContext, AuthError>;
}
