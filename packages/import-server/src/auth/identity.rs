use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::extension_tokens::ExtensionTokenStore;
use super::jwt::JwtService;

/// Who is calling, as far as the import endpoint cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    /// Bearer token issued to the browser extension
    Extension { user_id: Uuid },
    /// Regular session JWT
    Session { user_id: Uuid },
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Identity::Anonymous)
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Identity::Anonymous => None,
            Identity::Extension { user_id } | Identity::Session { user_id } => Some(*user_id),
        }
    }
}

/// Resolves a bearer credential to an [`Identity`].
///
/// Extension tokens are checked first, then session JWTs. Anything that
/// fails both is anonymous; resolution never rejects a request.
#[derive(Clone)]
pub struct IdentityResolver {
    extension_tokens: Arc<dyn ExtensionTokenStore>,
    jwt_service: Arc<JwtService>,
}

impl IdentityResolver {
    pub fn new(
        extension_tokens: Arc<dyn ExtensionTokenStore>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            extension_tokens,
            jwt_service,
        }
    }

    /// Resolve the value of an `Authorization` header.
    ///
    /// Accepts both "Bearer <token>" and a raw token.
    pub async fn resolve(&self, authorization: Option<&str>) -> Identity {
        let token = match authorization.map(str::trim) {
            Some(value) if !value.is_empty() => {
                value.strip_prefix("Bearer ").unwrap_or(value).trim()
            }
            _ => return Identity::Anonymous,
        };

        match self.extension_tokens.find_valid(token).await {
            Ok(Some(found)) => {
                debug!(user_id = %found.user_id, "Authenticated via extension token");
                return Identity::Extension {
                    user_id: found.user_id,
                };
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Extension token lookup failed"),
        }

        match self.jwt_service.verify_token(token) {
            Ok(claims) => {
                debug!(user_id = %claims.user_id, "Authenticated via session token");
                Identity::Session {
                    user_id: claims.user_id,
                }
            }
            Err(_) => {
                debug!("No valid authentication token");
                Identity::Anonymous
            }
        }
    }
}
