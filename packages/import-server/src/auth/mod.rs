// Caller identity: extension tokens and session JWTs
pub mod extension_tokens;
pub mod identity;
pub mod jwt;

pub use extension_tokens::{
    parse_provisioned_tokens, ExtensionToken, ExtensionTokenStore, MemoryExtensionTokenStore,
};
pub use identity::{Identity, IdentityResolver};
pub use jwt::{Claims, JwtService};
