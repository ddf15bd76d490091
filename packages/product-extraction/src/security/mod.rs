//! Credential handling and SSRF protection.

pub mod credentials;
pub mod validator;

pub use credentials::RenderCredentials;
pub use validator::UrlValidator;
