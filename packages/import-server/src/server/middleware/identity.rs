use crate::auth::{Identity, IdentityResolver};
use axum::{http::header::AUTHORIZATION, middleware::Next, response::Response};
use std::sync::Arc;

/// Identity resolution middleware
///
/// Reads the Authorization header, resolves it and adds an [`Identity`] to
/// request extensions. Requests without valid credentials continue as
/// [`Identity::Anonymous`].
pub async fn identity_middleware(
    resolver: Arc<IdentityResolver>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let identity = resolver.resolve(authorization.as_deref()).await;
    request.extensions_mut().insert(identity);

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtService, MemoryExtensionTokenStore};
    use axum::{body::Body, http::Request, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn whoami(Extension(identity): Extension<Identity>) -> String {
        match identity.user_id() {
            Some(id) => id.to_string(),
            None => "anonymous".to_string(),
        }
    }

    fn app(jwt: Arc<JwtService>) -> Router {
        let resolver = Arc::new(IdentityResolver::new(
            Arc::new(MemoryExtensionTokenStore::new()),
            jwt,
        ));
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn(move |req, next| {
                identity_middleware(resolver.clone(), req, next)
            }))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_session_token_sets_identity() {
        let jwt = Arc::new(JwtService::new("test_secret", "test_issuer".to_string()));
        let user_id = Uuid::new_v4();
        let token = jwt.create_token(user_id).unwrap();

        let response = app(jwt)
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_text(response).await, user_id.to_string());
    }

    #[tokio::test]
    async fn test_no_header_is_anonymous() {
        let jwt = Arc::new(JwtService::new("test_secret", "test_issuer".to_string()));

        let response = app(jwt)
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(body_text(response).await, "anonymous");
    }
}
