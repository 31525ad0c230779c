use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;
use uuid::Uuid;

pub const VISITOR_COOKIE: &str = "meetup_visitor";

/// Browser identity that scopes the registration and admin flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visitor(String);

impl Visitor {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Reads the visitor cookie, issuing a fresh one when it is missing or
/// malformed, and hands the `Visitor` to handlers as an extension.
pub async fn assign_visitor(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let known = jar
        .get(VISITOR_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());

    let (visitor, issued) = match known {
        Some(id) => (Visitor::new(id.to_string()), None),
        None => {
            let id = Uuid::new_v4().to_string();
            debug!(visitor = %id, "issuing visitor cookie");
            (Visitor::new(id.clone()), Some(visitor_cookie(id)))
        }
    };

    request.extensions_mut().insert(visitor);
    let response = next.run(request).await;
    match issued {
        Some(cookie) => (jar.add(cookie), response).into_response(),
        None => response,
    }
}

fn visitor_cookie(id: String) -> Cookie<'static> {
    Cookie::build((VISITOR_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .permanent()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|Extension(visitor): Extension<Visitor>| async move { visitor.id().to_string() }))
            .layer(middleware::from_fn(assign_visitor))
    }

    #[tokio::test]
    async fn new_visitor_receives_cookie() {
        let response = app().oneshot(Request::new(Body::empty())).await.unwrap();
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("meetup_visitor="));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn known_visitor_keeps_id() {
        let id = Uuid::new_v4().to_string();
        let request = axum::http::Request::builder()
            .header(header::COOKIE, format!("{VISITOR_COOKIE}={id}"))
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], id.as_bytes());
    }

    #[tokio::test]
    async fn malformed_cookie_is_replaced() {
        let request = axum::http::Request::builder()
            .header(header::COOKIE, format!("{VISITOR_COOKIE}=not-a-uuid"))
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert!(response.headers().get(header::SET_COOKIE).is_some());
    }
}
