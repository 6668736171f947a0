//! Request metadata extraction.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::HOST;
use axum::http::request::Parts;
use shared::service::RequestContext;
use std::convert::Infallible;
use std::net::SocketAddr;

/// Method, URL, and peer address of the current request.
///
/// The peer address is only known when the server was started with connect
/// info; otherwise spans record `user.ip` as `unknown`.
#[derive(Debug, Clone)]
pub struct RequestMeta(pub RequestContext);

impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let url = match parts.headers.get(HOST).and_then(|h| h.to_str().ok()) {
            Some(host) if parts.uri.scheme().is_none() => format!("http://{host}{}", parts.uri),
            _ => parts.uri.to_string(),
        };

        let mut ctx = RequestContext::new(parts.method.as_str(), url);
        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            ctx = ctx.with_client_ip(addr.ip().to_string());
        }

        Ok(Self(ctx))
    }
}
