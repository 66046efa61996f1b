use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use headers::{HeaderMapExt, UserAgent};
use std::convert::Infallible;
use std::net::SocketAddr;

/// Who sent the request, as far as the connection and headers tell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    /// Peer IP; `None` when the server was not started with connect info.
    pub addr: Option<String>,
    /// `User-Agent` header, empty when absent.
    pub user_agent: String,
}

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(peer)| peer.ip().to_string());
        let user_agent = parts
            .headers
            .typed_get::<UserAgent>()
            .map(|ua| ua.as_str().to_string())
            .unwrap_or_default();
        Ok(Self { addr, user_agent })
    }
}
