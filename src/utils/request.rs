use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};

use crate::{services::auth::ClientMeta, ServiceState};

const UNKNOWN: &str = "unknown";

fn first_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip_address = first_header_value(&parts.headers, "x-forwarded-for")
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| UNKNOWN.to_string());

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string();

        Ok(ClientMeta {
            ip_address,
            user_agent,
        })
    }
}

/// `scheme://host` of the current request, used to turn stored upload
/// paths into absolute URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(pub String);

impl BaseUrl {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let scheme =
            first_header_value(headers, "x-forwarded-proto").unwrap_or_else(|| "http".to_string());
        let host = first_header_value(headers, header::HOST.as_str())
            .unwrap_or_else(|| "localhost".to_string());
        BaseUrl(format!("{scheme}://{host}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<Arc<ServiceState>> for BaseUrl {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ServiceState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(base) = &state.config.server.public_base_url {
            return Ok(BaseUrl(base.clone()));
        }
        Ok(BaseUrl::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn base_url_prefers_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("shop.example:8443"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        assert_eq!(
            BaseUrl::from_headers(&headers).as_str(),
            "https://shop.example:8443"
        );
    }

    #[test]
    fn base_url_defaults_to_http_localhost() {
        assert_eq!(
            BaseUrl::from_headers(&HeaderMap::new()).as_str(),
            "http://localhost"
        );
    }

    #[tokio::test]
    async fn client_meta_prefers_the_first_forwarded_address() {
        let request = axum::http::Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .header(header::USER_AGENT, "admin-panel/1.0")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let meta = ClientMeta::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(meta.ip_address, "203.0.113.9");
        assert_eq!(meta.user_agent, "admin-panel/1.0");
    }

    #[tokio::test]
    async fn client_meta_falls_back_to_unknown() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        let meta = ClientMeta::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(meta.ip_address, "unknown");
        assert_eq!(meta.user_agent, "unknown");
    }
}
