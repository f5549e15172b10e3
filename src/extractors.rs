//! Request extractors for the ingestion boundary.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

use crate::analytics::UNKNOWN_LOCATION;

/// Used when neither proxy headers nor the socket tell us who connected.
pub const FALLBACK_IP: &str = "127.0.0.1";

const CITY_HEADER: &str = "x-vercel-ip-city";
const COUNTRY_HEADER: &str = "x-vercel-ip-country";

/// Client IP address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientIp(resolve_ip(&parts.headers, peer)))
    }
}

/// "City, CountryCode" hint from edge geo headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoLocation(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for GeoLocation
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(GeoLocation(resolve_location(&parts.headers)))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// First hop of X-Forwarded-For, then X-Real-IP, then the socket peer.
pub fn resolve_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(first) = header_str(headers, "x-forwarded-for")
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return first.to_string();
    }

    if let Some(real_ip) = header_str(headers, "x-real-ip") {
        return real_ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| FALLBACK_IP.to_string())
}

/// City names arrive percent-encoded from the edge.
pub fn resolve_location(headers: &HeaderMap) -> String {
    let city = header_str(headers, CITY_HEADER).map(|raw| {
        urlencoding::decode(raw)
            .map(|c| c.into_owned())
            .unwrap_or_else(|_| raw.to_string())
    });
    let country = header_str(headers, COUNTRY_HEADER);

    match (city, country) {
        (Some(city), Some(country)) => format!("{city}, {country}"),
        (Some(city), None) => city,
        (None, Some(country)) => country.to_string(),
        (None, None) => UNKNOWN_LOCATION.to_string(),
    }
}
