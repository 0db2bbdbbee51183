use serde::Serialize;
use textwire_serial::{deserialize_exact, serialize_to_buffer, Str};

use crate::error::{FrameError, Result};
use crate::header::{decode_header, encode_header, FragmentHeader};
use crate::token::{decode_token_with, encode_token, TokenMode};

/// Separator between the endpoint token and the header token.
pub const ROUTE_SEPARATOR: char = ':';

/// A decoded route: which endpoint, and which fragment of which message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub endpoint: String,
    pub header: FragmentHeader,
}

pub fn encode_endpoint(endpoint: &str) -> Result<String> {
    let buf = serialize_to_buffer(&Str, &endpoint.to_string())?;
    Ok(encode_token(buf.as_written()))
}

pub fn decode_endpoint(token: &str, mode: TokenMode) -> Result<String> {
    let mut buf = decode_token_with(token, mode)?;
    Ok(deserialize_exact(&Str, &mut buf)?)
}

/// Build `endpointToken:headerToken`.
pub fn format_route(endpoint: &str, header: &FragmentHeader) -> Result<String> {
    let mut route = encode_endpoint(endpoint)?;
    route.push(ROUTE_SEPARATOR);
    route.push_str(&encode_header(header)?);
    Ok(route)
}

/// Split a route on its first `:` and decode both halves.
pub fn parse_route(route: &str, mode: TokenMode) -> Result<Route> {
    let (endpoint, header) = route
        .split_once(ROUTE_SEPARATOR)
        .ok_or_else(|| FrameError::MalformedRoute(format!("no ':' in {route:?}")))?;

    Ok(Route {
        endpoint: decode_endpoint(endpoint, mode)?,
        header: decode_header(header, mode)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_token_is_string_bytes() {
        // "hi" -> count 2, 'h', 'i'
        assert_eq!(encode_endpoint("hi").unwrap(), "(0x026869)");
        assert_eq!(decode_endpoint("(0x026869)", TokenMode::Strict).unwrap(), "hi");
    }

    #[test]
    fn route_roundtrip() {
        let header = FragmentHeader::new("0a1b2c3d", 2, true);
        let route = format_route("chat.lobby", &header).unwrap();
        assert_eq!(route.matches(ROUTE_SEPARATOR).count(), 1);

        let parsed = parse_route(&route, TokenMode::Strict).unwrap();
        assert_eq!(parsed.endpoint, "chat.lobby");
        assert_eq!(parsed.header, header);
    }

    #[test]
    fn endpoint_with_colon_stays_inside_token() {
        let header = FragmentHeader::new("g", 0, true);
        let route = format_route("a:b", &header).unwrap();
        assert_eq!(parse_route(&route, TokenMode::Strict).unwrap().endpoint, "a:b");
    }

    #[test]
    fn missing_separator_is_malformed() {
        let err = parse_route("(0x00)", TokenMode::Strict).unwrap_err();
        assert!(matches!(err, FrameError::MalformedRoute(_)));
    }

    #[test]
    fn bad_endpoint_token_is_strict_error() {
        let header = encode_header(&FragmentHeader::new("g", 0, true)).unwrap();
        let err = parse_route(&format!("nope:{header}"), TokenMode::Strict).unwrap_err();
        assert!(matches!(err, FrameError::MalformedToken(_)));
    }

    #[test]
    fn lenient_bad_endpoint_token_underflows() {
        let header = encode_header(&FragmentHeader::new("g", 0, true)).unwrap();
        let err = parse_route(&format!("nope:{header}"), TokenMode::Lenient).unwrap_err();
        assert!(matches!(err, FrameError::Serial(_)));
    }
}
