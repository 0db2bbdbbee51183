//! Text-safe packetization and fragment routing.
//!
//! A serialized payload becomes a sequence of fragments, each a short
//! printable string no wider than the configured budget. Every fragment
//! travels with a route of the form `endpointToken:headerToken`:
//! - endpoint token: the endpoint name, string-serialized and hex-wrapped
//! - header token: guid, protocol version, index and final flag
//!
//! Tokens are `(0x` + uppercase hex pairs + `)`.

pub mod error;
pub mod header;
pub mod packet;
pub mod route;
pub mod token;

pub use error::{FrameError, Result};
pub use header::{
    decode_header, encode_header, new_guid, FragmentHeader, HeaderSerializer, GUID_LEN,
    PROTOCOL_VERSION,
};
pub use packet::{
    decode_fragments, decode_fragments_into, fragment_cost, unit_cost, PacketConfig,
    PacketEncoder, DEFAULT_FRAGMENT_BUDGET, MIN_FRAGMENT_BUDGET, ODD_TAIL_MARKER,
};
pub use route::{
    decode_endpoint, encode_endpoint, format_route, parse_route, Route, ROUTE_SEPARATOR,
};
pub use token::{
    decode_token, decode_token_with, encode_token, TokenMode, TOKEN_PREFIX, TOKEN_SUFFIX,
};
