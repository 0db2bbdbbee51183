use crate::error::{Result, TransportError};

/// Separator between route and payload in the line format.
pub const FIELD_SEPARATOR: char = '\t';

/// One fragment in flight: where it goes and what it carries.
///
/// `route` is `endpointToken:headerToken`; `payload` is a single fragment
/// of packetized text. Neither ever contains a tab or a newline, which is
/// what makes the one-line-per-delivery format unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delivery {
    pub route: String,
    pub payload: String,
}

impl Delivery {
    pub fn new(route: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            payload: payload.into(),
        }
    }

    /// Render as `route<TAB>payload` without a trailing newline.
    pub fn to_line(&self) -> String {
        let mut line = String::with_capacity(self.route.len() + 1 + self.payload.len());
        line.push_str(&self.route);
        line.push(FIELD_SEPARATOR);
        line.push_str(&self.payload);
        line
    }

    /// Parse one line produced by [`to_line`](Self::to_line).
    ///
    /// A trailing `\n` or `\r\n` is ignored.
    pub fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let (route, payload) = line
            .split_once(FIELD_SEPARATOR)
            .ok_or_else(|| TransportError::MalformedLine("missing tab separator".to_string()))?;

        if route.is_empty() {
            return Err(TransportError::MalformedLine("empty route".to_string()));
        }
        if payload.contains(FIELD_SEPARATOR) {
            return Err(TransportError::MalformedLine(
                "payload contains a tab".to_string(),
            ));
        }

        Ok(Self::new(route, payload))
    }
}
