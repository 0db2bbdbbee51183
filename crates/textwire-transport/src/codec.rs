use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::delivery::Delivery;
use crate::error::{Result, TransportError};

/// Default maximum encoded line length: 64 KiB.
pub const DEFAULT_MAX_LINE: usize = 64 * 1024;

/// Frames deliveries on a byte stream as `route<TAB>payload\n` lines.
#[derive(Debug, Clone)]
pub struct DeliveryCodec {
    max_line: usize,
}

impl DeliveryCodec {
    pub fn new() -> Self {
        Self::with_max_line(DEFAULT_MAX_LINE)
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self { max_line }
    }
}

impl Default for DeliveryCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for DeliveryCodec {
    type Item = Delivery;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Delivery>> {
        let Some(newline) = src.iter().position(|b| *b == b'\n') else {
            if src.len() > self.max_line {
                return Err(TransportError::LineTooLong {
                    len: src.len(),
                    max: self.max_line,
                });
            }
            return Ok(None); // Need more data
        };

        if newline > self.max_line {
            return Err(TransportError::LineTooLong {
                len: newline,
                max: self.max_line,
            });
        }

        let line = src.split_to(newline);
        src.advance(1);
        let text = std::str::from_utf8(&line)
            .map_err(|err| TransportError::MalformedLine(err.to_string()))?;
        Delivery::parse_line(text).map(Some)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Delivery>> {
        if let Some(delivery) = self.decode(src)? {
            return Ok(Some(delivery));
        }
        if src.is_empty() {
            return Ok(None);
        }
        // Final line without a terminating newline.
        let line = src.split();
        let text = std::str::from_utf8(&line)
            .map_err(|err| TransportError::MalformedLine(err.to_string()))?;
        Delivery::parse_line(text).map(Some)
    }
}

impl Encoder<Delivery> for DeliveryCodec {
    type Error = TransportError;

    fn encode(&mut self, item: Delivery, dst: &mut BytesMut) -> Result<()> {
        let line = item.to_line();
        if line.len() > self.max_line {
            return Err(TransportError::LineTooLong {
                len: line.len(),
                max: self.max_line,
            });
        }
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}
