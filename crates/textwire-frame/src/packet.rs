use textwire_serial::{ByteBuffer, Unit};

use crate::error::{FrameError, Result};

/// Default per-fragment budget in size units.
pub const DEFAULT_FRAGMENT_BUDGET: usize = 2048;

/// Smallest usable budget: the cost of the widest single unit.
pub const MIN_FRAGMENT_BUDGET: usize = 4;

/// Follows the hex pair of an odd trailing byte in the last fragment.
pub const ODD_TAIL_MARKER: char = '.';

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

// Code units in the surrogate range are not Rust chars; they travel in the
// first supplementary plane instead.
const SURROGATE_START: u32 = 0xD800;
const SURROGATE_END: u32 = 0xDFFF;
const SURROGATE_ESCAPE_BASE: u32 = 0x1_0000;

/// Configuration for the packetizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketConfig {
    /// Maximum cost of one fragment. Default: 2048.
    pub budget: usize,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_FRAGMENT_BUDGET,
        }
    }
}

/// Splits a byte buffer into text-safe fragments and joins them back.
///
/// Bytes are taken in pairs as 16-bit units `low | high << 8`:
/// ```text
/// unit <= 0xFF             -> two uppercase hex digits          cost 2
/// 0x100..=0xFFFF           -> the char U+unit                   cost 2-3
/// 0xD800..=0xDFFF          -> the char U+10000 + (unit-0xD800)  cost 4
/// odd trailing byte b      -> hex(b) followed by '.'            cost 3
/// ```
/// A unit's cost is the UTF-8 width of the text it becomes, so a
/// fragment's total cost is its length in bytes. A unit that would push the
/// current fragment past the budget starts a new fragment instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketEncoder {
    budget: usize,
}

impl PacketEncoder {
    pub fn new(budget: usize) -> Result<Self> {
        if budget < MIN_FRAGMENT_BUDGET {
            return Err(FrameError::BudgetTooSmall {
                budget,
                min: MIN_FRAGMENT_BUDGET,
            });
        }
        Ok(Self { budget })
    }

    pub fn with_config(config: &PacketConfig) -> Result<Self> {
        Self::new(config.budget)
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Packetize the written region of `buf`.
    ///
    /// Always returns at least one fragment; an empty buffer yields `[""]`.
    /// Reports one [`Unit::PacketUnit`] checkpoint per unit on `buf`.
    pub fn encode(&self, buf: &mut ByteBuffer) -> Vec<String> {
        let bytes = buf.to_bytes();
        let mut fragments = Vec::new();
        let mut current = String::new();

        for pair in bytes.chunks(2) {
            buf.checkpoint(Unit::PacketUnit);
            let before = current.len();
            let mut piece = String::with_capacity(4);
            match *pair {
                [low, high] => push_unit(&mut piece, u16::from(low) | u16::from(high) << 8),
                [tail, ..] => {
                    push_hex(&mut piece, tail);
                    piece.push(ODD_TAIL_MARKER);
                }
                [] => continue,
            }

            if before + piece.len() > self.budget {
                fragments.push(std::mem::take(&mut current));
            }
            current.push_str(&piece);
        }

        fragments.push(current);
        fragments
    }

    /// Decode fragments, in index order, into a new buffer.
    pub fn decode<S: AsRef<str>>(&self, fragments: &[S]) -> Result<ByteBuffer> {
        decode_fragments(fragments)
    }
}

impl Default for PacketEncoder {
    fn default() -> Self {
        Self {
            budget: DEFAULT_FRAGMENT_BUDGET,
        }
    }
}

/// Decode fragments, in index order, into a new buffer.
pub fn decode_fragments<S: AsRef<str>>(fragments: &[S]) -> Result<ByteBuffer> {
    let mut out = ByteBuffer::new();
    decode_fragments_into(fragments, &mut out)?;
    Ok(out)
}

/// Decode fragments, in index order, appending to `out`.
///
/// Reports one [`Unit::PacketUnit`] checkpoint per decoded unit on `out`.
pub fn decode_fragments_into<S: AsRef<str>>(fragments: &[S], out: &mut ByteBuffer) -> Result<()> {
    let last = fragments.len().saturating_sub(1);
    for (index, fragment) in fragments.iter().enumerate() {
        let malformed = |reason: String| FrameError::MalformedFragment { index, reason };
        let mut chars = fragment.as_ref().chars().peekable();

        while let Some(c) = chars.next() {
            out.checkpoint(Unit::PacketUnit);
            let code = u32::from(c);

            if code <= 0xFF {
                let high = hex_value(c)
                    .ok_or_else(|| malformed(format!("unexpected character {c:?}")))?;
                let second = chars
                    .next()
                    .ok_or_else(|| malformed("dangling hex digit".to_string()))?;
                let low = hex_value(second)
                    .ok_or_else(|| malformed(format!("unexpected character {second:?}")))?;
                let byte = (high << 4) | low;

                if chars.peek() == Some(&ODD_TAIL_MARKER) {
                    chars.next();
                    if index != last || chars.peek().is_some() {
                        return Err(malformed(
                            "odd-length marker before end of message".to_string(),
                        ));
                    }
                    out.write_u8(byte);
                } else {
                    out.write_slice(&[byte, 0]);
                }
            } else if code > 0xFFFF {
                let unit = code - SURROGATE_ESCAPE_BASE + SURROGATE_START;
                if unit > SURROGATE_END {
                    return Err(malformed(format!("unexpected character {c:?}")));
                }
                out.write_slice(&[(unit & 0xFF) as u8, (unit >> 8) as u8]);
            } else {
                out.write_slice(&[(code & 0xFF) as u8, (code >> 8) as u8]);
            }
        }
    }
    Ok(())
}

/// Cost of one fragment under the packetizer's cost model.
pub fn fragment_cost(fragment: &str) -> usize {
    fragment.len()
}

/// Cost of the text a single 16-bit unit becomes.
pub fn unit_cost(unit: u16) -> usize {
    let mut text = String::with_capacity(4);
    push_unit(&mut text, unit);
    text.len()
}

fn push_unit(out: &mut String, unit: u16) {
    let code = u32::from(unit);
    if code <= 0xFF {
        push_hex(out, unit as u8);
        return;
    }
    let escaped = if (SURROGATE_START..=SURROGATE_END).contains(&code) {
        code - SURROGATE_START + SURROGATE_ESCAPE_BASE
    } else {
        code
    };
    // Every value reaching here is a valid scalar by construction.
    if let Some(c) = char::from_u32(escaped) {
        out.push(c);
    }
}

fn push_hex(out: &mut String, byte: u8) {
    out.push(HEX_DIGITS[usize::from(byte >> 4)] as char);
    out.push(HEX_DIGITS[usize::from(byte & 0x0F)] as char);
}

fn hex_value(c: char) -> Option<u8> {
    match c {
        '0'..='9' => Some(c as u8 - b'0'),
        'A'..='F' => Some(c as u8 - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(bytes: &[u8], budget: usize) -> Vec<String> {
        let mut buf = ByteBuffer::from_bytes(bytes);
        PacketEncoder::new(budget).unwrap().encode(&mut buf)
    }

    fn roundtrip(bytes: &[u8], budget: usize) {
        let fragments = encode(bytes, budget);
        for fragment in &fragments {
            assert!(
                fragment_cost(fragment) <= budget,
                "fragment {fragment:?} over budget {budget}"
            );
        }
        let decoded = decode_fragments(&fragments).unwrap();
        assert_eq!(decoded.as_written(), bytes, "budget {budget}");
    }

    #[test]
    fn empty_buffer_is_one_empty_fragment() {
        assert_eq!(encode(&[], DEFAULT_FRAGMENT_BUDGET), vec![String::new()]);
        let decoded = decode_fragments(&[""]).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn small_units_become_hex() {
        // unit 0x00AB -> "AB"
        assert_eq!(encode(&[0xAB, 0x00], 16), vec!["AB".to_string()]);
    }

    #[test]
    fn large_units_become_one_char() {
        // unit 0x4E2D -> '中'
        assert_eq!(encode(&[0x2D, 0x4E], 16), vec!["中".to_string()]);
        // unit 0x0141 -> 'Ł' (two UTF-8 bytes)
        assert_eq!(unit_cost(0x0141), 2);
        assert_eq!(unit_cost(0x4E2D), 3);
        assert_eq!(unit_cost(0x00FF), 2);
    }

    #[test]
    fn surrogate_units_are_escaped() {
        let fragments = encode(&[0x00, 0xD8, 0xFF, 0xDF], 16);
        assert_eq!(fragments[0].chars().count(), 2);
        assert_eq!(unit_cost(0xD800), 4);
        roundtrip(&[0x00, 0xD8, 0xFF, 0xDF], 16);
    }

    #[test]
    fn odd_tail_keeps_exact_length() {
        let fragments = encode(&[0x01, 0x02, 0x03], 16);
        assert_eq!(fragments, vec!["ȁ03.".to_string()]);
        roundtrip(&[0x03], 4);
        roundtrip(&[0x10, 0x00, 0x07], 4);
    }

    #[test]
    fn trailing_zero_byte_survives() {
        roundtrip(&[0x05, 0x00], 4);
        roundtrip(&[0x05, 0x00, 0x00], 4);
    }

    #[test]
    fn splits_when_budget_would_be_exceeded() {
        // Four hex units of cost 2 with budget 5 -> fragments of two units.
        let fragments = encode(&[1, 0, 2, 0, 3, 0, 4, 0], 5);
        assert_eq!(fragments, vec!["0102", "0304"]);
    }

    #[test]
    fn roundtrip_across_budgets() {
        let bytes: Vec<u8> = (0..=255u8).chain((0..=255u8).rev()).chain([7]).collect();
        for budget in [4, 5, 6, 7, 16, 100, DEFAULT_FRAGMENT_BUDGET] {
            roundtrip(&bytes, budget);
        }
    }

    #[test]
    fn large_buffer_splits_into_many_fragments() {
        let bytes: Vec<u8> = (0..20_000u32).map(|i| (i * 7919 % 251) as u8).collect();
        let fragments = encode(&bytes, DEFAULT_FRAGMENT_BUDGET);
        assert!(fragments.len() > 1);
        roundtrip(&bytes, DEFAULT_FRAGMENT_BUDGET);
    }

    #[test]
    fn budget_below_minimum_is_rejected() {
        let err = PacketEncoder::new(3).unwrap_err();
        assert!(matches!(err, FrameError::BudgetTooSmall { budget: 3, min: 4 }));
    }

    #[test]
    fn stray_character_is_malformed() {
        let err = decode_fragments(&["0G"]).unwrap_err();
        assert!(matches!(err, FrameError::MalformedFragment { index: 0, .. }));
        let err = decode_fragments(&["ab"]).unwrap_err();
        assert!(matches!(err, FrameError::MalformedFragment { .. }));
    }

    #[test]
    fn dangling_hex_digit_is_malformed() {
        let err = decode_fragments(&["01", "A"]).unwrap_err();
        assert!(matches!(err, FrameError::MalformedFragment { index: 1, .. }));
    }

    #[test]
    fn misplaced_odd_marker_is_malformed() {
        let err = decode_fragments(&["03.", "01"]).unwrap_err();
        assert!(matches!(err, FrameError::MalformedFragment { index: 0, .. }));
        let err = decode_fragments(&["03.01"]).unwrap_err();
        assert!(matches!(err, FrameError::MalformedFragment { .. }));
    }

    #[test]
    fn escape_beyond_surrogate_range_is_malformed() {
        let err = decode_fragments(&["\u{10800}"]).unwrap_err();
        assert!(matches!(err, FrameError::MalformedFragment { .. }));
    }

    #[test]
    fn checkpoint_per_unit() {
        let mut buf = ByteBuffer::from_bytes(&[1, 2, 3, 4, 5]);
        PacketEncoder::default().encode(&mut buf);
        assert_eq!(buf.checkpoints(), 3);
    }

    #[test]
    fn config_default_budget() {
        let encoder = PacketEncoder::with_config(&PacketConfig::default()).unwrap();
        assert_eq!(encoder.budget(), DEFAULT_FRAGMENT_BUDGET);
    }
}
