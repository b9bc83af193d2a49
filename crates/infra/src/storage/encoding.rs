//! Text decoding and delimiter sniffing for files written by spreadsheet tools.

use std::borrow::Cow;

use encoding_rs::{Encoding, EUC_KR};

/// Decode a BOM-marked file (UTF-8 or UTF-16), then plain UTF-8, then CP949.
/// `None` when none of them fits.
pub fn decode(bytes: &[u8]) -> Option<String> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, malformed) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (!malformed).then(|| text.into_owned());
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.to_string());
    }
    // encoding_rs' EUC-KR is the Windows code page 949 superset Korean Excel writes.
    EUC_KR
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

/// Pick the delimiter that occurs most often on the first line.
/// Comma wins ties and lines with none of the candidates.
pub fn sniff_delimiter(text: &str) -> u8 {
    let first = text.lines().next().unwrap_or("");
    [b',', b'\t', b';']
        .into_iter()
        .map(|d| (d, first.bytes().filter(|b| *b == d).count()))
        .fold((b',', 0), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0
}
