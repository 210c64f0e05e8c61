//! Text decoding for downloaded calendars.
//!
//! The portal has served the CSV exports as UTF-8 and as Big5 over the
//! years. Encodings are tried in a fixed order and the first clean decode
//! wins; nothing is decoded with replacement characters.

use encoding_rs::{Encoding, BIG5, UTF_8};

/// Encodings tried by [`decode_text`], in order.
///
/// `encoding_rs` implements the WHATWG Big5 table, which is a superset of
/// code page 950, so a separate CP950 attempt would never succeed where Big5
/// failed.
#[must_use]
pub fn decode_order() -> [&'static Encoding; 2] {
    [UTF_8, BIG5]
}

/// Decode `bytes` with the first encoding from [`decode_order`] that accepts them.
///
/// A UTF-8 byte order mark is kept in the output; the CSV reader strips it.
///
/// Returns the text and the encoding that produced it, or `None` if every
/// encoding rejected the input.
#[must_use]
pub fn decode_text(bytes: &[u8]) -> Option<(String, &'static Encoding)> {
    decode_order().into_iter().find_map(|encoding| {
        encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| (text.into_owned(), encoding))
    })
}

/// Names of the encodings in [`decode_order`], for error messages.
#[must_use]
pub fn decode_order_names() -> Vec<String> {
    decode_order()
        .iter()
        .map(|encoding| encoding.name().to_string())
        .collect()
}
