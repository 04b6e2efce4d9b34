//! Text file decoding with an ordered encoding chain.

use std::path::Path;

use encoding_rs::Encoding;

/// Returned when a text attachment cannot be read or decoded.
pub const UNREADABLE_TEXT_PLACEHOLDER: &str = "[unable to read file]";

/// Resolve WHATWG encoding labels, dropping (and logging) unknown ones.
pub fn resolve_encodings(labels: &[String]) -> Vec<&'static Encoding> {
    labels
        .iter()
        .filter_map(|label| {
            let encoding = Encoding::for_label(label.as_bytes());
            if encoding.is_none() {
                tracing::warn!(label = %label, "Ignoring unknown text encoding");
            }
            encoding
        })
        .collect()
}

/// Decode `bytes` with the first encoding that yields no malformed sequences.
pub fn decode_with_chain(bytes: &[u8], chain: &[&'static Encoding]) -> Option<String> {
    chain.iter().find_map(|encoding| {
        encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| {
                tracing::trace!(encoding = encoding.name(), "Decoded text attachment");
                text.into_owned()
            })
    })
}

/// Read and decode a text file, degrading to the placeholder on any failure.
pub fn read_text_file(path: &Path, chain: &[&'static Encoding]) -> String {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read text attachment");
            return UNREADABLE_TEXT_PLACEHOLDER.to_string();
        }
    };

    decode_with_chain(&bytes, chain).unwrap_or_else(|| {
        tracing::warn!(path = %path.display(), "No encoding could decode text attachment");
        UNREADABLE_TEXT_PLACEHOLDER.to_string()
    })
}
