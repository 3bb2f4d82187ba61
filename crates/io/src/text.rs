// Source file byte decoding

use std::path::Path;

use serde::{Deserialize, Serialize};

/// How source bytes become text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceEncoding {
    /// UTF-8; invalid sequences become U+FFFD.
    #[default]
    Utf8,
    /// Legacy exports written by Windows tooling.
    Windows1252,
}

/// Read a source file, never failing on undecodable bytes.
pub fn read_source(path: &Path, encoding: SourceEncoding) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    let text = decode_bytes(&bytes, encoding);
    if text.contains('\u{FFFD}') {
        log::debug!("{}: undecodable bytes replaced", path.display());
    }
    Ok(text)
}

pub fn decode_bytes(bytes: &[u8], encoding: SourceEncoding) -> String {
    let (decoded, _, _) = match encoding {
        SourceEncoding::Utf8 => encoding_rs::UTF_8.decode(bytes),
        SourceEncoding::Windows1252 => encoding_rs::WINDOWS_1252.decode(bytes),
    };
    decoded.into_owned()
}
