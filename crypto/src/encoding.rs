//! Byte buffer encodings for transporting envelopes and keys.
//!
//! Encoding is purely presentational: the envelope layout is defined over raw
//! bytes and every encoding round-trips exactly.

use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output encoding for encrypted envelopes and exported keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputEncoding {
    /// Bytes passed through unchanged
    Raw,
    /// Lowercase hexadecimal
    #[default]
    Hex,
    /// Standard base64 with padding
    Base64,
    /// Every byte written as `\xHH`
    EscapedHex,
}

impl OutputEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            OutputEncoding::Raw => "raw",
            OutputEncoding::Hex => "hex",
            OutputEncoding::Base64 => "base64",
            OutputEncoding::EscapedHex => "escaped-hex",
        }
    }
}

impl fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputEncoding {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" | "binary" => Ok(OutputEncoding::Raw),
            "hex" => Ok(OutputEncoding::Hex),
            "base64" | "b64" => Ok(OutputEncoding::Base64),
            "escaped-hex" | "escaped_hex" | "escapedhex" => Ok(OutputEncoding::EscapedHex),
            _ => Err(CryptoError::ConfigurationError(format!(
                "Unknown output encoding: {}. Valid options: raw, hex, base64, escaped-hex",
                s
            ))),
        }
    }
}

/// Encode raw bytes. Total for every encoding.
pub fn encode(bytes: &[u8], encoding: OutputEncoding) -> Vec<u8> {
    match encoding {
        OutputEncoding::Raw => bytes.to_vec(),
        OutputEncoding::Hex => hex::encode(bytes).into_bytes(),
        OutputEncoding::Base64 => BASE64.encode(bytes).into_bytes(),
        OutputEncoding::EscapedHex => {
            let mut out = Vec::with_capacity(bytes.len() * 4);
            for byte in bytes {
                out.extend_from_slice(b"\\x");
                out.extend_from_slice(hex::encode([*byte]).as_bytes());
            }
            out
        }
    }
}

/// Decode text produced by [`encode`] back into raw bytes.
///
/// # Errors
///
/// Returns [`CryptoError::DecodingError`] on malformed hex, base64 or
/// escaped-hex input.
pub fn decode(input: &[u8], encoding: OutputEncoding) -> CryptoResult<Vec<u8>> {
    match encoding {
        OutputEncoding::Raw => Ok(input.to_vec()),
        OutputEncoding::Hex => hex::decode(input)
            .map_err(|e| CryptoError::DecodingError(format!("Invalid hex: {}", e))),
        OutputEncoding::Base64 => BASE64
            .decode(input)
            .map_err(|e| CryptoError::DecodingError(format!("Invalid base64: {}", e))),
        OutputEncoding::EscapedHex => decode_escaped_hex(input),
    }
}

fn decode_escaped_hex(input: &[u8]) -> CryptoResult<Vec<u8>> {
    if input.len() % 4 != 0 {
        return Err(CryptoError::DecodingError(format!(
            "Escaped hex length must be a multiple of 4, got {}",
            input.len()
        )));
    }

    let mut out = Vec::with_capacity(input.len() / 4);
    for (index, group) in input.chunks_exact(4).enumerate() {
        match group {
            [b'\\', b'x', hi, lo] => {
                let mut byte = [0u8; 1];
                hex::decode_to_slice([*hi, *lo], &mut byte).map_err(|e| {
                    CryptoError::DecodingError(format!(
                        "Invalid hex digits in group {}: {}",
                        index, e
                    ))
                })?;
                out.extend_from_slice(&byte);
            }
            _ => {
                return Err(CryptoError::DecodingError(format!(
                    "Group {} does not start with \\x",
                    index
                )))
            }
        }
    }

    Ok(out)
}
