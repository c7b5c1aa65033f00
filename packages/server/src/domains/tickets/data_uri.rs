//! `data:<type>;base64,<payload>` helpers for self-contained artifacts.

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub fn encode(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
}

/// Split a data URI into its content type and decoded bytes.
pub fn decode(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| anyhow!("not a data URI"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| anyhow!("data URI has no payload separator"))?;
    let content_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| anyhow!("only base64 data URIs are supported"))?;

    let bytes = STANDARD
        .decode(payload)
        .context("data URI payload is not valid base64")?;

    Ok((content_type.to_string(), bytes))
}
