//! Inline media encoding for JSON replies

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Encode raw bytes with the standard base64 alphabet
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Build a `data:` URL from an already base64-encoded payload
pub fn data_url(mime_type: &str, base64_payload: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_payload)
}

/// Encode raw bytes straight into a `data:` URL
pub fn data_url_from_bytes(mime_type: &str, bytes: &[u8]) -> String {
    data_url(mime_type, &encode_base64(bytes))
}

/// Strip content-type parameters (`image/png; charset=...` -> `image/png`)
pub fn essence(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
    if essence.is_empty() {
        None
    } else {
        Some(essence)
    }
}
