//! Response helpers

pub mod data_url;

pub use data_url::{data_url, data_url_from_bytes, encode_base64};
