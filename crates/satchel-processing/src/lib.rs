//! Satchel Processing Library
//!
//! Content inspection for uploaded parts: MIME sniffing from a fixed-size
//! prefix and the allow-list check applied to the sniffed type.

pub mod sniff;
pub mod validator;

pub use sniff::{detect_content_type, SNIFF_LEN};
pub use validator::{ContentTypeValidator, ValidationError};
