pub mod signature;
pub mod signature_header;

pub use signature::{constant_time_eq, format_signature_header, sign};
pub use signature_header::SignatureHeader;
