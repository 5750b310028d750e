pub mod hashing;
pub mod mime;

pub use hashing::{base64_encode, content_hash, data_url};
pub use mime::resolve_image_mime;
