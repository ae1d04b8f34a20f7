//! Input format handling: name-based detection and stream decoding.

pub mod compression;
pub mod detect;

// Re-export main types for convenience
pub use compression::CompressionKind;
pub use compression::Decoder;
pub use compression::open_decoder;
pub use detect::ContainerKind;
pub use detect::Detection;
pub use detect::detect;
