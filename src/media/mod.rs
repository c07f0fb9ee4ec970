/// Story media module
///
/// This module handles:
/// - Reading picked files and validating type and size (source.rs)
/// - Decoding, downscaling and JPEG-encoding uploads (encoder.rs)

pub mod encoder;
pub mod source;
