//! Plain-text shaping for extracted page text.
//!
//! - Normalization of raw clipped page text into paragraphs
//! - Paragraph extraction from a start offset
//! - Length-bounded trimming of caption bodies

mod normalize;
mod paragraphs;
mod trim;

pub use normalize::normalize;
pub use paragraphs::extract_paragraphs;
pub use trim::trim_message;
