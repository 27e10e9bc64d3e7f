//! # Attachments
//!
//! Stores uploaded images under one flat directory per category and hands back
//! the generated filename as the entity's image reference. On the read path a
//! reference is turned back into an absolute URL under the category's static
//! alias.

pub mod error;
pub mod store;

pub use error::AttachmentError;
pub use store::{AttachmentStore, ImageCategory, PublicOrigin, Upload};
