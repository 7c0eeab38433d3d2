mod document;
mod error;
mod transform;
mod xml;

pub use document::{ATTR_PREFIX, Document, Element, Node, TEXT_KEY};
pub use error::DomainError;
pub use transform::{DomainTransform, Identity};
