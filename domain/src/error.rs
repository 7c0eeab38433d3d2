use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("domain description is not valid utf-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("xml attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("domain description has no root element")]
    MissingRoot,

    #[error("domain description has more than one root element: {0}")]
    MultipleRoots(String),

    #[error("element not closed: {0}")]
    Unclosed(String),

    #[error("character data outside of the root element")]
    StrayText,

    #[error("attribute {0} does not hold a scalar value")]
    InvalidAttribute(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("path {path} is blocked by a scalar at {segment}")]
    PathConflict { path: String, segment: String },
}
