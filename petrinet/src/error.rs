use std::io;

use crate::pnml::PnmlConfigBuilderError;

#[derive(thiserror::Error, Debug)]
pub enum PetriError {
    #[error("Invalid node name: '{0}'")]
    InvalidName(String),
    #[error("Unknown node: '{0}'")]
    UnknownNode(String),
    #[error("Cannot connect '{from}' to '{to}': arcs must join a place and a transition")]
    IncompatibleConnection { from: String, to: String },
    #[error("Node not found: '{0}'")]
    NodeNotFound(String),
    #[error("Illegal connection: {0}")]
    IllegalConnection(String),
    #[error("Malformed PNML document: {0}")]
    MalformedDocument(String),
    #[error("Filesystem error: {0}")]
    IOError(#[from] io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] PnmlConfigBuilderError),
}

impl From<quick_xml::Error> for PetriError {
    fn from(err: quick_xml::Error) -> Self {
        PetriError::MalformedDocument(err.to_string())
    }
}

impl From<quick_xml::DeError> for PetriError {
    fn from(err: quick_xml::DeError) -> Self {
        PetriError::MalformedDocument(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PetriError>;
