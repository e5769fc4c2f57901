use std::io;

use crate::fault::Fault;

/// Erreur retournée par les fonctions de lecture/écriture d'enveloppe
#[derive(thiserror::Error, Debug)]
pub enum SoapError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SOAP marshal error: {0}")]
    Marshal(#[from] MarshalError),

    #[error("SOAP decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Le pair a traité la requête et l'a explicitement rejetée
    #[error(transparent)]
    Fault(#[from] Fault),
}

impl SoapError {
    pub fn is_fault(&self) -> bool {
        matches!(self, SoapError::Fault(_))
    }

    pub fn as_fault(&self) -> Option<&Fault> {
        match self {
            SoapError::Fault(fault) => Some(fault),
            _ => None,
        }
    }

    /// Retourne le fault, ou l'erreur d'origine si ce n'en est pas un
    pub fn into_fault(self) -> Result<Fault, SoapError> {
        match self {
            SoapError::Fault(fault) => Ok(fault),
            other => Err(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum MarshalError {
    #[error("action {0} must not be empty")]
    EmptyName(&'static str),

    #[error("payload serialization failed: {0}")]
    Serialize(String),

    #[error("payload cannot carry attributes on the action element")]
    WrapperAttributes,

    #[error("payload must serialize as a single element, not <{0}>")]
    UnsupportedRoot(String),

    #[error("payload serializes to several elements")]
    MultipleElements,

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid UTF-8 in envelope: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("payload deserialization failed: {0}")]
    Deserialize(#[from] quick_xml::de::DeError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("expected SOAP Envelope, found <{0}>")]
    UnexpectedRoot(String),

    #[error("Missing SOAP Body")]
    MissingBody,

    #[error("unexpected end of document")]
    UnexpectedEof,

    #[error("No action found in SOAP Body")]
    MissingAction,

    #[error("envelope exceeds {limit} bytes")]
    EnvelopeTooLarge { limit: usize },
}
