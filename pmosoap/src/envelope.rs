//! Structures de l'enveloppe SOAP

use std::fmt;

/// Namespace de l'enveloppe SOAP 1.1
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// URI du style d'encodage SOAP standard
pub const SOAP_ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// Nom qualifié d'un élément XML (namespace + nom local)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QualifiedName {
    /// URI du namespace (ex: "urn:schemas-upnp-org:service:AVTransport:1")
    pub namespace: String,

    /// Nom local (ex: "GetPositionInfo")
    pub local: String,
}

impl QualifiedName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

/// Action SOAP : un nom qualifié et ses arguments
///
/// Le payload est un type quelconque capable de se (dé)sérialiser en
/// fragment XML (voir [`Marshal`](crate::Marshal) et
/// [`Unmarshal`](crate::Unmarshal)). L'enveloppe ne conserve aucune
/// référence au payload après l'appel.
#[derive(Debug, Clone, PartialEq)]
pub struct Action<T> {
    /// Identifie l'action : namespace du service et nom de l'action
    pub name: QualifiedName,

    /// Arguments de l'action
    pub payload: T,
}

impl<T> Action<T> {
    /// Crée une nouvelle action
    pub fn new(namespace: impl Into<String>, local: impl Into<String>, payload: T) -> Self {
        Self {
            name: QualifiedName::new(namespace, local),
            payload,
        }
    }

    /// Consomme l'action et retourne ses arguments
    pub fn into_payload(self) -> T {
        self.payload
    }
}
