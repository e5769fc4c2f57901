//! SOAP Faults

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::marshal::Unmarshal;

/// Namespace du bloc `<UPnPError>` porté par le détail d'un fault UPnP
pub const UPNP_CONTROL_NS: &str = "urn:schemas-upnp-org:control-1-0";

/// Erreur SOAP (Fault) renvoyée par le pair
///
/// Un fault décodé n'est jamais un succès : la lecture d'enveloppe le
/// retourne toujours comme erreur ([`SoapError::Fault`](crate::SoapError::Fault)).
#[derive(Debug, Clone, PartialEq, Eq, Default, thiserror::Error)]
#[error("SOAP fault code={code}: {string}")]
pub struct Fault {
    /// Code du fault (ex: "s:Client", "s:Server")
    pub code: String,

    /// Description lisible de l'erreur
    pub string: String,

    /// Origine du fault dans la chaîne de traitement
    pub actor: Option<String>,

    /// Détails applicatifs, conservés tels quels
    pub detail: FaultDetail,
}

/// Contenu XML brut de l'élément `<detail>`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FaultDetail {
    raw: Vec<u8>,
}

/// Erreur UPnP spécifique, transportée dans `<detail><UPnPError>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpnpError {
    /// Code d'erreur UPnP (ex: "401", "501")
    #[serde(rename = "errorCode")]
    pub error_code: String,

    /// Description de l'erreur
    #[serde(rename = "errorDescription", default)]
    pub error_description: String,
}

#[derive(Deserialize)]
struct UpnpErrorDetail {
    #[serde(rename = "UPnPError")]
    upnp_error: UpnpError,
}

impl Fault {
    /// Crée un fault SOAP simple
    pub fn new(code: impl Into<String>, string: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            string: string.into(),
            actor: None,
            detail: FaultDetail::default(),
        }
    }

    /// Crée le fault standard d'une action UPnP en échec
    pub fn upnp(error_code: &str, error_description: &str) -> Self {
        let detail = format!(
            r#"<UPnPError xmlns="{}"><errorCode>{}</errorCode><errorDescription>{}</errorDescription></UPnPError>"#,
            UPNP_CONTROL_NS,
            quick_xml::escape::escape(error_code),
            quick_xml::escape::escape(error_description),
        );
        Self::new("s:Client", "UPnPError").with_detail(FaultDetail::from_raw(detail))
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_detail(mut self, detail: FaultDetail) -> Self {
        self.detail = detail;
        self
    }

    /// Décode l'erreur UPnP du détail, si présente
    pub fn upnp_error(&self) -> Option<UpnpError> {
        if self.detail.is_empty() {
            return None;
        }
        self.detail
            .decode::<UpnpErrorDetail>()
            .ok()
            .map(|d| d.upnp_error)
    }
}

impl FaultDetail {
    pub fn from_raw(raw: impl Into<Vec<u8>>) -> Self {
        Self { raw: raw.into() }
    }

    /// Octets bruts du contenu de `<detail>`, non interprétés
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.raw).ok()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Désérialise le détail dans un type applicatif
    pub fn decode<T: Unmarshal>(&self) -> Result<T, DecodeError> {
        let content = std::str::from_utf8(&self.raw)?;
        T::unmarshal(content)
    }
}

/// Codes d'erreur SOAP UPnP standards
pub mod error_codes {
    /// Action invalide
    pub const INVALID_ACTION: &str = "401";

    /// Arguments invalides
    pub const INVALID_ARGS: &str = "402";

    /// Action échouée
    pub const ACTION_FAILED: &str = "501";

    /// Valeur d'argument invalide
    pub const ARGUMENT_VALUE_INVALID: &str = "600";

    /// Argument hors limites
    pub const ARGUMENT_VALUE_OUT_OF_RANGE: &str = "601";

    /// Action optionnelle non implémentée
    pub const OPTIONAL_ACTION_NOT_IMPLEMENTED: &str = "602";

    /// Mémoire insuffisante
    pub const OUT_OF_MEMORY: &str = "603";

    /// Intervention humaine requise
    pub const HUMAN_INTERVENTION_REQUIRED: &str = "604";

    /// Argument sous forme de chaîne trop long
    pub const STRING_ARGUMENT_TOO_LONG: &str = "605";
}
