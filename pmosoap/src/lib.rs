//! # pmosoap - Enveloppes SOAP 1.1
//!
//! Encodage et décodage des enveloppes SOAP utilisées pour invoquer une
//! action UPnP, avec remontée des SOAP Faults comme erreurs.
//!
//! ## Fonctionnalités
//!
//! - ✅ Écriture d'enveloppes avec préfixes explicites (`s:` / `u:`)
//! - ✅ Arguments d'action génériques via serde + quick-xml
//! - ✅ Lecture d'enveloppes avec priorité au Fault
//! - ✅ Détail de fault conservé brut, décodable (ex: `UPnPError`)
//! - ✅ Écriture de SOAP Faults côté serveur
//!
//! ## Architecture
//!
//! - [`Action`] : nom qualifié + arguments
//! - [`Marshal`] / [`Unmarshal`] : (dé)sérialisation du contenu de l'action
//! - [`write`] / [`read`] : écriture et lecture d'enveloppes
//! - [`Fault`] : erreur SOAP renvoyée par le pair
//!
//! ## Example
//!
//! ```
//! use pmosoap::{Action, encode, decode};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Play {
//!     #[serde(rename = "InstanceID")]
//!     instance_id: u32,
//!     #[serde(rename = "Speed")]
//!     speed: String,
//! }
//!
//! let action = Action::new(
//!     "urn:schemas-upnp-org:service:AVTransport:1",
//!     "Play",
//!     Play { instance_id: 0, speed: "1".to_string() },
//! );
//! let bytes = encode(&action)?;
//!
//! let decoded: Action<Play> = decode(&bytes)?;
//! assert_eq!(decoded, action);
//! # Ok::<(), pmosoap::SoapError>(())
//! ```

mod config;
mod envelope;
mod error;
mod fault;
mod marshal;
mod reader;
mod writer;

pub use config::SoapConfig;
pub use envelope::{Action, QualifiedName, SOAP_ENCODING_STYLE, SOAP_ENVELOPE_NS};
pub use error::{DecodeError, MarshalError, SoapError};
pub use fault::{Fault, FaultDetail, UPNP_CONTROL_NS, UpnpError, error_codes};
pub use marshal::{Marshal, Unmarshal};
pub use reader::{decode, read, read_with_config};
pub use writer::{encode, write, write_fault};
