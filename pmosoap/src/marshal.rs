//! Pont entre les arguments d'une action et leur fragment XML
//!
//! Les payloads sont (dé)sérialisés par `quick_xml::se` / `quick_xml::de` à
//! partir des attributs serde posés sur leurs champs (`rename`, `@attr`,
//! `$text`, `$value`...). Seul le *contenu* de l'élément d'action est produit
//! ou consommé : l'élément `<u:Action>` lui-même est écrit à la main par
//! l'enveloppe.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{DecodeError, MarshalError};

/// Élément racine temporaire entourant le contenu d'un payload
const PAYLOAD_ROOT: &str = "payload";

/// Capacité de sérialiser des arguments en contenu XML
pub trait Marshal {
    /// Retourne le contenu XML (sans élément englobant)
    fn marshal(&self) -> Result<String, MarshalError>;
}

/// Capacité de reconstruire des arguments à partir d'un contenu XML
pub trait Unmarshal: Sized {
    fn unmarshal(content: &str) -> Result<Self, DecodeError>;
}

impl<T> Marshal for T
where
    T: Serialize + ?Sized,
{
    fn marshal(&self) -> Result<String, MarshalError> {
        let xml = quick_xml::se::to_string_with_root(PAYLOAD_ROOT, self)
            .map_err(|e| MarshalError::Serialize(e.to_string()))?;
        inner_content(&xml).map(str::to_string)
    }
}

impl<T> Unmarshal for T
where
    T: DeserializeOwned,
{
    fn unmarshal(content: &str) -> Result<Self, DecodeError> {
        let xml = format!("<{PAYLOAD_ROOT}>{content}</{PAYLOAD_ROOT}>");
        Ok(quick_xml::de::from_str(&xml)?)
    }
}

/// Extrait le contenu de l'élément racine produit par le sérialiseur
///
/// Le sérialiseur doit produire un unique élément `<payload>` : les
/// énumérations (élément nommé d'après le variant) et les séquences
/// (plusieurs éléments) ne survivraient pas à la relecture.
fn inner_content(xml: &str) -> Result<&str, MarshalError> {
    let mut reader = Reader::from_str(xml);
    let content = loop {
        match reader.read_event()? {
            Event::Start(e) => {
                check_root(&e)?;
                let span = reader.read_to_end(e.name())?;
                break &xml[span.start as usize..span.end as usize];
            }
            Event::Empty(e) => {
                check_root(&e)?;
                break "";
            }
            Event::Eof => return Ok(""),
            _ => {}
        }
    };

    loop {
        match reader.read_event()? {
            Event::Eof => return Ok(content),
            Event::Text(t) if t.iter().all(u8::is_ascii_whitespace) => {}
            Event::Comment(_) => {}
            _ => return Err(MarshalError::MultipleElements),
        }
    }
}

fn check_root(e: &BytesStart<'_>) -> Result<(), MarshalError> {
    if e.name().as_ref() != PAYLOAD_ROOT.as_bytes() {
        return Err(MarshalError::UnsupportedRoot(
            String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        ));
    }
    if e.attributes().next().is_some() {
        return Err(MarshalError::WrapperAttributes);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct SetVolume {
        #[serde(rename = "InstanceID")]
        instance_id: u32,
        #[serde(rename = "Channel")]
        channel: String,
        #[serde(rename = "DesiredVolume")]
        desired_volume: u16,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stop {}

    #[derive(Serialize)]
    enum Choice {
        A { x: u32 },
    }

    #[derive(Serialize)]
    struct WithAttribute {
        #[serde(rename = "@id")]
        id: u32,
    }

    #[test]
    fn test_marshal_fields_without_wrapper() {
        let args = SetVolume {
            instance_id: 0,
            channel: "Master".to_string(),
            desired_volume: 25,
        };

        let xml = args.marshal().unwrap();
        assert_eq!(
            xml,
            "<InstanceID>0</InstanceID><Channel>Master</Channel><DesiredVolume>25</DesiredVolume>"
        );
    }

    #[test]
    fn test_marshal_empty_struct() {
        assert_eq!(Stop {}.marshal().unwrap(), "");
    }

    #[test]
    fn test_marshal_escapes_text() {
        let args = SetVolume {
            instance_id: 1,
            channel: "L&R".to_string(),
            desired_volume: 3,
        };

        let xml = args.marshal().unwrap();
        assert!(xml.contains("<Channel>L&amp;R</Channel>"));
    }

    #[test]
    fn test_marshal_rejects_wrapper_attributes() {
        let err = WithAttribute { id: 3 }.marshal().unwrap_err();
        assert!(matches!(err, MarshalError::WrapperAttributes));
    }

    #[test]
    fn test_marshal_rejects_sequences() {
        let err = vec![1u32, 2, 3].marshal().unwrap_err();
        assert!(matches!(err, MarshalError::MultipleElements));
    }

    #[test]
    fn test_marshal_rejects_enum_variants() {
        let err = Choice::A { x: 5 }.marshal().unwrap_err();
        assert!(matches!(err, MarshalError::UnsupportedRoot(ref name) if name == "A"));
    }

    #[test]
    fn test_marshal_primitive() {
        assert_eq!(42u32.marshal().unwrap(), "42");
    }

    #[test]
    fn test_unmarshal_content() {
        let args = SetVolume::unmarshal(
            "<InstanceID>0</InstanceID><Channel>Master</Channel><DesiredVolume>25</DesiredVolume>",
        )
        .unwrap();

        assert_eq!(args.channel, "Master");
        assert_eq!(args.desired_volume, 25);
    }

    #[test]
    fn test_unmarshal_missing_field_fails() {
        let err = SetVolume::unmarshal("<InstanceID>0</InstanceID>").unwrap_err();
        assert!(matches!(err, DecodeError::Deserialize(_)));
    }
}
