//! Lecture d'enveloppes SOAP
//!
//! Le Body contient soit un `Fault`, soit l'élément de l'action. Un fault
//! présent l'emporte toujours : les arguments de l'action ne sont alors pas
//! désérialisés. L'élément d'action est repéré par sa position (premier
//! élément du Body qui n'est pas un fault) ; son nom n'est pas comparé à
//! celui de la requête.

use std::io::Read;
use std::ops::Range;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use tracing::debug;

use crate::config::SoapConfig;
use crate::envelope::{Action, QualifiedName, SOAP_ENVELOPE_NS};
use crate::error::{DecodeError, SoapError};
use crate::fault::{Fault, FaultDetail};
use crate::marshal::Unmarshal;

/// Contenu du Body avant interprétation
#[derive(Debug, Default)]
struct BodyContent {
    fault: Option<Fault>,
    action: Option<ActionSpan>,
}

/// Élément d'action repéré dans le Body
#[derive(Debug)]
struct ActionSpan {
    name: QualifiedName,
    content: Range<usize>,
}

/// Lit une enveloppe SOAP depuis un flux avec la configuration par défaut
///
/// Les erreurs proviennent du flux, du décodage XML, ou d'un [`Fault`]
/// retourné par le pair.
pub fn read<R, T>(stream: R) -> Result<Action<T>, SoapError>
where
    R: Read,
    T: Unmarshal,
{
    read_with_config(stream, &SoapConfig::default())
}

/// Lit une enveloppe SOAP en respectant les limites de `config`
pub fn read_with_config<R, T>(stream: R, config: &SoapConfig) -> Result<Action<T>, SoapError>
where
    R: Read,
    T: Unmarshal,
{
    let limit = config.max_envelope_size;
    let mut buf = Vec::new();
    stream
        .take(limit.saturating_add(1) as u64)
        .read_to_end(&mut buf)?;
    if buf.len() > limit {
        return Err(DecodeError::EnvelopeTooLarge { limit }.into());
    }
    decode(&buf)
}

/// Décode une enveloppe SOAP déjà en mémoire
pub fn decode<T: Unmarshal>(input: &[u8]) -> Result<Action<T>, SoapError> {
    let body = parse_envelope(input)?;

    if let Some(fault) = body.fault {
        debug!("SOAP fault received: {}", fault);
        return Err(fault.into());
    }

    let span = body.action.ok_or(DecodeError::MissingAction)?;
    let content = std::str::from_utf8(&input[span.content]).map_err(DecodeError::from)?;
    let payload = T::unmarshal(content)?;
    debug!("Decoded SOAP action {}", span.name);

    Ok(Action {
        name: span.name,
        payload,
    })
}

fn parse_envelope(input: &[u8]) -> Result<BodyContent, DecodeError> {
    let mut reader = NsReader::from_reader(input);

    let envelope = loop {
        let (ns, event) = reader.read_resolved_event()?;
        let in_soap = is_soap_namespace(&ns);
        match event {
            Event::Start(e) => {
                check_envelope(&e, in_soap)?;
                break e;
            }
            Event::Empty(e) => {
                check_envelope(&e, in_soap)?;
                return Err(DecodeError::MissingBody);
            }
            Event::Eof => return Err(DecodeError::MissingEnvelope),
            _ => {}
        }
    };

    let mut body = None;
    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let in_soap = is_soap_namespace(&ns);
        match event {
            Event::Start(e) if in_soap && e.local_name().as_ref() == b"Body" => {
                if body.is_none() {
                    body = Some(parse_body(&mut reader, input)?);
                } else {
                    reader.read_to_end(e.name())?;
                }
            }
            Event::Empty(e) if in_soap && e.local_name().as_ref() == b"Body" => {
                body.get_or_insert_with(BodyContent::default);
            }
            // Header et éléments inconnus
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(e) if e.name() == envelope.name() => break,
            Event::Eof => return Err(DecodeError::UnexpectedEof),
            _ => {}
        }
    }

    body.ok_or(DecodeError::MissingBody)
}

fn parse_body(reader: &mut NsReader<&[u8]>, input: &[u8]) -> Result<BodyContent, DecodeError> {
    let mut content = BodyContent::default();
    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let namespace = namespace_of(&ns);
        match event {
            Event::Start(e) if e.local_name().as_ref() == b"Fault" => {
                let fault = parse_fault(reader, input)?;
                content.fault.get_or_insert(fault);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"Fault" => {
                content.fault.get_or_insert_with(Fault::default);
            }
            Event::Start(e) => {
                let span = reader.read_to_end(e.name())?;
                if content.action.is_none() {
                    content.action = Some(ActionSpan {
                        name: qualified_name(&e, namespace)?,
                        content: span.start as usize..span.end as usize,
                    });
                }
            }
            Event::Empty(e) => {
                if content.action.is_none() {
                    content.action = Some(ActionSpan {
                        name: qualified_name(&e, namespace)?,
                        content: 0..0,
                    });
                }
            }
            Event::End(_) => return Ok(content),
            Event::Eof => return Err(DecodeError::UnexpectedEof),
            _ => {}
        }
    }
}

fn parse_fault(reader: &mut NsReader<&[u8]>, input: &[u8]) -> Result<Fault, DecodeError> {
    let mut fault = Fault::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let span = reader.read_to_end(e.name())?;
                let raw = &input[span.start as usize..span.end as usize];
                match e.local_name().as_ref() {
                    b"faultcode" => fault.code = text_content(raw)?,
                    b"faultstring" => fault.string = text_content(raw)?,
                    b"faultactor" => fault.actor = Some(text_content(raw)?),
                    b"detail" => fault.detail = FaultDetail::from_raw(raw),
                    _ => {}
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == b"faultactor" => {
                fault.actor = Some(String::new());
            }
            Event::End(_) => return Ok(fault),
            Event::Eof => return Err(DecodeError::UnexpectedEof),
            _ => {}
        }
    }
}

fn check_envelope(e: &BytesStart<'_>, in_soap: bool) -> Result<(), DecodeError> {
    if in_soap && e.local_name().as_ref() == b"Envelope" {
        Ok(())
    } else {
        Err(DecodeError::UnexpectedRoot(
            String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        ))
    }
}

fn is_soap_namespace(ns: &ResolveResult<'_>) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == SOAP_ENVELOPE_NS.as_bytes())
}

fn namespace_of(ns: &ResolveResult<'_>) -> String {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => String::from_utf8_lossy(uri).into_owned(),
        _ => String::new(),
    }
}

fn qualified_name(e: &BytesStart<'_>, namespace: String) -> Result<QualifiedName, DecodeError> {
    let local = std::str::from_utf8(e.local_name().into_inner())?;
    Ok(QualifiedName {
        namespace,
        local: local.to_string(),
    })
}

/// Texte d'un élément simple (entités, CDATA et commentaires résolus)
fn text_content(raw: &[u8]) -> Result<String, DecodeError> {
    let text = std::str::from_utf8(raw)?;
    if text.is_empty() {
        return Ok(String::new());
    }
    String::unmarshal(text)
}
