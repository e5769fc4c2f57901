//! Écriture d'enveloppes SOAP
//!
//! Certains routeurs répondent 500 lorsque l'enveloppe déclare le namespace
//! SOAP comme namespace par défaut puis le réassigne au namespace du service
//! à l'intérieur du Body. L'enveloppe et l'élément d'action sont donc écrits
//! octet par octet avec des préfixes explicites (`s:` et `u:`) ; seul le
//! contenu de l'action passe par le sérialiseur générique.

use std::io::Write;

use quick_xml::escape::escape;
use tracing::trace;

use crate::envelope::Action;
use crate::error::{MarshalError, SoapError};
use crate::fault::Fault;
use crate::marshal::Marshal;

const ENV_OPEN: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" "#,
    r#"s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">"#,
    "<s:Body>",
);
const ACTION_OPEN: &[u8] = b"<u:";
const ACTION_XMLNS: &[u8] = b" xmlns:u=\"";
const ACTION_OPEN_END: &[u8] = b"\">";
const ACTION_CLOSE: &[u8] = b"</u:";
const ACTION_CLOSE_END: &[u8] = b">";
const ENV_CLOSE: &[u8] = b"</s:Body></s:Envelope>";

/// Écrit une action dans une enveloppe SOAP
///
/// Les erreurs proviennent soit du flux, soit de la sérialisation du
/// payload. Les octets déjà écrits ne sont pas retirés du flux en cas
/// d'erreur : l'appelant doit abandonner le flux.
pub fn write<W, T>(w: &mut W, action: &Action<T>) -> Result<(), SoapError>
where
    W: Write + ?Sized,
    T: Marshal,
{
    if action.name.local.is_empty() {
        return Err(MarshalError::EmptyName("local name").into());
    }
    if action.name.namespace.is_empty() {
        return Err(MarshalError::EmptyName("namespace").into());
    }
    trace!("Writing SOAP envelope for action {}", action.name);

    let local = escape(action.name.local.as_str());

    w.write_all(ENV_OPEN.as_bytes())?;

    w.write_all(ACTION_OPEN)?;
    w.write_all(local.as_bytes())?;
    w.write_all(ACTION_XMLNS)?;
    w.write_all(escape(action.name.namespace.as_str()).as_bytes())?;
    w.write_all(ACTION_OPEN_END)?;

    let content = action.payload.marshal()?;
    w.write_all(content.as_bytes())?;

    w.write_all(ACTION_CLOSE)?;
    w.write_all(local.as_bytes())?;
    w.write_all(ACTION_CLOSE_END)?;

    w.write_all(ENV_CLOSE)?;
    Ok(())
}

/// Sérialise une action en mémoire
pub fn encode<T: Marshal>(action: &Action<T>) -> Result<Vec<u8>, SoapError> {
    let mut buf = Vec::new();
    write(&mut buf, action)?;
    Ok(buf)
}

/// Écrit un SOAP Fault dans une enveloppe
///
/// Le contenu de `detail` est recopié tel quel ; l'élément est omis s'il
/// est vide, de même que `faultactor` en l'absence d'acteur.
pub fn write_fault<W>(w: &mut W, fault: &Fault) -> Result<(), SoapError>
where
    W: Write + ?Sized,
{
    trace!("Writing SOAP fault {}", fault.code);

    w.write_all(ENV_OPEN.as_bytes())?;
    w.write_all(b"<s:Fault>")?;

    write_text_element(w, "faultcode", &fault.code)?;
    write_text_element(w, "faultstring", &fault.string)?;
    if let Some(actor) = &fault.actor {
        write_text_element(w, "faultactor", actor)?;
    }
    if !fault.detail.is_empty() {
        w.write_all(b"<detail>")?;
        w.write_all(fault.detail.raw())?;
        w.write_all(b"</detail>")?;
    }

    w.write_all(b"</s:Fault>")?;
    w.write_all(ENV_CLOSE)?;
    Ok(())
}

fn write_text_element<W>(w: &mut W, name: &str, text: &str) -> Result<(), SoapError>
where
    W: Write + ?Sized,
{
    write!(w, "<{name}>{}</{name}>", escape(text))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{SOAP_ENCODING_STYLE, SOAP_ENVELOPE_NS};
    use serde::Serialize;
    use std::io;

    #[derive(Serialize)]
    struct GetStatus {}

    #[derive(Serialize)]
    struct Play {
        #[serde(rename = "InstanceID")]
        instance_id: u32,
        #[serde(rename = "Speed")]
        speed: String,
    }

    #[test]
    fn test_framing_is_exact() {
        let action = Action::new("urn:example", "GetStatus", GetStatus {});
        let xml = String::from_utf8(encode(&action).unwrap()).unwrap();

        assert_eq!(
            xml,
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">"#,
                r#"<s:Body><u:GetStatus xmlns:u="urn:example"></u:GetStatus></s:Body></s:Envelope>"#,
            )
        );
    }

    #[test]
    fn test_envelope_constants_match_framing() {
        assert!(ENV_OPEN.contains(SOAP_ENVELOPE_NS));
        assert!(ENV_OPEN.contains(SOAP_ENCODING_STYLE));
    }

    #[test]
    fn test_payload_between_action_tags() {
        let action = Action::new(
            "urn:schemas-upnp-org:service:AVTransport:1",
            "Play",
            Play {
                instance_id: 0,
                speed: "1".to_string(),
            },
        );
        let xml = String::from_utf8(encode(&action).unwrap()).unwrap();

        assert!(xml.contains(
            r#"<u:Play xmlns:u="urn:schemas-upnp-org:service:AVTransport:1"><InstanceID>0</InstanceID><Speed>1</Speed></u:Play>"#
        ));
    }

    #[test]
    fn test_name_and_namespace_are_escaped() {
        let action = Action::new("urn:a&b", "Get<\"x\">", GetStatus {});
        let xml = String::from_utf8(encode(&action).unwrap()).unwrap();

        assert!(xml.contains(r#"xmlns:u="urn:a&amp;b""#));
        assert!(xml.contains("<u:Get&lt;&quot;x&quot;&gt; "));
        assert!(xml.contains("</u:Get&lt;&quot;x&quot;&gt;>"));
    }

    #[test]
    fn test_empty_names_rejected_before_writing() {
        let mut buf = Vec::new();
        let err = write(&mut buf, &Action::new("urn:example", "", GetStatus {})).unwrap_err();
        assert!(matches!(err, SoapError::Marshal(MarshalError::EmptyName(_))));

        let err = write(&mut buf, &Action::new("", "GetStatus", GetStatus {})).unwrap_err();
        assert!(matches!(err, SoapError::Marshal(MarshalError::EmptyName(_))));
        assert!(buf.is_empty());
    }

    /// Flux qui échoue au n-ième appel à `write`
    struct FailingWriter {
        fail_at: usize,
        calls: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.calls == self.fail_at {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_stream_failure_stops_immediately() {
        let action = Action::new("urn:example", "GetStatus", GetStatus {});

        // Nombre d'appels à write pour une enveloppe complète
        let mut counter = FailingWriter {
            fail_at: usize::MAX,
            calls: 0,
        };
        write(&mut counter, &action).unwrap();
        let total = counter.calls;
        assert!(total >= 5);

        for fail_at in 1..=total {
            let mut w = FailingWriter { fail_at, calls: 0 };
            let err = write(&mut w, &action).unwrap_err();
            assert!(matches!(err, SoapError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
            assert_eq!(w.calls, fail_at);
        }
    }

    #[derive(Serialize)]
    struct WithAttribute {
        #[serde(rename = "@id")]
        id: u32,
    }

    #[test]
    fn test_marshal_error_after_opening_tags() {
        let action = Action::new("urn:x", "Q", WithAttribute { id: 1 });
        let mut buf = Vec::new();

        let err = write(&mut buf, &action).unwrap_err();
        assert!(matches!(
            err,
            SoapError::Marshal(MarshalError::WrapperAttributes)
        ));

        // Les octets déjà écrits restent dans le flux
        let xml = String::from_utf8(buf).unwrap();
        assert!(xml.starts_with(ENV_OPEN));
        assert!(xml.ends_with(r#"<u:Q xmlns:u="urn:x">"#));
    }

    #[test]
    fn test_write_fault() {
        let fault = Fault::new("s:Client", "Invalid & Action").with_actor("svc1");
        let mut buf = Vec::new();
        write_fault(&mut buf, &fault).unwrap();
        let xml = String::from_utf8(buf).unwrap();

        assert!(xml.contains("<s:Body><s:Fault>"));
        assert!(xml.contains("<faultcode>s:Client</faultcode>"));
        assert!(xml.contains("<faultstring>Invalid &amp; Action</faultstring>"));
        assert!(xml.contains("<faultactor>svc1</faultactor>"));
        assert!(!xml.contains("<detail>"));
    }
}
