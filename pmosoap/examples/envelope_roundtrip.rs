//! Écrit une requête SOAP, puis relit une réponse et un fault.
//!
//! ```sh
//! RUST_LOG=pmosoap=trace cargo run -p pmosoap --example envelope_roundtrip
//! ```

use pmosoap::{Action, Fault, SoapError, error_codes, read, write, write_fault};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const RENDERING_CONTROL: &str = "urn:schemas-upnp-org:service:RenderingControl:1";

#[derive(Debug, Serialize)]
struct GetVolume {
    #[serde(rename = "InstanceID")]
    instance_id: u32,
    #[serde(rename = "Channel")]
    channel: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct GetVolumeResponse {
    #[serde(rename = "CurrentVolume")]
    current_volume: u16,
}

fn main() -> Result<(), SoapError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let request = Action::new(
        RENDERING_CONTROL,
        "GetVolume",
        GetVolume {
            instance_id: 0,
            channel: "Master".to_string(),
        },
    );
    let mut body = Vec::new();
    write(&mut body, &request)?;
    info!("Request: {}", String::from_utf8_lossy(&body));

    let response = Action::new(
        RENDERING_CONTROL,
        "GetVolumeResponse",
        GetVolumeResponse { current_volume: 42 },
    );
    let mut body = Vec::new();
    write(&mut body, &response)?;
    let decoded: Action<GetVolumeResponse> = read(body.as_slice())?;
    info!("{} -> volume {}", decoded.name, decoded.payload.current_volume);

    let mut body = Vec::new();
    write_fault(&mut body, &Fault::upnp(error_codes::INVALID_ACTION, "Invalid Action"))?;
    match read::<_, GetVolumeResponse>(body.as_slice()) {
        Err(SoapError::Fault(fault)) => match fault.upnp_error() {
            Some(upnp) => error!("{} (UPnP {}: {})", fault, upnp.error_code, upnp.error_description),
            None => error!("{}", fault),
        },
        Err(e) => return Err(e),
        Ok(action) => info!("Unexpected success: {:?}", action.payload),
    }

    Ok(())
}
