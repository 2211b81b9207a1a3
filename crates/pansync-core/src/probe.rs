// Existence probing.
//
// A resource exists iff reading its path yields a result containing an
// `<entry>` element. Read failures propagate; they never count as
// absence.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::error::CoreError;
use crate::session::DeviceSession;
use crate::xpath::Xpath;

/// Probe the node at `xpath` for existence.
pub async fn probe<S: DeviceSession>(session: &S, xpath: &Xpath) -> Result<bool, CoreError> {
    let body = session
        .read(xpath)
        .await
        .map_err(|source| CoreError::ProbeFailed {
            xpath: xpath.to_string(),
            source,
        })?;
    let exists = entry_present(&body);
    debug!(%xpath, exists, "probed resource");
    Ok(exists)
}

/// Whether the body contains an `<entry>` element at any depth.
pub(crate) fn entry_present(body: &str) -> bool {
    let mut reader = Reader::from_reader(body.as_bytes());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e) | Event::Empty(e)) if e.name().as_ref() == b"entry" => return true,
            Ok(Event::Eof) | Err(_) => return false,
            Ok(_) => {}
        }
        buf.clear();
    }
}
