// XML API envelope parsing.
//
// Every call returns a `<response status="...">` envelope. Success payloads
// live under `<result>`; errors carry a `<msg>` whose text is either inline
// or split across `<line>` children. Commit enqueues report a text-only
// `<job>` id, while job polls return a structured `<job>` element.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};

use crate::error::Error;

/// Terminal state of a tracked commit job.
pub const JOB_STATUS_FINISHED: &str = "FIN";

/// Job result value for a successful commit.
pub const JOB_RESULT_OK: &str = "OK";

/// Parsed fields of a `<show><jobs>` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub id: Option<String>,
    pub status: String,
    pub result: Option<String>,
    pub progress: Option<String>,
    pub details: Vec<String>,
}

impl JobStatus {
    /// Whether the job has reached its terminal state.
    pub fn is_finished(&self) -> bool {
        self.status == JOB_STATUS_FINISHED
    }

    /// Whether a finished job reported success.
    pub fn is_ok(&self) -> bool {
        self.result.as_deref() == Some(JOB_RESULT_OK)
    }
}

struct EnvelopeHead {
    status: String,
    code: Option<String>,
    message_lines: Vec<String>,
}

/// Check the envelope status, turning `status="error"` (or anything other
/// than `"success"`) into [`Error::Device`] with the device's message intact.
pub fn ensure_success(body: &str) -> Result<(), Error> {
    let head = parse_head(body)?;
    if head.status == "success" {
        return Ok(());
    }
    let message = if head.message_lines.is_empty() {
        format!("response status \"{}\"", head.status)
    } else {
        head.message_lines.join("; ")
    };
    Err(Error::Device {
        message,
        code: head.code,
    })
}

/// Extract the inner XML of the `<result>` element, reserialized.
///
/// Returns an empty string when the result is empty or absent, which is how
/// the device answers a `get` on a nonexistent node.
pub fn result_inner_xml(body: &str) -> Result<String, Error> {
    ensure_success(body)?;

    let mut reader = Reader::from_reader(body.as_bytes());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;

    loop {
        let ev = reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(format!("invalid XML: {e}")))?;
        match ev {
            Event::Start(e) => {
                if depth == 0 {
                    if e.name().as_ref() == b"result" {
                        depth = 1;
                    }
                } else {
                    depth += 1;
                    writer
                        .write_event(Event::Start(e))
                        .map_err(|e| malformed(format!("failed to reserialize result: {e}")))?;
                }
            }
            Event::Empty(e) if depth > 0 => {
                writer
                    .write_event(Event::Empty(e))
                    .map_err(|e| malformed(format!("failed to reserialize result: {e}")))?;
            }
            Event::Text(t) if depth > 0 => {
                writer
                    .write_event(Event::Text(t))
                    .map_err(|e| malformed(format!("failed to reserialize result: {e}")))?;
            }
            Event::CData(t) if depth > 0 => {
                writer
                    .write_event(Event::CData(t))
                    .map_err(|e| malformed(format!("failed to reserialize result: {e}")))?;
            }
            Event::End(e) => {
                if depth > 1 {
                    depth -= 1;
                    writer
                        .write_event(Event::End(e))
                        .map_err(|e| malformed(format!("failed to reserialize result: {e}")))?;
                } else if depth == 1 {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| malformed(format!("result is not UTF-8: {e}")))
}

/// Extract the API key from a keygen response.
pub fn extract_key(body: &str) -> Result<String, Error> {
    ensure_success(body)?;
    element_text(body, b"key")?.ok_or_else(|| malformed("keygen response carried no <key>"))
}

/// Extract the enqueued job id from a commit response, if one was issued.
///
/// A success envelope without a `<job>` means the device had nothing to
/// commit; callers treat that as already complete.
pub fn extract_job_id(body: &str) -> Result<Option<String>, Error> {
    ensure_success(body)?;
    element_text(body, b"job")
}

/// Parse the first `<job>` element of a `<show><jobs>` response.
pub fn parse_job_status(body: &str) -> Result<JobStatus, Error> {
    ensure_success(body)?;

    #[derive(Clone, Copy)]
    enum Field {
        Id,
        Status,
        JobResult,
        Progress,
        Line,
    }

    let mut reader = Reader::from_reader(body.as_bytes());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut job = JobStatus {
        id: None,
        status: String::new(),
        result: None,
        progress: None,
        details: Vec::new(),
    };
    let mut job_depth = 0usize;
    let mut seen_job = false;
    let mut field: Option<Field> = None;

    loop {
        let ev = reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(format!("invalid XML: {e}")))?;
        match ev {
            Event::Start(e) => {
                if job_depth == 0 {
                    if e.name().as_ref() == b"job" {
                        job_depth = 1;
                        seen_job = true;
                    }
                } else {
                    job_depth += 1;
                    field = match e.name().as_ref() {
                        b"id" => Some(Field::Id),
                        b"status" => Some(Field::Status),
                        b"result" => Some(Field::JobResult),
                        b"progress" => Some(Field::Progress),
                        b"line" => Some(Field::Line),
                        _ => None,
                    };
                }
            }
            Event::Empty(_) if job_depth > 0 => {
                field = None;
            }
            Event::Text(t) if job_depth > 0 => {
                let text = t
                    .unescape()
                    .map_err(|e| malformed(format!("bad text encoding: {e}")))?;
                let text = text.trim();
                if text.is_empty() {
                    buf.clear();
                    continue;
                }
                match field {
                    Some(Field::Id) => job.id = Some(text.to_string()),
                    Some(Field::Status) => job.status = text.to_string(),
                    Some(Field::JobResult) => job.result = Some(text.to_string()),
                    Some(Field::Progress) => job.progress = Some(text.to_string()),
                    Some(Field::Line) => job.details.push(text.to_string()),
                    None => {}
                }
            }
            Event::End(_) if job_depth > 0 => {
                job_depth -= 1;
                field = None;
                if job_depth == 0 {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_job {
        return Err(malformed("job response carried no <job> element"));
    }
    if job.status.is_empty() {
        return Err(malformed("job element carried no <status>"));
    }
    Ok(job)
}

// ── Internals ───────────────────────────────────────────────────────

/// Parse the `<response>` head: status and code attributes plus any
/// `<msg>` text (inline or `<line>`-split).
fn parse_head(body: &str) -> Result<EnvelopeHead, Error> {
    let mut reader = Reader::from_reader(body.as_bytes());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut status: Option<String> = None;
    let mut code: Option<String> = None;
    let mut msg_depth = 0usize;
    let mut message_lines = Vec::new();

    loop {
        let ev = reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(format!("invalid XML: {e}")))?;
        match ev {
            Event::Start(e) => {
                if status.is_none() {
                    let (s, c) = response_attrs(&e)?;
                    status = Some(s);
                    code = c;
                } else if msg_depth > 0 {
                    msg_depth += 1;
                } else if e.name().as_ref() == b"msg" {
                    msg_depth = 1;
                }
            }
            Event::Empty(e) => {
                if status.is_none() {
                    let (s, c) = response_attrs(&e)?;
                    status = Some(s);
                    code = c;
                }
            }
            Event::Text(t) if msg_depth > 0 => {
                let text = t
                    .unescape()
                    .map_err(|e| malformed(format!("bad text encoding: {e}")))?;
                let text = text.trim();
                if !text.is_empty() {
                    message_lines.push(text.to_string());
                }
            }
            Event::End(_) if msg_depth > 0 => {
                msg_depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    match status {
        Some(status) => Ok(EnvelopeHead {
            status,
            code,
            message_lines,
        }),
        None => Err(malformed("missing <response> envelope")),
    }
}

fn response_attrs(e: &BytesStart<'_>) -> Result<(String, Option<String>), Error> {
    if e.name().as_ref() != b"response" {
        return Err(malformed("first element is not <response>"));
    }
    let mut status = None;
    let mut code = None;
    for attr in e.attributes() {
        let attr = attr.map_err(|e| malformed(format!("bad attribute: {e}")))?;
        match attr.key.as_ref() {
            b"status" => status = Some(attr_value(&attr)?),
            b"code" => code = Some(attr_value(&attr)?),
            _ => {}
        }
    }
    match status {
        Some(status) => Ok((status, code)),
        None => Err(malformed("<response> without status attribute")),
    }
}

fn attr_value(attr: &Attribute<'_>) -> Result<String, Error> {
    attr.unescape_value()
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| malformed(format!("bad attribute value: {e}")))
}

/// Concatenated text of the first element named `name`, at any depth.
fn element_text(body: &str, name: &[u8]) -> Result<Option<String>, Error> {
    let mut reader = Reader::from_reader(body.as_bytes());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut depth = 0usize;
    let mut found = false;
    let mut text = String::new();

    loop {
        let ev = reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(format!("invalid XML: {e}")))?;
        match ev {
            Event::Start(e) => {
                if found {
                    depth += 1;
                } else if e.name().as_ref() == name {
                    found = true;
                    depth = 1;
                }
            }
            Event::Text(t) if found => {
                let t = t
                    .unescape()
                    .map_err(|e| malformed(format!("bad text encoding: {e}")))?;
                text.push_str(&t);
            }
            Event::End(_) if found => {
                depth -= 1;
                if depth == 0 {
                    let trimmed = text.trim();
                    return Ok(if trimmed.is_empty() {
                        None
                    } else {
                        Some(trimmed.to_string())
                    });
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::MalformedResponse(msg.into())
}

// ── Tests ───────────────────────────────────────────────────────────
