// XML API HTTP client
//
// Wraps `reqwest::Client` with the device's calling convention: every
// request is a form-encoded POST to `/api/`, the API key rides along as
// the `key` parameter, and every response is a `<response>` envelope.
// Config operations and commit tracking are inherent methods.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::time::Instant;
use tracing::{debug, info};
use url::Url;

use crate::envelope;
use crate::error::Error;
use crate::transport::TransportConfig;

/// How long a synchronous commit waits for its job before giving up.
pub const COMMIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Credentials for establishing an API session.
#[derive(Debug)]
pub enum Credentials {
    /// A pre-provisioned API key, used as-is.
    ApiKey(SecretString),
    /// Username and password, exchanged for a key via `type=keygen`.
    Basic {
        username: String,
        password: SecretString,
    },
}

/// Raw client for the device's XML configuration API.
///
/// Holds the API key for the session. All methods send `POST {base}/api/`
/// with form parameters and validate the response envelope before the
/// caller sees the payload.
#[derive(Debug)]
pub struct XapiClient {
    http: reqwest::Client,
    endpoint: Url,
    key: SecretString,
}

impl XapiClient {
    /// Build a client and establish a session.
    ///
    /// With [`Credentials::Basic`] this performs a keygen round trip;
    /// with [`Credentials::ApiKey`] no request is sent.
    pub async fn connect(
        base_url: &Url,
        transport: &TransportConfig,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let endpoint = base_url.join("/api/").map_err(Error::InvalidUrl)?;
        let key = match credentials {
            Credentials::ApiKey(key) => key,
            Credentials::Basic { username, password } => {
                keygen(&http, &endpoint, &username, &password).await?
            }
        };
        Ok(Self {
            http,
            endpoint,
            key,
        })
    }

    /// The resolved API endpoint (`{base}/api/`).
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    // ── Request plumbing ─────────────────────────────────────────────

    /// Send one API call with the given form parameters.
    ///
    /// The session key is appended automatically. Returns the raw body
    /// after envelope validation, so callers can pull payload fields out
    /// of a body they know is a success envelope.
    pub async fn call<'a>(&'a self, mut params: Vec<(&'a str, &'a str)>) -> Result<String, Error> {
        let op = params
            .iter()
            .find(|(k, _)| *k == "type")
            .map_or("?", |(_, v)| *v);
        debug!("POST {} type={op}", self.endpoint);

        params.push(("key", self.key.expose_secret()));
        let resp = self
            .http
            .post(self.endpoint.clone())
            .form(&params)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        read_envelope(status, &body)?;
        Ok(body)
    }

    // ── Config operations ────────────────────────────────────────────

    /// Read the node addressed by `xpath`.
    ///
    /// Returns the inner XML of `<result>`, which is empty when the node
    /// does not exist in the candidate configuration.
    pub async fn get_config(&self, xpath: &str) -> Result<String, Error> {
        let body = self
            .call(vec![("type", "config"), ("action", "get"), ("xpath", xpath)])
            .await?;
        envelope::result_inner_xml(&body)
    }

    /// Create or replace the node addressed by `xpath` with `element`.
    pub async fn edit_config(&self, xpath: &str, element: &str) -> Result<(), Error> {
        self.call(vec![
            ("type", "config"),
            ("action", "edit"),
            ("xpath", xpath),
            ("element", element),
        ])
        .await?;
        Ok(())
    }

    /// Merge `element` into the node addressed by `xpath`.
    ///
    /// `set` never removes existing children, so re-applying the same
    /// element leaves the configuration untouched.
    pub async fn set_config(&self, xpath: &str, element: &str) -> Result<(), Error> {
        self.call(vec![
            ("type", "config"),
            ("action", "set"),
            ("xpath", xpath),
            ("element", element),
        ])
        .await?;
        Ok(())
    }

    /// Delete the node addressed by `xpath`.
    pub async fn delete_config(&self, xpath: &str) -> Result<(), Error> {
        self.call(vec![
            ("type", "config"),
            ("action", "delete"),
            ("xpath", xpath),
        ])
        .await?;
        Ok(())
    }

    // ── Commit ───────────────────────────────────────────────────────

    /// Commit the candidate configuration.
    ///
    /// Returns the job id when a commit job was enqueued, or `None` when
    /// the device reported nothing to commit. With `sync` the call polls
    /// the job every `poll_interval` until it finishes, failing if the
    /// job result is not OK or [`COMMIT_TIMEOUT`] passes first.
    pub async fn commit(
        &self,
        sync: bool,
        poll_interval: Duration,
    ) -> Result<Option<String>, Error> {
        let body = self
            .call(vec![("type", "commit"), ("cmd", "<commit></commit>")])
            .await?;
        let Some(job_id) = envelope::extract_job_id(&body)? else {
            info!("nothing to commit");
            return Ok(None);
        };
        info!("commit job {job_id} enqueued");
        if sync {
            self.wait_for_job(&job_id, poll_interval).await?;
        }
        Ok(Some(job_id))
    }

    /// Poll a job until it reaches its terminal state, then require OK.
    pub async fn wait_for_job(&self, job_id: &str, poll_interval: Duration) -> Result<(), Error> {
        let deadline = Instant::now() + COMMIT_TIMEOUT;
        let cmd = format!("<show><jobs><id>{job_id}</id></jobs></show>");

        loop {
            let body = self.call(vec![("type", "op"), ("cmd", &cmd)]).await?;
            let job = envelope::parse_job_status(&body)?;

            if job.is_finished() {
                if job.is_ok() {
                    info!("commit job {job_id} finished");
                    return Ok(());
                }
                let message = if job.details.is_empty() {
                    format!(
                        "commit job {job_id} failed with result {}",
                        job.result.as_deref().unwrap_or("unknown")
                    )
                } else {
                    job.details.join("; ")
                };
                return Err(Error::device(message, None));
            }

            if let Some(progress) = &job.progress {
                debug!("commit job {job_id} at {progress}%");
            }
            if Instant::now() >= deadline {
                return Err(Error::CommitTimeout {
                    job_id: job_id.to_string(),
                    timeout_secs: COMMIT_TIMEOUT.as_secs(),
                });
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

/// Exchange username/password for an API key.
async fn keygen(
    http: &reqwest::Client,
    endpoint: &Url,
    username: &str,
    password: &SecretString,
) -> Result<SecretString, Error> {
    debug!("requesting API key for user {username}");

    let params = [
        ("type", "keygen"),
        ("user", username),
        ("password", password.expose_secret()),
    ];
    let resp = http
        .post(endpoint.clone())
        .form(&params)
        .send()
        .await
        .map_err(Error::Transport)?;

    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    match envelope::extract_key(&body) {
        Ok(key) => {
            debug!("api key issued");
            Ok(SecretString::from(key))
        }
        // Bad credentials come back as an error envelope.
        Err(Error::Device { message, .. }) => Err(Error::Authentication { message }),
        Err(_) if !status.is_success() => Err(Error::Authentication {
            message: format!("keygen failed (HTTP {status})"),
        }),
        Err(e) => Err(e),
    }
}

/// Validate the HTTP status and envelope status of a response body.
///
/// The device reports API errors inside the XML envelope, sometimes with
/// a non-2xx HTTP status. A non-XML body only makes sense for proxies or
/// wrong endpoints, so it is surfaced as-is.
fn read_envelope(status: reqwest::StatusCode, body: &str) -> Result<(), Error> {
    if body.trim_start().starts_with('<') {
        envelope::ensure_success(body)
    } else if status.is_success() {
        Err(Error::MalformedResponse(format!(
            "expected an XML envelope, got: {}",
            snippet(body)
        )))
    } else {
        Err(Error::device(format!("HTTP {status}"), None))
    }
}

/// Body prefix for error messages, cut at a char boundary.
fn snippet(body: &str) -> &str {
    let mut end = body.len().min(120);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
