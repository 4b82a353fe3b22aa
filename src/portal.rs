use crate::models::{CourseRecord, Credentials, FailureKind, PortalData, PortalResponse};
use reqwest::StatusCode;
use std::{future::Future, time::Duration};
use tracing::{debug, warn};

pub const AUTH_FAILED_KIND: &str = "AUTH_FAILED";

const FETCH_FAILED: &str = "Failed to fetch attendance";
const UNREACHABLE: &str = "Connection timed out or failed. Please try again.";
const MALFORMED: &str = "Malformed response from attendance service";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PortalError {
    pub kind: FailureKind,
    pub message: String,
}

impl PortalError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::AuthFailed,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transport,
            message: message.into(),
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind == FailureKind::AuthFailed
    }
}

pub trait AttendancePortal: Send + Sync + 'static {
    fn fetch(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<PortalData, PortalError>> + Send;
}

pub struct HttpPortal {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPortal {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AttendancePortal for HttpPortal {
    async fn fetch(&self, credentials: &Credentials) -> Result<PortalData, PortalError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(credentials)
            .send()
            .await
            .map_err(|err| {
                warn!("attendance service request failed: {err}");
                PortalError::transport(UNREACHABLE)
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            warn!("failed to read attendance service response: {err}");
            PortalError::transport(UNREACHABLE)
        })?;

        debug!(status = status.as_u16(), bytes = body.len(), "attendance service responded");
        interpret_response(status, &body)
    }
}

// Auth failures come from HTTP 401 or `kind: "AUTH_FAILED"`, never from message wording.
pub fn interpret_response(status: StatusCode, body: &[u8]) -> Result<PortalData, PortalError> {
    let parsed = serde_json::from_slice::<PortalResponse>(body);

    let auth_failed = status == StatusCode::UNAUTHORIZED
        || parsed
            .as_ref()
            .ok()
            .and_then(|reply| reply.kind.as_deref())
            .is_some_and(|kind| kind.eq_ignore_ascii_case(AUTH_FAILED_KIND));

    let reply = match parsed {
        Ok(reply) => reply,
        Err(err) => {
            warn!("undecodable attendance service response ({status}): {err}");
            let message = if status.is_success() { MALFORMED } else { FETCH_FAILED };
            return Err(if auth_failed {
                PortalError::auth(message)
            } else {
                PortalError::transport(message)
            });
        }
    };

    if !status.is_success() || reply.error.is_some() {
        let message = reply
            .error
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| FETCH_FAILED.to_string());
        return Err(if auth_failed {
            PortalError::auth(message)
        } else {
            PortalError::transport(message)
        });
    }

    Ok(PortalData {
        student_name: reply.student_name.unwrap_or_default(),
        records: reply
            .data
            .unwrap_or_default()
            .into_iter()
            .map(CourseRecord::from_value)
            .collect(),
    })
}
