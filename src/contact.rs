//! Contact-form e-mail dispatch through the EmailJS REST API.

use std::io;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

pub const EMAILJS_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

pub const SERVICE_ID_ENV: &str = "EMAILJS_SERVICE_ID";
pub const TEMPLATE_ID_ENV: &str = "EMAILJS_TEMPLATE_ID";
pub const PUBLIC_KEY_ENV: &str = "EMAILJS_PUBLIC_KEY";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmailErrorKind {
    Validation,
    Network,
    Server,
    Timeout,
    Config,
}

impl EmailErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            EmailErrorKind::Validation => "VALIDATION_ERROR",
            EmailErrorKind::Network => "NETWORK_ERROR",
            EmailErrorKind::Server => "SERVER_ERROR",
            EmailErrorKind::Timeout => "TIMEOUT_ERROR",
            EmailErrorKind::Config => "CONFIG_ERROR",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EmailError {
    pub kind: EmailErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl EmailError {
    pub fn new(kind: EmailErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub purpose: String,
    pub timestamp: Option<DateTime<Local>>,
}

/// EmailJS credentials. Every field must be non-empty for a send to start.
#[derive(Clone, Debug, Default)]
pub struct EmailConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

impl EmailConfig {
    pub fn from_env() -> Self {
        let var = |name| std::env::var(name).unwrap_or_default();
        Self {
            service_id: var(SERVICE_ID_ENV),
            template_id: var(TEMPLATE_ID_ENV),
            public_key: var(PUBLIC_KEY_ENV),
        }
    }

    fn validate(&self) -> Result<(), EmailError> {
        if self.service_id.is_empty() || self.template_id.is_empty() || self.public_key.is_empty() {
            return Err(EmailError::new(
                EmailErrorKind::Config,
                format!("EmailJS is not configured. Please set {SERVICE_ID_ENV}, {TEMPLATE_ID_ENV}, and {PUBLIC_KEY_ENV}."),
                false,
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SendOptions {
    /// Upper bound for a single attempt.
    pub timeout: Duration,
    /// Extra attempts after the first one.
    pub retries: u32,
    /// The wait before retry `n` (1-based) is `backoff × n`.
    pub backoff: Duration,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 2,
            backoff: Duration::from_millis(1000),
        }
    }
}

/// Variables handed to the e-mail template.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct TemplateParams {
    pub from_name: String,
    pub from_email: String,
    pub phone: String,
    pub message: String,
    pub timestamp: String,
}

impl TemplateParams {
    pub fn from_submission(submission: &ContactSubmission) -> Self {
        let at = submission.timestamp.unwrap_or_else(Local::now);
        Self {
            from_name: submission.name.clone(),
            from_email: submission.email.clone(),
            phone: submission.phone.clone(),
            message: submission.purpose.clone(),
            timestamp: at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        }
    }
}

/// One delivery attempt. Implementations classify their own failures.
pub trait EmailTransport {
    fn send(&self, config: &EmailConfig, params: &TemplateParams, timeout: Duration) -> Result<(), EmailError>;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a TemplateParams,
}

pub struct EmailJsTransport {
    agent: ureq::Agent,
    endpoint: String,
}

impl EmailJsTransport {
    pub fn new() -> Self {
        Self::with_endpoint(EMAILJS_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }
}

impl Default for EmailJsTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn is_timeout(err: &ureq::Transport) -> bool {
    std::error::Error::source(err)
        .and_then(|e| e.downcast_ref::<io::Error>())
        .is_some_and(|e| matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock))
}

impl EmailTransport for EmailJsTransport {
    fn send(&self, config: &EmailConfig, params: &TemplateParams, timeout: Duration) -> Result<(), EmailError> {
        let body = SendRequest {
            service_id: &config.service_id,
            template_id: &config.template_id,
            user_id: &config.public_key,
            template_params: params,
        };
        let result = self
            .agent
            .post(&self.endpoint)
            .timeout(timeout)
            .send_json(&body);

        match result {
            Ok(response) if response.status() == 200 => Ok(()),
            Ok(response) | Err(ureq::Error::Status(_, response)) => {
                let status = response.status();
                let text = response.into_string().unwrap_or_default();
                Err(EmailError::new(
                    EmailErrorKind::Server,
                    format!("EmailJS returned status {status}: {text}"),
                    true,
                ))
            }
            Err(ureq::Error::Transport(t)) if is_timeout(&t) => {
                Err(EmailError::new(EmailErrorKind::Timeout, "Request timed out", true))
            }
            Err(ureq::Error::Transport(t)) => Err(EmailError::new(
                EmailErrorKind::Network,
                format!("Failed to send email: {t}"),
                true,
            )),
        }
    }
}

/// Validate the submission and credentials, then deliver with retries.
///
/// Non-retryable failures are returned as soon as they happen. When every
/// attempt fails with a retryable error the last message is reported as a
/// non-retryable `NETWORK_ERROR`.
pub fn send_contact_email(
    transport: &dyn EmailTransport,
    config: &EmailConfig,
    submission: &ContactSubmission,
    options: &SendOptions,
) -> Result<(), EmailError> {
    let required = [
        &submission.name,
        &submission.email,
        &submission.phone,
        &submission.purpose,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(EmailError::new(
            EmailErrorKind::Validation,
            "All fields are required",
            false,
        ));
    }
    config.validate()?;

    let params = TemplateParams::from_submission(submission);
    let mut last_error = None;
    for attempt in 0..=options.retries {
        match transport.send(config, &params, options.timeout) {
            Ok(()) => {
                log::info!("Contact e-mail sent for {} (attempt {})", params.from_email, attempt + 1);
                return Ok(());
            }
            Err(err) if !err.retryable => return Err(err),
            Err(err) => {
                log::warn!("Contact e-mail attempt {} failed: {} ({})", attempt + 1, err, err.kind.code());
                last_error = Some(err);
            }
        }
        if attempt < options.retries {
            thread::sleep(options.backoff * (attempt + 1));
        }
    }

    let message = last_error
        .map(|e| e.message)
        .unwrap_or_else(|| "Failed to send email after multiple attempts".to_string());
    Err(EmailError::new(EmailErrorKind::Network, message, false))
}
