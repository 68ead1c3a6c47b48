use async_trait::async_trait;
use lettre::{
    message::{header, Mailbox, Message},
    transport::smtp::{authentication::Credentials, SUBMISSIONS_PORT},
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use std::time::Duration;

use crate::config::Config;

#[derive(Debug)]
pub struct EmailError {
    pub code: &'static str,
    pub message: String,
}

impl EmailError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// One outbound message, fully resolved before it reaches the transport.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError>;
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn contact_subject(subject: Option<&str>) -> String {
    match subject {
        Some(subject) if !subject.is_empty() => format!("[Portfolio] {}", subject),
        _ => "[Portfolio] New message".to_string(),
    }
}

pub fn build_contact_email_html(
    name: &str,
    email: &str,
    subject: Option<&str>,
    message: &str,
) -> String {
    let subject_row = match subject {
        Some(subject) if !subject.is_empty() => format!(
            "<p style=\"margin:0 0 12px\"><strong>Subject:</strong> {}</p>",
            escape_html(subject)
        ),
        _ => String::new(),
    };
    format!(
        concat!(
            "<div style=\"font-family:ui-sans-serif,system-ui,Segoe UI,Roboto,Helvetica,Arial;line-height:1.5;padding:16px\">",
            "<h2 style=\"margin:0 0 12px\">New portfolio message</h2>",
            "<p style=\"margin:0 0 12px\"><strong>Name:</strong> {name}</p>",
            "<p style=\"margin:0 0 12px\"><strong>Email:</strong> {email}</p>",
            "{subject_row}",
            "<hr style=\"border:none;border-top:1px solid #eee;margin:16px 0\" />",
            "<p style=\"white-space:pre-wrap\">{message}</p>",
            "</div>"
        ),
        name = escape_html(name),
        email = escape_html(email),
        subject_row = subject_row,
        message = escape_html(message),
    )
}

/// SMTP relay built once at startup. When the relay settings are incomplete
/// the service still constructs, but every send fails with `not_configured`
/// until the process is restarted with the variables present.
pub struct SmtpEmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    send_timeout: Duration,
}

impl SmtpEmailService {
    pub fn new(config: &Config) -> Self {
        let send_timeout = Duration::from_secs(config.smtp_timeout_seconds);
        Self {
            transport: Self::build_transport(config, send_timeout),
            send_timeout,
        }
    }

    fn build_transport(
        config: &Config,
        timeout: Duration,
    ) -> Option<AsyncSmtpTransport<Tokio1Executor>> {
        let (Some(host), Some(port)) = (config.smtp_host.as_deref(), config.smtp_port) else {
            return None;
        };

        let mut builder = if port == SUBMISSIONS_PORT {
            match AsyncSmtpTransport::<Tokio1Executor>::relay(host) {
                Ok(builder) => builder.port(port).timeout(Some(timeout)),
                Err(err) => {
                    tracing::warn!("smtp transport init failed: {err}");
                    return None;
                }
            }
        } else {
            // Plain SMTP outside the implicit-TLS submission port, which is
            // what local relays such as Mailpit speak.
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .port(port)
                .timeout(Some(timeout))
        };

        if let (Some(user), Some(pass)) = (config.smtp_user.as_deref(), config.smtp_pass.as_deref())
        {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }

        Some(builder.build())
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        let Some(transport) = &self.transport else {
            return Err(EmailError::new(
                "not_configured",
                "smtp transport is not configured; check SMTP_* environment variables",
            ));
        };

        let from: Mailbox = email
            .from
            .parse()
            .map_err(|err| EmailError::new("invalid_mailbox", format!("invalid sender: {err}")))?;
        let to: Mailbox = email.to.parse().map_err(|err| {
            EmailError::new("invalid_mailbox", format!("invalid recipient: {err}"))
        })?;

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.as_str())
            .header(header::ContentType::TEXT_HTML);

        // The visitor's address is only checked for presence upstream, so an
        // unparseable mailbox just drops the Reply-To header.
        if let Some(reply_to) = email.reply_to.as_deref() {
            match reply_to.parse::<Mailbox>() {
                Ok(mailbox) => builder = builder.reply_to(mailbox),
                Err(err) => tracing::debug!("skipping unparseable reply-to address: {err}"),
            }
        }

        let message = builder.body(email.html_body).map_err(|err| {
            EmailError::new("build_failed", format!("build message failed: {err}"))
        })?;

        match tokio::time::timeout(self.send_timeout, transport.send(message)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(EmailError::new(
                "smtp_error",
                format!("smtp send failed: {err}"),
            )),
            Err(_) => Err(EmailError::new(
                "timeout",
                format!(
                    "smtp send timed out after {}s",
                    self.send_timeout.as_secs()
                ),
            )),
        }
    }
}
