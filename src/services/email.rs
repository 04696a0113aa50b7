use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use uuid::Uuid;

use crate::{config::Config, services::notifier::Notifier};

const APP_NAME: &str = "FBI App";

/// Per-command SMTP timeout (connect, greeting, socket).
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    /// Upper bound on a whole delivery, after which it counts as failed.
    send_timeout: Duration,
}

impl EmailService {
    /// Returns None if SMTP is not fully configured, or in development mode.
    pub fn new(config: &Config) -> Option<Self> {
        if config.development {
            return None;
        }
        let host = config.email_host.as_deref()?;
        let username = config.email_user.clone()?;
        let password = config.email_password.clone()?;
        let from: Mailbox = config.email_from.parse().ok()?;

        let port = config.email_port;
        let creds = Credentials::new(username, password);

        let builder = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host).ok()?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host).ok()?
        };
        let transport = builder
            .port(port)
            .credentials(creds)
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Some(Self {
            transport,
            from,
            send_timeout: Duration::from_secs(config.email_timeout_secs),
        })
    }

    fn new_message_id(&self) -> String {
        format!("<{}@{}>", Uuid::new_v4(), self.from.email.domain())
    }

    fn wrap_html(content: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width,initial-scale=1">
  <title>{APP_NAME}</title>
</head>
<body style="margin:0;padding:0;font-family:Arial,sans-serif;line-height:1.6;color:#333">
  <div style="max-width:600px;margin:0 auto;padding:20px">
    <div style="background-color:#4a90e2;color:#ffffff;padding:20px;text-align:center;border-radius:5px 5px 0 0">
      <h1 style="margin:0">Password Reset Code</h1>
    </div>
    <div style="background-color:#f9f9f9;padding:30px;border:1px solid #ddd;border-radius:0 0 5px 5px;text-align:center">
      {content}
    </div>
    <div style="text-align:center;padding:20px;color:#666;font-size:12px">
      <p>This is an automated message from {APP_NAME}. Please do not reply to this email.</p>
    </div>
  </div>
</body>
</html>"#
        )
    }

    async fn send_email(&self, to: Mailbox, subject: &str, text: &str, html: &str) -> anyhow::Result<()> {
        let email = Message::builder()
            .message_id(Some(self.new_message_id()))
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_string()),
                    ),
            )
            .context("Failed to build email message")?;

        let response = tokio::time::timeout(self.send_timeout, self.transport.send(email))
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "Email sending timeout after {} seconds",
                    self.send_timeout.as_secs()
                )
            })?
            .context("Failed to send email")?;

        tracing::info!(
            "Password reset email accepted by SMTP relay: {}",
            response.message().collect::<Vec<_>>().join(" ")
        );
        Ok(())
    }

    pub async fn send_password_reset_code(&self, to_email: &str, code: &str) -> anyhow::Result<()> {
        let to: Mailbox = to_email
            .parse()
            .with_context(|| format!("Invalid recipient address: {to_email}"))?;

        let subject = format!("Password Reset Code - {APP_NAME}");
        let text = reset_code_text(code);
        let content = format!(
            r#"<p>Hello,</p>
<p>We received a request to reset your password for your {APP_NAME} parent account.</p>
<p><strong>Your password reset code is:</strong></p>
<div style="font-size:48px;font-weight:bold;letter-spacing:8px;color:#4a90e2;background-color:#ffffff;padding:20px;margin:20px 0;border:2px dashed #4a90e2;border-radius:8px">{code}</div>
<p>Enter this code in the app to reset your password.</p>
<p><strong>This code will expire in 15 minutes.</strong></p>
<p>If you didn't request a password reset, you can safely ignore this email.</p>"#
        );

        let html = Self::wrap_html(&content);
        self.send_email(to, &subject, &text, &html).await
    }
}

fn reset_code_text(code: &str) -> String {
    format!(
        "Password Reset Code\n\n\
        Hello,\n\n\
        We received a request to reset your password for your {APP_NAME} parent account.\n\n\
        Your password reset code is: {code}\n\n\
        Enter this code in the app to reset your password.\n\n\
        This code will expire in 15 minutes.\n\n\
        If you didn't request a password reset, you can safely ignore this email.\n\n\
        ---\n\
        This is an automated message from {APP_NAME}. Please do not reply to this email."
    )
}

#[async_trait]
impl Notifier for EmailService {
    async fn send_reset_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        self.send_password_reset_code(email, code).await
    }
}
