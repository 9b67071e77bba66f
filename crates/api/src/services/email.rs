//! Email delivery of notifications.
//!
//! Supports two providers:
//! - `console`: logs emails (development)
//! - `smtp`: sends through an SMTP relay with STARTTLS via `lettre`

use chrono::{DateTime, Utc};
use domain::models::{Notification, NotificationPriority};
use handlebars::Handlebars;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::EmailConfig;

const SUBJECT_PREFIX: &str = "[Hedgehog Rescue]";

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Unknown email provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid email address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Invalid email template: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Failed to render email: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
}

/// Email service for notification and summary emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Provider state reported by the health endpoint.
    pub fn status(&self) -> &'static str {
        if !self.config.enabled {
            return "disabled";
        }
        match self.config.provider.as_str() {
            "console" => "console",
            "smtp" if self.config.smtp_host.is_empty() => "not_configured",
            "smtp" => "smtp",
            _ => "not_configured",
        }
    }

    /// Send an email message. A disabled service silently succeeds.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(message).await,
            "smtp" => self.send_smtp(message).await,
            provider => Err(EmailError::UnknownProvider(provider.to_string())),
        }
    }

    /// Sends a single notification.
    pub async fn send_notification(
        &self,
        notification: &Notification,
        to: &str,
    ) -> Result<(), EmailError> {
        let message = render_notification(notification, to, &self.config.base_url)?;
        self.send(message).await
    }

    /// Sends the daily digest of `notifications`, which are expected highest
    /// priority first.
    pub async fn send_daily_summary(
        &self,
        notifications: &[Notification],
        to: &str,
        now: DateTime<Utc>,
    ) -> Result<(), EmailError> {
        let message = render_summary(notifications, to, &self.config.base_url, now)?;
        self.send(message).await
    }

    async fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            from = %self.config.sender_email,
            from_name = %self.config.sender_name,
            "Email (console provider)"
        );
        info!(body_text = %message.body_text, "Email body (plain text)");
        debug!(body_html_length = message.body_html.len(), "Email body (HTML)");
        Ok(())
    }

    async fn send_smtp(&self, message: EmailMessage) -> Result<(), EmailError> {
        use lettre::{
            message::{Mailbox, MultiPart},
            transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        if self.config.smtp_host.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let from = Mailbox::new(
            Some(self.config.sender_name.clone()),
            self.config.sender_email.parse()?,
        );

        let email = Message::builder()
            .from(from)
            .to(message.to.parse()?)
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.body_text,
                message.body_html,
            ))
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder = if self.config.smtp_use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        if !self.config.smtp_username.is_empty() {
            transport_builder = transport_builder.credentials(Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            ));
        }

        transport_builder.build().send(email).await?;

        info!(to = %message.to, subject = %message.subject, "Email sent via SMTP");
        Ok(())
    }
}

const NOTIFICATION_TEMPLATE: &str = "notification-html";
const SUMMARY_TEMPLATE: &str = "daily-summary-html";

/// Registers the HTML bodies. Values rendered with `{{...}}` are escaped.
fn register_templates(registry: &mut Handlebars<'_>) -> Result<(), EmailError> {
    registry.register_template_string(
        NOTIFICATION_TEMPLATE,
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{{title}}</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto;">
    <div style="background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 20px; text-align: center;">
        <h1 style="margin: 0; font-size: 22px;">Hedgehog Rescue</h1>
        <p style="margin: 0;">Care notifications</p>
    </div>
    <div style="padding: 20px;">
        <div style="background: #f8f9fa; border-left: 4px solid {{color}}; padding: 15px;">
            <h3 style="margin-top: 0;">{{title}}</h3>
            <p>{{message}}</p>
            <p><strong>Priority:</strong> {{priority}}<br><strong>Date:</strong> {{created}}</p>
            {{#if action_link}}
            <p><a href="{{action_link}}" style="display: inline-block; background: #f59e0b; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px;">{{action_label}}</a></p>
            {{/if}}
        </div>
        {{#if details}}
        <h4>Details</h4><pre style="background: #f8f9fa; padding: 10px; border-radius: 5px;">{{details}}</pre>
        {{/if}}
    </div>
    <div style="background: #f8f9fa; padding: 15px; text-align: center; font-size: 0.9em; color: #666;">
        <p>This is an automatic message from the rescue center care system.</p>
        <p><a href="{{base_url}}/notifications">Manage notifications</a> | <a href="{{base_url}}/notification-settings">Settings</a></p>
    </div>
</body>
</html>"#,
    )?;

    registry.register_template_string(
        SUMMARY_TEMPLATE,
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Daily summary</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto;">
    <div style="background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 20px; text-align: center;">
        <h1 style="margin: 0; font-size: 22px;">Daily summary</h1>
        <p style="margin: 0;">{{date}}</p>
    </div>
    <div style="padding: 20px;">
        <div style="background: #f8f9fa; padding: 20px; border-radius: 8px;">
            <p><strong>Critical:</strong> {{critical}} &middot; <strong>High:</strong> {{high}} &middot; <strong>Normal:</strong> {{normal}} &middot; <strong>Total:</strong> {{total}}</p>
        </div>
        {{#each sections}}
        <h3 style="color: {{color}};">{{heading}}</h3>
        {{#each items}}
        <div style="background: white; margin: 10px 0; padding: 15px; border-radius: 8px; border-left: 4px solid {{color}};"><h4 style="margin: 0;">{{title}}</h4><p>{{message}}</p><p style="font-size: 0.9em; color: #666;">{{time}}</p></div>
        {{/each}}
        {{/each}}
    </div>
    <div style="background: #f8f9fa; padding: 15px; text-align: center; font-size: 0.9em; color: #666;">
        <p><a href="{{base_url}}/notifications">View all notifications</a></p>
    </div>
</body>
</html>"#,
    )?;

    Ok(())
}

fn render_html(template: &str, data: &serde_json::Value) -> Result<String, EmailError> {
    let mut registry = Handlebars::new();
    register_templates(&mut registry)?;
    Ok(registry.render(template, data)?)
}

fn priority_color(priority: NotificationPriority) -> &'static str {
    match priority {
        NotificationPriority::Critical => "#dc3545",
        NotificationPriority::High => "#fd7e14",
        NotificationPriority::Medium => "#0d6efd",
        NotificationPriority::Low => "#6c757d",
    }
}

/// Pretty-printed evaluator data, or `None` when there is nothing to show.
fn additional_data(data: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(data).ok()?;
    match &value {
        serde_json::Value::Object(map) if map.is_empty() => None,
        serde_json::Value::Null => None,
        _ => serde_json::to_string_pretty(&value).ok(),
    }
}

pub fn render_notification(
    notification: &Notification,
    to: &str,
    base_url: &str,
) -> Result<EmailMessage, EmailError> {
    let subject = format!("{} {}", SUBJECT_PREFIX, notification.title);
    let created = notification.created_at.format("%d/%m/%Y %H:%M").to_string();
    let details = additional_data(&notification.data);
    let action_link = (!notification.action_url.is_empty())
        .then(|| format!("{}{}", base_url, notification.action_url));

    let mut body_text = format!(
        "{title}\n\n{message}\n\nPriority: {priority}\nDate: {created}\n",
        title = notification.title,
        message = notification.message,
        priority = notification.priority,
    );
    if let Some(link) = &action_link {
        body_text.push_str(&format!("\n{}: {}\n", notification.action_label, link));
    }
    if let Some(details) = &details {
        body_text.push_str(&format!("\nDetails:\n{}\n", details));
    }
    body_text.push_str(&format!("\nManage notifications: {base_url}/notifications\n"));

    let body_html = render_html(
        NOTIFICATION_TEMPLATE,
        &json!({
            "title": notification.title,
            "message": notification.message,
            "priority": notification.priority.to_string(),
            "created": created,
            "color": priority_color(notification.priority),
            "action_link": action_link,
            "action_label": notification.action_label,
            "details": details,
            "base_url": base_url,
        }),
    )?;

    Ok(EmailMessage {
        to: to.to_string(),
        subject,
        body_text,
        body_html,
    })
}

pub fn render_summary(
    notifications: &[Notification],
    to: &str,
    base_url: &str,
    now: DateTime<Utc>,
) -> Result<EmailMessage, EmailError> {
    let count = |p: NotificationPriority| notifications.iter().filter(|n| n.priority == p).count();
    let critical = count(NotificationPriority::Critical);
    let high = count(NotificationPriority::High);
    let normal = notifications.len() - critical - high;
    let date = now.format("%d/%m/%Y").to_string();

    let subject = format!(
        "{} Daily summary - {} notifications",
        SUBJECT_PREFIX,
        notifications.len()
    );

    let mut body_text = format!(
        "Daily summary for {date}\n\nCritical: {critical}\nHigh: {high}\nNormal: {normal}\n\
         Total: {total}\n",
        total = notifications.len(),
    );

    let mut sections = Vec::new();
    for (priority, heading) in [
        (NotificationPriority::Critical, "Critical notifications"),
        (NotificationPriority::High, "High priority notifications"),
    ] {
        let items: Vec<&Notification> = notifications
            .iter()
            .filter(|n| n.priority == priority)
            .collect();
        if items.is_empty() {
            continue;
        }

        body_text.push_str(&format!("\n{}:\n", heading));
        let mut rendered = Vec::with_capacity(items.len());
        for n in items {
            let time = n.created_at.format("%H:%M").to_string();
            body_text.push_str(&format!("- [{}] {}: {}\n", time, n.title, n.message));
            rendered.push(json!({
                "title": n.title,
                "message": n.message,
                "time": time,
                "color": priority_color(priority),
            }));
        }
        sections.push(json!({
            "heading": heading,
            "color": priority_color(priority),
            "items": rendered,
        }));
    }
    body_text.push_str(&format!("\nAll notifications: {base_url}/notifications\n"));

    let body_html = render_html(
        SUMMARY_TEMPLATE,
        &json!({
            "date": date,
            "critical": critical,
            "high": high,
            "normal": normal,
            "total": notifications.len(),
            "sections": sections,
            "base_url": base_url,
        }),
    )?;

    Ok(EmailMessage {
        to: to.to_string(),
        subject,
        body_text,
        body_html,
    })
}
