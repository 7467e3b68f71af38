use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, instrument};

use crate::config::email::EmailConfig;
use crate::utils::errors::AppError;

pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self, code))]
    pub async fn send_passcode_email(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
    ) -> Result<(), AppError> {
        let html_body = self.passcode_template(to_name, code);
        let text_body = format!(
            "Hi {},\n\n\
             Your Scorebook verification code is: {}\n\n\
             This code will expire in 15 minutes.\n\n\
             If you didn't request this, please ignore this email.\n\n\
             Best regards,\n\
             Scorebook Team",
            to_name, code
        );

        self.send_email(to_email, "Your verification code", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self))]
    pub async fn send_invitation_email(
        &self,
        to_email: &str,
        to_name: &str,
        organization_name: &str,
    ) -> Result<(), AppError> {
        let portal_link = format!("{}/welcome", self.config.frontend_url);
        let html_body = self.invitation_template(to_name, organization_name, &portal_link);
        let text_body = format!(
            "Hi {},\n\n\
             {} has invited you to take part in an assessment on Scorebook.\n\n\
             Get started here:\n{}\n\n\
             Best regards,\n\
             Scorebook Team",
            to_name, organization_name, portal_link
        );

        self.send_email(
            to_email,
            &format!("You're invited by {}", organization_name),
            &text_body,
            &html_body,
        )
        .await
    }

    #[instrument(skip(self, code))]
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
    ) -> Result<(), AppError> {
        let reset_link = format!("{}/reset-password", self.config.frontend_url);
        let html_body = self.password_reset_template(to_name, code, &reset_link);
        let text_body = format!(
            "Hi {},\n\n\
             You requested to reset your password.\n\n\
             Your reset code is: {}\n\n\
             Enter it here: {}\n\n\
             This code will expire in 15 minutes.\n\n\
             If you didn't request this, please ignore this email.\n\n\
             Best regards,\n\
             Scorebook Team",
            to_name, code, reset_link
        );

        self.send_email(to_email, "Password Reset Request", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self, html_body, text_body))]
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            info!(to = %to_email, subject = %subject, "SMTP disabled, skipping email");
            return Ok(());
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(from.parse().map_err(|e| {
                AppError::internal(anyhow::anyhow!("Invalid from email: {}", e))
            })?)
            .to(to_email.parse().map_err(|e| {
                AppError::internal(anyhow::anyhow!("Invalid to email: {}", e))
            })?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| {
                    AppError::internal(anyhow::anyhow!("Failed to create SMTP relay: {}", e))
                })?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal(anyhow::anyhow!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to send email: {}", e)))?;

        Ok(())
    }

    fn passcode_template(&self, name: &str, code: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Your verification code</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
                    <tr>
                        <td style="background-color: #0F766E; padding: 30px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 28px;">Scorebook</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px 30px;">
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px;">
                                Hi <strong>{}</strong>,
                            </p>
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px;">
                                Your verification code is:
                            </p>
                            <p style="margin: 0 0 20px 0; color: #0F766E; font-size: 32px; letter-spacing: 8px; text-align: center;">
                                <strong>{}</strong>
                            </p>
                            <p style="margin: 0; color: #666666; font-size: 14px;">
                                <strong>This code will expire in 15 minutes.</strong>
                                If you didn't request it, you can ignore this email.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#,
            name, code
        )
    }

    fn invitation_template(&self, name: &str, organization_name: &str, link: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>You're invited</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
                    <tr>
                        <td style="background-color: #0F766E; padding: 30px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 28px;">Scorebook</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px 30px;">
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px;">
                                Hi <strong>{}</strong>,
                            </p>
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px;">
                                <strong>{}</strong> has invited you to take part in an assessment.
                            </p>
                            <table width="100%" cellpadding="0" cellspacing="0" style="margin: 30px 0;">
                                <tr>
                                    <td align="center">
                                        <a href="{}" style="display: inline-block; padding: 14px 40px; background-color: #0F766E; color: #ffffff; text-decoration: none; border-radius: 6px; font-size: 16px; font-weight: bold;">Get Started</a>
                                    </td>
                                </tr>
                            </table>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#,
            name, organization_name, link
        )
    }

    fn password_reset_template(&self, name: &str, code: &str, link: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Password Reset Request</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
                    <tr>
                        <td style="background-color: #0F766E; padding: 30px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 28px;">Scorebook</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px 30px;">
                            <h2 style="margin: 0 0 20px 0; color: #333333; font-size: 24px;">Password Reset Request</h2>
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px;">
                                Hi <strong>{}</strong>,
                            </p>
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px;">
                                Your password reset code is:
                            </p>
                            <p style="margin: 0 0 20px 0; color: #0F766E; font-size: 32px; letter-spacing: 8px; text-align: center;">
                                <strong>{}</strong>
                            </p>
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 14px;">
                                Enter it at <a href="{}" style="color: #0F766E;">{}</a>.
                                <strong>This code will expire in 15 minutes.</strong>
                            </p>
                            <p style="margin: 0; color: #666666; font-size: 14px;">
                                If you didn't request this password reset, please ignore this email.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#,
            name, code, link, link
        )
    }
}
