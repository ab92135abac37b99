// Handlebars templates for appointment mail
use handlebars::Handlebars;
use serde_json::json;

use crate::error::{EmailError, EmailResult};
use crate::mailer::{AppointmentEmail, AppointmentEmailKind};

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>{{subject}}</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: #0f766e; padding: 24px; border-radius: 10px 10px 0 0;">
        <h1 style="color: white; margin: 0; font-size: 24px;">{{clinic_name}}</h1>
    </div>
    <div style="background: #f9f9f9; padding: 24px; border-radius: 0 0 10px 10px;">
        <p>Dear {{patient_name}},</p>
        <p>{{headline}}</p>
        <div style="background: white; padding: 16px; border-left: 4px solid #0f766e; margin: 20px 0;">
            <p style="margin: 6px 0;"><strong>Date:</strong> {{date}}</p>
            <p style="margin: 6px 0;"><strong>Time:</strong> {{time}}</p>
            <p style="margin: 6px 0;"><strong>Reason:</strong> {{reason}}</p>
        </div>
        <p>If you need to change this appointment, please call the clinic.</p>
        <p>Warm regards,<br>{{clinic_name}}</p>
    </div>
</body>
</html>"#;

const TEXT_TEMPLATE: &str = "Dear {{patient_name}},\n\n{{headline}}\n\nDate: {{date}}\nTime: {{time}}\nReason: {{reason}}\n\nIf you need to change this appointment, please call the clinic.\n\n{{clinic_name}}\n";

/// A rendered email ready to hand to the transport
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Renders appointment mail; patient-supplied text is HTML-escaped in the
/// HTML part only
pub struct AppointmentTemplates {
    html: Handlebars<'static>,
    text: Handlebars<'static>,
    clinic_name: String,
}

impl AppointmentTemplates {
    pub fn new(clinic_name: impl Into<String>) -> EmailResult<Self> {
        let mut html = Handlebars::new();
        html.set_strict_mode(true);
        html.register_template_string("appointment", HTML_TEMPLATE)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let mut text = Handlebars::new();
        text.set_strict_mode(true);
        text.register_escape_fn(handlebars::no_escape);
        text.register_template_string("appointment", TEXT_TEMPLATE)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        Ok(Self {
            html,
            text,
            clinic_name: clinic_name.into(),
        })
    }

    pub fn render(&self, patient_name: &str, appointment: &AppointmentEmail) -> EmailResult<RenderedEmail> {
        let (subject, headline) = match appointment.status {
            AppointmentEmailKind::Scheduled => (
                format!("Appointment Confirmed - {}", self.clinic_name),
                "Your appointment has been scheduled.".to_string(),
            ),
            AppointmentEmailKind::Rescheduled => (
                format!("Appointment Rescheduled - {}", self.clinic_name),
                "Your appointment has been rescheduled. The new details are below.".to_string(),
            ),
        };

        let context = json!({
            "subject": subject,
            "headline": headline,
            "clinic_name": self.clinic_name,
            "patient_name": patient_name,
            "date": appointment.date.format("%A, %d %B %Y").to_string(),
            "time": appointment.time,
            "reason": appointment.reason,
        });

        let html_body = self
            .html
            .render("appointment", &context)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;
        let text_body = self
            .text
            .render("appointment", &context)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        Ok(RenderedEmail { subject, html_body, text_body })
    }
}
