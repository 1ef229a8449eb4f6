//! Email template rendering engine.
//!
//! Handlebars escapes every `{{value}}` as HTML, so user-supplied titles,
//! names and payload values can be interpolated directly.

use crate::error::{NotificationError, NotificationResult};
use handlebars::Handlebars;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Rendered email bodies.
#[derive(Debug, Clone)]
pub struct RenderedBody {
    pub html: String,
    pub text: String,
}

/// Template engine for rendering notification emails.
///
/// The plain-text body lives in its own registry with escaping disabled.
#[derive(Clone)]
pub struct TemplateEngine {
    html: Arc<Handlebars<'static>>,
    text: Arc<Handlebars<'static>>,
}

impl TemplateEngine {
    const TEMPLATE_NAME: &'static str = "notification";

    /// Create a new template engine with all templates registered.
    pub fn new() -> NotificationResult<Self> {
        let html = registry(NOTIFICATION_HTML_TEMPLATE, false)?;
        let text = registry(NOTIFICATION_TEXT_TEMPLATE, true)?;

        Ok(Self {
            html: Arc::new(html),
            text: Arc::new(text),
        })
    }

    /// Render the HTML and plain-text bodies for one email view.
    pub fn render_notification<T: Serialize>(&self, view: &T) -> NotificationResult<RenderedBody> {
        debug!(template = Self::TEMPLATE_NAME, "Rendering template");
        let html = self.html.render(Self::TEMPLATE_NAME, view)?;
        let text = self.text.render(Self::TEMPLATE_NAME, view)?;
        Ok(RenderedBody { html, text })
    }
}

fn registry(source: &str, plain_text: bool) -> NotificationResult<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    if plain_text {
        handlebars.register_escape_fn(handlebars::no_escape);
    }
    handlebars
        .register_template_string(TemplateEngine::TEMPLATE_NAME, source)
        .map_err(|e| NotificationError::Template(format!("Failed to register template: {}", e)))?;
    Ok(handlebars)
}

const NOTIFICATION_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{{subject}}</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background-color: #f4f4f5;">
  <table role="presentation" width="100%" cellspacing="0" cellpadding="0" style="max-width: 600px; margin: 0 auto; padding: 40px 20px;">
    <tr>
      <td style="background-color: {{header_color}}; border-radius: 8px 8px 0 0; padding: 24px 40px;">
        <p style="color: #ffffff; font-size: 18px; font-weight: 700; margin: 0;">{{brand_name}}</p>
      </td>
    </tr>
    <tr>
      <td style="background-color: #ffffff; border-radius: 0 0 8px 8px; padding: 40px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);">
        <h1 style="color: #18181b; font-size: 24px; font-weight: 600; margin: 0 0 16px 0;">
          {{title}}
        </h1>
        {{#if body}}
        <p style="color: #52525b; font-size: 16px; line-height: 24px; margin: 0 0 24px 0;">
          {{body}}
        </p>
        {{/if}}
        {{#if details}}
        <table width="100%" cellspacing="0" cellpadding="0" style="background-color: #f8fafc; border-radius: 8px; padding: 16px; margin: 0 0 24px 0;">
          {{#each details}}
          <tr>
            <td style="color: #71717a; font-size: 14px; padding: 6px 12px; width: 35%;">{{label}}</td>
            <td style="color: #18181b; font-size: 14px; font-weight: 500; padding: 6px 12px;">{{value}}</td>
          </tr>
          {{/each}}
        </table>
        {{/if}}
        <table width="100%" cellspacing="0" cellpadding="0">
          <tr>
            <td style="text-align: center;">
              <a href="{{cta_url}}" style="display: inline-block; background-color: {{header_color}}; color: #ffffff; font-size: 16px; font-weight: 500; padding: 12px 32px; text-decoration: none; border-radius: 6px;">
                {{cta_label}}
              </a>
            </td>
          </tr>
        </table>
      </td>
    </tr>
    <tr>
      <td style="padding: 24px 0; text-align: center;">
        {{#if organization}}
        <p style="color: #71717a; font-size: 12px; margin: 0 0 8px 0;">
          Sent on behalf of {{organization.name}}{{#if organization.email}} &middot; {{organization.email}}{{/if}}{{#if organization.website}} &middot; <a href="{{organization.website}}" style="color: #71717a;">{{organization.website}}</a>{{/if}}
        </p>
        {{/if}}
        <p style="color: #71717a; font-size: 12px; margin: 0 0 16px 0;">
          <a href="{{preferences_url}}" style="color: #0d9488; text-decoration: none;">Manage notification preferences</a>
        </p>
        <p style="color: #a1a1aa; font-size: 11px; margin: 0;">
          Rallia
        </p>
      </td>
    </tr>
  </table>
</body>
</html>"#;

const NOTIFICATION_TEXT_TEMPLATE: &str = r#"{{title}}
{{#if body}}

{{body}}
{{/if}}
{{#if details}}

{{#each details}}
{{label}}: {{value}}
{{/each}}
{{/if}}

{{cta_label}}: {{cta_url}}

---
{{#if organization}}
Sent on behalf of {{organization.name}}
{{/if}}
Manage notification preferences: {{preferences_url}}

Rallia"#;
