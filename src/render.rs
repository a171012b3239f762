use anyhow::{Context, Error, Result};
use handlebars::Handlebars;

use crate::models::message::StoredAlert;

const ALERT_PAGE: &str = "alert-page";

/// The markdown body travels HTML-escaped inside a hidden textarea and is
/// rendered client-side by marked from the textarea's decoded value.
pub fn register_templates(registry: &mut Handlebars<'_>) -> Result<(), Error> {
    registry
        .register_template_string(
            ALERT_PAGE,
            r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{{title}}</title>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/github-markdown-css/5.2.0/github-markdown-light.min.css">
    <style>
        body { background-color: #f3f4f6; margin: 0; padding: 20px; font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif; }
        .container { max-width: 800px; margin: 0 auto; background: #fff; padding: 30px; border-radius: 12px; box-shadow: 0 4px 6px rgba(0,0,0,0.1); }
        .header { border-bottom: 2px solid #eee; padding-bottom: 15px; margin-bottom: 20px; }
        .title { font-size: 1.5rem; font-weight: bold; color: #111; }
        .meta { color: #666; font-size: 0.9rem; margin-top: 5px; }
        .markdown-body { font-size: 16px; line-height: 1.6; }
        .footer { text-align: center; margin-top: 30px; color: #999; font-size: 0.8rem; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <div class="title">{{title}}</div>
            <div class="meta">📅 {{date}}</div>
        </div>
        <textarea id="raw" hidden>{{content}}</textarea>
        <div class="markdown-body" id="content"></div>
        <div class="footer">Signal Alert</div>
    </div>
    <script src="https://cdn.jsdelivr.net/npm/marked/lib/marked.umd.js"></script>
    <script>
        const raw = document.getElementById('raw').value;
        document.getElementById('content').innerHTML = marked.parse(raw);
    </script>
</body>
</html>"#,
        )
        .context("registering alert-page template")?;

    Ok(())
}

pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, Error> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        register_templates(&mut registry)?;

        Ok(Self { registry })
    }

    pub fn render_alert(&self, alert: &StoredAlert) -> Result<String, Error> {
        self.registry
            .render(ALERT_PAGE, alert)
            .context("rendering alert page")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_content_are_html_escaped() {
        let renderer = PageRenderer::new().unwrap();

        let page = renderer
            .render_alert(&StoredAlert {
                title: "<b>Buy</b> & hold".to_string(),
                content: "line\n</textarea><script>alert(1)</script>".to_string(),
                date: "2024-01-01 08:00:00".to_string(),
            })
            .unwrap();

        assert!(page.contains("<title>&lt;b&gt;Buy&lt;/b&gt; &amp; hold</title>"));
        assert!(page.contains("line\n&lt;/textarea&gt;&lt;script&gt;alert(1)&lt;/script&gt;</textarea>"));
        assert!(!page.contains("<script>alert(1)"));
        assert!(page.contains("📅 2024-01-01 08:00:00"));
    }
}
