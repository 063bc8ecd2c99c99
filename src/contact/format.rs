//! Email body formatting
//!
//! Renders a validated submission into the HTML and plain-text bodies sent
//! to the site owner. All submitted values are escaped before they land in
//! markup.

use super::ContactRequest;

pub fn subject(request: &ContactRequest) -> String {
    format!("New contact from {}", request.name)
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Label/value pairs for the detail table; optional fields drop out
fn detail_rows(request: &ContactRequest) -> Vec<(&'static str, &str)> {
    let mut rows: Vec<(&'static str, &str)> = vec![
        ("Name", request.name.as_str()),
        ("Email", request.email.as_str()),
    ];
    if let Some(company) = &request.company {
        rows.push(("Company", company));
    }
    if let Some(project_type) = &request.project_type {
        rows.push(("Project Type", project_type));
    }
    if let Some(budget) = &request.budget {
        rows.push(("Budget", budget));
    }
    if let Some(timeline) = &request.timeline {
        rows.push(("Timeline", timeline));
    }
    rows
}

pub fn format_html(request: &ContactRequest) -> String {
    let rows_html: String = detail_rows(request)
        .into_iter()
        .map(|(label, value)| {
            format!(
                "<tr>\
                 <td style=\"padding: 8px 12px; font-weight: 600; background:#F7FAFF; width: 160px;\">{label}</td>\
                 <td style=\"padding: 8px 12px;\">{}</td>\
                 </tr>",
                escape_html(value)
            )
        })
        .collect();

    format!(
        "<div style=\"font-family: 'Inter', sans-serif; color: #0B1220; line-height: 1.6;\">\
         <h2 style=\"margin-bottom: 12px; font-size: 20px;\">New contact request</h2>\
         <p style=\"margin: 0 0 16px;\">A new message just came through the portfolio. Here are the details:</p>\
         <table style=\"border-collapse: collapse; width: 100%;\"><tbody>{rows_html}</tbody></table>\
         <div style=\"margin-top: 24px;\">\
         <h3 style=\"margin-bottom: 8px; font-size: 16px;\">Message</h3>\
         <div style=\"padding: 16px; background: #F0F4FF; border-radius: 12px; white-space: pre-wrap;\">{}</div>\
         </div>\
         </div>",
        escape_html(&request.message)
    )
}

pub fn format_text(request: &ContactRequest) -> String {
    let detail_lines: String = detail_rows(request)
        .into_iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "New contact request\n\n{detail_lines}\n\nMessage:\n{}\n",
        request.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ContactRequest {
        ContactRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hello <world>".to_string(),
            company: Some("Analytical Engines & Co".to_string()),
            budget: None,
            timeline: None,
            project_type: None,
        }
    }

    #[test]
    fn test_subject_carries_name() {
        assert_eq!(subject(&request()), "New contact from Ada");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"a" & 'b'</b>"#),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_html_escapes_submitted_values() {
        let html = format_html(&request());
        assert!(html.contains("Hello &lt;world&gt;"));
        assert!(html.contains("Analytical Engines &amp; Co"));
        assert!(!html.contains("Hello <world>"));
    }

    #[test]
    fn test_optional_rows_omitted() {
        let html = format_html(&request());
        assert!(html.contains("Company"));
        assert!(!html.contains("Budget"));
        assert!(!html.contains("Timeline"));

        let text = format_text(&request());
        assert!(text.contains("Company: Analytical Engines & Co"));
        assert!(!text.contains("Budget:"));
    }

    #[test]
    fn test_text_body_shape() {
        let text = format_text(&request());
        assert!(text.starts_with("New contact request\n\n"));
        assert!(text.contains("Name: Ada\nEmail: ada@example.com"));
        assert!(text.ends_with("Message:\nHello <world>\n"));
    }
}
