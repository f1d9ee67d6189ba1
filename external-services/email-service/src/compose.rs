use clinical_ai::ClinicalSummarySections;

/// Characters of the chief complaint kept in the subject line
const SUBJECT_COMPLAINT_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedEmail {
    pub subject: String,
    pub body: String,
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("<br>"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn or_na(value: &str) -> &str {
    let value = value.trim();
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

/// Patient-facing visit summary built from the parsed clinical note.
pub fn compose_visit_email(sections: &ClinicalSummarySections) -> ComposedEmail {
    let chief_complaint = or_na(&sections.chief_complaint);
    let assessment_plan = or_na(&sections.assessment_plan);

    let subject_complaint: String = chief_complaint
        .chars()
        .filter(|c| !c.is_control())
        .take(SUBJECT_COMPLAINT_CHARS)
        .collect();

    let body = format!(
        r#"<p>Dear Patient,</p>

<p>Thank you for your recent visit. Below is a summary of your consultation and next steps:</p>

<h3>📝 Visit Summary</h3>
<p><strong>Chief Complaint:</strong> {chief_complaint}</p>

<h3>🏥 Assessment and Treatment Plan</h3>
<p>{assessment_plan}</p>

<h3>💊 Medication Instructions</h3>
<p>Please follow the medication regimen as discussed during your visit. If you have any questions or concerns about your medications, don't hesitate to contact our office.</p>

<h3>📞 Next Steps</h3>
<p>Please schedule a follow-up appointment as recommended. If you experience any worsening symptoms or have concerns, please contact our office immediately.</p>

<p><strong>Important:</strong> This is an automated summary. If you notice any discrepancies, please contact our office.</p>

<p>Best regards,<br>
AIscribe Medical Team</p>"#,
        chief_complaint = escape_html(chief_complaint),
        assessment_plan = escape_html(assessment_plan),
    );

    ComposedEmail {
        subject: format!("Visit Summary - {subject_complaint}"),
        body,
    }
}

/// HTML body for a clinician's free-text reply.
pub fn compose_reply_html(text: &str) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif; line-height: 1.6; color: #333;\">\n<p>{}</p>\n</div>",
        escape_html(text.trim())
    )
}
