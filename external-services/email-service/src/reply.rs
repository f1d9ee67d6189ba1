//! Strips quoted history from patient replies.

/// Line prefixes that start quoted or forwarded content
const QUOTE_PREFIXES: &[&str] = &[
    "On ",
    ">",
    "-----Original Message-----",
    "From:",
    "Sent:",
    "To:",
    "Subject:",
    "________________________________",
    "---",
    "wrote:",
    "<",
];

/// Markers tried, in order, when line filtering leaves almost nothing
const SPLIT_MARKERS: &[&str] = &["On ", "wrote:", "-----Original"];

const MIN_REPLY_CHARS: usize = 5;
const MIN_BODY_CHARS_FOR_SPLIT: usize = 50;

fn starts_quote(line: &str) -> bool {
    QUOTE_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
        || line.to_lowercase().contains("wrote:")
        || (line.contains('@')
            && (line.contains('<') || line.contains("gmail.com") || line.contains(".com>")))
}

/// New text of a reply: the non-blank lines before the first quote line.
///
/// Falls back to the text before the first split marker, then to the
/// untouched body, when filtering keeps fewer than five characters.
pub fn extract_reply_content(body: &str) -> String {
    if body.is_empty() {
        return String::new();
    }

    let reply_lines: Vec<&str> = body
        .lines()
        .take_while(|line| !starts_quote(line.trim()))
        .filter(|line| !line.trim().is_empty())
        .collect();
    let mut reply = reply_lines.join("\n").trim().to_string();

    if reply.chars().count() < MIN_REPLY_CHARS && body.chars().count() > MIN_BODY_CHARS_FOR_SPLIT {
        reply = SPLIT_MARKERS
            .iter()
            .find_map(|marker| body.split_once(marker))
            .map(|(before, _)| before.trim().to_string())
            .unwrap_or_default();

        if reply.chars().count() < MIN_REPLY_CHARS {
            reply = body.to_string();
        }
    }

    if reply.is_empty() {
        body.to_string()
    } else {
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gmail_style_reply() {
        let body = "Thanks, the rash is better.\nShould I keep the cream?\n\nOn Fri, Nov 14, 2025 at 7:47 PM AIscribe <clinic@example.com> wrote:\n> Dear Patient,\n> Thank you for your visit.";
        assert_eq!(
            extract_reply_content(body),
            "Thanks, the rash is better.\nShould I keep the cream?"
        );
    }

    #[test]
    fn test_outlook_style_reply() {
        let body = "See you Tuesday.\r\n\r\n________________________________\r\nFrom: AIscribe Medical Team\r\nSent: Monday\r\nSubject: Visit Summary";
        assert_eq!(extract_reply_content(body), "See you Tuesday.");
    }

    #[test]
    fn test_plain_message_untouched() {
        let body = "I have a question about my dosage.\nIs 200mg right?";
        assert_eq!(extract_reply_content(body), body);
    }

    #[test]
    fn test_quote_first_falls_back_to_original() {
        let body = "> Dear Patient,\n> Thank you for your recent visit, here is your summary and plan.";
        assert_eq!(extract_reply_content(body), body);
    }

    #[test]
    fn test_header_like_address_line_stops_reply() {
        let body = "ok\nJane Doe <jane@example.com>\nmore quoted text";
        assert_eq!(extract_reply_content(body), "ok");
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(extract_reply_content(""), "");
    }
}
