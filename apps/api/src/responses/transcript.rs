/// Rewrites a raw provider transcript for recruiter display: speaker tags become bold
/// labels and every line break becomes a paragraph break.
pub fn format_transcript(transcript: &str, candidate_name: &str) -> String {
    let labelled = transcript
        .replace("Agent:", "**AI interviewer:**")
        .replace("User:", &format!("**{candidate_name}:**"));

    let mut out = String::with_capacity(labelled.len() + labelled.len() / 8);
    let mut chars = labelled.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\n\n");
            }
            '\n' => out.push_str("\n\n"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_labels_replaced() {
        let formatted = format_transcript("Agent: Hi there\nUser: Hello", "Ada");
        assert_eq!(formatted, "**AI interviewer:** Hi there\n\n**Ada:** Hello");
    }

    #[test]
    fn test_crlf_counts_as_one_break() {
        let formatted = format_transcript("Agent: One\r\nUser: Two\rAgent: Three", "Bo");
        assert_eq!(
            formatted,
            "**AI interviewer:** One\n\n**Bo:** Two\n\n**AI interviewer:** Three"
        );
    }

    #[test]
    fn test_every_newline_doubled() {
        assert_eq!(format_transcript("a\n\nb", "x"), "a\n\n\n\nb");
    }
}
