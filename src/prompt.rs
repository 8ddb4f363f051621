//! Prompt assembly for the two model flows.
//!
//! Budgets keep prompts inside the model's context window; both are byte
//! thresholds checked before a char-boundary-safe cut, so multi-byte text
//! never panics the truncation.

use crate::sessions::ChatExchange;

/// Cleaned markup allowance for XPath generation.
pub const XPATH_CONTENT_BUDGET: usize = 50_000;

/// Page-text allowance for chat answers.
pub const CHAT_CONTENT_BUDGET: usize = 15_000;

/// Number of prior exchanges replayed into a chat prompt.
pub const HISTORY_WINDOW: usize = 5;

/// Builds the locator-generation prompt. The reply contract (one XPath per
/// line, nothing else) is what `xpath::parse_model_xpaths` expects.
pub fn xpath_prompt(url: &str, cleaned_html: &str) -> String {
    let content = truncate_with_marker(cleaned_html, XPATH_CONTENT_BUDGET);
    format!(
        r#"Analyze the following HTML content from the website: {url}

Extract ALL possible XPaths for the elements in this HTML. Focus on:
1. Form elements (inputs, buttons, textareas, selects)
2. Clickable elements (buttons, links, clickable divs)
3. Text elements (headings, paragraphs, spans)
4. Navigation elements
5. Containers with meaningful content
6. Images and media elements
7. Table elements if present
8. List elements

For each element provide the most specific and reliable XPath. Include both absolute and relative XPaths when useful.

HTML content:
{content}

Respond with ONLY the XPaths, one per line, without any additional text or explanations."#
    )
}

/// Builds the grounded question-answering prompt: page text, a replay of the
/// most recent exchanges (oldest first), then the new question.
pub fn chat_prompt(
    title: &str,
    content: &str,
    history: &[ChatExchange],
    message: &str,
) -> String {
    let content = truncate_with_marker(content, CHAT_CONTENT_BUDGET);

    let window = if history.len() > HISTORY_WINDOW {
        &history[history.len() - HISTORY_WINDOW..]
    } else {
        history
    };
    let mut transcript = String::new();
    if !window.is_empty() {
        transcript.push_str("Previous conversation:\n");
        for exchange in window {
            transcript.push_str("User: ");
            transcript.push_str(&exchange.user_message);
            transcript.push_str("\nAssistant: ");
            transcript.push_str(&exchange.ai_response);
            transcript.push('\n');
        }
        transcript.push('\n');
    }

    format!(
        r#"You are answering questions about the website "{title}".

Website content:
{content}

{transcript}Answer using ONLY the website content above. If the content does not contain the answer, say the page does not provide that information.

User question: {message}"#
    )
}

/// Truncates to at most `max_len` bytes' worth of whole characters, marking
/// the cut with an ellipsis. Input at or under the limit passes through.
pub fn truncate_with_marker(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut cut: String = text
        .char_indices()
        .take_while(|(i, _)| *i < max_len)
        .map(|(_, c)| c)
        .collect();
    cut.push('\u{2026}');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(n: usize) -> ChatExchange {
        ChatExchange {
            user_message: format!("question {n}"),
            ai_response: format!("answer {n}"),
            timestamp: n as f64,
        }
    }

    #[test]
    fn xpath_prompt_carries_url_content_and_contract() {
        let prompt = xpath_prompt("https://example.com", "<p>Hi</p>");
        assert!(prompt.contains("https://example.com"));
        assert!(prompt.contains("<p>Hi</p>"));
        assert!(prompt.contains("one per line"));
        assert!(prompt.ends_with("without any additional text or explanations."));
    }

    #[test]
    fn xpath_prompt_truncates_oversized_markup() {
        let big = "x".repeat(XPATH_CONTENT_BUDGET + 100);
        let prompt = xpath_prompt("https://example.com", &big);
        assert!(prompt.contains('\u{2026}'));
        assert!(!prompt.contains(&big));
    }

    #[test]
    fn chat_prompt_contains_page_and_question() {
        let prompt = chat_prompt("Docs", "Hello world", &[], "What is this?");
        assert!(prompt.contains("\"Docs\""));
        assert!(prompt.contains("Hello world"));
        assert!(prompt.contains("User question: What is this?"));
        assert!(!prompt.contains("Previous conversation:"));
    }

    #[test]
    fn chat_prompt_replays_only_the_last_five_exchanges() {
        let history: Vec<ChatExchange> = (1..=8).map(exchange).collect();
        let prompt = chat_prompt("T", "content", &history, "next");
        for n in 1..=3 {
            assert!(!prompt.contains(&format!("question {n}")));
        }
        for n in 4..=8 {
            assert!(prompt.contains(&format!("question {n}")));
        }
        // Oldest first within the window.
        let a = prompt.find("question 4").unwrap();
        let b = prompt.find("question 8").unwrap();
        assert!(a < b);
    }

    #[test]
    fn short_history_is_replayed_whole() {
        let history: Vec<ChatExchange> = (1..=2).map(exchange).collect();
        let prompt = chat_prompt("T", "content", &history, "next");
        assert!(prompt.contains("question 1"));
        assert!(prompt.contains("answer 2"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 'é' is two bytes; the char starting at byte 2 is kept whole
        // rather than split by the byte limit.
        let text = "ééé";
        let cut = truncate_with_marker(text, 3);
        assert_eq!(cut, "éé\u{2026}");
    }

    #[test]
    fn truncation_passes_short_text_through() {
        assert_eq!(truncate_with_marker("abc", 10), "abc");
        assert_eq!(truncate_with_marker("abc", 3), "abc");
    }
}
