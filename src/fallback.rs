//! Local fallback responder used when the assistant backend is unreachable.
//!
//! Pure function: case-insensitive substring matching against an ordered list
//! of keyword groups, first matching group wins.

/// Ordered keyword groups and their canned replies. Order matters: a message
/// matching several groups gets the reply of the first one listed here.
const GROUPS: &[(&[&str], &str)] = &[
    (
        &["hello", "hi"],
        "Hello! How can I assist you with your education today?",
    ),
    (
        &["how are you"],
        "I'm just a program, but I'm functioning well! How can I help you?",
    ),
    (
        &["bye", "goodbye"],
        "Goodbye! Feel free to come back if you have more questions.",
    ),
    (
        &["thank"],
        "You're welcome! Is there anything else I can help you with?",
    ),
    (
        &["math", "mathematics"],
        "I can help with mathematics! What specific topic or problem are you interested in?",
    ),
    (
        &["science"],
        "Science is fascinating! What area of science are you studying? Biology, Chemistry, Physics, or something else?",
    ),
    (
        &["history"],
        "History is full of important lessons. Which historical period or event would you like to discuss?",
    ),
];

/// Reply when no keyword group matches.
const DEFAULT_REPLY: &str =
    "I'm here to help with your educational questions. Could you provide more details about what you'd like to learn?";

/// Produce a canned reply for `message`.
pub fn reply(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    for (keywords, response) in GROUPS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return response;
        }
    }
    DEFAULT_REPLY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_matches_case_insensitively() {
        assert_eq!(
            reply("HELLO there"),
            "Hello! How can I assist you with your education today?"
        );
    }

    #[test]
    fn first_matching_group_wins() {
        // "Hi" matches the greeting group, which is checked before thanks.
        assert_eq!(
            reply("Hi there, thanks!"),
            "Hello! How can I assist you with your education today?"
        );
    }

    #[test]
    fn history_query_gets_history_reply() {
        assert_eq!(
            reply("Tell me about history"),
            "History is full of important lessons. Which historical period or event would you like to discuss?"
        );
    }

    #[test]
    fn thank_matches_thanks_and_thank_you() {
        let expected = "You're welcome! Is there anything else I can help you with?";
        assert_eq!(reply("thanks"), expected);
        assert_eq!(reply("Thank you so much"), expected);
    }

    #[test]
    fn unmatched_input_gets_prompt_for_detail() {
        assert_eq!(reply("quantum entanglement"), DEFAULT_REPLY);
    }

    #[test]
    fn substring_match_inside_words() {
        // Matching is plain substring: "hi" also hits inside "this".
        assert_eq!(
            reply("this"),
            "Hello! How can I assist you with your education today?"
        );
    }
}
