// crates/keepsake-server/src/llm/prompt.rs
// Prompt construction for question answering and daily summaries
//
// Everything here is pure: same inputs always produce the same prompt
// string, no I/O, no clock reads. The pipelines pass the resulting blocks
// straight to the completion backend.

use keepsake_types::{Memory, Question};

/// Context block used when an elder has no memories yet
pub const NO_MEMORIES: &str = "No memories recorded yet.";

/// Role instructions for answering questions from memories
const ANSWER_INSTRUCTIONS: &str = r#"You are a gentle memory companion for an elderly person.
Answer their question using only the recorded memories below. Speak warmly
and simply, in short sentences. If the memories do not contain the answer,
say so kindly instead of guessing."#;

/// Role instructions for summarizing a day
const SUMMARY_INSTRUCTIONS: &str = r#"You are a gentle memory companion for an elderly person.
Write a short, warm narrative summary of their day from the recorded
memories and questions below. Two or three sentences, plain language,
no lists."#;

/// A two-part instruction for a completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Format memories as a context block: "Memory i (kind): body", blank-line
/// separated. Empty input yields the fixed no-memories string.
fn memory_context(memories: &[Memory]) -> String {
    if memories.is_empty() {
        return NO_MEMORIES.to_string();
    }

    memories
        .iter()
        .enumerate()
        .map(|(i, m)| format!("Memory {} ({}): {}", i + 1, m.kind, m.body))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the prompt for the ask-question operation.
///
/// The question text is passed through as-is; validation happened upstream.
pub fn answer_prompt(memories: &[Memory], question: &str) -> Prompt {
    Prompt {
        system: format!("{ANSWER_INSTRUCTIONS}\n\n{}", memory_context(memories)),
        user: question.to_string(),
    }
}

/// Build the prompt for the daily summary operation.
pub fn summary_prompt(day: &str, memories: &[Memory], questions: &[Question]) -> Prompt {
    let mut user = format!("Summarize the day {day}.\n\n{}", memory_context(memories));

    if !questions.is_empty() {
        let asked = questions
            .iter()
            .enumerate()
            .map(|(i, q)| format!("Question {}: {}", i + 1, q.question))
            .collect::<Vec<_>>()
            .join("\n");
        user.push_str("\n\nQuestions asked today:\n");
        user.push_str(&asked);
    }

    Prompt {
        system: SUMMARY_INSTRUCTIONS.to_string(),
        user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_types::MemoryKind;

    fn memory(id: i64, kind: MemoryKind, body: &str) -> Memory {
        Memory {
            id,
            elder_id: "e1".into(),
            kind,
            body: body.into(),
            image_url: None,
            extraction: None,
            tags: vec![],
            emotional_tone: None,
            created_at: "2026-08-27 09:00:00".into(),
            updated_at: "2026-08-27 09:00:00".into(),
        }
    }

    #[test]
    fn test_empty_memories_uses_fallback_block() {
        let prompt = answer_prompt(&[], "Where did I go?");
        assert!(prompt.system.ends_with(NO_MEMORIES));
        assert_eq!(prompt.user, "Where did I go?");
    }

    #[test]
    fn test_context_enumerates_memories() {
        let memories = vec![
            memory(1, MemoryKind::Story, "We went to the lake"),
            memory(2, MemoryKind::Medication, "Blue pill at breakfast"),
        ];
        let prompt = answer_prompt(&memories, "What pill do I take?");
        assert!(prompt.system.contains("Memory 1 (story): We went to the lake"));
        assert!(
            prompt
                .system
                .contains("Memory 2 (medication): Blue pill at breakfast")
        );
        // Blank-line separated
        assert!(prompt.system.contains("lake\n\nMemory 2"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let memories = vec![memory(1, MemoryKind::Event, "Birthday party on Sunday")];
        let a = answer_prompt(&memories, "When is the party?");
        let b = answer_prompt(&memories, "When is the party?");
        assert_eq!(a, b);
    }

    #[test]
    fn test_question_text_not_rewritten() {
        let raw = "  What happened?  ";
        let prompt = answer_prompt(&[], raw);
        assert_eq!(prompt.user, raw);
    }

    #[test]
    fn test_summary_prompt_includes_questions() {
        let memories = vec![memory(1, MemoryKind::Story, "Walked in the garden")];
        let questions = vec![keepsake_types::Question {
            id: "q-1".into(),
            elder_id: "e1".into(),
            question: "Who visited me?".into(),
            answer: Some("Anna".into()),
            matched_memory_ids: vec![],
            created_at: "2026-08-27 10:00:00".into(),
        }];

        let prompt = summary_prompt("2026-08-27", &memories, &questions);
        assert!(prompt.user.contains("2026-08-27"));
        assert!(prompt.user.contains("Memory 1 (story): Walked in the garden"));
        assert!(prompt.user.contains("Question 1: Who visited me?"));
    }

    #[test]
    fn test_summary_prompt_without_questions_omits_section() {
        let prompt = summary_prompt("2026-08-27", &[], &[]);
        assert!(!prompt.user.contains("Questions asked today"));
        assert!(prompt.user.contains(NO_MEMORIES));
    }
}
