use crate::models::domain::{Question, LABELS};

/// Result of comparing a submitted label against the active question's key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_label: char,
    pub correct_text: String,
}

/// Pure scoring of answers; session bookkeeping stays with the state
/// machine.
pub struct AnswerEvaluator;

impl AnswerEvaluator {
    /// Maps free-form reply text to a choice label. Matching is
    /// case-insensitive and tolerates trailing text after the label
    /// ("a) something" matches `A`), but text that does not start with a
    /// recognized label never matches ("Apple" is not an `A`).
    pub fn parse_submitted_label(text: &str) -> Option<char> {
        let trimmed = text.trim();
        let mut chars = trimmed.chars();
        let first = chars.next()?.to_ascii_uppercase();
        if !LABELS.contains(&first) {
            return None;
        }
        match chars.next() {
            None => Some(first),
            Some(next) if next.is_alphanumeric() => None,
            Some(_) => Some(first),
        }
    }

    /// Exact-match comparison on canonicalized labels. Idempotent: the
    /// same question and label always produce the same outcome.
    pub fn evaluate(question: &Question, submitted_label: char) -> AnswerOutcome {
        let submitted = submitted_label.to_ascii_uppercase();
        let correct_label = question.correct_label.to_ascii_uppercase();
        AnswerOutcome {
            correct: submitted == correct_label,
            correct_label,
            correct_text: question
                .option_text(correct_label)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question::new(
            "What organ?",
            vec![
                ('A', "Heart".to_string()),
                ('B', "Lungs".to_string()),
                ('C', "Kidney".to_string()),
                ('D', "Liver".to_string()),
            ],
            'B',
        )
    }

    #[test]
    fn correct_label_scores_correct() {
        let outcome = AnswerEvaluator::evaluate(&question(), 'B');
        assert!(outcome.correct);
        assert_eq!(outcome.correct_label, 'B');
        assert_eq!(outcome.correct_text, "Lungs");
    }

    #[test]
    fn wrong_label_reveals_the_key() {
        let outcome = AnswerEvaluator::evaluate(&question(), 'A');
        assert!(!outcome.correct);
        assert_eq!(outcome.correct_label, 'B');
        assert_eq!(outcome.correct_text, "Lungs");
    }

    #[test]
    fn evaluation_is_case_insensitive_and_idempotent() {
        let q = question();
        let lower = AnswerEvaluator::evaluate(&q, 'b');
        let upper = AnswerEvaluator::evaluate(&q, 'B');
        assert_eq!(lower, upper);
        assert_eq!(upper, AnswerEvaluator::evaluate(&q, 'B'));
    }

    #[test]
    fn parse_accepts_bare_and_prefixed_labels() {
        assert_eq!(AnswerEvaluator::parse_submitted_label("A"), Some('A'));
        assert_eq!(AnswerEvaluator::parse_submitted_label(" a "), Some('A'));
        assert_eq!(
            AnswerEvaluator::parse_submitted_label("B) Lungs"),
            Some('B')
        );
        assert_eq!(AnswerEvaluator::parse_submitted_label("c."), Some('C'));
    }

    #[test]
    fn parse_rejects_text_not_starting_with_a_label() {
        assert_eq!(AnswerEvaluator::parse_submitted_label("Apple"), None);
        assert_eq!(AnswerEvaluator::parse_submitted_label("1"), None);
        assert_eq!(AnswerEvaluator::parse_submitted_label(""), None);
        assert_eq!(AnswerEvaluator::parse_submitted_label("Z"), None);
        assert_eq!(AnswerEvaluator::parse_submitted_label("AB"), None);
    }
}
