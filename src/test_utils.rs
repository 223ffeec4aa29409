use crate::models::domain::{Question, Quiz};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// A model completion in the numbered template shape the parser reads.
    pub const TEMPLATE_COMPLETION: &str = "\
1) Which organ pumps blood?
A) Heart
B) Lungs
C) Kidney
D) Liver
Answer: A

2) Which organ exchanges gases?
A) Heart
B) Lungs
C) Kidney
D) Liver
Answer: B
";

    /// Creates a standard four-option question with the given answer key.
    pub fn test_question(correct: char) -> Question {
        Question::new(
            "Which organ pumps blood?",
            vec![
                ('A', "Heart".to_string()),
                ('B', "Lungs".to_string()),
                ('C', "Kidney".to_string()),
                ('D', "Liver".to_string()),
            ],
            correct,
        )
    }

    /// Creates a quiz with `len` copies of the standard question, all
    /// keyed to 'A'.
    pub fn test_quiz(len: usize) -> Quiz {
        Quiz::new((0..len).map(|_| test_question('A')).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_question_is_valid() {
        assert!(test_question('A').validate().is_ok());
    }

    #[test]
    fn test_fixtures_quiz_has_requested_length() {
        assert_eq!(test_quiz(3).len(), 3);
    }
}
