use serde::{Deserialize, Serialize};

/// The fixed label sequence options are assigned from, in order.
pub const LABELS: [char; 7] = ['A', 'B', 'C', 'D', 'E', 'F', 'G'];

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 7;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionOption {
    pub label: char,
    pub text: String,
}

/// One multiple-choice item. Options are ordered and labelled contiguously
/// from `A`; `correct_label` must name one of them.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<QuestionOption>,
    pub correct_label: char,
}

impl Question {
    pub fn new(prompt: &str, options: Vec<(char, String)>, correct_label: char) -> Self {
        Question {
            prompt: prompt.trim().to_string(),
            options: options
                .into_iter()
                .map(|(label, text)| QuestionOption {
                    label: label.to_ascii_uppercase(),
                    text: text.trim().to_string(),
                })
                .collect(),
            correct_label: correct_label.to_ascii_uppercase(),
        }
    }

    /// Checks the invariants a question must hold before it may enter a
    /// quiz. Violations are returned as a reason so callers can log why a
    /// parsed block was dropped.
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt.is_empty() {
            return Err("empty prompt".to_string());
        }
        if self.options.len() < MIN_OPTIONS || self.options.len() > MAX_OPTIONS {
            return Err(format!(
                "expected {}-{} options, got {}",
                MIN_OPTIONS,
                MAX_OPTIONS,
                self.options.len()
            ));
        }
        for (i, option) in self.options.iter().enumerate() {
            if option.label != LABELS[i] {
                return Err(format!(
                    "option labels must be contiguous from A, found '{}' at position {}",
                    option.label, i
                ));
            }
        }
        if !self.options.iter().any(|o| o.label == self.correct_label) {
            return Err(format!(
                "correct label '{}' is not among the options",
                self.correct_label
            ));
        }
        Ok(())
    }

    pub fn option_text(&self, label: char) -> Option<&str> {
        let label = label.to_ascii_uppercase();
        self.options
            .iter()
            .find(|o| o.label == label)
            .map(|o| o.text.as_str())
    }

    pub fn labels(&self) -> Vec<String> {
        self.options.iter().map(|o| o.label.to_string()).collect()
    }

    /// Renders the question the way it is shown to the user.
    pub fn render(&self) -> String {
        let mut lines = vec![self.prompt.clone()];
        for option in &self.options {
            lines.push(format!("{}. {}", option.label, option.text));
        }
        lines.join("\n")
    }
}
