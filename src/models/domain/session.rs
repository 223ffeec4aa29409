use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::quiz::Quiz;

/// The discrete conversational state of a user session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Phase {
    AwaitingMenuChoice,
    AwaitingTopicText,
    AwaitingFileUpload,
    InQuiz,
    Complete,
}

/// The live conversational state for one user. Replaced wholesale on every
/// phase transition; never partially mutated by callers.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Session {
    pub user_id: String,
    pub phase: Phase,
    pub quiz: Option<Quiz>,
    pub current_index: usize,
    pub score: usize,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Session {
    /// Fresh session in the default phase, created on first contact or
    /// whenever no session exists for an incoming event.
    pub fn new(user_id: &str) -> Self {
        let now = Utc::now();
        Session {
            user_id: user_id.to_string(),
            phase: Phase::AwaitingMenuChoice,
            quiz: None,
            current_index: 0,
            score: 0,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn with_phase(user_id: &str, phase: Phase) -> Self {
        Session {
            phase,
            ..Session::new(user_id)
        }
    }

    pub fn in_quiz(user_id: &str, quiz: Quiz) -> Self {
        Session {
            phase: Phase::InQuiz,
            quiz: Some(quiz),
            ..Session::new(user_id)
        }
    }

    /// Replacement session after an answer was scored. Reaching the end of
    /// the quiz flips the phase to `Complete`.
    pub fn advanced(&self, correct: bool) -> Self {
        let current_index = self.current_index + 1;
        let quiz_len = self.quiz.as_ref().map(Quiz::len).unwrap_or(0);
        Session {
            user_id: self.user_id.clone(),
            phase: if current_index >= quiz_len {
                Phase::Complete
            } else {
                Phase::InQuiz
            },
            quiz: self.quiz.clone(),
            current_index,
            score: self.score + usize::from(correct),
            created_at: self.created_at,
            modified_at: Utc::now(),
        }
    }
}
