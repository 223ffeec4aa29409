use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::models::domain::{ButtonSpec, InboundEvent, OutboundContent, Phase, Quiz, Session};
use crate::services::answer_evaluator::AnswerEvaluator;
use crate::services::document_extractor::{clean_text, word_count, DocumentExtractor};
use crate::services::question_parser::QuestionParser;
use crate::services::quiz_generator::QuizGenerator;
use crate::services::session_store::SessionStore;

pub const WELCOME_TEXT: &str = "Welcome! Let's get started.";
pub const MENU_TEXT: &str = "Main menu - choose an option:";
pub const UPLOAD_PROMPT_TEXT: &str = "Please upload your file now.";
pub const TOPIC_PROMPT_TEXT: &str = "Enter a topic or text for quiz generation:";
pub const FILE_REMINDER_TEXT: &str = "Please send a file, not text.";
pub const NO_QUIZ_TEXT: &str = "No quiz could be generated. Please try again.";
pub const FALLBACK_TOPIC_TEXT: &str =
    "Not enough readable text found. Using the default topic instead.";
pub const QUIT_TEXT: &str = "Quiz exited. Returning to the main menu.";
pub const INVALID_ANSWER_TEXT: &str =
    "That answer was not recognized. Please pick an option from the menu.";
pub const EXPIRED_TEXT: &str = "That quiz is no longer active. Please pick an option from the menu.";
pub const CORRECT_TEXT: &str = "Correct!";
pub const QUIT_LABEL: &str = "Quit";

pub const GET_STARTED_PAYLOAD: &str = "GET_STARTED";
pub const MENU_FILE_PAYLOAD: &str = "MENU_FILE";
pub const MENU_TOPIC_PAYLOAD: &str = "MENU_TOPIC";
pub const MENU_RANDOM_PAYLOAD: &str = "MENU_RANDOM";

/// Tunables the state machine needs from configuration.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    pub default_topic: String,
    pub question_count: usize,
    pub min_word_count: usize,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_topic: config.default_topic.clone(),
            question_count: config.question_count,
            min_word_count: config.min_word_count,
        }
    }
}

/// The quiz session state machine. Given the current session and an
/// inbound event it decides the next session (written back to the store
/// wholesale) and the outbound content to deliver. Collaborator failures
/// are recovered here: every failure path lands the user back in
/// `AwaitingMenuChoice`.
pub struct QuizEngine {
    store: Arc<dyn SessionStore>,
    generator: Arc<dyn QuizGenerator>,
    extractor: Arc<dyn DocumentExtractor>,
    settings: EngineSettings,
    // Serializes read-compute-write cycles per user when the surrounding
    // server handles events concurrently.
    user_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl QuizEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn QuizGenerator>,
        extractor: Arc<dyn DocumentExtractor>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            generator,
            extractor,
            settings,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Single entry point for the webhook layer. Returns the content
    /// descriptors to deliver; never errors, since every failure is a
    /// state transition back to the menu.
    pub async fn handle_event(&self, user_id: &str, event: InboundEvent) -> Vec<OutboundContent> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let session = self
            .store
            .get(user_id)
            .unwrap_or_else(|| Session::new(user_id));

        match event {
            InboundEvent::Postback(payload) => self.handle_postback(session, &payload).await,
            InboundEvent::Text(text) => self.handle_text(session, &text).await,
            InboundEvent::Attachment { url, content_type } => {
                self.handle_attachment(session, &url, content_type.as_deref())
                    .await
            }
        }
    }

    fn user_lock(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .user_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(user_id.to_string()).or_default().clone()
    }

    async fn handle_postback(&self, session: Session, payload: &str) -> Vec<OutboundContent> {
        match payload {
            GET_STARTED_PAYLOAD => {
                self.store
                    .set(&session.user_id, Session::new(&session.user_id));
                vec![OutboundContent::text(WELCOME_TEXT), menu()]
            }
            MENU_FILE_PAYLOAD => self.handle_menu_choice(session, '1').await,
            MENU_TOPIC_PAYLOAD => self.handle_menu_choice(session, '2').await,
            MENU_RANDOM_PAYLOAD => self.handle_menu_choice(session, '3').await,
            other => {
                log::debug!("unhandled postback payload: {}", other);
                self.reset_to_menu(&session.user_id)
            }
        }
    }

    async fn handle_text(&self, session: Session, text: &str) -> Vec<OutboundContent> {
        match session.phase {
            Phase::AwaitingMenuChoice => {
                let choice = text.trim().chars().next().unwrap_or(' ');
                self.handle_menu_choice(session, choice).await
            }
            Phase::AwaitingTopicText => {
                self.start_generation(&session.user_id, text, Vec::new())
                    .await
            }
            Phase::AwaitingFileUpload => vec![OutboundContent::text(FILE_REMINDER_TEXT)],
            Phase::InQuiz => self.handle_answer(session, text).await,
            Phase::Complete => self.finish(&session),
        }
    }

    async fn handle_menu_choice(&self, session: Session, choice: char) -> Vec<OutboundContent> {
        let user_id = session.user_id;
        match choice {
            '1' => {
                self.store
                    .set(&user_id, Session::with_phase(&user_id, Phase::AwaitingFileUpload));
                vec![OutboundContent::text(UPLOAD_PROMPT_TEXT)]
            }
            '2' => {
                self.store
                    .set(&user_id, Session::with_phase(&user_id, Phase::AwaitingTopicText));
                vec![OutboundContent::text(TOPIC_PROMPT_TEXT)]
            }
            '3' => {
                let topic = self.settings.default_topic.clone();
                self.start_generation(&user_id, &topic, Vec::new()).await
            }
            _ => self.reset_to_menu(&user_id),
        }
    }

    /// Requests a quiz from the model, parses it, and either starts the
    /// quiz or returns the user to the menu. `contents` carries any
    /// notices accumulated by the caller (extraction fallback messages).
    async fn start_generation(
        &self,
        user_id: &str,
        source_text: &str,
        mut contents: Vec<OutboundContent>,
    ) -> Vec<OutboundContent> {
        let raw = match self
            .generator
            .generate(source_text, self.settings.question_count)
            .await
        {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("quiz generation for {} failed: {}", user_id, err);
                contents.push(OutboundContent::text(NO_QUIZ_TEXT));
                contents.extend(self.reset_to_menu(user_id));
                return contents;
            }
        };

        let questions = QuestionParser::parse(&raw);
        if questions.is_empty() {
            // Zero valid questions is equivalent to "generation failed";
            // a quiz is never started with an empty question list.
            log::warn!("model output for {} contained no valid questions", user_id);
            contents.push(OutboundContent::text(NO_QUIZ_TEXT));
            contents.extend(self.reset_to_menu(user_id));
            return contents;
        }

        let quiz = Quiz::new(questions);
        log::info!(
            "starting quiz {} ({} questions) for {}",
            quiz.id,
            quiz.len(),
            user_id
        );
        let session = Session::in_quiz(user_id, quiz);
        contents.extend(ask_question(&session));
        self.store.set(user_id, session);
        contents
    }

    async fn handle_attachment(
        &self,
        session: Session,
        url: &str,
        content_type: Option<&str>,
    ) -> Vec<OutboundContent> {
        if session.phase != Phase::AwaitingFileUpload {
            return self.reset_to_menu(&session.user_id);
        }

        let mut contents = Vec::new();
        let source = match self.extractor.extract(url, content_type).await {
            Ok(text) => {
                let cleaned = clean_text(&text);
                if word_count(&cleaned) < self.settings.min_word_count {
                    log::info!(
                        "extracted text for {} is below {} words, using fallback topic",
                        session.user_id,
                        self.settings.min_word_count
                    );
                    contents.push(OutboundContent::text(FALLBACK_TOPIC_TEXT));
                    self.settings.default_topic.clone()
                } else {
                    cleaned
                }
            }
            Err(err) => {
                log::warn!("extraction for {} failed: {}", session.user_id, err);
                contents.push(OutboundContent::text(FALLBACK_TOPIC_TEXT));
                self.settings.default_topic.clone()
            }
        };

        self.start_generation(&session.user_id, &source, contents)
            .await
    }

    async fn handle_answer(&self, session: Session, text: &str) -> Vec<OutboundContent> {
        if text.trim().eq_ignore_ascii_case("quit") {
            let mut contents = vec![OutboundContent::text(QUIT_TEXT)];
            contents.extend(self.reset_to_menu(&session.user_id));
            return contents;
        }

        // An in-quiz session without a quiz, or with a stale index, is an
        // inconsistent record; answer against it is rejected neutrally.
        let Some(question) = session
            .quiz
            .as_ref()
            .and_then(|quiz| quiz.question_at(session.current_index))
        else {
            let mut contents = vec![OutboundContent::text(EXPIRED_TEXT)];
            contents.extend(self.reset_to_menu(&session.user_id));
            return contents;
        };

        let Some(label) = AnswerEvaluator::parse_submitted_label(text) else {
            let mut contents = vec![OutboundContent::text(INVALID_ANSWER_TEXT)];
            contents.extend(self.reset_to_menu(&session.user_id));
            return contents;
        };

        let outcome = AnswerEvaluator::evaluate(question, label);
        let feedback = if outcome.correct {
            CORRECT_TEXT.to_string()
        } else {
            format!(
                "Incorrect. Correct: {}) {}",
                outcome.correct_label, outcome.correct_text
            )
        };

        let advanced = session.advanced(outcome.correct);
        self.store.set(&session.user_id, advanced.clone());

        let mut contents = vec![OutboundContent::Text(feedback)];
        if advanced.phase == Phase::Complete {
            contents.extend(self.finish(&advanced));
        } else {
            contents.extend(ask_question(&advanced));
        }
        contents
    }

    /// Completion: final score, then back to the menu.
    fn finish(&self, session: &Session) -> Vec<OutboundContent> {
        let total = session.quiz.as_ref().map(Quiz::len).unwrap_or(0);
        let mut contents = vec![OutboundContent::Text(format!(
            "Quiz finished! Score: {}/{}",
            session.score, total
        ))];
        contents.extend(self.reset_to_menu(&session.user_id));
        contents
    }

    fn reset_to_menu(&self, user_id: &str) -> Vec<OutboundContent> {
        self.store.set(user_id, Session::new(user_id));
        vec![menu()]
    }
}

/// The main menu as a button template; each button's postback payload is
/// handled exactly like the corresponding "1"/"2"/"3" text.
pub fn menu() -> OutboundContent {
    OutboundContent::Buttons {
        text: MENU_TEXT.to_string(),
        buttons: vec![
            ButtonSpec::new("Upload a file", MENU_FILE_PAYLOAD),
            ButtonSpec::new("Enter a topic", MENU_TOPIC_PAYLOAD),
            ButtonSpec::new("Random quiz", MENU_RANDOM_PAYLOAD),
        ],
    }
}

fn ask_question(session: &Session) -> Vec<OutboundContent> {
    let Some(question) = session
        .quiz
        .as_ref()
        .and_then(|quiz| quiz.question_at(session.current_index))
    else {
        return Vec::new();
    };

    let mut labels = question.labels();
    labels.push(QUIT_LABEL.to_string());
    vec![OutboundContent::QuickReplies {
        text: question.render(),
        labels,
    }]
}
