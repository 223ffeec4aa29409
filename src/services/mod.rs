pub mod answer_evaluator;
pub mod document_extractor;
pub mod messenger;
pub mod question_parser;
pub mod quiz_engine;
pub mod quiz_generator;
pub mod session_store;
