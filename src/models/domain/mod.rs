pub mod content;
pub mod event;
pub mod question;
pub mod quiz;
pub mod session;

pub use content::{ButtonSpec, OutboundContent};
pub use event::InboundEvent;
pub use question::{Question, QuestionOption, LABELS};
pub use quiz::Quiz;
pub use session::{Phase, Session};
