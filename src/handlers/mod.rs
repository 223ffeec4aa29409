pub mod webhook_handler;

pub use webhook_handler::{receive_webhook, verify_webhook};
