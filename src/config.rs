use secrecy::SecretString;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub verify_token: SecretString,
    pub page_access_token: SecretString,
    pub graph_api_base: String,
    pub openrouter_api_key: SecretString,
    pub openrouter_api_base: String,
    pub model: String,
    pub question_count: usize,
    pub min_word_count: usize,
    pub default_topic: String,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            web_server_host: env::var("WEB_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            verify_token: SecretString::from(
                env::var("VERIFY_TOKEN").unwrap_or_else(|_| "dev_verify_token".to_string()),
            ),
            page_access_token: SecretString::from(
                env::var("PAGE_ACCESS_TOKEN").unwrap_or_else(|_| "dev_page_token".to_string()),
            ),
            graph_api_base: env::var("GRAPH_API_BASE")
                .unwrap_or_else(|_| "https://graph.facebook.com/v17.0".to_string()),
            openrouter_api_key: SecretString::from(
                env::var("OPENROUTER_API_KEY").unwrap_or_else(|_| "dev_api_key".to_string()),
            ),
            openrouter_api_base: env::var("OPENROUTER_API_BASE")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
            model: env::var("MODEL").unwrap_or_else(|_| "openai/gpt-4o-mini".to_string()),
            question_count: env::var("QUESTION_COUNT")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(7),
            min_word_count: env::var("MIN_WORD_COUNT")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(20),
            default_topic: env::var("DEFAULT_TOPIC")
                .unwrap_or_else(|_| "General knowledge and facts".to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        if self.verify_token.expose_secret() == "dev_verify_token" {
            panic!(
                "FATAL: VERIFY_TOKEN is using default value! Set VERIFY_TOKEN environment variable."
            );
        }

        if self.page_access_token.expose_secret() == "dev_page_token" {
            panic!(
                "FATAL: PAGE_ACCESS_TOKEN is using default value! Set PAGE_ACCESS_TOKEN environment variable."
            );
        }

        if self.openrouter_api_key.expose_secret() == "dev_api_key" {
            panic!(
                "FATAL: OPENROUTER_API_KEY is using default value! Set OPENROUTER_API_KEY environment variable."
            );
        }
    }

    pub fn test_config() -> Self {
        Self {
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            verify_token: SecretString::from("test_verify_token".to_string()),
            page_access_token: SecretString::from("test_page_token".to_string()),
            graph_api_base: "https://graph.facebook.com/v17.0".to_string(),
            openrouter_api_key: SecretString::from("test_api_key".to_string()),
            openrouter_api_base: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            question_count: 7,
            min_word_count: 20,
            default_topic: "General knowledge and facts".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env();

        // Should use env vars if set, or fall back to defaults
        assert!(!config.web_server_host.is_empty());
        assert!(!config.graph_api_base.is_empty());
        assert!(config.question_count >= 1);
        assert!(config.request_timeout_secs > 0);
    }

    #[test]
    fn test_test_config() {
        let config = Config::test_config();

        assert_eq!(config.question_count, 7);
        assert_eq!(config.min_word_count, 20);
        assert_eq!(config.default_topic, "General knowledge and facts");
    }
}
