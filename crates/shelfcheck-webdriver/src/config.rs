//! WebDriver client configuration.

use std::time::Duration;

use serde_json::{json, Value};

/// How to reach the WebDriver endpoint and which browser to ask for.
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// WebDriver endpoint, e.g. `http://localhost:9515` for chromedriver.
    pub endpoint: String,

    /// Browser requested in the session capabilities.
    pub browser_name: String,

    /// Run without a visible window.
    pub headless: bool,

    /// Browser window size in pixels.
    pub window_size: (u32, u32),

    /// Interval between checks during bounded waits.
    pub poll_interval: Duration,

    /// Upper bound on a single WebDriver command.
    pub command_timeout: Duration,
}

impl WebDriverConfig {
    /// Create a config for an endpoint with default browser settings.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Browser command line arguments.
    pub fn browser_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.headless {
            args.push("--headless=new".to_string());
        }
        args.push(format!(
            "--window-size={},{}",
            self.window_size.0, self.window_size.1
        ));
        args
    }

    /// `POST /session` request body.
    pub fn capabilities(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": self.browser_name,
                    "goog:chromeOptions": {
                        "args": self.browser_args(),
                    },
                },
            },
        })
    }
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9515".to_string(),
            browser_name: "chrome".to_string(),
            headless: true,
            window_size: (1920, 1080),
            poll_interval: Duration::from_millis(250),
            command_timeout: Duration::from_secs(60),
        }
    }
}
