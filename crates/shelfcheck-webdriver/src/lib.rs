//! WebDriver lookup client for shelfcheck.
//!
//! Drives a browser through a W3C WebDriver endpoint (chromedriver,
//! geckodriver, Selenium) and exposes it as a lookup client.

pub mod client;
pub mod config;
pub mod protocol;

pub use client::{WebDriverClient, WebDriverSession};
pub use config::WebDriverConfig;
