//! Integration tests for the Cascade Officials site.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database, run migrations, start the site
//! cargo run -p cascade-officials-cli -- migrate
//! cargo run -p cascade-officials-site
//!
//! # Run integration tests against the live server
//! cargo test -p cascade-officials-integration-tests -- --ignored
//! ```
//!
//! The live-server tests are `#[ignore]`d so `cargo test` stays green
//! without a running server. `SITE_BASE_URL` overrides the default
//! `http://localhost:3000`.

/// Base URL for the site (configurable via environment).
#[must_use]
pub fn site_base_url() -> String {
    std::env::var("SITE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// HTTP client that keeps cookies but never follows redirects, so tests
/// can assert on the redirect responses themselves.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}
