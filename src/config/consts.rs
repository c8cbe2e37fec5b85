// src/config/consts.rs

// Session
pub const DEFAULT_SESSION_STORE: &str = "./cookies.json";
pub const LOGIN_EMAIL_VAR: &str = "LOGIN_EMAIL";
pub const LOGIN_PASSWORD_VAR: &str = "LOGIN_PASSWORD";

// Output
pub const DEFAULT_OUTPUT_PREFIX: &str = "listings";
pub const DEFAULT_SCHEMA: &[&str] = &["title", "company", "location", "salary", "benefits", "link"];
pub const DEFAULT_KEY_FIELDS: &[&str] = &["title", "company", "link"];

// Placeholders are ordinary key values unless MISSING_MARKERS names them
pub const DEFAULT_MISSING_MARKERS: &[&str] = &[];

// Input
pub const DEFAULT_BATCH_SIZE: usize = 25;
pub const DEFAULT_START_ROW: usize = 1;
