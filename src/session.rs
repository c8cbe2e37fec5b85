// src/session.rs
//
// Session persistence for browser-driven sources: a JSON cookie blob in the
// format browser automation tools export, restored before navigating and
// written back afterwards. A missing, empty or unreadable blob is never
// fatal; the run just starts a fresh session.

use std::{fmt, fs, io::ErrorKind, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    config::consts::{LOGIN_EMAIL_VAR, LOGIN_PASSWORD_VAR},
    error::Result,
    file::ensure_parent,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "root_path")]
    pub path: String,
    /// Unix seconds; negative for session cookies.
    #[serde(default = "session_expiry")]
    pub expires: f64,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

fn root_path() -> String { s!("/") }
fn session_expiry() -> f64 { -1.0 }

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: root_path(),
            expires: session_expiry(),
            http_only: false,
            secure: false,
            same_site: None,
        }
    }

    pub fn is_session(&self) -> bool { self.expires < 0.0 }

    pub fn is_expired(&self, now_unix: f64) -> bool {
        !self.is_session() && self.expires <= now_unix
    }
}

/* ---------------- Context ---------------- */

/// Whatever holds cookies for the browsing session.
pub trait SessionContext {
    fn add_cookies(&mut self, cookies: Vec<Cookie>);
    fn cookies(&self) -> Vec<Cookie>;
}

/// In-memory cookie holder. Adding a cookie with the same
/// name/domain/path replaces the old one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.cookies.len() }
    pub fn is_empty(&self) -> bool { self.cookies.is_empty() }

    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    /// Drop cookies past their expiry; returns how many were removed.
    pub fn purge_expired(&mut self, now_unix: f64) -> usize {
        let before = self.cookies.len();
        self.cookies.retain(|c| !c.is_expired(now_unix));
        before - self.cookies.len()
    }
}

impl SessionContext for CookieJar {
    fn add_cookies(&mut self, cookies: Vec<Cookie>) {
        for c in cookies {
            self.cookies
                .retain(|o| !(o.name == c.name && o.domain == c.domain && o.path == c.path));
            self.cookies.push(c);
        }
    }

    fn cookies(&self) -> Vec<Cookie> { self.cookies.clone() }
}

/* ---------------- Store ---------------- */

#[derive(Clone, Debug, PartialEq)]
pub enum RestoreOutcome {
    Restored(usize),
    Missing,
    Empty,
    Malformed,
}

#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }

    /// Load persisted cookies into `ctx`. Never fails: every problem with
    /// the blob degrades to a fresh session.
    pub fn restore(&self, ctx: &mut dyn SessionContext) -> RestoreOutcome {
        let contents = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "Cookies file not found. Starting a new session.");
                return RestoreOutcome::Missing;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not read cookies file. Starting a new session.");
                return RestoreOutcome::Malformed;
            }
        };

        if contents.trim().is_empty() {
            info!(path = %self.path.display(), "Cookies file is empty. Starting a new session.");
            return RestoreOutcome::Empty;
        }

        match serde_json::from_str::<Vec<Cookie>>(&contents) {
            Ok(cookies) => {
                let n = cookies.len();
                ctx.add_cookies(cookies);
                info!(path = %self.path.display(), cookies = n, "Cookies loaded successfully.");
                RestoreOutcome::Restored(n)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Error reading cookies file. Starting a new session.");
                RestoreOutcome::Malformed
            }
        }
    }

    /// Write the context's cookies, replacing any previous blob.
    pub fn persist(&self, ctx: &dyn SessionContext) -> Result<()> {
        let cookies = ctx.cookies();
        ensure_parent(&self.path)?;
        let json = serde_json::to_string(&cookies)?;
        fs::write(&self.path, json)?;
        info!(path = %self.path.display(), cookies = cookies.len(), "Saved cookies");
        Ok(())
    }
}

/* ---------------- Credentials ---------------- */

/// Login-form value pair, used when no session could be restored.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    /// Both variables set and non-blank, or nothing.
    pub fn from_vars<F>(var: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let email = var(LOGIN_EMAIL_VAR).filter(|v| !v.trim().is_empty())?;
        let password = var(LOGIN_PASSWORD_VAR).filter(|v| !v.is_empty())?;
        Some(Self { email, password })
    }

    pub fn from_env() -> Option<Self> {
        Self::from_vars(|k| std::env::var(k).ok())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/* ---------------- Provider ---------------- */

/// How the session was established.
#[derive(Debug, PartialEq)]
pub enum SessionState<'a> {
    /// Cookies restored; login can be skipped.
    Resumed(usize),
    /// No usable cookies; fill the login form with these.
    Login(&'a Credentials),
    /// No cookies and no credentials.
    Anonymous,
}

#[derive(Clone, Debug)]
pub struct SessionProvider {
    store: SessionStore,
    credentials: Option<Credentials>,
}

impl SessionProvider {
    pub fn new(store: SessionStore, credentials: Option<Credentials>) -> Self {
        Self { store, credentials }
    }

    pub fn store(&self) -> &SessionStore { &self.store }

    pub fn restore(&self, ctx: &mut dyn SessionContext) -> SessionState<'_> {
        match self.store.restore(ctx) {
            RestoreOutcome::Restored(n) if n > 0 => SessionState::Resumed(n),
            _ => match &self.credentials {
                Some(c) => SessionState::Login(c),
                None => SessionState::Anonymous,
            },
        }
    }

    pub fn persist(&self, ctx: &dyn SessionContext) -> Result<()> {
        self.store.persist(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let c = Credentials::new("a@b.c", "hunter2");
        let s = format!("{c:?}");
        assert!(s.contains("a@b.c"));
        assert!(!s.contains("hunter2"));
    }

    #[test]
    fn credentials_need_both_vars() {
        let only_email = |k: &str| (k == LOGIN_EMAIL_VAR).then(|| s!("a@b.c"));
        assert!(Credentials::from_vars(only_email).is_none());

        let both = |k: &str| match k {
            LOGIN_EMAIL_VAR => Some(s!("a@b.c")),
            LOGIN_PASSWORD_VAR => Some(s!("pw")),
            _ => None,
        };
        assert_eq!(Credentials::from_vars(both), Some(Credentials::new("a@b.c", "pw")));
    }

    #[test]
    fn jar_replaces_same_cookie() {
        let mut jar = CookieJar::new();
        jar.add_cookies(vec![Cookie::new("li_at", "old", ".example.com")]);
        jar.add_cookies(vec![Cookie::new("li_at", "new", ".example.com")]);
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.get("li_at").map(|c| c.value.as_str()), Some("new"));
    }

    #[test]
    fn purge_keeps_session_cookies() {
        let mut jar = CookieJar::new();
        let mut old = Cookie::new("old", "1", "x");
        old.expires = 100.0;
        let mut fresh = Cookie::new("fresh", "1", "x");
        fresh.expires = 10_000.0;
        jar.add_cookies(vec![old, fresh, Cookie::new("sess", "1", "x")]);

        assert_eq!(jar.purge_expired(5_000.0), 1);
        assert!(jar.get("old").is_none());
        assert!(jar.get("sess").is_some());
    }

    #[test]
    fn parses_browser_export_format() {
        let json = r#"[{"name":"li_at","value":"v","domain":".linkedin.com","path":"/",
            "expires":1767225600.5,"httpOnly":true,"secure":true,"sameSite":"None"}]"#;
        let cookies: Vec<Cookie> = serde_json::from_str(json).unwrap();
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].http_only);
        assert_eq!(cookies[0].same_site.as_deref(), Some("None"));
    }
}
