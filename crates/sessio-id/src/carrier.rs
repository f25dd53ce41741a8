//! Identifier Carriers
//!
//! A carrier moves the opaque session id between client and server.
//! The session engine only sees the [`IdCarrier`] contract; the
//! reference implementation is an HTTP cookie rendered and parsed as
//! raw header strings so no web framework is required.

use sessio_core::SessionId;

/// Transport for the session identifier.
///
/// Implementations keep at most one in-memory copy of the id per
/// lifecycle instance so the underlying transport is never re-read
/// mid-transaction.
pub trait IdCarrier: Send {
    /// Stores the id for the current transaction and queues it for the
    /// client.
    fn set(&mut self, id: &SessionId);

    /// Returns the current id, if any.
    fn get(&self) -> Option<SessionId>;

    /// Returns true if an id is present.
    fn exists(&self) -> bool {
        self.get().is_some()
    }

    /// Clears the id, instructing the client to forget it.
    fn clear(&mut self);
}

/// In-memory carrier for tests and non-HTTP embeddings.
#[derive(Debug, Clone, Default)]
pub struct MemoryCarrier {
    id: Option<SessionId>,
}

impl MemoryCarrier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a carrier pre-seeded with an id, as if the client had
    /// presented one.
    #[must_use]
    pub fn with_id(id: impl Into<SessionId>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }
}

impl IdCarrier for MemoryCarrier {
    fn set(&mut self, id: &SessionId) {
        self.id = Some(id.clone());
    }

    fn get(&self) -> Option<SessionId> {
        self.id.clone()
    }

    fn clear(&mut self) {
        self.id = None;
    }
}

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "sid";

/// Cookie-based identifier carrier.
///
/// Reads the inbound `Cookie` header it is given, caches one in-memory
/// copy after `set`, and exposes the pending outbound `Set-Cookie`
/// header value. The cookie is session-lifetime by default (cleared
/// when the client closes); `clear` produces an already-expired cookie
/// (`Max-Age=0`).
#[derive(Debug, Clone)]
pub struct CookieCarrier {
    name: String,
    path: String,
    domain: Option<String>,
    secure: bool,
    http_only: bool,
    /// One in-memory copy, set by `set()`; wins over the inbound value.
    id: Option<SessionId>,
    /// Id parsed from the inbound Cookie header.
    inbound: Option<SessionId>,
    /// Pending outbound Set-Cookie header value.
    pending: Option<String>,
}

impl CookieCarrier {
    /// Creates a carrier for the given cookie name with the default
    /// flags: path `/`, no domain, not secure, http-only.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: true,
            id: None,
            inbound: None,
            pending: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Parses the inbound `Cookie` request header
    /// (format: `name1=value1; name2=value2`).
    pub fn read_request(&mut self, cookie_header: &str) {
        let needle = format!("{}=", self.name);
        for part in cookie_header.split(';') {
            let part = part.trim();
            if let Some(value) = part.strip_prefix(&needle) {
                let value = value.trim();
                if !value.is_empty() {
                    self.inbound = Some(SessionId::new(value));
                }
                return;
            }
        }
    }

    /// Returns the pending outbound `Set-Cookie` header value, if a
    /// `set` or `clear` happened this transaction.
    #[must_use]
    pub fn set_cookie_header(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Returns the cookie name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, value: &str, max_age: Option<i64>) -> String {
        let mut cookie = format!("{}={value}; Path={}", self.name, self.path);
        if let Some(domain) = &self.domain {
            cookie.push_str(&format!("; Domain={domain}"));
        }
        if let Some(max_age) = max_age {
            cookie.push_str(&format!("; Max-Age={max_age}"));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        cookie
    }
}

impl Default for CookieCarrier {
    fn default() -> Self {
        Self::new(DEFAULT_COOKIE_NAME)
    }
}

impl IdCarrier for CookieCarrier {
    fn set(&mut self, id: &SessionId) {
        self.pending = Some(self.render(id.as_str(), None));
        self.id = Some(id.clone());
    }

    fn get(&self) -> Option<SessionId> {
        self.id.clone().or_else(|| self.inbound.clone())
    }

    fn clear(&mut self) {
        self.pending = Some(self.render("", Some(0)));
        self.id = None;
        self.inbound = None;
    }
}
