// stayflow/src/csrf.rs

//! Anti-forgery token lookup.

use std::fmt;

/// Name of the cookie the server sets the token in.
pub const COOKIE_NAME: &str = "csrftoken";
/// Form field name the token is posted under.
pub const FORM_FIELD: &str = "csrfmiddlewaretoken";
pub const HEADER_NAME: &str = "X-CSRFToken";

#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
  /// `None` for blank input.
  pub fn new(value: impl Into<String>) -> Option<Self> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
      None
    } else {
      Some(Self(trimmed.to_string()))
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for CsrfToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("CsrfToken(<redacted>)")
  }
}

/// Places a page may carry the token, highest priority first.
#[derive(Debug, Clone, Default)]
pub struct TokenSources {
  pub hidden_field: Option<String>,
  pub meta_tag: Option<String>,
  /// Raw `Cookie` header value.
  pub cookies: Option<String>,
}

impl TokenSources {
  pub fn resolve(&self) -> Option<CsrfToken> {
    self
      .hidden_field
      .clone()
      .and_then(CsrfToken::new)
      .or_else(|| self.meta_tag.clone().and_then(CsrfToken::new))
      .or_else(|| {
        self
          .cookies
          .as_deref()
          .and_then(|header| cookie_value(header, COOKIE_NAME))
          .and_then(CsrfToken::new)
      })
  }
}

/// Value of cookie `name` in a `a=1; b=2` header. Values are returned as sent.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
  header.split(';').find_map(|pair| {
    let (key, value) = pair.trim().split_once('=')?;
    (key.trim() == name).then(|| value.trim().to_string())
  })
}
