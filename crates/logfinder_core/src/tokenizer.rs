// tokenizer.rs: syslog timestamp stripping and numeric splitting
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::InvalidFormat;

// "%3s %1,2d %02d:%02d:%02d " followed by the body. The whitespace runs are
// lazy so any extra spacing before the body stays part of the body.
static SYSLOG_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z]{3}(?-u:\s)+?[0-9][0-9]?(?-u:\s)[0-9]{2}:[0-9]{2}:[0-9]{2}(?-u:\s)+?(?P<body>.*)\n?$",
    )
    .expect("syslog prefix pattern is valid")
});

/// Ordered non-numeric fragments of a line body. Two lines are similar
/// exactly when their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TokenKey(Vec<String>);

impl TokenKey {
    pub fn fragments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl<'a> From<Vec<&'a str>> for TokenKey {
    fn from(fragments: Vec<&'a str>) -> Self {
        TokenKey(fragments.into_iter().map(str::to_string).collect())
    }
}

/// Return the body following the syslog timestamp of `line`.
pub fn strip_date(line: &str) -> Result<&str, InvalidFormat> {
    SYSLOG_PREFIX
        .captures(line)
        .and_then(|caps| caps.name("body"))
        .map(|m| m.as_str())
        .filter(|body| !body.is_empty())
        .ok_or_else(|| InvalidFormat::new(line))
}

/// Split `body` on every maximal run of ASCII digits, dropping the digits.
/// N digit runs always give N + 1 fragments, some of which may be empty.
pub fn split_numeric(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let n = bytes.len();
    let mut out: Vec<&str> = Vec::with_capacity(8);
    let mut start = 0usize;
    let mut i = 0usize;

    while i < n {
        if bytes[i].is_ascii_digit() {
            out.push(&body[start..i]);
            while i < n && bytes[i].is_ascii_digit() {
                i += 1;
            }
            start = i;
        } else {
            i += 1;
        }
    }
    out.push(&body[start..]);
    out
}

pub fn tokenize(line: &str) -> Result<TokenKey, InvalidFormat> {
    let body = strip_date(line)?;
    Ok(TokenKey::from(split_numeric(body)))
}
