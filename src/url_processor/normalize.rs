use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::error::NormalizeError;

/// Host every `redirection` and `all` result points at.
pub const REDIRECT_HOST: &str = "www.byfood.com";

const REDIRECT_SCHEME: &str = "https";

// Bytes re-escaped when a path is written back out. `%` stays literal,
// escapes are validated during parsing.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Strip query, fragment and one trailing slash; keep everything else as written.
    Canonical,
    /// Canonical stripping plus the fixed https host, lower-cased.
    Redirection,
    All,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Canonical => "canonical",
            Operation::Redirection => "redirection",
            Operation::All => "all",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "canonical" => Ok(Operation::Canonical),
            "redirection" => Ok(Operation::Redirection),
            "all" => Ok(Operation::All),
            other => Err(NormalizeError::UnknownOperation(other.to_string())),
        }
    }
}

/// A URL split into the pieces the operations care about, borrowed from
/// the input so nothing changes case on the way through.
#[derive(Debug, PartialEq)]
struct UrlParts<'a> {
    scheme: Option<&'a str>,
    authority: Option<&'a str>,
    path: &'a str,
    /// `scheme:rest` with no `/` after the colon, e.g. `mailto:a@b.c`.
    opaque: bool,
}

/// Parses `raw` and applies the operation named by `op`.
///
/// The URL is parsed before the tag is looked at, so a malformed URL is
/// reported even when the tag is also wrong.
pub fn process_url(raw: &str, op: &str) -> Result<String, NormalizeError> {
    let parts = parse(raw)?;
    let op = op.parse::<Operation>()?;
    Ok(apply(&parts, op))
}

pub fn normalize(raw: &str, op: Operation) -> Result<String, NormalizeError> {
    let parts = parse(raw)?;
    Ok(apply(&parts, op))
}

fn parse(raw: &str) -> Result<UrlParts<'_>, NormalizeError> {
    let malformed = |reason: &str| NormalizeError::MalformedUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    if raw.bytes().any(|b| b < 0x20 || b == 0x7f) {
        return Err(malformed("invalid control character in URL"));
    }

    let rest = match raw.split_once('#') {
        Some((rest, fragment)) => {
            check_escapes(fragment).map_err(malformed)?;
            rest
        }
        None => raw,
    };

    let (scheme, rest) = split_scheme(rest).map_err(malformed)?;
    let rest = rest.split_once('?').map_or(rest, |(rest, _query)| rest);

    if !rest.starts_with('/') {
        if scheme.is_some() {
            return Ok(UrlParts {
                scheme,
                authority: None,
                path: rest,
                opaque: true,
            });
        }
        let first_segment = rest.split('/').next().unwrap_or_default();
        if first_segment.contains(':') {
            return Err(malformed("first path segment in URL cannot contain colon"));
        }
    }

    let (authority, path) = match rest.strip_prefix("//") {
        Some(after) if scheme.is_some() || !after.starts_with('/') => {
            let end = after.find('/').unwrap_or(after.len());
            let (authority, path) = after.split_at(end);
            check_authority(authority).map_err(malformed)?;
            (Some(authority), path)
        }
        _ => (None, rest),
    };

    check_escapes(path).map_err(malformed)?;

    Ok(UrlParts {
        scheme,
        authority,
        path,
        opaque: false,
    })
}

/// Splits off a leading `scheme:`. Input whose first `:` is preceded by a
/// non-scheme character has no scheme at all.
fn split_scheme(raw: &str) -> Result<(Option<&str>, &str), &'static str> {
    for (i, b) in raw.bytes().enumerate() {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' => {}
            b'0'..=b'9' | b'+' | b'-' | b'.' if i > 0 => {}
            b':' if i == 0 => return Err("missing protocol scheme"),
            b':' => return Ok((Some(&raw[..i]), &raw[i + 1..])),
            _ => return Ok((None, raw)),
        }
    }
    Ok((None, raw))
}

fn check_escapes(s: &str) -> Result<(), &'static str> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err("invalid URL escape");
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

fn check_authority(authority: &str) -> Result<(), &'static str> {
    let host = authority.rsplit_once('@').map_or(authority, |(_userinfo, host)| host);

    let host_char = |b: u8| b.is_ascii_alphanumeric() || b >= 0x80 || b"-_.~!$&'()*+,;=:[]<>\"%".contains(&b);
    if !host.bytes().all(host_char) {
        return Err("invalid character in host name");
    }
    check_escapes(host)?;

    let port = if host.starts_with('[') {
        match host.find(']') {
            Some(end) => match &host[end + 1..] {
                "" => None,
                rest => Some(rest.strip_prefix(':').ok_or("invalid port after host")?),
            },
            None => return Err("missing ']' in host"),
        }
    } else {
        host.rsplit_once(':').map(|(_, port)| port)
    };

    match port {
        Some(port) if !port.bytes().all(|b| b.is_ascii_digit()) => Err("invalid port"),
        _ => Ok(()),
    }
}

fn apply(parts: &UrlParts<'_>, op: Operation) -> String {
    match op {
        Operation::Canonical => {
            let mut out = String::new();
            if let Some(scheme) = parts.scheme {
                out.push_str(scheme);
                out.push(':');
            }
            if parts.opaque {
                out.push_str(parts.path);
                return out;
            }
            if let Some(authority) = parts.authority {
                out.push_str("//");
                out.push_str(authority);
            }
            out.push_str(&escape_path(trim_trailing_slash(parts.path)));
            out
        }
        Operation::Redirection | Operation::All => {
            if parts.opaque {
                return format!("{}:{}", REDIRECT_SCHEME, parts.path).to_lowercase();
            }
            let path = escape_path(trim_trailing_slash(parts.path));
            // a relative path becomes the first segment under the new host
            let sep = if path.is_empty() || path.starts_with('/') { "" } else { "/" };
            format!("{}://{}{}{}", REDIRECT_SCHEME, REDIRECT_HOST, sep, path).to_lowercase()
        }
    }
}

fn trim_trailing_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

fn escape_path(path: &str) -> String {
    utf8_percent_encode(path, PATH).to_string()
}
