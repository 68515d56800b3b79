//! Cookie-style settings backend.
//!
//! Values are kept as cookies with an optional expiry and read back by parsing the
//! `name=value; name=value` header, the way a page reads `document.cookie`. Names and
//! values are percent-encoded, so `;`, `=` and line breaks survive the round trip.

use super::{Retention, SettingsStore};
use crate::error::Result;
use anyhow::Context;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cookie {
    name: String,
    value: String,
    /// `None` is a session cookie.
    expires: Option<SystemTime>,
}

impl Cookie {
    fn is_live(&self, now: SystemTime) -> bool {
        self.expires.is_none_or(|at| at > now)
    }
}

#[derive(Debug, Default)]
pub struct CookieJar {
    /// Where persistent cookies are saved; session cookies never are.
    path: Option<PathBuf>,
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a jar persisted at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cookies = match load_file(&path) {
            Ok(cookies) => cookies,
            Err(e) => {
                tracing::warn!("Ignoring unreadable cookie file: {:#}", e);
                Vec::new()
            }
        };
        Self {
            path: Some(path),
            cookies,
        }
    }

    /// Live cookies as a request header.
    pub fn header(&self) -> String {
        let now = SystemTime::now();
        let mut header = String::new();
        for cookie in self.cookies.iter().filter(|c| c.is_live(now)) {
            if !header.is_empty() {
                header.push_str("; ");
            }
            let _ = write!(header, "{}={}", cookie.name, cookie.value);
        }
        header
    }

    /// Replaces any cookie of the same name and rewrites the file, so a session write
    /// also drops a persisted value it shadows.
    fn set(&mut self, cookie: Cookie) -> Result<()> {
        self.cookies.retain(|c| c.name != cookie.name);
        self.cookies.push(cookie);
        self.cookies.retain(|c| c.is_live(SystemTime::now()));
        self.save()
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut content = String::new();
        for cookie in &self.cookies {
            let Some(expires) = cookie.expires else {
                continue;
            };
            let secs = expires
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            let _ = writeln!(content, "{}\t{}\t{}", cookie.name, secs, cookie.value);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write cookies to {}", path.display()))
    }
}

impl SettingsStore for CookieJar {
    fn get(&self, key: &str) -> Option<String> {
        let name = urlencoding::encode(key);
        self.header().split(';').find_map(|pair| {
            let (found, value) = pair.trim_start().split_once('=')?;
            if found != name {
                return None;
            }
            match urlencoding::decode(value) {
                Ok(value) => Some(value.into_owned()),
                Err(e) => {
                    tracing::warn!("Ignoring undecodable cookie {}: {}", key, e);
                    None
                }
            }
        })
    }

    fn put(&mut self, key: &str, value: &str, retention: Retention) -> Result<()> {
        let now = SystemTime::now();
        let expires = match retention {
            Retention::Session => None,
            Retention::Days(_) => retention.expires_at(now),
            // An already-expired cookie deletes the stored one.
            Retention::Erase => Some(now - Duration::from_secs(1)),
        };
        self.set(Cookie {
            name: urlencoding::encode(key).into_owned(),
            value: urlencoding::encode(value).into_owned(),
            expires,
        })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.put(key, "", Retention::Erase)
    }
}

fn load_file(path: &Path) -> Result<Vec<Cookie>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let now = SystemTime::now();
    let mut cookies = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.splitn(3, '\t');
        let (Some(name), Some(secs), Some(value)) = (fields.next(), fields.next(), fields.next())
        else {
            tracing::warn!("{}:{}: skipping malformed cookie line", path.display(), number + 1);
            continue;
        };
        let Ok(secs) = secs.parse::<u64>() else {
            tracing::warn!("{}:{}: skipping line with invalid expiry", path.display(), number + 1);
            continue;
        };
        let cookie = Cookie {
            name: name.to_string(),
            value: value.to_string(),
            expires: Some(UNIX_EPOCH + Duration::from_secs(secs)),
        };
        if cookie.is_live(now) {
            cookies.push(cookie);
        }
    }
    Ok(cookies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_header_and_lookup() {
        let mut jar = CookieJar::in_memory();
        jar.put("doxygen_width", "312", Retention::Days(10)).unwrap();
        jar.put("doxygen_search_grp", "Classes", Retention::Session).unwrap();
        check!(jar.header() == "doxygen_width=312; doxygen_search_grp=Classes");
        check!(jar.get("doxygen_width") == Some("312".to_string()));
        check!(jar.get("doxygen_search_grp") == Some("Classes".to_string()));
    }

    #[test]
    fn test_name_must_match_exactly() {
        let mut jar = CookieJar::in_memory();
        jar.put("xdoxygen_width", "1", Retention::Session).unwrap();
        check!(jar.get("doxygen_width").is_none());
    }

    #[test]
    fn test_erase() {
        let mut jar = CookieJar::in_memory();
        jar.put("k", "v", Retention::Days(1)).unwrap();
        jar.remove("k").unwrap();
        check!(jar.get("k").is_none());
        check!(jar.header().is_empty());
    }

    #[test]
    fn test_only_persistent_cookies_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.txt");

        let mut jar = CookieJar::open(&path);
        jar.put("session", "s", Retention::Session).unwrap();
        jar.put("durable", "d", Retention::Days(2)).unwrap();
        drop(jar);

        let jar = CookieJar::open(&path);
        check!(jar.get("durable") == Some("d".to_string()));
        check!(jar.get("session").is_none());
    }

    #[test]
    fn test_overwrite_replaces() {
        let mut jar = CookieJar::in_memory();
        jar.put("k", "1", Retention::Session).unwrap();
        jar.put("k", "2", Retention::Days(1)).unwrap();
        check!(jar.header() == "k=2");
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.txt");
        let far = SystemTime::now() + Duration::from_secs(86_400);
        let secs = far.duration_since(UNIX_EPOCH).unwrap().as_secs();
        let content = format!("broken line\nwidth\t{secs}\t312\nbad\tsoon\tx\n");
        std::fs::write(&path, content).unwrap();

        let jar = CookieJar::open(&path);
        check!(jar.header() == "width=312");
    }

    #[test]
    fn test_session_write_drops_persisted_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.txt");

        let mut jar = CookieJar::open(&path);
        jar.put("k", "old", Retention::Days(10)).unwrap();
        jar.put("k", "new", Retention::Session).unwrap();
        check!(jar.get("k") == Some("new".to_string()));
        drop(jar);

        check!(CookieJar::open(&path).get("k").is_none());
    }

    #[test]
    fn test_special_characters_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.txt");

        let mut jar = CookieJar::open(&path);
        jar.put("width", "312", Retention::Days(10)).unwrap();
        jar.put("list", "a;b=c", Retention::Days(10)).unwrap();
        jar.put("note", "line1\nline2\tend", Retention::Days(10)).unwrap();
        check!(jar.get("list") == Some("a;b=c".to_string()));
        drop(jar);

        let jar = CookieJar::open(&path);
        check!(jar.get("width") == Some("312".to_string()));
        check!(jar.get("list") == Some("a;b=c".to_string()));
        check!(jar.get("note") == Some("line1\nline2\tend".to_string()));
    }
}
