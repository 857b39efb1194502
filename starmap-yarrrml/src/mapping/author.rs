//! Mapping document authors

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// An author record
///
/// Written either long-form (`name`, `email`, `website`, `webid` keys), as a
/// `Name <email> (website)` shortcut, or as a bare WebID IRI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub webid: Option<String>,
}

impl Author {
    /// Parse the one-line author shortcut.
    ///
    /// Returns `None` when the text has none of the recognised parts.
    pub fn parse_shortcut(text: &str) -> Option<Self> {
        static SHORTCUT_RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^\s*(?P<name>[^<(]*?)\s*(?:<(?P<email>[^>]*)>)?\s*(?:\((?P<website>[^)]*)\))?\s*$")
                .expect("valid regex")
        });
        static WEBID_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://\S+$").expect("valid regex"));

        let text = text.trim();
        if WEBID_RE.is_match(text) {
            return Some(Author {
                webid: Some(text.to_string()),
                ..Default::default()
            });
        }

        let caps = SHORTCUT_RE.captures(text)?;
        let part = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let author = Author {
            name: part("name"),
            email: part("email"),
            website: part("website"),
            webid: None,
        };
        if author.is_empty() {
            None
        } else {
            Some(author)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.website.is_none()
            && self.webid.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_name_email() {
        let a = Author::parse_shortcut("John Doe <john@doe.com>").unwrap();
        assert_eq!(a.name.as_deref(), Some("John Doe"));
        assert_eq!(a.email.as_deref(), Some("john@doe.com"));
        assert_eq!(a.website, None);
    }

    #[test]
    fn test_shortcut_name_website() {
        let a = Author::parse_shortcut("Jane Doe (https://janedoe.com)").unwrap();
        assert_eq!(a.name.as_deref(), Some("Jane Doe"));
        assert_eq!(a.website.as_deref(), Some("https://janedoe.com"));
    }

    #[test]
    fn test_shortcut_all_parts() {
        let a = Author::parse_shortcut("Ann <ann@x.org> (https://ann.org)").unwrap();
        assert_eq!(a.name.as_deref(), Some("Ann"));
        assert_eq!(a.email.as_deref(), Some("ann@x.org"));
        assert_eq!(a.website.as_deref(), Some("https://ann.org"));
    }

    #[test]
    fn test_webid() {
        let a = Author::parse_shortcut("http://johndoe.com/#me").unwrap();
        assert_eq!(a.webid.as_deref(), Some("http://johndoe.com/#me"));
        assert_eq!(a.name, None);
    }

    #[test]
    fn test_empty() {
        assert!(Author::parse_shortcut("   ").is_none());
    }
}
