//! Prefix expansion, base qualification and value encoding for IRIs

use std::borrow::Cow;
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TermFailure;
use crate::mapping::MappingSpecification;

/// How column values embedded in IRI templates are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IriEncoding {
    /// Percent-encode characters outside the unreserved and sub-delim sets
    #[default]
    Percent,
    /// Replace spaces and slashes with `_`
    Underscore,
    /// Insert values unchanged
    Verbatim,
}

impl IriEncoding {
    pub fn encode<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self {
            IriEncoding::Percent => iri_escape(value),
            IriEncoding::Underscore => {
                if value.contains([' ', '/']) {
                    Cow::Owned(value.replace([' ', '/'], "_"))
                } else {
                    Cow::Borrowed(value)
                }
            }
            IriEncoding::Verbatim => Cow::Borrowed(value),
        }
    }
}

fn iri_escape(value: &str) -> Cow<'_, str> {
    let safe = |c: char| {
        matches!(c,
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' | '_' | '~'
            | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '='
            | ':' | '@')
    };
    if value.chars().all(safe) {
        return Cow::Borrowed(value);
    }

    let mut result = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        if safe(c) {
            result.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                result.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    Cow::Owned(result)
}

/// Turns template output into absolute IRIs
///
/// `prefix:local` expands through the prefix table. A name with an unknown
/// prefix is kept as written. Values without a colon are relative and get
/// the base IRI prepended when one is set.
#[derive(Debug, Clone, Default)]
pub struct TermResolver {
    prefixes: BTreeMap<String, String>,
    base: Option<String>,
    encoding: IriEncoding,
}

impl TermResolver {
    pub fn new(prefixes: BTreeMap<String, String>) -> Self {
        Self {
            prefixes,
            ..Default::default()
        }
    }

    /// Resolver over a specification's prefixes and base
    pub fn for_spec(spec: &MappingSpecification) -> Self {
        Self::new(spec.prefixes.clone()).with_base(spec.base.clone())
    }

    pub fn with_base(mut self, base: Option<String>) -> Self {
        self.base = base;
        self
    }

    pub fn with_encoding(mut self, encoding: IriEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn encoding(&self) -> IriEncoding {
        self.encoding
    }

    /// Expand a prefixed name or qualify a relative IRI.
    pub fn expand_iri(&self, value: &str) -> Result<String, TermFailure> {
        if value.is_empty() {
            return Err(TermFailure::Invalid("empty IRI".to_string()));
        }
        Ok(self.expand_head(value))
    }

    /// Expansion without the emptiness check, for the fixed start of a
    /// template whose remainder comes from columns.
    pub(crate) fn expand_head(&self, value: &str) -> String {
        match value.split_once(':') {
            Some((prefix, local)) => match self.prefixes.get(prefix) {
                Some(ns) => format!("{}{}", ns, local),
                None => {
                    if !local.starts_with("//") {
                        debug!(prefix, iri = value, "unknown prefix, IRI kept as written");
                    }
                    value.to_string()
                }
            },
            None => self.qualify(value),
        }
    }

    /// Resolve a whole column value used as an IRI.
    ///
    /// Prefixed and absolute values are expanded like constants. Anything
    /// else, including text such as `10:30` or `Big Data: Finance`, is
    /// encoded first, then qualified against the base.
    pub fn resolve_reference(&self, value: &str) -> Result<String, TermFailure> {
        if value.is_empty() {
            return Err(TermFailure::Invalid("empty IRI".to_string()));
        }
        if self.is_prefixed_or_absolute(value) {
            return self.expand_iri(value);
        }
        Ok(self.qualify(&self.encoding.encode(value)))
    }

    /// `prefix:local` with a declared prefix, or `scheme:rest`, with no
    /// whitespace anywhere
    fn is_prefixed_or_absolute(&self, value: &str) -> bool {
        static SCHEME_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*$").expect("valid regex"));

        if value.chars().any(char::is_whitespace) {
            return false;
        }
        match value.split_once(':') {
            Some((head, _)) => self.prefixes.contains_key(head) || SCHEME_RE.is_match(head),
            None => false,
        }
    }

    fn qualify(&self, relative: &str) -> String {
        match &self.base {
            Some(base) => format!("{}{}", base, relative),
            None => relative.to_string(),
        }
    }
}
