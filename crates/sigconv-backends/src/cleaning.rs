//! Regex-driven value cleaning: escape special characters, then strip
//! characters the target cannot represent at all.

use regex::Regex;

use crate::error::Result;

/// Default substitution: prefix the matched text with a backslash.
const DEFAULT_ESCAPE_SUBST: &str = "\\$1";

/// Escaping and stripping rules applied to every rendered value.
///
/// The escape pattern must capture the matched text in group 1; the
/// substitution inserts the original text back, so escaping only adds
/// markup and never deletes characters. The strip pattern deletes its
/// matches outright. Either or both may be absent.
#[derive(Debug, Clone, Default)]
pub struct ValueCleaner {
    escape: Option<Regex>,
    escape_subst: String,
    strip: Option<Regex>,
    /// When set, the escape pattern carries two alternatives: group 1
    /// matches pass through unchanged, group 2 matches are
    /// backslash-prefixed.
    passthrough: bool,
}

impl ValueCleaner {
    /// A cleaner that performs no transformation.
    pub fn none() -> Self {
        ValueCleaner::default()
    }

    /// Build a cleaner from optional escape and strip patterns, using the
    /// backslash-prefix substitution.
    pub fn new(escape: Option<&str>, strip: Option<&str>) -> Result<Self> {
        Self::with_subst(escape, DEFAULT_ESCAPE_SUBST, strip)
    }

    /// Build a cleaner with an explicit escape substitution (must
    /// reference group 1 to reinsert the matched text).
    pub fn with_subst(escape: Option<&str>, subst: &str, strip: Option<&str>) -> Result<Self> {
        Ok(ValueCleaner {
            escape: escape.map(Regex::new).transpose()?,
            escape_subst: subst.to_string(),
            strip: strip.map(Regex::new).transpose()?,
            passthrough: false,
        })
    }

    /// Build a cleaner whose escape pattern distinguishes two
    /// alternatives: sequences captured by group 1 are kept verbatim,
    /// sequences captured by group 2 are backslash-prefixed. For
    /// dialects where certain character sequences must stay unescaped.
    pub fn with_passthrough(escape: &str, strip: Option<&str>) -> Result<Self> {
        Ok(ValueCleaner {
            escape: Some(Regex::new(escape)?),
            escape_subst: DEFAULT_ESCAPE_SUBST.to_string(),
            strip: strip.map(Regex::new).transpose()?,
            passthrough: true,
        })
    }

    /// Apply escaping, then stripping.
    pub fn clean(&self, value: &str) -> String {
        let mut out = match &self.escape {
            Some(re) if self.passthrough => re
                .replace_all(value, |caps: &regex::Captures| match caps.get(1) {
                    Some(kept) => kept.as_str().to_string(),
                    None => format!("\\{}", &caps[2]),
                })
                .into_owned(),
            Some(re) => re.replace_all(value, self.escape_subst.as_str()).into_owned(),
            None => value.to_string(),
        };
        if let Some(re) = &self.strip {
            out = re.replace_all(&out, "").into_owned();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rules_is_identity() {
        let cleaner = ValueCleaner::none();
        assert_eq!(cleaner.clean("a+b:c"), "a+b:c");
    }

    #[test]
    fn escape_prefixes_matches_with_backslash() {
        let cleaner = ValueCleaner::new(Some(r#"(["\\])"#), None).unwrap();
        assert_eq!(cleaner.clean(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(cleaner.clean(r"C:\tmp"), r"C:\\tmp");
    }

    #[test]
    fn strip_deletes_matches() {
        let cleaner = ValueCleaner::new(None, Some("[<>]")).unwrap();
        assert_eq!(cleaner.clean("<html>"), "html");
    }

    #[test]
    fn passthrough_group_is_kept_verbatim() {
        let cleaner =
            ValueCleaner::with_passthrough(r"(\\[*?])|([:\\])", None).unwrap();
        assert_eq!(cleaner.clean(r"C:\*cache"), r"C\:\*cache");
        assert_eq!(cleaner.clean(r"C:\tmp"), r"C\:\\tmp");
    }

    #[test]
    fn escape_runs_before_strip() {
        let cleaner = ValueCleaner::new(Some(r"([+])"), Some("[<>]")).unwrap();
        assert_eq!(cleaner.clean("<a+b>"), r"a\+b");
    }

    #[test]
    fn clean_is_identity_without_special_characters() {
        let cleaner =
            ValueCleaner::new(Some(r#"([+\-=!(){}\[\]^"~:\\/]|&&|\|\|)"#), Some("[<>]")).unwrap();
        assert_eq!(cleaner.clean("plain value 123"), "plain value 123");
    }
}
