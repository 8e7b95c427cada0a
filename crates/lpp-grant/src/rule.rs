// rule.rs: The single-line grant-rule grammar.
//
//   grant codeBase "<origin>" { permission <kind> "<target>", "<actions>"; };
//
// Every quoted field is stored escaped, so a GrantRule renders back to the
// exact text it was parsed from (modulo whitespace) and two rules compare
// equal iff their canonical text is equal.

use std::fmt;

use crate::error::GrammarError;
use crate::request::{CapabilityRequest, Provenance};

/// Escape text for use inside a double-quoted policy string.
///
/// Backslashes are escaped first so an escaped quote can always be told
/// apart from a literal backslash followed by a quote. Line breaks are
/// escaped so the rule stays on one line.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`escape`]. Unknown escape sequences are kept verbatim.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// A normalized grant rule: one provenance, one permission clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrantRule {
    codebase: String,
    kind: String,
    target: String,
    actions: String,
}

impl GrantRule {
    /// Build the rule granting `request` to `provenance`.
    pub fn new(provenance: &Provenance, request: &CapabilityRequest) -> Self {
        Self {
            codebase: escape(provenance.location()),
            kind: kind_token(request.kind()),
            target: escape(request.target()),
            actions: escape(request.actions()),
        }
    }

    /// The escaped code origin.
    pub fn codebase(&self) -> &str {
        &self.codebase
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The escaped target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The escaped action list.
    pub fn actions(&self) -> &str {
        &self.actions
    }

    /// Same rule with a different (already escaped) target.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// The permission clause alone: `permission <kind> "<target>", "<actions>";`.
    pub fn clause(&self) -> String {
        format!(
            "permission {} \"{}\", \"{}\";",
            self.kind, self.target, self.actions
        )
    }

    /// Parse one rule line.
    ///
    /// Whitespace between tokens is free (the legacy `{permission  kind`
    /// spacing parses), and the actions string may be omitted.
    pub fn parse(line: &str) -> Result<Self, GrammarError> {
        let mut cursor = Cursor::new(line);
        cursor.skip_ws();
        cursor.expect("grant")?;
        cursor.require_ws()?;
        cursor.expect("codeBase")?;
        cursor.skip_ws();
        let codebase = cursor.quoted()?;
        cursor.skip_ws();
        cursor.expect("{")?;
        cursor.skip_ws();
        cursor.expect("permission")?;
        cursor.require_ws()?;
        let kind = cursor.token()?;
        cursor.skip_ws();
        let target = cursor.quoted()?;
        cursor.skip_ws();
        let actions = if cursor.eat(',') {
            cursor.skip_ws();
            cursor.quoted()?
        } else {
            String::new()
        };
        cursor.skip_ws();
        cursor.expect(";")?;
        cursor.skip_ws();
        cursor.expect("}")?;
        cursor.skip_ws();
        cursor.expect(";")?;
        cursor.skip_ws();
        cursor.end()?;

        Ok(Self {
            codebase,
            kind,
            target,
            actions,
        })
    }
}

impl fmt::Display for GrantRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "grant codeBase \"{}\" {{ {} }};",
            self.codebase,
            self.clause()
        )
    }
}

/// Kinds are bare tokens in the grammar; anything that would end the
/// token early is replaced.
fn kind_token(kind: &str) -> String {
    let token: String = kind
        .chars()
        .map(|c| if c.is_whitespace() || c == '"' { '_' } else { c })
        .collect();
    if token.is_empty() {
        "_".to_string()
    } else {
        token
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn require_ws(&mut self) -> Result<(), GrammarError> {
        let before = self.pos;
        self.skip_ws();
        if self.pos == before {
            return Err(GrammarError::new(self.pos, "expected whitespace"));
        }
        Ok(())
    }

    fn expect(&mut self, literal: &str) -> Result<(), GrammarError> {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(GrammarError::new(
                self.pos,
                format!("expected '{}'", literal),
            ))
        }
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.rest().starts_with(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    fn token(&mut self) -> Result<String, GrammarError> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || c == '"')
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(GrammarError::new(self.pos, "expected permission kind"));
        }
        self.pos += len;
        Ok(rest[..len].to_string())
    }

    /// A double-quoted string. Returns the raw (still escaped) contents.
    fn quoted(&mut self) -> Result<String, GrammarError> {
        let start = self.pos;
        if !self.eat('"') {
            return Err(GrammarError::new(start, "expected '\"'"));
        }
        let body_start = self.pos;
        let mut chars = self.rest().char_indices();
        while let Some((i, ch)) = chars.next() {
            match ch {
                '\\' => {
                    chars.next();
                }
                '"' => {
                    let body = self.text[body_start..body_start + i].to_string();
                    self.pos = body_start + i + 1;
                    return Ok(body);
                }
                _ => {}
            }
        }
        Err(GrammarError::new(start, "unterminated string"))
    }

    fn end(&self) -> Result<(), GrammarError> {
        if self.rest().is_empty() {
            Ok(())
        } else {
            Err(GrammarError::new(self.pos, "trailing text after rule"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(origin: &str, request: CapabilityRequest) -> GrantRule {
        GrantRule::new(&Provenance::new(origin), &request)
    }

    #[test]
    fn renders_canonical_line() {
        let r = rule("file:/app/core.jar", CapabilityRequest::file("/etc/hosts", "read"));
        assert_eq!(
            r.to_string(),
            "grant codeBase \"file:/app/core.jar\" { permission FilePermission \"/etc/hosts\", \"read\"; };"
        );
        assert_eq!(
            r.clause(),
            "permission FilePermission \"/etc/hosts\", \"read\";"
        );
    }

    #[test]
    fn rendered_rule_parses_back() {
        let r = rule(
            "file:/app/core.jar",
            CapabilityRequest::socket("db.internal:5432", "connect,resolve"),
        );
        assert_eq!(GrantRule::parse(&r.to_string()).unwrap(), r);
    }

    #[test]
    fn embedded_quote_is_escaped() {
        let r = rule("X", CapabilityRequest::property("say \"hi\"", "read"));
        assert_eq!(r.target(), "say \\\"hi\\\"");
        let line = r.to_string();
        assert!(!line.contains("say \"hi"));

        let parsed = GrantRule::parse(&line).unwrap();
        assert_eq!(unescape(parsed.target()), "say \"hi\"");
    }

    #[test]
    fn escaped_quote_differs_from_literal_backslash_quote() {
        let quote = rule("X", CapabilityRequest::file("a\"b", "read"));
        let backslash_quote = rule("X", CapabilityRequest::file("a\\\"b", "read"));
        assert_ne!(quote.to_string(), backslash_quote.to_string());

        let a = GrantRule::parse(&quote.to_string()).unwrap();
        let b = GrantRule::parse(&backslash_quote.to_string()).unwrap();
        assert_eq!(unescape(a.target()), "a\"b");
        assert_eq!(unescape(b.target()), "a\\\"b");
    }

    #[test]
    fn carriage_return_and_newline_stay_on_one_line() {
        let r = rule("X", CapabilityRequest::property("line1\r\nline2", "read"));
        let line = r.to_string();
        assert!(!line.contains('\r'));
        assert!(!line.contains('\n'));
        let parsed = GrantRule::parse(&line).unwrap();
        assert_eq!(unescape(parsed.target()), "line1\r\nline2");
    }

    #[test]
    fn escape_round_trips() {
        for text in ["plain", "C:\\dir\\file", "q\"uote", "\\\"", "cr\rlf\n", ""] {
            assert_eq!(unescape(&escape(text)), text);
        }
    }

    #[test]
    fn parses_legacy_spacing() {
        let line = "grant codeBase \"file:/a.jar\" {permission  FilePermission \"/tmp/x\", \"read\";};";
        let parsed = GrantRule::parse(line).unwrap();
        assert_eq!(parsed.codebase(), "file:/a.jar");
        assert_eq!(parsed.kind(), "FilePermission");
        assert_eq!(parsed.target(), "/tmp/x");
        assert_eq!(parsed.actions(), "read");
    }

    #[test]
    fn missing_actions_parse_as_empty() {
        let line = "grant codeBase \"X\" { permission RuntimePermission \"exitVM\"; };";
        let parsed = GrantRule::parse(line).unwrap();
        assert_eq!(parsed.actions(), "");
        assert_eq!(
            parsed.clause(),
            "permission RuntimePermission \"exitVM\", \"\";"
        );
    }

    #[test]
    fn whitespace_in_kind_is_replaced() {
        let r = rule("X", CapabilityRequest::new("My Permission", "t", "a"));
        assert_eq!(r.kind(), "My_Permission");
        assert!(GrantRule::parse(&r.to_string()).is_ok());
    }

    #[test]
    fn malformed_lines_are_rejected() {
        for line in [
            "",
            "// comment",
            "grant codeBase \"X\" {",
            "grant codeBase \"X { permission P \"t\", \"a\"; };",
            "grant codeBase \"X\" { permission P \"t\", \"a\"; }; trailing",
            "grant codeBase \"X\" { P \"t\", \"a\"; };",
        ] {
            assert!(GrantRule::parse(line).is_err(), "accepted: {line:?}");
        }
    }

    #[test]
    fn error_reports_column() {
        let err = GrantRule::parse("grant codeBase X").unwrap_err();
        assert_eq!(err.column, 15);
    }
}
