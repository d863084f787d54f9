use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use super::policy::{SqlOperation, BLOCKED_KEYWORDS, DEFAULT_ALLOWED_TABLES, DEFAULT_SCHEMA};

// Quoted text is matched alongside comments so that whichever starts first wins,
// as in the database's own lexer. Unterminated quotes run to the end of input, and
// so does anything after a dollar quote, since its closing tag cannot be matched here.
static LEXICAL_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?s)",
        r"\b[Ee]'(?:[^'\\]|\\.|'')*'?",
        r"|'(?:[^']|'')*'?",
        r#"|"(?:[^"]|"")*"?"#,
        r"|\$(?:[A-Za-z_][A-Za-z0-9_]*)?\$.*",
        r"|/\*.*?\*/",
        r"|--[^\n]*",
    ))
    .expect("lexical span pattern")
});

static LEADING_VERB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(SELECT|UPDATE|INSERT)\b").expect("verb pattern"));

static BLOCKED_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    BLOCKED_KEYWORDS
        .iter()
        .map(|keyword| {
            let body = keyword.replace(' ', r"\s+");
            let pattern = format!(r"(?i)\b{}\b", body);
            (*keyword, Regex::new(&pattern).expect("blocked keyword pattern"))
        })
        .collect()
});

const IDENT: &str = r#""?[A-Za-z_][A-Za-z0-9_$]*"?"#;

// Identifier after JOIN/INTO/UPDATE, optionally "quoted" and schema-qualified.
static TABLE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)\b(?:JOIN|INTO|UPDATE)\s+((?:{id}\s*\.\s*)?{id})",
        id = IDENT
    );
    Regex::new(&pattern).expect("table reference pattern")
});

// Whole `FROM a [AS] x, b y, ...` list; each entry is checked.
static FROM_LIST: LazyLock<Regex> = LazyLock::new(|| {
    let entry = format!(
        r"(?:{id}\s*\.\s*)?{id}(?:\s+(?:AS\s+)?{id})?",
        id = IDENT
    );
    let pattern = format!(r"(?i)\bFROM\s+({entry}(?:\s*,\s*{entry})*)", entry = entry);
    Regex::new(&pattern).expect("from list pattern")
});

static FROM_LIST_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"(?:^|,)\s*((?:{id}\s*\.\s*)?{id})", id = IDENT);
    Regex::new(&pattern).expect("from list entry pattern")
});

/// Verdict for one proposed statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation: Option<SqlOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ValidationResult {
    fn allowed(operation: SqlOperation) -> Self {
        Self {
            valid: true,
            operation: Some(operation),
            error: None,
        }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            operation: None,
            error: Some(reason.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn operation(&self) -> Option<SqlOperation> {
        self.operation
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn into_result(self) -> Result<SqlOperation, String> {
        match (self.valid, self.operation, self.error) {
            (true, Some(op), _) => Ok(op),
            (_, _, Some(err)) => Err(err),
            _ => Err("Query rejected".to_string()),
        }
    }
}

/// Textual allow/deny policy applied to every statement before it reaches the database.
///
/// This is a fast first layer only. It does not parse SQL, is not aware of
/// quoted strings, and relies on the backend enforcing its own permissions.
#[derive(Debug, Clone)]
pub struct SqlGuardrail {
    allowed_tables: BTreeSet<String>,
}

impl Default for SqlGuardrail {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_TABLES)
    }
}

impl SqlGuardrail {
    pub fn new<I, S>(allowed_tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_tables = allowed_tables
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { allowed_tables }
    }

    pub fn allowed_tables(&self) -> impl Iterator<Item = &str> {
        self.allowed_tables.iter().map(String::as_str)
    }

    pub fn validate(&self, sql: &str) -> ValidationResult {
        let cleaned = strip_comments(sql);
        let trimmed = cleaned.trim();

        if trimmed.is_empty() {
            return ValidationResult::rejected("Empty query after removing comments");
        }

        let upper = trimmed.to_uppercase();
        let operation = match LEADING_VERB
            .captures(&upper)
            .and_then(|caps| SqlOperation::from_keyword(&caps[1]))
        {
            Some(op) => op,
            None => {
                return ValidationResult::rejected(
                    "Only SELECT, UPDATE, and INSERT operations are allowed",
                )
            }
        };

        if let Some(keyword) = find_blocked_keyword(trimmed) {
            return ValidationResult::rejected(format!("Blocked keyword detected: {}", keyword));
        }

        if let Some(table) = self.find_disallowed_table(trimmed) {
            return ValidationResult::rejected(format!(
                "Access to table '{}' is not allowed. Allowed tables: {}",
                table,
                self.allowed_tables().collect::<Vec<_>>().join(", ")
            ));
        }

        let body = trimmed.strip_suffix(';').unwrap_or(trimmed);
        if body.contains(';') {
            return ValidationResult::rejected("Multiple statements not allowed");
        }

        ValidationResult::allowed(operation)
    }

    fn find_disallowed_table(&self, sql: &str) -> Option<String> {
        let from_entries = FROM_LIST.captures_iter(sql).flat_map(|list| {
            FROM_LIST_ENTRY
                .captures_iter(list.get(1).map_or("", |m| m.as_str()))
                .map(|caps| normalize_identifier(&caps[1]))
                .collect::<Vec<_>>()
        });

        from_entries
            .chain(
                TABLE_REFERENCE
                    .captures_iter(sql)
                    .map(|caps| normalize_identifier(&caps[1])),
            )
            // `ON CONFLICT ... DO UPDATE SET` is not a table reference
            .filter(|ident| ident != "set")
            .find(|ident| !self.is_table_allowed(ident))
    }

    fn is_table_allowed(&self, ident: &str) -> bool {
        match ident.split_once('.') {
            Some((schema, table)) => schema == DEFAULT_SCHEMA && self.allowed_tables.contains(table),
            None => self.allowed_tables.contains(ident),
        }
    }
}

/// Removes `/* ... */` and `-- ...` comments so later checks see what the database sees.
///
/// Single left-to-right scan: comment markers inside quoted text are kept, and a
/// `/*` inside a line comment does not reach past the end of that line.
pub fn strip_comments(sql: &str) -> String {
    LEXICAL_SPAN
        .replace_all(sql, |caps: &Captures| {
            let span = &caps[0];
            if span.starts_with("/*") {
                " ".to_string()
            } else if span.starts_with("--") {
                String::new()
            } else {
                span.to_string()
            }
        })
        .into_owned()
}

fn find_blocked_keyword(sql: &str) -> Option<&'static str> {
    BLOCKED_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(sql))
        .map(|(keyword, _)| *keyword)
}

fn normalize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '"' && !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Validates against the default table allowlist.
pub fn validate(sql: &str) -> ValidationResult {
    SqlGuardrail::default().validate(sql)
}
