//! Identifier and literal escaping for MySQL
//!
//! Identifiers are wrapped in backticks with embedded backticks doubled.
//! Column references understand the `table.column` and `column AS alias`
//! forms, table references only the alias form. Literal escaping exists for
//! debug rendering only; executed statements always bind their values.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::value::DatabaseValue;

static ALIAS_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+AS\s+").expect("alias separator pattern is valid")
});

/// Escape a column reference.
///
/// Already escaped input is returned unchanged, so the function is idempotent.
///
/// ```
/// use kc_database::escape::escape_column;
///
/// assert_eq!(escape_column("users.id AS user_id"), "`users`.`id` AS `user_id`");
/// assert_eq!(escape_column("`id`"), "`id`");
/// ```
pub fn escape_column(column: &str) -> String {
    let column = column.trim();

    if is_wrapped(column) {
        return column.to_string();
    }

    match split_alias(column) {
        Some((base, alias)) => format!("{} AS {}", escape_qualified(base), quote_identifier(alias)),
        None => escape_qualified(column),
    }
}

/// Escape a table reference, keeping an optional `AS alias` suffix.
///
/// The alias is everything after the `AS` token and may contain spaces.
pub fn escape_table(table: &str) -> String {
    let table = table.trim();

    if is_wrapped(table) {
        return table.to_string();
    }

    match split_alias(table) {
        Some((base, alias)) => format!("{} AS {}", quote_identifier(base), quote_identifier(alias)),
        None => quote_identifier(table),
    }
}

/// Render a value as a MySQL literal
pub fn escape_value(value: &DatabaseValue) -> String {
    match value {
        DatabaseValue::Null => "NULL".to_string(),
        DatabaseValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        DatabaseValue::Int(i) => i.to_string(),
        DatabaseValue::UInt(u) => u.to_string(),
        DatabaseValue::Float(f) => f.to_string(),
        DatabaseValue::String(s) => quote_string(s),
        DatabaseValue::Bytes(bytes) => {
            let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
            format!("X'{}'", hex)
        }
        DatabaseValue::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S%.f")),
        DatabaseValue::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
        DatabaseValue::Time(t) => format!("'{}'", t.format("%H:%M:%S%.f")),
        DatabaseValue::Json(j) => quote_string(&j.to_string()),
    }
}

/// Escape a list of values
pub fn escape_values(values: &[DatabaseValue]) -> Vec<String> {
    values.iter().map(escape_value).collect()
}

/// Replace each `?` placeholder with the matching escaped binding.
///
/// Question marks inside quoted strings or quoted identifiers are left alone.
/// Placeholders without a binding are kept as they are.
pub fn interpolate(sql: &str, bindings: &[DatabaseValue]) -> String {
    let mut out = String::with_capacity(sql.len() + bindings.len() * 8);
    let mut values = bindings.iter();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in sql.chars() {
        match quote {
            Some(q) => {
                out.push(ch);
                if escaped {
                    escaped = false;
                } else if ch == '\\' && q != '`' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' | '`' => {
                    quote = Some(ch);
                    out.push(ch);
                }
                '?' => match values.next() {
                    Some(value) => out.push_str(&escape_value(value)),
                    None => out.push('?'),
                },
                _ => out.push(ch),
            },
        }
    }

    out
}

fn split_alias(name: &str) -> Option<(&str, &str)> {
    let found = ALIAS_SEPARATOR.find(name)?;
    let alias = name[found.end()..].trim();
    if alias.is_empty() {
        return None;
    }
    Some((name[..found.start()].trim(), alias))
}

fn escape_qualified(column: &str) -> String {
    if column == "*" {
        return column.to_string();
    }

    match column.split_once('.') {
        Some((table, rest)) if !table.is_empty() => {
            let rest = rest.trim();
            let rest = if rest == "*" {
                rest.to_string()
            } else {
                quote_identifier(rest)
            };
            format!("{}.{}", quote_identifier(table), rest)
        }
        _ => quote_identifier(column),
    }
}

fn quote_identifier(identifier: &str) -> String {
    let identifier = identifier.trim();
    if is_wrapped(identifier) {
        return identifier.to_string();
    }
    format!("`{}`", identifier.replace('`', "``"))
}

fn is_wrapped(identifier: &str) -> bool {
    identifier.len() >= 2 && identifier.starts_with('`') && identifier.ends_with('`')
}

fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_table() {
        assert_eq!(escape_table("users"), "`users`");
        assert_eq!(escape_table("users AS u"), "`users` AS `u`");
        assert_eq!(escape_table("users as u"), "`users` AS `u`");
        assert_eq!(escape_table("users AS u table"), "`users` AS `u table`");
    }

    #[test]
    fn test_escape_column_forms() {
        assert_eq!(escape_column("id"), "`id`");
        assert_eq!(escape_column("  id "), "`id`");
        assert_eq!(escape_column("users.id"), "`users`.`id`");
        assert_eq!(escape_column("id AS user_id"), "`id` AS `user_id`");
        assert_eq!(escape_column("id as user_id"), "`id` AS `user_id`");
        assert_eq!(escape_column("users.id AS user_id"), "`users`.`id` AS `user_id`");
        assert_eq!(escape_column("*"), "*");
        assert_eq!(escape_column("u.*"), "`u`.*");
    }

    #[test]
    fn test_escape_column_is_idempotent() {
        for input in [
            "id",
            "users.id",
            "users.id AS user_id",
            "id AS user id",
            "u.*",
            "weird`name",
            "`users`.`id` AS `user_id`",
        ] {
            let once = escape_column(input);
            assert_eq!(escape_column(&once), once, "input: {}", input);
        }
    }

    #[test]
    fn test_embedded_backticks_are_doubled() {
        assert_eq!(escape_column("a`b"), "`a``b`");
    }

    #[test]
    fn test_dangling_alias_is_best_effort() {
        assert_eq!(escape_table("users AS"), "`users AS`");
    }

    #[test]
    fn test_escape_value() {
        assert_eq!(escape_value(&DatabaseValue::Int(5)), "5");
        assert_eq!(
            escape_value(&DatabaseValue::from("SELECT * FROM users;")),
            "'SELECT * FROM users;'"
        );
        assert_eq!(escape_value(&DatabaseValue::from("it's")), "'it\\'s'");
        assert_eq!(escape_value(&DatabaseValue::Null), "NULL");
        assert_eq!(escape_value(&DatabaseValue::Bytes(vec![0xde, 0xad])), "X'DEAD'");

        let escaped = escape_values(&[DatabaseValue::Int(2), DatabaseValue::from("Foo")]);
        assert_eq!(escaped, vec!["2".to_string(), "'Foo'".to_string()]);
    }

    #[test]
    fn test_interpolate_skips_quoted_question_marks() {
        let sql = "SELECT * FROM `t` WHERE `a` = ? AND `b` = '?' AND `c` IN (?, ?)";
        let rendered = interpolate(
            sql,
            &[
                DatabaseValue::Int(1),
                DatabaseValue::from("x"),
                DatabaseValue::Null,
            ],
        );
        assert_eq!(
            rendered,
            "SELECT * FROM `t` WHERE `a` = 1 AND `b` = '?' AND `c` IN ('x', NULL)"
        );
    }
}
