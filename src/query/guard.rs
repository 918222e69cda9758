//! Read-only statement guard
//!
//! 在执行前对生成的 SQL 做词法检查：只允许单条 `SELECT`，
//! 拒绝语句分隔符后的第二条语句和任何写入/会话类关键字。
//! 字符串字面量、引号标识符和注释里的内容不参与判断。

use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString};

use crate::errors::{Result, VidstatError};

/// 出现在任何位置都会被拒绝的关键字
///
/// `REPLACE` 同时是字符串函数，不在列表中；`REPLACE INTO` 由 `INTO` 拦截。
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ForbiddenKeyword {
    Insert,
    Update,
    Delete,
    Merge,
    Upsert,
    Drop,
    Alter,
    Create,
    Truncate,
    Grant,
    Revoke,
    Copy,
    Vacuum,
    Attach,
    Detach,
    Pragma,
    Reindex,
    Call,
    Execute,
    Do,
    Lock,
    Comment,
    Set,
    Reset,
    Into,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Semicolon,
    Other,
}

/// 词法切分；字符串、引号标识符与注释被整体跳过
///
/// 各后端对字符串和注释边界的理解不同（反斜杠转义、`$$` 字符串、
/// 嵌套注释、MySQL 的 `#` 注释与 `/*!` 可执行注释等），这些写法直接拒绝。
fn tokenize(sql: &str) -> Result<Vec<Token<'_>>> {
    let bytes = sql.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'\'' | b'"' | b'`' => {
                i = skip_quoted(bytes, i, c)?;
                tokens.push(Token::Other);
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                // MySQL 只把后跟空白的 `--` 当注释
                if bytes.get(i + 2).is_some_and(|b| !b.is_ascii_whitespace()) {
                    return Err(VidstatError::unsafe_statement(
                        "line comment must be followed by whitespace",
                    ));
                }
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(sql, i)?;
            }
            b'#' => {
                return Err(VidstatError::unsafe_statement("'#' is not allowed"));
            }
            b'$' if starts_dollar_quote(bytes, i) => {
                return Err(VidstatError::unsafe_statement(
                    "dollar-quoted strings are not allowed",
                ));
            }
            b'[' => {
                check_bracket(bytes, i)?;
                tokens.push(Token::Other);
                i += 1;
            }
            b';' => {
                tokens.push(Token::Semicolon);
                i += 1;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                tokens.push(Token::Word(&sql[start..i]));
            }
            c if c.is_ascii_whitespace() => i += 1,
            _ => {
                // 数字、运算符、括号、非 ASCII
                tokens.push(Token::Other);
                i += 1;
                while i < bytes.len() && !bytes[i].is_ascii() {
                    i += 1;
                }
            }
        }
    }

    Ok(tokens)
}

/// 跳过引号内容，支持双写转义（`''`、`""`）；返回闭合引号之后的位置
///
/// 引号内出现反斜杠即拒绝：MySQL 与 PostgreSQL 的 `E'..'` 把 `\'` 当作转义。
fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> Result<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            return Err(VidstatError::unsafe_statement(
                "backslash inside quoted text is not allowed",
            ));
        }
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return Ok(i + 1);
        }
        i += 1;
    }
    Err(VidstatError::unsafe_statement(match quote {
        b'\'' => "unterminated string literal",
        _ => "unterminated quoted identifier",
    }))
}

/// 跳过 `/* .. */`；返回注释结束之后的位置
fn skip_block_comment(sql: &str, start: usize) -> Result<usize> {
    let body_start = start + 2;
    let Some(end) = sql[body_start..].find("*/") else {
        return Err(VidstatError::unsafe_statement("unterminated block comment"));
    };
    let body = &sql[body_start..body_start + end];
    if body.contains("/*") {
        return Err(VidstatError::unsafe_statement("nested block comments are not allowed"));
    }
    if body.starts_with('!') {
        return Err(VidstatError::unsafe_statement(
            "executable comments are not allowed",
        ));
    }
    Ok(body_start + end + 2)
}

/// `$$` 或 `$tag$`（`$1` 之类的参数占位符不算）
fn starts_dollar_quote(bytes: &[u8], start: usize) -> bool {
    let mut i = start + 1;
    match bytes.get(i) {
        Some(b'$') => return true,
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' || !b.is_ascii() => {}
        _ => return false,
    }
    while let Some(&b) = bytes.get(i) {
        if b == b'$' {
            return true;
        }
        if !(b.is_ascii_alphanumeric() || b == b'_' || !b.is_ascii()) {
            return false;
        }
        i += 1;
    }
    false
}

/// SQLite 把 `[..]` 当作标识符；其中出现引号或分号时各后端的边界不一致
fn check_bracket(bytes: &[u8], start: usize) -> Result<()> {
    let Some(len) = bytes[start + 1..].iter().position(|&b| b == b']') else {
        return Err(VidstatError::unsafe_statement("unterminated bracket"));
    };
    let inner = &bytes[start + 1..start + 1 + len];
    if inner.iter().any(|b| matches!(b, b'\'' | b'"' | b'`' | b';')) {
        return Err(VidstatError::unsafe_statement(
            "quotes or separators inside brackets are not allowed",
        ));
    }
    Ok(())
}

/// 校验语句，返回去掉结尾分号后的 SQL
pub fn check_statement(sql: &str) -> Result<String> {
    let trimmed = sql.trim();
    let tokens = tokenize(trimmed)?;

    let first_word = tokens.iter().find_map(|t| match t {
        Token::Word(w) => Some(*w),
        _ => None,
    });
    let Some(first_word) = first_word else {
        return Err(VidstatError::unsafe_statement("empty statement"));
    };
    if !matches!(tokens.first(), Some(Token::Word(_))) {
        return Err(VidstatError::unsafe_statement("statement must start with SELECT"));
    }
    if !first_word.eq_ignore_ascii_case("SELECT") {
        return Err(VidstatError::unsafe_statement(format!(
            "statement must start with SELECT, found '{}'",
            first_word
        )));
    }

    if let Some(pos) = tokens.iter().position(|t| *t == Token::Semicolon)
        && pos + 1 < tokens.len()
    {
        return Err(VidstatError::unsafe_statement(
            "multiple statements are not allowed",
        ));
    }

    for token in &tokens {
        if let Token::Word(w) = token
            && let Ok(keyword) = ForbiddenKeyword::from_str(w)
        {
            return Err(VidstatError::unsafe_statement(format!(
                "keyword {} is not allowed",
                keyword.as_ref()
            )));
        }
    }

    Ok(strip_trailing_semicolon(trimmed).to_string())
}

/// 去掉结尾分号（其后只允许空白和注释）
fn strip_trailing_semicolon(sql: &str) -> &str {
    // check_statement 已保证分号之后没有 token
    match last_semicolon_outside_quotes(sql) {
        Some(pos) => sql[..pos].trim_end(),
        None => sql,
    }
}

fn last_semicolon_outside_quotes(sql: &str) -> Option<usize> {
    let bytes = sql.as_bytes();
    let mut i = 0;
    let mut found = None;
    while i < bytes.len() {
        match bytes[i] {
            q @ (b'\'' | b'"' | b'`') => match skip_quoted(bytes, i, q) {
                Ok(next) => i = next,
                Err(_) => return found,
            },
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => match sql[i + 2..].find("*/") {
                Some(end) => i += 2 + end + 2,
                None => return found,
            },
            b';' => {
                found = Some(i);
                i += 1;
            }
            _ => i += 1,
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn rejected(sql: &str) -> bool {
        matches!(check_statement(sql), Err(VidstatError::UnsafeStatement(_)))
    }

    #[test]
    fn test_accepts_aggregate_select() {
        let sql = "SELECT COALESCE(SUM(delta_views_count), 0) FROM video_snapshots \
                   WHERE DATE(created_at) = '2025-11-27'";
        assert_eq!(check_statement(sql).unwrap(), sql);
    }

    #[test]
    fn test_strips_single_trailing_semicolon() {
        assert_eq!(
            check_statement("  select count(*) from videos; \n").unwrap(),
            "select count(*) from videos"
        );
        assert_eq!(
            check_statement("SELECT 1; -- done").unwrap(),
            "SELECT 1"
        );
    }

    #[test]
    fn test_rejects_second_statement() {
        assert!(rejected("SELECT 1; DROP TABLE videos"));
        assert!(rejected("SELECT 1; SELECT 2"));
        assert!(rejected("SELECT 1;;"));
    }

    #[test]
    fn test_rejects_non_select() {
        assert!(rejected("DELETE FROM videos"));
        assert!(rejected("WITH x AS (SELECT 1) SELECT * FROM x"));
        assert!(rejected("(SELECT 1)"));
        assert!(rejected(""));
        assert!(rejected("   -- nothing here"));
    }

    #[test]
    fn test_rejects_forbidden_keywords_anywhere() {
        assert!(rejected("SELECT * INTO backup FROM videos"));
        assert!(rejected("SELECT 1 FROM videos WHERE id IN (DELETE FROM videos RETURNING id)"));
        assert!(rejected("select pg_sleep(1); set statement_timeout = 0"));
        assert!(rejected("SeLeCt 1 /* ok */ UpDaTe"));
    }

    #[test]
    fn test_quoted_content_is_ignored() {
        assert!(check_statement("SELECT COUNT(*) FROM videos WHERE creator_id = 'drop; delete'").is_ok());
        assert!(check_statement("SELECT COUNT(*) FROM videos WHERE creator_id = 'it''s; update'").is_ok());
        assert!(check_statement(r#"SELECT "update" FROM videos"#).is_ok());
        assert!(check_statement("SELECT 1 -- ; drop table videos\n").is_ok());
        assert!(check_statement("SELECT /* insert; */ 1").is_ok());
    }

    #[test]
    fn test_identifiers_containing_keywords_are_fine() {
        assert!(check_statement("SELECT SUM(updated_count) FROM created_things").is_ok());
        assert!(check_statement("SELECT COUNT(*) FROM video_snapshots WHERE reset_flag = 0").is_ok());
        assert!(check_statement("SELECT REPLACE(creator_id, 'a', 'b') FROM videos").is_ok());
    }

    #[test]
    fn test_unterminated_input_is_rejected() {
        assert!(rejected("SELECT 'abc"));
        assert!(rejected(r#"SELECT "abc"#));
        assert!(rejected("SELECT 1 /* open"));
    }

    #[test]
    fn test_backslash_escapes_are_rejected() {
        assert!(rejected(r"SELECT 'a\'' ; DELETE FROM videos; -- '"));
        assert!(rejected(r"SELECT E'a\'' ; DELETE FROM videos; -- '"));
        assert!(rejected(r#"SELECT "a\"" ; DELETE FROM videos; -- ""#));
        assert!(rejected(r"SELECT COUNT(*) FROM videos WHERE creator_id = 'a\b'"));
    }

    #[test]
    fn test_dollar_quoting_is_rejected() {
        assert!(rejected("SELECT $$ ' $$ ; DELETE FROM videos; -- '"));
        assert!(rejected("SELECT $tag$ ' $tag$ ; DELETE FROM videos; -- '"));
        assert!(rejected("SELECT $$x$$"));
        // 参数占位符不是 dollar 字符串
        assert!(check_statement("SELECT COUNT(*) FROM videos WHERE views_count > $1").is_ok());
    }

    #[test]
    fn test_nested_and_executable_comments_are_rejected() {
        assert!(rejected("SELECT 1 /* /* */ ' */ ; DELETE FROM videos; -- '"));
        assert!(rejected("SELECT 1 /*! ; DELETE FROM videos */"));
        assert!(check_statement("SELECT 1 /* a * b / c */").is_ok());
    }

    #[test]
    fn test_mysql_comment_forms_are_rejected() {
        assert!(rejected("SELECT 1 # '\n; DELETE FROM videos; -- '"));
        assert!(rejected("SELECT 1 --'\n' ; DELETE FROM videos; -- '"));
        assert!(check_statement("SELECT 1 --\n").is_ok());
    }

    #[test]
    fn test_brackets_with_quotes_are_rejected() {
        assert!(rejected("SELECT [a'b] ; DELETE FROM videos; -- '"));
        assert!(rejected("SELECT [a"));
        assert!(check_statement("SELECT [creator_id] FROM videos").is_ok());
    }

    #[test]
    fn test_every_keyword_parses_case_insensitively() {
        for keyword in ForbiddenKeyword::iter() {
            let lower = keyword.as_ref().to_lowercase();
            assert_eq!(ForbiddenKeyword::from_str(&lower).unwrap(), keyword);
            assert!(rejected(&format!("SELECT 1 {}", lower)));
        }
    }
}
