//! Statement splitting for SQL dump files
//!
//! Dumps produced by mysqldump or phpMyAdmin cannot be split on `;` naively:
//! the terminator may appear inside string literals, quoted identifiers and
//! comments, and routine definitions switch the terminator with client-side
//! `DELIMITER` directives. [`StatementSplitter`] scans the dump byte-wise and
//! yields one statement at a time, with the same quoting and comment rules
//! the mysql client applies.
//!
//! Statements are yielded as trimmed slices of the input with their comments
//! intact; [`is_effectively_empty`] tells pure-comment statements apart from
//! executable ones (conditional `/*!` comments count as executable).

/// Iterator over the statements of a SQL dump.
///
/// Recognizes `'`, `"` and backtick quoting (with doubled-quote escapes, and
/// backslash escapes inside `'`/`"` strings), `--` and `#` line comments,
/// `/* */` block comments, and `DELIMITER` directives preceded by nothing
/// but whitespace and plain comments since the previous statement. The
/// directive line is consumed together with those leading comments and never
/// yielded. A trailing statement without a terminator is yielded if
/// non-empty.
pub struct StatementSplitter<'a> {
    input: &'a str,
    pos: usize,
    delimiter: String,
}

impl<'a> StatementSplitter<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            delimiter: ";".to_string(),
        }
    }

    /// Active statement terminator (changes when a `DELIMITER` directive is
    /// consumed)
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    fn delimiter_at(&self, pos: usize) -> bool {
        self.input.as_bytes()[pos..].starts_with(self.delimiter.as_bytes())
    }

    /// Consume a `DELIMITER <token>` directive at the current position.
    /// Returns false without advancing when the input here is not one.
    fn try_consume_delimiter_directive(&mut self) -> bool {
        const WORD: &[u8] = b"DELIMITER";
        let rest = &self.input[self.pos..];
        let bytes = rest.as_bytes();
        if bytes.len() < WORD.len() || !bytes[..WORD.len()].eq_ignore_ascii_case(WORD) {
            return false;
        }
        // A bare DELIMITER word is SQL text, not a directive
        match bytes.get(WORD.len()) {
            Some(b' ') | Some(b'\t') => {}
            _ => return false,
        }
        let line_end = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());
        if let Some(token) = rest[WORD.len()..line_end].split_whitespace().next() {
            self.delimiter = token.to_string();
        }
        self.pos += line_end;
        true
    }

    /// Skip a quoted literal starting at the current position (opening quote
    /// included). Doubled quotes stay inside the literal; backtick-quoted
    /// identifiers do not process backslash escapes.
    fn skip_quoted(&mut self, quote: u8, backslash_escapes: bool) {
        let bytes = self.input.as_bytes();
        self.pos += 1;
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if backslash_escapes && b == b'\\' {
                self.pos = (self.pos + 2).min(bytes.len());
                continue;
            }
            if b == quote {
                if bytes.get(self.pos + 1) == Some(&quote) {
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                return;
            }
            self.pos += 1;
        }
        // Unterminated literal runs to end of input
    }

    fn skip_line_comment(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
    }

    /// Skip a `/* */` comment (conditional `/*!` included; the terminator is
    /// never matched inside either kind).
    fn skip_block_comment(&mut self) {
        let bytes = self.input.as_bytes();
        self.pos += 2;
        while self.pos < bytes.len() {
            if bytes[self.pos] == b'*' && bytes.get(self.pos + 1) == Some(&b'/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
        // Unterminated comment runs to end of input
    }
}

impl<'a> Iterator for StatementSplitter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.input.as_bytes();
        'statement: while self.pos < bytes.len() {
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos >= bytes.len() {
                break;
            }

            let start = self.pos;
            // True while [start..pos] holds only whitespace and plain
            // comments; a DELIMITER directive is still recognized there, and
            // consuming it drops that trivia.
            let mut only_trivia = true;
            while self.pos < bytes.len() {
                if self.delimiter_at(self.pos) {
                    let stmt = self.input[start..self.pos].trim_end();
                    self.pos += self.delimiter.len();
                    if stmt.is_empty() {
                        continue 'statement;
                    }
                    return Some(stmt);
                }
                match bytes[self.pos] {
                    b'D' | b'd' if only_trivia => {
                        if self.try_consume_delimiter_directive() {
                            continue 'statement;
                        }
                        only_trivia = false;
                        self.pos += 1;
                    }
                    b'\'' => {
                        only_trivia = false;
                        self.skip_quoted(b'\'', true);
                    }
                    b'"' => {
                        only_trivia = false;
                        self.skip_quoted(b'"', true);
                    }
                    b'`' => {
                        only_trivia = false;
                        self.skip_quoted(b'`', false);
                    }
                    b'#' => self.skip_line_comment(),
                    b'-' if line_comment_at(bytes, self.pos) => self.skip_line_comment(),
                    b'/' if bytes.get(self.pos + 1) == Some(&b'*') => {
                        // Conditional /*! comments execute server-side
                        if bytes.get(self.pos + 2) == Some(&b'!') {
                            only_trivia = false;
                        }
                        self.skip_block_comment();
                    }
                    _ => {
                        if !bytes[self.pos].is_ascii_whitespace() {
                            only_trivia = false;
                        }
                        self.pos += 1;
                    }
                }
            }

            // Trailing statement without a terminator
            let stmt = self.input[start..].trim_end();
            if !stmt.is_empty() {
                return Some(stmt);
            }
            break;
        }
        None
    }
}

/// `--` opens a comment only when followed by whitespace or end of input
fn line_comment_at(bytes: &[u8], pos: usize) -> bool {
    bytes[pos] == b'-'
        && bytes.get(pos + 1) == Some(&b'-')
        && match bytes.get(pos + 2) {
            Some(b) => b.is_ascii_whitespace(),
            None => true,
        }
}

/// True when nothing executable remains after removing whitespace and
/// comments. Conditional `/*!` comments execute server-side and therefore
/// count as content.
pub fn is_effectively_empty(stmt: &str) -> bool {
    let bytes = stmt.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        let b = bytes[pos];
        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if b == b'#' || (b == b'-' && line_comment_at(bytes, pos)) {
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
            continue;
        }
        if b == b'/' && bytes.get(pos + 1) == Some(&b'*') {
            if bytes.get(pos + 2) == Some(&b'!') {
                return false;
            }
            let mut end = pos + 2;
            loop {
                if end >= bytes.len() {
                    // Unterminated comment swallows the rest
                    return true;
                }
                if bytes[end] == b'*' && bytes.get(end + 1) == Some(&b'/') {
                    pos = end + 2;
                    break;
                }
                end += 1;
            }
            continue;
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(input: &str) -> Vec<&str> {
        StatementSplitter::new(input).collect()
    }

    #[test]
    fn test_simple_statements() {
        let stmts = split("SELECT 1;\nSELECT 2;\n");
        assert_eq!(stmts, vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split("").is_empty());
        assert!(split("   \n\t  ").is_empty());
    }

    #[test]
    fn test_terminator_inside_single_quotes() {
        let stmts = split("INSERT INTO t VALUES ('a;b');SELECT 1;");
        assert_eq!(stmts, vec!["INSERT INTO t VALUES ('a;b')", "SELECT 1"]);
    }

    #[test]
    fn test_terminator_inside_double_quotes_and_backticks() {
        let stmts = split("SELECT \"x;y\" FROM `odd;name`;");
        assert_eq!(stmts, vec!["SELECT \"x;y\" FROM `odd;name`"]);
    }

    #[test]
    fn test_doubled_quote_escape() {
        let stmts = split("INSERT INTO t VALUES ('it''s;fine');");
        assert_eq!(stmts, vec!["INSERT INTO t VALUES ('it''s;fine')"]);
    }

    #[test]
    fn test_backslash_escape() {
        let stmts = split(r"INSERT INTO t VALUES ('it\'s;fine');");
        assert_eq!(stmts, vec![r"INSERT INTO t VALUES ('it\'s;fine')"]);
    }

    #[test]
    fn test_backslash_not_special_in_backticks() {
        // A backslash inside a backtick identifier is literal
        let stmts = split(r"SELECT 1 FROM `a\`;");
        assert_eq!(stmts, vec![r"SELECT 1 FROM `a\`"]);
    }

    #[test]
    fn test_line_comments_do_not_split() {
        let stmts = split("SELECT 1 -- trailing; comment\n;\nSELECT 2 # another; one\n;");
        assert_eq!(
            stmts,
            vec!["SELECT 1 -- trailing; comment", "SELECT 2 # another; one"]
        );
    }

    #[test]
    fn test_double_dash_without_space_is_not_comment() {
        // MySQL requires whitespace after --, so a-- b is an expression
        let stmts = split("SELECT a--b FROM t;");
        assert_eq!(stmts, vec!["SELECT a--b FROM t"]);
    }

    #[test]
    fn test_block_comment_does_not_split() {
        let stmts = split("SELECT /* a;b */ 1;");
        assert_eq!(stmts, vec!["SELECT /* a;b */ 1"]);
    }

    #[test]
    fn test_conditional_comment_statement() {
        let stmts = split("/*!40101 SET NAMES utf8 */;\nSELECT 1;");
        assert_eq!(stmts, vec!["/*!40101 SET NAMES utf8 */", "SELECT 1"]);
        assert!(!is_effectively_empty(stmts[0]));
    }

    #[test]
    fn test_delimiter_directive() {
        let input = "\
SELECT 1;
DELIMITER //
CREATE PROCEDURE p()
BEGIN
  SELECT 1;
  SELECT 2;
END//
DELIMITER ;
SELECT 3;
";
        let stmts = split(input);
        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[0], "SELECT 1");
        assert!(stmts[1].starts_with("CREATE PROCEDURE"));
        assert!(stmts[1].contains("SELECT 2;"));
        assert!(stmts[1].ends_with("END"));
        assert_eq!(stmts[2], "SELECT 3");
    }

    #[test]
    fn test_delimiter_case_insensitive() {
        let stmts = split("delimiter $$\nSELECT 1$$");
        assert_eq!(stmts, vec!["SELECT 1"]);
    }

    #[test]
    fn test_delimiter_directive_after_leading_comment() {
        // The comment lines ride with the directive, not the next statement
        let stmts = split("SELECT 1;\n-- switch\nDELIMITER //\nSELECT 2//\n");
        assert_eq!(stmts, vec!["SELECT 1", "SELECT 2"]);

        let stmts = split("# switch\ndelimiter //\nSELECT 1//");
        assert_eq!(stmts, vec!["SELECT 1"]);
    }

    #[test]
    fn test_delimiter_directive_after_block_comment() {
        let stmts = split("/* routines follow */ DELIMITER //\nSELECT 2//");
        assert_eq!(stmts, vec!["SELECT 2"]);
    }

    #[test]
    fn test_conditional_comment_blocks_directive_recognition() {
        // /*! comments are executable, so DELIMITER after one is plain text
        let stmts = split("/*!40000 note */ DELIMITER x;");
        assert_eq!(stmts, vec!["/*!40000 note */ DELIMITER x"]);
    }

    #[test]
    fn test_bare_delimiter_word_is_sql() {
        // No trailing token, so this is statement text
        let stmts = split("SELECT 'DELIMITER';");
        assert_eq!(stmts, vec!["SELECT 'DELIMITER'"]);
    }

    #[test]
    fn test_trailing_statement_without_terminator() {
        let stmts = split("SELECT 1;\nSELECT 2");
        assert_eq!(stmts, vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_empty_statements_skipped() {
        let stmts = split(";;;SELECT 1;;");
        assert_eq!(stmts, vec!["SELECT 1"]);
    }

    #[test]
    fn test_crlf_input() {
        let stmts = split("SELECT 1;\r\nSELECT 2;\r\n");
        assert_eq!(stmts, vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let stmts = split("SELECT 'unterminated; SELECT 2;");
        assert_eq!(stmts, vec!["SELECT 'unterminated; SELECT 2;"]);
    }

    #[test]
    fn test_mysqldump_header_kept_with_statement() {
        let input = "\
-- MySQL dump 10.13
-- Host: localhost
CREATE TABLE t (id INT);
";
        let stmts = split(input);
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].starts_with("-- MySQL dump"));
        assert!(stmts[0].ends_with("CREATE TABLE t (id INT)"));
        assert!(!is_effectively_empty(stmts[0]));
    }

    #[test]
    fn test_is_effectively_empty() {
        assert!(is_effectively_empty(""));
        assert!(is_effectively_empty("   \n\t"));
        assert!(is_effectively_empty("-- just a comment"));
        assert!(is_effectively_empty("# hash comment\n-- and another"));
        assert!(is_effectively_empty("/* block */"));
        assert!(is_effectively_empty("/* unterminated"));
        assert!(!is_effectively_empty("SELECT 1"));
        assert!(!is_effectively_empty("/* note */ SELECT 1"));
        assert!(!is_effectively_empty("/*!40000 ALTER TABLE t DISABLE KEYS */"));
    }

    #[test]
    fn test_multibyte_content() {
        let stmts = split("INSERT INTO t VALUES ('héllo; wörld');SELECT 'ok';");
        assert_eq!(
            stmts,
            vec!["INSERT INTO t VALUES ('héllo; wörld')", "SELECT 'ok'"]
        );
    }
}
