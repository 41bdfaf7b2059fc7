use memchr::memchr;

/// Iterates over lines, keeping each line's terminator (`\n` or `\r\n`) attached.
///
/// Concatenating everything this yields reproduces the input exactly, so byte offsets can be tallied by summing line
/// lengths.
pub(crate) fn split_lines_inclusive(text: &str) -> LinesInclusive<'_> {
    LinesInclusive { remaining: text }
}

pub(crate) struct LinesInclusive<'a> {
    remaining: &'a str,
}

impl<'a> Iterator for LinesInclusive<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        let end = match memchr(b'\n', self.remaining.as_bytes()) {
            Some(newline) => newline + 1,
            None => self.remaining.len(),
        };
        let (line, rest) = self.remaining.split_at(end);
        self.remaining = rest;
        Some(line)
    }
}

/// The line's text without its terminator.
pub(crate) fn strip_newline(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

pub(crate) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Leading indentation in columns; a tab advances to the next multiple of 4.
pub(crate) fn leading_indent(line: &str) -> usize {
    let mut columns = 0;
    for ch in line.chars() {
        match ch {
            ' ' => columns += 1,
            '\t' => columns += 4 - (columns % 4),
            _ => break,
        }
    }
    columns
}

/// Removes up to `max_columns` of leading indentation.
pub(crate) fn dedent(line: &str, max_columns: usize) -> &str {
    let mut columns = 0;
    for (idx, ch) in line.char_indices() {
        let next = match ch {
            ' ' => columns + 1,
            '\t' => columns + 4 - (columns % 4),
            _ => return &line[idx..],
        };
        if next > max_columns {
            return &line[idx..];
        }
        columns = next;
    }
    ""
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_keep_terminators() {
        let lines: Vec<_> = split_lines_inclusive("one\ntwo\r\nthree").collect();
        assert_eq!(lines, ["one\n", "two\r\n", "three"]);
    }

    #[test]
    fn lines_of_empty_text() {
        assert_eq!(split_lines_inclusive("").count(), 0);
    }

    #[test]
    fn lines_trailing_newline() {
        let lines: Vec<_> = split_lines_inclusive("one\n\n").collect();
        assert_eq!(lines, ["one\n", "\n"]);
    }

    #[test]
    fn newline_stripping() {
        assert_eq!(strip_newline("abc\r\n"), "abc");
        assert_eq!(strip_newline("abc"), "abc");
    }

    #[test]
    fn indents() {
        assert_eq!(leading_indent("abc"), 0);
        assert_eq!(leading_indent("  abc"), 2);
        assert_eq!(leading_indent("\tabc"), 4);
        assert_eq!(leading_indent("  \tabc"), 4);
        assert_eq!(leading_indent("     "), 5);
    }

    #[test]
    fn dedents() {
        assert_eq!(dedent("      abc", 4), "  abc");
        assert_eq!(dedent("  abc", 4), "abc");
        assert_eq!(dedent("\tabc", 4), "abc");
        assert_eq!(dedent("  \tabc", 2), "\tabc");
        assert_eq!(dedent("   ", 4), "");
    }
}
