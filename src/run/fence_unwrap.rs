use fancy_regex::Regex;
use std::sync::OnceLock;

fn markdown_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A\s*```(?:markdown|md)[ \t]*\r?\n(.*?)\r?\n[ \t]*```\s*\z").expect("internal error")
    })
}

/// If the whole text is a single ```` ```markdown ```` or ```` ```md ```` fenced block, returns the fence's contents.
/// Otherwise, returns the text as-is.
pub(crate) fn unwrap_markdown_fence(text: &str) -> &str {
    match markdown_fence().captures(text) {
        Ok(Some(captures)) => match captures.get(1) {
            Some(body) => {
                log::debug!("removed a wrapping markdown fence");
                body.as_str()
            }
            None => text,
        },
        Ok(None) => text,
        Err(err) => {
            log::warn!("couldn't check for a wrapping markdown fence: {err}");
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn unwraps_markdown_fence() {
        let text = indoc! {r"
            ```markdown
            # Title

            Body
            ```
            "};
        assert_eq!(unwrap_markdown_fence(text), "# Title\n\nBody");
    }

    #[test]
    fn unwraps_md_fence_with_surrounding_whitespace() {
        assert_eq!(unwrap_markdown_fence("\n  ```md\r\nhello\r\n```  \n\n"), "hello");
    }

    #[test]
    fn keeps_inner_fences() {
        let text = indoc! {r"
            ```md
            Some code:

            ```rust
            fn main() {}
            ```
            ```
            "};
        assert_eq!(
            unwrap_markdown_fence(text),
            "Some code:\n\n```rust\nfn main() {}\n```"
        );
    }

    #[test]
    fn other_languages_are_left_alone() {
        let text = "```rust\nfn main() {}\n```\n";
        assert_eq!(unwrap_markdown_fence(text), text);
    }

    #[test]
    fn text_after_the_fence_is_left_alone() {
        let text = "```md\nhello\n```\n\nMore text.\n";
        assert_eq!(unwrap_markdown_fence(text), text);
    }

    #[test]
    fn plain_markdown_is_left_alone() {
        let text = "# Title\n\n```md\nexample\n```\n";
        assert_eq!(unwrap_markdown_fence(text), text);
    }
}
