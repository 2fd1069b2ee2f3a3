//! Text Sanitizer: makes arbitrary user text safe for LaTeX text mode.
//!
//! Three stages, in order:
//! 1. Normalize mis-encoded forward slashes (`%2F`, `&#x2F;`, `\u002F`, ...) to `/`.
//! 2. Decode the small fixed set of HTML entities browsers and editors leak into form data.
//! 3. Escape LaTeX reserved characters in a single pass.
//!
//! Escaping is one pass over the characters, so the sequences it introduces
//! (`\textbackslash{}` and friends) are never themselves re-escaped.

/// Slash variants seen in pasted URLs and double-encoded form posts.
const SLASH_VARIANTS: &[&str] = &[
    "%2F", "%2f", "&#x2F;", "&#x2f;", "&#X2F;", "&#47;", "&#047;", "\\u002F", "\\u002f", "&sol;",
];

/// `&amp;` is decoded last so `&amp;lt;` becomes `&lt;`, not `<`.
const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Sanitizes a string for embedding in a LaTeX document body.
pub fn sanitize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let normalized = decode_entities(&normalize_slashes(raw));
    escape_latex(&normalized)
}

/// Absent values sanitize to the empty string, never to a placeholder.
pub fn sanitize_opt(raw: Option<&str>) -> String {
    raw.map(sanitize).unwrap_or_default()
}

fn normalize_slashes(raw: &str) -> String {
    SLASH_VARIANTS
        .iter()
        .fold(raw.to_string(), |acc, variant| acc.replace(variant, "/"))
}

fn decode_entities(raw: &str) -> String {
    HTML_ENTITIES
        .iter()
        .fold(raw.to_string(), |acc, (entity, literal)| {
            acc.replace(entity, literal)
        })
}

/// Maps every LaTeX reserved character to its text-mode equivalent.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' => out.push_str("\\&"),
            '%' => out.push_str("\\%"),
            '$' => out.push_str("\\$"),
            '#' => out.push_str("\\#"),
            '_' => out.push_str("\\_"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RESERVED: &[char] = &['\\', '&', '%', '$', '#', '_', '{', '}', '~', '^'];

    /// Walks LaTeX output and reports any reserved character that is not part
    /// of an escape sequence produced by `escape_latex`.
    fn has_unescaped_reserved(out: &str) -> bool {
        let mut rest = out;
        while let Some(c) = rest.chars().next() {
            if c == '\\' {
                let tail = &rest[1..];
                if let Some(t) = tail.strip_prefix("textbackslash{}") {
                    rest = t;
                } else if let Some(t) = tail.strip_prefix("textasciitilde{}") {
                    rest = t;
                } else if let Some(t) = tail.strip_prefix("textasciicircum{}") {
                    rest = t;
                } else if let Some(n) = tail.chars().next().filter(|n| "&%$#_{}".contains(*n)) {
                    rest = &tail[n.len_utf8()..];
                } else {
                    return true;
                }
                continue;
            }
            if RESERVED.contains(&c) {
                return true;
            }
            rest = &rest[c.len_utf8()..];
        }
        false
    }

    #[test]
    fn test_safe_input_is_unchanged() {
        for s in [
            "",
            "Jane Doe",
            "Senior Engineer, Platform (2019-2023)",
            "path/to/file",
            "Zürich · naïve café",
            "C++ and Rust <3",
        ] {
            assert_eq!(sanitize(s), s, "safe input must pass through: {s:?}");
        }
    }

    #[test]
    fn test_each_reserved_character_is_escaped() {
        assert_eq!(sanitize("\\"), "\\textbackslash{}");
        assert_eq!(sanitize("R&D"), "R\\&D");
        assert_eq!(sanitize("50%"), "50\\%");
        assert_eq!(sanitize("$100"), "\\$100");
        assert_eq!(sanitize("C#"), "C\\#");
        assert_eq!(sanitize("snake_case"), "snake\\_case");
        assert_eq!(sanitize("{x}"), "\\{x\\}");
        assert_eq!(sanitize("~home"), "\\textasciitilde{}home");
        assert_eq!(sanitize("x^2"), "x\\textasciicircum{}2");
    }

    #[test]
    fn test_backslash_escape_is_not_reescaped() {
        // Braces introduced by \textbackslash{} must stay literal braces.
        assert_eq!(sanitize("a\\b"), "a\\textbackslash{}b");
        assert_eq!(sanitize("\\{"), "\\textbackslash{}\\{");
    }

    #[test]
    fn test_no_unescaped_reserved_characters_survive() {
        let inputs = [
            "\\ & % $ # _ { } ~ ^",
            "\\\\\\",
            "}}{{",
            "100% of $5 #1 on_call ~ ^^",
            "\\input{/etc/passwd}",
            "\\write18{rm -rf ~}",
            "&amp;&lt;&gt;",
            "%2F\\u002F&#x2F;",
        ];
        for input in inputs {
            let out = sanitize(input);
            assert!(
                !has_unescaped_reserved(&out),
                "unescaped reserved character in {out:?} (from {input:?})"
            );
        }
    }

    #[test]
    fn test_slash_encodings_normalize_to_same_output() {
        let expected = sanitize("path/to/file");
        assert_eq!(sanitize("path%2Fto%2Ffile"), expected);
        assert_eq!(sanitize("path&#x2F;to&#x2F;file"), expected);
        assert_eq!(sanitize("path%2fto&#47;file"), expected);
        assert_eq!(sanitize("path\\u002Fto\\u002ffile"), expected);
        assert_eq!(expected, "path/to/file");
    }

    #[test]
    fn test_html_entities_decode_then_escape() {
        assert_eq!(sanitize("Tom &amp; Jerry"), "Tom \\& Jerry");
        assert_eq!(sanitize("&lt;b&gt;"), "<b>");
        assert_eq!(sanitize("&quot;quoted&quot; &apos;x&apos;"), "\"quoted\" 'x'");
    }

    #[test]
    fn test_double_encoded_amp_decodes_once() {
        assert_eq!(sanitize("&amp;lt;"), "\\&lt;");
    }

    #[test]
    fn test_url_with_encoded_slashes() {
        assert_eq!(
            sanitize("https:%2F%2Fgithub.com%2Fjane_doe"),
            "https://github.com/jane\\_doe"
        );
    }

    #[test]
    fn test_sanitize_opt_absent_is_empty() {
        assert_eq!(sanitize_opt(None), "");
        assert_eq!(sanitize_opt(Some("a_b")), "a\\_b");
    }

    fn gen_safe_text() -> BoxedStrategy<String> {
        r"[^\\&%$#_{}~^]{0,64}".boxed()
    }

    fn gen_path_segments() -> BoxedStrategy<Vec<String>> {
        prop::collection::vec("[a-zA-Z0-9._~-]{0,12}", 1..6).boxed()
    }

    proptest! {
        #[test]
        fn test_text_without_reserved_characters_is_identity(text in gen_safe_text()) {
            prop_assert_eq!(sanitize(&text), text);
        }

        #[test]
        fn test_arbitrary_text_never_leaves_reserved_unescaped(text in any::<String>()) {
            let out = sanitize(&text);
            prop_assert!(!has_unescaped_reserved(&out), "{:?} -> {:?}", text, out);
        }

        #[test]
        fn test_any_slash_encoding_matches_plain_slash(segments in gen_path_segments()) {
            let expected = sanitize(&segments.join("/"));
            for variant in SLASH_VARIANTS {
                prop_assert_eq!(sanitize(&segments.join(variant)), expected.clone());
            }
        }
    }
}
