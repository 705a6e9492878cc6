//! Strips constructs that have no counterpart in the generated component:
//! XML declarations and processing instructions, DOCTYPE, comments, and whole
//! `<style>`/`<script>` blocks. Editor metadata (`<title>`, `<desc>`,
//! `<metadata>`) has no react-native-svg component and goes the same way.
//!
//! The scan steps over complete tags (quoted attribute values included) and
//! CDATA sections and copies them through untouched, so text inside attribute
//! values that merely looks like a comment or a declaration stays intact.
//!
//! Every terminator is searched forward from the construct that needs it.
//! A terminator that is missing once is remembered as missing for the rest of
//! the input, which keeps the scan linear on unterminated constructs.

use regex::Regex;
use std::sync::OnceLock;

/// Elements removed together with their content.
const DROPPED_BLOCKS: &[&str] = &["style", "script", "title", "desc", "metadata"];

fn tag_open() -> &'static Regex {
    static TAG_OPEN_REGEX: OnceLock<Regex> = OnceLock::new();
    TAG_OPEN_REGEX.get_or_init(|| Regex::new(r"^</?[A-Za-z_][^\s/>]*").unwrap())
}

fn block_close(name: &str) -> Option<&'static Regex> {
    static BLOCK_CLOSE_REGEX: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    BLOCK_CLOSE_REGEX
        .get_or_init(|| {
            DROPPED_BLOCKS
                .iter()
                .map(|b| (*b, Regex::new(&format!(r"(?i)</{}\s*>", b)).unwrap()))
                .collect()
        })
        .iter()
        .find(|(b, _)| *b == name)
        .map(|(_, re)| re)
}

/// What the construct starting at a `<` turned out to be.
enum Step {
    /// Remove up to the given byte offset.
    Drop(usize),
    /// Copy through up to the given byte offset.
    Keep(usize),
    /// Not a recognized construct; the `<` is plain text.
    Text,
    /// Unterminated tag: nothing after it can be a well-formed construct.
    Stop,
}

struct Scanner<'a> {
    raw: &'a str,
    /// Terminators already known to be absent past the current position.
    missing: Vec<&'static str>,
}

impl<'a> Scanner<'a> {
    fn step(&mut self, start: usize) -> Step {
        let raw = self.raw;
        let rest = &raw[start..];
        if rest.starts_with("<!--") {
            return self.until(start + 4, "-->", Step::Drop);
        }
        if rest.starts_with("<![CDATA[") {
            return self.until(start + 9, "]]>", Step::Keep);
        }
        if rest.starts_with("<?") {
            return self.until(start + 2, "?>", Step::Drop);
        }
        if rest
            .as_bytes()
            .get(..9)
            .is_some_and(|b| b.eq_ignore_ascii_case(b"<!DOCTYPE"))
        {
            return self.doctype(start + 9);
        }
        let Some(open) = tag_open().find(rest) else {
            return Step::Text;
        };
        let Some(end) = self.tag_end(start + open.end()) else {
            return Step::Stop;
        };
        let name = open.as_str()[1..].to_ascii_lowercase();
        match DROPPED_BLOCKS.iter().find(|b| **b == name) {
            Some(&block) => self.block(block, start, end),
            None => Step::Keep(end),
        }
    }

    /// Find `terminator` at or after `from`.
    fn until(&mut self, from: usize, terminator: &'static str, found: fn(usize) -> Step) -> Step {
        if self.missing.contains(&terminator) {
            return Step::Text;
        }
        match self.raw[from..].find(terminator) {
            Some(i) => found(from + i + terminator.len()),
            None => {
                self.missing.push(terminator);
                Step::Text
            }
        }
    }

    /// `>` outside an internal subset `[ ... ]` ends the declaration.
    fn doctype(&mut self, from: usize) -> Step {
        if self.missing.contains(&"<!DOCTYPE") {
            return Step::Text;
        }
        let mut in_subset = false;
        for (i, b) in self.raw.as_bytes()[from..].iter().enumerate() {
            match b {
                b'[' => in_subset = true,
                b']' => in_subset = false,
                b'>' if !in_subset => return Step::Drop(from + i + 1),
                _ => {}
            }
        }
        self.missing.push("<!DOCTYPE");
        Step::Text
    }

    /// Offset just past the `>` closing a tag, skipping quoted values.
    fn tag_end(&self, from: usize) -> Option<usize> {
        let bytes = self.raw.as_bytes();
        let mut i = from;
        while i < bytes.len() {
            match bytes[i] {
                q @ (b'"' | b'\'') => {
                    let close = bytes[i + 1..].iter().position(|b| *b == q)?;
                    i += close + 2;
                }
                b'>' => return Some(i + 1),
                _ => i += 1,
            }
        }
        None
    }

    /// Self-closing blocks go on their own; paired ones take everything up to
    /// the matching close tag. Without one the opening tag is kept as is.
    fn block(&mut self, name: &'static str, start: usize, open_end: usize) -> Step {
        if self.raw[start..open_end].ends_with("/>") {
            return Step::Drop(open_end);
        }
        if self.missing.contains(&name) {
            return Step::Keep(open_end);
        }
        match block_close(name).and_then(|re| re.find_at(self.raw, open_end)) {
            Some(m) => Step::Drop(m.end()),
            None => {
                self.missing.push(name);
                Step::Keep(open_end)
            }
        }
    }
}

/// Remove non-portable constructs from raw markup. Never fails; input without
/// any of them comes back unchanged.
pub fn sanitize(raw: &str) -> String {
    let mut scanner = Scanner {
        raw,
        missing: Vec::new(),
    };
    let mut out = String::with_capacity(raw.len());
    let mut copied = 0;
    let mut pos = 0;
    let mut removed = 0usize;

    while let Some(offset) = raw[pos..].find('<') {
        let start = pos + offset;
        match scanner.step(start) {
            Step::Drop(end) => {
                out.push_str(&raw[copied..start]);
                copied = end;
                pos = end;
                removed += 1;
            }
            Step::Keep(end) => pos = end,
            Step::Text => pos = start + 1,
            Step::Stop => break,
        }
    }
    out.push_str(&raw[copied..]);

    tracing::trace!(removed, input_len = raw.len(), "sanitized markup");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_no_op_without_constructs() {
        let svg = r#"<svg viewBox="0 0 10 10"><path d="M0 0"/></svg>"#;
        assert_eq!(sanitize(svg), svg);
    }

    #[test]
    fn test_strips_declaration_doctype_and_comments() {
        let raw = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<!-- Generator: Sketch -->
<svg><!-- inner --><path d="M0 0"/></svg>"#;
        let out = sanitize(raw);
        assert_eq!(out.trim(), r#"<svg><path d="M0 0"/></svg>"#);
    }

    #[test]
    fn test_strips_doctype_with_internal_subset() {
        let raw = r#"<!DOCTYPE svg [ <!ENTITY ns "http://x"> ]><svg/>"#;
        assert_eq!(sanitize(raw), "<svg/>");
    }

    #[test]
    fn test_strips_style_and_script_blocks() {
        let raw = r#"<svg><style type="text/css">.a{fill:red}</style><script>alert("<svg>")</script><style/><path class="a"/></svg>"#;
        assert_eq!(sanitize(raw), r#"<svg><path class="a"/></svg>"#);
    }

    #[test]
    fn test_strips_metadata_blocks() {
        let raw = "<svg><title>icon/home</title><desc>Created with Sketch.</desc><metadata><rdf:RDF/></metadata><text>t</text></svg>";
        assert_eq!(sanitize(raw), "<svg><text>t</text></svg>");
    }

    #[test]
    fn test_keeps_attribute_values_that_look_like_comments() {
        let raw = r#"<svg><text data-note="<!-- keep -->" title='<?pi?>'>a</text></svg>"#;
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn test_keeps_cdata_contents() {
        let raw = "<svg><text><![CDATA[<!-- not a comment -->]]></text></svg>";
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn test_multiline_comment() {
        let raw = "<svg>\n<!--\n  multi\n  line\n-->\n</svg>";
        assert_eq!(sanitize(raw), "<svg>\n\n</svg>");
    }

    #[test]
    fn test_unclosed_block_keeps_opening_tag() {
        let raw = "<svg><style>.a{}<path/></svg>";
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn test_uppercase_block_names() {
        assert_eq!(sanitize("<svg><STYLE>a</Style ></svg>"), "<svg></svg>");
    }

    #[test]
    fn test_unterminated_constructs_scan_linearly() {
        for unit in ["<style>x", "<script>x", "<title>x", "<!--<a>", "<?<a>", "<![CDATA[<a>"] {
            let raw = unit.repeat(50_000);
            let started = Instant::now();
            assert_eq!(sanitize(&raw), raw);
            assert!(
                started.elapsed() < Duration::from_secs(2),
                "{:?} took {:?}",
                unit,
                started.elapsed()
            );
        }
    }
}
