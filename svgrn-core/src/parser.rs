use roxmltree::Node;

use crate::error::{ConvertError, ConvertResult};
use crate::tree::{AttrValue, Attributes, Child, MarkupNode, TextRun};

/// Synthetic root tag wrapped around the input, so fragments and bare text
/// report a missing `<svg>` instead of an XML syntax error.
const WRAPPER: &str = "__svgrn_root__";

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

const MAX_NESTING_DEPTH: usize = 256;

/// Elements whose character data is kept as text runs.
const TEXT_BEARING: &[&str] = &["text", "tspan", "textpath"];

/// The wrapper sits on its own line so columns stay untouched and rows shift
/// by exactly one.
fn wrap(markup: &str) -> String {
    format!("<{0}>\n{1}\n</{0}>", WRAPPER, markup)
}

fn parsing_options() -> roxmltree::ParsingOptions {
    let mut opt = roxmltree::ParsingOptions::default();
    opt.allow_dtd = true;
    opt
}

/// Parse sanitized markup into a tree rooted at the single top-level `<svg>`.
pub fn parse(sanitized: &str) -> ConvertResult<MarkupNode> {
    let wrapped = wrap(sanitized);
    let doc = roxmltree::Document::parse_with_options(&wrapped, parsing_options())
        .map_err(|e| unwrap_position(ConvertError::from(e)))?;

    let top: Vec<_> = element_children(doc.root_element()).collect();
    let root = match top.as_slice() {
        [] => return Err(ConvertError::MissingRoot),
        [only] if is_svg(*only) => *only,
        [_] => return Err(ConvertError::MissingRoot),
        many if many.iter().any(|n| is_svg(*n)) => {
            return Err(ConvertError::MultipleRoots { count: many.len() })
        }
        _ => return Err(ConvertError::MissingRoot),
    };

    let tree = build_node(root, &wrapped, 0)?;
    tracing::debug!(elements = tree.element_count(), "parsed svg tree");
    Ok(tree)
}

/// Map a position inside the wrapped document back onto the caller's input.
fn unwrap_position(err: ConvertError) -> ConvertError {
    match err {
        ConvertError::Parse {
            line,
            column,
            message,
        } => ConvertError::Parse {
            line: line.saturating_sub(1).max(1),
            column,
            message,
        },
        other => other,
    }
}

fn is_svg(node: Node) -> bool {
    let name = node.tag_name();
    name.name().eq_ignore_ascii_case("svg")
        && matches!(name.namespace(), None | Some(SVG_NS))
}

/// Iterator over element children (skips text, comments and processing
/// instructions).
fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

fn build_node(node: Node, source: &str, depth: usize) -> ConvertResult<MarkupNode> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(ConvertError::MaxNestingDepthExceeded {
            max_depth: MAX_NESTING_DEPTH,
        });
    }

    let tag = qualified_name(node, node.tag_name().name(), node.tag_name().namespace());
    let text_bearing = TEXT_BEARING
        .iter()
        .any(|t| t.eq_ignore_ascii_case(node.tag_name().name()));

    let attributes: Attributes = node
        .attributes()
        .map(|attr| {
            (
                qualified_name(node, attr.name(), attr.namespace()),
                AttrValue::literal(attr.value()),
            )
        })
        .collect();

    let mut children = Vec::new();
    for child in node.children() {
        if child.is_element() {
            children.push(Child::Element(build_node(child, source, depth + 1)?));
        } else if child.is_text() && text_bearing {
            // Whitespace-only runs are dropped regardless of `xml:space`.
            if let Some(text) = child.text().filter(|t| !t.trim().is_empty()) {
                children.push(Child::Text(TextRun {
                    text: text.to_string(),
                }));
            }
        }
    }

    let self_closing = source
        .get(node.range())
        .is_some_and(|s| s.ends_with("/>"));

    Ok(MarkupNode {
        tag,
        attributes,
        children,
        self_closing,
    })
}

/// Restore the `prefix:` of a namespaced name so the normalizer can decide
/// what to keep. Names in the SVG namespace or without one stay bare.
fn qualified_name(node: Node, local: &str, namespace: Option<&str>) -> String {
    let Some(uri) = namespace.filter(|uri| *uri != SVG_NS) else {
        return local.to_string();
    };
    let prefix = node.lookup_prefix(uri).or(match uri {
        XLINK_NS => Some("xlink"),
        XML_NS => Some("xml"),
        _ => None,
    });
    match prefix {
        Some(p) if !p.is_empty() => format!("{}:{}", p, local),
        _ => local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_svg() {
        let tree = parse(r#"<svg viewBox="0 0 10 10"><path d="M0 0"/></svg>"#).unwrap();
        assert_eq!(tree.tag, "svg");
        assert_eq!(tree.attributes.get_literal("viewBox"), Some("0 0 10 10"));
        let path = tree.elements().next().unwrap();
        assert_eq!(path.tag, "path");
        assert!(path.self_closing);
    }

    #[test]
    fn test_paired_empty_tag_is_not_self_closing() {
        let tree = parse("<svg><rect></rect></svg>").unwrap();
        let rect = tree.elements().next().unwrap();
        assert!(!rect.self_closing);
        assert!(rect.children.is_empty());
    }

    #[test]
    fn test_single_quoted_attributes() {
        let tree = parse("<svg><circle r='4' cx='2'/></svg>").unwrap();
        let circle = tree.elements().next().unwrap();
        let keys: Vec<_> = circle.attributes.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["r", "cx"]);
    }

    #[test]
    fn test_missing_root() {
        let result = parse(r#"<g><path d="M0 0"/></g>"#);
        assert!(matches!(result, Err(ConvertError::MissingRoot)));
    }

    #[test]
    fn test_plain_text_is_missing_root() {
        assert!(matches!(parse("hello world"), Err(ConvertError::MissingRoot)));
        assert!(matches!(parse(""), Err(ConvertError::MissingRoot)));
    }

    #[test]
    fn test_multiple_roots() {
        let result = parse("<svg/><svg/>");
        assert!(matches!(result, Err(ConvertError::MultipleRoots { count: 2 })));
    }

    #[test]
    fn test_mismatched_close_tag() {
        let result = parse("<svg><g></svg>");
        assert!(matches!(result, Err(ConvertError::Parse { .. })), "{:?}", result);
    }

    #[test]
    fn test_unterminated_element() {
        let result = parse("<svg><path d=\"M0 0\"");
        assert!(matches!(result, Err(ConvertError::Parse { .. })));
    }

    #[test]
    fn test_error_line_refers_to_input() {
        let result = parse("<svg>\n  <g>\n</svg>");
        match result {
            Err(ConvertError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_text_only_kept_in_text_elements() {
        let tree = parse("<svg><text>Hello <tspan>world</tspan></text><g>stray</g></svg>").unwrap();
        let mut elements = tree.elements();
        let text = elements.next().unwrap();
        assert_eq!(text.children.len(), 2);
        assert!(matches!(&text.children[0], Child::Text(t) if t.text == "Hello "));
        let g = elements.next().unwrap();
        assert!(g.children.is_empty());
    }

    #[test]
    fn test_namespaced_attributes_keep_prefix() {
        let xml = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#a"/></svg>"##;
        let tree = parse(xml).unwrap();
        assert!(tree.attributes.is_empty());
        let use_node = tree.elements().next().unwrap();
        assert_eq!(use_node.attributes.get_literal("xlink:href"), Some("#a"));
    }

    #[test]
    fn test_entities_are_decoded() {
        let tree = parse(r#"<svg><text>a &amp; b</text></svg>"#).unwrap();
        let text = tree.elements().next().unwrap();
        assert!(matches!(&text.children[0], Child::Text(t) if t.text == "a & b"));
    }

    #[test]
    fn test_nesting_limit() {
        let depth = MAX_NESTING_DEPTH + 1;
        let xml = format!("<svg>{}{}</svg>", "<g>".repeat(depth), "</g>".repeat(depth));
        assert!(matches!(
            parse(&xml),
            Err(ConvertError::MaxNestingDepthExceeded { .. })
        ));
    }

    #[test]
    fn test_whitespace_only_text_dropped_even_when_preserved() {
        let tree = parse(r#"<svg><text xml:space="preserve">  <tspan>a</tspan>  </text></svg>"#).unwrap();
        let text = tree.elements().next().unwrap();
        assert_eq!(text.children.len(), 1);
        assert!(matches!(&text.children[0], Child::Element(e) if e.tag == "tspan"));
    }
}
