use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Fallback for a missing `width` or `height` on the root `<svg>`.
pub const DEFAULT_DIMENSION: &str = "100";

/// Value of a single attribute.
///
/// Parsing only produces literals; the templater swaps some of them for
/// expressions that reference component props.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum AttrValue {
    Literal(String),
    Expr(String),
}

impl AttrValue {
    pub fn literal(value: impl Into<String>) -> Self {
        AttrValue::Literal(value.into())
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            AttrValue::Literal(s) => Some(s),
            AttrValue::Expr(_) => None,
        }
    }
}

/// Ordered attribute map. Keys are unique, insertion order is kept so output is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attributes(Vec<(String, AttrValue)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn get_literal(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_literal)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set `name`, replacing an existing value in place or appending.
    pub fn insert(&mut self, name: impl Into<String>, value: AttrValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        let idx = self.0.iter().position(|(k, _)| k == name)?;
        Some(self.0.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, AttrValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

/// Character data kept inside text-bearing elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Child {
    Element(MarkupNode),
    Text(TextRun),
}

/// One element of the markup tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkupNode {
    /// Element name. As written in the source after parsing, the component
    /// name after normalization.
    pub tag: String,
    pub attributes: Attributes,
    pub children: Vec<Child>,
    /// Whether the source used `<tag />`. Informational only; rendering
    /// collapses every childless element.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub self_closing: bool,
}

impl MarkupNode {
    pub fn new(tag: impl Into<String>) -> Self {
        MarkupNode {
            tag: tag.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name, AttrValue::literal(value));
        self
    }

    pub fn with_child(mut self, child: MarkupNode) -> Self {
        self.children.push(Child::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Child::Text(TextRun {
            text: text.to_string(),
        }));
        self
    }

    /// Iterator over element children (skips text runs).
    pub fn elements(&self) -> impl Iterator<Item = &MarkupNode> {
        self.children.iter().filter_map(|c| match c {
            Child::Element(e) => Some(e),
            Child::Text(_) => None,
        })
    }

    /// Visit this node and all descendants depth-first, parents before children.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a MarkupNode)) {
        f(self);
        for child in self.elements() {
            child.walk(f);
        }
    }

    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut MarkupNode)) {
        f(self);
        for child in self.children.iter_mut() {
            if let Child::Element(e) = child {
                e.walk_mut(f);
            }
        }
    }

    /// Total number of elements in the subtree, including `self`.
    pub fn element_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}

/// Sizing metadata pulled off the root `<svg>` by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizingInfo {
    pub width: Option<String>,
    pub height: Option<String>,
    pub view_box: String,
}

impl SizingInfo {
    /// An explicit `viewBox` always wins, even when width/height were defaulted.
    pub fn resolve(width: Option<String>, height: Option<String>, view_box: Option<String>) -> Self {
        let view_box = view_box.unwrap_or_else(|| {
            format!(
                "0 0 {} {}",
                width.as_deref().unwrap_or(DEFAULT_DIMENSION),
                height.as_deref().unwrap_or(DEFAULT_DIMENSION)
            )
        });
        SizingInfo {
            width,
            height,
            view_box,
        }
    }

    pub fn width_or_default(&self) -> &str {
        self.width.as_deref().unwrap_or(DEFAULT_DIMENSION)
    }

    pub fn height_or_default(&self) -> &str {
        self.height.as_deref().unwrap_or(DEFAULT_DIMENSION)
    }

    /// Width and height of the `viewBox`, when it holds four numbers.
    pub fn view_box_size(&self) -> Option<(f64, f64)> {
        let parts: Vec<f64> = self
            .view_box
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;
        match parts.as_slice() {
            [_, _, w, h] if *w > 0.0 && *h > 0.0 => Some((*w, *h)),
            _ => None,
        }
    }

    /// Intrinsic size used for the aspect ratio of a derived height.
    ///
    /// Explicit numeric width/height first, then the viewBox, then the
    /// defaults.
    pub fn aspect_dimensions(&self) -> (f64, f64) {
        let w = self.width.as_deref().and_then(parse_length);
        let h = self.height.as_deref().and_then(parse_length);
        match (w, h, self.view_box_size()) {
            (Some(w), Some(h), _) => (w, h),
            (_, _, Some(size)) => size,
            (w, h, None) => (w.unwrap_or(100.0), h.unwrap_or(100.0)),
        }
    }

    /// Numeric width the root renders at when nothing overrides it.
    pub fn numeric_width(&self) -> f64 {
        self.width
            .as_deref()
            .and_then(parse_length)
            .unwrap_or(100.0)
    }
}

/// Parse a unitless or `px` length into a positive number.
pub fn parse_length(s: &str) -> Option<f64> {
    static LENGTH_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = LENGTH_REGEX.get_or_init(|| {
        Regex::new(r"^\s*([+]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)\s*(?:px)?\s*$").unwrap()
    });
    let caps = re.captures(s)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_keep_insertion_order() {
        let mut attrs = Attributes::new();
        attrs.insert("d", AttrValue::literal("M0 0"));
        attrs.insert("fill", AttrValue::literal("red"));
        attrs.insert("d", AttrValue::literal("M1 1"));
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["d", "fill"]);
        assert_eq!(attrs.get_literal("d"), Some("M1 1"));
    }

    #[test]
    fn test_sizing_defaults() {
        let sizing = SizingInfo::resolve(None, None, None);
        assert_eq!(sizing.view_box, "0 0 100 100");
        assert_eq!(sizing.width_or_default(), "100");
    }

    #[test]
    fn test_sizing_explicit_view_box_wins() {
        let sizing = SizingInfo::resolve(
            Some("24".to_string()),
            Some("24".to_string()),
            Some("0 0 48 48".to_string()),
        );
        assert_eq!(sizing.view_box, "0 0 48 48");
    }

    #[test]
    fn test_sizing_synthesizes_partial_dimensions() {
        let sizing = SizingInfo::resolve(Some("32".to_string()), None, None);
        assert_eq!(sizing.view_box, "0 0 32 100");
    }

    #[test]
    fn test_aspect_prefers_numeric_dimensions() {
        let sizing = SizingInfo::resolve(
            Some("20px".to_string()),
            Some("10".to_string()),
            Some("0 0 48 48".to_string()),
        );
        assert_eq!(sizing.aspect_dimensions(), (20.0, 10.0));
    }

    #[test]
    fn test_aspect_falls_back_to_view_box() {
        let sizing = SizingInfo::resolve(Some("100%".to_string()), None, Some("0,0,30,15".to_string()));
        assert_eq!(sizing.aspect_dimensions(), (30.0, 15.0));
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("24"), Some(24.0));
        assert_eq!(parse_length(" 12.5px "), Some(12.5));
        assert_eq!(parse_length("100%"), None);
        assert_eq!(parse_length("0"), None);
    }

    #[test]
    fn test_builder_sets_literal_attributes() {
        let node = MarkupNode::new("path").with_attr("d", "M0 0").with_attr("fill", "red");
        assert_eq!(node.attributes.len(), 2);
        assert_eq!(node.attributes.get_literal("fill"), Some("red"));
        assert!(node.elements().next().is_none());
    }

    #[test]
    fn test_element_count_walks_subtree() {
        let tree = MarkupNode::new("svg")
            .with_child(MarkupNode::new("g").with_child(MarkupNode::new("path")))
            .with_child(MarkupNode::new("text").with_text("hi"));
        assert_eq!(tree.element_count(), 4);
    }
}
