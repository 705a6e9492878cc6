use crate::flavor::is_identifier;
use crate::tree::{AttrValue, Attributes, Child, MarkupNode, SizingInfo};

/// Lowercased SVG element name to react-native-svg component.
const COMPONENTS: &[(&str, &str)] = &[
    ("svg", "Svg"),
    ("path", "Path"),
    ("circle", "Circle"),
    ("rect", "Rect"),
    ("ellipse", "Ellipse"),
    ("g", "G"),
    ("defs", "Defs"),
    ("lineargradient", "LinearGradient"),
    ("radialgradient", "RadialGradient"),
    ("stop", "Stop"),
    ("polygon", "Polygon"),
    ("polyline", "Polyline"),
    ("line", "Line"),
    ("text", "Text"),
    ("tspan", "TSpan"),
    ("textpath", "TextPath"),
    ("use", "Use"),
    ("symbol", "Symbol"),
    ("clippath", "ClipPath"),
    ("mask", "Mask"),
    ("pattern", "Pattern"),
    ("image", "Image"),
    ("foreignobject", "ForeignObject"),
    ("marker", "Marker"),
    ("filter", "Filter"),
];

/// Rewrite tags and attributes into react-native-svg vocabulary and pull the
/// sizing attributes off the root.
///
/// `width`, `height` and `viewBox` are removed from the root; the templater
/// re-injects them according to the flavor. Sizing given through the root's
/// inline `style` counts as if it were an attribute.
pub fn normalize(mut tree: MarkupNode) -> (MarkupNode, SizingInfo) {
    expand_inline_style(&mut tree.attributes);
    let width = take_literal(&mut tree.attributes, "width");
    let height = take_literal(&mut tree.attributes, "height");
    let view_box = take_literal(&mut tree.attributes, "viewBox");
    let sizing = SizingInfo::resolve(width, height, view_box);

    let tree = normalize_node(tree);
    tracing::debug!(view_box = %sizing.view_box, "normalized svg tree");
    (tree, sizing)
}

fn take_literal(attrs: &mut Attributes, name: &str) -> Option<String> {
    match attrs.remove(name)? {
        AttrValue::Literal(s) => Some(s),
        AttrValue::Expr(_) => None,
    }
}

fn normalize_node(mut node: MarkupNode) -> MarkupNode {
    expand_inline_style(&mut node.attributes);
    let children = node
        .children
        .into_iter()
        .filter_map(|child| match child {
            // Editor metadata in foreign namespaces (sodipodi:, inkscape:, ...)
            Child::Element(e) if e.tag.contains(':') => None,
            Child::Element(e) => Some(Child::Element(normalize_node(e))),
            Child::Text(t) => Some(Child::Text(t)),
        })
        .collect();

    MarkupNode {
        tag: component_name(&node.tag),
        attributes: normalize_attributes(&node.attributes),
        children,
        self_closing: node.self_closing,
    }
}

/// Map an SVG element name onto its component name. Depends on the name only.
///
/// Unknown elements are PascalCased rather than rejected: `my-widget` becomes
/// `MyWidget`.
pub fn component_name(tag: &str) -> String {
    COMPONENTS
        .iter()
        .find(|(svg, _)| svg.eq_ignore_ascii_case(tag))
        .map(|(_, component)| component.to_string())
        .unwrap_or_else(|| {
            tag.split(['-', '.'])
                .filter(|s| !s.is_empty())
                .map(capitalize)
                .collect()
        })
}

/// Whether `name` is one of the react-native-svg components in the tag table.
pub fn is_known_component(name: &str) -> bool {
    COMPONENTS.iter().any(|(_, component)| *component == name)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `stroke-width` -> `strokeWidth`, `font-variant-ligatures` -> `fontVariantLigatures`.
pub fn camel_case(name: &str) -> String {
    let mut segments = name.split('-');
    let mut out = segments.next().unwrap_or_default().to_string();
    for segment in segments {
        out.push_str(&capitalize(segment));
    }
    out
}

/// Target name for a source attribute, or `None` when the attribute is dropped.
pub fn attribute_name(name: &str) -> Option<String> {
    if name == "xmlns" || name.starts_with("xmlns:") {
        return None;
    }
    match name {
        "xlink:href" => Some("href".to_string()),
        "class" => Some("className".to_string()),
        n if n.contains(':') => None,
        n => Some(camel_case(n)).filter(|c| is_identifier(c)),
    }
}

fn normalize_attributes(attrs: &Attributes) -> Attributes {
    attrs
        .iter()
        .filter_map(|(name, value)| Some((attribute_name(name)?, value.clone())))
        .collect()
}

/// Replace an inline `style` attribute with one attribute per declaration.
///
/// Declarations are appended after the existing attributes, so after
/// renaming they override same-named presentation attributes in place.
fn expand_inline_style(attrs: &mut Attributes) {
    let Some(AttrValue::Literal(css)) = attrs.remove("style") else {
        return;
    };
    for (key, val) in style_declarations(&css) {
        // Custom properties have no attribute counterpart.
        if key.starts_with("--") {
            continue;
        }
        let name = camel_case(key);
        if is_identifier(&name) {
            attrs.insert(name, AttrValue::literal(val));
        }
    }
}

/// Split `"fill:red; stroke-width:2"` into declarations. Separators inside
/// parentheses or quotes (`url(data:...;base64,...)`) do not split. Entries
/// without a colon or with an empty side are skipped.
fn style_declarations(css: &str) -> Vec<(&str, &str)> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in css.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                entries.push(&css[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&css[start..]);

    entries
        .into_iter()
        .filter_map(|entry| {
            let (key, val) = entry.split_once(':')?;
            let (key, val) = (key.trim(), val.trim());
            (!key.is_empty() && !val.is_empty()).then_some((key, val))
        })
        .collect()
}
