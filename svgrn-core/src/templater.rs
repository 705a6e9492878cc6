use crate::flavor::{OutputFlavor, SizingMode};
use crate::tree::{AttrValue, Attributes, MarkupNode, SizingInfo};

/// Identifier the wrapper binds the derived height to.
pub const HEIGHT_BINDING: &str = "height";
/// Identifier of the width prop.
pub const WIDTH_PROP: &str = "width";

/// A normalized tree with the flavor's prop references in place.
pub type TemplatedTree = MarkupNode;

/// Inject dynamic props into a normalized tree.
///
/// Fill rewriting is value-level only: attribute order and every other
/// attribute are left alone, and nodes without a `fill` never get one.
pub fn apply_flavor(mut tree: MarkupNode, flavor: &OutputFlavor, sizing: &SizingInfo) -> TemplatedTree {
    if let Some(fill) = &flavor.fill {
        let mut rewritten = 0usize;
        tree.walk_mut(&mut |node| {
            if !fill.targets(&node.tag) {
                return;
            }
            if node.attributes.contains("fill") {
                node.attributes
                    .insert("fill", AttrValue::Expr(fill.prop.clone()));
                rewritten += 1;
            }
        });
        tracing::debug!(prop = %fill.prop, rewritten, "injected fill prop");
    }

    tree.attributes = root_attributes(&tree.attributes, flavor, sizing);
    tree
}

/// Sizing attributes lead, in the order width, height, viewBox.
fn root_attributes(existing: &Attributes, flavor: &OutputFlavor, sizing: &SizingInfo) -> Attributes {
    let (width, height) = match flavor.sizing {
        SizingMode::Static => (
            AttrValue::literal(sizing.width_or_default()),
            AttrValue::literal(sizing.height_or_default()),
        ),
        SizingMode::WidthProp => (
            AttrValue::Expr(WIDTH_PROP.to_string()),
            AttrValue::Expr(HEIGHT_BINDING.to_string()),
        ),
    };

    let mut attrs = Attributes::new();
    attrs.insert("width", width);
    attrs.insert("height", height);
    attrs.insert("viewBox", AttrValue::literal(sizing.view_box.as_str()));
    for (name, value) in existing.iter() {
        attrs.insert(name, value.clone());
    }
    attrs
}

/// Default for the `width` prop: configured value, else the intrinsic width.
pub fn default_width(flavor: &OutputFlavor, sizing: &SizingInfo) -> f64 {
    flavor.default_width.unwrap_or_else(|| sizing.numeric_width())
}

/// Right-hand side of the derived height binding, keeping the aspect ratio.
pub fn height_expression(sizing: &SizingInfo) -> String {
    let (w, h) = sizing.aspect_dimensions();
    format!("({} * {}) / {}", WIDTH_PROP, h, w)
}
