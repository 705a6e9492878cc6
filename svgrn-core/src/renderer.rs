//! Serializes a templated tree into component source.
//!
//! Output is fully determined by the tree, the flavor and the sizing, so the
//! same input always renders byte-identical text.

use std::collections::BTreeSet;

use crate::error::{ConvertError, ConvertResult};
use crate::flavor::{OutputFlavor, SizingMode};
use crate::templater::{self, HEIGHT_BINDING, WIDTH_PROP};
use crate::tree::{AttrValue, Child, MarkupNode, SizingInfo};

const INDENT: &str = "  ";
const ROOT_COMPONENT: &str = "Svg";
const REACT: &str = "React";

/// Render a complete module: imports, component, default export.
pub fn render(tree: &MarkupNode, flavor: &OutputFlavor, sizing: &SizingInfo) -> String {
    let mut out = String::new();
    let name = &flavor.component_name;

    render_imports(&mut out, tree, flavor);
    out.push('\n');

    match flavor.sizing {
        SizingMode::Static if !flavor.has_props() => {
            render_plain_component(&mut out, tree, flavor);
        }
        _ => render_prop_component(&mut out, tree, flavor, sizing),
    }

    out.push('\n');
    out.push_str(&format!("export default {};\n", name));
    out
}

/// Named imports from the component library, sorted.
pub fn named_imports(tree: &MarkupNode, flavor: &OutputFlavor) -> BTreeSet<String> {
    let mut named: BTreeSet<String> = BTreeSet::new();
    tree.walk(&mut |node| {
        if node.tag != ROOT_COMPONENT {
            named.insert(node.tag.clone());
        }
    });
    if flavor.typed_props && flavor.spread_props {
        named.insert("SvgProps".to_string());
    }
    named
}

/// The component and its props must not shadow anything the module imports.
pub fn check_bindings(tree: &MarkupNode, flavor: &OutputFlavor) -> ConvertResult<()> {
    let named = named_imports(tree, flavor);
    let imported = |name: &str| name == REACT || name == ROOT_COMPONENT || named.contains(name);

    if imported(flavor.component_name.as_str()) {
        return Err(ConvertError::Config(format!(
            "component name '{}' clashes with an imported identifier",
            flavor.component_name
        )));
    }
    if let Some(fill) = flavor.fill.as_ref().filter(|f| imported(f.prop.as_str())) {
        return Err(ConvertError::Config(format!(
            "fill prop '{}' clashes with an imported identifier",
            fill.prop
        )));
    }
    Ok(())
}

fn render_imports(out: &mut String, tree: &MarkupNode, flavor: &OutputFlavor) {
    let named = named_imports(tree, flavor);

    out.push_str("import React from 'react';\n");
    if named.is_empty() {
        out.push_str(&format!("import {} from '{}';\n", ROOT_COMPONENT, flavor.library));
    } else {
        let list: Vec<&str> = named.iter().map(String::as_str).collect();
        out.push_str(&format!(
            "import {}, {{ {} }} from '{}';\n",
            ROOT_COMPONENT,
            list.join(", "),
            flavor.library
        ));
    }
}

/// `const Name = (props) => ( <Svg ... /> );`
fn render_plain_component(out: &mut String, tree: &MarkupNode, flavor: &OutputFlavor) {
    let params = match (flavor.spread_props, flavor.typed_props) {
        (true, true) => "props: SvgProps",
        (true, false) => "props",
        (false, _) => "",
    };
    out.push_str(&format!("const {} = ({}) => (\n", flavor.component_name, params));
    render_node(out, tree, 1, flavor.spread_props);
    out.push_str(");\n");
}

/// Destructured props with defaults, optional derived height, block body.
fn render_prop_component(
    out: &mut String,
    tree: &MarkupNode,
    flavor: &OutputFlavor,
    sizing: &SizingInfo,
) {
    let props_type = format!("{}Props", flavor.component_name);
    let derives_height = flavor.sizing == SizingMode::WidthProp;

    let mut params: Vec<String> = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    if derives_height {
        params.push(format!(
            "{} = {}",
            WIDTH_PROP,
            templater::default_width(flavor, sizing)
        ));
        fields.push(format!("{}?: number;", WIDTH_PROP));
    }
    if let Some(fill) = &flavor.fill {
        params.push(format!("{} = {}", fill.prop, js_string(&fill.default_value)));
        fields.push(format!("{}?: string;", fill.prop));
    }
    if flavor.spread_props {
        params.push("...props".to_string());
    }

    if flavor.typed_props {
        let base = if flavor.spread_props { "SvgProps & " } else { "" };
        out.push_str(&format!("type {} = {}{{\n", props_type, base));
        for field in &fields {
            out.push_str(&format!("{}{}\n", INDENT, field));
        }
        out.push_str("};\n\n");
        out.push_str(&format!(
            "const {} = ({{ {} }}: {}) => {{\n",
            flavor.component_name,
            params.join(", "),
            props_type
        ));
    } else {
        out.push_str(&format!(
            "const {} = ({{ {} }}) => {{\n",
            flavor.component_name,
            params.join(", ")
        ));
    }

    if derives_height {
        out.push_str(&format!(
            "{}const {} = {};\n",
            INDENT,
            HEIGHT_BINDING,
            templater::height_expression(sizing)
        ));
    }
    out.push_str(&format!("{}return (\n", INDENT));
    render_node(out, tree, 2, flavor.spread_props);
    out.push_str(&format!("{});\n", INDENT));
    out.push_str("};\n");
}

/// Childless elements always collapse to `<Tag />`.
fn render_node(out: &mut String, node: &MarkupNode, depth: usize, spread: bool) {
    let pad = INDENT.repeat(depth);
    out.push_str(&pad);
    out.push('<');
    out.push_str(&node.tag);
    for (name, value) in node.attributes.iter() {
        out.push(' ');
        out.push_str(name);
        out.push('=');
        match value {
            AttrValue::Literal(s) => {
                out.push('"');
                out.push_str(&escape_attribute(s));
                out.push('"');
            }
            AttrValue::Expr(e) => {
                out.push('{');
                out.push_str(e);
                out.push('}');
            }
        }
    }
    if spread {
        out.push_str(" {...props}");
    }

    if node.children.is_empty() {
        out.push_str(" />\n");
        return;
    }

    out.push_str(">\n");
    for child in &node.children {
        match child {
            Child::Element(e) => render_node(out, e, depth + 1, false),
            Child::Text(t) => {
                out.push_str(&INDENT.repeat(depth + 1));
                out.push('{');
                out.push_str(&serde_json::Value::from(t.text.as_str()).to_string());
                out.push_str("}\n");
            }
        }
    }
    out.push_str(&format!("{}</{}>\n", pad, node.tag));
}

/// JSX string attributes decode HTML entities.
fn escape_attribute(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Single-quoted JavaScript string literal.
fn js_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}
