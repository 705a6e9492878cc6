//! # svgrn — SVG to react-native-svg components
//!
//! Converts SVG markup into the source of an equivalent component built on
//! `react-native-svg`.
//!
//! ## Pipeline
//! Each stage is a pure function of the previous stage's output:
//! - [`sanitizer`] strips declarations, DOCTYPE, comments and `<style>`/`<script>` blocks
//! - [`parser`] builds an ordered element tree rooted at a single `<svg>`
//! - [`normalizer`] maps tags and attributes onto component vocabulary and resolves sizing
//! - [`templater`] swaps literal fills for prop references, per flavor
//! - [`renderer`] prints imports, the component and its export
//!
//! ## Example
//! ```ignore
//! use svgrn_core::{convert, is_failure, FlavorId};
//!
//! let svg = r#"<svg viewBox="0 0 10 10"><path fill="red" d="M0 0h10v10H0z"/></svg>"#;
//! let source = convert(svg, FlavorId::Themed);
//! assert!(!is_failure(&source));
//! assert!(source.contains("<Path fill={fillColor}"));
//! ```
//!
//! Conversions never panic and never return partial output: failures come back
//! as a string starting with [`SENTINEL`].

pub mod error;
pub mod flavor;
pub mod normalizer;
pub mod parser;
pub mod renderer;
pub mod sanitizer;
pub mod templater;
pub mod tree;

// --- Core types ---
pub use error::{ConvertError, ConvertResult, SENTINEL};
pub use flavor::{FillProp, FlavorId, OutputFlavor, SizingMode};
pub use templater::TemplatedTree;
pub use tree::{AttrValue, Attributes, Child, MarkupNode, SizingInfo, TextRun};

/// Generated source on success, sentinel-prefixed report on failure.
pub type ConversionResult = String;

/// Convert raw SVG markup using a built-in flavor.
pub fn convert(raw_markup: &str, flavor: FlavorId) -> ConversionResult {
    convert_with(raw_markup, &flavor.preset())
}

/// Convert raw SVG markup using a custom flavor.
pub fn convert_with(raw_markup: &str, flavor: &OutputFlavor) -> ConversionResult {
    match try_convert(raw_markup, flavor) {
        Ok(source) => source,
        Err(err) => {
            tracing::debug!(stage = err.stage(), error = %err, "conversion failed");
            err.to_sentinel()
        }
    }
}

/// Convert raw bytes; input that is not UTF-8 is reported as unsupported.
pub fn convert_bytes(raw: &[u8], flavor: &OutputFlavor) -> ConversionResult {
    match std::str::from_utf8(raw) {
        Ok(text) => convert_with(text, flavor),
        Err(e) => ConvertError::UnsupportedInput(format!("input is not valid UTF-8: {}", e))
            .to_sentinel(),
    }
}

/// Typed form of [`convert_with`].
pub fn try_convert(raw_markup: &str, flavor: &OutputFlavor) -> ConvertResult<String> {
    flavor.validate()?;
    let (tree, sizing) = inspect(raw_markup)?;
    let tree = templater::apply_flavor(tree, flavor, &sizing);
    renderer::check_bindings(&tree, flavor)?;
    let source = renderer::render(&tree, flavor, &sizing);
    tracing::debug!(
        flavor = %flavor.component_name,
        output_len = source.len(),
        "rendered component"
    );
    Ok(source)
}

/// Sanitize, parse and normalize without rendering.
pub fn inspect(raw_markup: &str) -> ConvertResult<(MarkupNode, SizingInfo)> {
    if raw_markup.trim().is_empty() {
        return Err(ConvertError::UnsupportedInput("input is empty".to_string()));
    }
    tracing::debug!(input_len = raw_markup.len(), "converting svg markup");

    let sanitized = sanitizer::sanitize(raw_markup);
    let tree = parser::parse(&sanitized)?;
    Ok(normalizer::normalize(tree))
}

/// Whether a conversion result is a failure report.
pub fn is_failure(result: &str) -> bool {
    result.starts_with(SENTINEL)
}
