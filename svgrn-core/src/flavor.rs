use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{ConvertError, ConvertResult};
use crate::normalizer::is_known_component;

/// Built-in output presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlavorId {
    /// Drop-in component with static sizing and every tag supported.
    Generic,
    /// Typed component with a `width` prop, derived height and a fill color prop.
    Themed,
}

impl FlavorId {
    pub const ALL: [FlavorId; 2] = [FlavorId::Generic, FlavorId::Themed];

    pub fn as_str(self) -> &'static str {
        match self {
            FlavorId::Generic => "generic",
            FlavorId::Themed => "themed",
        }
    }

    pub fn preset(self) -> OutputFlavor {
        match self {
            FlavorId::Generic => OutputFlavor::generic(),
            FlavorId::Themed => OutputFlavor::themed(),
        }
    }
}

impl fmt::Display for FlavorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlavorId {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlavorId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConvertError::UnknownFlavor(s.to_string()))
    }
}

/// How the root `<Svg>` gets its dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SizingMode {
    /// Resolved width/height literals.
    #[default]
    Static,
    /// `width` prop; height derived from it with the original aspect ratio.
    WidthProp,
}

/// Turns literal `fill` values into a component prop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FillProp {
    /// Prop name referenced by rewritten fills.
    pub prop: String,
    /// Component names (post-normalization) whose fills are rewritten.
    pub tags: Vec<String>,
    /// Default value of the prop in the component signature.
    pub default_value: String,
}

impl Default for FillProp {
    fn default() -> Self {
        FillProp {
            prop: "fillColor".to_string(),
            tags: vec!["Path".to_string()],
            default_value: "#000".to_string(),
        }
    }
}

impl FillProp {
    pub fn targets(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Code-generation template. Immutable for the duration of a conversion.
///
/// Deserializes from YAML with every missing field taken from
/// [`OutputFlavor::generic`]:
///
/// ```yaml
/// componentName: BrandIcon
/// sizing: widthProp
/// typedProps: true
/// fill:
///   prop: tint
///   tags: [Path, Circle]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputFlavor {
    pub component_name: String,
    /// Module the components are imported from.
    pub library: String,
    /// Emit TypeScript prop types.
    pub typed_props: bool,
    /// Forward remaining props onto the root `<Svg>`.
    pub spread_props: bool,
    pub sizing: SizingMode,
    /// Overrides the intrinsic width as the default of the `width` prop.
    pub default_width: Option<f64>,
    pub fill: Option<FillProp>,
}

impl Default for OutputFlavor {
    fn default() -> Self {
        OutputFlavor::generic()
    }
}

impl OutputFlavor {
    pub fn generic() -> Self {
        OutputFlavor {
            component_name: "SvgComponent".to_string(),
            library: "react-native-svg".to_string(),
            typed_props: false,
            spread_props: true,
            sizing: SizingMode::Static,
            default_width: None,
            fill: None,
        }
    }

    pub fn themed() -> Self {
        OutputFlavor {
            component_name: "SvgComponent".to_string(),
            library: "react-native-svg".to_string(),
            typed_props: true,
            spread_props: false,
            sizing: SizingMode::WidthProp,
            default_width: None,
            fill: Some(FillProp::default()),
        }
    }

    /// Load a flavor from YAML and validate it.
    pub fn from_yaml(yaml: &str) -> ConvertResult<Self> {
        let flavor: OutputFlavor = serde_yaml::from_str(yaml)?;
        flavor.validate()?;
        Ok(flavor)
    }

    pub fn with_component_name(mut self, name: impl Into<String>) -> Self {
        self.component_name = name.into();
        self
    }

    /// Identifiers must be usable verbatim in the generated source.
    pub fn validate(&self) -> ConvertResult<()> {
        if !is_pascal_case(&self.component_name) {
            return Err(ConvertError::Config(format!(
                "component name '{}' must be PascalCase",
                self.component_name
            )));
        }
        if self.library.trim().is_empty() || self.library.contains(['\'', '\n']) {
            return Err(ConvertError::Config(format!(
                "invalid library '{}'",
                self.library
            )));
        }
        if let Some(width) = self.default_width {
            if !(width.is_finite() && width > 0.0) {
                return Err(ConvertError::Config(format!(
                    "defaultWidth must be a positive number, got {}",
                    width
                )));
            }
        }
        if let Some(fill) = &self.fill {
            if !is_identifier(&fill.prop) {
                return Err(ConvertError::Config(format!(
                    "fill prop '{}' is not a valid identifier",
                    fill.prop
                )));
            }
            if matches!(fill.prop.as_str(), "width" | "height" | "props") {
                return Err(ConvertError::Config(format!(
                    "fill prop '{}' clashes with a generated name",
                    fill.prop
                )));
            }
            if fill.default_value.contains(['\n', '\r']) {
                return Err(ConvertError::Config(
                    "fill defaultValue must be a single line".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Whether any prop-bearing signature is needed.
    pub fn has_props(&self) -> bool {
        self.sizing == SizingMode::WidthProp || self.fill.is_some()
    }

    /// File extension for generated sources.
    pub fn file_extension(&self) -> &'static str {
        if self.typed_props {
            "tsx"
        } else {
            "jsx"
        }
    }
}

pub fn is_pascal_case(s: &str) -> bool {
    static PASCAL_REGEX: OnceLock<Regex> = OnceLock::new();
    PASCAL_REGEX
        .get_or_init(|| Regex::new(r"^[A-Z][A-Za-z0-9_]*$").unwrap())
        .is_match(s)
}

pub fn is_identifier(s: &str) -> bool {
    static IDENT_REGEX: OnceLock<Regex> = OnceLock::new();
    IDENT_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap())
        .is_match(s)
}

/// Derive a component name from a file stem: `arrow-left` -> `ArrowLeft`,
/// `24px_icon` -> `Svg24pxIcon`, `path` -> `PathIcon`.
pub fn component_name_from_stem(stem: &str) -> String {
    let mut name: String = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name.insert_str(0, "Svg");
    }
    if matches!(name.as_str(), "React" | "Svg" | "SvgProps") || is_known_component(&name) {
        name.push_str("Icon");
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_id_from_str() {
        assert_eq!("generic".parse::<FlavorId>().unwrap(), FlavorId::Generic);
        assert_eq!("Themed".parse::<FlavorId>().unwrap(), FlavorId::Themed);
        assert!(matches!(
            "fancy".parse::<FlavorId>(),
            Err(ConvertError::UnknownFlavor(_))
        ));
    }

    #[test]
    fn test_presets() {
        let generic = FlavorId::Generic.preset();
        assert_eq!(generic.sizing, SizingMode::Static);
        assert!(generic.fill.is_none());

        let themed = FlavorId::Themed.preset();
        assert_eq!(themed.sizing, SizingMode::WidthProp);
        let fill = themed.fill.unwrap();
        assert_eq!(fill.prop, "fillColor");
        assert!(fill.targets("Path"));
        assert!(!fill.targets("Circle"));
    }

    #[test]
    fn test_from_yaml_defaults_to_generic() {
        let flavor = OutputFlavor::from_yaml("componentName: Logo").unwrap();
        assert_eq!(flavor.component_name, "Logo");
        assert_eq!(flavor.library, "react-native-svg");
        assert_eq!(flavor.sizing, SizingMode::Static);
    }

    #[test]
    fn test_from_yaml_custom_fill_targets() {
        let yaml = "sizing: widthProp\ntypedProps: true\nfill:\n  prop: tint\n  tags: [Path, Circle]\n";
        let flavor = OutputFlavor::from_yaml(yaml).unwrap();
        let fill = flavor.fill.unwrap();
        assert_eq!(fill.prop, "tint");
        assert!(fill.targets("Circle"));
        assert_eq!(fill.default_value, "#000");
    }

    #[test]
    fn test_from_yaml_rejects_bad_names() {
        assert!(matches!(
            OutputFlavor::from_yaml("componentName: my-icon"),
            Err(ConvertError::Config(_))
        ));
        assert!(matches!(
            OutputFlavor::from_yaml("fill:\n  prop: width\n"),
            Err(ConvertError::Config(_))
        ));
        assert!(matches!(
            OutputFlavor::from_yaml("sizing: [oops"),
            Err(ConvertError::Config(_))
        ));
    }

    #[test]
    fn test_component_name_from_stem() {
        assert_eq!(component_name_from_stem("arrow-left"), "ArrowLeft");
        assert_eq!(component_name_from_stem("ic_home_24"), "IcHome24");
        assert_eq!(component_name_from_stem("24px_icon"), "Svg24pxIcon");
        assert_eq!(component_name_from_stem("---"), "SvgIcon");
        assert_eq!(component_name_from_stem("path"), "PathIcon");
        assert_eq!(component_name_from_stem("text"), "TextIcon");
        assert_eq!(component_name_from_stem("react"), "ReactIcon");
    }
}
