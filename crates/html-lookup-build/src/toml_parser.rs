//! TOML configuration parser for lookup.toml.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::selector::RESERVED_NAMES;
use crate::symbol::{is_rust_ident, DEFAULT_NAME};
use crate::vocabulary::RUNTIME_PATH;

/// Parsed vocabulary configuration.
#[derive(Debug, Clone)]
pub struct VocabularyConfig {
    /// Path of the runtime crate used by generated code
    pub runtime_path: String,
    /// Name → enumeration tables
    pub enums: Vec<EnumConfig>,
    /// Name → value tables
    pub values: Vec<ValueConfig>,
}

/// One `[[enum]]` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConfig {
    /// Generated type name (e.g., "HtmlTag")
    pub name: String,
    /// Symbol prefix (e.g., "Tag")
    pub prefix: String,
    /// Name of the "not found" variant, without prefix
    pub default: String,
    pub case_insensitive: bool,
    pub doc: Option<String>,
    pub names: Vec<String>,
    /// Selector function name → member names
    pub selectors: BTreeMap<String, Vec<String>>,
}

/// One `[[value]]` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueConfig {
    /// Generated function name (e.g., "find_css_color")
    pub name: String,
    /// Rust return type
    pub value_type: String,
    /// Rust expression returned for unknown names
    pub default: String,
    pub case_insensitive: bool,
    pub doc: Option<String>,
    /// Name → Rust expression
    pub entries: BTreeMap<String, String>,
}

/// Raw TOML structure.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawVocabularyConfig {
    /// Optional runtime crate path (defaults to "::html_lookup")
    runtime_path: Option<String>,
    #[serde(default, rename = "enum")]
    enums: Vec<RawEnum>,
    #[serde(default, rename = "value")]
    values: Vec<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEnum {
    name: String,
    prefix: String,
    default: Option<String>,
    #[serde(default)]
    case_insensitive: bool,
    doc: Option<String>,
    names: RawNames,
    #[serde(default)]
    selectors: BTreeMap<String, RawNames>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawValue {
    name: String,
    #[serde(rename = "type")]
    value_type: String,
    default: RawExpr,
    #[serde(default)]
    case_insensitive: bool,
    doc: Option<String>,
    entries: BTreeMap<String, RawExpr>,
}

/// Either a list or one whitespace-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNames {
    List(Vec<String>),
    Words(String),
}

impl RawNames {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::List(names) => names,
            Self::Words(words) => words.split_whitespace().map(String::from).collect(),
        }
    }
}

/// Integer literal or Rust expression.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawExpr {
    Int(i64),
    Expr(String),
}

impl RawExpr {
    fn into_string(self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Expr(expr) => expr,
        }
    }
}

impl VocabularyConfig {
    /// Parse from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::Io(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_str(&content)
    }

    /// Parse from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawVocabularyConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let runtime_path = raw
            .runtime_path
            .unwrap_or_else(|| RUNTIME_PATH.to_string());

        let enums = raw
            .enums
            .into_iter()
            .map(Self::validate_enum)
            .collect::<Result<Vec<_>, _>>()?;
        let values = raw
            .values
            .into_iter()
            .map(Self::validate_value)
            .collect::<Result<Vec<_>, _>>()?;

        let config = Self {
            runtime_path,
            enums,
            values,
        };
        config.check_unique_items()?;
        Ok(config)
    }

    /// Total number of tables.
    pub fn len(&self) -> usize {
        self.enums.len() + self.values.len()
    }

    /// Check if no table is configured.
    pub fn is_empty(&self) -> bool {
        self.enums.is_empty() && self.values.is_empty()
    }

    fn validate_enum(raw: RawEnum) -> Result<EnumConfig, ConfigError> {
        require_ident("enum name", &raw.name)?;
        require_ident("prefix", &raw.prefix)?;

        let default = raw.default.unwrap_or_else(|| DEFAULT_NAME.to_string());
        let names = raw.names.into_vec();
        if names.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Enum '{}' has no names",
                raw.name
            )));
        }

        let mut selectors = BTreeMap::new();
        for (fn_name, members) in raw.selectors {
            require_ident("selector name", &fn_name)?;
            if RESERVED_NAMES.contains(&fn_name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Selector name '{}' on enum '{}' clashes with a generated method",
                    fn_name, raw.name
                )));
            }
            selectors.insert(fn_name, members.into_vec());
        }

        Ok(EnumConfig {
            name: raw.name,
            prefix: raw.prefix,
            default,
            case_insensitive: raw.case_insensitive,
            doc: raw.doc,
            names,
            selectors,
        })
    }

    fn validate_value(raw: RawValue) -> Result<ValueConfig, ConfigError> {
        require_ident("function name", &raw.name)?;
        if raw.value_type.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Value table '{}' has an empty type",
                raw.name
            )));
        }
        if raw.entries.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Value table '{}' has no entries",
                raw.name
            )));
        }

        Ok(ValueConfig {
            name: raw.name,
            value_type: raw.value_type,
            default: raw.default.into_string(),
            case_insensitive: raw.case_insensitive,
            doc: raw.doc,
            entries: raw
                .entries
                .into_iter()
                .map(|(name, value)| (name, value.into_string()))
                .collect(),
        })
    }

    /// Generated type and function names share one module.
    fn check_unique_items(&self) -> Result<(), ConfigError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let names = self
            .enums
            .iter()
            .map(|e| e.name.as_str())
            .chain(self.values.iter().map(|v| v.name.as_str()));
        for name in names {
            if !seen.insert(name) {
                return Err(ConfigError::Validation(format!(
                    "'{}' is defined more than once",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn require_ident(what: &str, value: &str) -> Result<(), ConfigError> {
    if is_rust_ident(value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "Invalid {} '{}': must be a Rust identifier",
            what, value
        )))
    }
}

/// Errors during config parsing.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// TOML parse error
    Parse(String),
    /// Validation error
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {}", msg),
            Self::Parse(msg) => write!(f, "Parse error: {}", msg),
            Self::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
