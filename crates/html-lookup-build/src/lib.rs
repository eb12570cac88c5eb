//! Build-time generator for html-lookup.
//!
//! This crate provides tools for:
//! - Parsing `lookup.toml` vocabulary files
//! - Building the decision tree that classifies a name in a handful of
//!   integer comparisons
//! - Generating Rust code for enumerations, finders and subset predicates
//!
//! # Usage in build.rs
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     let out = std::path::PathBuf::from(std::env::var_os("OUT_DIR").unwrap());
//!     html_lookup_build::generate("lookup.toml", out.join("lookup.rs"))
//!         .expect("Failed to generate lookup tables");
//! }
//!
//! // src/lib.rs
//! include!(concat!(env!("OUT_DIR"), "/lookup.rs"));
//! ```
//!
//! # How a lookup works
//!
//! The generated `find` packs the first `min(len, 4)` bytes of the input
//! into a `u32` and switches on `(arity, key)`:
//!
//! - names shorter than 4 bytes are decided by that single comparison;
//! - names of 4 or more bytes sharing a prefix form one arm, inside which
//!   the exact length and the remaining bytes are checked in name order;
//! - anything else returns the table's "not found" value.
//!
//! The cost is one key comparison plus the number of registered names that
//! share the input's 4-byte prefix, regardless of table size.

pub mod codegen;
pub mod key;
pub mod selector;
pub mod symbol;
pub mod table;
mod toml_parser;
pub mod tree;
pub mod vocabulary;

pub use codegen::{render, Rendered};
pub use selector::Selector;
pub use symbol::{symbol_name, Enumeration, SymbolAssigner};
pub use table::{LookupError, LookupTable, NamedConstant};
pub use toml_parser::{ConfigError, EnumConfig, ValueConfig, VocabularyConfig};
pub use tree::{Branch, Check, DecisionTree, Suffix};
pub use vocabulary::{EnumTable, ValueTable, Vocabulary};

use std::path::Path;

/// Main entry point for build.rs integration.
///
/// Reads `lookup.toml`, builds every table and writes declarations followed
/// by definitions into one file.
///
/// # Arguments
///
/// * `config_path` - Path to `lookup.toml`
/// * `output_path` - Path to output Rust file (e.g., `$OUT_DIR/lookup.rs`)
///
/// # Errors
///
/// Returns an error if:
/// - `lookup.toml` cannot be read or parsed
/// - a table has duplicate names or colliding symbols
/// - a selector lists a name missing from its table
/// - the output file cannot be written
pub fn generate(
    config_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> Result<(), GenerateError> {
    let rendered = prepare(config_path.as_ref())?;
    write_if_changed(output_path.as_ref(), &rendered.combined())?;
    Ok(())
}

/// Generate the declaration and definition surfaces into separate files.
pub fn generate_pair(
    config_path: impl AsRef<Path>,
    declarations_path: impl AsRef<Path>,
    definitions_path: impl AsRef<Path>,
) -> Result<(), GenerateError> {
    let rendered = prepare(config_path.as_ref())?;
    write_if_changed(declarations_path.as_ref(), &rendered.declarations)?;
    write_if_changed(definitions_path.as_ref(), &rendered.definitions)?;
    Ok(())
}

fn prepare(config_path: &Path) -> Result<Rendered, GenerateError> {
    println!("cargo:rerun-if-changed={}", config_path.display());

    // 1. Parse lookup.toml
    let config = VocabularyConfig::from_file(config_path)?;

    // 2. Build tables, trees and selectors
    let vocab = Vocabulary::from_config(&config)?;

    // 3. Surface legal but suspicious input
    for table in &vocab.enums {
        for selector in &table.selectors {
            for name in &selector.duplicates {
                println!(
                    "cargo:warning=html-lookup: '{}' is listed more than once in {}::{}",
                    name, table.type_name, selector.name
                );
            }
        }
    }

    // 4. Render
    let rendered = render(&vocab);
    log::debug!(
        "rendered {} enum tables and {} value tables from {}",
        vocab.enums.len(),
        vocab.values.len(),
        config_path.display()
    );
    Ok(rendered)
}

/// Write `content` unless the file already holds exactly that.
fn write_if_changed(path: &Path, content: &str) -> std::io::Result<()> {
    if std::fs::read_to_string(path).is_ok_and(|existing| existing == content) {
        log::debug!("{} is up to date", path.display());
        return Ok(());
    }
    std::fs::write(path, content)
}

/// Errors that can occur during generation.
#[derive(Debug)]
pub enum GenerateError {
    /// Failed to read or parse lookup.toml
    ConfigError(ConfigError),
    /// Invalid vocabulary
    LookupError(LookupError),
    /// IO error
    Io(std::io::Error),
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(e) => write!(f, "Config error: {}", e),
            Self::LookupError(e) => write!(f, "Lookup table error: {}", e),
            Self::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigError(e) => Some(e),
            Self::LookupError(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for GenerateError {
    fn from(e: ConfigError) -> Self {
        Self::ConfigError(e)
    }
}

impl From<LookupError> for GenerateError {
    fn from(e: LookupError) -> Self {
        Self::LookupError(e)
    }
}

impl From<std::io::Error> for GenerateError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
