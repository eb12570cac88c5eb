//! Symbol derivation and enumeration layout.

use crate::table::{LookupError, LookupTable, NamedConstant};

/// Characters that split a name into symbol segments.
pub const SEPARATORS: &[char] = &[':', '-'];

/// Default joiner between prefix and segments.
pub const JOINER: &str = "_";

/// Default name of the "not found" variant.
pub const DEFAULT_NAME: &str = "NotFound";

/// Symbols per row in rendered enumerations.
pub const ROW_WIDTH: usize = 5;

/// Derive the symbol for `name`.
///
/// `"br"` with prefix `Tag` gives `Tag_Br`; `"mbp:pagebreak"` gives
/// `Tag_Mbp_Pagebreak`.
pub fn symbol_name(name: &str, prefix: &str, joiner: &str) -> String {
    let mut parts = vec![prefix.to_string()];
    parts.extend(name.split(SEPARATORS).map(capitalize));
    parts.join(joiner)
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// True if `s` can be used as a Rust identifier (ASCII subset).
pub fn is_rust_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    s != "_" && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Ordered enumeration constants: entry symbols in name order, then the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    pub name: String,
    pub symbols: Vec<String>,
}

impl Enumeration {
    /// Build from a table whose symbols are enumeration constants.
    pub fn from_table(name: impl Into<String>, table: &LookupTable) -> Self {
        let symbols = table
            .symbols()
            .chain(std::iter::once(table.default_symbol()))
            .map(str::to_string)
            .collect();
        Self {
            name: name.into(),
            symbols,
        }
    }

    /// The sentinel, always last.
    pub fn default_symbol(&self) -> &str {
        self.symbols.last().map(String::as_str).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Fixed-width rows, for readability only.
    pub fn rows(&self, width: usize) -> impl Iterator<Item = &[String]> {
        self.symbols.chunks(width.max(1))
    }
}

/// Derives symbols for a vocabulary and assembles its table and enumeration.
#[derive(Debug, Clone)]
pub struct SymbolAssigner {
    pub prefix: String,
    pub joiner: String,
    pub default_name: String,
}

impl SymbolAssigner {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            joiner: JOINER.to_string(),
            default_name: DEFAULT_NAME.to_string(),
        }
    }

    pub fn with_default_name(mut self, default_name: impl Into<String>) -> Self {
        self.default_name = default_name.into();
        self
    }

    pub fn default_symbol(&self) -> String {
        format!("{}{}{}", self.prefix, self.joiner, self.default_name)
    }

    /// Assign symbols to `names` and build the table `type_name`.
    pub fn assign<S: AsRef<str>>(
        &self,
        type_name: &str,
        names: &[S],
        case_insensitive: bool,
    ) -> Result<(LookupTable, Enumeration), LookupError> {
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let symbol = symbol_name(name, &self.prefix, &self.joiner);
            if !is_rust_ident(&symbol) {
                return Err(LookupError::InvalidSymbol {
                    table: type_name.to_string(),
                    name: name.to_string(),
                    symbol,
                });
            }
            entries.push(NamedConstant::new(name, symbol));
        }

        let default_symbol = self.default_symbol();
        if !is_rust_ident(&default_symbol) {
            return Err(LookupError::InvalidSymbol {
                table: type_name.to_string(),
                name: self.default_name.clone(),
                symbol: default_symbol,
            });
        }

        let table = LookupTable::new(type_name, entries, default_symbol, case_insensitive)?;
        table.check_unique_symbols()?;
        let enumeration = Enumeration::from_table(type_name, &table);
        Ok((table, enumeration))
    }
}
