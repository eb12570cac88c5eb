//! Lookup tables: the validated, sorted input of every generated finder.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::key::folded;

/// One registered spelling and what it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedConstant {
    /// External spelling to match.
    pub name: String,
    /// Enumeration variant for enum tables, Rust expression for value tables.
    pub symbol: String,
}

impl NamedConstant {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// A closed vocabulary plus the symbol returned for everything else.
///
/// Entries are kept sorted by their comparison spelling (folded for
/// case-insensitive tables), which makes every run reproducible and keeps
/// names sharing a 4-byte prefix contiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTable {
    label: String,
    entries: Vec<NamedConstant>,
    default_symbol: String,
    case_insensitive: bool,
}

impl LookupTable {
    /// Validate and sort `entries`.
    ///
    /// `label` names the table in error messages.
    pub fn new(
        label: impl Into<String>,
        entries: Vec<NamedConstant>,
        default_symbol: impl Into<String>,
        case_insensitive: bool,
    ) -> Result<Self, LookupError> {
        let label = label.into();
        let mut entries = entries;
        entries.sort_by(|a, b| {
            folded(a.name.as_bytes(), case_insensitive)
                .cmp(&folded(b.name.as_bytes(), case_insensitive))
                .then_with(|| a.name.cmp(&b.name))
        });

        for pair in entries.windows(2) {
            if folded(pair[0].name.as_bytes(), case_insensitive)
                == folded(pair[1].name.as_bytes(), case_insensitive)
            {
                return Err(LookupError::DuplicateName {
                    table: label,
                    name: pair[1].name.clone(),
                });
            }
        }

        log::debug!(
            "lookup table {}: {} entries, case_insensitive={}",
            label,
            entries.len(),
            case_insensitive
        );

        Ok(Self {
            label,
            entries,
            default_symbol: default_symbol.into(),
            case_insensitive,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Entries in lookup order.
    pub fn entries(&self) -> &[NamedConstant] {
        &self.entries
    }

    pub fn default_symbol(&self) -> &str {
        &self.default_symbol
    }

    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entry spelled `name`, honouring the table's case mode.
    pub fn position(&self, name: &[u8]) -> Option<usize> {
        let needle = self.sort_key(name);
        self.entries
            .binary_search_by(|e| self.sort_key(e.name.as_bytes()).cmp(&needle))
            .ok()
    }

    fn sort_key<'a>(&self, name: &'a [u8]) -> Cow<'a, [u8]> {
        if self.case_insensitive {
            Cow::Owned(folded(name, true))
        } else {
            Cow::Borrowed(name)
        }
    }

    /// Symbols of all entries, without the default.
    pub(crate) fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.symbol.as_str())
    }

    /// Ensure entry symbols and the default are pairwise distinct.
    pub(crate) fn check_unique_symbols(&self) -> Result<(), LookupError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.symbol.as_str()) {
                let first = self
                    .entries
                    .iter()
                    .find(|e| e.symbol == entry.symbol)
                    .map(|e| e.name.clone())
                    .unwrap_or_default();
                return Err(LookupError::SymbolCollision {
                    table: self.label.clone(),
                    symbol: entry.symbol.clone(),
                    first,
                    second: entry.name.clone(),
                });
            }
        }
        if let Some(entry) = self.entries.iter().find(|e| e.symbol == self.default_symbol) {
            return Err(LookupError::SymbolCollision {
                table: self.label.clone(),
                symbol: self.default_symbol.clone(),
                first: entry.name.clone(),
                second: "<default>".to_string(),
            });
        }
        Ok(())
    }
}

/// Generation-time failures. All of them abort generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Two entries spell the same name (after folding, for case-insensitive tables).
    DuplicateName { table: String, name: String },
    /// Two names derive the same symbol.
    SymbolCollision {
        table: String,
        symbol: String,
        first: String,
        second: String,
    },
    /// A name derives a symbol that is not a Rust identifier.
    InvalidSymbol {
        table: String,
        name: String,
        symbol: String,
    },
    /// A selector lists a name its primary table does not contain.
    UnknownMember { selector: String, name: String },
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateName { table, name } => {
                write!(f, "duplicate name '{}' in table {}", name, table)
            }
            Self::SymbolCollision {
                table,
                symbol,
                first,
                second,
            } => write!(
                f,
                "names '{}' and '{}' in table {} both map to symbol {}",
                first, second, table, symbol
            ),
            Self::InvalidSymbol {
                table,
                name,
                symbol,
            } => write!(
                f,
                "name '{}' in table {} derives '{}', which is not a valid identifier",
                name, table, symbol
            ),
            Self::UnknownMember { selector, name } => write!(
                f,
                "selector {} lists '{}', which is not in its table",
                selector, name
            ),
        }
    }
}

impl std::error::Error for LookupError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(names: &[&str], case_insensitive: bool) -> Result<LookupTable, LookupError> {
        let entries = names
            .iter()
            .map(|n| NamedConstant::new(*n, format!("S_{}", n)))
            .collect();
        LookupTable::new("T", entries, "S_NotFound", case_insensitive)
    }

    #[test]
    fn entries_are_sorted() {
        let t = table(&["br", "a", "body", "blockquote"], false).unwrap();
        let names: Vec<_> = t.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "blockquote", "body", "br"]);
    }

    #[test]
    fn case_insensitive_sort_uses_folded_spelling() {
        // Raw byte order would put "Abcd" and "Abcf" before "abce".
        let t = table(&["Abcf", "abce", "Abcd"], true).unwrap();
        let names: Vec<_> = t.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Abcd", "abce", "Abcf"]);
    }

    #[test]
    fn rejects_duplicates() {
        let err = table(&["a", "b", "a"], false).unwrap_err();
        assert_eq!(
            err,
            LookupError::DuplicateName {
                table: "T".into(),
                name: "a".into()
            }
        );
    }

    #[test]
    fn rejects_duplicates_after_folding() {
        assert!(table(&["Body", "body"], false).is_ok());
        assert!(matches!(
            table(&["Body", "body"], true),
            Err(LookupError::DuplicateName { .. })
        ));
    }

    #[test]
    fn position_honours_case_mode() {
        let ci = table(&["a", "body", "br"], true).unwrap();
        assert_eq!(ci.position(b"BODY"), Some(1));
        assert_eq!(ci.position(b"bo"), None);

        let cs = table(&["Prime", "prime"], false).unwrap();
        assert_eq!(cs.position(b"Prime"), Some(0));
        assert_eq!(cs.position(b"prime"), Some(1));
        assert_eq!(cs.position(b"PRIME"), None);
    }

    #[test]
    fn symbol_collision_with_default_is_reported() {
        let entries = vec![NamedConstant::new("x", "S_NotFound")];
        let t = LookupTable::new("T", entries, "S_NotFound", false).unwrap();
        assert!(matches!(
            t.check_unique_symbols(),
            Err(LookupError::SymbolCollision { .. })
        ));
    }
}
