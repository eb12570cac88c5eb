//! Subset predicates over enumeration values.

use std::collections::BTreeSet;

use crate::symbol::Enumeration;
use crate::table::{LookupError, LookupTable};

/// Items every generated enumeration already defines; selectors may not
/// reuse these names.
pub const RESERVED_NAMES: &[&str] = &["find", "name", "ALL", "COUNT"];

/// Membership predicate for a named subset of a table's names.
///
/// The predicate works on enumeration values, not on strings: it is true
/// exactly for the symbols of the listed names and false for everything
/// else, the default included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub name: String,
    /// Included symbols, in enumeration order.
    pub included: Vec<String>,
    /// Members listed more than once.
    pub duplicates: Vec<String>,
}

impl Selector {
    /// Resolve `members` against `table`.
    ///
    /// Every member must be a name of `table`; matching follows the table's
    /// case mode.
    pub fn build<S: AsRef<str>>(
        name: impl Into<String>,
        table: &LookupTable,
        enumeration: &Enumeration,
        members: &[S],
    ) -> Result<Self, LookupError> {
        let name = name.into();
        let mut targets = BTreeSet::new();
        let mut duplicates = Vec::new();

        for member in members {
            let member = member.as_ref();
            let Some(index) = table.position(member.as_bytes()) else {
                return Err(LookupError::UnknownMember {
                    selector: name,
                    name: member.to_string(),
                });
            };
            if !targets.insert(index) {
                duplicates.push(member.to_string());
            }
        }

        // Entry i is enumeration value i; the default sits after all entries.
        let included = targets
            .into_iter()
            .map(|i| enumeration.symbols[i].clone())
            .collect::<Vec<_>>();

        log::debug!(
            "selector {}: {} of {} symbols",
            name,
            included.len(),
            enumeration.len()
        );

        Ok(Self {
            name,
            included,
            duplicates,
        })
    }

    /// Evaluate the predicate for `symbol`.
    pub fn contains(&self, symbol: &str) -> bool {
        self.included.iter().any(|s| s == symbol)
    }
}
