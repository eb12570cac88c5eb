//! Decision tree construction.
//!
//! A finder dispatches once on the lead key of the input (arity plus the
//! first `min(len, 4)` bytes packed into a `u32`). Names shorter than four
//! bytes are fully identified by that key. Longer names are grouped by
//! their 4-byte prefix; inside a group an ordered list of checks compares
//! the exact length and the remaining bytes.
//!
//! ```text
//! "a"          -> Terminal (1, 0x00000061)
//! "body"       -> Group 0x79646f62 [len == 4]
//! "blockquote" -> Group 0x636f6c62 [len == 10 && name[4..] == "kquote"]
//! ```
//!
//! [`DecisionTree::lookup`] interprets the tree with the same semantics the
//! generated code has, so the algorithm can be tested without compiling
//! anything.

use crate::key::{folded, lead_key, pack, LEAD_BYTES, PACKED_SUFFIX_MAX};
use crate::table::LookupTable;

/// Comparison applied to the bytes after the 4-byte prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suffix {
    /// Name is exactly four bytes long.
    None,
    /// One to four remaining bytes, compared as a second packed key.
    Packed { count: usize, key: u32 },
    /// More than four remaining bytes, compared byte by byte.
    /// Stored folded for case-insensitive tables.
    Bytes(Vec<u8>),
}

/// Refinement check inside a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    /// Exact input length required.
    pub len: usize,
    pub suffix: Suffix,
    /// Index of the matched entry in the table.
    pub target: usize,
}

impl Check {
    fn for_name(name: &[u8], target: usize, fold_case: bool) -> Self {
        let rest = &name[LEAD_BYTES..];
        let suffix = if rest.is_empty() {
            Suffix::None
        } else if name.len() <= PACKED_SUFFIX_MAX {
            Suffix::Packed {
                count: rest.len(),
                key: pack(rest, rest.len(), fold_case),
            }
        } else {
            Suffix::Bytes(folded(rest, fold_case))
        };
        Self {
            len: name.len(),
            suffix,
            target,
        }
    }

    /// Whether `name` (already known to share the group prefix) satisfies this check.
    pub fn matches(&self, name: &[u8], fold_case: bool) -> bool {
        if name.len() != self.len {
            return false;
        }
        let rest = &name[LEAD_BYTES..];
        match &self.suffix {
            Suffix::None => true,
            Suffix::Packed { count, key } => pack(rest, *count, fold_case) == *key,
            Suffix::Bytes(expected) => folded(rest, fold_case) == *expected,
        }
    }
}

/// One arm of the top-level dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch {
    /// A whole name of 0 to 3 bytes.
    Terminal { len: usize, key: u32, target: usize },
    /// Names of 4 or more bytes sharing a packed prefix.
    Group { key: u32, checks: Vec<Check> },
}

impl Branch {
    /// Arity half of the lead key this branch answers to.
    pub fn arity(&self) -> usize {
        match self {
            Self::Terminal { len, .. } => *len,
            Self::Group { .. } => LEAD_BYTES,
        }
    }

    pub fn key(&self) -> u32 {
        match self {
            Self::Terminal { key, .. } | Self::Group { key, .. } => *key,
        }
    }
}

/// Dispatch structure for one lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionTree {
    case_insensitive: bool,
    branches: Vec<Branch>,
}

impl DecisionTree {
    /// Build the dispatch for `table`.
    ///
    /// Entries arrive sorted, so names sharing a 4-byte prefix are adjacent
    /// and each group is consumed in one pass.
    pub fn build(table: &LookupTable) -> Self {
        let fold_case = table.case_insensitive();
        let entries = table.entries();
        let mut branches = Vec::new();

        let mut i = 0;
        while i < entries.len() {
            let name = entries[i].name.as_bytes();
            if name.len() < LEAD_BYTES {
                branches.push(Branch::Terminal {
                    len: name.len(),
                    key: pack(name, name.len(), fold_case),
                    target: i,
                });
                i += 1;
                continue;
            }

            let key = pack(name, LEAD_BYTES, fold_case);
            let mut checks = Vec::new();
            while let Some(entry) = entries.get(i) {
                let name = entry.name.as_bytes();
                if name.len() < LEAD_BYTES || pack(name, LEAD_BYTES, fold_case) != key {
                    break;
                }
                checks.push(Check::for_name(name, i, fold_case));
                i += 1;
            }
            branches.push(Branch::Group { key, checks });
        }

        let tree = Self {
            case_insensitive: fold_case,
            branches,
        };
        log::debug!(
            "decision tree {}: {} branches for {} entries, widest group {}",
            table.label(),
            tree.branches.len(),
            entries.len(),
            tree.max_group_len()
        );
        tree
    }

    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Top-level arms in emission order.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Index of the entry `name` resolves to, or `None` for the default.
    pub fn lookup(&self, name: &[u8]) -> Option<usize> {
        let (arity, key) = lead_key(name, self.case_insensitive);
        let branch = self
            .branches
            .iter()
            .find(|b| b.arity() == arity && b.key() == key)?;
        match branch {
            Branch::Terminal { target, .. } => Some(*target),
            Branch::Group { checks, .. } => checks
                .iter()
                .find(|c| c.matches(name, self.case_insensitive))
                .map(|c| c.target),
        }
    }

    /// Symbol `name` resolves to in `table`, falling back to its default.
    pub fn resolve<'t>(&self, table: &'t LookupTable, name: &[u8]) -> &'t str {
        match self.lookup(name) {
            Some(i) => &table.entries()[i].symbol,
            None => table.default_symbol(),
        }
    }

    /// Largest number of refinement checks behind a single lead key.
    pub fn max_group_len(&self) -> usize {
        self.branches
            .iter()
            .map(|b| match b {
                Branch::Terminal { .. } => 1,
                Branch::Group { checks, .. } => checks.len(),
            })
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolAssigner;

    fn tags(case_insensitive: bool) -> (LookupTable, DecisionTree) {
        let (table, _) = SymbolAssigner::new("Tag")
            .assign("HtmlTag", &["a", "br", "body", "blockquote"], case_insensitive)
            .unwrap();
        let tree = DecisionTree::build(&table);
        (table, tree)
    }

    #[test]
    fn example_scenarios() {
        let (table, tree) = tags(true);
        assert_eq!(tree.resolve(&table, b"a"), "Tag_A");
        assert_eq!(tree.resolve(&table, b"BR"), "Tag_Br");
        assert_eq!(tree.resolve(&table, b"body"), "Tag_Body");
        assert_eq!(tree.resolve(&table, b"blockquote"), "Tag_Blockquote");
        assert_eq!(tree.resolve(&table, b"bold"), "Tag_NotFound");
        assert_eq!(tree.resolve(&table, b"bo"), "Tag_NotFound");
    }

    #[test]
    fn shape_of_small_table() {
        let (_, tree) = tags(false);
        assert_eq!(
            tree.branches(),
            &[
                Branch::Terminal {
                    len: 1,
                    key: 0x61,
                    target: 0
                },
                Branch::Group {
                    key: pack(b"bloc", 4, false),
                    checks: vec![Check {
                        len: 10,
                        suffix: Suffix::Bytes(b"kquote".to_vec()),
                        target: 1
                    }]
                },
                Branch::Group {
                    key: pack(b"body", 4, false),
                    checks: vec![Check {
                        len: 4,
                        suffix: Suffix::None,
                        target: 2
                    }]
                },
                Branch::Terminal {
                    len: 2,
                    key: 0x7262,
                    target: 3
                },
            ]
        );
    }

    #[test]
    fn shared_prefix_forms_one_group() {
        let (table, _) = SymbolAssigner::new("Tag")
            .assign("T", &["base", "basefont", "baseline-shift"], false)
            .unwrap();
        let tree = DecisionTree::build(&table);
        assert_eq!(tree.branches().len(), 1);
        let Branch::Group { checks, .. } = &tree.branches()[0] else {
            panic!("expected a group");
        };
        assert_eq!(checks.len(), 3);
        assert_eq!(checks[0].suffix, Suffix::None);
        assert_eq!(
            checks[1].suffix,
            Suffix::Packed {
                count: 4,
                key: pack(b"font", 4, false)
            }
        );
        assert_eq!(checks[2].suffix, Suffix::Bytes(b"line-shift".to_vec()));
        assert_eq!(tree.max_group_len(), 3);
    }

    #[test]
    fn length_discriminates_prefixes() {
        let (table, _) = SymbolAssigner::new("X")
            .assign("T", &["sub", "subtitle", "pagebreak", "page"], true)
            .unwrap();
        let tree = DecisionTree::build(&table);
        assert_eq!(tree.resolve(&table, b"sub"), "X_Sub");
        assert_eq!(tree.resolve(&table, b"subtitle"), "X_Subtitle");
        assert_eq!(tree.resolve(&table, b"subt"), "X_NotFound");
        assert_eq!(tree.resolve(&table, b"page"), "X_Page");
        assert_eq!(tree.resolve(&table, b"pagebreak"), "X_Pagebreak");
        assert_eq!(tree.resolve(&table, b"pagebreaks"), "X_NotFound");
        assert_eq!(tree.resolve(&table, b"pagebrea"), "X_NotFound");
    }

    #[test]
    fn empty_name_is_its_own_branch() {
        let (table, _) = SymbolAssigner::new("X")
            .assign("T", &["", "a"], false)
            .unwrap();
        let tree = DecisionTree::build(&table);
        assert_eq!(tree.resolve(&table, b""), "X_");
        assert_eq!(tree.resolve(&table, b"a"), "X_A");
        assert_eq!(tree.resolve(&table, b"\0"), "X_NotFound");

        let (table, tree) = tags(true);
        assert_eq!(tree.resolve(&table, b""), "Tag_NotFound");
    }

    #[test]
    fn nul_bytes_do_not_alias_shorter_names() {
        let (table, tree) = tags(false);
        assert_eq!(tree.resolve(&table, b"a\0"), "Tag_NotFound");
        assert_eq!(tree.resolve(&table, b"br\0\0"), "Tag_NotFound");
    }

    #[test]
    fn case_sensitive_tables_do_not_fold() {
        let (table, tree) = tags(false);
        assert_eq!(tree.resolve(&table, b"BR"), "Tag_NotFound");
        assert_eq!(tree.resolve(&table, b"BlockQuote"), "Tag_NotFound");
        assert_eq!(tree.resolve(&table, b"blockquote"), "Tag_Blockquote");
    }

    #[test]
    fn case_insensitive_tables_fold_every_comparison() {
        let (table, tree) = tags(true);
        for spelling in [&b"BLOCKQUOTE"[..], b"BlockQuote", b"blockQUOTE"] {
            assert_eq!(tree.resolve(&table, spelling), "Tag_Blockquote");
        }
        assert_eq!(tree.resolve(&table, b"BoDy"), "Tag_Body");
    }

    #[test]
    fn mixed_case_spellings_group_together() {
        let (table, _) = SymbolAssigner::new("E")
            .assign("T", &["Abcdx", "abcdy", "ABCDZ"], true)
            .unwrap();
        let tree = DecisionTree::build(&table);
        assert_eq!(tree.branches().len(), 1);
        assert_eq!(tree.resolve(&table, b"abcdz"), "E_Abcdz");
        assert_eq!(tree.resolve(&table, b"ABCDX"), "E_Abcdx");
    }

    #[test]
    fn every_entry_resolves_to_itself() {
        let names = [
            "a", "abbr", "acronym", "area", "audio", "b", "base", "basefont", "blockquote",
            "body", "br", "center", "code", "col", "h1", "h2", "mbp:pagebreak", "pagebreak",
            "param", "pre", "s", "section", "small", "span", "strike", "strong", "style",
            "sub", "subtitle", "sup", "svg",
        ];
        let (table, _) = SymbolAssigner::new("Tag").assign("T", &names, true).unwrap();
        let tree = DecisionTree::build(&table);
        for (i, entry) in table.entries().iter().enumerate() {
            assert_eq!(tree.lookup(entry.name.as_bytes()), Some(i), "{}", entry.name);
            let upper = entry.name.to_ascii_uppercase();
            assert_eq!(tree.lookup(upper.as_bytes()), Some(i), "{}", upper);
        }
        assert_eq!(tree.lookup(b"strongest"), None);
        assert_eq!(tree.lookup(b"stron"), None);
    }
}
