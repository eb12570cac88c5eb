//! Rust source emission.
//!
//! Walks the built [`Vocabulary`] and writes two surfaces: declarations
//! (the enumerations) and definitions (finders, selectors and value
//! functions). Output depends only on the vocabulary, so regenerating from
//! the same input is byte-identical.

use std::fmt::Write;

use crate::key::{folded, LEAD_BYTES};
use crate::symbol::ROW_WIDTH;
use crate::table::LookupTable;
use crate::tree::{Branch, Check, DecisionTree, Suffix};
use crate::vocabulary::{EnumTable, ValueTable, Vocabulary};

const HEADER: &str = "// @generated by html-lookup-build. Do not edit.\n";

/// Selector cases per line.
const CASES_PER_LINE: usize = 4;

/// Rendered source for one vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub declarations: String,
    pub definitions: String,
}

impl Rendered {
    /// Both surfaces in one file.
    pub fn combined(&self) -> String {
        let mut code = self.declarations.clone();
        code.push('\n');
        code.push_str(self.definitions.trim_start_matches(HEADER));
        code
    }
}

/// Render declarations and definitions for `vocab`.
pub fn render(vocab: &Vocabulary) -> Rendered {
    let mut declarations = String::from(HEADER);
    for table in &vocab.enums {
        declarations.push('\n');
        declarations.push_str(&enum_declaration(table));
    }

    let mut definitions = String::from(HEADER);
    for table in &vocab.enums {
        definitions.push('\n');
        definitions.push_str(&enum_definition(table, &vocab.runtime_path));
    }
    for table in &vocab.values {
        definitions.push('\n');
        definitions.push_str(&value_definition(table, &vocab.runtime_path));
    }

    Rendered {
        declarations,
        definitions,
    }
}

fn doc_lines(code: &mut String, doc: Option<&str>, indent: &str) {
    for line in doc.into_iter().flat_map(str::lines) {
        if line.is_empty() {
            writeln!(code, "{}///", indent).unwrap();
        } else {
            writeln!(code, "{}/// {}", indent, line).unwrap();
        }
    }
}

/// `pub enum` with variants in fixed-width rows.
pub fn enum_declaration(table: &EnumTable) -> String {
    let mut code = String::new();
    doc_lines(&mut code, table.doc.as_deref(), "");
    writeln!(code, "#[allow(non_camel_case_types)]").unwrap();
    writeln!(
        code,
        "#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]"
    )
    .unwrap();
    writeln!(code, "pub enum {} {{", table.type_name).unwrap();
    for row in table.enumeration.rows(ROW_WIDTH) {
        writeln!(code, "    {},", row.join(", ")).unwrap();
    }
    writeln!(code, "}}").unwrap();
    code
}

/// `impl` block with `ALL`, `COUNT`, `find`, `name` and the selectors.
pub fn enum_definition(table: &EnumTable, runtime: &str) -> String {
    let enumeration = &table.enumeration;
    let default = enumeration.default_symbol();
    let count = enumeration.len();

    let mut code = String::new();
    writeln!(code, "impl {} {{", table.type_name).unwrap();

    writeln!(
        code,
        "    /// Every variant in declaration order, `{}` last.",
        default
    )
    .unwrap();
    writeln!(code, "    pub const ALL: [Self; {}] = [", count).unwrap();
    for row in enumeration.rows(ROW_WIDTH) {
        let row: Vec<String> = row.iter().map(|s| format!("Self::{}", s)).collect();
        writeln!(code, "        {},", row.join(", ")).unwrap();
    }
    writeln!(code, "    ];").unwrap();
    writeln!(code).unwrap();

    writeln!(code, "    /// Number of variants, including `{}`.", default).unwrap();
    writeln!(code, "    pub const COUNT: usize = {};", count).unwrap();
    writeln!(code).unwrap();

    writeln!(
        code,
        "    /// Classify `name`; unregistered names give `{}`.",
        default
    )
    .unwrap();
    writeln!(code, "    pub fn find(name: &[u8]) -> Self {{").unwrap();
    let targets: Vec<String> = table
        .table
        .entries()
        .iter()
        .map(|e| format!("Self::{}", e.symbol))
        .collect();
    dispatch(&mut code, &table.tree, &table.table, &targets, runtime, "        ");
    writeln!(code, "        Self::{}", default).unwrap();
    writeln!(code, "    }}").unwrap();
    writeln!(code).unwrap();

    writeln!(code, "    /// Registered spelling, `None` for `{}`.", default).unwrap();
    writeln!(code, "    pub fn name(self) -> Option<&'static str> {{").unwrap();
    writeln!(code, "        match self {{").unwrap();
    for entry in table.table.entries() {
        writeln!(
            code,
            "            Self::{} => Some({:?}),",
            entry.symbol, entry.name
        )
        .unwrap();
    }
    writeln!(code, "            Self::{} => None,", default).unwrap();
    writeln!(code, "        }}").unwrap();
    writeln!(code, "    }}").unwrap();

    for selector in &table.selectors {
        writeln!(code).unwrap();
        writeln!(code, "    pub fn {}(self) -> bool {{", selector.name).unwrap();
        if selector.included.is_empty() {
            writeln!(code, "        false").unwrap();
        } else {
            writeln!(code, "        matches!(").unwrap();
            writeln!(code, "            self,").unwrap();
            for (i, cases) in selector.included.chunks(CASES_PER_LINE).enumerate() {
                let cases: Vec<String> = cases.iter().map(|s| format!("Self::{}", s)).collect();
                let lead = if i == 0 { "" } else { "| " };
                writeln!(code, "            {}{}", lead, cases.join(" | ")).unwrap();
            }
            writeln!(code, "        )").unwrap();
        }
        writeln!(code, "    }}").unwrap();
    }

    writeln!(code, "}}").unwrap();
    code
}

/// Free function returning the table's value expressions.
pub fn value_definition(table: &ValueTable, runtime: &str) -> String {
    let mut code = String::new();
    doc_lines(&mut code, table.doc.as_deref(), "");
    writeln!(
        code,
        "pub fn {}(name: &[u8]) -> {} {{",
        table.fn_name, table.value_type
    )
    .unwrap();
    let targets: Vec<String> = table
        .table
        .entries()
        .iter()
        .map(|e| e.symbol.clone())
        .collect();
    dispatch(&mut code, &table.tree, &table.table, &targets, runtime, "    ");
    writeln!(code, "    {}", table.table.default_symbol()).unwrap();
    writeln!(code, "}}").unwrap();
    code
}

/// Emit the `match` on the lead key. `targets[i]` is the expression for entry `i`.
fn dispatch(
    code: &mut String,
    tree: &DecisionTree,
    table: &LookupTable,
    targets: &[String],
    runtime: &str,
    indent: &str,
) {
    let fold = tree.case_insensitive();
    writeln!(
        code,
        "{}match {}::key::lead_key(name, {}) {{",
        indent, runtime, fold
    )
    .unwrap();

    for branch in tree.branches() {
        match branch {
            Branch::Terminal { len, key, target } => {
                writeln!(
                    code,
                    "{}    ({}, 0x{:08x}) => return {}, {}",
                    indent,
                    len,
                    key,
                    targets[*target],
                    spelled(table, *target, fold)
                )
                .unwrap();
            }
            Branch::Group { key, checks } => {
                let spelling = match checks.first() {
                    Some(check) => spelled(table, check.target, fold),
                    None => String::new(),
                };
                writeln!(
                    code,
                    "{}    ({}, 0x{:08x}) => {{ {}",
                    indent, LEAD_BYTES, key, spelling
                )
                .unwrap();
                for check in checks {
                    writeln!(
                        code,
                        "{}        if {} {{",
                        indent,
                        condition(check, runtime, fold)
                    )
                    .unwrap();
                    writeln!(code, "{}            return {};", indent, targets[check.target]).unwrap();
                    writeln!(code, "{}        }}", indent).unwrap();
                }
                writeln!(code, "{}    }}", indent).unwrap();
            }
        }
    }

    writeln!(code, "{}    _ => {{}}", indent).unwrap();
    writeln!(code, "{}}}", indent).unwrap();
}

/// `// "bloc"`: the lead bytes of entry `target` as they are packed.
fn spelled(table: &LookupTable, target: usize, fold: bool) -> String {
    let name = table.entries()[target].name.as_bytes();
    let lead = folded(&name[..name.len().min(LEAD_BYTES)], fold);
    format!("// \"{}\"", lead.escape_ascii())
}

fn condition(check: &Check, runtime: &str, fold: bool) -> String {
    let len = format!("name.len() == {}", check.len);
    match &check.suffix {
        Suffix::None => len,
        Suffix::Packed { count, key } => format!(
            "{} && {}::key::pack(&name[{}..], {}, {}) == 0x{:08x}",
            len, runtime, LEAD_BYTES, count, fold, key
        ),
        Suffix::Bytes(bytes) => format!(
            "{} && {}::key::suffix_eq(&name[{}..], b\"{}\", {})",
            len,
            runtime,
            LEAD_BYTES,
            bytes.escape_ascii(),
            fold
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolAssigner;

    fn vocab() -> Vocabulary {
        let mut tags = EnumTable::build(
            "HtmlTag",
            &SymbolAssigner::new("Tag"),
            &["a", "br", "body", "blockquote"],
            true,
        )
        .unwrap()
        .with_doc("Known tags.");
        tags.add_selector("is_self_closing", &["br"]).unwrap();

        let entities = ValueTable::build(
            "find_entity",
            "u32",
            "u32::MAX",
            vec![("lt".into(), "60".into()), ("quot".into(), "34".into())],
            false,
        )
        .unwrap();

        Vocabulary {
            enums: vec![tags],
            values: vec![entities],
            ..Vocabulary::default()
        }
    }

    #[test]
    fn declaration_lists_variants_in_rows() {
        let code = render(&vocab()).declarations;
        assert!(code.starts_with(HEADER));
        assert!(code.contains("/// Known tags.\n#[allow(non_camel_case_types)]"));
        assert!(code.contains("pub enum HtmlTag {\n    Tag_A, Tag_Blockquote, Tag_Body, Tag_Br, Tag_NotFound,\n}"));
    }

    #[test]
    fn finder_dispatches_on_lead_key() {
        let code = render(&vocab()).definitions;
        assert!(code.contains("match ::html_lookup::key::lead_key(name, true) {"));
        assert!(code.contains("(1, 0x00000061) => return Self::Tag_A, // \"a\"\n"));
        assert!(code.contains("(2, 0x00007262) => return Self::Tag_Br, // \"br\"\n"));
        assert!(code.contains("(4, 0x79646f62) => { // \"body\"\n                if name.len() == 4 {"));
        assert!(code.contains("(4, 0x636f6c62) => { // \"bloc\"\n"));
        assert!(code.contains(
            "if name.len() == 10 && ::html_lookup::key::suffix_eq(&name[4..], b\"kquote\", true) {"
        ));
        assert!(code.contains("        Self::Tag_NotFound\n    }"));
    }

    #[test]
    fn selector_and_name_bodies() {
        let code = render(&vocab()).definitions;
        assert!(code.contains("pub fn is_self_closing(self) -> bool {\n        matches!(\n            self,\n            Self::Tag_Br\n        )"));
        assert!(code.contains("Self::Tag_Blockquote => Some(\"blockquote\"),"));
        assert!(code.contains("Self::Tag_NotFound => None,"));
        assert!(code.contains("pub const COUNT: usize = 5;"));
    }

    #[test]
    fn value_function_is_case_sensitive() {
        let code = render(&vocab()).definitions;
        assert!(code.contains("pub fn find_entity(name: &[u8]) -> u32 {"));
        assert!(code.contains("match ::html_lookup::key::lead_key(name, false) {"));
        assert!(code.contains("(2, 0x0000746c) => return 60,"));
        assert!(code.contains(
            "(4, 0x746f7571) => { // \"quot\"\n            if name.len() == 4 {\n                return 34;"
        ));
        assert!(code.ends_with("    u32::MAX\n}\n"));
    }

    #[test]
    fn packed_suffix_condition() {
        let table = EnumTable::build("T", &SymbolAssigner::new("T"), &["basefont"], false).unwrap();
        let code = enum_definition(&table, "crate");
        assert!(code.contains(
            "if name.len() == 8 && crate::key::pack(&name[4..], 4, false) == 0x746e6f66 {"
        ));
    }

    #[test]
    fn suffix_bytes_are_escaped() {
        let table = ValueTable::build(
            "f",
            "u8",
            "0",
            vec![("quote\"d\\x".into(), "1".into())],
            false,
        )
        .unwrap();
        let code = value_definition(&table, "crate");
        assert!(code.contains("b\"e\\\"d\\\\x\""), "{}", code);
    }

    #[test]
    fn arm_comments_spell_folded_lead_bytes() {
        let table = ValueTable::build(
            "f",
            "u8",
            "0",
            vec![("Q\"".into(), "1".into()), ("It's\nX".into(), "2".into())],
            true,
        )
        .unwrap();
        let code = value_definition(&table, "crate");
        assert!(code.contains("=> return 1, // \"q\\\"\"\n"), "{}", code);
        assert!(code.contains("=> { // \"it\\'s\"\n"), "{}", code);
    }

    #[test]
    fn many_selector_cases_wrap() {
        let names = ["a", "b", "c", "d", "e", "f"];
        let mut table = EnumTable::build("T", &SymbolAssigner::new("T"), &names, false).unwrap();
        table.add_selector("is_any", &names).unwrap();
        let code = enum_definition(&table, "crate");
        assert!(code.contains("            Self::T_A | Self::T_B | Self::T_C | Self::T_D\n            | Self::T_E | Self::T_F\n"));
    }

    #[test]
    fn empty_selector_is_false() {
        let mut table = EnumTable::build("T", &SymbolAssigner::new("T"), &["a"], false).unwrap();
        let none: [&str; 0] = [];
        table.add_selector("is_none", &none).unwrap();
        let code = enum_definition(&table, "crate");
        assert!(code.contains("pub fn is_none(self) -> bool {\n        false\n    }"));
    }

    #[test]
    fn combined_has_single_header() {
        let rendered = render(&vocab());
        let combined = rendered.combined();
        assert_eq!(combined.matches("@generated").count(), 1);
        assert!(combined.find("pub enum HtmlTag").unwrap() < combined.find("impl HtmlTag").unwrap());
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(render(&vocab()), render(&vocab()));
    }
}
