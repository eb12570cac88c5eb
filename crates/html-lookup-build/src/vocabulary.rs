//! Fully built vocabularies, ready for emission.

use crate::selector::Selector;
use crate::symbol::{Enumeration, SymbolAssigner};
use crate::table::{LookupError, LookupTable, NamedConstant};
use crate::toml_parser::{EnumConfig, ValueConfig, VocabularyConfig};
use crate::tree::DecisionTree;

/// Default path of the runtime crate in generated code.
pub const RUNTIME_PATH: &str = "::html_lookup";

/// A name → enumeration table with its selectors.
#[derive(Debug, Clone)]
pub struct EnumTable {
    pub type_name: String,
    pub doc: Option<String>,
    pub table: LookupTable,
    pub enumeration: Enumeration,
    pub tree: DecisionTree,
    pub selectors: Vec<Selector>,
}

impl EnumTable {
    pub fn build<S: AsRef<str>>(
        type_name: &str,
        assigner: &SymbolAssigner,
        names: &[S],
        case_insensitive: bool,
    ) -> Result<Self, LookupError> {
        let (table, enumeration) = assigner.assign(type_name, names, case_insensitive)?;
        let tree = DecisionTree::build(&table);
        Ok(Self {
            type_name: type_name.to_string(),
            doc: None,
            table,
            enumeration,
            tree,
            selectors: Vec::new(),
        })
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Add a subset predicate named `fn_name`.
    pub fn add_selector<S: AsRef<str>>(
        &mut self,
        fn_name: &str,
        members: &[S],
    ) -> Result<&Selector, LookupError> {
        let selector = Selector::build(fn_name, &self.table, &self.enumeration, members)?;
        self.selectors.push(selector);
        Ok(&self.selectors[self.selectors.len() - 1])
    }

    /// Generation-time evaluation of the generated `find`.
    pub fn find(&self, name: &[u8]) -> &str {
        self.tree.resolve(&self.table, name)
    }
}

/// A name → value table rendered as a free function.
#[derive(Debug, Clone)]
pub struct ValueTable {
    pub fn_name: String,
    pub value_type: String,
    pub doc: Option<String>,
    pub table: LookupTable,
    pub tree: DecisionTree,
}

impl ValueTable {
    /// `entries` pairs each name with the Rust expression it returns.
    pub fn build(
        fn_name: &str,
        value_type: &str,
        default_value: &str,
        entries: Vec<(String, String)>,
        case_insensitive: bool,
    ) -> Result<Self, LookupError> {
        let entries = entries
            .into_iter()
            .map(|(name, value)| NamedConstant::new(name, value))
            .collect();
        let table = LookupTable::new(fn_name, entries, default_value, case_insensitive)?;
        let tree = DecisionTree::build(&table);
        Ok(Self {
            fn_name: fn_name.to_string(),
            value_type: value_type.to_string(),
            doc: None,
            table,
            tree,
        })
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Generation-time evaluation of the generated function.
    pub fn find(&self, name: &[u8]) -> &str {
        self.tree.resolve(&self.table, name)
    }
}

/// Every table of one generation run.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub runtime_path: String,
    pub enums: Vec<EnumTable>,
    pub values: Vec<ValueTable>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            runtime_path: RUNTIME_PATH.to_string(),
            enums: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl Vocabulary {
    /// Build all tables described by `config`.
    pub fn from_config(config: &VocabularyConfig) -> Result<Self, LookupError> {
        let enums = config
            .enums
            .iter()
            .map(build_enum)
            .collect::<Result<Vec<_>, _>>()?;
        let values = config
            .values
            .iter()
            .map(build_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            runtime_path: config.runtime_path.clone(),
            enums,
            values,
        })
    }

    pub fn enum_table(&self, type_name: &str) -> Option<&EnumTable> {
        self.enums.iter().find(|e| e.type_name == type_name)
    }

    pub fn value_table(&self, fn_name: &str) -> Option<&ValueTable> {
        self.values.iter().find(|v| v.fn_name == fn_name)
    }
}

fn build_enum(config: &EnumConfig) -> Result<EnumTable, LookupError> {
    let assigner = SymbolAssigner::new(&config.prefix).with_default_name(&config.default);
    let mut table = EnumTable::build(
        &config.name,
        &assigner,
        config.names.as_slice(),
        config.case_insensitive,
    )?;
    table.doc = config.doc.clone();
    for (fn_name, members) in &config.selectors {
        table.add_selector(fn_name, members.as_slice())?;
    }
    Ok(table)
}

fn build_value(config: &ValueConfig) -> Result<ValueTable, LookupError> {
    let entries = config
        .entries
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    let mut table = ValueTable::build(
        &config.name,
        &config.value_type,
        &config.default,
        entries,
        config.case_insensitive,
    )?;
    table.doc = config.doc.clone();
    Ok(table)
}
