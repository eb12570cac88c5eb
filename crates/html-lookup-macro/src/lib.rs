use proc_macro::TokenStream;
use proc_macro2::{Literal, Span, TokenStream as TokenStream2};
use quote::{format_ident, quote, ToTokens};
use std::collections::HashMap;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{braced, bracketed, Attribute, Expr, Ident, LitStr, Result, Token, Type, Visibility};

use proc_macro_crate::{crate_name, FoundCrate};

use html_lookup_build::key::LEAD_BYTES;
use html_lookup_build::selector::RESERVED_NAMES;
use html_lookup_build::{
    Branch, Check, DecisionTree, EnumTable, LookupError, Suffix, SymbolAssigner, ValueTable,
};

/// Table-level attributes: `#[case_insensitive]`, `#[prefix = ".."]`, `#[default = ".."]`.
#[derive(Default)]
struct TableAttrs {
    case_insensitive: bool,
    prefix: Option<LitStr>,
    default: Option<LitStr>,
    /// Everything else (doc comments, lints) is forwarded to the generated item.
    forward: Vec<Attribute>,
}

/// `pub enum HtmlTag { "a", "abbr", ... }`
struct EnumItem {
    attrs: TableAttrs,
    vis: Visibility,
    ident: Ident,
    names: Vec<LitStr>,
}

/// `impl HtmlTag { pub fn is_inline = ["a", "b"]; }`
struct SelectorsItem {
    ident: Ident,
    selectors: Vec<SelectorFn>,
}

struct SelectorFn {
    attrs: Vec<Attribute>,
    vis: Visibility,
    ident: Ident,
    members: Vec<LitStr>,
}

/// `pub fn find_color -> u32 { "black" => 0, _ => 1 }`
struct ValueItem {
    attrs: TableAttrs,
    vis: Visibility,
    ident: Ident,
    ty: Type,
    entries: Vec<(LitStr, Expr)>,
    default: Expr,
}

enum Item {
    Enum(EnumItem),
    Selectors(SelectorsItem),
    Value(ValueItem),
}

struct LookupInput {
    items: Vec<Item>,
}

impl Parse for LookupInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut items = Vec::new();
        while !input.is_empty() {
            items.push(input.parse()?);
        }
        Ok(Self { items })
    }
}

impl Parse for Item {
    fn parse(input: ParseStream) -> Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;

        if input.peek(Token![impl]) {
            if let Some(attr) = attrs.first() {
                return Err(syn::Error::new_spanned(
                    attr,
                    "attributes go on the selector functions, not the impl block",
                ));
            }
            input.parse::<Token![impl]>()?;
            let ident: Ident = input.parse()?;
            let content;
            braced!(content in input);
            let mut selectors = Vec::new();
            while !content.is_empty() {
                selectors.push(content.parse()?);
            }
            return Ok(Item::Selectors(SelectorsItem { ident, selectors }));
        }

        let attrs = parse_table_attrs(attrs)?;
        let vis: Visibility = input.parse()?;

        let lookahead = input.lookahead1();
        if lookahead.peek(Token![enum]) {
            input.parse::<Token![enum]>()?;
            let ident: Ident = input.parse()?;
            let content;
            braced!(content in input);
            let names = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?
                .into_iter()
                .collect();
            Ok(Item::Enum(EnumItem {
                attrs,
                vis,
                ident,
                names,
            }))
        } else if lookahead.peek(Token![fn]) {
            if let Some(lit) = attrs.prefix.as_ref().or(attrs.default.as_ref()) {
                return Err(syn::Error::new_spanned(
                    lit,
                    "#[prefix] and #[default] only apply to enums; value functions take `_ => <default>`",
                ));
            }
            input.parse::<Token![fn]>()?;
            let ident: Ident = input.parse()?;
            input.parse::<Token![->]>()?;
            let ty: Type = input.parse()?;
            let content;
            braced!(content in input);
            let (entries, default) = parse_value_arms(&content, &ident)?;
            Ok(Item::Value(ValueItem {
                attrs,
                vis,
                ident,
                ty,
                entries,
                default,
            }))
        } else {
            Err(lookahead.error())
        }
    }
}

impl Parse for SelectorFn {
    fn parse(input: ParseStream) -> Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis: Visibility = input.parse()?;
        input.parse::<Token![fn]>()?;
        let ident: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let content;
        bracketed!(content in input);
        let members = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?
            .into_iter()
            .collect();
        input.parse::<Token![;]>()?;
        Ok(Self {
            attrs,
            vis,
            ident,
            members,
        })
    }
}

/// Parse `"name" => expr,` arms terminated by a mandatory `_ => default`.
fn parse_value_arms(input: ParseStream, owner: &Ident) -> Result<(Vec<(LitStr, Expr)>, Expr)> {
    let mut entries = Vec::new();
    let mut default = None;

    while !input.is_empty() {
        if input.peek(Token![_]) {
            let underscore: Token![_] = input.parse()?;
            input.parse::<Token![=>]>()?;
            let expr: Expr = input.parse()?;
            if default.is_some() {
                return Err(syn::Error::new(underscore.span, "duplicate `_` arm"));
            }
            default = Some(expr);
        } else {
            let name: LitStr = input.parse()?;
            if default.is_some() {
                return Err(syn::Error::new(name.span(), "named arms must come before `_`"));
            }
            input.parse::<Token![=>]>()?;
            let expr: Expr = input.parse()?;
            entries.push((name, expr));
        }

        if input.is_empty() {
            break;
        }
        input.parse::<Token![,]>()?;
    }

    let default = default.ok_or_else(|| {
        syn::Error::new(owner.span(), "missing `_ => <default>` arm")
    })?;
    Ok((entries, default))
}

fn parse_table_attrs(attrs: Vec<Attribute>) -> Result<TableAttrs> {
    let mut result = TableAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("case_insensitive") {
            attr.meta.require_path_only()?;
            result.case_insensitive = true;
        } else if attr.path().is_ident("prefix") {
            result.prefix = Some(lit_str_value(&attr)?);
        } else if attr.path().is_ident("default") {
            result.default = Some(lit_str_value(&attr)?);
        } else {
            result.forward.push(attr);
        }
    }

    Ok(result)
}

fn lit_str_value(attr: &Attribute) -> Result<LitStr> {
    let nv = attr.meta.require_name_value()?;
    match &nv.value {
        Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(s),
            ..
        }) => Ok(s.clone()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

// =============================================================================
// Crate path resolution
// =============================================================================

fn runtime_crate_path() -> TokenStream2 {
    match crate_name("html-lookup") {
        Ok(FoundCrate::Itself) => {
            quote!(::html_lookup)
        }
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Err(_) => quote!(::html_lookup),
    }
}

// =============================================================================
// Code generation
// =============================================================================

/// Point a generation error at the literal that caused it.
fn lookup_error(err: LookupError, spans: &HashMap<String, Span>, fallback: Span) -> syn::Error {
    let culprit = match &err {
        LookupError::DuplicateName { name, .. }
        | LookupError::InvalidSymbol { name, .. }
        | LookupError::UnknownMember { name, .. } => name,
        LookupError::SymbolCollision { second, .. } => second,
    };
    let span = spans.get(culprit).copied().unwrap_or(fallback);
    syn::Error::new(span, err)
}

fn literal_spans<'a>(lits: impl IntoIterator<Item = &'a LitStr>) -> HashMap<String, Span> {
    lits.into_iter().map(|l| (l.value(), l.span())).collect()
}

/// `match lead_key(..) { .. }` over the tree; `targets[i]` is returned for entry `i`.
fn dispatch(tree: &DecisionTree, targets: &[TokenStream2], rt: &TokenStream2) -> TokenStream2 {
    let fold = tree.case_insensitive();
    let lead = Literal::usize_unsuffixed(LEAD_BYTES);

    let arms = tree.branches().iter().map(|branch| match branch {
        Branch::Terminal { len, key, target } => {
            let len = Literal::usize_unsuffixed(*len);
            let key = Literal::u32_unsuffixed(*key);
            let target = &targets[*target];
            quote! { (#len, #key) => return #target, }
        }
        Branch::Group { key, checks } => {
            let key = Literal::u32_unsuffixed(*key);
            let checks = checks.iter().map(|check| {
                let cond = condition(check, rt, fold);
                let target = &targets[check.target];
                quote! {
                    if #cond {
                        return #target;
                    }
                }
            });
            quote! { (#lead, #key) => { #(#checks)* } }
        }
    });

    quote! {
        match #rt::key::lead_key(name, #fold) {
            #(#arms)*
            _ => {}
        }
    }
}

fn condition(check: &Check, rt: &TokenStream2, fold: bool) -> TokenStream2 {
    let len = Literal::usize_unsuffixed(check.len);
    let start = Literal::usize_unsuffixed(LEAD_BYTES);
    match &check.suffix {
        Suffix::None => quote! { name.len() == #len },
        Suffix::Packed { count, key } => {
            let count = Literal::usize_unsuffixed(*count);
            let key = Literal::u32_unsuffixed(*key);
            quote! { name.len() == #len && #rt::key::pack(&name[#start..], #count, #fold) == #key }
        }
        Suffix::Bytes(bytes) => {
            let expected = Literal::byte_string(bytes);
            quote! { name.len() == #len && #rt::key::suffix_eq(&name[#start..], #expected, #fold) }
        }
    }
}

fn generate_enum(item: &EnumItem, table: &EnumTable, rt: &TokenStream2) -> TokenStream2 {
    let forward = &item.attrs.forward;
    let vis = &item.vis;
    let ident = &item.ident;

    let variants: Vec<Ident> = table
        .enumeration
        .symbols
        .iter()
        .map(|s| format_ident!("{}", s))
        .collect();
    let count = variants.len();
    let default = format_ident!("{}", table.enumeration.default_symbol());

    let entry_variants: Vec<Ident> = table
        .table
        .entries()
        .iter()
        .map(|e| format_ident!("{}", e.symbol))
        .collect();
    let entry_names: Vec<&str> = table
        .table
        .entries()
        .iter()
        .map(|e| e.name.as_str())
        .collect();

    let targets: Vec<TokenStream2> = entry_variants
        .iter()
        .map(|v| quote!(Self::#v))
        .collect();
    let find_body = dispatch(&table.tree, &targets, rt);

    let default_doc = format!(" Every variant in declaration order, `{}` last.", default);
    let find_doc = format!(" Classify `name`; unregistered names give `{}`.", default);

    quote! {
        #(#forward)*
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #vis enum #ident {
            #(#variants),*
        }

        impl #ident {
            #[doc = #default_doc]
            pub const ALL: [Self; #count] = [#(Self::#variants),*];

            /// Number of variants, including the "not found" sentinel.
            pub const COUNT: usize = #count;

            #[doc = #find_doc]
            pub fn find(name: &[u8]) -> Self {
                #find_body
                Self::#default
            }

            /// Registered spelling, `None` for the "not found" sentinel.
            pub fn name(self) -> Option<&'static str> {
                match self {
                    #(Self::#entry_variants => Some(#entry_names),)*
                    Self::#default => None,
                }
            }
        }
    }
}

fn generate_selectors(item: &SelectorsItem, table: &EnumTable) -> Result<TokenStream2> {
    let ident = &item.ident;
    let mut fns = Vec::new();

    for selector_fn in &item.selectors {
        if RESERVED_NAMES.iter().any(|name| selector_fn.ident == *name) {
            return Err(syn::Error::new(
                selector_fn.ident.span(),
                format!(
                    "selector `{}` clashes with an item generated for `{}`",
                    selector_fn.ident, ident
                ),
            ));
        }
        let spans = literal_spans(&selector_fn.members);
        let members: Vec<String> = selector_fn.members.iter().map(LitStr::value).collect();
        let name = selector_fn.ident.to_string();
        let selector = html_lookup_build::Selector::build(
            name,
            &table.table,
            &table.enumeration,
            members.as_slice(),
        )
        .map_err(|e| lookup_error(e, &spans, selector_fn.ident.span()))?;

        let attrs = &selector_fn.attrs;
        let vis = &selector_fn.vis;
        let fn_ident = &selector_fn.ident;
        let included: Vec<Ident> = selector
            .included
            .iter()
            .map(|s| format_ident!("{}", s))
            .collect();
        let body = if included.is_empty() {
            quote!(false)
        } else {
            quote!(matches!(self, #(Self::#included)|*))
        };

        fns.push(quote! {
            #(#attrs)*
            #vis fn #fn_ident(self) -> bool {
                #body
            }
        });
    }

    Ok(quote! {
        impl #ident {
            #(#fns)*
        }
    })
}

fn generate_value(item: &ValueItem, rt: &TokenStream2) -> Result<TokenStream2> {
    let spans = literal_spans(item.entries.iter().map(|(name, _)| name));
    let exprs: HashMap<String, &Expr> = item
        .entries
        .iter()
        .map(|(name, expr)| (name.value(), expr))
        .collect();
    let entries = item
        .entries
        .iter()
        .map(|(name, expr)| (name.value(), expr.to_token_stream().to_string()))
        .collect();

    let default = &item.default;
    let table = ValueTable::build(
        &item.ident.to_string(),
        &item.ty.to_token_stream().to_string(),
        &default.to_token_stream().to_string(),
        entries,
        item.attrs.case_insensitive,
    )
    .map_err(|e| lookup_error(e, &spans, item.ident.span()))?;

    let targets: Vec<TokenStream2> = table
        .table
        .entries()
        .iter()
        .map(|e| exprs[&e.name].to_token_stream())
        .collect();
    let body = dispatch(&table.tree, &targets, rt);

    let forward = &item.attrs.forward;
    let vis = &item.vis;
    let ident = &item.ident;
    let ty = &item.ty;

    Ok(quote! {
        #(#forward)*
        #vis fn #ident(name: &[u8]) -> #ty {
            #body
            #default
        }
    })
}

fn expand(input: LookupInput, rt: &TokenStream2) -> Result<TokenStream2> {
    let mut tables: HashMap<String, EnumTable> = HashMap::new();
    let mut output = Vec::new();

    for item in &input.items {
        match item {
            Item::Enum(item) => {
                let prefix = item.attrs.prefix.as_ref().ok_or_else(|| {
                    syn::Error::new(item.ident.span(), "missing #[prefix = \"...\"] attribute")
                })?;
                let mut assigner = SymbolAssigner::new(prefix.value());
                if let Some(default) = &item.attrs.default {
                    assigner = assigner.with_default_name(default.value());
                }

                let spans = literal_spans(&item.names);
                let names: Vec<String> = item.names.iter().map(LitStr::value).collect();
                let table = EnumTable::build(
                    &item.ident.to_string(),
                    &assigner,
                    names.as_slice(),
                    item.attrs.case_insensitive,
                )
                .map_err(|e| lookup_error(e, &spans, item.ident.span()))?;

                output.push(generate_enum(item, &table, rt));
                tables.insert(item.ident.to_string(), table);
            }
            Item::Selectors(item) => {
                let table = tables.get(&item.ident.to_string()).ok_or_else(|| {
                    syn::Error::new(
                        item.ident.span(),
                        format!("no lookup enum named `{}` defined above", item.ident),
                    )
                })?;
                output.push(generate_selectors(item, table)?);
            }
            Item::Value(item) => {
                output.push(generate_value(item, rt)?);
            }
        }
    }

    Ok(quote! { #(#output)* })
}

// =============================================================================
// Entry point
// =============================================================================

/// Define lookup enums, subset predicates and value finders inline.
///
/// ```ignore
/// lookup_table! {
///     /// Alignment keywords.
///     #[case_insensitive]
///     #[prefix = "Align"]
///     pub enum AlignAttr {
///         "left", "right", "center", "justify",
///     }
///
///     impl AlignAttr {
///         pub fn is_horizontal_edge = ["left", "right"];
///     }
///
///     pub fn find_entity -> u32 {
///         "amp" => 38,
///         "lt" => 60,
///         _ => u32::MAX,
///     }
/// }
///
/// assert_eq!(AlignAttr::find(b"LEFT"), AlignAttr::Align_Left);
/// assert_eq!(find_entity(b"lt"), 60);
/// ```
#[proc_macro]
pub fn lookup_table(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as LookupInput);
    let rt = runtime_crate_path();

    expand(input, &rt)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
