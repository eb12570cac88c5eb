//! Run the code `html-lookup-build` rendered from `lookup.toml`.

use html_lookup_build::{Vocabulary, VocabularyConfig};
use html_lookup_generated::{find_color, find_entity, paired, AlignAttr, HtmlTag};

fn vocabulary() -> Vocabulary {
    let config =
        VocabularyConfig::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/lookup.toml")).unwrap();
    Vocabulary::from_config(&config).unwrap()
}

#[test]
fn test_every_tag_resolves_in_any_case() {
    assert_eq!(HtmlTag::COUNT, 67);
    for tag in HtmlTag::ALL {
        let Some(name) = tag.name() else {
            assert_eq!(tag, HtmlTag::Tag_NotFound);
            continue;
        };
        assert_eq!(HtmlTag::find(name.as_bytes()), tag, "{}", name);
        assert_eq!(HtmlTag::find(name.to_uppercase().as_bytes()), tag, "{}", name);
    }
}

#[test]
fn test_near_misses_fall_back() {
    let misses = [
        &b""[..],
        b"bold",
        b"bo",
        b"h7",
        b"mbp:",
        b"mbp:pagebreaks",
        b"pagebrea",
        b"subt",
        b"subtitles",
        b"blockquot",
        b"tablex",
        b"b\0",
    ];
    for miss in misses {
        assert_eq!(HtmlTag::find(miss), HtmlTag::Tag_NotFound, "{:?}", miss);
    }
    assert_eq!(AlignAttr::find(b"LEFT"), AlignAttr::Align_Unknown);
    assert_eq!(AlignAttr::find(b"justify"), AlignAttr::Align_Justify);
}

#[test]
fn test_selectors_match_configured_subsets() {
    let vocab = vocabulary();
    let tags = vocab.enum_table("HtmlTag").unwrap();
    for selector in &tags.selectors {
        for tag in HtmlTag::ALL {
            let expected = selector.contains(&format!("{:?}", tag));
            let actual = match selector.name.as_str() {
                "is_self_closing" => tag.is_self_closing(),
                "is_inline" => tag.is_inline(),
                other => panic!("unexpected selector {}", other),
            };
            assert_eq!(actual, expected, "{}({:?})", selector.name, tag);
        }
    }
    assert!(HtmlTag::Tag_Mbp_Pagebreak.is_self_closing());
    assert!(!HtmlTag::Tag_NotFound.is_inline());
}

#[test]
fn test_value_functions() {
    assert_eq!(find_entity(b"amp"), 38);
    assert_eq!(find_entity(b"quo'te"), 1);
    assert_eq!(find_entity(b"back\\slash"), 2);
    assert_eq!(find_entity(b"Prime"), 8243);
    assert_eq!(find_entity(b"prime"), 8242);
    assert_eq!(find_entity(b"PRIME"), u32::MAX);
    assert_eq!(find_entity(b"theta"), 952);
    assert_eq!(find_entity(b"thetasym"), 977);
    assert_eq!(find_entity(b"thetasy"), u32::MAX);
    assert_eq!(find_entity(b"mediumspace"), 8287);
    assert_eq!(find_entity(b"mediumspacer"), u32::MAX);

    assert_eq!(find_color(b"Black"), 0xFF00_0000);
    assert_eq!(find_color(b"YELLOW"), 0xFFFF_FF00);
    assert_eq!(find_color(b"purple"), 0);
}

#[test]
fn test_generated_code_agrees_with_build_side_tree() {
    let vocab = vocabulary();
    let tags = vocab.enum_table("HtmlTag").unwrap();
    let entities = vocab.value_table("find_entity").unwrap();

    let probes = tags
        .table
        .entries()
        .iter()
        .chain(entities.table.entries())
        .flat_map(|e| [e.name.clone(), e.name.to_uppercase(), format!("{}x", e.name)])
        .chain(["", "x", "head", "heads"].map(String::from));
    for probe in probes {
        let bytes = probe.as_bytes();
        assert_eq!(format!("{:?}", HtmlTag::find(bytes)), tags.find(bytes), "{}", probe);
        let expected = match entities.find(bytes) {
            "u32::MAX" => u32::MAX,
            value => value.parse().unwrap(),
        };
        assert_eq!(find_entity(bytes), expected, "{}", probe);
    }
}

#[test]
fn test_paired_output_matches_single_file() {
    for tag in HtmlTag::ALL {
        let name = tag.name();
        let twin = paired::HtmlTag::ALL[tag as usize];
        assert_eq!(twin.name(), name);
        if let Some(name) = name {
            assert_eq!(paired::HtmlTag::find(name.as_bytes()), twin);
        }
        assert_eq!(twin.is_inline(), tag.is_inline());
    }
    assert_eq!(paired::find_entity(b"thetasym"), find_entity(b"thetasym"));
}

#[test]
fn test_agrees_with_macro_tables() {
    use html_lookup::html;

    for (tag, twin) in HtmlTag::ALL.into_iter().zip(html::HtmlTag::ALL) {
        assert_eq!(tag.name(), twin.name());
        assert_eq!(tag.is_self_closing(), twin.is_self_closing());
        assert_eq!(tag.is_inline(), twin.is_inline());
    }
}
