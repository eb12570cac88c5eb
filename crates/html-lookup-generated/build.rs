use std::path::PathBuf;

fn main() {
    let out = PathBuf::from(std::env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));

    html_lookup_build::generate("lookup.toml", out.join("lookup.rs"))
        .expect("Failed to generate lookup tables");
    html_lookup_build::generate_pair(
        "lookup.toml",
        out.join("lookup_decl.rs"),
        out.join("lookup_impl.rs"),
    )
    .expect("Failed to generate paired lookup tables");
}
