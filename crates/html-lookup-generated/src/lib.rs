//! Tables rendered from `lookup.toml` by the build script.
//!
//! The crate root holds the single-file output of
//! `html_lookup_build::generate`; [`paired`] holds the same vocabulary
//! split into declaration and definition files by `generate_pair`.

include!(concat!(env!("OUT_DIR"), "/lookup.rs"));

pub mod paired {
    include!(concat!(env!("OUT_DIR"), "/lookup_decl.rs"));
    include!(concat!(env!("OUT_DIR"), "/lookup_impl.rs"));
}
