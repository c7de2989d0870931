//! Generates the Sea parse tables from `grammar.json` and compiles them.
//!
//! The generated `parser.c` never lands in the source tree; it is written to
//! `OUT_DIR` together with the `tree_sitter/parser.h` header it includes.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

const GRAMMAR_PATH: &str = "grammar.json";

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed={GRAMMAR_PATH}");
    println!("cargo:rerun-if-changed=build.rs");

    let grammar_json = fs::read_to_string(GRAMMAR_PATH)?;
    let (name, parser_c) = tree_sitter_generate::generate_parser_for_grammar(&grammar_json)
        .map_err(|e| format!("failed to generate the {GRAMMAR_PATH} parser: {e}"))?;
    if name != "sea" {
        return Err(format!("{GRAMMAR_PATH} declares grammar `{name}`, expected `sea`").into());
    }

    let src_dir = PathBuf::from(std::env::var("OUT_DIR")?).join("src");
    let header_dir = src_dir.join("tree_sitter");
    fs::create_dir_all(&header_dir)?;
    fs::write(header_dir.join("parser.h"), tree_sitter::PARSER_HEADER)?;

    let parser_path = src_dir.join("parser.c");
    fs::write(&parser_path, parser_c)?;

    let mut c_config = cc::Build::new();
    c_config
        .std("c11")
        .include(&src_dir)
        .flag_if_supported("-Wno-unused-parameter")
        .flag_if_supported("-Wno-unused-but-set-variable")
        .flag_if_supported("-Wno-trigraphs");
    #[cfg(target_env = "msvc")]
    c_config.flag("-utf-8");

    c_config.file(&parser_path);
    c_config.compile("tree-sitter-sea");

    Ok(())
}
