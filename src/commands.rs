use crate::{OutputMode, emit_success};
use anyhow::Context;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tabled::{Table, Tabled, settings::Style};
use tree_sitter::{Language, Query};
use tree_sitter_sea::batch::{self, BatchReport};
use tree_sitter_sea::ui::{self, Icons, dim, header, info, section, stats_table, success, theme};
use tree_sitter_sea::{
    HIGHLIGHTS_QUERY, LOAD_ERROR_MESSAGE, LoadedGrammar, Outline, SeaConfig, SeaParser, TAGS_QUERY,
    load_language, load_language_from_library,
};

/// The grammar a command runs with
enum Grammar {
    Builtin(Language),
    Library(LoadedGrammar),
}

impl Grammar {
    fn resolve(config: &SeaConfig, library: Option<PathBuf>) -> anyhow::Result<Self> {
        let grammar = match library.or_else(|| config.library.clone()) {
            Some(path) => Grammar::Library(load_language_from_library(&path)?),
            None => Grammar::Builtin(load_language()?),
        };
        Ok(grammar)
    }

    fn language(&self) -> &Language {
        match self {
            Grammar::Builtin(language) => language,
            Grammar::Library(loaded) => loaded.language(),
        }
    }

    fn source(&self) -> String {
        match self {
            Grammar::Builtin(_) => "built-in".to_string(),
            Grammar::Library(loaded) => loaded.path().display().to_string(),
        }
    }
}

pub fn run_check(output_mode: OutputMode, config: &SeaConfig, library: Option<PathBuf>) -> anyhow::Result<()> {
    let grammar = Grammar::resolve(config, library).context(LOAD_ERROR_MESSAGE)?;
    let language = grammar.language();

    Query::new(language, HIGHLIGHTS_QUERY).context("highlights query does not match the grammar")?;
    Query::new(language, TAGS_QUERY).context("tags query does not match the grammar")?;

    if output_mode.is_human() {
        header("Sea grammar");
        info("Source", &grammar.source());
        info("ABI version", &language.version().to_string());
        info("Node kinds", &language.node_kind_count().to_string());
        info("Fields", &language.field_count().to_string());
        success("Sea grammar loaded");
    } else {
        let data = serde_json::json!({
            "source": grammar.source(),
            "abi_version": language.version(),
            "node_kinds": language.node_kind_count(),
            "fields": language.field_count(),
        });
        emit_success(output_mode, "check", data)?;
    }
    Ok(())
}

pub fn run_parse(
    output_mode: OutputMode,
    config: &SeaConfig,
    paths: &[PathBuf],
    sexp: bool,
    library: Option<PathBuf>,
) -> anyhow::Result<()> {
    let grammar = Grammar::resolve(config, library).context(LOAD_ERROR_MESSAGE)?;
    let files = batch::discover(paths, config);
    if files.is_empty() {
        anyhow::bail!("no Sea files found (extensions: {})", config.extensions.join(", "));
    }

    let started = Instant::now();
    let report = if output_mode.is_human() {
        header(&format!("Parsing {} files", files.len()));
        let progress = ui::ParseProgress::new(files.len());
        let report = batch::parse_files(files, grammar.language(), config, sexp, |msg| progress.observe(msg))?;
        progress.finish_with_summary(started.elapsed(), report.files.len(), report.error_count());
        print_parse_report(&report);
        report
    } else {
        let report = batch::parse_files(files, grammar.language(), config, sexp, |_| {})?;
        emit_success(output_mode, "parse", serde_json::to_value(&report)?)?;
        report
    };

    if !report.is_clean() {
        anyhow::bail!(
            "{} of {} files have syntax errors, {} could not be read",
            report.files_with_errors(),
            report.files.len() + report.failures.len(),
            report.failures.len()
        );
    }
    Ok(())
}

fn print_parse_report(report: &BatchReport) {
    for file in &report.files {
        if !file.is_clean() {
            println!(
                "{} {}",
                Icons::CROSS.style(theme().error.clone()),
                file.path.display().style(theme().path.clone())
            );
            for diagnostic in &file.diagnostics {
                println!("  {}", theme().diagnostic(diagnostic));
            }
        }
        if let Some(tree) = &file.sexp {
            section(&format!(" {} ", file.path.display()));
            println!("{}", tree);
        }
    }

    for (path, reason) in &report.failures {
        ui::warn(&format!("{}: {}", path.display(), reason));
    }

    section(" Summary ");
    println!(
        "{}",
        stats_table(&[
            ("Files", report.files.len().to_string()),
            ("Clean", (report.files.len() - report.files_with_errors()).to_string()),
            ("With errors", report.files_with_errors().to_string()),
            ("Syntax errors", report.error_count().to_string()),
            ("Unreadable", report.failures.len().to_string()),
        ])
    );
}

#[derive(Tabled)]
struct OutlineRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Lines")]
    lines: String,
    #[tabled(rename = "Signature")]
    signature: String,
}

pub fn run_outline(output_mode: OutputMode, config: &SeaConfig, file: &Path) -> anyhow::Result<()> {
    let grammar = Grammar::resolve(config, None).context(LOAD_ERROR_MESSAGE)?;
    let source = std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;

    let mut parser = SeaParser::with_language(grammar.language().clone())?;
    let parsed = parser.parse(source)?;
    let symbols = Outline::for_language(grammar.language())?.extract(&parsed);

    if !output_mode.is_human() {
        let data = serde_json::json!({
            "file": file.display().to_string(),
            "symbols": symbols,
            "diagnostics": parsed.diagnostics(),
        });
        return emit_success(output_mode, "outline", data);
    }

    header(&format!("{} {}", Icons::TREE, file.display()));
    if parsed.has_errors() {
        ui::warn(&format!("{} syntax errors, outline may be incomplete", parsed.diagnostics().len()));
    }
    if symbols.is_empty() {
        println!("{}", dim("No definitions found."));
        return Ok(());
    }

    let rows: Vec<OutlineRow> = symbols
        .iter()
        .map(|s| OutlineRow {
            kind: s.kind.to_string(),
            name: s.name.clone(),
            lines: format!("{}-{}", s.line_start, s.line_end),
            signature: s.signature.clone().unwrap_or_default(),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
    Ok(())
}

pub fn run_init(path: &Path, force: bool) -> anyhow::Result<()> {
    tree_sitter_sea::config::write_config(path, &SeaConfig::default(), force)?;
    success(&format!("{} Wrote {}", Icons::WRENCH, path.display()));
    Ok(())
}
