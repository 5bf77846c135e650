//! CLI command implementations

use anyhow::{Context, Result};
use rayon::prelude::*;
use razor_core::cst::dump::dump_tree;
use razor_core::lexer::SpanTokenizer;
use razor_core::{
    ConfigLoader, DescriptorCatalog, RazorConfiguration, RazorEngine, RazorParserOptions,
    SourceDocument, StringCache, format_node,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::output::{CheckSummary, FileReport, OutputFormatter};
use crate::{OutputFormat, TokenizerMode};

const TEMPLATE_EXTENSIONS: &[&str] = &["cshtml", "razor"];

/// Directory the configuration search starts from for `path`
fn search_dir(path: &Path) -> &Path {
    if path.is_dir() {
        return path;
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn load_config(config_path: Option<&Path>, start: &Path) -> Result<RazorConfiguration> {
    ConfigLoader::load(config_path, Some(search_dir(start)))
        .context("failed to load configuration")
}

fn read_document(path: &Path) -> Result<SourceDocument> {
    SourceDocument::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn engine_for(
    path: &Path,
    config: &RazorConfiguration,
    strings: Arc<StringCache>,
) -> Result<RazorEngine> {
    let options = RazorParserOptions::from_configuration(config, Some(path))?;
    Ok(RazorEngine::new(options, strings).with_discovery(config.discovery()))
}

/// Configured catalogs followed by the ones given on the command line
fn load_catalog(
    engine: &RazorEngine,
    config: &RazorConfiguration,
    extra_catalogs: &[PathBuf],
) -> Result<DescriptorCatalog> {
    let mut catalogs = config.tag_helper_catalogs.clone().unwrap_or_default();
    catalogs.extend(extra_catalogs.iter().cloned());
    engine
        .load_catalogs(&catalogs)
        .context("failed to load tag helper catalogs")
}

pub fn tokens_command(file: &Path, mode: TokenizerMode) -> Result<()> {
    let document = read_document(file)?;
    let tokenizer = match mode {
        TokenizerMode::Markup => SpanTokenizer::Markup,
        TokenizerMode::Code => SpanTokenizer::CSharp,
    };
    for token in tokenizer.tokenize(&document) {
        println!("{};[{}];", token.kind, token.text.escape_debug());
        for diagnostic in &token.diagnostics {
            println!("  {diagnostic}");
        }
    }
    Ok(())
}

pub fn parse_command(file: &Path, catalogs: &[PathBuf], config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, file)?;
    let engine = engine_for(file, &config, Arc::new(StringCache::new()))?;
    let catalog = load_catalog(&engine, &config, catalogs)?;
    let document = engine.process(read_document(file)?, &catalog);

    print!("{}", dump_tree(&document.tag_helper_tree));
    for diagnostic in &document.diagnostics {
        println!("{diagnostic}");
    }
    Ok(())
}

pub fn lower_command(
    file: &Path,
    catalogs: &[PathBuf],
    spans: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path, file)?;
    let engine = engine_for(file, &config, Arc::new(StringCache::new()))?;
    let catalog = load_catalog(&engine, &config, catalogs)?;
    let document = engine.process(read_document(file)?, &catalog);

    print!("{}", format_node(&document.document_node, spans));
    for diagnostic in &document.diagnostics {
        println!("{diagnostic}");
    }
    Ok(())
}

/// Template files under `paths`, sorted for stable output
fn collect_templates(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
            let is_template = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext));
            if entry.file_type().is_file() && is_template {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    files
}

pub fn check_command(
    paths: &[PathBuf],
    format: OutputFormat,
    catalogs: &[PathBuf],
    config_path: Option<&Path>,
    use_colors: bool,
) -> Result<CheckSummary> {
    let start_time = Instant::now();
    let start = paths.first().map_or(Path::new("."), PathBuf::as_path);
    let config = load_config(config_path, start)?;
    let files = collect_templates(paths);
    debug!("Checking {} template files", files.len());

    // One catalog load shared by every file
    let strings = Arc::new(StringCache::new());
    let catalog = load_catalog(
        &RazorEngine::new(RazorParserOptions::default(), strings.clone()),
        &config,
        catalogs,
    )?;

    let reports = files
        .par_iter()
        .map(|path| -> Result<FileReport> {
            let engine = engine_for(path, &config, strings.clone())?;
            let mut source = read_document(path)?;
            if let Ok(relative) = path.strip_prefix(start) {
                source = source.with_relative_path(&relative.to_string_lossy());
            }
            let text = source.text().to_string();
            let document = engine.process(source, &catalog);
            Ok(FileReport {
                path: path.display().to_string(),
                text,
                diagnostics: document.diagnostics,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut summary = CheckSummary::default();
    for report in &reports {
        summary.record(&report.diagnostics);
    }
    OutputFormatter::new(format, use_colors).print_results(&reports, &summary)?;

    info!(
        "Checked {} files in {:?}",
        summary.files_checked,
        start_time.elapsed()
    );
    Ok(summary)
}

pub fn config_schema_command() -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&RazorConfiguration::json_schema())?
    );
    Ok(())
}

pub fn config_show_command(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, Path::new("."))?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_templates_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("Views")).unwrap();
        fs::write(root.join("Views/b.cshtml"), "").unwrap();
        fs::write(root.join("a.razor"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();

        let files = collect_templates(&[root.to_path_buf()]);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            [PathBuf::from("Views/b.cshtml"), PathBuf::from("a.razor")]
        );
    }

    #[test]
    fn test_search_dir_of_bare_file_is_current_dir() {
        assert_eq!(search_dir(Path::new("Index.cshtml")), Path::new("."));
    }
}
