//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crate::app::App;
use crate::render;
use anyhow::Context;
use cscout_analyzer::{AnalysisReport, generate_patch, record_report};
use cscout_core::{BugCategory, CscoutConfig, FindingStore, Fix, TrainingExample};
use cscout_ml::{load_examples, seed_corpus};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Handle a CLI subcommand.
pub async fn handle_command(command: Commands, workspace: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Config { action } => handle_config(action, workspace).await,
        Commands::Analyze {
            paths,
            json,
            no_store,
        } => handle_analyze(&open_app(workspace)?, &paths, json, no_store).await,
        Commands::Fixes { file, patch } => handle_fixes(&open_app(workspace)?, &file, patch).await,
        Commands::Train {
            examples,
            from_store,
            seed,
        } => handle_train(&open_app(workspace)?, examples.as_deref(), from_store, seed),
        Commands::Findings { category, json } => {
            handle_findings(&open_app(workspace)?, category.as_deref(), json)
        }
    }
}

fn open_app(workspace: &Path) -> anyhow::Result<App> {
    let config = cscout_core::load_config(Some(workspace))
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    Ok(App::new(workspace, config))
}

async fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_dir = workspace.join(".cscout");
            std::fs::create_dir_all(&config_dir)?;

            let config_path = config_dir.join("config.toml");
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }

            let toml_str = toml::to_string_pretty(&CscoutConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = cscout_core::load_config(Some(workspace))
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

/// Display name for a source: relative to the workspace when possible.
fn display_name(workspace: &Path, path: &Path) -> String {
    path.strip_prefix(workspace)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn collect_sources(workspace: &Path, paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for path in paths {
        let path = CscoutConfig::resolve(workspace, path);
        let found = cscout_core::source::discover_sources(&path)
            .with_context(|| format!("Failed to scan {}", path.display()))?;
        if found.is_empty() {
            tracing::warn!(path = %path.display(), "No C sources found");
        }
        sources.extend(found);
    }
    sources.sort();
    sources.dedup();
    Ok(sources)
}

async fn analyze_file(app: &App, path: &Path) -> anyhow::Result<(AnalysisReport, String)> {
    let source = cscout_core::source::read_source(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = display_name(&app.workspace, path);

    let engine = Arc::clone(&app.engine);
    let text = source.clone();
    let report =
        tokio::task::spawn_blocking(move || AnalysisReport::analyze(&engine, &name, &text))
            .await?;
    Ok((report, source))
}

async fn handle_analyze(
    app: &App,
    paths: &[PathBuf],
    json: bool,
    no_store: bool,
) -> anyhow::Result<()> {
    let store = if no_store { None } else { app.open_store()? };
    app.load_or_train(store.as_ref().map(|s| s as &dyn FindingStore))?;

    let sources = collect_sources(&app.workspace, paths)?;
    let mut reports = Vec::with_capacity(sources.len());
    let mut failures = 0usize;

    for path in &sources {
        let (mut report, source) = match analyze_file(app, path).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(path = %path.display(), "{:#}", e);
                failures += 1;
                continue;
            }
        };

        if let Some(store) = &store {
            record_report(store, &mut report, &source)
                .with_context(|| format!("Failed to record {}", report.name))?;
        }

        if !json {
            print!("{}", render::render_report(&report));
        }
        reports.push(report);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        let issues: usize = reports.iter().map(|r| r.entries.len()).sum();
        println!(
            "\nScanned {} file(s): {} issue(s) found",
            reports.len(),
            issues
        );
    }

    if failures > 0 {
        anyhow::bail!("{} file(s) could not be analyzed", failures);
    }
    Ok(())
}

async fn handle_fixes(app: &App, file: &Path, patch_only: bool) -> anyhow::Result<()> {
    let store = app.open_store()?;
    app.load_or_train(store.as_ref().map(|s| s as &dyn FindingStore))?;

    let path = CscoutConfig::resolve(&app.workspace, file);
    let (report, source) = analyze_file(app, &path).await?;

    if !patch_only {
        print!("{}", render::render_report(&report));
    }

    // One fix per line; the first detector to propose one wins.
    let mut seen = HashSet::new();
    let fixes: Vec<&Fix> = report
        .fixes()
        .filter(|fix| seen.insert(fix.applies_to_line))
        .collect();

    if fixes.is_empty() {
        if !patch_only {
            println!("No fixes to propose.");
        }
        return Ok(());
    }

    let patch = generate_patch(&report.name, &source, &fixes)?;
    if !patch_only {
        println!();
    }
    print!("{}", patch);
    Ok(())
}

fn handle_train(
    app: &App,
    examples: Option<&Path>,
    from_store: bool,
    seed: bool,
) -> anyhow::Result<()> {
    let mut corpus: Vec<TrainingExample> = Vec::new();

    if let Some(path) = examples {
        let path = CscoutConfig::resolve(&app.workspace, path);
        let loaded = load_examples(&path)
            .with_context(|| format!("Failed to load examples from {}", path.display()))?;
        println!("Loaded {} example(s) from {}", loaded.len(), path.display());
        corpus.extend(loaded);
    }

    if from_store {
        let store = app
            .open_store()?
            .ok_or_else(|| anyhow::anyhow!("Storage is disabled in configuration"))?;
        let recorded = store.training_examples()?;
        println!("Loaded {} recorded sample(s)", recorded.len());
        corpus.extend(recorded);
    }

    if seed || (examples.is_none() && !from_store) {
        corpus.extend(seed_corpus());
    }

    let summary = app.train(&corpus)?;
    println!(
        "Trained on {} example(s), vocabulary of {} term(s)",
        summary.examples, summary.vocabulary_size
    );
    for (category, count) in &summary.label_counts {
        println!("  {:<18} {}", category.as_str(), count);
    }
    println!("Model saved to {}", app.model_path().display());
    if let Some(checksum) = app.classifier.model_info().and_then(|info| info.checksum) {
        println!("Model checksum: {}", checksum);
    }
    Ok(())
}

fn handle_findings(app: &App, category: Option<&str>, json: bool) -> anyhow::Result<()> {
    let category: Option<BugCategory> = category.map(str::parse).transpose()?;
    let store = app
        .open_store()?
        .ok_or_else(|| anyhow::anyhow!("Storage is disabled in configuration"))?;
    let findings = store.query_findings(category)?;

    if json {
        let entries: Vec<_> = findings
            .iter()
            .map(|(finding, fix)| serde_json::json!({ "finding": finding, "fix": fix }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if findings.is_empty() {
        println!("No recorded findings.");
        return Ok(());
    }

    let mut out = String::new();
    for (finding, fix) in &findings {
        render::render_entry(&mut out, finding, fix.as_ref());
    }
    print!("{}", out);
    println!("{} finding(s)", findings.len());
    Ok(())
}
