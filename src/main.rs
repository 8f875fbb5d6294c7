//! CLI entry point for themesync.

mod cli;

use clap::Parser;
use std::path::{Path, PathBuf};
use themesync::a11y::{run_audit, HttpPageFetcher, PageRef, StaticScanner};
use themesync::catalog::source_for_location;
use themesync::check::{describe_outcome, run_check, CheckPaths};
use themesync::config::{
    default_store_path, initialize_default_global_config, load_config, Config,
    GlobalConfigInitResult,
};
use themesync::page::Page;
use themesync::prefs::{FileStore, MemoryStore, PreferenceStore};
use themesync::sync::{start, FixedSignal, LIVE_REGION_ID};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "THEMESYNC_LOG";

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_tracing();

    let loaded = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    tracing::debug!(source = ?loaded.source, "loaded config");
    let config = loaded.config;

    let result = match args.command {
        cli::Command::Apply {
            page,
            theme,
            font_size,
            cycle,
            prefers_dark,
            ephemeral,
            store,
        } => {
            let request = ApplyRequest {
                page,
                theme,
                font_size,
                cycle: cycle.unwrap_or(0),
                prefers_dark,
            };
            if ephemeral {
                run_apply(&config, request, MemoryStore::new()).await
            } else {
                match open_store(&config, store) {
                    Ok(store) => run_apply(&config, request, store).await,
                    Err(msg) => Err(msg),
                }
            }
        }
        cli::Command::Check { root } => run_check_command(&config, root),
        cli::Command::Audit { pages, threshold } => {
            run_audit_command(&config, pages, threshold).await
        }
        cli::Command::Init { force } => run_init(force),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(msg) => {
            eprintln!("error: {msg}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct ApplyRequest {
    page: PathBuf,
    theme: Option<String>,
    font_size: Option<String>,
    cycle: usize,
    prefers_dark: bool,
}

fn open_store(config: &Config, explicit: Option<PathBuf>) -> Result<FileStore, String> {
    let path = explicit
        .or_else(|| config.store.path.as_deref().map(expand_home))
        .or_else(default_store_path)
        .ok_or_else(|| "unable to resolve a preference file; pass --store or --ephemeral".to_string())?;
    FileStore::open(&path).map_err(|e| format!("failed to open {}: {e}", path.display()))
}

fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}

async fn run_apply<P: PreferenceStore>(
    config: &Config,
    request: ApplyRequest,
    store: P,
) -> Result<bool, String> {
    let html = std::fs::read_to_string(&request.page)
        .map_err(|e| format!("failed to read {}: {e}", request.page.display()))?;
    let page = Page::parse(&html);
    let base_dir = request
        .page
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let source = source_for_location(
        &config.catalog.location,
        base_dir,
        config.catalog.timeout(),
    );
    let signal = Box::new(FixedSignal(request.prefers_dark.then_some(true)));

    let (mut sync, state) = start(source.as_ref(), page, store, signal).await;
    let mut theme = state.theme.clone();
    let mut font_size = state.font_size;
    if let Some(requested) = request.theme.as_deref() {
        theme = sync.apply_theme(requested);
    }
    if let Some(requested) = request.font_size.as_deref() {
        font_size = sync.apply_font_size(requested);
    }
    for _ in 0..request.cycle {
        theme = sync.cycle_theme();
    }

    println!(
        "themes: {}",
        sync.catalog().ids().collect::<Vec<_>>().join(", ")
    );
    println!("theme: {theme}");
    println!("font_size: {font_size}");
    if let Some(text) = sync.surface().text_by_id(LIVE_REGION_ID) {
        println!("announcement: {text}");
    }
    if !state.audit.missing_landmarks.is_empty() {
        println!(
            "missing landmarks: {}",
            state.audit.missing_landmarks.join(", ")
        );
    }
    if !state.audit.invalid_fields.is_empty() {
        println!("invalid fields: {}", state.audit.invalid_fields.len());
    }
    if state.help_tips {
        println!("help tips attached");
    }
    Ok(true)
}

fn run_check_command(config: &Config, root: Option<PathBuf>) -> Result<bool, String> {
    let root = root.unwrap_or_else(|| PathBuf::from("."));
    let paths = CheckPaths::under(&root, &config.check.themes_json, &config.check.themes_css);
    let report = run_check(&paths).map_err(|e| e.to_string())?;

    if !report.missing_in_css.is_empty() {
        eprintln!(
            "themes missing in {}: {}",
            paths.themes_css.display(),
            report.missing_in_css.join(", ")
        );
        return Ok(false);
    }
    for outcome in &report.files {
        for line in describe_outcome(outcome) {
            println!("{line}");
        }
    }
    if report.is_consistent() {
        println!(
            "theme list consistent ({}) in all files.",
            report.themes.join(", ")
        );
        Ok(true)
    } else {
        Ok(false)
    }
}

async fn run_audit_command(
    config: &Config,
    pages: Vec<String>,
    threshold: Option<usize>,
) -> Result<bool, String> {
    let locations = if pages.is_empty() {
        config.audit.pages.clone()
    } else {
        pages
    };
    let refs: Vec<PageRef> = locations.iter().map(|page| PageRef::parse(page)).collect();
    let threshold = threshold.unwrap_or(config.audit.threshold);
    let fetcher = HttpPageFetcher::new(config.audit.timeout());

    let report = run_audit(&refs, &fetcher, &StaticScanner, threshold)
        .await
        .map_err(|e| e.to_string())?;
    for page in &report.pages {
        println!("{} -> {} findings", page.page.display(), page.findings.len());
        for finding in &page.findings {
            println!("  [{}] {}", finding.rule, finding.message);
        }
    }
    for (rule, count) in report.by_rule() {
        println!("{rule}: {count}");
    }
    println!("total: {} (threshold {})", report.total(), report.threshold);
    if report.exceeds_threshold() {
        eprintln!(
            "accessibility findings exceed threshold: {} > {}",
            report.total(),
            report.threshold
        );
        return Ok(false);
    }
    Ok(true)
}

fn run_init(force: bool) -> Result<bool, String> {
    match initialize_default_global_config(force).map_err(|e| e.to_string())? {
        GlobalConfigInitResult::Created { path } => {
            println!("wrote {}", path.display());
        }
        GlobalConfigInitResult::AlreadyInitialized { path } => {
            println!(
                "{} already exists; use `themesync init --force` to overwrite",
                path.display()
            );
        }
        GlobalConfigInitResult::Overwritten { path, backup_path } => {
            println!(
                "wrote {} (previous config saved to {})",
                path.display(),
                backup_path.display()
            );
        }
    }
    Ok(true)
}
