//! CLI binary for mw2doku.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ImportConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mw2doku::{
    convert_wikitext, import, ImportConfig, ImportProgressCallback, ItemSelection,
    ProgressCallback,
};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar at the bottom plus one log line per
/// imported or skipped item.
struct CliProgressCallback {
    bar: ProgressBar,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose bar length is set by `on_import_start`
    /// (called once the database has been read).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading wiki database…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} items  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Importing");
    }
}

impl ImportProgressCallback for CliProgressCallback {
    fn on_import_start(&self, total_items: usize) {
        self.activate_bar(total_items);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Importing {total_items} items…"))
        ));
    }

    fn on_item_start(&self, title: &str) {
        self.bar.set_message(title.to_string());
    }

    fn on_item_imported(&self, title: &str) {
        self.bar.println(format!("  {} {}", green("✓"), title));
        self.bar.inc(1);
    }

    fn on_item_skipped(&self, title: &str, reason: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);

        // Keep the log line on one tidy line.
        let reason = reason.lines().next().unwrap_or(reason);
        let reason = if reason.len() > 80 {
            format!("{}…", &reason[..79])
        } else {
            reason.to_string()
        };

        self.bar
            .println(format!("  {} {}  {}", red("✗"), title, dim(&reason)));
        self.bar.inc(1);
    }

    fn on_import_complete(&self, imported: usize, skipped: usize) {
        self.bar.finish_and_clear();

        if skipped == 0 {
            eprintln!(
                "{} {} items imported",
                green("✔"),
                bold(&imported.to_string())
            );
        } else {
            eprintln!(
                "{} {} items imported  ({} skipped)",
                if imported == 0 { red("✘") } else { cyan("⚠") },
                bold(&imported.to_string()),
                red(&skipped.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Full import
  mw2doku --mediawiki-dir /var/www/mediawiki --dokuwiki-dir /var/www/dokuwiki

  # See what would happen first
  mw2doku --mediawiki-dir /srv/mw --dokuwiki-dir /srv/dw --dry-run

  # Pages only, replacing anything already imported
  mw2doku --mediawiki-dir /srv/mw --dokuwiki-dir /srv/dw \
          --items pages --overwrite-pages

  # The wiki database lives elsewhere (e.g. a SQLite dump of a MySQL wiki)
  mw2doku --mediawiki-dir /srv/mw --dokuwiki-dir /srv/dw \
          --db /tmp/wiki-dump.sqlite --prefix mw_

  # Machine-readable run report
  mw2doku --mediawiki-dir /srv/mw --dokuwiki-dir /srv/dw --json > report.json

  # Convert a single file of MediaWiki markup to stdout (no installs needed)
  mw2doku --convert page.wiki
  cat page.wiki | mw2doku --convert -

NOTES:
  Only the MediaWiki SQLite backend ($wgDBtype = 'sqlite') is read directly.
  For MySQL/PostgreSQL wikis, dump the database to a SQLite file and pass it
  with --db.

  Pages land in <dokuwiki>/data/pages/<id>.txt, images in
  <dokuwiki>/data/media/<namespace>/. Existing files are skipped unless the
  matching --overwrite-* flag is given.

ENVIRONMENT VARIABLES:
  MW2DOKU_MEDIAWIKI_DIR   Default for --mediawiki-dir
  MW2DOKU_DOKUWIKI_DIR    Default for --dokuwiki-dir
  RUST_LOG                Tracing filter (overrides -v/-q)
"#;

/// Import a MediaWiki wiki into DokuWiki.
#[derive(Parser, Debug)]
#[command(
    name = "mw2doku",
    version,
    about = "Import a MediaWiki wiki into DokuWiki",
    long_about = "Import pages and images from a MediaWiki installation into a DokuWiki \
installation, converting the page markup between the two dialects. Reads the wiki's \
SQLite database directly; no running MediaWiki is required.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Root of the MediaWiki installation (contains LocalSettings.php).
    #[arg(
        long,
        value_name = "DIR",
        env = "MW2DOKU_MEDIAWIKI_DIR",
        required_unless_present = "convert"
    )]
    mediawiki_dir: Option<PathBuf>,

    /// Root of the DokuWiki installation (contains data/pages).
    #[arg(
        long,
        value_name = "DIR",
        env = "MW2DOKU_DOKUWIKI_DIR",
        required_unless_present = "convert"
    )]
    dokuwiki_dir: Option<PathBuf>,

    /// Convert one file of MediaWiki markup to stdout and exit ('-' = stdin).
    #[arg(long, value_name = "FILE")]
    convert: Option<PathBuf>,

    /// Which namespaces to import: all, pages, images.
    #[arg(long, value_enum, default_value = "all")]
    items: ItemsArg,

    /// DokuWiki media namespace for imported images.
    #[arg(long, value_name = "NS", default_value = "wiki")]
    media_namespace: String,

    /// Explicit path to the SQLite database file.
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Table prefix override (defaults to the scraped $wgDBprefix).
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// Replace pages that already exist in DokuWiki.
    #[arg(long)]
    overwrite_pages: bool,

    /// Replace media files that already exist.
    #[arg(long)]
    overwrite_media: bool,

    /// Resolve and convert everything but write nothing.
    #[arg(long)]
    dry_run: bool,

    /// Output the run report as JSON instead of a summary line.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ItemsArg {
    All,
    Pages,
    Images,
}

impl From<ItemsArg> for ItemSelection {
    fn from(v: ItemsArg) -> Self {
        match v {
            ItemsArg::All => ItemSelection::All,
            ItemsArg::Pages => ItemSelection::PagesOnly,
            ItemsArg::Images => ItemSelection::ImagesOnly,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar provides the per-item feedback, so library INFO logs
    // are suppressed while it is active; -v restores everything.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && cli.convert.is_none();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Convert-only mode ────────────────────────────────────────────────
    if let Some(ref path) = cli.convert {
        let wikitext = if path.as_os_str() == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read wikitext from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?
        };

        let converted = convert_wikitext(&wikitext);
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(converted.as_bytes())
            .context("Failed to write to stdout")?;
        if !converted.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    // required_unless_present guarantees both dirs outside --convert mode.
    let mediawiki_dir = cli
        .mediawiki_dir
        .clone()
        .context("--mediawiki-dir is required")?;
    let dokuwiki_dir = cli
        .dokuwiki_dir
        .clone()
        .context("--dokuwiki-dir is required")?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn ImportProgressCallback>)
    } else {
        None
    };

    let mut builder = ImportConfig::builder(mediawiki_dir, dokuwiki_dir)
        .items(cli.items.into())
        .media_namespace(cli.media_namespace.clone())
        .overwrite_pages(cli.overwrite_pages)
        .overwrite_media(cli.overwrite_media)
        .dry_run(cli.dry_run);

    if let Some(db) = &cli.db {
        builder = builder.db_path(db);
    }
    if let Some(prefix) = &cli.prefix {
        builder = builder.table_prefix(prefix.clone());
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run import ───────────────────────────────────────────────────────
    let report = import(&config).context("Import failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        // Only print inline stats when the progress callback is disabled
        // (the callback already printed the final tick).
        eprintln!(
            "Imported {} pages, {} images ({} skipped, {} excluded) in {}ms",
            report.stats.pages_imported,
            report.stats.images_imported,
            report.stats.items_skipped,
            report.stats.items_excluded,
            report.stats.duration_ms
        );
    } else if !cli.quiet && cli.dry_run {
        eprintln!("   {}", dim("dry run — nothing was written"));
    }

    Ok(())
}
