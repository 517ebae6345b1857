//! stackview - reactive, content-sized markdown blocks in a scrollable
//! terminal document.
//!
//! # Usage
//!
//! ```bash
//! stackview
//! stackview --document notes.md --watch
//! stackview --width 1400 --height 900
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use stackview::app::App;
use stackview::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use stackview::document::WINDOW_SIZE;
use stackview::perf;
use stackview::source::CANONICAL_DOCUMENT;

/// Reactive markdown block demo for the terminal
#[derive(Parser, Debug)]
#[command(name = "stackview", version, about, long_about = None)]
struct Cli {
    /// Viewport width in pixels (default: follow the terminal)
    #[arg(long, value_name = "PX")]
    width: Option<u32>,

    /// Viewport height in pixels (default: follow the terminal)
    #[arg(long, value_name = "PX")]
    height: Option<u32>,

    /// Document shown in the last section
    #[arg(long, value_name = "FILE")]
    document: Option<PathBuf>,

    /// Watch the document for changes and auto-reload
    #[arg(short, long)]
    watch: bool,

    /// Enable performance logging
    #[arg(long)]
    perf: bool,

    /// Write detailed layout/render debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn viewport_size(flags: &ConfigFlags) -> Option<(u32, u32)> {
    if flags.width.is_none() && flags.height.is_none() {
        return None;
    }
    Some((
        flags.width.unwrap_or(WINDOW_SIZE.0),
        flags.height.unwrap_or(WINDOW_SIZE.1),
    ))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("STACKVIEW_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize render debug log {}: {}",
            render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    // A missing document is not fatal: its cell shows placeholder text.
    let document = effective
        .document
        .clone()
        .unwrap_or_else(|| PathBuf::from(CANONICAL_DOCUMENT));
    tracing::debug!(document = %document.display(), ?effective, "starting");

    let app = App::new(document)
        .with_watch(effective.watch)
        .with_size(viewport_size(&effective))
        .with_config_paths(
            global_path,
            if local_path.exists() {
                Some(local_path)
            } else {
                None
            },
        );

    app.run().context("Application error")
}
