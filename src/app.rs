//! Application driver
//!
//! Reads the menu from stdin, picks a backend and runs one of three loops:
//! a single popup, a persistent tear-off window, or root mode (a popup per
//! trigger click, forever).

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;

use crate::backend::{Backend, TermBackend, Trigger};
use crate::cli::{BackendKind, Cli};
use crate::config::{self, Config, ConfigWatcher};
use crate::engine::{Engine, Options, Outcome, Spawner};
use crate::error::MenuResult;
use crate::menu::Metrics;
use crate::tree::{build_tree, ItemTree};

/// Entry point behind `main`
pub fn run(cli: Cli) -> Result<()> {
    let mut tree = build_tree(io::stdin().lock()).context("reading menu from stdin")?;

    if cli.check {
        let report = check_report(&tree, cli.json)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(report.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    let config = load_config(&cli);
    let kind = resolve_backend(cli.backend, std::env::var_os("DISPLAY").is_some());
    tracing::debug!(?kind, "backend selected");

    match kind {
        #[cfg(feature = "x11")]
        BackendKind::X11 => {
            let mut backend = crate::backend::X11Backend::connect(&config)?;
            drive(&cli, kind, config, &mut tree, &mut backend)
        }
        #[cfg(not(feature = "x11"))]
        BackendKind::X11 => bail!("this build has no X11 support"),
        BackendKind::Terminal | BackendKind::Auto => {
            if !io::stderr().is_terminal() {
                bail!("the terminal backend needs stderr attached to a terminal");
            }
            let mut backend = TermBackend::new(&config)?;
            drive(&cli, kind, config, &mut tree, &mut backend)
        }
    }
}

/// `--check` output: the normalised menu text, or its JSON dump
pub fn check_report(tree: &ItemTree, json: bool) -> Result<String> {
    if json {
        let mut text = serde_json::to_string_pretty(&tree.dump())?;
        text.push('\n');
        Ok(text)
    } else {
        Ok(tree.to_text())
    }
}

/// Resolve `auto` against the environment
pub fn resolve_backend(requested: BackendKind, display: bool) -> BackendKind {
    match requested {
        BackendKind::Auto if display && cfg!(feature = "x11") => BackendKind::X11,
        BackendKind::Auto => BackendKind::Terminal,
        other => other,
    }
}

fn load_config(cli: &Cli) -> Config {
    let mut config = config::load_or_default(cli.config.as_deref());
    if cli.tearoff {
        config.tearoff = true;
    }
    config
}

/// Engine options for the given flags and resource settings
pub fn options_for(cli: &Cli, config: &Config, kind: BackendKind) -> Options {
    let mut metrics = Metrics::from_config(config);
    metrics.icons = !cli.no_icons;
    metrics.browse = cli.browse;
    // A second instance cannot share the terminal.
    if kind == BackendKind::Terminal {
        metrics.tearoff = false;
    }

    let mut options = Options::new(metrics);
    options.position = cli.position;
    options.right_click = !cli.no_right_click;
    options.windowed = cli.windowed();
    options.persistent = cli.tearoff_child;
    options.scroll_interval = Duration::from_millis(config.scroll_interval_ms);
    if let Some(title) = &cli.title {
        options.title = title.clone();
    }
    options.class = cli.class.clone();
    options
}

/// Arguments handed to a tear-off child, before its title
pub fn child_args(cli: &Cli, kind: BackendKind) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--tearoff-child".into()];
    let backend = match kind {
        BackendKind::X11 => "x11",
        BackendKind::Terminal => "terminal",
        BackendKind::Auto => "auto",
    };
    args.push("--backend".into());
    args.push(backend.into());
    if let Some(path) = &cli.config {
        args.push("--config".into());
        args.push(path.clone().into_os_string());
    }
    for (set, flag) in [
        (cli.no_icons, "--no-icons"),
        (cli.no_right_click, "--no-right-click"),
        (cli.browse, "--browse"),
        (cli.tearoff, "--tearoff"),
    ] {
        if set {
            args.push(flag.into());
        }
    }
    args.push("--class".into());
    args.push(cli.class.clone().into());
    if cli.verbose > 0 {
        args.push(format!("-{}", "v".repeat(cli.verbose as usize)).into());
    }
    args
}

fn drive<B: Backend>(
    cli: &Cli,
    kind: BackendKind,
    mut config: Config,
    tree: &mut ItemTree,
    backend: &mut B,
) -> Result<()> {
    let mut spawner = Spawner::current_exe(child_args(cli, kind))?;
    let mut out = io::stdout();
    let options = options_for(cli, &config, kind);

    if let Some(trigger) = cli.trigger() {
        let watcher = watch_config(cli);
        let mut options = options;
        loop {
            if watcher.as_ref().is_some_and(ConfigWatcher::take_changed) {
                config = load_config(cli);
                backend.apply_style(&config)?;
                options = options_for(cli, &config, kind);
                tracing::info!("configuration reloaded");
            }
            run_triggered(tree, backend, &options, &trigger, &mut out, &mut spawner)?;
        }
    }

    if cli.tearoff_child {
        run_persistent(tree, backend, options, &mut out, &mut spawner)?;
    } else {
        run_once(tree, backend, options, &mut out, &mut spawner)?;
    }
    Ok(())
}

fn watch_config(cli: &Cli) -> Option<ConfigWatcher> {
    let path: PathBuf = config::resolve_path(cli.config.as_deref())?;
    if !path.exists() {
        return None;
    }
    match ConfigWatcher::new(&path) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            tracing::warn!(error = %err, "config changes will not be picked up");
            None
        }
    }
}

fn emit<W: Write>(out: &mut W, output: &str) -> io::Result<()> {
    writeln!(out, "{output}")?;
    out.flush()
}

/// One popup; prints the selection, if any
pub fn run_once<B: Backend, W: Write>(
    tree: &mut ItemTree,
    backend: &mut B,
    options: Options,
    out: &mut W,
    spawner: &mut Spawner,
) -> MenuResult<()> {
    let outcome = {
        let mut engine = Engine::new(tree, backend, options);
        engine.open(None)?;
        engine.run()?
    };
    finish(outcome, out, spawner)
}

/// Root mode: wait for the trigger, then run one popup at the click
pub fn run_triggered<B: Backend, W: Write>(
    tree: &mut ItemTree,
    backend: &mut B,
    options: &Options,
    trigger: &Trigger,
    out: &mut W,
    spawner: &mut Spawner,
) -> MenuResult<()> {
    spawner.reap();
    let at = backend.wait_trigger(trigger)?;
    let outcome = {
        let mut engine = Engine::new(tree, backend, options.clone());
        engine.open(Some(at))?;
        engine.run()?
    };
    finish(outcome, out, spawner)
}

/// Tear-off instance: stays open, printing every selection
pub fn run_persistent<B: Backend, W: Write>(
    tree: &mut ItemTree,
    backend: &mut B,
    options: Options,
    out: &mut W,
    spawner: &mut Spawner,
) -> MenuResult<()> {
    let mut engine = Engine::new(tree, backend, options);
    engine.open(None)?;
    loop {
        match engine.run()? {
            Outcome::Selected(output) => {
                emit(out, &output)?;
                engine.collapse()?;
            }
            Outcome::Cancelled => return Ok(()),
            Outcome::TornOff(request) => {
                spawner.spawn(&request)?;
                engine.open(None)?;
            }
        }
    }
}

fn finish<W: Write>(outcome: Outcome, out: &mut W, spawner: &mut Spawner) -> MenuResult<()> {
    match outcome {
        Outcome::Selected(output) => emit(out, &output)?,
        Outcome::Cancelled => tracing::info!("menu cancelled"),
        Outcome::TornOff(request) => {
            spawner.spawn(&request)?;
        }
    }
    Ok(())
}
