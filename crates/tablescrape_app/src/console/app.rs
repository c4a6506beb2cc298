use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::mpsc;

use anyhow::{bail, Context};
use tablescrape_core::{update, AppState, AppViewModel, Msg, SaveTarget, StatusLevel};
use tablescrape_logging::scrape_debug;

use super::effects::EffectRunner;
use super::render;
use crate::cli::{Cli, DEFAULT_OUTPUT_DIR};

/// Fetch, preview and optionally save, driving the same `update` loop a
/// windowed front end would.
pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let effects = EffectRunner::new(cli.fetch_settings(), msg_tx);
    let mut app = ConsoleApp::new(msg_rx, effects);

    app.dispatch(Msg::UrlSubmitted(cli.url.clone()));
    app.wait_until_idle()?;
    if app.failed() {
        return Ok(ExitCode::FAILURE);
    }
    if app.state.tables().is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    app.dispatch(Msg::TableSelected(cli.table_index()));
    if app.failed() {
        return Ok(ExitCode::FAILURE);
    }

    if let Some(target) = cli.save_target() {
        if let SaveTarget::File(path) = &target {
            prepare_output(path, cli.output.is_none(), cli.force)?;
        }
        app.dispatch(Msg::SaveRequested(target));
        app.wait_until_idle()?;
    }

    Ok(if app.failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn prepare_output(path: &Path, default_location: bool, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }
    if default_location {
        fs::create_dir_all(DEFAULT_OUTPUT_DIR)
            .with_context(|| format!("could not create directory {DEFAULT_OUTPUT_DIR}"))?;
    }
    Ok(())
}

struct ConsoleApp {
    state: AppState,
    msg_rx: mpsc::Receiver<Msg>,
    effects: EffectRunner,
    last_view: Option<AppViewModel>,
}

impl ConsoleApp {
    fn new(msg_rx: mpsc::Receiver<Msg>, effects: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            msg_rx,
            effects,
            last_view: None,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        scrape_debug!("dispatch {:?}", msg_name(&msg));
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            let view = state.view();
            for line in render::render(self.last_view.as_ref(), &view) {
                println!("{line}");
            }
            self.last_view = Some(view);
        }
        self.state = state;
        self.effects.enqueue(effects);
    }

    /// Blocks on worker replies until nothing is outstanding.
    fn wait_until_idle(&mut self) -> anyhow::Result<()> {
        while self.state.is_busy() {
            let msg = self
                .msg_rx
                .recv()
                .context("background worker went away without reporting")?;
            self.dispatch(msg);
        }
        Ok(())
    }

    fn failed(&self) -> bool {
        self.state.status().level == StatusLevel::Error
    }
}

fn msg_name(msg: &Msg) -> &'static str {
    match msg {
        Msg::UrlSubmitted(_) => "UrlSubmitted",
        Msg::TablesFetched(_) => "TablesFetched",
        Msg::FetchFailed(_) => "FetchFailed",
        Msg::TableSelected(_) => "TableSelected",
        Msg::SaveRequested(_) => "SaveRequested",
        Msg::SaveCompleted(_) => "SaveCompleted",
        Msg::SaveFailed(_) => "SaveFailed",
        Msg::SaveNotImplemented(_) => "SaveNotImplemented",
        Msg::NoOp => "NoOp",
    }
}
