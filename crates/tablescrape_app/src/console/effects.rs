use std::sync::mpsc;
use std::sync::Arc;

use tablescrape_core::{Effect, Msg};
use tablescrape_engine::{
    run_background, save, FetchSettings, SaveError, TableFetcher, TaskFailure,
};
use tablescrape_logging::{scrape_info, scrape_warn};

/// Executes effects on background threads. Callbacks never touch state:
/// they post a `Msg` back to the thread that owns `AppState`.
pub struct EffectRunner {
    fetcher: Arc<TableFetcher>,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(settings: FetchSettings, msg_tx: mpsc::Sender<Msg>) -> Self {
        Self {
            fetcher: Arc::new(TableFetcher::new(settings)),
            msg_tx,
        }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchTables { url } => {
                    scrape_info!("FetchTables url_len={} url={}", url.len(), url);
                    let fetcher = self.fetcher.clone();
                    let ok_tx = self.msg_tx.clone();
                    let err_tx = self.msg_tx.clone();
                    run_background(
                        move || fetcher.fetch(&url),
                        move |tables| {
                            let _ = ok_tx.send(Msg::TablesFetched(tables));
                        },
                        move |failure| {
                            scrape_warn!("Fetch failed: {}", failure);
                            let _ = err_tx.send(Msg::FetchFailed(failure.to_string()));
                        },
                    );
                }
                Effect::SaveTable { table, target } => {
                    let destination = target.describe();
                    scrape_info!("SaveTable destination={}", destination);
                    let ok_tx = self.msg_tx.clone();
                    let err_tx = self.msg_tx.clone();
                    run_background(
                        move || save(&table, &target),
                        move |()| {
                            let _ = ok_tx.send(Msg::SaveCompleted(destination));
                        },
                        move |failure| {
                            let _ = err_tx.send(save_failure_msg(failure));
                        },
                    );
                }
            }
        }
    }
}

fn save_failure_msg(failure: TaskFailure<SaveError>) -> Msg {
    let message = failure.to_string();
    match failure.into_error() {
        Some(err) if err.is_not_implemented() => {
            Msg::SaveNotImplemented(format!("{err}; nothing was written"))
        }
        _ => {
            scrape_warn!("Save failed: {}", message);
            Msg::SaveFailed(message)
        }
    }
}
