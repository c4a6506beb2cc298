use crate::view_model::StatusLevel;
use crate::{preview_table, AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlSubmitted(raw) => {
            let url = raw.trim();
            if url.is_empty() {
                state.set_status(StatusLevel::Error, "Please enter a URL.");
                return (state, Vec::new());
            }
            if state.fetch_in_flight() {
                return (state, Vec::new());
            }
            state.begin_fetch();
            vec![Effect::FetchTables {
                url: url.to_string(),
            }]
        }
        Msg::TablesFetched(tables) => {
            state.finish_fetch(tables);
            Vec::new()
        }
        Msg::FetchFailed(message) => {
            state.fail_fetch(&message);
            Vec::new()
        }
        Msg::TableSelected(index) => {
            if state.select(index) {
                let summary = state
                    .selected_table()
                    .map(|table| preview_table(index, table).summary)
                    .unwrap_or_default();
                state.set_status(StatusLevel::Info, summary);
            } else {
                state.set_status(StatusLevel::Error, "No table selected or table list empty");
            }
            Vec::new()
        }
        Msg::SaveRequested(target) => match state.selected_table().cloned() {
            Some(table) => {
                state.begin_save();
                vec![Effect::SaveTable { table, target }]
            }
            None => {
                state.set_status(
                    StatusLevel::Error,
                    "Please fetch and select a table first.",
                );
                Vec::new()
            }
        },
        Msg::SaveCompleted(destination) => {
            state.finish_save(StatusLevel::Success, format!("Saved to {destination}"));
            Vec::new()
        }
        Msg::SaveFailed(message) => {
            state.finish_save(StatusLevel::Error, format!("Could not save table: {message}"));
            Vec::new()
        }
        Msg::SaveNotImplemented(message) => {
            state.finish_save(StatusLevel::Warning, message);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
