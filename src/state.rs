use std::sync::Arc;

use crate::config::Config;
use crate::store::{DynQuestionStore, DynSubmissionStore, DynUserStore, MemoryStore, PgStore};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub questions: DynQuestionStore,
    pub submissions: DynSubmissionStore,
    pub users: DynUserStore,
    pub config: Config,
}

impl AppState {
    pub fn with_postgres(store: PgStore, config: Config) -> Self {
        let store = Arc::new(store);
        Self {
            questions: store.clone(),
            submissions: store.clone(),
            users: store,
            config,
        }
    }

    pub fn in_memory(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            questions: store.clone(),
            submissions: store.clone(),
            users: store,
            config,
        }
    }
}

impl FromRef<AppState> for DynQuestionStore {
    fn from_ref(state: &AppState) -> Self {
        state.questions.clone()
    }
}

impl FromRef<AppState> for DynSubmissionStore {
    fn from_ref(state: &AppState) -> Self {
        state.submissions.clone()
    }
}

impl FromRef<AppState> for DynUserStore {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
