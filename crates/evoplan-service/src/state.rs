use crate::store::Store;
use evoplan_core::config::SearchParams;

pub struct AppState {
    pub store: Store,
    pub search: SearchParams,
}

impl AppState {
    pub fn new(search: SearchParams) -> Self {
        Self { store: Store::new(), search }
    }
}
