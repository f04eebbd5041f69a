// Route exports
pub mod animals;
pub mod matches;

use actix_web::web;
use std::sync::Arc;

use crate::core::{Matcher, RangeModel};
use crate::services::{BreedCatalog, RecordStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub catalog: Arc<BreedCatalog>,
    pub ranges: Arc<RangeModel>,
}

impl AppState {
    pub fn new(store: RecordStore, catalog: BreedCatalog, ranges: RangeModel) -> Self {
        Self {
            store: Arc::new(store),
            catalog: Arc::new(catalog),
            ranges: Arc::new(ranges),
        }
    }

    /// Matcher over the breed table as it is right now
    pub fn matcher(&self) -> Matcher {
        Matcher::new(self.catalog.snapshot(), self.ranges.as_ref().clone())
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(animals::configure),
    );
}
