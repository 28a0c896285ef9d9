//! Shared application state.

use erp_analytics::AnalyticsEngine;
use erp_db::Database;
use erp_etl::EtlHandle;

/// Handed to every route as `State<Arc<AppState>>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Transactional store.
    pub erp: Database,

    /// Star-schema store.
    pub warehouse: Database,

    pub etl: EtlHandle,

    pub analytics: AnalyticsEngine,
}

impl AppState {
    pub fn new(erp: Database, warehouse: Database, etl: EtlHandle) -> Self {
        let analytics = AnalyticsEngine::new(warehouse.clone());
        AppState {
            erp,
            warehouse,
            etl,
            analytics,
        }
    }
}
