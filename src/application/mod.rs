//! Application services (use cases).
//!
//! Services load inputs through the store port, run the pure domain
//! computations and write results back. They share one [`PoolLocks`]
//! registry so per-gameweek and per-player writes are serialized.

pub mod admission;
pub mod proposition;
pub mod season;
pub mod settlement;
pub mod standings;
pub mod state;

use std::sync::Arc;

pub use admission::{AdmissionService, WagerRequest, WagerView};
pub use proposition::{DeclarationReport, DeclaredImpact, PropositionService};
pub use season::{ImportReport, SeasonImport, SeasonService};
pub use settlement::{ResultsReport, SettlementReport, SettlementService};
pub use standings::{StandingsReport, StandingsService};
pub use state::PoolLocks;

use crate::port::outbound::store::PoolStore;

/// Every service wired to one store and one lock registry.
pub struct Pool<S> {
    pub season: SeasonService<S>,
    pub admission: AdmissionService<S>,
    pub settlement: SettlementService<S>,
    pub propositions: PropositionService<S>,
    pub standings: StandingsService<S>,
}

impl<S: PoolStore> Pool<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        let locks = Arc::new(PoolLocks::new());
        Self {
            season: SeasonService::new(Arc::clone(&store), Arc::clone(&locks)),
            admission: AdmissionService::new(Arc::clone(&store), Arc::clone(&locks)),
            settlement: SettlementService::new(Arc::clone(&store), Arc::clone(&locks)),
            propositions: PropositionService::new(Arc::clone(&store), Arc::clone(&locks)),
            standings: StandingsService::new(store),
        }
    }
}
