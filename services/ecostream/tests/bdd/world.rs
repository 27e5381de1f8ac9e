//! BDD test world for the ecostream dashboard

use std::sync::Arc;

use cucumber::World;
use ecostream::poller::{PollOutcome, PollerHandle};
use ecostream::reading::Reading;
use ecostream::state::StateHandle;
use ecostream::view::DashboardView;
use ecostream::Config;

use crate::doubles::GatedSource;

#[derive(Debug, Default, World)]
pub struct EcostreamWorld {
    // Polling
    pub state: Option<StateHandle>,
    pub next_seq: u64,
    pub last_outcome: Option<PollOutcome>,
    pub snapshot: Option<(Vec<Reading>, Option<Reading>)>,

    // View
    pub view: Option<DashboardView>,

    // Teardown
    pub gate: Option<Arc<GatedSource>>,
    pub poller: Option<PollerHandle>,

    // Dashboard
    pub response_status: Option<u16>,
    pub response_body: Option<String>,

    // Lifecycle
    pub config: Option<Config>,
    pub build_error: Option<String>,
    pub start_succeeded: Option<bool>,
}

impl EcostreamWorld {
    pub fn state(&mut self) -> StateHandle {
        self.state
            .get_or_insert_with(ecostream::state::new_state_handle)
            .clone()
    }

    /// Sequence number for the next simulated tick
    pub fn tick(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}
