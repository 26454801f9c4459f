use std::sync::Arc;

use mitigation_condition::IsimClient;
use mitigation_executor::actuator::ActuatorClient;
use mitigation_ingest::IngestCore;
use mitigation_store::StateStore;

/// Everything a handler or the bus subscriber needs, explicit rather than
/// reached for through a global (spec §9: "pass an explicit context carrying
/// handles to state store, ISIM driver, logger, and bus client").
pub struct AppContext {
    pub store: StateStore,
    pub isim: Arc<dyn IsimClient>,
    pub actuator: Arc<dyn ActuatorClient>,
    pub ingest: IngestCore,
}
