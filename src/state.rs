use std::sync::Arc;

use crate::community::CommunityBoard;
use crate::config::ServiceSettings;
use crate::db::Store;
use crate::sos::hold::HoldGesture;
use crate::sos::sessions::HoldSessions;

/// Shared by every request handler and the device consumer.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub settings: ServiceSettings,
    pub holds: HoldSessions,
    pub community: CommunityBoard,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, settings: ServiceSettings, community: CommunityBoard) -> Self {
        let gesture = HoldGesture::new(settings.sos.hold_duration, settings.sos.tick)
            .with_keepalive(settings.sos.keepalive);
        Self {
            store,
            settings,
            holds: HoldSessions::new(gesture),
            community,
        }
    }
}
