use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::models::BookingEvent;
use crate::services::clock::Clock;
use crate::store::BookingStore;

pub struct AppState {
    pub store: Box<dyn BookingStore>,
    pub config: AppConfig,
    pub clock: Box<dyn Clock>,
    pub events_tx: broadcast::Sender<BookingEvent>,
}
