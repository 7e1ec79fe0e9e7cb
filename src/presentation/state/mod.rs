mod app_state;
mod service_slot;

pub use app_state::AppState;
pub use service_slot::ServiceSlot;
