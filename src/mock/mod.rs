//! Mock Controller
//!
//! In-memory stand-in for a tablet's query-serving controller, for testing
//! the components that drive one (health checkers, state-change
//! orchestrators, schema reload triggers).
//!
//! # Observing the mock
//!
//! - `state_changes()`: one [`StateChange`] per `set_serving_type` call,
//!   recorded even when the call fails
//! - `broadcast_data()`: one [`BroadcastData`] per `broadcast_health` call
//!
//! Both queues are bounded. A full queue blocks the call that pushes to it,
//! so drain them as you go.
//!
//! # Test hooks
//!
//! - `set_serving_type_error`: make `set_serving_type` refuse transitions
//! - `set_query_service_enabled_for_tests`: force the serving flag
//! - `get_query_rules`: read back what `set_query_rules` stored

mod controller;
mod events;
mod state;

pub use controller::MockController;
pub use events::{BroadcastData, EventQueue, StateChange};
pub use state::ControllerState;
