//! Application Layer
//!
//! Turns one parsed CLI action into one exchange port call and a report
//! for the output formatter.

pub mod confirm;
pub mod dispatcher;

pub use confirm::{Confirmation, StdinConfirmation};
pub use dispatcher::{Action, Dispatcher, OrderScope, Report};
