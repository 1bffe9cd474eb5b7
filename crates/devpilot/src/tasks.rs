//! Ledger of tool invocation attempts for the current exchange.

pub mod ledger;
pub mod task;

pub use ledger::{TaskLedger, TaskObserver};
pub use task::{Task, TaskStatus, TaskUpdate};
