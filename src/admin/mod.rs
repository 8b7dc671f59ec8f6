//! The admin page: transitions, views and cross-context reconciliation.

mod console;
mod controller;
mod reconcile;
mod state;

pub use console::AdminConsole;
