//! Binary-side application flow: configuration, progress UI, orchestration.

mod config;
mod dry_run;
mod progress_manager;
mod runtime;

pub(crate) use runtime::run;
