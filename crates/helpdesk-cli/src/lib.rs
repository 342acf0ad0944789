//! Command-line surface and startup wiring for the helpdesk bot.

mod cli_args;
mod cli_types;
mod startup;

pub use cli_args::Cli;
pub use cli_types::{AdminIds, CliRecordExpiry};
pub use startup::{build_router, init_tracing, log_filter_directives, open_store};
