//! Text command routing for helpdesk modules.
//!
//! A single [`CommandRouter`] is built at startup; each module registers its
//! aliases during setup and the router is then shared immutably by the
//! gateway event handler.

pub mod router;
pub mod snippets;

pub use router::{
    parse_command_trigger, CommandHandler, CommandInvocation, CommandRegistration, CommandRouter,
    CommandSummary, CommandTrigger, DispatchOutcome, RouterError,
};
pub use snippets::{register_snippet_commands, snippet_key, Snippet, SnippetContent};
