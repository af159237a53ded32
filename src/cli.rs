//! CLI domain: command tree registration, dispatch, and the process exit
//! path. Subcommand behavior lives in `crate::commands`.

mod bootstrap;
mod completion;
mod exit;
mod flags;
mod node;
mod output;
mod parse;
mod root;
mod route;

pub use bootstrap::{run, Bootstrap, INTERRUPTED_EXIT_CODE};
pub use exit::{ExitController, ExitOutcome};
pub use flags::{FlagSpec, ParsedFlags};
pub use node::{CommandNode, RunFn};
pub use output::{map_error, Console, SharedBuffer};
pub use parse::{build_command, walk_path};
pub use root::{CompletionOptions, RootCommand, COMPLETION_COMMAND};
