//! CLI route: resolves an argument vector to one node of the tree and runs
//! it with the invocation's scope.

use std::collections::HashMap;
use std::ffi::OsString;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::parser::ValueSource;
use clap::{ArgMatches, Command};
use tracing::{debug, info, warn};

use crate::cli::completion::write_completion;
use crate::cli::exit::ExitOutcome;
use crate::cli::flags::ParsedFlags;
use crate::cli::node::CommandNode;
use crate::cli::output::{map_error, Console};
use crate::cli::parse::{build_command, walk_path, ARGS_ID, SHELL_ID};
use crate::cli::root::{RootCommand, COMPLETION_COMMAND};
use crate::config::{ConfigBinder, FlagValue, GlobalConfigStore};
use crate::error::DispatchError;
use crate::scope::{Capabilities, ExecutionScope};

/// Matched nodes along the selected path, root first, with their matches.
struct Resolution<'a> {
    levels: Vec<(&'a CommandNode, &'a ArgMatches)>,
    completion: Option<&'a ArgMatches>,
}

impl Resolution<'_> {
    fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.levels.iter().map(|(node, _)| node.name()).collect();
        if self.completion.is_some() {
            names.push(COMPLETION_COMMAND);
        }
        names
    }
}

impl RootCommand {
    /// Dispatch `argv` (program name excluded) writing to the process
    /// stdout and stderr.
    pub fn dispatch<I, T>(&self, argv: I, scope: &ExecutionScope) -> ExitOutcome
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.dispatch_with(argv, scope, &mut Console::stdio())
    }

    /// Dispatch `argv` (program name excluded). Every failure is reported
    /// on the console's stderr and turned into a non-zero outcome.
    pub fn dispatch_with<I, T>(
        &self,
        argv: I,
        scope: &ExecutionScope,
        console: &mut Console,
    ) -> ExitOutcome
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        match self.try_dispatch(&argv, scope, console) {
            Ok(outcome) => {
                info!(code = outcome.code(), "Command completed");
                outcome
            }
            Err(e) => {
                let outcome = match &e {
                    DispatchError::Command(inner) => ExitOutcome::from_error(inner),
                    _ => ExitOutcome::FAILURE,
                };
                warn!(error = %e, code = outcome.code(), "Command failed");
                console.eprint(&map_error(&e, self.name()));
                outcome
            }
        }
    }

    fn try_dispatch(
        &self,
        argv: &[OsString],
        scope: &ExecutionScope,
        console: &mut Console,
    ) -> Result<ExitOutcome, DispatchError> {
        let mut command = build_command(self);
        let full = std::iter::once(OsString::from(self.name())).chain(argv.iter().cloned());
        let matches = match command.try_get_matches_from_mut(full) {
            Ok(matches) => matches,
            Err(err) => return self.parse_failure(err, argv, console),
        };

        let resolution = resolve(self.node(), &matches)?;
        let names = resolution.names();
        info!(command = %names.join(" "), "Dispatching command");

        if let Some(completion) = resolution.completion {
            let shell = completion
                .try_get_one::<String>(SHELL_ID)
                .ok()
                .flatten()
                .ok_or_else(|| DispatchError::MalformedFlag("missing shell".to_string()))?;
            write_completion(&mut command, self.name(), shell, console.out())?;
            return Ok(ExitOutcome::SUCCESS);
        }

        let explicit = explicit_globals(self.binder(), &resolution.levels);
        let store = self.binder().resolve(&explicit, self.layers())?;
        let flags = parsed_flags(&resolution.levels, &store);

        let Some(&(leaf, leaf_matches)) = resolution.levels.last() else {
            return Ok(ExitOutcome::SUCCESS);
        };
        match leaf.run_fn() {
            Some(run) => {
                let args = positional_args(leaf_matches);
                let scope = scope.derive(Capabilities::new().with(store).with(flags));
                debug!(args = ?args, "Invoking run function");
                run(&scope, &args).map_err(DispatchError::Command)
            }
            None => {
                debug!("Command is not runnable, printing usage");
                console.print(&render_help(&mut command, &names[1..]));
                Ok(ExitOutcome::SUCCESS)
            }
        }
    }

    fn parse_failure(
        &self,
        err: clap::Error,
        argv: &[OsString],
        console: &mut Console,
    ) -> Result<ExitOutcome, DispatchError> {
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                console.print(&err.render().to_string());
                Ok(ExitOutcome::SUCCESS)
            }
            ErrorKind::DisplayVersion => {
                console.print(self.version_text());
                Ok(ExitOutcome::SUCCESS)
            }
            ErrorKind::InvalidSubcommand | ErrorKind::UnknownArgument => {
                match offending_token(&err) {
                    Some(token) if !token.starts_with('-') => {
                        let tokens: Vec<String> = argv
                            .iter()
                            .map(|arg| arg.to_string_lossy().into_owned())
                            .collect();
                        let path = walk_path(self.node(), &tokens).join(" ");
                        Err(DispatchError::UnknownCommand { path, token })
                    }
                    _ => Err(DispatchError::MalformedFlag(clap_message(&err))),
                }
            }
            _ => Err(DispatchError::MalformedFlag(clap_message(&err))),
        }
    }
}

fn resolve<'a>(
    root: &'a CommandNode,
    matches: &'a ArgMatches,
) -> Result<Resolution<'a>, DispatchError> {
    let mut levels = vec![(root, matches)];
    let mut node = root;
    let mut current = matches;
    while let Some((name, sub)) = current.subcommand() {
        match node.child(name) {
            Some(child) => {
                levels.push((child, sub));
                node = child;
                current = sub;
            }
            None if name == COMPLETION_COMMAND && std::ptr::eq(node, root) => {
                return Ok(Resolution {
                    levels,
                    completion: Some(sub),
                });
            }
            None => {
                return Err(DispatchError::UnknownCommand {
                    path: levels
                        .iter()
                        .map(|(n, _)| n.name())
                        .collect::<Vec<_>>()
                        .join(" "),
                    token: name.to_string(),
                })
            }
        }
    }
    Ok(Resolution {
        levels,
        completion: None,
    })
}

/// Value of `name` when the user passed it on the command line.
fn explicit_value(matches: &ArgMatches, name: &str, kind: &FlagValue) -> Option<FlagValue> {
    // try_get_* first: ids unknown at this level are an error, not a panic.
    let value = match kind {
        FlagValue::Switch(_) => matches
            .try_get_one::<bool>(name)
            .ok()
            .flatten()
            .map(|v| FlagValue::Switch(*v)),
        FlagValue::Text(_) => matches
            .try_get_one::<String>(name)
            .ok()
            .flatten()
            .map(|v| FlagValue::Text(v.clone())),
    }?;
    (matches.value_source(name) == Some(ValueSource::CommandLine)).then_some(value)
}

fn explicit_globals(
    binder: &ConfigBinder,
    levels: &[(&CommandNode, &ArgMatches)],
) -> HashMap<String, FlagValue> {
    let mut explicit = HashMap::new();
    for (name, default) in binder.entries() {
        let found = levels
            .iter()
            .rev()
            .find_map(|(_, matches)| explicit_value(matches, name, default));
        if let Some(value) = found {
            explicit.insert(name.to_string(), value);
        }
    }
    explicit
}

fn parsed_flags(levels: &[(&CommandNode, &ArgMatches)], store: &GlobalConfigStore) -> ParsedFlags {
    let mut flags = ParsedFlags::default();
    for (node, matches) in levels {
        for spec in node.flags() {
            let value = if spec.global {
                store.get(&spec.name).cloned()
            } else {
                explicit_value(matches, &spec.name, &spec.default)
            };
            flags.insert(&spec.name, value.unwrap_or_else(|| spec.default.clone()));
        }
    }
    flags
}

fn positional_args(matches: &ArgMatches) -> Vec<String> {
    matches
        .try_get_many::<String>(ARGS_ID)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn offending_token(err: &clap::Error) -> Option<String> {
    [ContextKind::InvalidSubcommand, ContextKind::InvalidArg]
        .into_iter()
        .find_map(|kind| match err.get(kind) {
            Some(ContextValue::String(token)) => Some(token.clone()),
            _ => None,
        })
}

fn clap_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    rendered
        .strip_prefix("error: ")
        .unwrap_or(&rendered)
        .to_string()
}

fn render_help(command: &mut Command, names: &[&str]) -> String {
    if let Some((name, rest)) = names.split_first() {
        if let Some(sub) = command.find_subcommand_mut(name) {
            return render_help(sub, rest);
        }
    }
    command.render_help().to_string()
}
