//! CLI parse: turns the command tree into a clap command. No behavior beyond
//! the definitions clap needs.

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command, ValueEnum};

use crate::cli::flags::FlagSpec;
use crate::cli::node::CommandNode;
use crate::cli::root::{RootCommand, COMPLETION_COMMAND};
use crate::config::FlagValue;

/// Id of the trailing positional arguments on runnable nodes.
pub(crate) const ARGS_ID: &str = "args";

/// Id of the shell argument on the built-in completion command.
pub(crate) const SHELL_ID: &str = "shell";

/// Clap command for the whole tree rooted at `root`.
pub fn build_command(root: &RootCommand) -> Command {
    let mut command = node_command(root.node())
        .version(root.version().to_string())
        .propagate_version(true);

    if root.has_builtin_completion() {
        let shells = root.completion().enabled_shells();
        command = command.subcommand(
            Command::new(COMPLETION_COMMAND)
                .about("Generate the autocompletion script for the specified shell")
                .arg(
                    Arg::new(SHELL_ID)
                        .required(true)
                        .value_parser(PossibleValuesParser::new(
                            shells.iter().filter_map(ValueEnum::to_possible_value),
                        )),
                ),
        );
    }
    command
}

fn node_command(node: &CommandNode) -> Command {
    let mut command = Command::new(node.name().to_string()).about(node.about().to_string());
    if let Some(usage) = node.usage() {
        command = command.override_usage(usage.to_string());
    }
    for flag in node.flags() {
        command = command.arg(flag_arg(flag));
    }
    if node.is_runnable() {
        command = command.arg(
            Arg::new(ARGS_ID)
                .value_name("ARGS")
                .num_args(0..)
                .trailing_var_arg(true)
                .action(ArgAction::Append),
        );
        if node.has_children() {
            // Once a positional argument is seen the walk stops.
            command = command.args_conflicts_with_subcommands(true);
        }
    }
    for child in node.children() {
        command = command.subcommand(node_command(child));
    }
    command
}

fn flag_arg(spec: &FlagSpec) -> Arg {
    // Defaults are applied by dispatch so explicit values can be told apart
    // from defaulted ones at every level.
    let mut arg = Arg::new(spec.name.clone())
        .long(spec.name.clone())
        .global(spec.global);
    if let Some(short) = spec.short {
        arg = arg.short(short);
    }
    match &spec.default {
        FlagValue::Switch(_) => arg.help(spec.help.clone()).action(ArgAction::SetTrue),
        FlagValue::Text(default) => {
            let help = if default.is_empty() {
                spec.help.clone()
            } else {
                format!("{} (default \"{}\")", spec.help, default)
            };
            arg.help(help)
                .value_name(value_name(&spec.name))
                .action(ArgAction::Set)
        }
    }
}

fn value_name(flag: &str) -> String {
    match flag.rsplit('-').next() {
        Some(last) if last == "dir" || last == "path" => "PATH".to_string(),
        _ => "VALUE".to_string(),
    }
}

/// Tree walk over raw tokens: consume leading tokens that exactly name a
/// child, skipping flags (and the value of a flag that takes one), and stop
/// at the first token that is neither.
///
/// Returns the names of the matched nodes, root first.
pub fn walk_path<'a>(root: &'a CommandNode, tokens: &[String]) -> Vec<&'a str> {
    let mut path = vec![root.name()];
    let mut node = root;
    let mut value_flags: Vec<&FlagSpec> = Vec::new();
    collect_value_flags(node, &mut value_flags);

    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        if token == "--" {
            break;
        }
        if let Some(name) = token.strip_prefix("--") {
            if !name.contains('=') && value_flags.iter().any(|f| f.name == name) {
                iter.next();
            }
            continue;
        }
        if let Some(shorts) = token.strip_prefix('-').filter(|s| !s.is_empty()) {
            let mut chars = shorts.chars();
            let takes_value = chars.next().map_or(false, |c| {
                value_flags.iter().any(|f| f.short == Some(c))
            }) && chars.next().is_none();
            if takes_value {
                iter.next();
            }
            continue;
        }
        match node.child(token) {
            Some(child) => {
                node = child;
                path.push(child.name());
                collect_value_flags(node, &mut value_flags);
            }
            None => break,
        }
    }
    path
}

fn collect_value_flags<'a>(node: &'a CommandNode, out: &mut Vec<&'a FlagSpec>) {
    out.extend(node.flags().iter().filter(|f| !f.default.is_switch()));
}
