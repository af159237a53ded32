//! Shared test utilities for integration tests
//!
//! Builds small command trees whose run functions record what they saw, and
//! runs them through the bootstrap with captured output.

use std::sync::Arc;

use parking_lot::Mutex;
use powerpipe::cli::{Bootstrap, CommandNode, Console, ExitOutcome, FlagSpec, RootCommand};
use powerpipe::config::ConfigLayers;
use powerpipe::scope::ExecutionScope;
use powerpipe::status::FixedProbe;
use powerpipe::version::{version_line, Version};

/// One observed run: the node name, its positional args, and the resolved
/// install dir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub args: Vec<String>,
    pub install_dir: Option<String>,
}

pub type Journal = Arc<Mutex<Vec<Invocation>>>;

/// Result of one captured run.
pub struct Captured {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

pub fn recording(name: &str, journal: &Journal) -> CommandNode {
    let journal = Arc::clone(journal);
    let command = name.to_string();
    CommandNode::new(name, &format!("{} command", name))
        .unwrap()
        .with_run(move |scope: &ExecutionScope, args: &[String]| {
            let install_dir = scope
                .config()
                .and_then(|store| store.get_str("install-dir").map(str::to_string));
            journal.lock().push(Invocation {
                command: command.clone(),
                args: args.to_vec(),
                install_dir,
            });
            Ok(ExitOutcome::SUCCESS)
        })
}

/// `powerpipe` with `service {start, stop}` and a runnable `mod {list}`, all
/// recording into `journal`.
pub fn sample_tree(journal: &Journal) -> RootCommand {
    sample_tree_with_layers(journal, ConfigLayers::empty())
}

pub fn sample_tree_with_layers(journal: &Journal, layers: ConfigLayers) -> RootCommand {
    let version = Version::new(0, 4, 2);
    let template = version_line("Powerpipe", &version);
    let mut root = RootCommand::new("powerpipe", version, "Powerpipe")
        .unwrap()
        .with_usage("powerpipe [--version] [--help] COMMAND [args]")
        .version_template(template)
        .with_layers(layers);
    root.declare_flag(FlagSpec::text("install-dir", "/default/install", "Install dir").global())
        .unwrap();

    let mut service = CommandNode::new("service", "Service management").unwrap();
    service.add_child(recording("start", journal)).unwrap();
    service.add_child(recording("stop", journal)).unwrap();

    let mut mods = recording("mod", journal);
    mods.add_child(recording("list", journal)).unwrap();

    root.add_child(service).unwrap();
    root.add_child(mods).unwrap();
    root
}

pub fn run_captured(root: &RootCommand, argv: &[&str]) -> Captured {
    let (mut console, out, err) = Console::buffered();
    let code = Bootstrap::new()
        .with_probe(FixedProbe(false))
        .run_with(root, argv.iter().copied(), &mut console);
    Captured {
        code,
        stdout: out.contents(),
        stderr: err.contents(),
    }
}
