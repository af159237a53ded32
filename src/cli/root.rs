//! Root command: owns the tree, the global flag bindings, and the
//! registration-time options that apply to the whole program.

use clap_complete::Shell;

use crate::cli::exit::ExitOutcome;
use crate::cli::flags::FlagSpec;
use crate::cli::node::{validate_name, CommandNode};
use crate::config::{ConfigBinder, ConfigLayers};
use crate::error::RegistrationError;
use crate::scope::ExecutionScope;
use crate::version::{version_line, Version};

/// Name of the built-in completion command.
pub const COMPLETION_COMMAND: &str = "completion";

/// Which completion generators the built-in `completion` command offers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionOptions {
    disable_default_cmd: bool,
    disabled_shells: Vec<Shell>,
}

impl CompletionOptions {
    /// Drop the built-in `completion` command altogether.
    pub fn disable_default_cmd(mut self) -> Self {
        self.disable_default_cmd = true;
        self
    }

    /// Stop offering a generator for `shell`.
    pub fn disable_shell(mut self, shell: Shell) -> Self {
        if !self.disabled_shells.contains(&shell) {
            self.disabled_shells.push(shell);
        }
        self
    }

    pub fn enabled_shells(&self) -> Vec<Shell> {
        [
            Shell::Bash,
            Shell::Zsh,
            Shell::Fish,
            Shell::Elvish,
            Shell::PowerShell,
        ]
        .into_iter()
        .filter(|shell| !self.disabled_shells.contains(shell))
        .collect()
    }

    pub fn is_enabled(&self) -> bool {
        !self.disable_default_cmd && !self.enabled_shells().is_empty()
    }
}

pub struct RootCommand {
    node: CommandNode,
    version: Version,
    version_template: String,
    binder: ConfigBinder,
    layers: ConfigLayers,
    completion: CompletionOptions,
}

impl RootCommand {
    /// Create the root. Only the name is validated.
    pub fn new(name: &str, version: Version, about: &str) -> Result<Self, RegistrationError> {
        validate_name(name)?;
        let node = CommandNode::new(name, about)?;
        let version_template = version_line(name, &version);
        Ok(Self {
            node,
            version,
            version_template,
            binder: ConfigBinder::new(),
            layers: ConfigLayers::empty(),
            completion: CompletionOptions::default(),
        })
    }

    /// Text printed for `--version` at any level.
    pub fn version_template(mut self, template: impl Into<String>) -> Self {
        self.version_template = template.into();
        self
    }

    pub fn with_usage(mut self, usage: &str) -> Self {
        self.node = self.node.with_usage(usage);
        self
    }

    pub fn with_completion(mut self, options: CompletionOptions) -> Self {
        self.completion = options;
        self
    }

    /// Environment and file layers consulted for unset global flags.
    pub fn with_layers(mut self, layers: ConfigLayers) -> Self {
        self.layers = layers;
        self
    }

    /// Run function used when no subcommand is selected.
    pub fn with_run<F>(mut self, run: F) -> Self
    where
        F: Fn(&ExecutionScope, &[String]) -> anyhow::Result<ExitOutcome> + Send + Sync + 'static,
    {
        self.node = self.node.with_run(run);
        self
    }

    /// Declare a flag on the root. Global flags are bound into the config
    /// store under their name.
    pub fn declare_flag(&mut self, spec: FlagSpec) -> Result<(), RegistrationError> {
        if spec.global {
            if self.binder.is_bound(&spec.name) {
                return Err(RegistrationError::DuplicateBinding(spec.name));
            }
            self.node.declare_flag(spec.clone())?;
            self.binder.bind(&spec.name, spec.default)
        } else {
            self.node.declare_flag(spec)
        }
    }

    /// Attach a subtree, binding every global flag it declares.
    pub fn add_child(&mut self, child: CommandNode) -> Result<(), RegistrationError> {
        let mut staged = self.binder.clone();
        for spec in child.global_flags() {
            staged.bind(&spec.name, spec.default.clone())?;
        }
        self.node.add_child(child)?;
        self.binder = staged;
        Ok(())
    }

    pub fn name(&self) -> &str {
        self.node.name()
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn version_text(&self) -> &str {
        &self.version_template
    }

    pub fn node(&self) -> &CommandNode {
        &self.node
    }

    pub fn binder(&self) -> &ConfigBinder {
        &self.binder
    }

    pub fn layers(&self) -> &ConfigLayers {
        &self.layers
    }

    pub fn completion(&self) -> &CompletionOptions {
        &self.completion
    }

    /// True when the built-in completion command is part of the tree.
    pub fn has_builtin_completion(&self) -> bool {
        self.completion.is_enabled() && self.node.child(COMPLETION_COMMAND).is_none()
    }
}
