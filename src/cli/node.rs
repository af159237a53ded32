//! Command nodes: the units the command tree is built from.
//!
//! A node is runnable when it has a run function and is a parent when it
//! has children; the two are independent. Trees are assembled bottom-up:
//! a parent takes ownership of each child it is given, so a node can never
//! appear under two parents.

use std::fmt;
use std::sync::Arc;

use crate::cli::exit::ExitOutcome;
use crate::cli::flags::{FlagSpec, RESERVED_FLAGS};
use crate::error::RegistrationError;
use crate::scope::ExecutionScope;

/// Run contract every invocable node honors.
pub type RunFn =
    Arc<dyn Fn(&ExecutionScope, &[String]) -> anyhow::Result<ExitOutcome> + Send + Sync>;

/// Subcommand name clap generates for every parent.
pub(crate) const HELP_COMMAND: &str = "help";

pub struct CommandNode {
    name: String,
    about: String,
    usage: Option<String>,
    flags: Vec<FlagSpec>,
    children: Vec<CommandNode>,
    run: Option<RunFn>,
}

pub(crate) fn validate_name(name: &str) -> Result<(), RegistrationError> {
    if name.is_empty() || name.starts_with('-') || name.chars().any(char::is_whitespace) {
        return Err(RegistrationError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl CommandNode {
    pub fn new(name: &str, about: &str) -> Result<Self, RegistrationError> {
        validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            about: about.to_string(),
            usage: None,
            flags: Vec::new(),
            children: Vec::new(),
            run: None,
        })
    }

    /// Make the node runnable.
    pub fn with_run<F>(mut self, run: F) -> Self
    where
        F: Fn(&ExecutionScope, &[String]) -> anyhow::Result<ExitOutcome> + Send + Sync + 'static,
    {
        self.run = Some(Arc::new(run));
        self
    }

    /// Replace the generated usage line.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self
    }

    /// Declare a flag on this node.
    ///
    /// Global flags declared here are bound into the config store when the
    /// node's subtree is attached to a root.
    pub fn declare_flag(&mut self, spec: FlagSpec) -> Result<(), RegistrationError> {
        validate_name(&spec.name)?;
        let clashes = RESERVED_FLAGS.contains(&spec.name.as_str())
            || self.flags.iter().any(|f| f.name == spec.name)
            || (spec.global && self.children.iter().any(|c| c.declares_flag(&spec.name)));
        if clashes {
            return Err(RegistrationError::DuplicateFlag {
                command: self.name.clone(),
                flag: spec.name,
            });
        }
        self.flags.push(spec);
        Ok(())
    }

    /// Attach `child` under this node.
    pub fn add_child(&mut self, child: CommandNode) -> Result<(), RegistrationError> {
        if child.name == HELP_COMMAND || self.child(&child.name).is_some() {
            return Err(RegistrationError::DuplicateName {
                parent: self.name.clone(),
                name: child.name,
            });
        }
        let inherited: Vec<String> = self
            .flags
            .iter()
            .filter(|f| f.global)
            .map(|f| f.name.clone())
            .collect();
        child.check_flag_conflicts(&inherited)?;
        self.children.push(child);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn about(&self) -> &str {
        &self.about
    }

    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn flags(&self) -> &[FlagSpec] {
        &self.flags
    }

    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    /// Child with exactly this name.
    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn is_runnable(&self) -> bool {
        self.run.is_some()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub(crate) fn run_fn(&self) -> Option<&RunFn> {
        self.run.as_ref()
    }

    /// True when this node or any descendant declares `name`.
    pub(crate) fn declares_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f.name == name)
            || self.children.iter().any(|c| c.declares_flag(name))
    }

    /// Global flags declared anywhere in this subtree, parents first.
    pub(crate) fn global_flags(&self) -> Vec<&FlagSpec> {
        let mut out: Vec<&FlagSpec> = self.flags.iter().filter(|f| f.global).collect();
        for child in &self.children {
            out.extend(child.global_flags());
        }
        out
    }

    /// Every node in this subtree must avoid the names of global flags it
    /// inherits.
    pub(crate) fn check_flag_conflicts(&self, inherited: &[String]) -> Result<(), RegistrationError> {
        if let Some(flag) = self.flags.iter().find(|f| inherited.contains(&f.name)) {
            return Err(RegistrationError::DuplicateFlag {
                command: self.name.clone(),
                flag: flag.name.clone(),
            });
        }
        let mut visible = inherited.to_vec();
        visible.extend(self.flags.iter().filter(|f| f.global).map(|f| f.name.clone()));
        for child in &self.children {
            child.check_flag_conflicts(&visible)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("children", &self.children)
            .field("runnable", &self.is_runnable())
            .finish()
    }
}
