//! Integration tests for the built-in completion command

use clap_complete::Shell;
use powerpipe::cli::{CommandNode, CompletionOptions, ExitOutcome, COMPLETION_COMMAND};

use super::test_utils::{run_captured, sample_tree, Journal};

#[test]
fn test_bash_completion_lists_commands() {
    let journal = Journal::default();
    let root = sample_tree(&journal);

    let result = run_captured(&root, &["completion", "bash"]);
    assert_eq!(result.code, 0, "stderr: {}", result.stderr);
    assert!(result.stdout.contains("powerpipe"));
    assert!(result.stdout.contains("service"));
    assert!(journal.lock().is_empty());
}

#[test]
fn test_disabled_shell_is_rejected() {
    let journal = Journal::default();
    let root = sample_tree(&journal)
        .with_completion(CompletionOptions::default().disable_shell(Shell::PowerShell));

    let result = run_captured(&root, &["completion", "powershell"]);
    assert_ne!(result.code, 0);
    assert!(result.stdout.is_empty());

    assert_eq!(run_captured(&root, &["completion", "zsh"]).code, 0);
}

#[test]
fn test_disabled_default_command_is_unknown() {
    let journal = Journal::default();
    let root = sample_tree(&journal)
        .with_completion(CompletionOptions::default().disable_default_cmd());

    let result = run_captured(&root, &["completion", "bash"]);
    assert_ne!(result.code, 0);
    assert!(result.stderr.contains("unknown command \"completion\""));
}

#[test]
fn test_user_completion_command_wins() {
    let journal = Journal::default();
    let mut root = sample_tree(&journal);
    root.add_child(
        CommandNode::new(COMPLETION_COMMAND, "custom")
            .unwrap()
            .with_run(|_, args| Ok(ExitOutcome::new(args.len() as i32 + 10))),
    )
    .unwrap();

    assert_eq!(run_captured(&root, &["completion", "bash"]).code, 11);
}
