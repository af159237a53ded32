//! Integration tests for the exit status handed back to the process

use powerpipe::cli::{CommandNode, ExitController, ExitOutcome, RootCommand};
use powerpipe::error::CommandFailure;
use powerpipe::version::Version;

use super::test_utils::run_captured;

fn root_with(children: Vec<CommandNode>) -> RootCommand {
    let mut root = RootCommand::new("powerpipe", Version::new(0, 1, 0), "Powerpipe").unwrap();
    for child in children {
        root.add_child(child).unwrap();
    }
    root
}

#[test]
fn test_success_is_zero() {
    let root = root_with(vec![CommandNode::new("ok", "")
        .unwrap()
        .with_run(|_, _| Ok(ExitOutcome::SUCCESS))]);
    assert_eq!(run_captured(&root, &["ok"]).code, 0);
}

#[test]
fn test_plain_error_is_one() {
    let root = root_with(vec![CommandNode::new("broken", "")
        .unwrap()
        .with_run(|_, _| anyhow::bail!("service not reachable"))]);

    let result = run_captured(&root, &["broken"]);
    assert_eq!(result.code, 1);
    assert_eq!(result.stderr, "Error: service not reachable\n");
}

#[test]
fn test_command_failure_code_is_kept() {
    let root = root_with(vec![
        CommandNode::new("coded", "")
            .unwrap()
            .with_run(|_, _| Err(CommandFailure::new(3, "mod not found").into())),
        CommandNode::new("zero", "")
            .unwrap()
            .with_run(|_, _| Err(CommandFailure::new(0, "zero is not a failure code").into())),
    ]);

    assert_eq!(run_captured(&root, &["coded"]).code, 3);
    assert_eq!(run_captured(&root, &["zero"]).code, 1);
}

#[test]
fn test_returned_outcome_is_kept() {
    let root = root_with(vec![CommandNode::new("partial", "")
        .unwrap()
        .with_run(|_, _| Ok(ExitOutcome::new(2)))]);

    let result = run_captured(&root, &["partial"]);
    assert_eq!(result.code, 2);
    assert!(result.stderr.is_empty());
}

#[test]
fn test_controller_keeps_first_outcome() {
    let mut exit = ExitController::new();
    assert!(!exit.is_recorded());
    exit.record(ExitOutcome::new(5));
    exit.record(ExitOutcome::SUCCESS);
    assert_eq!(exit.finish(), 5);
}
