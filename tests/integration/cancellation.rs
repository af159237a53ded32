//! Integration tests for scope cancellation seen by subcommands

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use powerpipe::cli::{CommandNode, ExitOutcome, RootCommand};
use powerpipe::error::CommandFailure;
use powerpipe::scope::{Capabilities, ExecutionScope};
use powerpipe::version::Version;

use super::test_utils::run_captured;

fn root_with(child: CommandNode) -> RootCommand {
    let mut root = RootCommand::new("powerpipe", Version::new(0, 1, 0), "Powerpipe").unwrap();
    root.add_child(child).unwrap();
    root
}

#[test]
fn test_cancel_inside_run_reaches_spawned_worker() {
    let root = root_with(CommandNode::new("watch", "").unwrap().with_run(|scope, _| {
        let worker_scope = scope.clone();
        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            while !worker_scope.is_cancelled() {
                thread::sleep(Duration::from_millis(5));
            }
            tx.send(()).unwrap();
        });
        scope.cancel();
        rx.recv_timeout(Duration::from_secs(5))?;
        worker.join().unwrap();
        Err(CommandFailure::new(130, "interrupted").into())
    }));

    let result = run_captured(&root, &["watch"]);
    assert_eq!(result.code, 130);
    assert!(result.stderr.contains("interrupted"));
}

#[test]
fn test_parent_cancellation_reaches_dispatched_scope() {
    let root = root_with(CommandNode::new("wait", "").unwrap().with_run(|scope, _| {
        let token = scope.cancellation_token();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let cancelled = runtime.block_on(async {
            tokio::time::timeout(Duration::from_secs(5), token.cancelled())
                .await
                .is_ok()
        });
        Ok(if cancelled {
            ExitOutcome::new(9)
        } else {
            ExitOutcome::SUCCESS
        })
    }));

    let parent = ExecutionScope::root(Capabilities::new());
    let trigger = parent.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        trigger.cancel();
    });

    let (mut console, _, _) = powerpipe::cli::Console::buffered();
    let outcome = root.dispatch_with(["wait"], &parent, &mut console);
    canceller.join().unwrap();
    assert_eq!(outcome.code(), 9);
}

#[test]
fn test_derived_cancel_leaves_parent_running() {
    let parent = ExecutionScope::root(Capabilities::new());
    let child = parent.derive(Capabilities::new());
    child.cancel();
    assert!(child.is_cancelled());
    assert!(!parent.is_cancelled());
}
