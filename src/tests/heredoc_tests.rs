use std::fs;

use tempfile::NamedTempFile;

use crate::heredoc::{attach, collect, MARKER};
use crate::input::LineSource;
use crate::jobs::JobState;
use crate::redirect::RedirectionPlan;
use crate::shell::LineOutcome;
use crate::tests::{script, test_shell};

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

#[test]
fn test_collect_stops_at_terminator() {
    let mut source = script("first line\n  second } line\n}\nnext command\n");

    let heredoc = collect(&mut source).unwrap();
    assert_eq!(&heredoc.body()[..], b"first line\n  second } line\n");
    assert_eq!(source.next_line("").unwrap(), Some("next command".to_string()));
}

#[test]
fn test_collect_needs_exact_terminator() {
    let mut source = script(" }\n}}\n}\n");

    let heredoc = collect(&mut source).unwrap();
    assert_eq!(&heredoc.body()[..], b" }\n}}\n");
}

#[test]
fn test_collect_until_end_of_input() {
    let mut source = script("dangling\n");

    let heredoc = collect(&mut source).unwrap();
    assert_eq!(&heredoc.body()[..], b"dangling\n");
    assert_eq!(source.next_line("").unwrap(), None);
}

#[test]
fn test_attach_removes_marker() {
    let mut command = words(&["cat", MARKER, "-n"]);
    let mut source = script("body\n}\n");

    let heredoc = attach(&mut command, &RedirectionPlan::default(), &mut source).unwrap();
    assert_eq!(command, words(&["cat", "-n"]));
    assert_eq!(&heredoc.unwrap().body()[..], b"body\n");
}

#[test]
fn test_attach_skipped_with_redirection() {
    let mut command = words(&["cat", MARKER]);
    let plan = RedirectionPlan {
        output: Some("out.txt".into()),
        ..RedirectionPlan::default()
    };
    let mut source = script("body\n}\n");

    let heredoc = attach(&mut command, &plan, &mut source).unwrap();
    assert!(heredoc.is_none());
    assert_eq!(command, words(&["cat"]));
    assert_eq!(source.next_line("").unwrap(), Some("body".to_string()));
}

#[test]
fn test_attach_without_marker_reads_nothing() {
    let mut command = words(&["cat", "file"]);
    let mut source = script("untouched\n");

    assert!(attach(&mut command, &RedirectionPlan::default(), &mut source)
        .unwrap()
        .is_none());
    assert_eq!(source.next_line("").unwrap(), Some("untouched".to_string()));
}

#[test]
fn test_here_document_is_stdin() -> Result<(), String> {
    let mut shell = test_shell();
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_str().unwrap();
    let mut source = script("line one\nline two\n}\nafter\n");

    let outcome = shell
        .execute_line(&format!("tee {} HERE{{", path), &mut source)
        .map_err(|e| e.to_string())?;
    assert_eq!(outcome, LineOutcome::Finished(JobState::Exited(0)));
    assert_eq!(fs::read_to_string(path).unwrap(), "line one\nline two\n");
    assert_eq!(source.next_line("").unwrap(), Some("after".to_string()));
    Ok(())
}

#[test]
fn test_here_document_reaches_argument_free_command() -> Result<(), String> {
    let mut shell = test_shell();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("copy.txt");
    let copier = crate::tests::write_script(
        dir.path(),
        "copier",
        &format!("[ $# -eq 0 ] || exit 9\ncat > {}", out.display()),
    );
    let mut source = script("alpha\nbeta\n}\n");

    let outcome = shell
        .execute_line(&format!("{} HERE{{", copier), &mut source)
        .map_err(|e| e.to_string())?;
    assert_eq!(outcome, LineOutcome::Finished(JobState::Exited(0)));
    assert_eq!(fs::read_to_string(&out).unwrap(), "alpha\nbeta\n");
    Ok(())
}

#[test]
fn test_skipped_line_drops_its_heredoc() -> Result<(), String> {
    let mut shell = test_shell();
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran");
    let mut source = script(&format!(
        "false\nifok cat HERE{{\necho body > {}\n}}\necho after\n",
        marker.display()
    ));

    shell.run(&mut source).map_err(|e| e.to_string())?;
    assert!(!marker.exists());
    assert_eq!(shell.state().last_status(), 0);
    Ok(())
}

#[test]
fn test_aborted_line_drops_its_heredoc() -> Result<(), String> {
    let mut shell = test_shell();
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran");
    let mut source = script(&format!("echo body > {}\n}}\nnext\n", marker.display()));

    let outcome = shell
        .execute_line("cat $NOT_SET HERE{", &mut source)
        .map_err(|e| e.to_string())?;
    assert_eq!(outcome, LineOutcome::Aborted);
    assert_eq!(source.next_line("").unwrap(), Some("next".to_string()));

    let mut source = script("body\n}\nnext\n");
    let outcome = shell
        .execute_line("cat HERE{ <", &mut source)
        .map_err(|e| e.to_string())?;
    assert_eq!(outcome, LineOutcome::Aborted);
    assert_eq!(source.next_line("").unwrap(), Some("next".to_string()));
    assert!(!marker.exists());
    Ok(())
}
