mod heredoc_tests;
mod tokenizer_tests;

use std::io::Cursor;

use crate::input::ScriptSource;
use crate::shell::Shell;
use crate::state::ShellState;

/// Shell with the test process's PATH and nothing else inherited.
pub(crate) fn test_shell() -> Shell {
    let path = std::env::var("PATH").unwrap_or_else(|_| "/usr/bin:/bin".to_string());
    Shell::new(ShellState::with_vars([("PATH", path)]))
}

/// Control stream holding whatever follows the line under test.
pub(crate) fn script(rest: &str) -> ScriptSource<Cursor<Vec<u8>>> {
    ScriptSource::new(Cursor::new(rest.as_bytes().to_vec()))
}

/// Write an executable shell script into `dir`.
pub(crate) fn write_script(dir: &std::path::Path, name: &str, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}
