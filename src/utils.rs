use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Locate the program named by `cmd`.
///
/// `./name` is taken relative to `cwd`; any other name with a `/` is used
/// as given; a bare name is searched for in each `PATH` directory in order.
pub fn search_cmd(cmd: &str, paths: &str, cwd: &Path) -> Option<PathBuf> {
    if let Some(local) = cmd.strip_prefix("./") {
        let path = cwd.join(local);
        return path.exists().then_some(path);
    }

    if cmd.contains('/') {
        let path = PathBuf::from(cmd);
        return path.exists().then_some(path);
    }

    paths
        .split(':')
        .filter(|dir| !dir.is_empty())
        .map(|dir| Path::new(dir).join(cmd))
        .find(|path| is_executable(path))
}

fn is_executable(path: &Path) -> bool {
    match path.metadata() {
        Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}
