use log::trace;
use scorelift_ports::process::{CommandOutput, CommandRunner};
use std::ffi::OsStr;
use std::io;
use std::path::PathBuf;
use std::process::Command;

/// Spawns real OS processes and waits for them, capturing both streams.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> io::Result<CommandOutput> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;
        // output() drains stdout and stderr concurrently, so a chatty child cannot block on a full pipe.
        let output = Command::new(program).args(args).output()?;
        trace!(
            "{program} wrote {} bytes to stdout, {} to stderr",
            output.stdout.len(),
            output.stderr.len()
        );
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

pub fn executable_name(base: &str) -> String {
    if cfg!(windows) {
        format!("{base}.exe")
    } else {
        base.to_string()
    }
}

/// First regular file called `name` (plus `.exe` on Windows) on `PATH`.
pub fn find_on_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    find_in_dirs(&path_var, name)
}

fn find_in_dirs(path_var: &OsStr, name: &str) -> Option<PathBuf> {
    let file_name = executable_name(name);
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
}
