#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const XIPHER: &str = env!("CARGO_BIN_EXE_xipher");
const TMP_DIR: &str = env!("CARGO_TARGET_TMPDIR");

#[derive(Debug)]
pub struct Output {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

pub fn run(args: &[&str]) -> Output {
    run_with_stdin(args, b"")
}

pub fn run_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
    let mut command = Command::new(XIPHER);
    command.env("NO_COLOR", "1");
    command.env_remove("XIPHER_SECRET");
    command.env_remove("PAGER");
    command.stdin(Stdio::piped());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    for arg in args {
        command.arg(arg);
    }

    let mut child = command.spawn().unwrap();
    child.stdin.take().unwrap().write_all(stdin).unwrap();
    let output = child.wait_with_output().unwrap();

    Output {
        exit_code: output.status.code().unwrap(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Write `contents` to a freshly named file under `CARGO_TARGET_TMPDIR`
/// and return its path, for tests that need an on-disk input file.
pub fn write_tmp_file(file_name: &str, contents: &[u8]) -> PathBuf {
    let path = Path::new(TMP_DIR).join(file_name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn checksum(path: &Path) -> String {
    let payload = std::fs::read(path).unwrap();
    let hash = blake3::hash(&payload);
    // Hexadecimal is nicer to debug than plain bytes.
    hash.to_hex().to_string()
}
