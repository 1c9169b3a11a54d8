use assert_cmd::Command;
use std::ffi::OsStr;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug)]
pub struct IhRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl IhRun {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.stdout.trim())
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {}", self.stdout))
    }

    pub fn error_json(&self) -> serde_json::Value {
        serde_json::from_str(self.stderr.trim())
            .unwrap_or_else(|e| panic!("stderr is not JSON ({e}): {}", self.stderr))
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// A temp directory used as both CWD and HOME for the binary.
pub struct IhWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl IhWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    /// A workspace that already ran `ih init`.
    pub fn initialized() -> Self {
        let workspace = Self::new();
        let init = run_ih(&workspace, ["init"]);
        assert!(init.status.success(), "init failed: {}", init.stderr);
        workspace
    }
}

pub fn command(workspace: &IhWorkspace) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ih"));
    cmd.current_dir(&workspace.root);
    cmd.env("HOME", &workspace.root);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("IH_USER");
    cmd.env_remove("IH_ORG");
    cmd.env_remove("IH_DB");
    cmd.env_remove("ISSUEHUB_DIR");
    cmd
}

pub fn run_ih<I, S>(workspace: &IhWorkspace, args: I) -> IhRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_ih_with_env(workspace, args, std::iter::empty::<(String, String)>())
}

pub fn run_ih_with_env<I, S, E, K, V>(workspace: &IhWorkspace, args: I, env_vars: E) -> IhRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = command(workspace);
    cmd.args(args);
    cmd.envs(env_vars);
    let output = cmd.output().expect("run ih");
    IhRun {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status,
    }
}

/// `ih --user alice --org acme --json <args>`
pub fn run_as_alice<I, S>(workspace: &IhWorkspace, args: I) -> IhRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut full: Vec<std::ffi::OsString> = ["--user", "alice", "--org", "acme", "--json"]
        .iter()
        .map(std::ffi::OsString::from)
        .collect();
    full.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
    run_ih(workspace, full)
}
