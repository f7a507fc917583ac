// src/kitchen/process.rs

//! Running external tools (git, cmake) with their output kept in the build log

use crate::error::{Error, Result};
use crate::settings::BuildType;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Accumulated output of every tool run during a cook
#[derive(Debug, Default, Clone)]
pub struct BuildLog {
    text: String,
}

impl BuildLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    /// Log tool output (stdout/stderr) with a phase header
    pub fn output(&mut self, phase: &str, stdout: &str, stderr: &str) {
        self.line(&format!("=== {} ===", phase));
        if !stdout.is_empty() {
            self.text.push_str(stdout);
            if !stdout.ends_with('\n') {
                self.text.push('\n');
            }
        }
        if !stderr.is_empty() {
            self.text.push_str(stderr);
            if !stderr.ends_with('\n') {
                self.text.push('\n');
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Locate a program on PATH (or check an explicit path)
pub fn locate_tool(program: &str) -> Result<PathBuf> {
    which::which(program).map_err(|e| Error::ToolNotFound(format!("{} ({})", program, e)))
}

/// Run a program to completion, logging its output
///
/// Returns stdout. A non-zero exit is a `CommandFailed` for `phase`.
pub fn run_tool<I, S>(
    phase: &str,
    program: &Path,
    args: I,
    cwd: Option<&Path>,
    log: &mut BuildLog,
) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    debug!("Running {}: {:?}", phase, cmd);

    let output = cmd
        .output()
        .map_err(|e| Error::IoError(format!("Failed to run {} phase: {}", phase, e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    log.output(phase, &stdout, &stderr);
    if !stdout.is_empty() {
        debug!("{} stdout:\n{}", phase, stdout.trim_end());
    }
    if !stderr.is_empty() {
        debug!("{} stderr:\n{}", phase, stderr.trim_end());
    }

    if !output.status.success() {
        return Err(Error::CommandFailed {
            phase: phase.to_string(),
            code: output.status.code(),
            stderr,
        });
    }

    Ok(stdout)
}

/// Drives configure, build and install through the cmake CLI
#[derive(Debug, Clone)]
pub struct CMakeRunner {
    pub program: PathBuf,
    pub generator: Option<String>,
    pub jobs: u32,
}

impl CMakeRunner {
    pub fn configure_args(
        &self,
        source: &Path,
        build: &Path,
        toolchain: &Path,
        build_type: BuildType,
        install_prefix: Option<&Path>,
    ) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            source.display().to_string(),
            "-B".to_string(),
            build.display().to_string(),
            format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain.display()),
            format!("-DCMAKE_BUILD_TYPE={}", build_type),
        ];
        if let Some(prefix) = install_prefix {
            args.push(format!("-DCMAKE_INSTALL_PREFIX={}", prefix.display()));
        }
        if let Some(generator) = &self.generator {
            args.push("-G".to_string());
            args.push(generator.clone());
        }
        args
    }

    pub fn build_args(&self, build: &Path, build_type: BuildType) -> Vec<String> {
        vec![
            "--build".to_string(),
            build.display().to_string(),
            "--config".to_string(),
            build_type.to_string(),
            "--parallel".to_string(),
            self.jobs.to_string(),
        ]
    }

    pub fn install_args(&self, build: &Path, build_type: BuildType, prefix: &Path) -> Vec<String> {
        vec![
            "--install".to_string(),
            build.display().to_string(),
            "--config".to_string(),
            build_type.to_string(),
            "--prefix".to_string(),
            prefix.display().to_string(),
        ]
    }

    pub fn configure(
        &self,
        source: &Path,
        build: &Path,
        toolchain: &Path,
        build_type: BuildType,
        install_prefix: Option<&Path>,
        log: &mut BuildLog,
    ) -> Result<()> {
        let args = self.configure_args(source, build, toolchain, build_type, install_prefix);
        run_tool("configure", &self.program, &args, None, log).map(drop)
    }

    pub fn build(&self, build: &Path, build_type: BuildType, log: &mut BuildLog) -> Result<()> {
        run_tool("build", &self.program, self.build_args(build, build_type), None, log).map(drop)
    }

    pub fn install(
        &self,
        build: &Path,
        build_type: BuildType,
        prefix: &Path,
        log: &mut BuildLog,
    ) -> Result<()> {
        let args = self.install_args(build, build_type, prefix);
        run_tool("install", &self.program, args, None, log).map(drop)
    }
}
