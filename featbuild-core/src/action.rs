//! Build actions: the external step that runs when a feature is stale.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::command_validator::CommandValidator;
use crate::error::{Error, Result};
use crate::feature::Feature;
use crate::fingerprint::Fingerprint;

pub const FEATURE_ENV: &str = "FEATBUILD_FEATURE";
pub const FINGERPRINT_ENV: &str = "FEATBUILD_FINGERPRINT";

/// Performs the build of one feature. Only success or failure is observed.
pub trait BuildAction {
    fn build(&self, feature: &Feature, fingerprint: &Fingerprint) -> Result<()>;
}

impl<T: BuildAction + ?Sized> BuildAction for &T {
    fn build(&self, feature: &Feature, fingerprint: &Fingerprint) -> Result<()> {
        (**self).build(feature, fingerprint)
    }
}

impl<T: BuildAction + ?Sized> BuildAction for Box<T> {
    fn build(&self, feature: &Feature, fingerprint: &Fingerprint) -> Result<()> {
        (**self).build(feature, fingerprint)
    }
}

fn run_command(feature: &Feature, mut cmd: Command) -> Result<()> {
    debug!(feature = %feature.name, command = ?cmd, "spawning build");
    let status = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| Error::build(&feature.name, format!("failed to start: {}", e)))?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::build(&feature.name, format!("process exited with {}", status)))
    }
}

/// Container image build using the feature's primary input as context,
/// tagged `<feature>:<short fingerprint>`.
#[derive(Debug, Clone)]
pub struct ContainerBuildAction {
    program: String,
}

impl Default for ContainerBuildAction {
    fn default() -> Self {
        Self {
            program: "docker".to_string(),
        }
    }
}

impl ContainerBuildAction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a different docker-compatible CLI, such as `podman`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn image_tag(feature: &Feature, fingerprint: &Fingerprint) -> String {
        format!("{}:{}", feature.name, fingerprint.short())
    }

    /// The command line this action would run, without spawning it.
    pub fn command(&self, feature: &Feature, fingerprint: &Fingerprint) -> Result<Command> {
        let context = feature
            .primary_input()
            .ok_or_else(|| Error::build(&feature.name, "no inputs to use as build context"))?;

        let mut cmd = Command::new(&self.program);
        cmd.arg("build")
            .arg("-t")
            .arg(Self::image_tag(feature, fingerprint))
            .arg(context);
        Ok(cmd)
    }
}

impl BuildAction for ContainerBuildAction {
    fn build(&self, feature: &Feature, fingerprint: &Fingerprint) -> Result<()> {
        let cmd = self.command(feature, fingerprint)?;
        info!(
            feature = %feature.name,
            tag = %Self::image_tag(feature, fingerprint),
            "building image"
        );
        run_command(feature, cmd)
    }
}

/// Runs the feature's own command through `sh -c`.
///
/// The working directory is the primary input (or its parent when the input
/// is a file), falling back to `default_dir` for features without inputs.
#[derive(Debug, Clone)]
pub struct ShellBuildAction {
    default_dir: PathBuf,
    validator: CommandValidator,
}

impl ShellBuildAction {
    pub fn new(default_dir: impl Into<PathBuf>) -> Self {
        let default_dir = default_dir.into();
        Self {
            default_dir: if default_dir.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                default_dir
            },
            validator: CommandValidator::new(),
        }
    }

    pub fn with_validator(mut self, validator: CommandValidator) -> Self {
        self.validator = validator;
        self
    }

    fn working_dir<'a>(&'a self, feature: &'a Feature) -> &'a Path {
        match feature.primary_input() {
            Some(input) if input.is_file() => input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(&self.default_dir),
            Some(input) => input,
            None => &self.default_dir,
        }
    }

    pub fn command(&self, feature: &Feature, fingerprint: &Fingerprint) -> Result<Command> {
        self.validator.validate(&feature.name, &feature.command)?;

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&feature.command)
            .current_dir(self.working_dir(feature))
            .env(FEATURE_ENV, &feature.name)
            .env(FINGERPRINT_ENV, fingerprint.as_str());
        Ok(cmd)
    }
}

impl BuildAction for ShellBuildAction {
    fn build(&self, feature: &Feature, fingerprint: &Fingerprint) -> Result<()> {
        let cmd = self.command(feature, fingerprint)?;
        info!(feature = %feature.name, command = %feature.command, "running build command");
        run_command(feature, cmd)
    }
}
