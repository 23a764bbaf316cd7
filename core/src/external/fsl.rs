use super::{BrainExtractor, Registrator};
use crate::error::{Result, TaebsmError};
use crate::pipeline::PipelineStep;
use crate::types::{BetMode, Dof, FslOutputType};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Settings shared by the FSL command wrappers
///
/// The output type is passed to each spawned tool through `FSLOUTPUTTYPE`;
/// the environment of the current process is left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FslOptions {
    /// FSL installation root; binaries are taken from `{fsl_dir}/bin`.
    /// When unset the binaries are looked up on `PATH`.
    pub fsl_dir: Option<PathBuf>,

    /// Volume format written by the tools
    pub output_type: FslOutputType,
}

impl FslOptions {
    /// Creates options using binaries on `PATH`
    pub fn new(output_type: FslOutputType) -> Self {
        Self {
            fsl_dir: None,
            output_type,
        }
    }

    /// Builder: Set the FSL installation root
    pub fn with_fsl_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fsl_dir = Some(dir.into());
        self
    }

    /// Resolves a tool name to the program to execute
    pub fn program(&self, tool: &str) -> PathBuf {
        match &self.fsl_dir {
            Some(dir) => dir.join("bin").join(tool),
            None => PathBuf::from(tool),
        }
    }

    fn command(&self, tool: &str) -> Command {
        let mut cmd = Command::new(self.program(tool));
        cmd.env("FSLOUTPUTTYPE", self.output_type.env_value());
        if let Some(dir) = &self.fsl_dir {
            cmd.env("FSLDIR", dir);
        }
        cmd
    }
}

/// Runs a prepared command, mapping spawn errors and non-zero exits to step failures
fn run(mut cmd: Command, step: PipelineStep) -> Result<()> {
    debug!("{} command: {:?}", step, cmd);

    let output = cmd
        .output()
        .map_err(|e| TaebsmError::step(step, format!("failed to execute {:?}: {}", cmd.get_program(), e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TaebsmError::step(
            step,
            format!("{} ({})", stderr.trim(), output.status),
        ));
    }

    Ok(())
}

/// FSL `bet` brain extraction
#[derive(Debug, Clone, Default)]
pub struct FslBet {
    options: FslOptions,
}

impl FslBet {
    pub fn new(options: FslOptions) -> Self {
        Self { options }
    }

    /// Builds the `bet` invocation; `-m` requests the mask artifact
    pub fn command(&self, input: &Path, output: &Path, frac: f64, mode: BetMode) -> Command {
        let mut cmd = self.options.command("bet");
        cmd.arg(input)
            .arg(output)
            .args(["-f", &frac.to_string()])
            .arg("-m")
            .arg(mode.flag());
        cmd
    }
}

impl BrainExtractor for FslBet {
    fn extract(&self, input: &Path, output: &Path, frac: f64, mode: BetMode) -> Result<()> {
        run(
            self.command(input, output, frac, mode),
            PipelineStep::BrainExtraction,
        )
    }
}

/// FSL `flirt` linear registration
#[derive(Debug, Clone, Default)]
pub struct FslFlirt {
    options: FslOptions,
}

impl FslFlirt {
    pub fn new(options: FslOptions) -> Self {
        Self { options }
    }

    /// Builds the `flirt` invocation
    pub fn command(
        &self,
        input: &Path,
        output: &Path,
        matrix: &Path,
        reference: &Path,
        dof: Dof,
    ) -> Command {
        let mut cmd = self.options.command("flirt");
        cmd.arg("-in")
            .arg(input)
            .arg("-ref")
            .arg(reference)
            .arg("-out")
            .arg(output)
            .arg("-omat")
            .arg(matrix)
            .args(["-dof", &dof.to_string()]);
        cmd
    }
}

impl Registrator for FslFlirt {
    fn register(
        &self,
        input: &Path,
        output: &Path,
        matrix: &Path,
        reference: &Path,
        dof: Dof,
    ) -> Result<()> {
        if !reference.is_file() {
            return Err(TaebsmError::step(
                PipelineStep::Registration,
                format!("atlas reference {} not found", reference.display()),
            ));
        }
        run(
            self.command(input, output, matrix, reference, dof),
            PipelineStep::Registration,
        )
    }
}
