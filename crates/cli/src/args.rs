use argh::FromArgs;
use detect::{Extension, Features, Level};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown requirement {name:?}, expected a level or an extension.")]
pub struct RequirementParseError {
    pub name: String,
}

/// Something `check` can ask for: a minimum level or a single extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Level(Level),
    Extension(Extension),
}

impl Requirement {
    pub fn satisfied_by(self, features: &Features) -> bool {
        match self {
            Requirement::Level(level) => features.supports(level),
            Requirement::Extension(extension) => features.has(extension),
        }
    }
}

impl FromStr for Requirement {
    type Err = RequirementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(level) = s.parse() {
            return Ok(Requirement::Level(level));
        }
        if let Ok(extension) = s.parse() {
            return Ok(Requirement::Extension(extension));
        }
        Err(RequirementParseError {
            name: s.trim().to_string(),
        })
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Requirement::Level(level) => write!(f, "{level}"),
            Requirement::Extension(extension) => write!(f, "{extension}"),
        }
    }
}

#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand)]
pub enum SubCommandEnum {
    Level(LevelArguments),
    Report(ReportArguments),
    Check(CheckArguments),
}

#[derive(FromArgs, Debug, PartialEq)]
/// print the instruction set level
#[argh(subcommand, name = "level")]
pub struct LevelArguments {}

#[derive(FromArgs, Debug, PartialEq)]
/// print the level and every extension flag
#[argh(subcommand, name = "report")]
pub struct ReportArguments {
    /// print as JSON
    #[argh(switch)]
    pub json: bool,
}

#[derive(FromArgs, Debug, PartialEq)]
/// exit with 0 if every requirement is available, 1 otherwise
#[argh(subcommand, name = "check")]
pub struct CheckArguments {
    /// levels (`avx2`, `8`) or extensions (`fma3`, `xop`)
    #[argh(positional)]
    pub requirements: Vec<Requirement>,
}

#[derive(FromArgs, Debug)]
/// SIMD instruction set detection
pub struct Arguments {
    #[argh(subcommand)]
    pub cmd: SubCommandEnum,

    /// dispatch policy file in TOML
    #[argh(option)]
    pub policy: Option<String>,

    /// verbose
    #[argh(switch, short = 'v')]
    pub verbose: bool,
}
