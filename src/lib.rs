#![warn(clippy::all)]

#[macro_use]
extern crate strum;

use std::io::Write;

use structopt::StructOpt;
use strum::VariantNames;

mod cmd;

use uridl_config as config;
use uridl_uri as uri;
use uridl_util::{abs_path, console, model, service};

use crate::abs_path::AbsPathBuf;
use crate::cmd::{Cmd, Outcome as _};
use crate::console::{Console, ConsoleConfig};

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

/// Exit code for failures other than authentication.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code when the judge rejects the credentials.
pub const EXIT_AUTH_FAILURE: i32 = 2;

#[derive(EnumString, EnumVariantNames, IntoStaticStr, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    Default,
    Debug,
    Json,
    Yaml,
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct Opt {
    #[structopt(flatten)]
    global_opt: GlobalOpt,
    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct GlobalOpt {
    /// Directory that contains the config file. Searched from the current directory if omitted.
    #[structopt(long, global = true, env = "URIDL_BASE_DIR")]
    base_dir: Option<AbsPathBuf>,
    /// Format of the output printed to stdout
    #[structopt(
        long,
        short = "o",
        global = true,
        default_value = OutputFormat::Default.into(),
        possible_values = &OutputFormat::VARIANTS,
    )]
    output: OutputFormat,
    /// Assumes "yes" as answer to all prompts and runs non-interactively
    #[structopt(long, short = "y", global = true)]
    assume_yes: bool,
}

impl Opt {
    pub fn console_config(&self) -> ConsoleConfig {
        ConsoleConfig {
            assume_yes: self.global_opt.assume_yes,
        }
    }

    /// Runs the subcommand and prints its outcome to `stdout`.
    pub fn run(&self, stdout: &mut dyn Write, cnsl: &mut Console) -> Result<()> {
        let outcome = self.cmd.run(&self.global_opt, cnsl)?;
        outcome.print(stdout, self.global_opt.output)?;
        Ok(())
    }
}

/// Chooses the process exit code for an error returned by `Opt::run`.
pub fn exit_code(err: &Error) -> i32 {
    if err.downcast_ref::<uri::AuthError>().is_some() {
        EXIT_AUTH_FAILURE
    } else {
        EXIT_FAILURE
    }
}
