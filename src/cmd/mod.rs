use std::fmt;
use std::io::{self, Write as _};

use anyhow::Context as _;
use serde::Serialize;
use structopt::StructOpt;

use crate::abs_path::AbsPathBuf;
use crate::config::Config;
use crate::model::Credentials;
use crate::service::Browse;
use crate::uri::{Session, UriActor};
use crate::{Console, GlobalOpt, OutputFormat, Result};

mod download;
mod init;
mod list;
mod show;

pub use download::{DownloadOpt, DownloadOutcome};
pub use init::{InitOpt, InitOutcome};
pub use list::{ListOpt, ListOutcome};
pub use show::{ShowOpt, ShowOutcome};

static EMAIL_ENV: &str = "URIDL_EMAIL";
static PASSWORD_ENV: &str = "URIDL_PASSWORD";

pub trait Outcome: fmt::Display + fmt::Debug {
    fn write_json(&self, writer: &mut dyn io::Write) -> Result<()>;

    fn write_yaml(&self, writer: &mut dyn io::Write) -> Result<()>;

    fn print(&self, stdout: &mut dyn io::Write, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Default => writeln!(stdout, "{}", self)?,
            OutputFormat::Debug => writeln!(stdout, "{:#?}", self)?,
            OutputFormat::Json => {
                self.write_json(stdout)?;
                writeln!(stdout)?;
            }
            OutputFormat::Yaml => self.write_yaml(stdout)?,
        }
        Ok(())
    }
}

impl<T: Serialize + fmt::Display + fmt::Debug> Outcome for T {
    fn write_json(&self, writer: &mut dyn io::Write) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).context("Could not print outcome as json")
    }

    fn write_yaml(&self, writer: &mut dyn io::Write) -> Result<()> {
        serde_yaml::to_writer(writer, self).context("Could not print outcome as yaml")
    }
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub enum Cmd {
    /// Creates config file
    Init(InitOpt),
    /// Shows current config
    Show(ShowOpt),
    /// Lists accepted submissions without downloading them
    List(ListOpt),
    /// Downloads source code of accepted submissions
    Download(DownloadOpt),
}

impl Cmd {
    pub fn run(&self, global_opt: &GlobalOpt, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        let outcome: Box<dyn Outcome> = match self {
            Self::Init(opt) => {
                let base_dir = match &global_opt.base_dir {
                    Some(base_dir) => base_dir.clone(),
                    None => AbsPathBuf::cwd()?,
                };
                Box::new(opt.run(&base_dir, cnsl)?)
            }
            Self::Show(opt) => Box::new(opt.run(&load_config(global_opt, cnsl)?, cnsl)?),
            Self::List(opt) => Box::new(opt.run(&load_config(global_opt, cnsl)?, cnsl)?),
            Self::Download(opt) => Box::new(opt.run(&load_config(global_opt, cnsl)?, cnsl)?),
        };
        Ok(outcome)
    }
}

fn load_config(global_opt: &GlobalOpt, cnsl: &mut Console) -> Result<Config> {
    Config::load(global_opt.base_dir.clone(), cnsl).context("Could not load config")
}

/// Reads credentials from env vars, prompting for the missing ones.
fn read_credentials(cnsl: &mut Console) -> Result<Credentials> {
    let email = cnsl.get_env_or_prompt_and_read(EMAIL_ENV, "Email: ")?;
    let password = cnsl.read_secret(PASSWORD_ENV, "Password: ")?;
    Ok(Credentials::new(email.trim(), password))
}

/// Logs in, runs `f` with the session and logs out even if `f` failed.
fn with_session<B, T, F>(actor: &UriActor, browser: B, cnsl: &mut Console, f: F) -> Result<T>
where
    B: Browse,
    F: FnOnce(&Session<B>, &mut Console) -> Result<T>,
{
    let creds = read_credentials(cnsl)?;
    let mut session = actor.login(browser, &creds, cnsl)?;
    let result = f(&session, cnsl);
    session.logout();
    writeln!(cnsl, "Logged out")?;
    result
}
