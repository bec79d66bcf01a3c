use std::fmt;

use anyhow::{anyhow, Context as _};
use serde::Serialize;
use structopt::StructOpt;

use crate::abs_path::{AbsPathBuf, Saved};
use crate::config::ConfigBody;
use crate::{Console, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct InitOpt {}

impl InitOpt {
    pub fn run(&self, base_dir: &AbsPathBuf, cnsl: &mut Console) -> Result<InitOutcome> {
        if !base_dir.as_ref().is_dir() {
            return Err(anyhow!("Could not find directory : {}", base_dir));
        }

        let config_path = base_dir.join(ConfigBody::FILE_NAME);
        let overwrite = config_path.as_ref().is_file()
            && cnsl.confirm(
                &format!("{} already exists. Overwrite?", ConfigBody::FILE_NAME),
                false,
            )?;
        let saved = config_path.save_pretty(
            |mut file| ConfigBody::generate_to(&mut file).context("Could not save config"),
            overwrite,
            Some(base_dir),
            cnsl,
        )?;
        if saved == Saved::Skipped {
            return Err(anyhow!("Config file already exists : {}", config_path));
        }

        Ok(InitOutcome::new(config_path))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct InitOutcome {
    config_path: AbsPathBuf,
}

impl InitOutcome {
    pub fn new(config_path: AbsPathBuf) -> Self {
        Self { config_path }
    }
}

impl fmt::Display for InitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Saved config file : {}", self.config_path)
    }
}
