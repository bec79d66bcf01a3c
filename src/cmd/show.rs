use structopt::StructOpt;

use crate::config::Config;
use crate::{Console, Result};

pub type ShowOutcome = Config;

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct ShowOpt {}

impl ShowOpt {
    pub fn run(&self, conf: &Config, _cnsl: &mut Console) -> Result<ShowOutcome> {
        Ok(conf.clone())
    }
}
