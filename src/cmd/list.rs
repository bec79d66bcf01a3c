use std::fmt;

use serde::Serialize;
use structopt::StructOpt;

use crate::cmd::with_session;
use crate::config::Config;
use crate::model::SubmissionMap;
use crate::service::Browse;
use crate::uri::UriActor;
use crate::{Console, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct ListOpt {}

impl ListOpt {
    pub fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<ListOutcome> {
        let browser = conf.session().build_browser()?;
        self.run_with(browser, conf, cnsl)
    }

    fn run_with<B: Browse>(
        &self,
        browser: B,
        conf: &Config,
        cnsl: &mut Console,
    ) -> Result<ListOutcome> {
        let actor = UriActor::new(conf);
        let submissions = with_session(&actor, browser, cnsl, |session, cnsl| {
            actor.list_accepted_submissions(session, cnsl)
        })?;
        Ok(ListOutcome { submissions })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ListOutcome {
    submissions: SubmissionMap,
}

impl fmt::Display for ListOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for record in self.submissions.iter() {
            writeln!(
                f,
                "{:8} {:12} {}",
                record.problem_number().as_ref(),
                record.language().to_string(),
                record.submission_url()
            )?;
        }
        write!(f, "Found {} accepted problems", self.submissions.len())
    }
}
