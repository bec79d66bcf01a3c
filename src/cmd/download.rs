use std::fmt;
use std::io::Write as _;

use serde::Serialize;
use structopt::StructOpt;

use crate::abs_path::AbsPathBuf;
use crate::cmd::with_session;
use crate::config::Config;
use crate::model::{ProblemNumber, SubmissionMap};
use crate::service::Browse;
use crate::uri::{Session, UriActor};
use crate::{Console, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct DownloadOpt {
    /// Saves all files directly in the output directory instead of one directory per category
    #[structopt(long)]
    no_categories: bool,
    /// Directory to save source code into, relative to the base directory
    #[structopt(long)]
    output_dir: Option<String>,
}

impl DownloadOpt {
    pub fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<DownloadOutcome> {
        let browser = conf.session().build_browser()?;
        self.run_with(browser, conf, cnsl)
    }

    fn run_with<B: Browse>(
        &self,
        browser: B,
        conf: &Config,
        cnsl: &mut Console,
    ) -> Result<DownloadOutcome> {
        let conf = self.override_config(conf);
        let actor = UriActor::new(&conf);
        let output_dir = conf.output_abs_dir()?;
        let saved = with_session(&actor, browser, cnsl, |session, cnsl| {
            let submissions = actor.list_accepted_submissions(session, cnsl)?;
            let saved = download_all(&actor, session, &conf, submissions, cnsl)?;
            writeln!(cnsl, "Done")?;
            Ok(saved)
        })?;
        Ok(DownloadOutcome { output_dir, saved })
    }

    fn override_config(&self, conf: &Config) -> Config {
        let mut conf = conf.clone();
        if self.no_categories {
            conf.disable_categories();
        }
        if let Some(output_dir) = &self.output_dir {
            conf.set_output_dir(output_dir.as_str());
        }
        conf
    }
}

fn download_all<B: Browse>(
    actor: &UriActor,
    session: &Session<B>,
    conf: &Config,
    submissions: SubmissionMap,
    cnsl: &mut Console,
) -> Result<Vec<SavedSubmission>> {
    let pb = cnsl.build_pb_count(submissions.len() as u64);
    let mut saved = Vec::with_capacity(submissions.len());
    for record in submissions {
        pb.set_prefix(record.problem_number().as_ref());
        writeln!(cnsl, "Downloading problem {}...", record.problem_number())?;
        let category = if conf.categories() {
            actor.extract_category(session, record.problem_url(), cnsl)?
        } else {
            None
        };
        let code = actor.extract_code(session, record.submission_url(), cnsl)?;
        let path = conf.save_submission(&record, &code, category.as_deref(), cnsl)?;
        saved.push(SavedSubmission {
            problem_number: record.problem_number().clone(),
            category,
            path,
        });
        pb.inc(1);
        actor.pause();
    }
    pb.finish_and_clear();
    Ok(saved)
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SavedSubmission {
    problem_number: ProblemNumber,
    category: Option<String>,
    path: AbsPathBuf,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    output_dir: AbsPathBuf,
    saved: Vec<SavedSubmission>,
}

impl fmt::Display for DownloadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Saved {} submissions in {}",
            self.saved.len(),
            self.output_dir
        )
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use reqwest::StatusCode;
    use tempfile::tempdir;

    use super::*;
    use crate::cmd::tests::{console_with_creds, login_browser, runs_page, test_config, BASE_URL};
    use crate::service::MockBrowser;
    use crate::uri::AuthError;

    fn url(path: &str) -> String {
        format!("{}{}", BASE_URL, path)
    }

    fn problem_html(category: &str) -> String {
        format!(
            r#"<html><body><div class="tour-step-problem-menu"><ul><li>{}</li><li>Enviar</li></ul></div></body></html>"#,
            category
        )
    }

    fn judge_browser() -> MockBrowser {
        login_browser(true)
            .on_get(
                &url("/judge/pt/runs?page=1"),
                StatusCode::OK,
                runs_page(&[(30, "1001", "C++17"), (29, "1002", "Python 3")], false),
            )
            .on_get(
                &url("/judge/pt/runs?page=2"),
                StatusCode::OK,
                runs_page(&[(10, "1001", "C")], true),
            )
            .on_get(
                &url("/judge/pt/problems/view/1001"),
                StatusCode::OK,
                problem_html(" INICIANTE "),
            )
            .on_get(
                &url("/judge/pt/problems/view/1002"),
                StatusCode::OK,
                "<html><body><p>A URL solicitada não foi encontrada neste servidor.</p></body></html>",
            )
            .on_get(
                &url("/judge/pt/runs/code/10"),
                StatusCode::OK,
                "<pre>#include &lt;stdio.h&gt;\nint main() { return 0; }\n</pre>",
            )
            .on_get(
                &url("/judge/pt/runs/code/29"),
                StatusCode::OK,
                "<pre>print(input())\n</pre>",
            )
    }

    #[test]
    fn run_default() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let conf = test_config(&test_dir)?;
        let browser = judge_browser();
        let mut cnsl = console_with_creds();
        let opt = DownloadOpt {
            no_categories: false,
            output_dir: None,
        };
        let outcome = opt.run_with(&browser, &conf, &mut cnsl)?;

        let output_dir = test_dir.path().join("URI-Submissions");
        assert_eq!(
            fs::read_to_string(output_dir.join("Iniciante").join("1001.c"))?,
            "#include <stdio.h>\nint main() { return 0; }\n"
        );
        // a problem that no longer exists lands in the output dir itself
        assert_eq!(
            fs::read_to_string(output_dir.join("1002.py"))?,
            "print(input())\n"
        );
        assert!(!output_dir.join("Iniciante").join("1001.cpp").exists());

        assert_eq!(outcome.saved.len(), 2);
        assert_eq!(outcome.saved[0].category, Some("Iniciante".to_owned()));
        assert_eq!(outcome.saved[1].category, None);
        assert_eq!(
            outcome.to_string(),
            format!("Saved 2 submissions in {}", output_dir.display())
        );

        let output = cnsl.take_output()?;
        assert!(output.contains("Downloading problem 1001...\n"));
        assert!(output.ends_with("Done\nLogged out\n"));
        Ok(())
    }

    #[test]
    fn run_without_categories() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let conf = test_config(&test_dir)?;
        let browser = judge_browser();
        let mut cnsl = console_with_creds();
        let opt = DownloadOpt {
            no_categories: true,
            output_dir: Some("out".to_owned()),
        };
        opt.run_with(&browser, &conf, &mut cnsl)?;

        let output_dir = test_dir.path().join("out");
        assert!(output_dir.join("1001.c").is_file());
        assert!(output_dir.join("1002.py").is_file());
        assert!(browser
            .request_lines()
            .iter()
            .all(|line| !line.contains("/problems/")));
        Ok(())
    }

    #[test]
    fn run_auth_failure() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let conf = test_config(&test_dir)?;
        let browser = login_browser(false);
        let mut cnsl = console_with_creds();
        let opt = DownloadOpt {
            no_categories: false,
            output_dir: None,
        };
        let err = opt.run_with(&browser, &conf, &mut cnsl).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AuthError>(),
            Some(&AuthError::InvalidCredentials)
        );
        assert_eq!(crate::exit_code(&err), 2);
        assert_eq!(browser.requests().len(), 2);
        assert!(!test_dir.path().join("URI-Submissions").exists());
        Ok(())
    }

    #[test]
    fn run_scrape_failure_logs_out() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let conf = test_config(&test_dir)?;
        let browser = login_browser(true).on_get(
            &url("/judge/pt/runs?page=1"),
            StatusCode::OK,
            "<html><body><table></table></body></html>",
        );
        let mut cnsl = console_with_creds();
        let opt = DownloadOpt {
            no_categories: false,
            output_dir: None,
        };
        let err = opt.run_with(&browser, &conf, &mut cnsl).unwrap_err();
        assert!(err.to_string().starts_with("Could not find next page control"));
        assert_eq!(crate::exit_code(&err), 1);
        let output = cnsl.take_output()?;
        assert!(!output.contains("Done\n"));
        assert!(output.ends_with("Logged out\n"));
        Ok(())
    }
}
