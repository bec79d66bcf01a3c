//! Config for uridl.
//!
//! The config file `uridl.yaml` is searched in the current directory and its
//! ancestors. The directory that contains it becomes the base directory, and
//! relative paths in the file are resolved against it. When no config file is
//! found, the defaults are used with the current directory as base directory.
//!
//! Generate a commented config file with `uridl init`.

use std::fmt;
use std::io::Write;
use std::time::Duration;

use anyhow::{anyhow, Context as _};
use lazy_static::lazy_static;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use url::Url;

use uridl_util::{abs_path, console, model, service};

mod session_config;
mod writer;

use crate::abs_path::AbsPathBuf;
use crate::console::Console;
use crate::model::SubmissionRecord;
pub use session_config::SessionConfig;
pub use writer::{category_dir, write_submission};

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

lazy_static! {
    static ref VERSION: Version = Version::parse(env!("CARGO_PKG_VERSION")).unwrap();
    static ref DEFAULT_BASE_URL: Url = Url::parse("https://www.urionlinejudge.com.br").unwrap();
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_dir: AbsPathBuf,
    body: ConfigBody,
}

impl Config {
    /// Loads config from `base_dir`, or from the nearest directory that contains a config file.
    pub fn load(base_dir: Option<AbsPathBuf>, cnsl: &mut Console) -> Result<Self> {
        let base_dir = match base_dir {
            Some(base_dir) => base_dir,
            None => match ConfigBody::search()? {
                Some(base_dir) => {
                    writeln!(cnsl, "Found config file in base_dir: {}", base_dir)?;
                    base_dir
                }
                None => {
                    cnsl.warn(&format!(
                        "Could not find config file ({}). Using default config.",
                        ConfigBody::FILE_NAME
                    ))?;
                    return Ok(Self::default_in_dir(AbsPathBuf::cwd()?));
                }
            },
        };
        let config_path = base_dir.join(ConfigBody::FILE_NAME);
        let body = if config_path.as_ref().is_file() {
            ConfigBody::load(&base_dir, cnsl)?
        } else {
            ConfigBody::default()
        };
        Ok(Self { base_dir, body })
    }

    pub fn default_in_dir(base_dir: AbsPathBuf) -> Self {
        Self {
            base_dir,
            body: ConfigBody::default(),
        }
    }

    pub fn session(&self) -> &SessionConfig {
        &self.body.session
    }

    pub fn base_url(&self) -> &Url {
        &self.body.base_url
    }

    pub fn categories(&self) -> bool {
        self.body.categories
    }

    pub fn delay(&self) -> Duration {
        self.body.delay
    }

    pub fn max_pages(&self) -> Option<usize> {
        self.body.max_pages
    }

    /// Disables category sub directories regardless of the config file.
    pub fn disable_categories(&mut self) {
        self.body.categories = false;
    }

    pub fn set_output_dir(&mut self, output_dir: impl Into<String>) {
        self.body.output_dir = output_dir.into();
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.body.delay = delay;
    }

    pub fn output_abs_dir(&self) -> Result<AbsPathBuf> {
        self.base_dir
            .join_expand(&self.body.output_dir)
            .with_context(|| format!("Could not expand output dir : {}", self.body.output_dir))
    }

    /// Saves source code of an accepted submission, returning the saved path.
    pub fn save_submission(
        &self,
        record: &SubmissionRecord,
        code: &str,
        category: Option<&str>,
        cnsl: &mut Console,
    ) -> Result<AbsPathBuf> {
        let output_dir = self.output_abs_dir()?;
        write_submission(
            &output_dir,
            record.problem_number(),
            record.language(),
            code,
            category,
            cnsl,
        )
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let yaml_str = serde_yaml::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", yaml_str)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConfigBody {
    #[serde(with = "string_serde")]
    version: Version,
    #[serde(default = "ConfigBody::default_base_url")]
    base_url: Url,
    #[serde(default = "ConfigBody::default_output_dir")]
    output_dir: String,
    #[serde(default = "ConfigBody::default_categories")]
    categories: bool,
    #[serde(default = "ConfigBody::default_delay", with = "humantime_serde")]
    delay: Duration,
    #[serde(default)]
    max_pages: Option<usize>,
    #[serde(default)]
    session: SessionConfig,
}

impl ConfigBody {
    pub const FILE_NAME: &'static str = "uridl.yaml";

    const DEFAULT_OUTPUT_DIR: &'static str = "URI-Submissions";

    pub fn generate_to(writer: &mut dyn Write) -> Result<()> {
        write!(
            writer,
            include_str!("../resources/uridl.yaml.txt"),
            version = &*VERSION,
        )
        .context("Could not write config")
    }

    fn default_base_url() -> Url {
        DEFAULT_BASE_URL.clone()
    }

    fn default_output_dir() -> String {
        Self::DEFAULT_OUTPUT_DIR.to_owned()
    }

    fn default_categories() -> bool {
        true
    }

    fn default_delay() -> Duration {
        Duration::from_secs(5)
    }

    fn search() -> Result<Option<AbsPathBuf>> {
        let cwd = AbsPathBuf::cwd()?;
        Ok(cwd.search_dir_contains(Self::FILE_NAME))
    }

    fn load(base_dir: &AbsPathBuf, cnsl: &mut Console) -> Result<Self> {
        let body: Self = base_dir.join(Self::FILE_NAME).load_pretty(
            |file| serde_yaml::from_reader(file).context("Could not read config file as yaml"),
            Some(base_dir),
            cnsl,
        )?;
        body.validate()?;
        Ok(body)
    }

    fn validate(&self) -> Result<()> {
        // check version
        let version_req = VersionReq::parse(&self.version.to_string())
            .context("Could not parse version requirement")?;
        if !version_req.matches(&VERSION) {
            return Err(anyhow!(
                r#"Found mismatched version in config file.
    config version: {}
    uridl version : {}
Fix the config file so that it is compatible with the current version of uridl."#,
                self.version,
                &*VERSION
            ));
        }
        if self.base_url.cannot_be_a_base() {
            return Err(anyhow!("Found invalid base_url : {}", self.base_url));
        }
        if self.max_pages == Some(0) {
            return Err(anyhow!("max_pages must be greater than 0"));
        }

        Ok(())
    }
}

impl Default for ConfigBody {
    fn default() -> Self {
        Self {
            version: VERSION.clone(),
            base_url: Self::default_base_url(),
            output_dir: Self::default_output_dir(),
            categories: Self::default_categories(),
            delay: Self::default_delay(),
            max_pages: None,
            session: SessionConfig::default(),
        }
    }
}

mod string_serde {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}
