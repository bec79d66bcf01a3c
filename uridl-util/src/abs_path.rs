use std::env::current_dir;
use std::fmt;
use std::fs;
use std::io::{self, Seek as _, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context as _};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Wraps `shellexpand::full` method.
fn expand<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    Ok(shellexpand::full(&path.as_ref().to_string_lossy())?.parse()?)
}

/// Result of saving a file.
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Saved {
    Created,
    Overwritten,
    Skipped,
}

impl Saved {
    fn as_msg(self) -> &'static str {
        match self {
            Self::Created => "saved",
            Self::Overwritten => "overwritten",
            Self::Skipped => "already exists",
        }
    }
}

/// An absolute (not necessarily canonicalized) path that may or may not exist.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbsPathBuf(PathBuf);

impl AbsPathBuf {
    /// Construct an absolute path.
    ///
    /// Returns error if `path` is not absolute.
    ///
    /// If path need to be shell-expanded, use `AbsPathBuf::from_shell_path` instead.
    pub fn try_new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(anyhow!("Path is not absolute : {}", path.display()));
        }
        let mut ret = Self(PathBuf::new());
        ret.0.push(path);
        Ok(ret)
    }

    /// Constructs an absolute path while expanding leading tilde and environment variables.
    ///
    /// Returns error if expanded `path` is not absolute.
    pub fn from_shell_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::try_new(expand(path)?)
    }

    /// Returns current directory as an absolute path.
    pub fn cwd() -> Result<Self> {
        Ok(Self(current_dir()?))
    }

    /// Joins path.
    pub fn join<P: AsRef<Path>>(&self, path: P) -> Self {
        Self(self.0.join(path))
    }

    /// Joins path while expanding leading tilde and environment variables.
    ///
    /// An absolute `path` replaces `self`, same as `Path::join`.
    pub fn join_expand<P: AsRef<Path>>(&self, path: P) -> Result<Self> {
        Ok(self.join(expand(path)?))
    }

    /// Returns parent path.
    pub fn parent(&self) -> Option<Self> {
        self.0.parent().map(|parent| Self(parent.to_owned()))
    }

    pub fn search_dir_contains(&self, file_name: &str) -> Option<Self> {
        self.0
            .ancestors()
            .find(|dir| dir.join(file_name).is_file())
            .map(|dir| Self(dir.to_owned()))
    }

    pub fn save_pretty(
        &self,
        save: impl FnOnce(fs::File) -> Result<()>,
        overwrite: bool,
        base_dir: Option<&AbsPathBuf>,
        cnsl: &mut dyn Write,
    ) -> Result<Saved> {
        write!(
            cnsl,
            "Saving {} ... ",
            self.strip_prefix_if(base_dir).display()
        )?;
        let result = self.save(save, overwrite);
        let msg = match &result {
            Ok(saved) => saved.as_msg(),
            Err(_) => "failed",
        };
        writeln!(cnsl, "{}", msg)?;
        result
    }

    /// Creates parent directories and writes the file with `save`.
    ///
    /// An existing file is truncated first when `overwrite` is true and left untouched otherwise.
    pub fn save(&self, save: impl FnOnce(fs::File) -> Result<()>, overwrite: bool) -> Result<Saved> {
        let is_existed = self.0.is_file();
        if !overwrite && is_existed {
            return Ok(Saved::Skipped);
        }
        self.create_dir_all_and_open(false, true)
            .with_context(|| format!("Could not open file : {}", self))
            .and_then(|mut file| {
                // truncate file before write
                file.seek(SeekFrom::Start(0))?;
                file.set_len(0)?;
                Ok(file)
            })
            .and_then(save)?;
        Ok(if is_existed {
            Saved::Overwritten
        } else {
            Saved::Created
        })
    }

    pub fn load_pretty<T>(
        &self,
        load: impl FnOnce(fs::File) -> Result<T>,
        base_dir: Option<&AbsPathBuf>,
        cnsl: &mut dyn Write,
    ) -> Result<T> {
        write!(
            cnsl,
            "Loading {} ... ",
            self.strip_prefix_if(base_dir).display()
        )?;
        let result = self.load(load);
        let msg = match result {
            Ok(_) => "loaded",
            Err(_) => "failed",
        };
        writeln!(cnsl, "{}", msg)?;
        result
    }

    pub fn load<T>(&self, load: impl FnOnce(fs::File) -> Result<T>) -> Result<T> {
        fs::OpenOptions::new()
            .read(true)
            .open(&self.0)
            .with_context(|| format!("Could not open file : {}", self))
            .and_then(load)
    }

    pub fn create_dir_all_and_open(&self, is_read: bool, is_write: bool) -> io::Result<fs::File> {
        if let Some(dir) = self.parent() {
            dir.create_dir_all()?
        }
        fs::OpenOptions::new()
            .read(is_read)
            .write(is_write)
            .create(true)
            .open(&self.0)
    }

    pub fn create_dir_all(&self) -> io::Result<()> {
        fs::create_dir_all(&self.0)
    }

    pub fn strip_prefix(&self, base: &AbsPathBuf) -> &Path {
        self.0
            .strip_prefix(&base.0)
            .unwrap_or_else(|_| self.0.as_path())
    }

    fn strip_prefix_if(&self, base: Option<&AbsPathBuf>) -> &Path {
        match base {
            Some(base) => self.strip_prefix(base),
            None => self.0.as_path(),
        }
    }
}

impl AsRef<Path> for AbsPathBuf {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl FromStr for AbsPathBuf {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_shell_path(s)
    }
}

impl<'de> Deserialize<'de> for AbsPathBuf {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

impl fmt::Display for AbsPathBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.display().fmt(f)
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use std::io::Write as _;

    use tempfile::tempdir;

    use super::*;
    use crate::assert_matches;

    #[derive(Serialize, Deserialize, Debug)]
    struct TestData {
        abs_path: AbsPathBuf,
    }

    #[test]
    fn test_try_new() -> anyhow::Result<()> {
        let tests = &[
            ("/a/b", "/a/b"),
            ("/a//b", "/a/b"),
            ("/a/./b", "/a/b"),
            ("/a/b/", "/a/b"),
            ("/a/../b", "/a/../b"),
        ];
        for (left, right) in tests {
            let actual = AbsPathBuf::try_new(left)?;
            assert_eq!(actual.as_ref(), Path::new(right));
        }
        for test in &["~/a/b", "$HOME/a/b", "./a/b/", "a/b"] {
            assert_matches!(AbsPathBuf::try_new(test) => Err(_));
        }
        Ok(())
    }

    #[test]
    fn test_from_str() -> anyhow::Result<()> {
        let home = dirs::home_dir().unwrap();
        let tests = &[
            ("/a/b", PathBuf::from("/a/b")),
            ("~/a/b", home.join("a/b")),
            ("$HOME/a/b", home.join("a/b")),
        ];
        for (left, right) in tests {
            let actual: AbsPathBuf = left.parse()?;
            assert_eq!(actual.as_ref(), right.as_path());
        }
        for test in &["a/b", "$URIDL_TEST_UNKNOWN_VAR"] {
            assert_matches!(AbsPathBuf::from_str(test) => Err(_));
        }
        Ok(())
    }

    #[test]
    fn test_join_expand_keeps_absolute() -> anyhow::Result<()> {
        let base = AbsPathBuf::try_new("/a")?;
        assert_eq!(base.join_expand("b/c")?.as_ref(), Path::new("/a/b/c"));
        assert_eq!(base.join_expand("/x/y")?.as_ref(), Path::new("/x/y"));
        Ok(())
    }

    #[test]
    fn test_deserialize() -> anyhow::Result<()> {
        let test_data: TestData = serde_yaml::from_str("---\nabs_path: /a/b")?;
        assert_eq!(test_data.abs_path.as_ref(), Path::new("/a/b"));
        assert!(serde_yaml::from_str::<TestData>("abs_path: a/b").is_err());
        Ok(())
    }

    #[test]
    fn test_search_dir_contains() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let base = AbsPathBuf::try_new(test_dir.path())?;
        base.join("marker.yaml")
            .save(|_| Ok(()), false)?;
        let nested = base.join("a").join("b");
        nested.create_dir_all()?;
        assert_eq!(nested.search_dir_contains("marker.yaml"), Some(base.clone()));
        assert_eq!(nested.search_dir_contains("no-such-file.yaml"), None);
        Ok(())
    }

    #[test]
    fn test_save_pretty() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let base = AbsPathBuf::try_new(test_dir.path())?;
        let path = base.join("x").join("y.txt");
        let tests = &[
            ("first", false, Saved::Created, "first", "Saving x/y.txt ... saved\n"),
            ("second", false, Saved::Skipped, "first", "Saving x/y.txt ... already exists\n"),
            ("3", true, Saved::Overwritten, "3", "Saving x/y.txt ... overwritten\n"),
        ];
        for (content, overwrite, expected, expected_content, expected_output) in tests {
            let mut output = Vec::new();
            let actual = path.save_pretty(
                |mut file| Ok(file.write_all(content.as_bytes())?),
                *overwrite,
                Some(&base),
                &mut output,
            )?;
            assert_eq!(actual, *expected);
            assert_eq!(std::fs::read_to_string(&path)?, *expected_content);
            assert_eq!(String::from_utf8(output)?, *expected_output);
        }
        Ok(())
    }
}
