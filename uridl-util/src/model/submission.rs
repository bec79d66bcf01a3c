use std::fmt;

use getset::Getters;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::model::LangName;

/// Identifier of a problem on the judge, e.g. `1001`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProblemNumber(String);

impl<T: Into<String>> From<T> for ProblemNumber {
    fn from(number: T) -> Self {
        Self(number.into())
    }
}

impl AsRef<str> for ProblemNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProblemNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq)]
#[get = "pub"]
pub struct SubmissionRecord {
    problem_number: ProblemNumber,
    language: LangName,
    submission_url: Url,
    problem_url: Url,
}

impl SubmissionRecord {
    pub fn new(
        problem_number: impl Into<ProblemNumber>,
        language: impl Into<LangName>,
        submission_url: Url,
        problem_url: Url,
    ) -> Self {
        Self {
            problem_number: problem_number.into(),
            language: language.into(),
            submission_url,
            problem_url,
        }
    }
}

/// Accepted submissions keyed by problem number.
///
/// Iterates in first-insertion order. Inserting a record for a problem that is
/// already present replaces the record but keeps its position.
#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct SubmissionMap(IndexMap<ProblemNumber, SubmissionRecord>);

impl SubmissionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `record`, returning the record it replaced.
    pub fn insert(&mut self, record: SubmissionRecord) -> Option<SubmissionRecord> {
        self.0.insert(record.problem_number.clone(), record)
    }

    pub fn get(&self, problem_number: &ProblemNumber) -> Option<&SubmissionRecord> {
        self.0.get(problem_number)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn problem_numbers(&self) -> impl Iterator<Item = &ProblemNumber> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubmissionRecord> {
        self.0.values()
    }
}

impl IntoIterator for SubmissionMap {
    type Item = SubmissionRecord;
    type IntoIter = indexmap::map::IntoValues<ProblemNumber, SubmissionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_values()
    }
}
