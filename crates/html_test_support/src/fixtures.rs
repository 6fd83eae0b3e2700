//! TOML fixture corpora.
//!
//! ```toml
//! [[case]]
//! name = "strips-script"
//! input = "<script>x</script>ok"
//! expected = "ok"
//! status = "active"          # optional: active | xfail | skip
//! reason = "..."             # required for xfail/skip
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    #[default]
    Active,
    Xfail,
    Skip,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Case {
    pub name: String,
    pub input: String,
    pub expected: String,
    #[serde(default)]
    pub status: CaseStatus,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Corpus {
    #[serde(rename = "case", default)]
    pub cases: Vec<Case>,
}

#[derive(Debug)]
pub enum CorpusError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    MissingReason(String),
    DuplicateName(String),
}

impl std::fmt::Display for CorpusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusError::Io(err) => write!(f, "failed to read corpus: {err}"),
            CorpusError::Parse(err) => write!(f, "failed to parse corpus: {err}"),
            CorpusError::MissingReason(name) => write!(f, "case '{name}' is xfail/skip without a reason"),
            CorpusError::DuplicateName(name) => write!(f, "duplicate case name '{name}'"),
        }
    }
}

impl std::error::Error for CorpusError {}

impl Corpus {
    pub fn parse(source: &str) -> Result<Self, CorpusError> {
        let corpus: Corpus = toml::from_str(source).map_err(CorpusError::Parse)?;
        let mut seen = std::collections::BTreeSet::new();
        for case in &corpus.cases {
            if !seen.insert(case.name.as_str()) {
                return Err(CorpusError::DuplicateName(case.name.clone()));
            }
            if case.status != CaseStatus::Active && case.reason.is_none() {
                return Err(CorpusError::MissingReason(case.name.clone()));
            }
        }
        Ok(corpus)
    }
}

pub fn load_corpus(path: impl AsRef<Path>) -> Result<Corpus, CorpusError> {
    let source = fs::read_to_string(path.as_ref()).map_err(CorpusError::Io)?;
    Corpus::parse(&source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cases_with_default_status() {
        let corpus = Corpus::parse(
            r#"
            [[case]]
            name = "a"
            input = "<b>x</b>"
            expected = "x"

            [[case]]
            name = "b"
            input = ""
            expected = ""
            status = "skip"
            reason = "placeholder"
            "#,
        )
        .expect("corpus parses");
        assert_eq!(corpus.cases.len(), 2);
        assert_eq!(corpus.cases[0].status, CaseStatus::Active);
        assert_eq!(corpus.cases[1].status, CaseStatus::Skip);
    }

    #[test]
    fn xfail_without_reason_is_rejected() {
        let err = Corpus::parse(
            r#"
            [[case]]
            name = "a"
            input = ""
            expected = ""
            status = "xfail"
            "#,
        )
        .expect_err("missing reason");
        assert!(matches!(err, CorpusError::MissingReason(ref name) if name == "a"), "got: {err}");
    }
}
