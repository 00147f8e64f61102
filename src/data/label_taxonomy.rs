use serde::{Deserialize, Serialize};

/// Label lists that classify how an issue was closed.
///
/// Every list may be empty; an empty list contributes zero to every metric that uses it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelTaxonomy {
    /// Labels used for enhancement issues
    #[serde(default)]
    pub enhancements: Vec<String>,

    /// Labels used for bugs and regressions
    #[serde(default)]
    pub bugs: Vec<String>,

    /// Labels used for tasks and dependency upgrades
    #[serde(default)]
    pub tasks: Vec<String>,

    /// Labels used for documentation issues
    #[serde(default)]
    pub docs: Vec<String>,

    /// Labels used for duplicate or superseded issues
    #[serde(default)]
    pub duplicates: Vec<String>,

    /// Labels used for invalid bugs, declined enhancements or issues for external projects
    #[serde(default)]
    pub rejected: Vec<String>,

    /// Labels used for backports and forward-ports
    #[serde(default)]
    pub ports: Vec<String>,

    /// Labels used for questions
    #[serde(default)]
    pub questions: Vec<String>,
}

impl LabelTaxonomy {
    /// Every configured label, list by list.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        [
            &self.enhancements,
            &self.bugs,
            &self.tasks,
            &self.docs,
            &self.duplicates,
            &self.rejected,
            &self.ports,
            &self.questions,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
    }
}
