/// First-name based gender classification
///
/// Two plain-text name lists, one name per line, are read once from the
/// resource directory:
///
/// ```text
/// <resource_dir>/names/male.txt
/// <resource_dir>/names/female.txt
/// ```
///
/// The classifier is built at startup and shared through application state.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Inferred attendee gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "attendee_gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenderListError {
    #[error("Failed to read name list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Lowercased male and female first names
#[derive(Debug, Clone, Default)]
pub struct GenderClassifier {
    males: HashSet<String>,
    females: HashSet<String>,
}

impl GenderClassifier {
    /// Builds a classifier from in-memory name lists
    pub fn new<M, F>(males: M, females: F) -> Self
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
        F: IntoIterator,
        F::Item: AsRef<str>,
    {
        Self {
            males: normalize(males),
            females: normalize(females),
        }
    }

    /// Reads `names/male.txt` and `names/female.txt` under `resource_dir`
    ///
    /// # Errors
    ///
    /// Returns `GenderListError::Read` if either file cannot be read.
    pub fn load(resource_dir: impl AsRef<Path>) -> Result<Self, GenderListError> {
        let names_dir = resource_dir.as_ref().join("names");
        let males = read_list(&names_dir.join("male.txt"))?;
        let females = read_list(&names_dir.join("female.txt"))?;

        let classifier = Self::new(males.lines(), females.lines());
        info!(
            male_names = classifier.males.len(),
            female_names = classifier.females.len(),
            "Loaded name lists"
        );
        Ok(classifier)
    }

    /// Classifies a full name by its first whitespace-separated token
    ///
    /// The male list is checked first. Matching is case-insensitive.
    ///
    /// # Example
    ///
    /// ```
    /// use ilmo_shared::gender::{Gender, GenderClassifier};
    ///
    /// let classifier = GenderClassifier::new(["Matti"], ["Jane"]);
    /// assert_eq!(classifier.classify("JANE Doe"), Gender::Female);
    /// assert_eq!(classifier.classify("matti meikäläinen"), Gender::Male);
    /// assert_eq!(classifier.classify("Alex"), Gender::Unknown);
    /// ```
    pub fn classify(&self, name: &str) -> Gender {
        let first_name = match name.split_whitespace().next() {
            Some(token) => token.to_lowercase(),
            None => return Gender::Unknown,
        };

        if self.males.contains(&first_name) {
            Gender::Male
        } else if self.females.contains(&first_name) {
            Gender::Female
        } else {
            Gender::Unknown
        }
    }
}

fn read_list(path: &Path) -> Result<String, GenderListError> {
    std::fs::read_to_string(path).map_err(|source| GenderListError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn normalize<I>(names: I) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}
