//! Categorical sample groupings (e.g. IHC subgroups)

use serde::{Deserialize, Serialize};

use super::expression_matrix::ensure_unique;
use crate::error::{CenteringError, Result};

/// One categorical labeling of the samples.
/// `None` marks an unassigned sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingScheme {
    name: String,
    labels: Vec<Option<String>>,
}

impl GroupingScheme {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn labels(&self) -> &[Option<String>] {
        &self.labels
    }

    /// Distinct labels in order of first appearance, unassigned excluded
    pub fn levels(&self) -> Vec<&str> {
        let mut levels: Vec<&str> = Vec::new();
        for label in self.labels.iter().flatten() {
            if !levels.contains(&label.as_str()) {
                levels.push(label);
            }
        }
        levels
    }

    /// Row indices (into the group table) carrying `level`
    pub fn samples_with_level(&self, level: &str) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, v)| v.as_deref() == Some(level))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Sample groupings: one row per sample, one column per grouping scheme
///
/// Scheme order is significant; it decides which scheme writes last when two
/// schemes share a label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupTable {
    sample_ids: Vec<String>,
    schemes: Vec<GroupingScheme>,
}

impl GroupTable {
    /// Create an empty group table over the given samples
    pub fn new(sample_ids: Vec<String>) -> Result<Self> {
        ensure_unique(&sample_ids, "sample")?;
        Ok(Self {
            sample_ids,
            schemes: Vec::new(),
        })
    }

    /// Append a grouping scheme (column)
    pub fn add_scheme(&mut self, name: &str, labels: Vec<Option<String>>) -> Result<()> {
        if labels.len() != self.sample_ids.len() {
            return Err(CenteringError::DimensionMismatch {
                expected: format!("{} labels", self.sample_ids.len()),
                got: format!("{} labels", labels.len()),
            });
        }
        if self.scheme(name).is_some() {
            return Err(CenteringError::Label {
                reason: format!("duplicate grouping scheme '{}'", name),
            });
        }
        self.schemes.push(GroupingScheme {
            name: name.to_string(),
            labels,
        });
        Ok(())
    }

    /// Builder-style variant of [`GroupTable::add_scheme`] taking plain labels,
    /// where an empty string means unassigned
    pub fn with_scheme<S: AsRef<str>>(mut self, name: &str, labels: &[S]) -> Result<Self> {
        let labels = labels
            .iter()
            .map(|s| {
                let s = s.as_ref();
                if s.is_empty() {
                    None
                } else {
                    Some(s.to_string())
                }
            })
            .collect();
        self.add_scheme(name, labels)?;
        Ok(self)
    }

    /// Get sample IDs
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Get number of samples
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Get number of grouping schemes
    pub fn n_schemes(&self) -> usize {
        self.schemes.len()
    }

    /// Grouping schemes in insertion order
    pub fn schemes(&self) -> &[GroupingScheme] {
        &self.schemes
    }

    /// Look up a scheme by name
    pub fn scheme(&self, name: &str) -> Option<&GroupingScheme> {
        self.schemes.iter().find(|s| s.name == name)
    }

    /// Get all scheme names
    pub fn scheme_names(&self) -> Vec<&str> {
        self.schemes.iter().map(|s| s.name.as_str()).collect()
    }

    /// Distinct labels across every scheme, in order of first appearance
    /// scanning sample by sample, then scheme by scheme
    pub fn distinct_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for row in 0..self.sample_ids.len() {
            for scheme in &self.schemes {
                if let Some(label) = scheme.labels[row].as_deref() {
                    if !labels.contains(&label) {
                        labels.push(label);
                    }
                }
            }
        }
        labels
    }
}
