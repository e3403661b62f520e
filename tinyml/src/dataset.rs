use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result, Vector};

/// The target value for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Label {
    Scalar(f64),
    Vector(Vector),
}

impl Label {
    /// The label as a vector: scalars become 1-element vectors.
    pub fn to_vector(&self) -> Result<Vector> {
        match self {
            Label::Scalar(x) => Vector::new([*x]),
            Label::Vector(v) => Ok(v.clone()),
        }
    }
}

impl From<f64> for Label {
    fn from(x: f64) -> Self {
        Label::Scalar(x)
    }
}

impl From<Vector> for Label {
    fn from(v: Vector) -> Self {
        Label::Vector(v)
    }
}

/// Feature vectors paired with labels, plus some descriptive metadata.
///
/// Invariant: `features.len() == labels.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetRecord", into = "DatasetRecord")]
pub struct Dataset {
    features: Vec<Vector>,
    labels: Vec<Label>,
    name: String,
    description: String,
    feature_names: Vec<String>,
}

fn default_feature_names(features: &[Vector]) -> Vec<String> {
    let dim = features.first().map_or(0, Vector::len);
    (0..dim).map(|i| format!("feature_{i}")).collect()
}

impl Dataset {
    /// Pair up `features` and `labels`.
    ///
    /// The dataset is named "Unnamed Dataset" and its features are named
    /// `feature_0`, `feature_1`, ... according to the length of the first
    /// feature vector. Use the `with_*` methods to change that.
    pub fn new<L>(features: Vec<Vector>, labels: Vec<L>) -> Result<Self>
    where
        L: Into<Label>,
    {
        if features.len() != labels.len() {
            return Err(Error::LengthMismatch {
                expected: features.len(),
                actual: labels.len(),
            });
        }
        let feature_names = default_feature_names(&features);
        Ok(Dataset {
            features,
            labels: labels.into_iter().map(Into::into).collect(),
            name: "Unnamed Dataset".to_string(),
            description: String::new(),
            feature_names,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace the generated feature names. There must be one name per
    /// feature, unless the dataset is empty.
    pub fn with_feature_names<S>(mut self, names: impl IntoIterator<Item = S>) -> Result<Self>
    where
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if let Some(first) = self.features.first() {
            if names.len() != first.len() {
                return Err(Error::LengthMismatch {
                    expected: first.len(),
                    actual: names.len(),
                });
            }
        }
        self.feature_names = names;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn features(&self) -> &[Vector] {
        &self.features
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, i: usize) -> Result<(&Vector, &Label)> {
        match (self.features.get(i), self.labels.get(i)) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(Error::IndexOutOfRange {
                index: i,
                len: self.len(),
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vector, &Label)> + '_ {
        self.features.iter().zip(&self.labels)
    }

    fn derived(&self, name: String, features: Vec<Vector>, labels: Vec<Label>) -> Dataset {
        Dataset {
            features,
            labels,
            name,
            description: self.description.clone(),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Split into training and test sets, without shuffling.
    ///
    /// The first `floor(train_ratio * len)` samples go to the training set,
    /// named `"<name>_train"`; the rest go to the test set, `"<name>_test"`.
    /// `train_ratio` must be strictly between 0 and 1.
    pub fn split(&self, train_ratio: f64) -> Result<(Dataset, Dataset)> {
        if !(train_ratio > 0.0 && train_ratio < 1.0) {
            return Err(Error::RatioOutOfRange(train_ratio));
        }
        let cut = (train_ratio * self.len() as f64).floor() as usize;
        debug!(
            dataset = %self.name,
            train = cut,
            test = self.len() - cut,
            "splitting dataset"
        );

        let (train_x, test_x) = self.features.split_at(cut);
        let (train_y, test_y) = self.labels.split_at(cut);
        Ok((
            self.derived(format!("{}_train", self.name), train_x.to_vec(), train_y.to_vec()),
            self.derived(format!("{}_test", self.name), test_x.to_vec(), test_y.to_vec()),
        ))
    }

    /// A copy of this dataset with the samples in random order. Each feature
    /// vector stays paired with its label.
    pub fn shuffled<R>(&self, rng: &mut R) -> Dataset
    where
        R: Rng + ?Sized,
    {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);
        self.derived(
            self.name.clone(),
            order.iter().map(|&i| self.features[i].clone()).collect(),
            order.iter().map(|&i| self.labels[i].clone()).collect(),
        )
    }
}

/// Serialized form of a `Dataset`. Loading goes back through
/// `Dataset::new` so a stored dataset is checked like a fresh one.
#[derive(Serialize, Deserialize)]
struct DatasetRecord {
    features: Vec<Vector>,
    labels: Vec<Label>,
    name: String,
    description: String,
    feature_names: Vec<String>,
}

impl TryFrom<DatasetRecord> for Dataset {
    type Error = Error;

    fn try_from(record: DatasetRecord) -> Result<Self> {
        Dataset::new(record.features, record.labels)?
            .with_name(record.name)
            .with_description(record.description)
            .with_feature_names(record.feature_names)
    }
}

impl From<Dataset> for DatasetRecord {
    fn from(dataset: Dataset) -> Self {
        DatasetRecord {
            features: dataset.features,
            labels: dataset.labels,
            name: dataset.name,
            description: dataset.description,
            feature_names: dataset.feature_names,
        }
    }
}
