use std::fmt;
use std::ops::Index;

use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A fixed-length vector of `f64`.
///
/// Arithmetic never mutates; every operation returns a new `Vector`. No
/// element is ever NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Vector {
    values: Array1<f64>,
}

impl Vector {
    /// Build a vector, rejecting NaN elements.
    pub fn new<I>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        Vector::from_array(values.into_iter().collect())
    }

    pub fn zeros(len: usize) -> Self {
        Vector {
            values: Array1::zeros(len),
        }
    }

    /// Wrap an array, rejecting NaN elements. Arithmetic on infinite
    /// elements can produce NaN, so results go through here too.
    pub(crate) fn from_array(values: Array1<f64>) -> Result<Self> {
        if let Some(i) = values.iter().position(|x| x.is_nan()) {
            return Err(Error::NotNumeric(format!("element {i}")));
        }
        Ok(Vector { values })
    }

    /// Wrap freshly sampled values, which are never NaN.
    pub(crate) fn from_samples(values: Array1<f64>) -> Self {
        debug_assert!(values.iter().all(|x| !x.is_nan()));
        Vector { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize) -> Result<f64> {
        self.values.get(i).copied().ok_or(Error::IndexOutOfRange {
            index: i,
            len: self.len(),
        })
    }

    fn check_same_len(&self, other: &Vector) -> Result<()> {
        if self.len() != other.len() {
            return Err(Error::LengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(())
    }

    pub fn add(&self, other: &Vector) -> Result<Vector> {
        self.check_same_len(other)?;
        Vector::from_array(&self.values + &other.values)
    }

    pub fn sub(&self, other: &Vector) -> Result<Vector> {
        self.check_same_len(other)?;
        Vector::from_array(&self.values - &other.values)
    }

    /// Multiply every element by `scalar`.
    pub fn scale(&self, scalar: f64) -> Result<Vector> {
        if scalar.is_nan() {
            return Err(Error::NotNumeric("scale factor".to_string()));
        }
        Vector::from_array(&self.values * scalar)
    }

    pub fn dot(&self, other: &Vector) -> Result<f64> {
        self.check_same_len(other)?;
        Ok(self.values.dot(&other.values))
    }

    /// Euclidean (L2) norm.
    pub fn magnitude(&self) -> f64 {
        self.values.dot(&self.values).sqrt()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    /// *Panics* if `i` is out of range. Use [`Vector::get`] to get an error
    /// instead.
    fn index(&self, i: usize) -> &f64 {
        &self.values[i]
    }
}

impl TryFrom<Vec<f64>> for Vector {
    type Error = Error;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Vector::new(values)
    }
}

impl From<Vector> for Vec<f64> {
    fn from(v: Vector) -> Vec<f64> {
        v.values.to_vec()
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, x) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, "]")
    }
}
