//! Loss functions.

use crate::operators::{self, EPS};
use crate::traits::Loss;
use crate::{Error, Result, Vector};

/// Half the squared difference. The usual loss for regression.
#[derive(Debug, Clone, Copy)]
pub struct SquaredError;

impl Loss for SquaredError {
    fn loss(&self, prediction: f64, target: f64) -> f64 {
        let diff = prediction - target;
        0.5 * diff * diff
    }

    fn deriv(&self, prediction: f64, target: f64) -> f64 {
        prediction - target
    }
}

/// Loss function for logistic regression. AKA binary cross-entropy.
///
/// Predictions should be probabilities, e.g. the output of a sigmoid neuron.
/// Predictions of exactly 0 or 1 are pulled back by `EPS` so that neither the
/// loss nor its derivative blows up.
#[derive(Debug, Clone, Copy)]
pub struct LogisticLoss;

fn clamp_probability(p: f64) -> f64 {
    p.clamp(EPS, 1.0 - EPS)
}

impl Loss for LogisticLoss {
    fn loss(&self, prediction: f64, target: f64) -> f64 {
        let p = clamp_probability(prediction);
        -(target * operators::log(p) + (1.0 - target) * operators::log(1.0 - p))
    }

    fn deriv(&self, prediction: f64, target: f64) -> f64 {
        let p = clamp_probability(prediction);
        (p - target) / (p * (1.0 - p))
    }
}

/// Total loss over the elements of a prediction and its target, along with
/// the derivative with respect to each prediction element.
pub(crate) fn loss_and_deriv<L>(
    loss: &L,
    prediction: &Vector,
    target: &Vector,
) -> Result<(f64, Vector)>
where
    L: Loss + ?Sized,
{
    if prediction.len() != target.len() {
        return Err(Error::DimensionMismatch {
            expected: prediction.len(),
            actual: target.len(),
        });
    }
    let pairs = || prediction.iter().zip(target.iter());
    let total = operators::sum(&pairs().map(|(p, t)| loss.loss(p, t)).collect::<Vec<_>>());
    let deriv = Vector::new(pairs().map(|(p, t)| loss.deriv(p, t)))?;
    Ok((total, deriv))
}
