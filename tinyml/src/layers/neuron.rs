use ndarray::prelude::*;
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::layers::Activation;
use crate::operators;
use crate::{ActivationFn, Error, Result, Vector};

/// A single neuron: a weighted sum of the inputs plus a bias, fed through an
/// activation function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    weights: Vector,
    bias: f64,
    activation: Activation,
}

/// Partial derivatives of the loss with respect to everything that feeds a
/// neuron, as computed by [`Neuron::backward`].
#[derive(Debug, Clone, PartialEq)]
pub struct NeuronGradients {
    pub weights: Vector,
    pub bias: f64,
    pub inputs: Vector,
}

impl Neuron {
    pub fn new(weights: Vector, bias: f64, activation: impl Into<Activation>) -> Self {
        Neuron {
            weights,
            bias,
            activation: activation.into(),
        }
    }

    /// A neuron with small normally-distributed weights and zero bias.
    pub fn random<R>(num_inputs: usize, activation: impl Into<Activation>, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let weights: Array1<f64> = 0.1 * Array::random_using(num_inputs, StandardNormal, rng);
        Neuron::new(Vector::from_samples(weights), 0.0, activation)
    }

    pub fn weights(&self) -> &Vector {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Number of inputs this neuron accepts.
    pub fn num_inputs(&self) -> usize {
        self.weights.len()
    }

    fn check_inputs(&self, inputs: &Vector) -> Result<()> {
        if inputs.len() != self.weights.len() {
            return Err(Error::DimensionMismatch {
                expected: self.weights.len(),
                actual: inputs.len(),
            });
        }
        Ok(())
    }

    /// The weighted sum `w · x + b`, before the activation function.
    ///
    /// Infinite weights or inputs can make the sum NaN (`inf * 0`), which is
    /// reported as `NotNumeric`.
    pub fn pre_activation(&self, inputs: &Vector) -> Result<f64> {
        self.check_inputs(inputs)?;
        let z = self.weights.dot(inputs)? + self.bias;
        if z.is_nan() {
            return Err(Error::NotNumeric("weighted sum".to_string()));
        }
        Ok(z)
    }

    pub fn forward(&self, inputs: &Vector) -> Result<f64> {
        let z = self.pre_activation(inputs)?;
        Ok(self.activation.apply(z))
    }

    /// Given the inputs and ∂L/∂y for this neuron's output y, compute the
    /// partial derivatives of L with respect to the weights, the bias and the
    /// inputs.
    ///
    /// A step in backpropagation. Nothing is updated; pass the result to
    /// [`Neuron::apply_gradients`] for that.
    pub fn backward(&self, inputs: &Vector, d_out: f64) -> Result<NeuronGradients> {
        let z = self.pre_activation(inputs)?;
        let dz = self.activation.backward(z, d_out);

        // z = sum(mul(w[i], x[i])) + b, and sum passes dz through unchanged.
        let (dw, dx): (Vec<f64>, Vec<f64>) = self
            .weights
            .iter()
            .zip(inputs.iter())
            .map(|(w, x)| operators::mul_back(w, x, dz))
            .unzip();

        Ok(NeuronGradients {
            weights: Vector::from_array(Array1::from(dw))?,
            bias: dz,
            inputs: Vector::from_array(Array1::from(dx))?,
        })
    }

    /// Take one gradient-descent step: `w -= rate * dw`, `b -= rate * db`.
    pub fn apply_gradients(&mut self, grads: &NeuronGradients, rate: f64) -> Result<()> {
        self.weights = self.weights.sub(&grads.weights.scale(rate)?)?;
        self.bias -= rate * grads.bias;
        Ok(())
    }
}
