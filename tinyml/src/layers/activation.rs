use serde::{Deserialize, Serialize};

use crate::operators;
use crate::ActivationFn;

/// The logistic function, a handy symmetric, s-shaped function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sigmoid;

impl ActivationFn for Sigmoid {
    fn apply(self, x: f64) -> f64 {
        operators::sigmoid(x)
    }

    fn derivative(self, x: f64) -> f64 {
        let y = operators::sigmoid(x);
        y * (1.0 - y)
    }

    fn backward(self, x: f64, d: f64) -> f64 {
        operators::sigmoid_back(x, d)
    }
}

/// Rectified linear unit activation function.
///
/// The derivative at exactly 0 is taken to be 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relu;

impl ActivationFn for Relu {
    fn apply(self, x: f64) -> f64 {
        operators::relu(x)
    }

    fn derivative(self, x: f64) -> f64 {
        if x > 0.0 {
            1.0
        } else {
            0.0
        }
    }

    fn backward(self, x: f64, d: f64) -> f64 {
        operators::relu_back(x, d)
    }
}

/// The activation functions a `Neuron` can use.
///
/// Stateless and `Copy`, so any number of neurons can share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Relu,
    Sigmoid,
}

impl ActivationFn for Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Relu => Relu.apply(x),
            Activation::Sigmoid => Sigmoid.apply(x),
        }
    }

    fn derivative(self, x: f64) -> f64 {
        match self {
            Activation::Relu => Relu.derivative(x),
            Activation::Sigmoid => Sigmoid.derivative(x),
        }
    }

    fn backward(self, x: f64, d: f64) -> f64 {
        match self {
            Activation::Relu => Relu.backward(x, d),
            Activation::Sigmoid => Sigmoid.backward(x, d),
        }
    }
}

impl From<Relu> for Activation {
    fn from(_: Relu) -> Self {
        Activation::Relu
    }
}

impl From<Sigmoid> for Activation {
    fn from(_: Sigmoid) -> Self {
        Activation::Sigmoid
    }
}
