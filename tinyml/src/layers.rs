//! Neurons, layers, and the activation functions they use.

mod activation;
pub use activation::{Activation, Relu, Sigmoid};

mod neuron;
pub use neuron::{Neuron, NeuronGradients};

mod dense;
pub use dense::{Layer, LayerGradients};
