use ndarray::prelude::*;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layers::{Activation, Neuron, NeuronGradients};
use crate::{Error, Result, Vector};

/// An ordered group of neurons that all read the same input.
///
/// Output `i` of the layer is the output of neuron `i`. Every neuron has the
/// same number of weights, which is the layer's input size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Neuron>", into = "Vec<Neuron>")]
pub struct Layer {
    neurons: Vec<Neuron>,
}

/// Gradients for a whole layer, as computed by [`Layer::backward`].
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGradients {
    /// One entry per neuron, in neuron order.
    pub neurons: Vec<NeuronGradients>,
    /// ∂L/∂x for the layer's input, summed over all neurons.
    pub inputs: Vector,
}

impl Layer {
    pub fn new(neurons: Vec<Neuron>) -> Result<Self> {
        if let Some(first) = neurons.first() {
            let expected = first.num_inputs();
            if let Some(bad) = neurons.iter().find(|n| n.num_inputs() != expected) {
                return Err(Error::DimensionMismatch {
                    expected,
                    actual: bad.num_inputs(),
                });
            }
        }
        debug!(
            neurons = neurons.len(),
            inputs = ?neurons.first().map(Neuron::num_inputs),
            "built layer"
        );
        Ok(Layer { neurons })
    }

    /// A dense layer of randomly initialized neurons sharing one activation.
    pub fn random<R>(
        num_inputs: usize,
        num_outputs: usize,
        activation: impl Into<Activation>,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let activation = activation.into();
        Layer {
            neurons: (0..num_outputs)
                .map(|_| Neuron::random(num_inputs, activation, &mut *rng))
                .collect(),
        }
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Number of inputs each neuron takes, or `None` for a layer with no
    /// neurons (which accepts anything and outputs an empty vector).
    pub fn input_size(&self) -> Option<usize> {
        self.neurons.first().map(Neuron::num_inputs)
    }

    pub fn output_size(&self) -> usize {
        self.neurons.len()
    }

    pub fn forward(&self, inputs: &Vector) -> Result<Vector> {
        let outputs = self
            .neurons
            .iter()
            .map(|n| n.forward(inputs))
            .collect::<Result<Array1<f64>>>()?;
        Vector::from_array(outputs)
    }

    /// Run `forward` on many inputs, in parallel.
    ///
    /// Outputs are in the same order as `inputs`. If any input fails, an
    /// error from one of the failing inputs is returned.
    pub fn forward_batch(&self, inputs: &[Vector]) -> Result<Vec<Vector>> {
        inputs.par_iter().map(|x| self.forward(x)).collect()
    }

    /// Given `inputs` and ∂L/∂y for each output, compute the gradients of
    /// every neuron and ∂L/∂x for the input.
    pub fn backward(&self, inputs: &Vector, d_out: &Vector) -> Result<LayerGradients> {
        if d_out.len() != self.neurons.len() {
            return Err(Error::LengthMismatch {
                expected: self.neurons.len(),
                actual: d_out.len(),
            });
        }

        let mut dx = Vector::zeros(inputs.len());
        let mut grads = Vec::with_capacity(self.neurons.len());
        for (neuron, dy) in self.neurons.iter().zip(d_out.iter()) {
            let g = neuron.backward(inputs, dy)?;
            dx = dx.add(&g.inputs)?;
            grads.push(g);
        }

        Ok(LayerGradients {
            neurons: grads,
            inputs: dx,
        })
    }

    pub fn apply_gradients(&mut self, grads: &LayerGradients, rate: f64) -> Result<()> {
        if grads.neurons.len() != self.neurons.len() {
            return Err(Error::LengthMismatch {
                expected: self.neurons.len(),
                actual: grads.neurons.len(),
            });
        }
        for (neuron, g) in self.neurons.iter_mut().zip(&grads.neurons) {
            neuron.apply_gradients(g, rate)?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<Neuron>> for Layer {
    type Error = Error;

    fn try_from(neurons: Vec<Neuron>) -> Result<Self> {
        Layer::new(neurons)
    }
}

impl From<Layer> for Vec<Neuron> {
    fn from(layer: Layer) -> Vec<Neuron> {
        layer.neurons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{Relu, Sigmoid};

    fn v(values: &[f64]) -> Vector {
        Vector::new(values.iter().copied()).unwrap()
    }

    fn two_neuron_layer() -> Layer {
        Layer::new(vec![
            Neuron::new(v(&[0.1, 0.2]), 0.1, Relu),
            Neuron::new(v(&[0.3, 0.4]), 0.2, Sigmoid),
        ])
        .unwrap()
    }

    #[test]
    fn creation() {
        let layer = two_neuron_layer();
        assert_eq!(layer.neurons().len(), 2);
        assert_eq!(layer.neurons()[1].activation(), Activation::Sigmoid);
        assert_eq!(layer.input_size(), Some(2));
        assert_eq!(layer.output_size(), 2);
    }

    #[test]
    fn rejects_ragged_neurons() {
        let result = Layer::new(vec![
            Neuron::new(v(&[0.1, 0.2]), 0.1, Relu),
            Neuron::new(v(&[0.3]), 0.2, Relu),
        ]);
        assert_eq!(
            result,
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn forward() {
        let layer = two_neuron_layer();
        let outputs = layer.forward(&v(&[1.0, 2.0])).unwrap();
        // relu(0.1 + 0.4 + 0.1) and sigmoid(0.3 + 0.8 + 0.2)
        assert_eq!(outputs.len(), 2);
        assert!((outputs[0] - 0.6).abs() < 1e-12);
        assert!((outputs[1] - 0.786).abs() < 1e-3);
    }

    #[test]
    fn forward_propagates_dimension_mismatch() {
        let layer = two_neuron_layer();
        assert_eq!(
            layer.forward(&v(&[1.0, 2.0, 3.0])),
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn empty_layer() {
        let layer = Layer::new(vec![]).unwrap();
        assert_eq!(layer.input_size(), None);
        assert!(layer.forward(&v(&[1.0])).unwrap().is_empty());
    }

    #[test]
    fn forward_batch_matches_forward() {
        let layer = two_neuron_layer();
        let inputs: Vec<Vector> = (0..100)
            .map(|i| v(&[i as f64 * 0.1, 1.0 - i as f64 * 0.05]))
            .collect();
        let batch = layer.forward_batch(&inputs).unwrap();
        assert_eq!(batch.len(), inputs.len());
        for (x, y) in inputs.iter().zip(&batch) {
            assert_eq!(&layer.forward(x).unwrap(), y);
        }

        let mut bad = inputs.clone();
        bad.push(v(&[1.0]));
        assert!(layer.forward_batch(&bad).is_err());
    }

    #[test]
    fn backward_sums_input_gradients() {
        let layer = Layer::new(vec![
            Neuron::new(v(&[1.0, 2.0]), 0.0, Relu),
            Neuron::new(v(&[3.0, -1.0]), 0.0, Relu),
        ])
        .unwrap();
        let grads = layer.backward(&v(&[1.0, 0.5]), &v(&[1.0, 2.0])).unwrap();
        // both neurons are in their linear region
        assert_eq!(grads.inputs.to_vec(), vec![1.0 + 6.0, 2.0 - 2.0]);
        assert_eq!(grads.neurons[1].weights.to_vec(), vec![2.0, 1.0]);

        assert!(matches!(
            layer.backward(&v(&[1.0, 0.5]), &v(&[1.0])),
            Err(Error::LengthMismatch { .. })
        ));
    }

    #[test]
    fn random_layer_shape() {
        let mut rng = rand::thread_rng();
        let layer = Layer::random(4, 3, Sigmoid, &mut rng);
        assert_eq!(layer.input_size(), Some(4));
        assert_eq!(layer.output_size(), 3);
        assert!(layer
            .neurons()
            .iter()
            .all(|n| n.activation() == Activation::Sigmoid));
    }
}
