use tracing::{info, trace};

use crate::layers::Layer;
use crate::loss::loss_and_deriv;
use crate::traits::Loss;
use crate::{Dataset, Error, Result, Vector};

/// A layer paired with a loss function, trained by plain gradient descent
/// one sample at a time.
#[derive(Debug, Clone)]
pub struct Model<L> {
    layer: Layer,
    loss: L,
    learning_rate: f64,
}

impl<L> Model<L>
where
    L: Loss,
{
    pub fn new(layer: Layer, loss: L) -> Self {
        Model {
            layer,
            loss,
            learning_rate: 0.1,
        }
    }

    pub fn set_learning_rate(&mut self, rate: f64) {
        self.learning_rate = rate;
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    /// Run the model on one example.
    pub fn apply(&self, inputs: &Vector) -> Result<Vector> {
        self.layer.forward(inputs)
    }

    /// Train the model on one example, using the given learning rate.
    /// Returns the loss measured before the update.
    pub fn train(&mut self, inputs: &Vector, target: &Vector, rate: f64) -> Result<f64> {
        let yh = self.layer.forward(inputs)?;
        let (loss, dyh) = loss_and_deriv(&self.loss, &yh, target)?;
        let grads = self.layer.backward(inputs, &dyh)?;
        self.layer.apply_gradients(&grads, rate)?;
        trace!(loss, rate, "trained on one sample");
        Ok(loss)
    }

    /// Train for `epochs` passes over `dataset`, in dataset order. Returns
    /// the mean loss of each epoch.
    ///
    /// The learning rate decays linearly from `self.learning_rate()` toward
    /// zero over the course of training.
    ///
    /// Every sample's shape is checked before the first update, so on error
    /// the model is left as it was.
    pub fn train_epochs(&mut self, dataset: &Dataset, epochs: usize) -> Result<Vec<f64>> {
        let targets = dataset
            .labels()
            .iter()
            .map(|y| y.to_vector())
            .collect::<Result<Vec<Vector>>>()?;
        self.check_shapes(dataset.features(), &targets)?;
        let n = dataset.len();
        let total_steps = (epochs * n) as f64;

        let mut history = Vec::with_capacity(epochs);
        for epoch in 0..epochs {
            let mut loss_total = 0.0;
            for (i, (x, y)) in dataset.features().iter().zip(&targets).enumerate() {
                let progress = (epoch * n + i) as f64 / total_steps;
                loss_total += self.train(x, y, self.learning_rate * (1.0 - progress))?;
            }
            let loss = if n == 0 { 0.0 } else { loss_total / n as f64 };
            info!(epoch, loss, dataset = %dataset.name(), "epoch done");
            history.push(loss);
        }
        Ok(history)
    }

    fn check_shapes(&self, features: &[Vector], targets: &[Vector]) -> Result<()> {
        let num_outputs = self.layer.output_size();
        if let Some(y) = targets.iter().find(|y| y.len() != num_outputs) {
            return Err(Error::DimensionMismatch {
                expected: num_outputs,
                actual: y.len(),
            });
        }
        if let Some(num_inputs) = self.layer.input_size() {
            if let Some(x) = features.iter().find(|x| x.len() != num_inputs) {
                return Err(Error::DimensionMismatch {
                    expected: num_inputs,
                    actual: x.len(),
                });
            }
        }
        Ok(())
    }

    /// Mean loss over `dataset`, without training.
    pub fn evaluate(&self, dataset: &Dataset) -> Result<f64> {
        if dataset.is_empty() {
            return Ok(0.0);
        }
        let predictions = self.layer.forward_batch(dataset.features())?;
        let mut total = 0.0;
        for (yh, y) in predictions.iter().zip(dataset.labels()) {
            total += loss_and_deriv(&self.loss, yh, &y.to_vector()?)?.0;
        }
        Ok(total / dataset.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{Neuron, Relu, Sigmoid};
    use crate::loss::{LogisticLoss, SquaredError};

    fn v(values: &[f64]) -> Vector {
        Vector::new(values.iter().copied()).unwrap()
    }

    #[test]
    fn one_step_reduces_loss() {
        let layer = Layer::new(vec![Neuron::new(v(&[0.5, -0.5]), 0.0, Relu)]).unwrap();
        let mut model = Model::new(layer, SquaredError);
        let x = v(&[1.0, 0.2]);
        let y = v(&[2.0]);
        let before = model.train(&x, &y, 0.1).unwrap();
        let after = model.train(&x, &y, 0.1).unwrap();
        assert!(after < before, "{after} should be less than {before}");
    }

    #[test]
    fn target_must_match_outputs() {
        let layer = Layer::new(vec![Neuron::new(v(&[0.5]), 0.0, Relu)]).unwrap();
        let mut model = Model::new(layer, SquaredError);
        assert_eq!(
            model.train(&v(&[1.0]), &v(&[1.0, 2.0]), 0.1),
            Err(Error::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn learns_logical_or() {
        let features = vec![
            v(&[0.0, 0.0]),
            v(&[0.0, 1.0]),
            v(&[1.0, 0.0]),
            v(&[1.0, 1.0]),
        ];
        let dataset = Dataset::new(features, vec![0.0, 1.0, 1.0, 1.0])
            .unwrap()
            .with_name("or");

        let layer = Layer::new(vec![Neuron::new(v(&[0.0, 0.0]), 0.0, Sigmoid)]).unwrap();
        let mut model = Model::new(layer, LogisticLoss);
        model.set_learning_rate(1.0);

        let before = model.evaluate(&dataset).unwrap();
        let history = model.train_epochs(&dataset, 200).unwrap();
        let after = model.evaluate(&dataset).unwrap();

        assert_eq!(history.len(), 200);
        assert!(after < before);
        assert!(history[199] < history[0]);
        for (x, y) in dataset.iter() {
            let p = model.apply(x).unwrap()[0];
            let want = y.to_vector().unwrap()[0];
            assert_eq!(p >= 0.5, want == 1.0, "input {x}: predicted {p}");
        }
    }

    #[test]
    fn bad_sample_leaves_model_untouched() {
        let layer = Layer::new(vec![Neuron::new(v(&[0.5, -0.5]), 0.1, Sigmoid)]).unwrap();
        let mut model = Model::new(layer.clone(), LogisticLoss);

        // the last label has two elements but the layer has one output
        let dataset = Dataset::new(
            vec![v(&[0.0, 1.0]), v(&[1.0, 0.0]), v(&[1.0, 1.0])],
            vec![v(&[1.0]), v(&[1.0]), v(&[1.0, 0.0])],
        )
        .unwrap();
        assert_eq!(
            model.train_epochs(&dataset, 5),
            Err(Error::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        );
        assert_eq!(model.layer(), &layer);

        // same for a feature vector of the wrong size
        let dataset = Dataset::new(vec![v(&[0.0, 1.0]), v(&[1.0])], vec![1.0, 0.0]).unwrap();
        assert_eq!(
            model.train_epochs(&dataset, 5),
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(model.layer(), &layer);
    }

    #[test]
    fn empty_dataset() {
        let layer = Layer::new(vec![Neuron::new(v(&[0.5]), 0.0, Relu)]).unwrap();
        let mut model = Model::new(layer, SquaredError);
        let empty = Dataset::new(Vec::new(), Vec::<f64>::new()).unwrap();
        assert_eq!(model.evaluate(&empty), Ok(0.0));
        assert_eq!(model.train_epochs(&empty, 3), Ok(vec![0.0, 0.0, 0.0]));
    }
}
