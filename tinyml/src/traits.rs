use std::fmt::Debug;

/// A real-valued function applied after a neuron's weighted sum.
pub trait ActivationFn: Copy + Clone + Debug {
    fn apply(self, x: f64) -> f64;

    /// Derivative of `apply` at `x`.
    fn derivative(self, x: f64) -> f64;

    /// Given `x` and ∂L/∂y at `y = self.apply(x)`, compute ∂L/∂x.
    fn backward(self, x: f64, d: f64) -> f64 {
        d * self.derivative(x)
    }
}

/// An elementwise loss comparing one prediction with one target value.
pub trait Loss: Debug {
    fn loss(&self, prediction: f64, target: f64) -> f64;

    /// Partial derivative of `loss` with respect to `prediction`.
    fn deriv(&self, prediction: f64, target: f64) -> f64;
}
