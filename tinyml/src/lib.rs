mod error;
pub use error::{Error, Result};

pub mod operators;

mod traits;
pub use traits::{ActivationFn, Loss};

mod vector;
pub use vector::Vector;

pub mod layers;

mod dataset;
pub use dataset::{Dataset, Label};

pub mod loss;

mod model;
pub use model::Model;

pub mod bayes;
