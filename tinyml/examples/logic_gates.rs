use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use tinyml::bayes::{self, Beta, Observation};
use tinyml::layers::{Layer, Sigmoid};
use tinyml::loss::LogisticLoss;
use tinyml::{Dataset, Model, Vector};

fn truth_table(name: &str, gate: impl Fn(bool, bool) -> bool) -> tinyml::Result<Dataset> {
    let mut features = vec![];
    let mut labels = vec![];
    // Repeat the table so that a split leaves every row in the training set.
    for _ in 0..8 {
        for a in [false, true] {
            for b in [false, true] {
                features.push(Vector::new([a as u8 as f64, b as u8 as f64])?);
                labels.push(gate(a, b) as u8 as f64);
            }
        }
    }
    Ok(Dataset::new(features, labels)?
        .with_name(name)
        .with_description(format!("truth table of {name}, repeated"))
        .with_feature_names(["a", "b"])?)
}

fn train_gate(dataset: &Dataset, rng: &mut StdRng) -> tinyml::Result<()> {
    let (train, test) = dataset.shuffled(rng).split(0.75)?;

    let mut model = Model::new(Layer::random(2, 1, Sigmoid, rng), LogisticLoss);
    model.set_learning_rate(1.0);

    let t0 = Instant::now();
    let history = model.train_epochs(&train, 100)?;
    println!(
        "{}: trained {} epochs on {} samples in {:?}, final loss {:.4}",
        dataset.name(),
        history.len(),
        train.len(),
        t0.elapsed(),
        history.last().copied().unwrap_or_default(),
    );
    println!("  held-out loss on {} samples: {:.4}", test.len(), model.evaluate(&test)?);

    for a in [0.0, 1.0] {
        for b in [0.0, 1.0] {
            let p = model.apply(&Vector::new([a, b])?)?[0];
            println!("  {a} {b} -> {p:.3}");
        }
    }
    Ok(())
}

fn main() -> tinyml::Result<()> {
    tracing_subscriber::fmt::init();

    let mut rng = StdRng::seed_from_u64(2024);
    train_gate(&truth_table("OR", |a, b| a || b)?, &mut rng)?;
    train_gate(&truth_table("AND", |a, b| a && b)?, &mut rng)?;

    println!();
    let prior = Beta::new(2.0, 3.0)?;
    let observations = [
        Observation::new("Transit", 450, 1000),
        Observation::new("Radial Velocity", 320, 800),
        Observation::new("Direct Imaging", 25, 200),
        Observation::new("Microlensing", 18, 150),
    ];
    println!("detection rates, prior Beta({}, {})", prior.alpha(), prior.beta());
    println!(
        "{:<16} {:>9} {:>9} {:>9} {:>19}",
        "method", "observed", "mean", "std", "95% HDI"
    );
    for group in bayes::posteriors(prior, &observations)? {
        let observed = observations
            .iter()
            .find(|o| o.name == group.name)
            .and_then(Observation::observed_rate)
            .unwrap_or(f64::NAN);
        let (lo, hi) = group.posterior.hdi(0.95)?;
        println!(
            "{:<16} {:>9.4} {:>9.4} {:>9.4}   [{lo:.4}, {hi:.4}]",
            group.name,
            observed,
            group.posterior.mean(),
            group.posterior.std(),
        );
    }
    Ok(())
}
