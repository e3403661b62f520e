//! Closed-form Bayesian updates for success/failure counts.
//!
//! A Beta prior on a success probability is conjugate to the Binomial
//! likelihood, so observing `k` successes in `n` trials turns
//! `Beta(α, β)` into `Beta(α + k, β + n - k)` with no sampling at all.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Beta as StatrsBeta, ContinuousCDF};
use tracing::debug;

use crate::{Error, Result};

// ── Beta distribution ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BetaParams", into = "BetaParams")]
pub struct Beta {
    alpha: f64,
    beta: f64,
}

#[derive(Serialize, Deserialize)]
struct BetaParams {
    alpha: f64,
    beta: f64,
}

impl TryFrom<BetaParams> for Beta {
    type Error = Error;

    fn try_from(params: BetaParams) -> Result<Self> {
        Beta::new(params.alpha, params.beta)
    }
}

impl From<Beta> for BetaParams {
    fn from(b: Beta) -> Self {
        BetaParams {
            alpha: b.alpha,
            beta: b.beta,
        }
    }
}

impl Beta {
    /// Both shape parameters must be finite and positive.
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        for (name, value) in [("alpha", alpha), ("beta", beta)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidParameter(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(Beta { alpha, beta })
    }

    /// The flat prior, `Beta(1, 1)`.
    pub fn uniform() -> Self {
        Beta {
            alpha: 1.0,
            beta: 1.0,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    pub fn variance(&self) -> f64 {
        let s = self.alpha + self.beta;
        self.alpha * self.beta / (s * s * (s + 1.0))
    }

    pub fn std(&self) -> f64 {
        self.variance().sqrt()
    }

    /// The most likely value. Only defined when both parameters exceed 1;
    /// otherwise the density peaks at an endpoint (or nowhere).
    pub fn mode(&self) -> Option<f64> {
        if self.alpha > 1.0 && self.beta > 1.0 {
            Some((self.alpha - 1.0) / (self.alpha + self.beta - 2.0))
        } else {
            None
        }
    }

    /// Value below which a fraction `p` of the probability mass lies.
    pub fn quantile(&self, p: f64) -> Result<f64> {
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::InvalidParameter(format!(
                "probability must be in [0, 1], got {p}"
            )));
        }
        let dist = StatrsBeta::new(self.alpha, self.beta)
            .map_err(|e| Error::InvalidParameter(e.to_string()))?;
        Ok(dist.inverse_cdf(p))
    }

    /// Equal-tailed credible interval holding `level` of the mass, e.g.
    /// 0.95 for a 95% interval.
    pub fn credible_interval(&self, level: f64) -> Result<(f64, f64)> {
        check_level(level)?;
        let tail = (1.0 - level) / 2.0;
        Ok((self.quantile(tail)?, self.quantile(1.0 - tail)?))
    }

    /// Highest-density interval: the narrowest interval holding `level` of
    /// the mass.
    ///
    /// Found by golden-section search over the mass left of the interval,
    /// which is exact for the unimodal case (both parameters at least 1).
    /// For skewed posteriors it is narrower than
    /// [`credible_interval`](Beta::credible_interval).
    pub fn hdi(&self, level: f64) -> Result<(f64, f64)> {
        check_level(level)?;
        let width = |lo: f64| -> Result<f64> {
            Ok(self.quantile((lo + level).min(1.0))? - self.quantile(lo)?)
        };

        let ratio = (5f64.sqrt() - 1.0) / 2.0;
        let (mut a, mut b) = (0.0, 1.0 - level);
        for _ in 0..HDI_ITERATIONS {
            let c = b - ratio * (b - a);
            let d = a + ratio * (b - a);
            if width(c)? < width(d)? {
                b = d;
            } else {
                a = c;
            }
        }
        let lo = (a + b) / 2.0;
        Ok((self.quantile(lo)?, self.quantile((lo + level).min(1.0))?))
    }

    /// Posterior after observing `successes` out of `trials`.
    pub fn update(&self, successes: u64, trials: u64) -> Result<Beta> {
        if successes > trials {
            return Err(Error::InvalidParameter(format!(
                "{successes} successes out of only {trials} trials"
            )));
        }
        Ok(Beta {
            alpha: self.alpha + successes as f64,
            beta: self.beta + (trials - successes) as f64,
        })
    }
}

const HDI_ITERATIONS: usize = 60;

fn check_level(level: f64) -> Result<()> {
    if !(level > 0.0 && level < 1.0) {
        return Err(Error::InvalidParameter(format!(
            "credible level must be strictly between 0 and 1, got {level}"
        )));
    }
    Ok(())
}

// ── Grouped observations ────────────────────────────────────────────

/// Success counts for one group, e.g. one detection method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub name: String,
    pub successes: u64,
    pub trials: u64,
}

impl Observation {
    pub fn new(name: impl Into<String>, successes: u64, trials: u64) -> Self {
        Observation {
            name: name.into(),
            successes,
            trials,
        }
    }

    /// Raw success rate, or `None` if there were no trials.
    pub fn observed_rate(&self) -> Option<f64> {
        if self.trials == 0 {
            None
        } else {
            Some(self.successes as f64 / self.trials as f64)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupPosterior {
    pub name: String,
    pub posterior: Beta,
}

/// Update `prior` independently with each group's counts. Results come back
/// in the same order as `observations`.
pub fn posteriors(prior: Beta, observations: &[Observation]) -> Result<Vec<GroupPosterior>> {
    observations
        .iter()
        .map(|obs| {
            let posterior = prior.update(obs.successes, obs.trials)?;
            debug!(
                group = %obs.name,
                alpha = posterior.alpha(),
                beta = posterior.beta(),
                mean = posterior.mean(),
                "posterior"
            );
            Ok(GroupPosterior {
                name: obs.name.clone(),
                posterior,
            })
        })
        .collect()
}
