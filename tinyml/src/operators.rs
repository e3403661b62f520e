//! Scalar operators.
//!
//! Every function here is pure. The `*_back` functions take the input `x` of
//! an operator and the upstream derivative `d` (∂L/∂f) and return `d * f'(x)`,
//! which is one step of backpropagation through that operator.

use crate::{Error, Result};

/// Floor applied to the argument of [`log`].
pub const EPS: f64 = 1e-6;

pub fn mul(x: f64, y: f64) -> f64 {
    x * y
}

pub fn id(x: f64) -> f64 {
    x
}

pub fn add(x: f64, y: f64) -> f64 {
    x + y
}

pub fn neg(x: f64) -> f64 {
    -x
}

/// 1.0 if `x < y`, else 0.0.
pub fn lt(x: f64, y: f64) -> f64 {
    if x < y {
        1.0
    } else {
        0.0
    }
}

/// 1.0 if `x == y`, else 0.0.
pub fn eq(x: f64, y: f64) -> f64 {
    if x == y {
        1.0
    } else {
        0.0
    }
}

pub fn max(x: f64, y: f64) -> f64 {
    if x > y {
        x
    } else {
        y
    }
}

/// 1.0 if `x` and `y` are within 1e-2 of each other, else 0.0.
pub fn is_close(x: f64, y: f64) -> f64 {
    if (x - y).abs() < 1e-2 {
        1.0
    } else {
        0.0
    }
}

/// The logistic function.
///
/// Computed as `1 / (1 + e^-x)` for non-negative `x` and `e^x / (1 + e^x)`
/// otherwise, so that `exp` is only ever called on a non-positive number and
/// can't overflow.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let ex = x.exp();
        ex / (1.0 + ex)
    }
}

pub fn relu(x: f64) -> f64 {
    if x > 0.0 {
        x
    } else {
        0.0
    }
}

/// Natural log of `max(x, EPS)`.
///
/// This is not the mathematical logarithm: zero and negative inputs give
/// `ln(EPS)` instead of `-inf` or NaN. Losses built on it stay finite when a
/// prediction saturates.
pub fn log(x: f64) -> f64 {
    x.max(EPS).ln()
}

pub fn exp(x: f64) -> f64 {
    x.exp()
}

pub fn inv(x: f64) -> f64 {
    1.0 / x
}

/// `d * log'(x)`, with the same floor on `x` as [`log`].
pub fn log_back(x: f64, d: f64) -> f64 {
    d / x.max(EPS)
}

/// `d * inv'(x)`, i.e. `-d / x²`.
pub fn inv_back(x: f64, d: f64) -> f64 {
    -d / (x * x)
}

/// `d` where `x > 0`, else 0. The subgradient at 0 is taken to be 0.
pub fn relu_back(x: f64, d: f64) -> f64 {
    if x > 0.0 {
        d
    } else {
        0.0
    }
}

pub fn sigmoid_back(x: f64, d: f64) -> f64 {
    let s = sigmoid(x);
    d * s * (1.0 - s)
}

pub fn exp_back(x: f64, d: f64) -> f64 {
    d * x.exp()
}

/// Partial derivatives of `mul(x, y)` scaled by `d`: `(d * y, d * x)`.
pub fn mul_back(x: f64, y: f64, d: f64) -> (f64, f64) {
    (d * y, d * x)
}

// ---- Higher-order functions ----

/// Lift `f` to a function over slices.
pub fn map<F>(f: F) -> impl Fn(&[f64]) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    move |ls| ls.iter().map(|&x| f(x)).collect()
}

/// Lift `f` to a function combining two slices element by element.
///
/// The returned function fails with `LengthMismatch` if the slices differ in
/// length.
pub fn zip_with<F>(f: F) -> impl Fn(&[f64], &[f64]) -> Result<Vec<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    move |ls1, ls2| {
        if ls1.len() != ls2.len() {
            return Err(Error::LengthMismatch {
                expected: ls1.len(),
                actual: ls2.len(),
            });
        }
        Ok(ls1.iter().zip(ls2).map(|(&x, &y)| f(x, y)).collect())
    }
}

/// Fold a slice from the left.
///
/// For `[x1, x2, x3]` the returned function computes
/// `f(x3, f(x2, f(x1, start)))`. An empty slice yields `start`.
pub fn reduce<F>(f: F, start: f64) -> impl Fn(&[f64]) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    move |ls| ls.iter().fold(start, |acc, &x| f(x, acc))
}

pub fn neg_list(ls: &[f64]) -> Vec<f64> {
    map(neg)(ls)
}

pub fn add_lists(ls1: &[f64], ls2: &[f64]) -> Result<Vec<f64>> {
    zip_with(add)(ls1, ls2)
}

pub fn sum(ls: &[f64]) -> f64 {
    reduce(add, 0.0)(ls)
}

pub fn prod(ls: &[f64]) -> f64 {
    reduce(mul, 1.0)(ls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        assert_eq!(lt(1.0, 2.0), 1.0);
        assert_eq!(lt(2.0, 1.0), 0.0);
        assert_eq!(lt(1.0, 1.0), 0.0);
        assert_eq!(eq(3.0, 3.0), 1.0);
        assert_eq!(eq(3.0, 3.5), 0.0);
        assert_eq!(max(-1.0, 4.0), 4.0);
        assert_eq!(max(4.0, -1.0), 4.0);
        assert_eq!(is_close(1.0, 1.005), 1.0);
        assert_eq!(is_close(1.0, 1.02), 0.0);
    }

    #[test]
    fn elementary() {
        assert_eq!(mul(3.0, -2.0), -6.0);
        assert_eq!(add(3.0, -2.0), 1.0);
        assert_eq!(neg(3.0), -3.0);
        assert_eq!(id(7.5), 7.5);
        assert_eq!(inv(4.0), 0.25);
        assert_eq!(relu(2.5), 2.5);
        assert_eq!(relu(-2.5), 0.0);
        assert_eq!(relu(0.0), 0.0);
        assert!((exp(1.0) - std::f64::consts::E).abs() < 1e-12);
        assert!((log(std::f64::consts::E) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(10.0) - 0.9999).abs() < 1e-4);
        assert!((sigmoid(-10.0) - 0.0001).abs() < 1e-4);

        let tiny = sigmoid(-1000.0);
        assert!(tiny.is_finite());
        assert!(tiny >= 0.0 && tiny < 1e-300);
        assert_eq!(sigmoid(1000.0), 1.0);

        // symmetric around 0
        for x in [0.3, 1.7, 5.0, 20.0] {
            assert!((sigmoid(x) + sigmoid(-x) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn log_is_clamped() {
        assert_eq!(log(0.0), EPS.ln());
        assert_eq!(log(-5.0), EPS.ln());
        assert!(log(0.0).is_finite());
    }

    #[test]
    fn backward_helpers() {
        assert_eq!(log_back(2.0, 3.0), 1.5);
        assert_eq!(inv_back(2.0, 3.0), -0.75);
        assert_eq!(relu_back(1.0, 3.0), 3.0);
        assert_eq!(relu_back(-1.0, 3.0), 0.0);
        assert_eq!(relu_back(0.0, 3.0), 0.0);
        assert_eq!(sigmoid_back(0.0, 2.0), 0.5);
        assert_eq!(mul_back(2.0, 5.0, 3.0), (15.0, 6.0));
    }

    #[test]
    fn backward_matches_central_difference() {
        let h = 1e-6;
        let d = 1.3;
        let cases: [(fn(f64) -> f64, fn(f64, f64) -> f64, f64); 5] = [
            (log, log_back, 0.7),
            (inv, inv_back, -1.9),
            (relu, relu_back, 2.2),
            (sigmoid, sigmoid_back, -0.4),
            (exp, exp_back, 0.9),
        ];
        for (f, f_back, x) in cases {
            let measured = d * (f(x + h) - f(x - h)) / (2.0 * h);
            let claimed = f_back(x, d);
            assert!(
                (claimed - measured).abs() < 1e-5,
                "at x={x}: claimed {claimed}, measured {measured}"
            );
        }
    }

    #[test]
    fn combinators() {
        assert_eq!(neg_list(&[1.0, -2.0, 3.0]), vec![-1.0, 2.0, -3.0]);
        assert_eq!(neg_list(&[]), Vec::<f64>::new());
        assert_eq!(
            add_lists(&[1.0, 2.0], &[10.0, 20.0]).unwrap(),
            vec![11.0, 22.0]
        );
        assert_eq!(
            add_lists(&[1.0, 2.0], &[1.0]),
            Err(Error::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(sum(&[1.0, 2.0, 3.5]), 6.5);
        assert_eq!(sum(&[]), 0.0);
        assert_eq!(prod(&[2.0, 3.0, 4.0]), 24.0);
        assert_eq!(prod(&[]), 1.0);
    }

    #[test]
    fn reduce_folds_from_the_left() {
        // f(x, acc) = x - acc: [1, 2, 3] from 0 → 3 - (2 - (1 - 0)) = 2
        assert_eq!(reduce(|x, acc| x - acc, 0.0)(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(map(|x| x * x)(&[1.0, 2.0, 3.0]), vec![1.0, 4.0, 9.0]);
    }
}
