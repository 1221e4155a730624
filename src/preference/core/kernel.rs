//! ARD squared-exponential kernel, covariance matrix, and its derivatives.
//!
//! With `Δ = xᵢ − xⱼ` the kernel is
//!
//! ```text
//! k(xᵢ, xⱼ) = a · exp(−½ Σ_d (Δ_d / r_d)²)
//! C = K + b·I
//! ```
//!
//! so `Cᵢᵢ = a + b`. The closed-form partials used by the MAP gradient are
//! `∂C/∂a = K / a`, `∂C/∂b = I`, and `∂C/∂r_d = K ⊙ Δ_d² / r_d³`.
//!
//! Points are columns of a `D × M` matrix. All functions are pure.
use crate::preference::core::hyper::Hyperparameters;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// `a · exp(−½ Σ ((xᵢ − xⱼ)/r)²)`.
pub fn ard_squared_exp(xi: ArrayView1<f64>, xj: ArrayView1<f64>, a: f64, r: ArrayView1<f64>) -> f64 {
    let sq: f64 = xi
        .iter()
        .zip(xj.iter())
        .zip(r.iter())
        .map(|((&u, &v), &rd)| {
            let z = (u - v) / rd;
            z * z
        })
        .sum();
    a * (-0.5 * sq).exp()
}

/// `K` without the diagonal noise term.
fn kernel_matrix(points: ArrayView2<f64>, a: f64, r: ArrayView1<f64>) -> Array2<f64> {
    let m = points.ncols();
    let mut k = Array2::zeros((m, m));
    for i in 0..m {
        k[[i, i]] = a;
        for j in (i + 1)..m {
            let v = ard_squared_exp(points.column(i), points.column(j), a, r);
            k[[i, j]] = v;
            k[[j, i]] = v;
        }
    }
    k
}

/// Full covariance `C = K + b·I` over the sampled points.
pub fn covariance_matrix(points: ArrayView2<f64>, hyper: &Hyperparameters) -> Array2<f64> {
    let mut c = kernel_matrix(points, hyper.a, hyper.r.view());
    c.diag_mut().mapv_inplace(|v| v + hyper.b);
    c
}

/// Cross-covariance `k(x)` between a query point and every sampled point.
///
/// No noise term is added, even when `x` coincides with a sample.
pub fn cross_covariance(
    x: ArrayView1<f64>, points: ArrayView2<f64>, hyper: &Hyperparameters,
) -> Array1<f64> {
    points
        .columns()
        .into_iter()
        .map(|col| ard_squared_exp(x, col, hyper.a, hyper.r.view()))
        .collect()
}

/// Self-covariance used for predictive variance: `a + b`.
pub fn prior_variance(hyper: &Hyperparameters) -> f64 {
    hyper.a + hyper.b
}

/// `∂C/∂a = K / a` (the unit-amplitude kernel).
pub fn d_covariance_d_a(points: ArrayView2<f64>, hyper: &Hyperparameters) -> Array2<f64> {
    kernel_matrix(points, 1.0, hyper.r.view())
}

/// `∂C/∂b = I`.
pub fn d_covariance_d_b(points: ArrayView2<f64>) -> Array2<f64> {
    Array2::eye(points.ncols())
}

/// `∂C/∂r_d = K ⊙ Δ_d² / r_d³` for dimension `d`.
pub fn d_covariance_d_r(points: ArrayView2<f64>, hyper: &Hyperparameters, d: usize) -> Array2<f64> {
    let m = points.ncols();
    let rd3 = hyper.r[d].powi(3);
    let mut out = Array2::zeros((m, m));
    for i in 0..m {
        for j in (i + 1)..m {
            let delta = points[[d, i]] - points[[d, j]];
            let k = ard_squared_exp(points.column(i), points.column(j), hyper.a, hyper.r.view());
            let v = k * delta * delta / rd3;
            out[[i, j]] = v;
            out[[j, i]] = v;
        }
    }
    out
}
