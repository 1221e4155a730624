//! loglik_optimizer::builders — L-BFGS solver construction.
//!
//! Both builders read the L-BFGS history from `opts.lbfgs_mem` (falling back
//! to [`DEFAULT_LBFGS_MEM`]) and apply the optional gradient and cost-change
//! tolerances through [`configure_lbfgs`]. The initial point and the
//! iteration budget are runtime concerns owned by `run::run_lbfgs`.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with a Hager–Zhang line search.
///
/// # Errors
/// Propagates tolerance rejections from argmin as [`OptError`](crate::optimization::errors::OptError).
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with a More–Thuente line search.
///
/// # Errors
/// Propagates tolerance rejections from argmin as [`OptError`](crate::optimization::errors::OptError).
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the optional tolerances in `opts.tols` to an L-BFGS solver.
///
/// A `None` tolerance leaves argmin's default in place.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::traits::{LineSearcher, Tolerances};

    fn opts(line_searcher: LineSearcher, mem: Option<usize>) -> MLEOptions {
        let tols =
            Tolerances::new(Some(1e-6), Some(1e-8), Some(50)).expect("Tolerances should be valid");
        MLEOptions::new(tols, line_searcher, false, mem).expect("MLEOptions should be valid")
    }

    #[test]
    // Purpose
    // -------
    // Both builders accept the default and an explicit L-BFGS history.
    fn builders_accept_default_and_explicit_memory() {
        assert!(build_optimizer_hager_zhang(&opts(LineSearcher::HagerZhang, None)).is_ok());
        assert!(build_optimizer_hager_zhang(&opts(LineSearcher::HagerZhang, Some(11))).is_ok());
        assert!(build_optimizer_more_thuente(&opts(LineSearcher::MoreThuente, None)).is_ok());
        assert!(build_optimizer_more_thuente(&opts(LineSearcher::MoreThuente, Some(3))).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // With no tolerances at all, `configure_lbfgs` leaves argmin's defaults
    // and still succeeds.
    fn configure_lbfgs_respects_absent_tolerances() {
        let raw = LBFGS::new(MoreThuenteLS::new(), DEFAULT_LBFGS_MEM);
        let tols = Tolerances::new(None, None, Some(50)).expect("Tolerances should be valid");
        let opts = MLEOptions::new(tols, LineSearcher::MoreThuente, false, None)
            .expect("MLEOptions should be valid");
        assert!(configure_lbfgs(raw, &opts).is_ok());
    }
}
