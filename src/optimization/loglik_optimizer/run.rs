//! Execution helper that runs an `argmin` solver on a bounded log-likelihood
//! problem and returns a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
        adapter::bounded_theta,
    },
};
use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin_math::ArgminL2Norm;

/// Run an `argmin` optimization for a bounded log-likelihood problem.
///
/// This is the shared runner used by both line-search variants. It wires up
/// the adapted model, the solver, the unconstrained start `u0`, the optional
/// observer (behind the `obs_slog` feature) and the iteration budget, then
/// converts the result back into the bounded space.
///
/// # Recovery
/// If argmin aborts (typically a line search that cannot make progress),
/// the best finite iterate seen by the adapter is returned with
/// `converged = false` and a warning is logged. Model faults
/// ([`OptError::NotPositiveDefinite`], [`OptError::InvalidHyperparameter`],
/// [`OptError::ModelError`]) are never recovered from.
///
/// # Errors
/// - Propagates model faults and any argmin error raised before a single
///   finite evaluation was recorded.
/// - Propagates validation errors encountered when constructing
///   [`OptimOutcome`].
pub fn run_lbfgs<'a, F, S>(
    u0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    if opts.verbose {
        log_initial_state(&u0, &problem)?;
    }
    let bounds = problem.bounds;
    let best = problem.best;

    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(u0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let run = match optimizer.run() {
        Ok(run) => run,
        Err(err) => {
            let err = OptError::from(err);
            if is_model_fault(&err) {
                return Err(err);
            }
            let best = best.borrow();
            return match best.theta.clone() {
                Some(theta) => {
                    log::warn!(
                        "optimizer aborted ({err}); returning best iterate with value {:.6}",
                        best.value
                    );
                    OptimOutcome::recovered(theta, best.value, err.to_string())
                }
                None => Err(err),
            };
        }
    };

    let mut result = run.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    let theta_hat = result.take_best_param().map(|u| bounded_theta(&u, bounds));
    let outcome = OptimOutcome::new(
        theta_hat,
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )?;
    log::debug!(
        "optimizer finished: status={}, iterations={}, value={:.6}",
        outcome.status,
        outcome.iterations,
        outcome.value
    );
    Ok(outcome)
}

// ---- Helper Methods ----

fn is_model_fault(err: &OptError) -> bool {
    matches!(
        err,
        OptError::NotPositiveDefinite { .. }
            | OptError::InvalidHyperparameter { .. }
            | OptError::ModelError { .. }
    )
}

fn log_initial_state<F>(u0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()>
where
    F: LogLikelihood,
{
    let ll0 = -problem.cost(u0)?;
    let g0n = problem.gradient(u0).ok().map(|g| g.l2_norm());
    log::info!(
        "init: ell(theta0) = {:.6}{}",
        ll0,
        g0n.map(|n| format!(", ||grad|| = {:.6}", n)).unwrap_or_default()
    );
    Ok(())
}
