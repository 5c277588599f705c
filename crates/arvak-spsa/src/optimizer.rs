//! The SPSA optimizer.
//!
//! Each step draws one Rademacher direction `Δ`, evaluates the objective at
//! `θ + c_k Δ` and `θ - c_k Δ`, and moves every trainable entry by
//! `-a_k (f+ - f-) / (2 c_k Δ_i)`. The iteration counter advances only once
//! the update has been formed, so a failed step can be retried from the same
//! state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::SpsaConfig;
use crate::error::{SpsaError, SpsaResult, StepError};
use crate::params::ParameterSet;
use crate::perturbation::Perturbation;
use crate::schedule::Schedule;

/// Mutable state of one optimization run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizerState {
    /// Completed steps in the current run.
    pub iteration: usize,
    /// Shapes seen on the first completed step of the run.
    pub shapes: Option<Vec<Vec<usize>>>,
}

/// Result of [`Spsa::minimize`].
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Parameters after the last step.
    pub optimal_params: ParameterSet,
    /// Objective value at `optimal_params`.
    pub optimal_value: f64,
    /// Number of objective evaluations.
    pub num_evaluations: usize,
    /// Number of steps taken.
    pub num_iterations: usize,
    /// Objective value before each step, followed by the final value.
    pub history: Vec<f64>,
}

/// Everything a step needs that is fixed before the objective is called.
///
/// `rng` is the generator after drawing `delta`. It replaces the
/// optimizer's generator only when the step commits.
struct StepPlan<R> {
    iteration: usize,
    magnitude: f64,
    gain: f64,
    delta: Perturbation,
    rng: R,
}

/// Simultaneous Perturbation Stochastic Approximation optimizer.
///
/// A gradient-free stochastic optimizer that estimates the gradient from
/// two objective evaluations per step, regardless of the number of
/// parameters. Suited to noisy cost functions such as shot-sampled
/// expectation values.
///
/// The perturbation generator is owned by the instance. Give every
/// concurrently running optimizer its own generator. A failed step leaves
/// the generator where it was, so retrying reproduces the direction the
/// failed step drew.
///
/// # Example
///
/// ```
/// use arvak_spsa::{ParameterSet, Spsa, SpsaConfig};
///
/// let mut spsa = Spsa::new(SpsaConfig::new(50).with_seed(3)).unwrap();
/// let mut params = ParameterSet::from(vec![0.0, 0.0]);
///
/// for _ in 0..50 {
///     params = spsa
///         .step(
///             |p: &ParameterSet| {
///                 let x = p.to_flat_vec();
///                 Ok::<_, std::convert::Infallible>((x[0] - 3.0).powi(2) + (x[1] + 2.0).powi(2))
///             },
///             &params,
///         )
///         .unwrap();
/// }
///
/// assert_eq!(spsa.iteration(), 50);
/// ```
#[derive(Debug, Clone)]
pub struct Spsa<R = StdRng> {
    config: SpsaConfig,
    schedule: Schedule,
    state: OptimizerState,
    rng: R,
}

impl Spsa<StdRng> {
    /// Create an optimizer seeded from `config.seed`, or from OS entropy
    /// when no seed is configured.
    pub fn new(config: SpsaConfig) -> SpsaResult<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng + Clone> Spsa<R> {
    /// Create an optimizer drawing perturbations from `rng`.
    ///
    /// `config.seed` is ignored.
    pub fn with_rng(config: SpsaConfig, rng: R) -> SpsaResult<Self> {
        let schedule = Schedule::from_config(&config)?;
        debug!(
            maxiter = schedule.maxiter,
            a = schedule.a,
            c = schedule.c,
            big_a = schedule.big_a,
            alpha = schedule.alpha,
            gamma = schedule.gamma,
            "Created SPSA optimizer"
        );
        Ok(Self {
            config,
            schedule,
            state: OptimizerState::default(),
            rng,
        })
    }

    /// Get the configuration this optimizer was built from.
    pub fn config(&self) -> &SpsaConfig {
        &self.config
    }

    /// Get the resolved schedule constants.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Get the run state.
    pub fn state(&self) -> &OptimizerState {
        &self.state
    }

    /// Number of completed steps in the current run.
    pub fn iteration(&self) -> usize {
        self.state.iteration
    }

    /// Gain the next step will use.
    pub fn current_gain(&self) -> f64 {
        self.schedule.gain(self.state.iteration)
    }

    /// Perturbation magnitude the next step will use.
    pub fn current_perturbation_magnitude(&self) -> f64 {
        self.schedule.perturbation_magnitude(self.state.iteration)
    }

    /// Start a new run: zero the iteration counter and forget recorded shapes.
    ///
    /// Schedule constants and the perturbation generator are untouched.
    pub fn reset(&mut self) {
        self.state = OptimizerState::default();
    }

    /// Take one step, evaluating `objective` exactly twice.
    pub fn step<F, E>(
        &mut self,
        mut objective: F,
        params: &ParameterSet,
    ) -> Result<ParameterSet, StepError<E>>
    where
        F: FnMut(&ParameterSet) -> Result<f64, E>,
    {
        let plan = self.begin(params)?;

        let cost_plus = objective(&plan.delta.shifted(params, plan.magnitude))
            .map_err(StepError::Objective)?;
        let cost_minus = objective(&plan.delta.shifted(params, -plan.magnitude))
            .map_err(StepError::Objective)?;

        Ok(self.finish(plan, params, cost_plus, cost_minus))
    }

    /// Take one step and report the objective at the pre-update point.
    ///
    /// Evaluates `objective` exactly three times: the two perturbed points
    /// used for the update, then `params` itself for the reported cost.
    pub fn step_and_cost<F, E>(
        &mut self,
        mut objective: F,
        params: &ParameterSet,
    ) -> Result<(ParameterSet, f64), StepError<E>>
    where
        F: FnMut(&ParameterSet) -> Result<f64, E>,
    {
        let plan = self.begin(params)?;

        let cost_plus = objective(&plan.delta.shifted(params, plan.magnitude))
            .map_err(StepError::Objective)?;
        let cost_minus = objective(&plan.delta.shifted(params, -plan.magnitude))
            .map_err(StepError::Objective)?;
        let cost = objective(params).map_err(StepError::Objective)?;

        Ok((self.finish(plan, params, cost_plus, cost_minus), cost))
    }

    /// Take one step, evaluating the two perturbed points concurrently.
    ///
    /// Same semantics as [`Spsa::step`]. The plus point runs on a scoped
    /// worker thread while the minus point runs on the caller's thread. If
    /// both evaluations fail, the plus error is returned.
    pub fn step_parallel<F, E>(
        &mut self,
        objective: F,
        params: &ParameterSet,
    ) -> Result<ParameterSet, StepError<E>>
    where
        F: Fn(&ParameterSet) -> Result<f64, E> + Sync,
        E: Send,
    {
        let plan = self.begin(params)?;
        let plus = plan.delta.shifted(params, plan.magnitude);
        let minus = plan.delta.shifted(params, -plan.magnitude);
        let objective = &objective;

        let (cost_plus, cost_minus) = std::thread::scope(|s| {
            let worker = s.spawn(|| objective(&plus));
            let cost_minus = objective(&minus);
            let cost_plus = match worker.join() {
                Ok(result) => result,
                Err(payload) => std::panic::resume_unwind(payload),
            };
            (cost_plus, cost_minus)
        });

        let cost_plus = cost_plus.map_err(StepError::Objective)?;
        let cost_minus = cost_minus.map_err(StepError::Objective)?;

        Ok(self.finish(plan, params, cost_plus, cost_minus))
    }

    /// Run the remaining steps of the calibrated budget.
    ///
    /// Calls [`Spsa::step_and_cost`] until `maxiter` steps have been taken
    /// in this run, then evaluates the objective once more at the final
    /// point.
    pub fn minimize<F, E>(
        &mut self,
        mut objective: F,
        initial_params: ParameterSet,
    ) -> Result<OptimizationResult, StepError<E>>
    where
        F: FnMut(&ParameterSet) -> Result<f64, E>,
    {
        let start = self.state.iteration;
        let remaining = self.schedule.maxiter.saturating_sub(start);
        let mut params = initial_params;
        let mut history = Vec::with_capacity(remaining + 1);
        let mut num_evaluations = 0;

        for _ in 0..remaining {
            let (next, cost) = self.step_and_cost(&mut objective, &params)?;
            num_evaluations += 3;
            history.push(cost);
            params = next;
        }

        let optimal_value = objective(&params).map_err(StepError::Objective)?;
        num_evaluations += 1;
        history.push(optimal_value);

        info!(
            iterations = remaining,
            evaluations = num_evaluations,
            value = optimal_value,
            "SPSA run finished"
        );

        Ok(OptimizationResult {
            optimal_params: params,
            optimal_value,
            num_evaluations,
            num_iterations: self.state.iteration - start,
            history,
        })
    }

    /// Validate the layout and fix the schedule values for this step.
    fn begin(&self, params: &ParameterSet) -> Result<StepPlan<R>, SpsaError> {
        if let Some(shapes) = &self.state.shapes {
            params.check_shapes(shapes)?;
        }

        let iteration = self.state.iteration;
        let mut rng = self.rng.clone();
        let delta = Perturbation::sample(params, &mut rng);
        Ok(StepPlan {
            iteration,
            magnitude: self.schedule.perturbation_magnitude(iteration),
            gain: self.schedule.gain(iteration),
            delta,
            rng,
        })
    }

    /// Form the update and commit the step.
    fn finish(
        &mut self,
        plan: StepPlan<R>,
        params: &ParameterSet,
        cost_plus: f64,
        cost_minus: f64,
    ) -> ParameterSet {
        if !cost_plus.is_finite() || !cost_minus.is_finite() {
            warn!(
                iteration = plan.iteration,
                cost_plus, cost_minus, "Objective returned a non-finite value"
            );
        }

        debug!(
            iteration = plan.iteration,
            c_k = plan.magnitude,
            a_k = plan.gain,
            cost_plus,
            cost_minus,
            "SPSA step"
        );

        let updated = plan
            .delta
            .update(params, cost_plus - cost_minus, plan.magnitude, plan.gain);

        if self.state.shapes.is_none() {
            self.state.shapes = Some(params.shapes());
        }
        self.state.iteration += 1;
        self.rng = plan.rng;

        updated
    }
}
