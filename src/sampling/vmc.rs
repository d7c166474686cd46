//! Variational Monte Carlo optimization by plain gradient descent.
//!
//! Each update walks the ensemble with the Gaussian Metropolis step and
//! evaluates energy and gradient with [`EnergyEstimator`]. Parameters move
//! against the per-chain gradient; the proposal width is then rescaled
//! toward the target acceptance.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

use crate::error::Result;
use crate::mcmc::{
    gaussian_metropolis_step, summarize, AmplitudeModel, LogAbsAmplitude, RawAmplitude, StepSizeAdapter,
    TraceSummary, WalkerState,
};
use crate::physics::{EnergyEstimator, LocalEnergy, LogPsi};
use crate::random::RandomKey;

/// Settings of the optimization loop.
#[derive(Clone, Debug)]
pub struct VmcOptimizer {
    /// Number of chains in the ensemble
    pub n_chains: usize,
    /// Steps discarded before the first update
    pub n_burn_in: usize,
    /// Metropolis steps between parameter updates
    pub n_steps_per_update: usize,
    /// Number of parameter updates
    pub n_updates: usize,
    /// Gradient descent step
    pub learning_rate: f64,
    /// Initial width of the Gaussian proposal
    pub std_move: f64,
    /// Sample on log|psi| rather than psi
    pub log_amplitude: bool,
    pub adapter: StepSizeAdapter,
    pub seed: u64,
    /// Report every update at info level
    pub verbose: bool,
}

impl Default for VmcOptimizer {
    fn default() -> Self {
        Self {
            n_chains: 100,
            n_burn_in: 200,
            n_steps_per_update: 20,
            n_updates: 50,
            learning_rate: 0.05,
            std_move: 0.5,
            log_amplitude: true,
            adapter: StepSizeAdapter::default(),
            seed: 0,
            verbose: false,
        }
    }
}

/// Histories and final estimate of a run.
#[derive(Clone, Debug)]
pub struct OptimizationResult {
    pub final_params: DVector<f64>,
    /// Energy over the final sampling sweep, with its blocking error.
    pub final_energy: TraceSummary,
    pub final_variance: f64,
    /// Energy at each update
    pub energy_history: Vec<f64>,
    /// Variance at each update
    pub variance_history: Vec<f64>,
    /// Mean acceptance of the walk preceding each update
    pub acceptance_history: Vec<f64>,
    /// Parameters at each update (including initial)
    pub param_history: Vec<DVector<f64>>,
    /// Proposal width after the last adaptation
    pub final_std_move: f64,
}

impl VmcOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_chains(mut self, n: usize) -> Self {
        self.n_chains = n;
        self
    }

    pub fn with_n_burn_in(mut self, n: usize) -> Self {
        self.n_burn_in = n;
        self
    }

    pub fn with_n_steps_per_update(mut self, n: usize) -> Self {
        self.n_steps_per_update = n;
        self
    }

    pub fn with_n_updates(mut self, n: usize) -> Self {
        self.n_updates = n;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_std_move(mut self, std_move: f64) -> Self {
        self.std_move = std_move;
        self
    }

    pub fn with_log_amplitude(mut self, log_amplitude: bool) -> Self {
        self.log_amplitude = log_amplitude;
        self
    }

    pub fn with_step_size_adapter(mut self, adapter: StepSizeAdapter) -> Self {
        self.adapter = adapter;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_verbose(mut self, v: bool) -> Self {
        self.verbose = v;
        self
    }

    /// Minimizes the energy of `trial` under `hamiltonian`, starting from
    /// `initial_params`.
    ///
    /// Chains start from standard normal positions of shape `config_shape`.
    pub fn optimize<M, E>(
        &self,
        trial: &M,
        hamiltonian: &E,
        initial_params: DVector<f64>,
        config_shape: Vec<usize>,
    ) -> Result<OptimizationResult>
    where
        M: LogPsi,
        E: LocalEnergy<f64>,
    {
        let estimator = EnergyEstimator::new(trial, hamiltonian, self.n_chains)?;

        let (key, init) = RandomKey::from_seed(self.seed).split();
        let n_dof = config_shape.iter().product();
        let position: DMatrix<f64> = init.normal(self.n_chains, n_dof);

        if self.log_amplitude {
            self.run(&LogAbsAmplitude(trial), &estimator, initial_params, position, config_shape, key)
        } else {
            self.run(&RawAmplitude(trial), &estimator, initial_params, position, config_shape, key)
        }
    }

    fn run<A, M, E>(
        &self,
        amplitude: &A,
        estimator: &EnergyEstimator<M, E>,
        initial_params: DVector<f64>,
        position: DMatrix<f64>,
        config_shape: Vec<usize>,
        key: RandomKey,
    ) -> Result<OptimizationResult>
    where
        A: AmplitudeModel<DVector<f64>, f64>,
        M: LogPsi,
        E: LocalEnergy<f64>,
    {
        let mut params = initial_params;
        let mut std_move = self.std_move;
        let mut energy_history = Vec::with_capacity(self.n_updates);
        let mut variance_history = Vec::with_capacity(self.n_updates);
        let mut acceptance_history = Vec::with_capacity(self.n_updates);
        let mut param_history = Vec::with_capacity(self.n_updates + 1);
        param_history.push(params.clone());

        let state = WalkerState::from_model(amplitude, &params, position, config_shape)?;
        let step = gaussian_metropolis_step(std_move, amplitude, self.log_amplitude);
        let (mut state, mut key) = step.burn_in::<f64, _, _>(&params, state, key, self.n_burn_in)?;

        if self.verbose {
            info!(
                n_chains = self.n_chains,
                n_params = params.len(),
                n_updates = self.n_updates,
                learning_rate = self.learning_rate,
                "starting VMC optimization"
            );
        }

        let scale = self.learning_rate / self.n_chains as f64;
        for update in 0..self.n_updates {
            let step = gaussian_metropolis_step(std_move, amplitude, self.log_amplitude);
            let (acceptance, walked, next_key): (f64, _, _) = step.walk(&params, state, key, self.n_steps_per_update)?;
            key = next_key;

            let (result, grad) = estimator.value_and_grad(&params, walked.position())?;
            energy_history.push(result.energy);
            variance_history.push(result.variance);
            acceptance_history.push(acceptance);

            if self.verbose {
                info!(
                    update = update + 1,
                    energy = result.energy,
                    variance = result.variance,
                    acceptance,
                    std_move,
                    params = ?params.as_slice(),
                    "update"
                );
            } else {
                debug!(update = update + 1, energy = result.energy, variance = result.variance, "update");
            }

            params -= grad * scale;
            param_history.push(params.clone());

            state = walked.refresh_amplitude(amplitude, &params)?;
            std_move = self.adapter.adjust(std_move, acceptance);
        }

        let step = gaussian_metropolis_step(std_move, amplitude, self.log_amplitude);
        let mut trace = Vec::with_capacity(self.n_steps_per_update);
        let mut variance_sum = 0.0;
        for _ in 0..self.n_steps_per_update {
            let (_, next, next_key): (f64, _, _) = step.step(&params, &state, key)?;
            state = next;
            key = next_key;
            let result = estimator.evaluate_forward(&params, state.position())?;
            trace.push(result.energy);
            variance_sum += result.variance;
        }
        let final_energy = summarize(&trace);
        let final_variance = if trace.is_empty() {
            0.0
        } else {
            variance_sum / trace.len() as f64
        };

        if self.verbose {
            info!(
                energy = final_energy.mean,
                error = final_energy.error,
                autocorrelation_time = final_energy.autocorrelation_time,
                variance = final_variance,
                params = ?params.as_slice(),
                "final estimate"
            );
        }

        Ok(OptimizationResult {
            final_params: params,
            final_energy,
            final_variance,
            energy_history,
            variance_history,
            acceptance_history,
            param_history,
            final_std_move: std_move,
        })
    }
}
