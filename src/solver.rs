// src/solver.rs

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::botma_errors::BotmaError;
use crate::objective::ObjectiveFunction;
use crate::observation::ObservationSet;
use crate::parameter_space::ParameterSpace;
use crate::pheromone::PheromoneState;
use crate::trajectory_model::TrajectoryModel;

/// 轨迹参数向量 θ。
pub type ParameterVector = Vec<f64>;

/// 候选解的采样方式。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplingMode {
    /// 在每个维度的范围内均匀采样。
    Unbiased,
    /// 先按信息素偏置单位随机数，再以概率 `epsilon` 退回原始随机数。
    PheromoneBiased { epsilon: f64 },
}

/// 每轮内部的执行方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// 单一随机数流，按蚂蚁、维度顺序依次采样和评估。
    #[default]
    Sequential,
    /// 主随机数流按蚂蚁顺序派生子种子，各蚂蚁并行采样与评估。
    Parallel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub ant_count: usize,
    pub iterations: usize,
    pub evaporation_rate: f64,
    pub sampling: SamplingMode,
    pub seed: u64,
    pub execution: Execution,
    /// 连续多少轮没有严格改进就提前停止；`None` 表示跑满迭代预算。
    pub plateau_patience: Option<NonZeroUsize>,
    /// 每轮结束后检查的墙钟时限。
    pub time_limit: Option<Duration>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            ant_count: 100,
            iterations: 1000,
            evaporation_rate: 0.1,
            sampling: SamplingMode::Unbiased,
            seed: 0,
            execution: Execution::Sequential,
            plateau_patience: None,
            time_limit: None,
        }
    }
}

impl SolverConfig {
    /// 在迭代开始前检查配置，不做任何截断修正。
    pub fn validate(&self) -> Result<(), BotmaError> {
        if self.ant_count == 0 {
            return Err(BotmaError::InvalidAntCount);
        }
        if self.iterations == 0 {
            return Err(BotmaError::InvalidIterations);
        }
        if !(0.0..1.0).contains(&self.evaporation_rate) {
            return Err(BotmaError::InvalidEvaporationRate(self.evaporation_rate));
        }
        if let SamplingMode::PheromoneBiased { epsilon } = self.sampling {
            if !(0.0..=1.0).contains(&epsilon) {
                return Err(BotmaError::InvalidEpsilon(epsilon));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    IterationBudget,
    Plateau,
    TimeLimit,
}

#[derive(Debug, Clone)]
pub struct SolverResult {
    pub best: ParameterVector,
    pub best_fitness: f64,
    /// 每轮结束时的最优适应度，非增。
    pub history: Vec<f64>,
    pub iterations_run: usize,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
}

/// 每轮结束（最优解与信息素均已更新）后交给观察者的快照。
#[derive(Debug)]
pub struct IterationReport<'a> {
    pub iteration: usize,
    pub candidates: &'a [ParameterVector],
    pub fitness: &'a [f64],
    pub best_fitness: f64,
    pub pheromones: &'a [f64],
}

/// 为一只蚂蚁采样参数向量。
///
/// 每个维度先取一个 `u ~ U[0, 1)`；偏置模式下紧接着再取一个随机数决定是否退回 `u`。
///
/// # 参数
/// * `space` - 参数空间。
/// * `pheromones` - 当前信息素。
/// * `sampling` - 采样方式。
/// * `rng` - 随机数流，调用方负责其生命周期。
///
/// # 返回值
/// 落在 `space` 内的参数向量。
pub fn sample_ant<R: Rng>(
    space: &ParameterSpace,
    pheromones: &PheromoneState,
    sampling: SamplingMode,
    rng: &mut R,
) -> ParameterVector {
    (0..space.dimensions())
        .map(|d| {
            let u: f64 = rng.gen();
            let unit = match sampling {
                SamplingMode::Unbiased => u,
                SamplingMode::PheromoneBiased { epsilon } => {
                    let biased = pheromones.bias(d, u);
                    if rng.gen::<f64>() < epsilon {
                        u
                    } else {
                        biased
                    }
                }
            };
            space.scale(d, unit)
        })
        .collect()
}

/// 蚁群求解器：固定迭代预算下的随机搜索。
#[derive(Debug, Clone)]
pub struct AntColonySolver {
    objective: ObjectiveFunction,
    space: ParameterSpace,
    config: SolverConfig,
}

impl AntColonySolver {
    /// 构造求解器并完成全部配置检查。
    ///
    /// 参数空间维数必须与模型维数一致。
    pub fn new(
        model: TrajectoryModel,
        space: ParameterSpace,
        config: SolverConfig,
    ) -> Result<Self, BotmaError> {
        config.validate()?;
        if space.dimensions() != model.dimensions() {
            return Err(BotmaError::DimensionMismatch {
                expected: model.dimensions(),
                found: space.dimensions(),
            });
        }
        Ok(AntColonySolver {
            objective: ObjectiveFunction::new(model),
            space,
            config,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn objective(&self) -> &ObjectiveFunction {
        &self.objective
    }

    pub fn run(&self, observations: &ObservationSet) -> SolverResult {
        self.run_with_observer(observations, |_| {})
    }

    /// 运行完整搜索，每轮结束时调用 `on_iteration`。
    ///
    /// 观察者只能读取快照，不影响搜索结果。
    pub fn run_with_observer<F>(
        &self,
        observations: &ObservationSet,
        mut on_iteration: F,
    ) -> SolverResult
    where
        F: FnMut(&IterationReport<'_>),
    {
        let start = Instant::now();
        let dims = self.space.dimensions();
        let cfg = &self.config;

        info!(
            "Starting ACO: {} ants, {} iterations, {} dimensions, {} observations, seed {}",
            cfg.ant_count,
            cfg.iterations,
            dims,
            observations.len(),
            cfg.seed
        );

        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let mut pheromones = PheromoneState::new(dims);
        let mut best_solution = vec![0.0; dims];
        let mut best_fitness = f64::INFINITY;
        let mut history = Vec::with_capacity(cfg.iterations);
        let mut stale_iterations = 0usize;
        let mut stop_reason = StopReason::IterationBudget;

        for iter in 0..cfg.iterations {
            let (candidates, fitness) = match cfg.execution {
                Execution::Sequential => self.sequential_round(&mut rng, &pheromones, observations),
                Execution::Parallel => self.parallel_round(&mut rng, &pheromones, observations),
            };

            // 同值时保留先找到的解
            let mut improved = false;
            for (candidate, &f) in candidates.iter().zip(&fitness) {
                if f < best_fitness {
                    best_fitness = f;
                    best_solution.clone_from(candidate);
                    improved = true;
                }
            }

            pheromones.evaporate_and_deposit(&fitness, cfg.evaporation_rate);
            history.push(best_fitness);

            debug!(
                "Iteration {}/{}: Best Fitness = {:.6}",
                iter + 1,
                cfg.iterations,
                best_fitness
            );

            on_iteration(&IterationReport {
                iteration: iter,
                candidates: &candidates,
                fitness: &fitness,
                best_fitness,
                pheromones: pheromones.levels(),
            });

            if improved {
                stale_iterations = 0;
            } else {
                stale_iterations += 1;
            }

            let remaining = iter + 1 < cfg.iterations;
            if remaining {
                if let Some(patience) = cfg.plateau_patience {
                    if stale_iterations >= patience.get() {
                        info!(
                            "No improvement for {} iterations, stopping after iteration {}",
                            stale_iterations,
                            iter + 1
                        );
                        stop_reason = StopReason::Plateau;
                        break;
                    }
                }
                if let Some(limit) = cfg.time_limit {
                    if start.elapsed() >= limit {
                        warn!(
                            "Time limit of {:?} reached after iteration {}/{}",
                            limit,
                            iter + 1,
                            cfg.iterations
                        );
                        stop_reason = StopReason::TimeLimit;
                        break;
                    }
                }
            }
        }

        let elapsed = start.elapsed();
        info!(
            "ACO finished after {} iterations ({:?}): best fitness {:.6}",
            history.len(),
            elapsed,
            best_fitness
        );

        SolverResult {
            best: best_solution,
            best_fitness,
            iterations_run: history.len(),
            history,
            stop_reason,
            elapsed,
        }
    }

    fn sequential_round(
        &self,
        rng: &mut StdRng,
        pheromones: &PheromoneState,
        observations: &ObservationSet,
    ) -> (Vec<ParameterVector>, Vec<f64>) {
        let candidates: Vec<ParameterVector> = (0..self.config.ant_count)
            .map(|_| sample_ant(&self.space, pheromones, self.config.sampling, &mut *rng))
            .collect();
        let fitness = candidates
            .iter()
            .map(|c| self.objective.evaluate(c, observations))
            .collect();
        (candidates, fitness)
    }

    fn parallel_round(
        &self,
        rng: &mut StdRng,
        pheromones: &PheromoneState,
        observations: &ObservationSet,
    ) -> (Vec<ParameterVector>, Vec<f64>) {
        // 子种子按蚂蚁顺序从主流中取出，与线程调度无关
        let sub_seeds: Vec<u64> = (0..self.config.ant_count).map(|_| rng.gen()).collect();
        sub_seeds
            .par_iter()
            .map(|&seed| {
                let mut ant_rng = StdRng::seed_from_u64(seed);
                let candidate =
                    sample_ant(&self.space, pheromones, self.config.sampling, &mut ant_rng);
                let f = self.objective.evaluate(&candidate, observations);
                (candidate, f)
            })
            .unzip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter_space::ParamSet;

    fn small_observations() -> ObservationSet {
        ObservationSet::from_columns(
            &[2.0, 4.0, 6.0, 8.0],
            &[0.0, 10.0, 20.0, 30.0],
            &[0.0; 4],
            &[0.78, 0.83, 0.89, 0.95],
        )
        .unwrap()
    }

    fn small_config() -> SolverConfig {
        SolverConfig {
            ant_count: 8,
            iterations: 30,
            seed: 7,
            ..SolverConfig::default()
        }
    }

    #[test]
    fn test_config_validation() {
        let base = SolverConfig::default();
        assert!(base.validate().is_ok());
        assert_eq!(
            SolverConfig { ant_count: 0, ..base.clone() }.validate(),
            Err(BotmaError::InvalidAntCount)
        );
        assert_eq!(
            SolverConfig { iterations: 0, ..base.clone() }.validate(),
            Err(BotmaError::InvalidIterations)
        );
        assert_eq!(
            SolverConfig { evaporation_rate: 1.0, ..base.clone() }.validate(),
            Err(BotmaError::InvalidEvaporationRate(1.0))
        );
        assert!(SolverConfig { evaporation_rate: f64::NAN, ..base.clone() }
            .validate()
            .is_err());
        assert_eq!(
            SolverConfig {
                sampling: SamplingMode::PheromoneBiased { epsilon: 1.2 },
                ..base.clone()
            }
            .validate(),
            Err(BotmaError::InvalidEpsilon(1.2))
        );
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let space = ParameterSpace::bounds_for(4, ParamSet::NearLinear).unwrap();
        let err = AntColonySolver::new(TrajectoryModel::Kinematic, space, SolverConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            BotmaError::DimensionMismatch {
                expected: 6,
                found: 4
            }
        );
    }

    #[test]
    fn test_unbiased_sampling_draw_order() {
        let space = ParameterSpace::new(vec![(0.0, 10.0), (-1.0, 1.0)]).unwrap();
        let pheromones = PheromoneState::new(2);
        let mut rng = StdRng::seed_from_u64(3);
        let sample = sample_ant(&space, &pheromones, SamplingMode::Unbiased, &mut rng);

        let mut reference = StdRng::seed_from_u64(3);
        let u0: f64 = reference.gen();
        let u1: f64 = reference.gen();
        assert_eq!(sample, vec![10.0 * u0, -1.0 + 2.0 * u1]);
    }

    #[test]
    fn test_biased_sampling_without_override() {
        let space = ParameterSpace::new(vec![(0.0, 1.0)]).unwrap();
        let mut pheromones = PheromoneState::new(1);
        pheromones.evaporate_and_deposit(&[0.0, 0.0], 0.5);
        let mut rng = StdRng::seed_from_u64(11);
        let sample = sample_ant(
            &space,
            &pheromones,
            SamplingMode::PheromoneBiased { epsilon: 0.0 },
            &mut rng,
        );

        let mut reference = StdRng::seed_from_u64(11);
        let u: f64 = reference.gen();
        assert_eq!(sample[0], pheromones.bias(0, u));
    }

    #[test]
    fn test_history_is_non_increasing() {
        let model = TrajectoryModel::polynomial(4).unwrap();
        let space =
            ParameterSpace::new(vec![(0.0, 50.0), (0.0, 50.0), (-2.0, 2.0), (-2.0, 2.0)]).unwrap();
        let solver = AntColonySolver::new(model, space, small_config()).unwrap();
        let result = solver.run(&small_observations());
        assert_eq!(result.iterations_run, 30);
        assert_eq!(result.stop_reason, StopReason::IterationBudget);
        assert!(result.history.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(*result.history.last().unwrap(), result.best_fitness);
    }

    #[test]
    fn test_best_matches_recomputed_fitness() {
        let model = TrajectoryModel::polynomial(4).unwrap();
        let space =
            ParameterSpace::new(vec![(0.0, 50.0), (0.0, 50.0), (-2.0, 2.0), (-2.0, 2.0)]).unwrap();
        let solver = AntColonySolver::new(model, space.clone(), small_config()).unwrap();
        let obs = small_observations();
        let result = solver.run(&obs);
        assert!(space.contains(&result.best));
        assert_eq!(
            solver.objective().evaluate(&result.best, &obs).to_bits(),
            result.best_fitness.to_bits()
        );
    }

    #[test]
    fn test_first_found_wins_on_ties() {
        // 所有维度都被固定：每只蚂蚁的解与适应度完全相同
        let model = TrajectoryModel::polynomial(4).unwrap();
        let space =
            ParameterSpace::new(vec![(1.0, 1.0), (2.0, 2.0), (0.0, 0.0), (0.0, 0.0)]).unwrap();
        let solver = AntColonySolver::new(model, space, small_config()).unwrap();
        let mut improvements = 0;
        let mut last = f64::INFINITY;
        let result = solver.run_with_observer(&small_observations(), |report| {
            if report.best_fitness < last {
                improvements += 1;
                last = report.best_fitness;
            }
        });
        assert_eq!(improvements, 1);
        assert_eq!(result.best, vec![1.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_plateau_stops_early() {
        let model = TrajectoryModel::polynomial(4).unwrap();
        let space =
            ParameterSpace::new(vec![(1.0, 1.0), (2.0, 2.0), (0.0, 0.0), (0.0, 0.0)]).unwrap();
        let config = SolverConfig {
            plateau_patience: NonZeroUsize::new(3),
            ..small_config()
        };
        let solver = AntColonySolver::new(model, space, config).unwrap();
        let result = solver.run(&small_observations());
        // 第 1 轮改进，之后 3 轮无改进
        assert_eq!(result.iterations_run, 4);
        assert_eq!(result.stop_reason, StopReason::Plateau);
    }

    #[test]
    fn test_zero_time_limit_stops_after_first_iteration() {
        let model = TrajectoryModel::polynomial(4).unwrap();
        let space = ParameterSpace::bounds_for(4, ParamSet::NearLinear).unwrap();
        let config = SolverConfig {
            time_limit: Some(Duration::ZERO),
            ..small_config()
        };
        let solver = AntColonySolver::new(model, space, config).unwrap();
        let result = solver.run(&small_observations());
        assert_eq!(result.iterations_run, 1);
        assert_eq!(result.stop_reason, StopReason::TimeLimit);
        assert!(result.best_fitness.is_finite());
    }

    #[test]
    fn test_parallel_is_reproducible() {
        let model = TrajectoryModel::polynomial(6).unwrap();
        let space = ParameterSpace::new(vec![
            (0.0, 50.0),
            (0.0, 50.0),
            (-2.0, 2.0),
            (-2.0, 2.0),
            (-0.1, 0.1),
            (-0.1, 0.1),
        ])
        .unwrap();
        let config = SolverConfig {
            execution: Execution::Parallel,
            sampling: SamplingMode::PheromoneBiased { epsilon: 0.2 },
            ..small_config()
        };
        let solver = AntColonySolver::new(model, space, config).unwrap();
        let obs = small_observations();
        let a = solver.run(&obs);
        let b = solver.run(&obs);
        assert_eq!(a.best, b.best);
        assert_eq!(a.best_fitness.to_bits(), b.best_fitness.to_bits());
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_parallel_uses_per_ant_sub_streams() {
        let model = TrajectoryModel::polynomial(4).unwrap();
        let space = ParameterSpace::new(vec![(0.0, 1.0); 4]).unwrap();
        let config = SolverConfig {
            execution: Execution::Parallel,
            ant_count: 3,
            iterations: 1,
            seed: 99,
            ..SolverConfig::default()
        };
        let solver = AntColonySolver::new(model, space.clone(), config).unwrap();

        let mut recorded = Vec::new();
        solver.run_with_observer(&small_observations(), |report| {
            recorded = report.candidates.to_vec();
        });

        let mut master = StdRng::seed_from_u64(99);
        let pheromones = PheromoneState::new(4);
        let expected: Vec<ParameterVector> = (0..3)
            .map(|_| master.gen::<u64>())
            .collect::<Vec<_>>()
            .into_iter()
            .map(|s| {
                let mut ant_rng = StdRng::seed_from_u64(s);
                sample_ant(&space, &pheromones, SamplingMode::Unbiased, &mut ant_rng)
            })
            .collect();
        assert_eq!(recorded, expected);
    }
}
