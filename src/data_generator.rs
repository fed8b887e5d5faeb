// src/data_generator.rs

use nalgebra::{Point2, Vector2};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::botma_errors::BotmaError;
use crate::observation::{Observation, ObservationSet};
use crate::solver::ParameterVector;
use crate::trajectory_model::TrajectoryModel;

/// 模拟场景参数：目标按 `model` 运动，本舰走之字形航线。
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub model: TrajectoryModel,
    /// 目标真实参数，长度须等于模型维数。
    pub true_theta: ParameterVector,
    pub num_samples: usize,
    pub sampling_time: f64,
    pub ownship_start: (f64, f64),
    pub ownship_speed: f64,
    /// 初始航向（弧度，x 轴为 0）。
    pub ownship_heading: f64,
    /// 每段航线左右偏转的角度。
    pub zigzag_angle: f64,
    /// 每段航线包含的采样数，0 表示直线航行。
    pub samples_per_leg: usize,
    pub bearing_noise_std: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            model: TrajectoryModel::Polynomial { numvars: 4 },
            true_theta: vec![30000.0, 30000.0, 7.0, 6.0],
            num_samples: 200,
            sampling_time: 2.0,
            ownship_start: (0.0, 0.0),
            ownship_speed: 8.0,
            ownship_heading: 0.0,
            zigzag_angle: std::f64::consts::FRAC_PI_4,
            samples_per_leg: 50,
            bearing_noise_std: 0.0,
        }
    }
}

/// 生成模拟方位观测。
///
/// 第 i 个样本（从 0 开始）的时间为 `(i + 1) * sampling_time`，
/// 本舰在两次采样之间以恒定速度沿当前航段航向移动。
///
/// # 参数
/// * `config` - 场景参数。
/// * `seed` - 噪声随机数种子。
///
/// # 返回值
/// 一个元组，包含：
/// * `ParameterVector` - 目标真实参数。
/// * `ObservationSet` - 带噪声的观测集合。
pub fn generate_scenario(
    config: &ScenarioConfig,
    seed: u64,
) -> Result<(ParameterVector, ObservationSet), BotmaError> {
    if config.true_theta.len() != config.model.dimensions() {
        return Err(BotmaError::DimensionMismatch {
            expected: config.model.dimensions(),
            found: config.true_theta.len(),
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, config.bearing_noise_std)?;

    let mut ownship = Point2::new(config.ownship_start.0, config.ownship_start.1);
    let mut records = Vec::with_capacity(config.num_samples);

    for i in 0..config.num_samples {
        let heading = leg_heading(config, i);
        let step = config.ownship_speed * config.sampling_time;
        ownship += Vector2::new(heading.cos(), heading.sin()) * step;

        let t = (i + 1) as f64 * config.sampling_time;
        let true_bearing = config
            .model
            .predict_bearing(&config.true_theta, t, ownship.x, ownship.y);
        let measured = true_bearing + noise.sample(&mut rng);

        records.push(Observation::new(t, ownship.x, ownship.y, measured));
    }

    let observations = ObservationSet::new(records)?;
    Ok((config.true_theta.clone(), observations))
}

fn leg_heading(config: &ScenarioConfig, sample: usize) -> f64 {
    if config.samples_per_leg == 0 {
        return config.ownship_heading;
    }
    // 偶数段向左偏，奇数段向右偏
    if (sample / config.samples_per_leg) % 2 == 0 {
        config.ownship_heading + config.zigzag_angle
    } else {
        config.ownship_heading - config.zigzag_angle
    }
}
