// src/trajectory_model.rs

use nalgebra::{Point2, Vector2};

use crate::botma_errors::BotmaError;
use crate::observation::Observation;

/// 运动学模型固定使用的参数个数 `(x0, y0, vx, vy, ax, ay)`。
pub const KINEMATIC_DIMENSIONS: usize = 6;

/// 目标轨迹模型：把参数向量映射为任意时刻的目标位置。
///
/// * `Polynomial` - 截断泰勒展开，参数按 (x, y) 成对排列，第 k 阶系数乘以 `t^k / k!`。
/// * `Kinematic` - 固定二阶运动学闭式解，不含循环。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrajectoryModel {
    Polynomial { numvars: usize },
    Kinematic,
}

impl TrajectoryModel {
    /// 构造多项式模型，`numvars` 只能是 4、6 或 8。
    pub fn polynomial(numvars: usize) -> Result<Self, BotmaError> {
        match numvars {
            4 | 6 | 8 => Ok(TrajectoryModel::Polynomial { numvars }),
            other => Err(BotmaError::UnsupportedNumVars(other)),
        }
    }

    /// 参数向量的维数 D。
    pub fn dimensions(&self) -> usize {
        match *self {
            TrajectoryModel::Polynomial { numvars } => numvars,
            TrajectoryModel::Kinematic => KINEMATIC_DIMENSIONS,
        }
    }

    /// 计算参数向量 `theta` 在时刻 `t` 给出的目标位置。
    pub fn position_at(&self, theta: &[f64], t: f64) -> Point2<f64> {
        debug_assert_eq!(theta.len(), self.dimensions());
        match *self {
            TrajectoryModel::Polynomial { numvars } => {
                let mut x = 0.0;
                let mut y = 0.0;
                let mut pow = 1.0;
                let mut fact = 1.0;
                let mut order = 1.0;
                for pair in theta[..numvars].chunks_exact(2) {
                    let gamma = pow / fact;
                    x += pair[0] * gamma;
                    y += pair[1] * gamma;
                    pow *= t;
                    fact *= order;
                    order += 1.0;
                }
                Point2::new(x, y)
            }
            TrajectoryModel::Kinematic => Point2::new(
                theta[0] + t * theta[2] + t * t * theta[4] / 2.0,
                theta[1] + t * theta[3] + t * t * theta[5] / 2.0,
            ),
        }
    }

    /// 预测从本舰 `(ox, oy)` 看向目标的方位角，取值范围 (-π, π]。
    ///
    /// 目标与本舰重合时方位定义为 0，而不是 `atan2` 对带符号零给出的 ±π。
    pub fn predict_bearing(&self, theta: &[f64], t: f64, ox: f64, oy: f64) -> f64 {
        let target = self.position_at(theta, t);
        bearing_between(&Point2::new(ox, oy), &target)
    }

    pub fn predict_observation(&self, theta: &[f64], obs: &Observation) -> f64 {
        self.predict_bearing(theta, obs.t, obs.ox, obs.oy)
    }
}

/// 从 `from` 指向 `to` 的方位角（弧度）。
pub fn bearing_between(from: &Point2<f64>, to: &Point2<f64>) -> f64 {
    let rel: Vector2<f64> = to - from;
    if rel.x == 0.0 && rel.y == 0.0 {
        return 0.0;
    }
    rel.y.atan2(rel.x)
}
