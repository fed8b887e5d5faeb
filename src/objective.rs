// src/objective.rs

use crate::observation::ObservationSet;
use crate::trajectory_model::TrajectoryModel;

/// 方位残差平方和目标函数，值越小表示参数越能解释观测。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectiveFunction {
    model: TrajectoryModel,
}

impl ObjectiveFunction {
    pub fn new(model: TrajectoryModel) -> Self {
        ObjectiveFunction { model }
    }

    pub fn model(&self) -> TrajectoryModel {
        self.model
    }

    pub fn dimensions(&self) -> usize {
        self.model.dimensions()
    }

    /// 计算 `Σ (measure_i - h_i)²`。
    ///
    /// 不加权、不按样本数归一化，也不提前退出；残差不做 2π 折返。
    ///
    /// # 参数
    /// * `theta` - 候选参数向量，长度等于模型维数。
    /// * `observations` - 观测集合。
    ///
    /// # 返回值
    /// 非负的适应度值。
    pub fn evaluate(&self, theta: &[f64], observations: &ObservationSet) -> f64 {
        observations
            .iter()
            .map(|obs| {
                let diff = obs.bearing - self.model.predict_observation(theta, obs);
                diff * diff
            })
            .sum()
    }

    /// 逐样本残差 `measure_i - h_i`，用于诊断输出。
    pub fn residuals(&self, theta: &[f64], observations: &ObservationSet) -> Vec<f64> {
        observations
            .iter()
            .map(|obs| obs.bearing - self.model.predict_observation(theta, obs))
            .collect()
    }
}
