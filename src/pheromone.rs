// src/pheromone.rs

/// 每个维度一个标量信息素，初始为 1.0，每轮先挥发再沉积。
///
/// 沉积量由本轮所有蚂蚁的适应度统一决定，与采样值无关，
/// 因此每个维度每轮获得相同的沉积总量。
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneState {
    levels: Vec<f64>,
}

impl PheromoneState {
    pub fn new(dimensions: usize) -> Self {
        PheromoneState {
            levels: vec![1.0; dimensions],
        }
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn level(&self, dim: usize) -> f64 {
        self.levels[dim]
    }

    /// `level[d] <- level[d] * (1 - evaporation_rate) + Σ 1 / (1 + fitness_ant)`
    ///
    /// 各蚂蚁的贡献按蚂蚁顺序逐个累加。非有限的适应度不贡献信息素。
    ///
    /// # 参数
    /// * `fitness` - 本轮全部蚂蚁的适应度。
    /// * `evaporation_rate` - 挥发率，调用方保证位于 [0, 1)。
    pub fn evaporate_and_deposit(&mut self, fitness: &[f64], evaporation_rate: f64) {
        debug_assert!((0.0..1.0).contains(&evaporation_rate));
        let retain = 1.0 - evaporation_rate;
        for level in self.levels.iter_mut() {
            let mut updated = *level * retain;
            for &f in fitness {
                if f.is_finite() {
                    updated += 1.0 / (1.0 + f);
                }
            }
            *level = updated;
        }
    }

    /// 按信息素偏置单位随机数：`u^(1 / (1 + level))`。
    ///
    /// 信息素越高指数越小，对 [0, 1) 内的 `u` 结果越靠近 1。
    #[inline]
    pub fn bias(&self, dim: usize, u: f64) -> f64 {
        u.powf(1.0 / (1.0 + self.levels[dim]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initial_levels() {
        let state = PheromoneState::new(4);
        assert_eq!(state.levels(), &[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_evaporate_and_deposit() {
        let mut state = PheromoneState::new(2);
        state.evaporate_and_deposit(&[0.0, 1.0, 3.0], 0.1);
        let expected = 0.9 + 1.0 + 0.5 + 0.25;
        for &l in state.levels() {
            assert_relative_eq!(l, expected);
        }
    }

    #[test]
    fn test_all_dimensions_receive_same_deposit() {
        let mut state = PheromoneState::new(6);
        for round in 0..20 {
            let fitness: Vec<f64> = (0..10).map(|a| (a * round) as f64 * 0.37).collect();
            state.evaporate_and_deposit(&fitness, 0.25);
        }
        let first = state.level(0);
        assert!(state.levels().iter().all(|&l| l == first));
    }

    #[test]
    fn test_levels_stay_non_negative() {
        let mut state = PheromoneState::new(3);
        for _ in 0..100 {
            state.evaporate_and_deposit(&[f64::INFINITY, 1e300, f64::NAN], 0.999);
            assert!(state.levels().iter().all(|&l| l >= 0.0 && l.is_finite()));
        }
    }

    #[test]
    fn test_bias_moves_towards_one() {
        let mut state = PheromoneState::new(1);
        assert_relative_eq!(state.bias(0, 0.25), 0.5);
        state.evaporate_and_deposit(&[0.0; 5], 0.0);
        assert!(state.bias(0, 0.25) > 0.5);
        assert_eq!(state.bias(0, 0.0), 0.0);
    }
}
