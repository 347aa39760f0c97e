/// Streaming autocorrelation accumulator using a ring buffer.
///
/// Computes the normalized autocorrelation function Γ(δ) of a scalar time
/// series without storing the full history. Memory is O(max_lag).
#[derive(Debug, Clone)]
pub struct AutocorrAccum {
    max_lag: usize,
    /// Most recent `max_lag` values.
    ring: Vec<f64>,
    sum_o: f64,
    sum_o2: f64,
    /// Running sum of o(t)·o(t−δ), length `max_lag + 1`.
    sum_prod: Vec<f64>,
    n_recorded: usize,
    ring_pos: usize,
}

impl AutocorrAccum {
    pub fn new(max_lag: usize) -> Self {
        let max_lag = max_lag.max(1);
        Self {
            max_lag,
            ring: vec![0.0; max_lag],
            sum_o: 0.0,
            sum_o2: 0.0,
            sum_prod: vec![0.0; max_lag + 1],
            n_recorded: 0,
            ring_pos: 0,
        }
    }

    pub fn push(&mut self, o: f64) {
        let ml = self.max_lag;
        let pos = self.ring_pos;
        self.sum_o += o;
        self.sum_o2 += o * o;
        self.sum_prod[0] += o * o;

        // ring[pos - δ] holds o(t - δ) for δ in 1..=min(n_recorded, ml)
        let n_back = self.n_recorded.min(ml);
        for delta in 1..=n_back {
            let idx = (pos + ml - delta) % ml;
            self.sum_prod[delta] += o * self.ring[idx];
        }

        self.ring[pos] = o;
        self.n_recorded += 1;
        self.ring_pos = (pos + 1) % ml;
    }

    /// Γ(δ) for δ in `0..=max_lag`; Γ(0) = 1.
    pub fn finish(&self) -> Vec<f64> {
        let m = self.n_recorded as f64;
        let mean = if self.n_recorded > 0 { self.sum_o / m } else { 0.0 };
        let var = if self.n_recorded > 0 {
            self.sum_o2 / m - mean * mean
        } else {
            0.0
        };
        (0..=self.max_lag)
            .map(|delta| {
                let count = self.n_recorded.saturating_sub(delta) as f64;
                if count <= 0.0 || var <= 0.0 {
                    return if delta == 0 { 1.0 } else { 0.0 };
                }
                (self.sum_prod[delta] / count - mean * mean) / var
            })
            .collect()
    }
}

/// Integrated autocorrelation time with Sokal's automatic window (c = 5).
pub fn sokal_tau(gamma: &[f64]) -> f64 {
    let mut tau = 0.5;
    for (w, &g) in gamma.iter().enumerate().skip(1) {
        tau += g;
        if w as f64 >= 5.0 * tau {
            return tau;
        }
    }
    tau
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternating_series() {
        let mut acc = AutocorrAccum::new(3);
        for t in 0..1000 {
            acc.push(if t % 2 == 0 { 1.0 } else { -1.0 });
        }
        let g = acc.finish();
        assert!((g[0] - 1.0).abs() < 1e-9);
        assert!((g[1] + 1.0).abs() < 1e-2);
        assert!((g[2] - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_constant_series_is_degenerate() {
        let mut acc = AutocorrAccum::new(4);
        for _ in 0..10 {
            acc.push(0.25);
        }
        assert_eq!(acc.finish(), vec![1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_sokal_tau_uncorrelated() {
        let gamma = [1.0, 0.0, 0.0, 0.0];
        assert_eq!(sokal_tau(&gamma), 0.5);
    }
}
