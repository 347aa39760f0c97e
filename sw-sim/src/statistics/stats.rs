/// Running mean of `value^power` over a scalar time series.
#[derive(Debug, Clone)]
pub struct Statistics {
    pub count: usize,
    pub aggregate: f64,
    pub power: i32,
}

impl Statistics {
    pub fn new(power: i32) -> Self {
        Self {
            count: 0,
            aggregate: 0.0,
            power,
        }
    }

    #[inline]
    pub fn update(&mut self, value: f64) {
        self.count += 1;
        self.aggregate += if self.power == 1 {
            value
        } else {
            value.powi(self.power)
        };
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return self.aggregate;
        }
        self.aggregate / self.count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_powers() {
        let mut s1 = Statistics::new(1);
        let mut s2 = Statistics::new(2);
        for v in [1.0, 2.0, 3.0] {
            s1.update(v);
            s2.update(v);
        }
        assert_eq!(s1.average(), 2.0);
        assert!((s2.average() - 14.0 / 3.0).abs() < 1e-12);
        assert_eq!(Statistics::new(4).average(), 0.0);
    }
}
