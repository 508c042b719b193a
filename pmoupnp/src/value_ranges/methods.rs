use crate::{value_ranges::ValueRange, variable_types::StateValueError};

impl ValueRange {
    pub fn new(min: i64, max: i64) -> Result<Self, StateValueError> {
        // Vérifier que min <= max
        if min > max {
            return Err(StateValueError::RangeError(
                "Minimum cannot be greater than maximum".to_string(),
            ));
        }

        Ok(Self {
            min,
            max,
            step: None,
        })
    }

    pub fn with_step(mut self, step: i64) -> Result<Self, StateValueError> {
        if step <= 0 {
            return Err(StateValueError::RangeError(format!(
                "Step must be strictly positive, got {}",
                step
            )));
        }
        self.step = Some(step);
        Ok(self)
    }

    pub fn get_minimum(&self) -> i64 {
        self.min
    }

    pub fn get_maximum(&self) -> i64 {
        self.max
    }

    pub fn get_step(&self) -> Option<i64> {
        self.step
    }

    pub fn is_in_range(&self, value: i64) -> bool {
        if value < self.min || value > self.max {
            return false;
        }
        match self.step {
            Some(step) => (value - self.min) % step == 0,
            None => true,
        }
    }
}
