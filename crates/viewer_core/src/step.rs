/// Bounds for the control magnitude applied per accepted keypress.
pub const STEP_MIN: u8 = 1;
pub const STEP_MAX: u8 = 10;

/// Boundary-violation texts shown to the operator, verbatim from the
/// backend contract.
pub const UPPER_BOUND_MESSAGE: &str = "The value cannot exceed 10.";
pub const LOWER_BOUND_MESSAGE: &str = "The value cannot be less than 1.";

/// Bounded integer control magnitude in [1, 10].
///
/// A boundary hit clamps the value and sets the matching message. A
/// later successful move in either direction leaves a stale message in
/// place; only `reset` or the opposite boundary overwrites it.
#[derive(Debug, Clone)]
pub struct StepController {
    value: u8,
    boundary_message: String,
}

impl Default for StepController {
    fn default() -> Self {
        Self::new()
    }
}

impl StepController {
    pub fn new() -> Self {
        Self {
            value: STEP_MIN,
            boundary_message: String::new(),
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn boundary_message(&self) -> &str {
        &self.boundary_message
    }

    pub fn increase(&mut self) {
        if self.value < STEP_MAX {
            self.value += 1;
        } else {
            self.boundary_message = UPPER_BOUND_MESSAGE.to_string();
        }
    }

    pub fn decrease(&mut self) {
        if self.value > STEP_MIN {
            self.value -= 1;
        } else {
            self.boundary_message = LOWER_BOUND_MESSAGE.to_string();
        }
    }

    pub fn reset(&mut self) {
        self.value = STEP_MIN;
        self.boundary_message.clear();
    }
}

#[cfg(test)]
#[path = "tests/step_tests.rs"]
mod tests;
