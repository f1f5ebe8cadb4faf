//! Prime counting by trial division.
//!
//! Deliberately unsieved: memory stays constant and large limits simply take
//! long, which the executor's deadline handles.

use crate::algorithms::{Function, FunctionError, number_argument};
use crate::core::binding::{Arguments, Values};
use crate::core::value::Value;

/// Largest limit representable exactly as an `f64`.
const MAX_LIMIT: f64 = 9_007_199_254_740_992.0;

/// `count = π(n)`, the number of primes `<= n`.
pub struct PrimeCount;

impl Function for PrimeCount {
    fn parameters(&self) -> &[&str] {
        &["n"]
    }

    fn outputs(&self) -> &[&str] {
        &["count"]
    }

    fn call(&self, args: &Arguments) -> Result<Values, FunctionError> {
        let n = number_argument(args, "n")?;
        if n < 0.0 || n.fract() != 0.0 || n > MAX_LIMIT {
            return Err(FunctionError::Invalid(format!(
                "n must be a non-negative integer no larger than 2^53, got {n}"
            )));
        }
        // Exact: n is a non-negative integer below 2^53.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let limit = n as u64;
        #[allow(clippy::cast_precision_loss)]
        let count = count_primes(limit) as f64;
        Ok(Values::from([("count".to_string(), Value::Number(count))]))
    }
}

fn count_primes(limit: u64) -> u64 {
    if limit < 2 {
        return 0;
    }
    let mut count = 1;
    let mut candidate = 3;
    while candidate <= limit {
        if is_odd_prime(candidate) {
            count += 1;
        }
        candidate += 2;
    }
    count
}

fn is_odd_prime(n: u64) -> bool {
    let mut divisor = 3;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}
