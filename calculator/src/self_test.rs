//! Build-time conformance check against a plugin's bundled fixtures.

use tracing::{debug, instrument};

use crate::core::fixture::{Expected, ExpectedFailure, Fixture, compare_outputs};
use crate::error::{ExecuteError, SelfTestFailure};
use crate::executor::AlgorithmExecutor;

/// Replay every fixture through `executor`; the first mismatch fails.
///
/// Fixtures go through the same binding, worker and output ordering as live
/// requests, so an admitted algorithm reproduces its fixtures via `execute`.
#[instrument(skip_all, fields(algorithm = executor.name(), fixtures = fixtures.len()))]
pub fn run_self_tests(
    executor: &AlgorithmExecutor,
    fixtures: &[Fixture],
) -> Result<(), SelfTestFailure> {
    for (index, fixture) in fixtures.iter().enumerate() {
        let result = executor.execute(fixture.parameters.clone());
        match (&fixture.expected, result) {
            (Expected::Outputs(expected), Ok(actual)) => {
                compare_outputs(executor.definition(), expected, &actual)
                    .map_err(|reason| SelfTestFailure::Mismatch { index, reason })?;
            }
            (Expected::Error(kind), Err(err)) if failure_kind(&err) == Some(*kind) => {
                debug!(index, %err, "fixture failed as expected");
            }
            (Expected::Error(kind), Ok(_)) => {
                return Err(SelfTestFailure::Mismatch {
                    index,
                    reason: format!("expected {kind} error, but execution succeeded"),
                });
            }
            (_, Err(source)) => return Err(SelfTestFailure::Call { index, source }),
        }
    }
    Ok(())
}

fn failure_kind(err: &ExecuteError) -> Option<ExpectedFailure> {
    match err {
        ExecuteError::Validation { .. } => Some(ExpectedFailure::Validation),
        ExecuteError::Execution { .. } => Some(ExpectedFailure::Execution),
        ExecuteError::NotFound { .. } | ExecuteError::Timeout { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::algorithms::EntryTable;
    use crate::core::value::{DataElement, Value};
    use crate::io::function_loader::bind_entry;
    use crate::test_support::{InlineWorker, matrix_sub_definition};

    fn executor() -> AlgorithmExecutor {
        let definition = matrix_sub_definition();
        let function =
            bind_entry("matrix_sub", &definition, &EntryTable::builtin()).expect("bind");
        AlgorithmExecutor::new(
            definition,
            function,
            Duration::from_secs(1),
            Arc::new(InlineWorker),
        )
    }

    fn fixture(n: Vec<Vec<f64>>, m: Vec<Vec<f64>>, expected: Expected) -> Fixture {
        Fixture {
            parameters: vec![
                DataElement::new("n", Value::number_matrix(n)),
                DataElement::new("m", Value::number_matrix(m)),
            ],
            expected,
        }
    }

    fn result(rows: Vec<Vec<f64>>) -> Expected {
        Expected::Outputs(vec![DataElement::new("result", Value::number_matrix(rows))])
    }

    #[test]
    fn passing_fixtures_admit_the_algorithm() {
        let fixtures = vec![
            fixture(
                vec![vec![1.0, 2.0, 3.0], vec![2.0, 3.0, 4.0]],
                vec![vec![0.0, 2.0, 2.0], vec![2.0, 1.0, 4.0]],
                result(vec![vec![1.0, 0.0, 1.0], vec![0.0, 2.0, 0.0]]),
            ),
            fixture(
                vec![vec![1.0]],
                vec![vec![1.0], vec![2.0]],
                Expected::Error(ExpectedFailure::Validation),
            ),
        ];
        run_self_tests(&executor(), &fixtures).expect("self-test");
    }

    #[test]
    fn wrong_expected_output_is_a_mismatch() {
        let fixtures = vec![fixture(
            vec![vec![3.0]],
            vec![vec![1.0]],
            result(vec![vec![4.0]]),
        )];
        let err = run_self_tests(&executor(), &fixtures).unwrap_err();
        assert_eq!(
            err.to_string(),
            "fixture 0: output 'result': expected [[4.0]], got [[2.0]]"
        );
    }

    #[test]
    fn unexpected_success_is_a_mismatch() {
        let fixtures = vec![fixture(
            vec![vec![3.0]],
            vec![vec![1.0]],
            Expected::Error(ExpectedFailure::Validation),
        )];
        let err = run_self_tests(&executor(), &fixtures).unwrap_err();
        assert!(matches!(err, SelfTestFailure::Mismatch { index: 0, .. }));
    }

    #[test]
    fn unexpected_error_is_reported_with_cause() {
        let fixtures = vec![
            fixture(vec![vec![3.0]], vec![vec![1.0]], result(vec![vec![2.0]])),
            fixture(vec![vec![1.0]], vec![vec![1.0], vec![2.0]], result(vec![vec![0.0]])),
        ];
        let err = run_self_tests(&executor(), &fixtures).unwrap_err();
        assert!(matches!(
            err,
            SelfTestFailure::Call {
                index: 1,
                source: ExecuteError::Validation { .. }
            }
        ));
    }
}
