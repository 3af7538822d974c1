//! Concurrent runs of several test cases
//!
//! Each test case gets its own task and its own execution; only the step
//! runner, the progress sink and the cancellation token are shared.

use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use stepwise_common::{Execution, ExecutionSettings, TestCase};

use crate::error::{EngineError, EngineResult};
use crate::orchestrator::Orchestrator;
use crate::progress::ProgressSink;

/// Run every test case concurrently, returning outcomes in input order.
pub async fn run_many(
    orchestrator: &Orchestrator,
    test_cases: Vec<TestCase>,
    settings: &ExecutionSettings,
    executed_by: &str,
    sink: Arc<dyn ProgressSink>,
    cancel: &CancellationToken,
) -> Vec<EngineResult<Execution>> {
    info!("Running {} test case(s)...", test_cases.len());

    let handles: Vec<_> = test_cases
        .into_iter()
        .map(|test_case| {
            let orchestrator = orchestrator.clone();
            let settings = settings.clone();
            let executed_by = executed_by.to_string();
            let sink = sink.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                orchestrator
                    .run_with_cancel(&test_case, &settings, &executed_by, sink.as_ref(), &cancel)
                    .await
            })
        })
        .collect();

    join_all(handles)
        .await
        .into_iter()
        .map(|joined| match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Execution task failed: {}", e);
                Err(EngineError::Task(e.to_string()))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopSink;
    use crate::runner::{ScriptedOutcome, ScriptedRunner};
    use stepwise_common::{ExecutionStatus, Step};

    #[tokio::test]
    async fn test_run_many_keeps_input_order() {
        let runner = Arc::new(
            ScriptedRunner::new().always("b1", ScriptedOutcome::Fail("wrong".into())),
        );
        let orchestrator = Orchestrator::new(runner.clone());
        let cases = vec![
            TestCase::new("a", "Alpha", vec![Step::new("a1", 1, "Open", "Opened")]),
            TestCase::new("b", "Beta", vec![Step::new("b1", 1, "Open", "Opened")]),
            TestCase::new(
                "c",
                "Gamma",
                vec![Step::new("c1", 1, "x", "y"), Step::new("c2", 1, "x", "y")],
            ),
        ];
        let settings = ExecutionSettings {
            retry_delay_ms: 0,
            ..Default::default()
        };

        let outcomes = run_many(
            &orchestrator,
            cases,
            &settings,
            "qa",
            Arc::new(NoopSink),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(outcomes.len(), 3);
        let alpha = outcomes[0].as_ref().unwrap();
        assert_eq!(alpha.test_case_id, "a");
        assert_eq!(alpha.status, ExecutionStatus::Completed);
        let beta = outcomes[1].as_ref().unwrap();
        assert_eq!(beta.status, ExecutionStatus::Failed);
        // duplicate step order is rejected without affecting the others
        assert!(matches!(&outcomes[2], Err(e) if e.is_config()));
        assert_eq!(runner.invocations("c1"), 0);
    }
}
