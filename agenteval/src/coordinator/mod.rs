//! Drives one evaluation run from creation through completion
//! (spec §4.5 "RunCoordinator"): allocates the run, executes its test
//! cases in order against [`crate::evaluator::TestCaseEvaluator`], tracks
//! rate-limit hits and regressions, and reacts to cancellation.
//!
//! `start_run` validates inputs, persists a `Pending` run, then hands
//! execution off to a spawned task so the caller gets an `eval_id` back
//! immediately — the run's live status is always readable from the store,
//! the way the teacher's graph executor separates "submit" from "drive to
//! completion".

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::EngineConfig;
use crate::dispatcher::AgentClient;
use crate::error::{EvalError, StoreError};
use crate::evaluator::TestCaseEvaluator;
use crate::judge::JudgeClient;
use crate::model::{EvaluationRun, Regression, RunStatus, StatusHistoryEntry, TestCase};
use crate::retry::{RetryEvent, RetrySource};
use crate::store::SqliteStore;

#[derive(Clone)]
pub struct RunCoordinator {
    store: Arc<SqliteStore>,
    agent_client: Arc<dyn AgentClient>,
    judge_client: Arc<dyn JudgeClient>,
    default_timeout_secs: u64,
    verbose_logging: bool,
    cancel_tokens: Arc<Mutex<HashMap<String, CancellationToken>>>,
}

impl RunCoordinator {
    pub fn new(
        store: Arc<SqliteStore>,
        agent_client: Arc<dyn AgentClient>,
        judge_client: Arc<dyn JudgeClient>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store,
            agent_client,
            judge_client,
            default_timeout_secs: config.run_default_timeout_secs,
            verbose_logging: config.run_verbose_logging,
            cancel_tokens: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Validates the agent/dataset/judge-config triple, persists a
    /// `Pending` run, and spawns the execution loop. Returns the new
    /// run's id; the run's live status is read back via
    /// [`crate::store::SqliteStore::get_run`].
    pub async fn start_run(
        &self,
        agent_id: &str,
        dataset_id: &str,
        timeout_override: Option<u64>,
    ) -> Result<String, EvalError> {
        let agent = self.store.get_agent(agent_id).await?;
        let prompt_version = self
            .store
            .get_active_prompt_version(agent_id)
            .await?
            .ok_or_else(|| EvalError::Store(StoreError::NotFound(format!("agent '{agent_id}' has no active prompt version"))))?;
        let dataset = self.store.get_dataset(dataset_id).await?;
        let testcases = self.store.list_testcases_by_dataset(&dataset.dataset_id).await?;
        let judge_config = self
            .store
            .get_active_judge_config()
            .await?
            .ok_or_else(|| EvalError::Store(StoreError::NotFound("no active judge config".to_string())))?;

        let timeout_secs = timeout_override.unwrap_or(self.default_timeout_secs);
        let mut run = EvaluationRun::new(
            dataset.dataset_id.clone(),
            agent.agent_id.clone(),
            prompt_version.version,
            judge_config.judge_config_id.clone(),
            judge_config.version,
            agent.endpoint_url.clone(),
            timeout_secs,
            testcases.len(),
        );
        if testcases.is_empty() {
            run.warnings.push("dataset has no test cases".to_string());
        }
        self.store.put_run(&run).await?;

        let eval_id = run.eval_id.clone();
        let cancel = CancellationToken::new();
        self.cancel_tokens.lock().unwrap().insert(eval_id.clone(), cancel.clone());

        let coordinator = self.clone();
        let eval_id_for_task = eval_id.clone();
        tokio::spawn(async move {
            coordinator.execute(run, testcases, timeout_secs, cancel).await;
            coordinator.cancel_tokens.lock().unwrap().remove(&eval_id_for_task);
        });

        Ok(eval_id)
    }

    async fn execute(&self, mut run: EvaluationRun, testcases: Vec<TestCase>, timeout_secs: u64, cancel: CancellationToken) {
        run.status = RunStatus::Running;
        run.started_at = Some(chrono::Utc::now());
        run.status_history.push(StatusHistoryEntry::plain("run started"));
        if let Err(err) = self.store.put_run(&run).await {
            error!(eval_id = %run.eval_id, error = %err, "failed to persist run start");
            return;
        }

        let last_completed = self
            .store
            .last_completed_run(&run.agent_id, &run.dataset_id)
            .await
            .unwrap_or(None);

        let evaluator = TestCaseEvaluator {
            agent_client: &*self.agent_client,
            judge_client: &*self.judge_client,
            verbose_logging: self.verbose_logging,
        };

        let judge_config = match self.store.get_judge_config(&run.judge_config_id, run.judge_config_version).await {
            Ok(cfg) => cfg,
            Err(err) => {
                error!(eval_id = %run.eval_id, error = %err, "could not reload judge config for run");
                self.mark_failed(&mut run, err.to_string()).await;
                return;
            }
        };

        let total = testcases.len();
        let mut cancelled = false;
        for (index, testcase) in testcases.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let outcome = evaluator
                .evaluate(testcase, &run.agent_endpoint_url, &judge_config, Duration::from_secs(timeout_secs), &cancel)
                .await;

            for event in &outcome.retry_events {
                run.rate_limit_hits += 1;
                run.retry_wait_seconds += event.wait_seconds;
                run.status_history.push(StatusHistoryEntry::rate_limit(
                    event.attempt,
                    event.wait_seconds,
                    rate_limit_message(event),
                ));
            }

            for mut cost in outcome.cost_records {
                cost.evaluation_id = Some(run.eval_id.clone());
                cost.agent_id = Some(run.agent_id.clone());
                if let Err(err) = self.store.put_cost_record(&cost).await {
                    warn!(eval_id = %run.eval_id, error = %err, "failed to persist cost record");
                }
            }

            run.completed_tests += 1;
            if outcome.result.passed {
                run.passed_count += 1;
            } else {
                run.failed_tests += 1;
            }

            if let Some(regression) = detect_regression(&last_completed, testcase, &outcome.result) {
                warn!(eval_id = %run.eval_id, testcase_id = %testcase.tc_id, "regression detected");
                run.regressions.push(regression);
            }

            run.test_cases.push(outcome.result);
            run.status_message = progress_message(index + 1, total, run.test_cases.last().map(|r| r.passed).unwrap_or(false));

            if let Err(err) = self.store.put_run(&run).await {
                error!(eval_id = %run.eval_id, error = %err, "failed to persist run progress");
                return;
            }
        }

        if run.rate_limit_hits > 0 {
            run.warnings.push(format!(
                "{} rate-limit retr{} totalling {:.1}s of backoff",
                run.rate_limit_hits,
                if run.rate_limit_hits == 1 { "y" } else { "ies" },
                run.retry_wait_seconds
            ));
        }

        if cancelled {
            run.status = RunStatus::Cancelled;
            run.status_history.push(StatusHistoryEntry::plain("run cancelled"));
        } else {
            run.status = RunStatus::Completed;
            run.status_history.push(StatusHistoryEntry::plain("run completed"));
        }
        run.completed_at = Some(chrono::Utc::now());
        if let Err(err) = self.store.put_run(&run).await {
            error!(eval_id = %run.eval_id, error = %err, "failed to persist final run status");
            return;
        }
        info!(eval_id = %run.eval_id, passed = run.passed_count, failed = run.failed_tests, "run finished");
    }

    async fn mark_failed(&self, run: &mut EvaluationRun, message: String) {
        run.status = RunStatus::Failed;
        run.status_message = message.clone();
        run.status_history.push(StatusHistoryEntry::plain(message));
        run.completed_at = Some(chrono::Utc::now());
        let _ = self.store.put_run(run).await;
    }

    /// Signals cooperative cancellation for an in-flight run. A no-op
    /// (returns `NotFound`) once the run has already reached a terminal
    /// state and its token has been dropped.
    pub async fn cancel_run(&self, eval_id: &str) -> Result<(), EvalError> {
        let token = self.cancel_tokens.lock().unwrap().get(eval_id).cloned();
        match token {
            Some(t) => {
                t.cancel();
                Ok(())
            }
            None => Err(EvalError::Store(StoreError::NotFound(format!("no active run '{eval_id}' to cancel")))),
        }
    }
}

fn rate_limit_message(event: &RetryEvent) -> String {
    let source = match event.source {
        RetrySource::Agent => "agent",
        RetrySource::Judge => "judge",
    };
    format!(
        "{source} rate limited, retry attempt {} after {:.1}s",
        event.attempt, event.wait_seconds
    )
}

/// Human-readable progress line set on `status_message` after each test
/// case (spec §4.5: `"case X/Y: passed; Z% complete"`).
fn progress_message(completed: usize, total: usize, last_passed: bool) -> String {
    let percent = if total == 0 { 100 } else { (completed * 100) / total };
    let outcome = if last_passed { "passed" } else { "failed" };
    format!("case {completed}/{total}: {outcome}; {percent}% complete")
}

fn detect_regression(
    last_completed: &Option<EvaluationRun>,
    testcase: &TestCase,
    result: &crate::model::TestCaseResult,
) -> Option<Regression> {
    let previous = last_completed.as_ref()?.test_cases.iter().find(|t| t.testcase_id == testcase.tc_id)?;
    if previous.passed && !result.passed {
        Some(Regression {
            testcase_id: testcase.tc_id.clone(),
            previous_result: "passed".to_string(),
            current_result: "failed".to_string(),
        })
    } else {
        None
    }
}
