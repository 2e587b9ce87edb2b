//! Synthesizes candidate prompt edits from accumulated annotations, and
//! applies an accepted proposal as a new active prompt version
//! (spec §4.6 "ProposalGenerator").
//!
//! Grouping, context-block construction, and apply-as-diff are grounded
//! in `original_source/src/api/sqlite_service.py`'s proposal pipeline;
//! the judge call reuses [`crate::judge::JudgeClient`], the same
//! collaborator [`crate::evaluator`] grades test cases with.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::error::ProposalError;
use crate::judge::{render, JudgeClient};
use crate::model::{
    CallType, CostRecord, Priority, PromptDiff, PromptProposal, PromptVersion, ProposalCategory,
    ProposalStatus, RunAnnotation, RunStatus, TestCase,
};
use crate::store::SqliteStore;

/// Minimum occurrences of an issue tag before it becomes a proposal
/// (spec §4.6 step 2: "implementer choice, e.g. 2").
const TAG_THRESHOLD: usize = 2;

pub struct ProposalGenerator {
    store: Arc<SqliteStore>,
    judge_client: Arc<dyn JudgeClient>,
    judge_model: String,
}

#[derive(Deserialize, Default)]
struct ProposalPayload {
    #[serde(default)]
    title: String,
    #[serde(default = "default_category")]
    category: ProposalCategory,
    #[serde(default)]
    confidence: f64,
    #[serde(default = "default_priority")]
    priority: Priority,
    #[serde(default)]
    pattern_source: String,
    #[serde(default)]
    impact: String,
    #[serde(default)]
    diff: PromptDiff,
    #[serde(default)]
    reasoning: String,
}

fn default_category() -> ProposalCategory {
    ProposalCategory::Quality
}

fn default_priority() -> Priority {
    Priority::Medium
}

impl ProposalGenerator {
    pub fn new(store: Arc<SqliteStore>, judge_client: Arc<dyn JudgeClient>, judge_model: impl Into<String>) -> Self {
        Self {
            store,
            judge_client,
            judge_model: judge_model.into(),
        }
    }

    /// Generates zero or more pending proposals for `agent_id`, grouped
    /// by issue tag, from every completed run's annotations (spec §4.6).
    pub async fn generate_for_agent(&self, agent_id: &str, prompt_version: Option<u32>) -> Result<Vec<PromptProposal>, ProposalError> {
        let active_version = match prompt_version {
            Some(v) => self.store.get_prompt_version(agent_id, v).await?,
            None => self
                .store
                .get_active_prompt_version(agent_id)
                .await?
                .ok_or(ProposalError::NoAnnotations)?,
        };

        let runs: Vec<_> = self
            .store
            .list_runs_by_agent(agent_id)
            .await?
            .into_iter()
            .filter(|r| r.status == RunStatus::Completed)
            .collect();
        let total_runs = runs.len();
        let eval_ids: Vec<String> = runs.iter().map(|r| r.eval_id.clone()).collect();
        let annotations = self.store.list_run_annotations_for_evals(&eval_ids).await?;

        let mut testcase_by_id: HashMap<String, TestCase> = HashMap::new();
        let dataset_ids: HashSet<String> = runs.iter().map(|r| r.dataset_id.clone()).collect();
        for dataset_id in &dataset_ids {
            for tc in self.store.list_testcases_by_dataset(dataset_id).await? {
                testcase_by_id.insert(tc.tc_id.clone(), tc);
            }
        }

        // Only non-holdout test cases feed the prompt-improvement loop
        // (spec §4.6 step 1); holdout cases exist purely to catch
        // regressions the proposal pipeline itself shouldn't learn from.
        let filtered: Vec<&RunAnnotation> = annotations
            .iter()
            .filter(|a| testcase_by_id.get(&a.testcase_id).map(|tc| !tc.is_holdout).unwrap_or(false))
            .collect();
        if filtered.is_empty() {
            return Err(ProposalError::NoAnnotations);
        }

        let mut by_tag: HashMap<String, Vec<&RunAnnotation>> = HashMap::new();
        for annotation in &filtered {
            for tag in &annotation.issues {
                by_tag.entry(tag.clone()).or_default().push(annotation);
            }
        }

        let system_prompt = self.store.get_system_prompt("proposal_generation_system").await?.unwrap_or_default();
        let user_template = self.store.get_system_prompt("proposal_generation_user").await?.unwrap_or_default();

        let mut proposals = Vec::new();
        for (tag, tagged) in by_tag {
            if tagged.len() < TAG_THRESHOLD {
                continue;
            }

            let context = self.build_context_block(&tagged, &tag, total_runs, &active_version.system_prompt, &testcase_by_id).await?;
            let user_prompt = render(
                &user_template,
                &[
                    ("current_prompt", context.current_prompt.as_str()),
                    ("tag", context.tag.as_str()),
                    ("count", context.count.as_str()),
                    ("total_runs", context.total_runs.as_str()),
                    ("sample_notes", context.sample_notes.as_str()),
                    ("action_issues_count", context.action_issues_count.as_str()),
                    ("tool_failure_summary", context.tool_failure_summary.as_str()),
                    ("correction_samples", context.correction_samples.as_str()),
                    ("dedup_section", context.dedup_section.as_str()),
                    ("rubric_section", ""),
                    ("json_fields", "title, category, confidence, priority, pattern_source, impact, diff, reasoning"),
                ],
            );

            let raw = self.judge_client.complete(&system_prompt, &user_prompt).await?;
            let payload: ProposalPayload = match serde_json::from_str(&raw) {
                Ok(p) => p,
                Err(err) => {
                    warn!(tag = %tag, error = %err, "judge returned unparseable proposal, skipping tag");
                    continue;
                }
            };

            let pattern_source = if payload.pattern_source.is_empty() { tag.clone() } else { payload.pattern_source };
            let proposal = PromptProposal {
                proposal_id: crate::model::new_id("proposal"),
                agent_id: agent_id.to_string(),
                prompt_version: active_version.version,
                title: payload.title,
                category: payload.category,
                confidence: payload.confidence,
                priority: payload.priority,
                pattern_source,
                expected_impact: payload.impact,
                diff: payload.diff,
                status: ProposalStatus::Pending,
                reasoning: payload.reasoning,
                created_at: chrono::Utc::now(),
            };
            self.store.put_proposal(&proposal).await?;
            proposals.push(proposal);

            let mut cost = CostRecord::new(CallType::ProposalGeneration, self.judge_model.clone());
            cost.agent_id = Some(agent_id.to_string());
            self.store.put_cost_record(&cost).await?;
        }

        Ok(proposals)
    }

    async fn build_context_block(
        &self,
        tagged: &[&RunAnnotation],
        tag: &str,
        total_runs: usize,
        current_prompt: &str,
        testcase_by_id: &HashMap<String, TestCase>,
    ) -> Result<ContextBlock, ProposalError> {
        let sample_notes = tagged
            .iter()
            .filter(|a| !a.notes.is_empty())
            .take(3)
            .map(|a| a.notes.clone())
            .collect::<Vec<_>>()
            .join("\n");

        let mut corrections = Vec::new();
        let mut tool_stats: HashMap<String, (u32, u32)> = HashMap::new();
        let mut excerpts = Vec::new();

        for annotation in tagged.iter().take(10) {
            let actions = self.store.list_action_annotations(&annotation.evaluation_id, &annotation.testcase_id).await?;
            for action in actions {
                if let Some(correction) = action.correction {
                    corrections.push(correction);
                }
            }

            if let Ok(run) = self.store.get_run(&annotation.evaluation_id).await {
                if let Some(result) = run.test_cases.iter().find(|t| t.testcase_id == annotation.testcase_id) {
                    for expectation in &result.expected_tools {
                        let entry = tool_stats.entry(expectation.tool_name.clone()).or_insert((0, 0));
                        entry.1 += 1;
                        if expectation.was_called {
                            entry.0 += 1;
                        }
                    }
                    if excerpts.len() < 3 {
                        if let Some(tc) = testcase_by_id.get(&annotation.testcase_id) {
                            excerpts.push(format!("input: {}\nresponse: {}", tc.input, result.response_from_agent));
                        }
                    }
                }
            }
        }

        let tool_failure_summary = tool_stats
            .into_iter()
            .map(|(name, (passed, total))| format!("{name}: {passed}/{total} called"))
            .collect::<Vec<_>>()
            .join("; ");

        Ok(ContextBlock {
            current_prompt: current_prompt.to_string(),
            tag: tag.to_string(),
            count: tagged.len().to_string(),
            total_runs: total_runs.to_string(),
            sample_notes,
            action_issues_count: tagged.len().to_string(),
            tool_failure_summary,
            correction_samples: corrections.join("\n"),
            dedup_section: excerpts.join("\n---\n"),
        })
    }

    /// Applies a pending proposal: allocates the next prompt version,
    /// best-effort line-level remove-then-add against the referenced
    /// version's text, persists the new version, and activates it
    /// atomically (spec §4.6 "Apply operation").
    pub async fn apply_proposal(&self, proposal_id: &str) -> Result<PromptVersion, ProposalError> {
        let mut proposal = self.store.get_proposal(proposal_id).await?;
        let base = self.store.get_prompt_version(&proposal.agent_id, proposal.prompt_version).await?;
        let new_text = apply_diff(&base.system_prompt, &proposal.diff);

        let next_version = self.store.next_prompt_version(&proposal.agent_id).await?;
        let mut version = PromptVersion::new(proposal.agent_id.clone(), next_version, new_text);
        version.author_notes = format!("applied from proposal {}", proposal.proposal_id);
        self.store.put_prompt_version(&version).await?;
        self.store.set_active_prompt_version(&proposal.agent_id, next_version).await?;

        proposal.status = ProposalStatus::Applied;
        self.store.put_proposal(&proposal).await?;

        Ok(version)
    }
}

struct ContextBlock {
    current_prompt: String,
    tag: String,
    count: String,
    total_runs: String,
    sample_notes: String,
    action_issues_count: String,
    tool_failure_summary: String,
    correction_samples: String,
    dedup_section: String,
}

/// Line-level remove-then-add, best-effort (spec §4.6): every line
/// exactly matching an entry in `removed` is dropped, then `added` lines
/// are appended.
fn apply_diff(text: &str, diff: &PromptDiff) -> String {
    let mut lines: Vec<String> = text.lines().map(String::from).collect();
    lines.retain(|line| !diff.removed.contains(line));
    lines.extend(diff.added.iter().cloned());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Agent, Dataset, Efficiency};

    #[test]
    fn apply_diff_removes_then_appends() {
        let text = "You are helpful.\nBe concise.";
        let diff = PromptDiff {
            added: vec!["Never fabricate tool arguments.".to_string()],
            removed: vec!["Be concise.".to_string()],
        };
        let out = apply_diff(text, &diff);
        assert_eq!(out, "You are helpful.\nNever fabricate tool arguments.");
    }

    #[tokio::test]
    async fn generate_for_agent_without_annotations_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteStore::new(dir.path().join("t.db")).unwrap());
        let agent = Agent::new("demo", "http://localhost:9/invoke", "gpt");
        store.put_agent(&agent).await.unwrap();
        let pv = PromptVersion::new(agent.agent_id.clone(), 1, "You are helpful.");
        store.put_prompt_version(&pv).await.unwrap();
        store.set_active_prompt_version(&agent.agent_id, 1).await.unwrap();

        let judge: Arc<dyn JudgeClient> = Arc::new(crate::judge::MockJudge::with_response("{}"));
        let generator = ProposalGenerator::new(store, judge, "qwen3-coder:latest");
        let result = generator.generate_for_agent(&agent.agent_id, None).await;
        assert!(matches!(result, Err(ProposalError::NoAnnotations)));
    }

    #[tokio::test]
    async fn below_threshold_tag_yields_no_proposal() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteStore::new(dir.path().join("t.db")).unwrap());
        let agent = Agent::new("demo", "http://localhost:9/invoke", "gpt");
        store.put_agent(&agent).await.unwrap();
        let pv = PromptVersion::new(agent.agent_id.clone(), 1, "You are helpful.");
        store.put_prompt_version(&pv).await.unwrap();
        store.set_active_prompt_version(&agent.agent_id, 1).await.unwrap();

        let dataset = Dataset::new("ds", "goal");
        store.put_dataset(&dataset).await.unwrap();
        let tc = TestCase::new(dataset.dataset_id.clone(), "hi", "ok", vec![], vec![], None);
        store.put_testcase(&tc).await.unwrap();

        let mut run = crate::model::EvaluationRun::new(dataset.dataset_id.clone(), agent.agent_id.clone(), 1, "default", 1, agent.endpoint_url.clone(), 30, 1);
        run.status = RunStatus::Completed;
        store.put_run(&run).await.unwrap();

        store
            .put_run_annotation(&RunAnnotation {
                evaluation_id: run.eval_id.clone(),
                testcase_id: tc.tc_id.clone(),
                outcome: 2,
                efficiency: Efficiency::Acceptable,
                issues: vec!["tone".to_string()],
                notes: "too terse".to_string(),
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap();

        let judge: Arc<dyn JudgeClient> = Arc::new(crate::judge::MockJudge::with_response("{}"));
        let generator = ProposalGenerator::new(store, judge, "qwen3-coder:latest");
        let proposals = generator.generate_for_agent(&agent.agent_id, None).await.unwrap();
        assert!(proposals.is_empty());
    }
}
