//! Startup reconciliation (spec §4.7 "StartupReconciler"): brings a
//! database up to a runnable baseline without clobbering anything an
//! operator already created or edited.
//!
//! Runs once, synchronously, before the server starts accepting traffic —
//! mirrors `original_source/src/api/main.py`'s lifespan-startup sequence
//! (`ensure_default_agents`, `ensure_default_judge_configs`,
//! `cleanup_orphaned_evaluations`). Every step is independently
//! idempotent and non-fatal: a failure in one step is logged and the
//! reconciler moves on rather than aborting startup.

pub mod defaults;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::ReconcileError;
use crate::model::{Agent, JudgeConfig, PromptVersion, RunStatus, ScoringMode, StatusHistoryEntry};
use crate::store::SqliteStore;

pub struct StartupReconciler {
    store: Arc<SqliteStore>,
}

/// Tally of what the reconciler actually did, returned so a caller (the
/// server's startup log, or a test) can assert on it without re-reading
/// the store.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub agents_seeded: usize,
    pub judge_configs_seeded: usize,
    pub system_prompts_seeded: usize,
    pub runs_swept: usize,
}

impl StartupReconciler {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Runs every reconciliation step in order. Each step is wrapped so a
    /// failure in one never prevents the others from running (spec §4.7:
    /// "non-fatal, log and continue").
    pub async fn reconcile(&self) -> Result<ReconcileReport, ReconcileError> {
        let mut report = ReconcileReport::default();

        match self.ensure_default_agent().await {
            Ok(n) => report.agents_seeded = n,
            Err(err) => error!(error = %err, "default-agent seeding failed (non-fatal)"),
        }

        match self.ensure_default_judge_configs().await {
            Ok(n) => report.judge_configs_seeded = n,
            Err(err) => error!(error = %err, "judge-config seeding/migration failed (non-fatal)"),
        }

        match self.ensure_default_system_prompts().await {
            Ok(n) => report.system_prompts_seeded = n,
            Err(err) => error!(error = %err, "system-prompt seeding failed (non-fatal)"),
        }

        match self.sweep_orphaned_runs().await {
            Ok(n) => report.runs_swept = n,
            Err(err) => error!(error = %err, "orphaned-run sweep failed (non-fatal)"),
        }

        Ok(report)
    }

    /// Seeds the Computer Use Agent and its v1 prompt if no agent exists
    /// yet (spec §4.7 step 1; `sqlite_service.py::ensure_default_agents`).
    /// Never overwrites a user-created agent.
    async fn ensure_default_agent(&self) -> Result<usize, ReconcileError> {
        if !self.store.list_agents().await?.is_empty() {
            return Ok(0);
        }

        info!("no agents found — seeding default Computer Use Agent");
        let mut agent = Agent::new(
            defaults::DEFAULT_AGENT_NAME,
            "http://localhost:8001/invoke",
            defaults::DEFAULT_AGENT_MODEL_LABEL,
        );
        agent.agent_id = "agent_cua_default".to_string();
        agent.description = defaults::DEFAULT_AGENT_DESCRIPTION.to_string();
        self.store.put_agent(&agent).await?;

        let mut prompt = PromptVersion::new(agent.agent_id.clone(), 1, defaults::DEFAULT_CUA_SYSTEM_PROMPT);
        prompt.author_notes = "Default CUA system prompt (seeded on startup)".to_string();
        self.store.put_prompt_version(&prompt).await?;
        self.store.set_active_prompt_version(&agent.agent_id, 1).await?;

        Ok(1)
    }

    /// Seeds `default-binary`/`default-cua` if no judge config exists at
    /// all, otherwise runs the migration chain on whatever `default-cua`
    /// versions already exist (spec §4.7 step 2;
    /// `sqlite_service.py::ensure_default_judge_configs`, order matters —
    /// rubric migration before the click-accuracy migration).
    async fn ensure_default_judge_configs(&self) -> Result<usize, ReconcileError> {
        if !self.store.list_judge_config_ids().await?.is_empty() {
            self.migrate_cua_to_rubric().await?;
            self.migrate_cua_click_accuracy().await?;
            return Ok(0);
        }

        info!("no judge configs found — seeding default configurations");

        let mut binary = JudgeConfig::binary("default-binary", 1, defaults::DEFAULT_BINARY_SYSTEM_PROMPT);
        binary.name = "Default Binary Judge".to_string();
        binary.user_prompt_template_batched = defaults::DEFAULT_BINARY_USER_TEMPLATE_BATCHED.to_string();
        binary.user_prompt_template_single = defaults::DEFAULT_BINARY_USER_TEMPLATE_SINGLE.to_string();
        self.store.put_judge_config(&binary).await?;

        let cua = JudgeConfig {
            judge_config_id: "default-cua".to_string(),
            version: 1,
            name: "Computer Use Agent Judge".to_string(),
            is_active: true,
            scoring_mode: ScoringMode::Rubric,
            pass_threshold: Some(3.0),
            rubric: defaults::default_cua_rubric(),
            system_prompt: defaults::DEFAULT_CUA_JUDGE_SYSTEM_PROMPT.to_string(),
            user_prompt_template_single: defaults::DEFAULT_CUA_USER_TEMPLATE_SINGLE.to_string(),
            user_prompt_template_batched: defaults::DEFAULT_CUA_USER_TEMPLATE_BATCHED.to_string(),
            notes: String::new(),
            created_at: chrono::Utc::now(),
        };
        self.store.put_judge_config(&cua).await?;
        self.store.set_active_judge_config("default-cua", 1).await?;

        Ok(2)
    }

    /// One-time migration: upgrades an existing `default-cua` config from
    /// `binary` to `rubric` scoring. Idempotent — skips once the latest
    /// version is already rubric-scored.
    async fn migrate_cua_to_rubric(&self) -> Result<(), ReconcileError> {
        let versions = self.store.list_judge_config_versions("default-cua").await?;
        let Some(latest) = versions.into_iter().max_by_key(|c| c.version) else {
            return Ok(());
        };
        if latest.scoring_mode == ScoringMode::Rubric && !latest.rubric.is_empty() {
            return Ok(());
        }

        info!("migrating default-cua config to rubric scoring mode");
        let next_version = self.store.next_judge_config_version("default-cua").await?;
        let migrated = JudgeConfig {
            judge_config_id: "default-cua".to_string(),
            version: next_version,
            name: latest.name,
            is_active: false,
            scoring_mode: ScoringMode::Rubric,
            pass_threshold: Some(3.0),
            rubric: defaults::default_cua_rubric(),
            system_prompt: defaults::DEFAULT_CUA_JUDGE_SYSTEM_PROMPT.to_string(),
            user_prompt_template_batched: latest.user_prompt_template_batched,
            user_prompt_template_single: latest.user_prompt_template_single,
            notes: "Auto-migrated to rubric scoring mode with CUA-specific criteria".to_string(),
            created_at: chrono::Utc::now(),
        };
        self.store.put_judge_config(&migrated).await?;
        self.store.set_active_judge_config("default-cua", next_version).await?;
        info!(version = next_version, "migrated default-cua to rubric mode, now active");
        Ok(())
    }

    /// One-time migration: replaces the "Selector Precision" criterion
    /// with "Click Accuracy" and rewrites the system prompt to stop
    /// penalizing CUAs for constraints they cannot change. Idempotent —
    /// skips once "Click Accuracy" is already present in the latest
    /// version's rubric.
    async fn migrate_cua_click_accuracy(&self) -> Result<(), ReconcileError> {
        let versions = self.store.list_judge_config_versions("default-cua").await?;
        let Some(latest) = versions.into_iter().max_by_key(|c| c.version) else {
            return Ok(());
        };
        if latest.rubric.iter().any(|c| c.name == "Click Accuracy") {
            return Ok(());
        }

        info!("migrating default-cua: replacing Selector Precision with Click Accuracy");
        let migrated_rubric = defaults::default_cua_rubric();
        let next_version = self.store.next_judge_config_version("default-cua").await?;
        let migrated = JudgeConfig {
            judge_config_id: "default-cua".to_string(),
            version: next_version,
            name: latest.name,
            is_active: false,
            scoring_mode: latest.scoring_mode,
            pass_threshold: latest.pass_threshold.or(Some(3.0)),
            rubric: migrated_rubric,
            system_prompt: defaults::DEFAULT_CUA_JUDGE_SYSTEM_PROMPT.to_string(),
            user_prompt_template_batched: latest.user_prompt_template_batched,
            user_prompt_template_single: latest.user_prompt_template_single,
            notes: "Replaced Selector Precision (inapplicable to CUA) with Click Accuracy; updated system prompt to prevent hairsplitting on style/architecture differences".to_string(),
            created_at: chrono::Utc::now(),
        };
        self.store.put_judge_config(&migrated).await?;
        self.store.set_active_judge_config("default-cua", next_version).await?;
        info!(version = next_version, "migrated default-cua to Click Accuracy criterion, now active");
        Ok(())
    }

    /// Seeds the three internal system prompts (proposal generation and
    /// comparison explanation) if none exist yet. Uses
    /// `seed_system_prompt_if_absent` per key rather than an all-or-nothing
    /// check, so a partially-seeded database (e.g. from a prior crash
    /// mid-seed) still converges.
    async fn ensure_default_system_prompts(&self) -> Result<usize, ReconcileError> {
        let mut seeded = 0;
        for (key, value) in [
            ("proposal_generation_system", defaults::PROPOSAL_GENERATION_SYSTEM),
            ("proposal_generation_user", defaults::PROPOSAL_GENERATION_USER),
            ("comparison_explanation", defaults::COMPARISON_EXPLANATION_SYSTEM),
        ] {
            if self.store.get_system_prompt(key).await?.is_none() {
                self.store.seed_system_prompt_if_absent(key, value).await?;
                seeded += 1;
            }
        }
        if seeded > 0 {
            info!(count = seeded, "seeded default system prompts");
        }
        Ok(seeded)
    }

    /// Forces any run left `pending` or `running` to `cancelled` (spec
    /// §4.7 step 4): a process restart means no coordinator is left
    /// driving them, so they would otherwise sit forever in a non-terminal
    /// state.
    async fn sweep_orphaned_runs(&self) -> Result<usize, ReconcileError> {
        let mut swept = 0;
        for status in [RunStatus::Pending, RunStatus::Running] {
            for mut run in self.store.list_runs_by_status(status).await? {
                warn!(eval_id = %run.eval_id, "cancelling orphaned run from previous server instance");
                run.status = RunStatus::Cancelled;
                run.completed_at = Some(chrono::Utc::now());
                run.status_history
                    .push(StatusHistoryEntry::plain("cancelled on restart—server had been interrupted"));
                self.store.put_run(&run).await?;
                swept += 1;
            }
        }
        Ok(swept)
    }
}
