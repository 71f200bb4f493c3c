//! CLI driver exercising the orchestrator end to end. Real LLM providers and
//! tool implementations are collaborators this crate only consumes an
//! interface for, so the `run-pulse`/`demo` commands below drive the turn
//! loop against a deterministic stand-in model and a no-op tool registry
//! rather than a production integration.

use anyhow::{anyhow, Result};
use autarch::approval::ApprovalBroker;
use autarch::config::WorkflowConfig;
use autarch::domain::types::{
    AgentId, AgentRole, FeatureName, MergeStrategy, Objective, Phase, ProjectRoot, PulseId,
    ScopePath, WorkflowId,
};
use autarch::domain::view::WorkflowView;
use autarch::orchestrator::Orchestrator;
use autarch::pulse::{self, PulseContext};
use autarch::session_runtime::model::{Model, ModelError, ModelEvent, ModelRequest};
use autarch::session_runtime::roles::RoleRegistry;
use autarch::session_runtime::tool::ToolRegistry;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "autarch")]
#[command(about = "Gated multi-phase workflow orchestrator for LLM-driven code changes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a new workflow.
    Create {
        #[arg(long)]
        feature: String,
        #[arg(long)]
        objective: String,
        #[arg(long)]
        project_root: PathBuf,
        /// "quick" or "full"; omit to let the scoping artifact decide.
        #[arg(long)]
        scope_path: Option<String>,
    },
    /// Print a workflow's current projected state, resuming it from its
    /// event log if this process hasn't seen it before.
    View { workflow: String },
    /// Begin a pulse for the workflow's current stage.
    StartPulse { workflow: String },
    /// Run one pulse against the stand-in model/tool doubles and submit its
    /// transcript as the stage's pending artifact.
    RunPulse {
        workflow: String,
        #[arg(long)]
        worktree_root: PathBuf,
        #[arg(long)]
        agent_id: String,
    },
    /// Submit an artifact body directly, bypassing `run-pulse`.
    SubmitArtifact {
        workflow: String,
        #[arg(long)]
        body: String,
    },
    /// Approve the pending artifact, advancing to the next stage.
    Approve {
        workflow: String,
        #[arg(long)]
        merge_strategy: Option<String>,
        #[arg(long)]
        commit_message: Option<String>,
    },
    RequestChanges {
        workflow: String,
        #[arg(long)]
        feedback: String,
    },
    RequestFixes {
        workflow: String,
        #[arg(long, value_delimiter = ',')]
        comment_ids: Vec<String>,
        #[arg(long)]
        summary: Option<String>,
    },
    Rewind {
        workflow: String,
        #[arg(long)]
        target: String,
    },
    Archive {
        workflow: String,
        #[arg(long)]
        reason: String,
    },
    /// Drive a whole workflow from creation to completion against the
    /// stand-in model/tool doubles, printing each stage transition.
    Demo {
        #[arg(long)]
        feature: String,
        #[arg(long)]
        objective: String,
        #[arg(long)]
        project_root: PathBuf,
        #[arg(long)]
        worktree_root: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let orchestrator = Orchestrator::new(Arc::new(ApprovalBroker::new()));

    match cli.command {
        Command::Create { feature, objective, project_root, scope_path } => {
            let scope_path = scope_path.map(|s| parse_scope_path(&s)).transpose()?;
            let (workflow_id, view) = orchestrator
                .create_workflow(
                    FeatureName(feature),
                    Objective(objective),
                    ProjectRoot(project_root),
                    scope_path,
                )
                .await?;
            println!("created workflow {workflow_id}");
            print_view(&view);
        }
        Command::View { workflow } => {
            let view = orchestrator.resume_workflow(parse_workflow_id(&workflow)?).await?;
            print_view(&view);
        }
        Command::StartPulse { workflow } => {
            let workflow_id = parse_workflow_id(&workflow)?;
            orchestrator.resume_workflow(workflow_id).await?;
            let view = orchestrator.start_pulse(workflow_id).await?;
            print_view(&view);
        }
        Command::RunPulse { workflow, worktree_root, agent_id } => {
            let workflow_id = parse_workflow_id(&workflow)?;
            let view = orchestrator.resume_workflow(workflow_id).await?;
            let phase = view.phase().ok_or_else(|| anyhow!("workflow has no active phase"))?;
            let role = AgentRole::for_phase(phase)
                .ok_or_else(|| anyhow!("phase {phase:?} has no associated agent role"))?;
            let project_root = view
                .project_root()
                .ok_or_else(|| anyhow!("workflow is missing its project root"))?
                .as_path()
                .to_path_buf();
            let objective = view
                .objective()
                .ok_or_else(|| anyhow!("workflow is missing its objective"))?
                .0
                .clone();

            let ctx = PulseContext {
                workflow_id,
                pulse_id: PulseId::new(),
                role,
                agent_id: AgentId::from(agent_id),
                project_root,
                worktree_root,
            };
            let roles = RoleRegistry::new(WorkflowConfig::default_config());
            let model = StandInModel;
            let tools = ToolRegistry::new();
            let outcome = pulse::run_pulse(
                &ctx,
                &roles,
                &model,
                &tools,
                orchestrator.approvals(),
                &objective,
            )
            .await?;

            println!("pulse ran in {}", outcome.worktree_path.display());
            orchestrator.complete_pulse(workflow_id, outcome.fingerprint).await?;
            let view =
                orchestrator.submit_artifact(workflow_id, outcome.message.text()).await?;
            print_view(&view);
        }
        Command::SubmitArtifact { workflow, body } => {
            let workflow_id = parse_workflow_id(&workflow)?;
            orchestrator.resume_workflow(workflow_id).await?;
            let view = orchestrator.submit_artifact(workflow_id, body).await?;
            print_view(&view);
        }
        Command::Approve { workflow, merge_strategy, commit_message } => {
            let workflow_id = parse_workflow_id(&workflow)?;
            orchestrator.resume_workflow(workflow_id).await?;
            let merge_strategy = merge_strategy.map(|s| parse_merge_strategy(&s)).transpose()?;
            let view = orchestrator.approve(workflow_id, merge_strategy, commit_message).await?;
            print_view(&view);
        }
        Command::RequestChanges { workflow, feedback } => {
            let workflow_id = parse_workflow_id(&workflow)?;
            orchestrator.resume_workflow(workflow_id).await?;
            let view = orchestrator.request_changes(workflow_id, feedback).await?;
            print_view(&view);
        }
        Command::RequestFixes { workflow, comment_ids, summary } => {
            let workflow_id = parse_workflow_id(&workflow)?;
            orchestrator.resume_workflow(workflow_id).await?;
            let view = orchestrator
                .request_fixes(workflow_id, comment_ids, summary.unwrap_or_default())
                .await?;
            print_view(&view);
        }
        Command::Rewind { workflow, target } => {
            let workflow_id = parse_workflow_id(&workflow)?;
            orchestrator.resume_workflow(workflow_id).await?;
            let target = parse_phase(&target)?;
            let view = orchestrator.rewind(workflow_id, target).await?;
            print_view(&view);
        }
        Command::Archive { workflow, reason } => {
            let workflow_id = parse_workflow_id(&workflow)?;
            orchestrator.resume_workflow(workflow_id).await?;
            let view = orchestrator.archive(workflow_id, reason).await?;
            print_view(&view);
        }
        Command::Demo { feature, objective, project_root, worktree_root } => {
            run_demo(&orchestrator, feature, objective, project_root, worktree_root).await?;
        }
    }

    Ok(())
}

async fn run_demo(
    orchestrator: &Orchestrator,
    feature: String,
    objective: String,
    project_root: PathBuf,
    worktree_root: PathBuf,
) -> Result<()> {
    let (workflow_id, mut view) = orchestrator
        .create_workflow(
            FeatureName(feature),
            Objective(objective.clone()),
            ProjectRoot(project_root.clone()),
            None,
        )
        .await?;
    println!("created workflow {workflow_id}");

    let roles = RoleRegistry::new(WorkflowConfig::default_config());
    let model = StandInModel;
    let tools = ToolRegistry::new();

    while let Some(phase) = view.phase() {
        if phase == Phase::Done {
            break;
        }
        let Some(role) = AgentRole::for_phase(phase) else {
            break;
        };

        view = orchestrator.start_pulse(workflow_id).await?;
        println!("stage {phase:?}: pulse started");

        let ctx = PulseContext {
            workflow_id,
            pulse_id: PulseId::new(),
            role,
            agent_id: AgentId::from(format!("{}-demo", role.as_str())),
            project_root: project_root.clone(),
            worktree_root: worktree_root.clone(),
        };
        let outcome = pulse::run_pulse(
            &ctx,
            &roles,
            &model,
            &tools,
            orchestrator.approvals(),
            &objective,
        )
        .await?;
        orchestrator.complete_pulse(workflow_id, outcome.fingerprint).await?;
        view = orchestrator.submit_artifact(workflow_id, outcome.message.text()).await?;
        println!("stage {phase:?}: artifact submitted");

        view = orchestrator.approve(workflow_id, None, None).await?;
        println!("stage {phase:?}: approved, now at {:?}", view.phase());
    }

    print_view(&view);
    Ok(())
}

fn print_view(view: &WorkflowView) {
    println!("phase: {:?}", view.phase());
    println!("current pulse: {:?}", view.current_pulse());
    println!("pending artifact: {:?}", view.pending_artifact());
    println!("completed: {}", view.is_completed());
    println!("archived: {}", view.is_archived());
}

fn parse_workflow_id(s: &str) -> Result<WorkflowId> {
    WorkflowId::from_string(s).map_err(|e| anyhow!("invalid workflow id '{s}': {e}"))
}

fn parse_phase(s: &str) -> Result<Phase> {
    match s {
        "backlog" => Ok(Phase::Backlog),
        "scoping" => Ok(Phase::Scoping),
        "researching" => Ok(Phase::Researching),
        "planning" => Ok(Phase::Planning),
        "in_progress" | "in-progress" => Ok(Phase::InProgress),
        "review" => Ok(Phase::Review),
        "done" => Ok(Phase::Done),
        other => Err(anyhow!("unknown phase '{other}'")),
    }
}

fn parse_scope_path(s: &str) -> Result<ScopePath> {
    match s {
        "quick" => Ok(ScopePath::Quick),
        "full" => Ok(ScopePath::Full),
        other => Err(anyhow!("unknown scope path '{other}', expected quick or full")),
    }
}

fn parse_merge_strategy(s: &str) -> Result<MergeStrategy> {
    match s {
        "fast-forward" | "ff" => Ok(MergeStrategy::FastForward),
        "squash" => Ok(MergeStrategy::Squash),
        "merge-commit" | "merge" => Ok(MergeStrategy::MergeCommit),
        "rebase" => Ok(MergeStrategy::Rebase),
        other => Err(anyhow!("unknown merge strategy '{other}'")),
    }
}

/// Deterministic stand-in for a production `Model`: emits a single segment
/// acknowledging the objective and immediately ends the turn. A real
/// provider client is outside this crate's scope.
struct StandInModel;

#[async_trait::async_trait]
impl Model for StandInModel {
    async fn stream(
        &self,
        request: ModelRequest,
    ) -> Result<mpsc::Receiver<ModelEvent>, ModelError> {
        let (tx, rx) = mpsc::channel(4);
        let content = format!("acknowledged: {}", request.user_message);
        tx.send(ModelEvent::SegmentComplete { index: 0, content }).await.ok();
        tx.send(ModelEvent::Done { stop_reason: "end_turn".to_string() }).await.ok();
        Ok(rx)
    }
}
