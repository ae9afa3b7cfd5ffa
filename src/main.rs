//! devloop - plan-driven development loop
//!
//! Thin command-line shell over the devloop library: inspect the plan, pick
//! the next task, find the resume point of an interrupted run, and record
//! status changes.

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use devloop::config::{ConfigOverrides, ConfigValidator, ProjectConfig};
use devloop::plan::{select_task, PlanStore, SelectionError, TaskDefinition, TaskId, TaskStatus};
use devloop::resume::{resume_from_dir, COMMIT_STEP, IMPLEMENTATION_STEP, REVIEW_STEP};
use devloop::review::{analyze_review, IssueClassification};
use devloop::DevLoopError;

#[derive(Parser)]
#[command(name = "devloop")]
#[command(version)]
#[command(about = "Plan-driven development loop: select, resume and track tasks", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".", env = "DEVLOOP_PROJECT")]
    project: PathBuf,

    /// Config file (defaults to .devloop.json or .devloop.toml in the project)
    #[arg(short, long, global = true, env = "DEVLOOP_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured LLM provider
    #[arg(long, global = true)]
    llm: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show milestones and tasks from the plan
    Plan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Select the next task to work on
    Next {
        /// Validate and select this task instead of auto-selecting
        #[arg(short, long)]
        task: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show where an interrupted run would resume
    Resume {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a task's status in the plan file
    Status {
        /// Task id, e.g. TASK-004
        id: String,

        /// pending, in-progress, done or blocked
        status: TaskStatus,
    },

    /// Classify the issues in a review document
    Review {
        /// Review markdown file
        file: PathBuf,

        /// Review iteration number
        #[arg(short, long, default_value = "1")]
        iteration: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or validate project configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration
    Validate,

    /// Show configuration file paths
    Paths,
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "devloop=debug,info"
    } else {
        "devloop=info,warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        let devloop_error = e.downcast_ref::<DevLoopError>();
        if devloop_error.is_some_and(DevLoopError::requires_human) {
            eprintln!(
                "{} edit the plan or the project config, then run the command again",
                "Hint:".yellow().bold()
            );
        }
        std::process::exit(devloop_error.map_or(1, DevLoopError::exit_code));
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Resolve project path
    let project_path = cli.project.canonicalize().unwrap_or(cli.project.clone());

    if !project_path.is_dir() {
        eprintln!(
            "{} Project directory does not exist: {}",
            "Error:".red().bold(),
            project_path.display()
        );
        std::process::exit(1);
    }

    let overrides = ConfigOverrides {
        config_path: cli.config.clone(),
        llm: cli.llm.clone(),
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Plan { json } => {
            let config = ProjectConfig::load(&project_path, &overrides)?;
            let plan = PlanStore::new(config.plan_path(&project_path)).load_plan()?;

            if json {
                print_json(&plan)?;
                return Ok(());
            }

            println!("\n{} {}", "Plan:".cyan().bold(), plan.title);
            println!("{}", "─".repeat(40));
            for milestone in &plan.milestones {
                println!(
                    "\n{} {} — {}",
                    "Milestone".bold(),
                    milestone.number,
                    milestone.name
                );
                for task in &milestone.tasks {
                    print_task_line(task);
                    if config.verbose && !task.depends_on.is_empty() {
                        println!("        depends on: {}", join_ids(&task.depends_on));
                    }
                }
            }

            let done = plan.tasks().filter(|t| t.status == TaskStatus::Done).count();
            println!("\n   {}/{} tasks done", done, plan.task_count());
        }

        Commands::Next { task, json } => {
            let config = ProjectConfig::load(&project_path, &overrides)?;
            let plan = PlanStore::new(config.plan_path(&project_path)).load_plan()?;
            let requested = task.map(TaskId::from);

            match select_task(&plan, requested.as_ref()) {
                Ok(selected) => {
                    if json {
                        print_json(&selected)?;
                    } else {
                        print_task_details(&selected);
                    }
                }
                Err(e) => {
                    if json {
                        print_json(&selection_error_json(&e))?;
                    }
                    return Err(DevLoopError::from(e).into());
                }
            }
        }

        Commands::Resume { json } => {
            let config = ProjectConfig::load(&project_path, &overrides)?;
            let state = resume_from_dir(&config.context_dir(&project_path), None)?;

            if json {
                print_json(&state)?;
                return Ok(());
            }

            let store = PlanStore::new(config.plan_path(&project_path));
            let status = store
                .load_plan()
                .ok()
                .and_then(|plan| plan.find_task(&state.task_id).map(|t| t.status));

            println!(
                "{} {} at step {} ({})",
                "Resume:".cyan().bold(),
                state.task_id,
                state.next_step,
                step_name(state.next_step)
            );
            if let Some(status) = status {
                println!("   Plan status: {}", status);
            }
        }

        Commands::Status { id, status } => {
            let config = ProjectConfig::load(&project_path, &overrides)?;
            let store = PlanStore::new(config.plan_path(&project_path));
            let task_id = TaskId::from(id);

            if store.update_status(&task_id, status)? {
                println!("{} {} is now {}", "OK".green().bold(), task_id, status);
            } else {
                println!("{} {} already {}", "Info:".blue(), task_id, status);
            }
        }

        Commands::Review {
            file,
            iteration,
            json,
        } => {
            let path = resolve(&project_path, &file);
            if !path.is_file() {
                return Err(DevLoopError::MissingFile { path }.into());
            }
            let content = std::fs::read_to_string(&path)?;
            let result = analyze_review(&content, iteration);

            if json {
                print_json(&result)?;
                return Ok(());
            }

            println!(
                "\n{} iteration {}",
                "Review:".cyan().bold(),
                result.iteration
            );
            println!("{}", "─".repeat(40));
            if result.issues.is_empty() {
                println!("   {}", "No issues".green());
            }
            for issue in &result.issues {
                let label = match issue.classification {
                    IssueClassification::Blocking => "BLOCKING".red().bold(),
                    IssueClassification::NonBlocking => "NON-BLOCKING".yellow(),
                    IssueClassification::Nitpick => "NITPICK".dimmed(),
                };
                println!("   {} {}", label, issue.description);
            }
            if result.has_blocking_issues {
                println!("\n   {}", "Blocking issues must be fixed".red());
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show { json } => {
                let config = ProjectConfig::load(&project_path, &overrides)?;

                if json {
                    print_json(&config)?;
                } else {
                    println!("\n{} Project Configuration", "Config:".cyan().bold());
                    println!("{}", "─".repeat(40));
                    println!("   LLM: {}", config.llm);
                    println!("   Plan file: {}", config.plan_file);
                    println!("   Docs: {}", config.paths.docs);
                    println!("   Context: {}", config.paths.context);
                    println!("   Prompts: {}", config.paths.prompts);
                    println!(
                        "   Max review iterations: {}",
                        config.validation.max_review_iterations
                    );
                    println!(
                        "   Validation commands: {}",
                        config.validation.commands.len()
                    );
                    for (name, command) in &config.validation.commands {
                        println!("      {}: {}", name, command);
                    }
                    println!("   Verbose: {}", config.verbose);
                }
            }

            ConfigAction::Validate => {
                let report = ConfigValidator::new(&project_path)
                    .with_overrides(overrides)
                    .validate_project();

                if cli.verbose {
                    println!("{}", report.verbose_report());
                } else {
                    for error in &report.errors {
                        eprintln!("{} {}", "Error:".red(), error);
                    }
                    for warning in &report.warnings {
                        println!("{} {}", "Warning:".yellow(), warning);
                    }
                    if report.is_valid() {
                        println!("{} {}", "OK".green().bold(), report.summary());
                    } else {
                        eprintln!("{}", report.summary());
                    }
                }

                if !report.is_valid() {
                    std::process::exit(report.exit_code());
                }
            }

            ConfigAction::Paths => {
                let source = ProjectConfig::locate(&project_path, &overrides)?;
                let config = ProjectConfig::load(&project_path, &overrides)?;

                println!("\n{} Configuration Paths", "Config:".cyan().bold());
                println!("{}", "─".repeat(40));
                match source {
                    Some(path) => println!("   Config file: {}", path.display()),
                    None => println!("   Config file: (none, using defaults)"),
                }
                println!("   Plan: {}", config.plan_path(&project_path).display());
                println!("   Context: {}", config.context_dir(&project_path).display());
                println!("   Prompts: {}", config.prompts_dir(&project_path).display());
            }
        },
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> devloop::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn resolve(project_path: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        project_path.join(file)
    }
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(TaskId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn step_name(step: u32) -> &'static str {
    match step {
        IMPLEMENTATION_STEP => "implement",
        REVIEW_STEP => "review",
        COMMIT_STEP => "commit",
        _ => "unknown",
    }
}

fn print_task_line(task: &TaskDefinition) {
    let status = match task.status {
        TaskStatus::Done => "done".green(),
        TaskStatus::InProgress => "in-progress".yellow(),
        TaskStatus::Blocked => "blocked".red(),
        TaskStatus::Pending => "pending".normal(),
    };
    println!(
        "   {:<10} [{}] {} ({})",
        task.id.as_str(),
        status,
        task.name,
        task.complexity
    );
}

fn print_task_details(task: &TaskDefinition) {
    println!("\n{} {}: {}", "Next:".cyan().bold(), task.id, task.name);
    println!("{}", "─".repeat(40));
    println!("   Status: {}", task.status);
    println!("   Complexity: {}", task.complexity);
    if !task.depends_on.is_empty() {
        println!("   Depends on: {}", join_ids(&task.depends_on));
    }
    if !task.description.is_empty() {
        println!("\n{}", task.description);
    }
    if !task.steps.is_empty() {
        println!("\n{}", "Steps:".bold());
        for (i, step) in task.steps.iter().enumerate() {
            println!("   {}. {}", i + 1, step);
        }
    }
    if !task.files_in_scope.is_empty() {
        println!("\n{}", "Files in scope:".bold());
        for file in &task.files_in_scope {
            println!("   - {} ({})", file.path, file.kind.as_str());
        }
    }
    if !task.acceptance_criteria.is_empty() {
        println!("\n{}", "Validation criteria:".bold());
        for criterion in &task.acceptance_criteria {
            println!("   - {}", criterion);
        }
    }
}

fn selection_error_json(error: &SelectionError) -> serde_json::Value {
    let message = error.to_string();
    match error {
        SelectionError::TaskNotFound(id) => serde_json::json!({
            "error": "task-not-found",
            "taskId": id,
            "message": message,
        }),
        SelectionError::DependenciesNotMet { id, unsatisfied } => serde_json::json!({
            "error": "dependencies-not-met",
            "taskId": id,
            "unsatisfied": unsatisfied,
            "message": message,
        }),
        SelectionError::TaskNotPending { id, status } => serde_json::json!({
            "error": "task-not-pending",
            "taskId": id,
            "status": status,
            "message": message,
        }),
        SelectionError::NoPendingTasks => serde_json::json!({
            "error": "no-pending-tasks",
            "message": message,
        }),
    }
}
