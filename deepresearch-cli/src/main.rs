//! Deep Research CLI - clarify, rewrite and research from the terminal

mod interactive;
mod render;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use deepresearch_applications::{
    depth_options, get_api_info, list_modes, ClarificationForm, OrchestratorSettings,
    ResearchOrchestrator, ResultView, WorkflowState,
};
use deepresearch_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success,
    DeepResearchConfig, DeepResearchError, DeepResearchResult, ErrorContext, LoggingConfig,
    ResearchDepth, ResearchMode, ResearchRequest,
};
use deepresearch_provider::{all_tool_definitions, OpenAiGateway};
use interactive::{collect_answers, FormOutcome};
use render::{banner, DepthsReport, ModesReport, ResultReport, ToolsReport};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "deepresearch")]
#[command(about = "Deep research with clarification and prompt rewriting")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Research a question
    Research {
        /// What to research
        query: String,

        /// Research mode
        #[arg(short, long, default_value = "o3-deep-research")]
        mode: ResearchMode,

        /// Skip the clarifying questions
        #[arg(long)]
        no_clarification: bool,

        /// Use the (clarified) query as the research prompt
        #[arg(long)]
        no_rewrite: bool,

        /// Tool call budget preset (fast, medium, deep)
        #[arg(short, long)]
        depth: Option<ResearchDepth>,

        /// Explicit tool call budget, overrides --depth
        #[arg(long)]
        max_tool_calls: Option<u32>,

        /// Submit the research run in background mode and poll for it
        #[arg(long)]
        background: bool,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List research modes
    Modes,

    /// List the tools research models can call
    Tools,

    /// List research depth presets
    Depths,

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    if let Err(e) = init_logging(&LoggingConfig::compact(level)) {
        eprintln!("⚠️  Failed to initialize logging: {}", e);
    }

    let (modes, api_info) = tokio::join!(async { list_modes() }, async { get_api_info() });
    info!("{}", banner(&api_info, modes.len()));

    match cli.command {
        Commands::Research {
            query,
            mode,
            no_clarification,
            no_rewrite,
            depth,
            max_tool_calls,
            background,
            json,
        } => {
            let mut request = ResearchRequest::new(query, mode)
                .with_clarification(!no_clarification)
                .with_prompt_rewriting(!no_rewrite);
            if let Some(depth) = depth {
                request = request.with_depth(depth);
            }
            request.max_tool_calls = max_tool_calls;
            if background {
                request.background_mode = Some(true);
            }

            println!("{}", banner(&api_info, modes.len()));
            handle_research(request, json, cli.config.as_deref()).await?;
        }
        Commands::Modes => {
            print!("{}", ModesReport(&modes));
        }
        Commands::Tools => {
            print!("{}", ToolsReport(&all_tool_definitions()));
        }
        Commands::Depths => {
            let config = DeepResearchConfig::load(cli.config.as_deref())?;
            print!("{}", DepthsReport(&depth_options(config.research.default_depth)));
        }
        Commands::Config {
            show,
            init,
            validate,
        } => {
            handle_config(show, init, validate, cli.config.as_deref())?;
        }
    }

    Ok(())
}

/// Run a provider call, giving up if the user presses Ctrl-C
async fn cancellable<T>(
    future: impl Future<Output = DeepResearchResult<T>>,
) -> anyhow::Result<Option<T>> {
    tokio::select! {
        result = future => Ok(Some(result?)),
        _ = tokio::signal::ctrl_c() => {
            println!("\n⏹️  Cancelled");
            Ok(None)
        }
    }
}

async fn handle_research(
    request: ResearchRequest,
    json: bool,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    log_operation_start!("research", mode = %request.mode);

    let config = DeepResearchConfig::load(config_path)?;
    let gateway = OpenAiGateway::new(&config)?;
    let orchestrator =
        ResearchOrchestrator::new(Arc::new(gateway), OrchestratorSettings::from(&config.research));

    println!("🔍 Researching with {}...", request.mode);
    let Some(mut state) = cancellable(orchestrator.start(request)).await? else {
        return Ok(());
    };

    if let Some(form) = ClarificationForm::for_state(&state) {
        let outcome = ask_in_terminal(form).await?;
        let resumed = match outcome {
            FormOutcome::Submit(answers) => {
                println!("\n🔍 Researching with your answers...");
                cancellable(orchestrator.submit_answers(&state, answers)).await?
            }
            FormOutcome::Skip => {
                println!("\n⏭️  Skipping clarification");
                cancellable(orchestrator.skip_clarification(&state)).await?
            }
        };
        let Some(next) = resumed else {
            return Ok(());
        };
        state = next;
    }

    report(state, json)
}

/// Collect answers on a blocking thread so the runtime stays responsive
async fn ask_in_terminal(mut form: ClarificationForm) -> anyhow::Result<FormOutcome> {
    let outcome = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stdout();
        collect_answers(&mut form, &mut input, &mut output)
    })
    .await
    .context("Clarification prompt stopped unexpectedly")??;

    Ok(outcome)
}

fn report(state: WorkflowState, json: bool) -> anyhow::Result<()> {
    let Some(result) = state.result else {
        bail!("Workflow stopped in stage {} without a result", state.stage);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        print!("{}", ResultReport(&ResultView::from_result(&result)));
    }

    if result.success {
        log_operation_success!(
            "research",
            search_results = result.search_results.len(),
            total_duration_ms = result.total_duration_ms
        );
        Ok(())
    } else {
        let message = result.error_message.unwrap_or_default();
        log_operation_error!("research", message.as_str());
        bail!("Research failed: {}", message)
    }
}

fn handle_config(
    show: bool,
    init: bool,
    validate: bool,
    config_path: Option<&Path>,
) -> DeepResearchResult<()> {
    if init {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(DeepResearchConfig::default_path)
            .ok_or_else(|| DeepResearchError::Config {
                message: "No configuration directory available".to_string(),
                source: None,
                context: ErrorContext::new("cli")
                    .with_operation("config_init")
                    .with_suggestion("Pass an explicit path with --config"),
            })?;

        DeepResearchConfig::default().save_to_file(&path)?;
        println!("✅ Configuration initialized at: {}", path.display());
        println!("📝 Add your API key there or export OPENAI_API_KEY.");
    }

    if show {
        let mut config = DeepResearchConfig::load(config_path)?;
        if config.provider.api_key.is_some() {
            config.provider.api_key = Some("********".to_string());
        }
        let rendered = toml::to_string_pretty(&config).map_err(|e| DeepResearchError::Internal {
            message: format!("Failed to render configuration: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("cli").with_operation("config_show"),
        })?;
        println!("📋 Current configuration:");
        println!("{}", rendered);
    }

    if validate {
        let config = DeepResearchConfig::load(config_path)?;
        config.validate()?;
        match config.require_api_key() {
            Ok(_) => println!("✅ Configuration is valid"),
            Err(e) => println!("⚠️  Configuration is valid but incomplete: {}", e),
        }
    }

    if !(show || init || validate) {
        println!("Nothing to do; pass --show, --init or --validate");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_research_args_parsing() {
        let cli = Cli::parse_from([
            "deepresearch",
            "research",
            "AI trends",
            "--mode",
            "websearch-only",
            "--no-clarification",
            "--depth",
            "fast",
        ]);

        let Commands::Research {
            query,
            mode,
            no_clarification,
            no_rewrite,
            depth,
            ..
        } = cli.command
        else {
            panic!("expected research command");
        };
        assert_eq!(query, "AI trends");
        assert_eq!(mode, ResearchMode::WebsearchOnly);
        assert!(no_clarification);
        assert!(!no_rewrite);
        assert_eq!(depth, Some(ResearchDepth::Fast));
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["deepresearch", "research", "q", "--mode", "gpt-2"]).is_err());
    }

    #[test]
    fn test_config_init_writes_file() {
        let dir = std::env::temp_dir().join(format!("deepresearch-cli-{}", std::process::id()));
        let path = dir.join("config.toml");

        handle_config(false, true, false, Some(&path)).unwrap();
        assert!(DeepResearchConfig::from_file(&path).is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }
}
