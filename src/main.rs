use clap::Parser;
use colored::*;
use std::process;
use std::sync::Arc;

use sqlgate::api::OpenAiCompatibleModel;
use sqlgate::backend::HttpRpcBackend;
use sqlgate::cli::Args;
use sqlgate::config::{resolve_allowed_tables, Config, JsonConfig};
use sqlgate::error::Result;
use sqlgate::gateway::{ChatRequest, Gateway};
use sqlgate::guardrail::SqlGuardrail;
use sqlgate::orchestrator::Orchestrator;
use sqlgate::session::{ConversationStore, FilesystemConversationStore};
use sqlgate::tools::format_tools_for_llm;
use sqlgate::ui::{display_answer, display_queries, display_verdict};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("{} {}", "Error:".red(), e);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    if args.config_init {
        let path = JsonConfig::write_example()?;
        println!("{}", format!("Wrote example config to {}", path.display()).green());
        return Ok(());
    }

    if let Some(sql) = &args.validate {
        // Offline check: no keys or backend needed
        let json_config = JsonConfig::load()?;
        let guardrail = SqlGuardrail::new(resolve_allowed_tables(&json_config));
        let verdict = guardrail.validate(sql);
        display_verdict(sql, &verdict);
        if !verdict.is_valid() {
            process::exit(1);
        }
        return Ok(());
    }

    let store = Arc::new(FilesystemConversationStore::in_home_cache()?);

    if args.clear_history {
        store.clear_all()?;
        println!("{}", "All conversation history cleared.".green());
        return Ok(());
    }

    if args.message.is_empty() {
        print_usage();
        process::exit(1);
    }

    let message = args.message.join(" ");
    let config = Config::from_env_and_args(&args)?;

    let guardrail = Arc::new(SqlGuardrail::new(&config.allowed_tables));
    let model = OpenAiCompatibleModel::new(
        &config.api_key,
        &config.api_endpoint,
        &config.model,
        format_tools_for_llm(&guardrail),
        config.api_timeout,
        config.verbose,
    )?;
    let backend = HttpRpcBackend::new(
        &config.rpc_url,
        &config.service_key,
        config.db_timeout,
        config.verbose,
    )?;

    if config.verbose {
        eprintln!(
            "{}",
            format!(
                "[AI] Using model: {} via {}",
                config.model, config.api_endpoint
            )
            .dimmed()
        );
    }

    let orchestrator = Orchestrator::new(Arc::new(model), Arc::new(backend), guardrail)
        .with_max_iterations(config.max_iterations)
        .with_verbose(config.verbose);
    let gateway = Gateway::from_config(&config, orchestrator, store.clone());

    let mut request = ChatRequest::new(message);
    if !args.new_conversation {
        if let Some(recent) = store.find_recent() {
            request = request.with_conversation(recent.conversation_id);
        }
    }

    let response = gateway.handle(request).await?;
    display_answer(&response);

    if args.show_sql {
        display_queries(&response.metadata.queries);
    }

    if response.metadata.error {
        process::exit(1);
    }

    Ok(())
}

fn print_usage() {
    eprintln!("{}", "Usage: sqlgate [OPTIONS] <question>".red());
    eprintln!(
        "{}",
        "  -n, --new                  Start a new conversation".dimmed()
    );
    eprintln!(
        "{}",
        "      --validate <SQL>       Check a statement against the guardrail".dimmed()
    );
    eprintln!(
        "{}",
        "      --show-sql             Print the queries that were executed".dimmed()
    );
    eprintln!(
        "{}",
        "      --clear                Clear all conversation history".dimmed()
    );
    eprintln!(
        "{}",
        "      --config-init          Write an example config file".dimmed()
    );
    eprintln!(
        "{}",
        "  -v, --verbose              Print diagnostics to stderr".dimmed()
    );
}
