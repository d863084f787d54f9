use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "sqlgate")]
#[command(about = "Ask questions about the commissions database in plain language", long_about = None)]
pub struct Args {
    #[arg(short = 'n', long = "new", help = "Start a new conversation")]
    pub new_conversation: bool,

    #[arg(long = "clear", help = "Clear all conversation history")]
    pub clear_history: bool,

    #[arg(
        long = "validate",
        value_name = "SQL",
        help = "Check a SQL statement against the guardrail and exit"
    )]
    pub validate: Option<String>,

    #[arg(long = "show-sql", help = "Print the queries that were executed")]
    pub show_sql: bool,

    #[arg(short = 'v', long = "verbose", help = "Print diagnostics to stderr")]
    pub verbose: bool,

    #[arg(long = "config-init", help = "Write an example config file")]
    pub config_init: bool,

    #[arg(
        long = "api-endpoint",
        help = "Custom API base URL (e.g., http://localhost:11434/v1)"
    )]
    pub api_endpoint: Option<String>,

    #[arg(long = "model", help = "Model identifier to use")]
    pub model: Option<String>,

    #[arg(help = "Question to ask")]
    pub message: Vec<String>,
}
