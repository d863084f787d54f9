use crate::gateway::{ChatResponse, ExecutedQuery};
use crate::guardrail::ValidationResult;
use colored::*;

/// Display the final answer
pub fn display_answer(response: &ChatResponse) {
    if response.metadata.error {
        println!("{}", response.message.red());
    } else {
        println!("{}", response.message.trim_end());
    }
}

/// Display executed queries in a boxed format
pub fn display_queries(queries: &[ExecutedQuery]) {
    if queries.is_empty() {
        println!("{}", "\n(no queries executed)".dimmed());
        return;
    }

    println!("{}", "\n---\nQueries:".dimmed());
    for (index, query) in queries.iter().enumerate() {
        println!("{}", format!("[{}] {}", index + 1, query.query).cyan());
        match (&query.error, query.row_count) {
            (Some(error), _) => println!("{}", format!("    error: {}", error).red()),
            (None, Some(count)) => println!("{}", format!("    {} row(s)", count).dimmed()),
            (None, None) => println!("{}", "    ok".dimmed()),
        }
    }
}

/// Display a guardrail verdict
pub fn display_verdict(sql: &str, verdict: &ValidationResult) {
    println!("{}", sql.trim().dimmed());
    match (verdict.operation(), verdict.error()) {
        (Some(operation), _) => println!("{} {}", "allowed:".green(), operation),
        (None, Some(error)) => println!("{} {}", "rejected:".red(), error),
        (None, None) => println!("{}", "rejected".red()),
    }
}
