use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use krishi_cli::{bootstrap, init_logging, output, StartupOptions};
use krishi_core::Error;
use krishi_hybrid::Assistant;

#[derive(Parser)]
#[command(name = "krishi", version, about = "Agricultural knowledge retrieval for farmer questions")]
struct Cli {
    /// Directory containing config.toml (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Skip the embedding backend and rank by keyword overlap only
    #[arg(long, global = true)]
    lexical_only: bool,

    /// Log progress at info level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a question from the knowledge base
    Query {
        question: String,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Prefer sources from this category ("all" for any)
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List the documents retrieved for a query
    Search {
        query: String,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Print the prompt context assembled for a query
    Context {
        query: String,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Document counts per category
    Categories,
    /// Print one document by id
    Show { id: String },
    /// Corpus size and embedding index state
    Status {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let opts = StartupOptions { config_dir: cli.config_dir, lexical_only: cli.lexical_only, progress: cli.verbose };
    let app = bootstrap(&opts)?;
    let default_k = app.settings.retrieval.top_k;

    match cli.command {
        Command::Query { question, top_k, category, json } => {
            let assistant = Assistant::new(app.retriever.clone(), top_k.unwrap_or(default_k));
            let answer = assistant.answer(&question, category.as_deref())?;
            if json {
                println!("{}", output::format_answer_json(question.trim(), &answer));
            } else {
                print!("{}", output::format_answer_human(&answer));
            }
        }
        Command::Search { query, top_k, json } => {
            let results = app.retriever.retrieve(&query, top_k.unwrap_or(default_k));
            if json {
                println!("{}", output::format_results_json(&query, &results));
            } else {
                println!("{}", output::format_results_human(&query, &results));
            }
        }
        Command::Context { query, top_k } => {
            let (context, _) = app.retriever.get_context(&query, top_k.unwrap_or(default_k));
            println!("{context}");
        }
        Command::Categories => println!("{}", output::format_categories(&app.retriever.corpus().categories())),
        Command::Show { id } => {
            let doc = app.retriever.corpus().find(&id).ok_or_else(|| Error::NotFound(format!("document {id}")))?;
            println!("{}", output::format_document(doc));
        }
        Command::Status { json } => {
            let status = app.retriever.status();
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("{}", output::format_status(&status));
            }
        }
    }
    Ok(())
}
