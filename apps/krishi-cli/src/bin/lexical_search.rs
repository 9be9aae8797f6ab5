use std::env;
use std::path::PathBuf;

use krishi_cli::{bootstrap, init_logging, StartupOptions};
use krishi_lexical::{query_terms, LexicalIndex};

fn main() -> anyhow::Result<()> {
    init_logging(false);
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <query> [--limit N] [config_dir]", args[0]);
        eprintln!("Example: {} 'aphids on mustard' --limit 5 .", args[0]);
        std::process::exit(1);
    }
    let query = &args[1];
    let mut limit = 10usize;
    let mut config_dir = None;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--limit" => match args.get(i + 1).and_then(|l| l.parse::<usize>().ok()) {
                Some(l) => { limit = l; i += 1; }
                None => { eprintln!("Error: --limit requires a number"); std::process::exit(1); }
            },
            arg if !arg.starts_with('-') => config_dir = Some(PathBuf::from(arg)),
            _ => {}
        }
        i += 1;
    }

    let app = bootstrap(&StartupOptions { config_dir, lexical_only: true, progress: false })?;
    let corpus = app.retriever.corpus();
    let index = LexicalIndex::new(corpus);

    println!("🔍 krishi-lexical-search\n=======================");
    println!("Query: {query}");
    println!("Terms: {:?}", query_terms(query));
    let hits = index.search(query, limit);
    println!("\n🔍 Found {} results for: \"{}\"", hits.len(), query);
    for (i, hit) in hits.iter().enumerate() {
        let Some(doc) = corpus.get(hit.position) else { continue };
        println!("\n  {}. score={}  id={}  category={}", i + 1, hit.score, doc.id, doc.category);
        println!("     📝 {}", doc.title);
    }
    Ok(())
}
