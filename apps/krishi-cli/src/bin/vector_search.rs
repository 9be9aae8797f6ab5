use std::env;
use std::path::PathBuf;

use krishi_cli::{bootstrap, init_logging, StartupOptions};

/// Raw cosine ranking, before the relevance threshold is applied.
fn main() -> anyhow::Result<()> {
    init_logging(false);
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <query> [--limit N] [config_dir]", args[0]);
        eprintln!("Example: {} 'when to irrigate wheat' --limit 5 .", args[0]);
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

    let app = bootstrap(&StartupOptions { config_dir, lexical_only: false, progress: true })?;
    let Some(index) = app.retriever.index().as_ready() else {
        let reason = app.retriever.index().unavailable_reason().unwrap_or("unknown");
        anyhow::bail!("embedding index unavailable: {reason}");
    };

    println!("🔍 krishi-vector-search\n======================");
    println!("Query: {query}");
    println!("Embedder: {} ({} dims)", index.embedder_id(), index.dim());
    let threshold = app.retriever.relevance_threshold();
    let hits = index.search(query, limit)?;
    println!("\n🔍 Found {} results for: \"{}\" (threshold {threshold})", hits.len(), query);
    for (i, hit) in hits.iter().enumerate() {
        let Some(doc) = index.corpus().get(hit.position) else { continue };
        let mark = if hit.score > threshold { "✓" } else { "·" };
        println!("\n  {}. {mark} score={:.4}  id={}  category={}", i + 1, hit.score, doc.id, doc.category);
        println!("     📝 {}", doc.title);
    }
    Ok(())
}
