use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use randsent::{Grammar, SampleConfig, Sampler};
use std::io::{self, Write};
use std::path::PathBuf;

/// Generate random sentences from a PCFG
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the grammar file
    #[arg(short = 'g', long)]
    grammar: PathBuf,

    /// Start symbol of the grammar
    #[arg(short = 's', long, default_value = "ROOT")]
    start_symbol: String,

    /// Number of sentences to generate
    #[arg(short = 'n', long, default_value_t = 1)]
    num_sentences: usize,

    /// Max number of nonterminals to expand when generating a sentence
    #[arg(short = 'M', long, default_value_t = 450)]
    max_expansions: usize,

    /// Print the derivation tree for each generated sentence
    #[arg(short = 't', long)]
    tree: bool,

    /// With --tree, print bracket notation on one line instead of indenting
    #[arg(long, requires = "tree", conflicts_with = "json")]
    raw: bool,

    /// With --tree, print each derivation tree as JSON
    #[arg(long, requires = "tree")]
    json: bool,

    /// Seed for the random generator, for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let grammar = Grammar::from_file(&cli.grammar)?;
    let config = SampleConfig::default()
        .with_start_symbol(&cli.start_symbol)
        .with_max_expansions(cli.max_expansions)
        .with_tree(cli.tree);
    let sampler = Sampler::new(&grammar, config);

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for _ in 0..cli.num_sentences {
        let derivation = sampler.derive(&mut rng)?;
        if !sampler.config().tree {
            writeln!(out, "{}", derivation.to_flat())?;
        } else if cli.raw {
            writeln!(out, "{}", derivation.to_bracketed())?;
        } else if cli.json {
            writeln!(out, "{}", derivation.to_json()?)?;
        } else {
            writeln!(out, "{}", derivation.to_tree()?.pretty())?;
        }
    }

    Ok(())
}
