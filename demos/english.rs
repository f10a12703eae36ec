use rand::SeedableRng;
use rand::rngs::StdRng;
use randsent::{Grammar, GrammarBuilder, SampleConfig, Sampler};
use std::error::Error;

/// Sample sentences and trees from a grammar file and a grammar built in code
fn main() -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(465);

    // Example 1: load the bundled grammar
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/grammars/grammar.gr");
    let grammar = Grammar::from_file(path)?;
    println!("Loaded {} rules from {}", grammar.rule_count(), path);

    let sampler = Sampler::new(&grammar, SampleConfig::default());
    for (i, sentence) in sampler.sample_many(&mut rng, 5)?.iter().enumerate() {
        println!("{}. {}", i + 1, sentence);
    }

    // Example 2: a small grammar built programmatically, printed as trees
    let grammar = GrammarBuilder::new()
        .rule(1.0, "ROOT", &["GREETING", "SUBJECT"])
        .rule(3.0, "GREETING", &["hello"])
        .rule(1.0, "GREETING", &["hi"])
        .rule(1.0, "SUBJECT", &["world"])
        .rule(1.0, "SUBJECT", &["ADJ", "SUBJECT"])
        .rule(1.0, "ADJ", &["big"])
        .rule(1.0, "ADJ", &[])
        .build()?;

    let sampler = Sampler::new(&grammar, SampleConfig::default().with_max_expansions(8));

    println!("\nDerivation trees:");
    for _ in 0..3 {
        let derivation = sampler.derive(&mut rng)?;
        println!("{}", derivation.to_tree()?.pretty());
        println!("  => {:?} ({} expansions)", derivation.to_flat(), derivation.expansions());
    }

    Ok(())
}
