use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use randsent::{DerivationNode, Grammar, GrammarError, SampleConfig, Sampler, sample};
use std::io::Write;
use tempfile::NamedTempFile;

const ENGLISH: &str = "\
# Symbols in the grammar are case-sensitive.
#
#    ROOT -> S .
1\tROOT\tS .
1\tROOT\tS !
1\tROOT\tis it true that S ?     # mixing terminals and nonterminals is ok.

1\tS\tNP VP
1\tVP\tVerb NP
1\tNP\tDet Noun
0.3\tNP\tNP PP
1 PP Prep NP
1 Noun president
1 Noun sandwich
1 Noun pickle
1 Noun chief of staff
1 Noun floor
1\tVerb\tate
1\tVerb\twanted
1\tVerb\tkissed
1 Det the
1 Det a
1 Det every
1 Prep with
1 Prep on
1 Prep under
";

fn grammar_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = grammar_file(ENGLISH);
    let grammar = Grammar::from_file(file.path()).unwrap();

    assert_eq!(grammar.rule_count(), 22);
    assert!(grammar.is_nonterminal("ROOT"));
    assert!(!grammar.is_nonterminal("president"));
    assert_eq!(grammar.rules_for("ROOT")[2].rhs, vec!["is", "it", "true", "that", "S", "?"]);
    assert_eq!(grammar.rules_for("Noun")[3].rhs, vec!["chief", "of", "staff"]);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Grammar::from_file(dir.path().join("nope.gr"));
    assert!(matches!(result, Err(GrammarError::Io(_))));
}

#[test]
fn test_malformed_file_reports_line() {
    let file = grammar_file("1 ROOT S\n# fine\nheavy S x\n");
    match Grammar::from_file(file.path()) {
        Err(GrammarError::MalformedRule { line, text }) => {
            assert_eq!(line, 3);
            assert_eq!(text, "heavy S x");
        }
        other => panic!("Expected MalformedRule, got {:?}", other),
    }
}

#[test]
fn test_comment_only_file() {
    let file = grammar_file("# nothing here\n\n\t\n   # still nothing\n");
    let grammar = Grammar::from_file(file.path()).unwrap();
    assert!(grammar.is_empty());
    assert!(grammar.rules_for("ROOT").is_empty());
}

#[test]
fn test_sentences_end_in_punctuation() {
    let grammar = Grammar::parse(ENGLISH).unwrap();
    let sampler = Sampler::new(&grammar, SampleConfig::default());
    let mut rng = StdRng::seed_from_u64(601);

    for sentence in sampler.sample_many(&mut rng, 50).unwrap() {
        let last = sentence.split(' ').last().unwrap();
        assert!(
            last == "." || last == "!" || last == "?" || last == "...",
            "unexpected ending: {}",
            sentence
        );
    }
}

#[test]
fn test_weighted_distribution() {
    let grammar = Grammar::parse("1 ROOT a\n3 ROOT b\n").unwrap();
    let sampler = Sampler::new(&grammar, SampleConfig::default());
    let mut rng = StdRng::seed_from_u64(465);

    let samples = sampler.sample_many(&mut rng, 10_000).unwrap();
    let a = samples.iter().filter(|s| s.as_str() == "a").count();
    let b = samples.iter().filter(|s| s.as_str() == "b").count();

    assert_eq!(a + b, 10_000);
    // expected 2500 with a standard deviation of about 43
    assert!((2300..=2700).contains(&a), "a was chosen {} times", a);
}

#[test]
fn test_self_recursion_terminates() {
    let grammar = Grammar::parse("1 S S\n").unwrap();
    let sampler = Sampler::new(&grammar, SampleConfig::new("S", 5, true));
    let mut rng = StdRng::seed_from_u64(5);

    let derivation = sampler.derive(&mut rng).unwrap();
    assert!(derivation.expansions() <= 5);
    assert!(sampler.sample(&mut rng).unwrap().contains("..."));
}

#[test]
fn test_tree_and_flat_agree() {
    let grammar = Grammar::parse(ENGLISH).unwrap();

    for seed in 0..25 {
        let flat = sample(&grammar, "ROOT", 30, false, &mut StdRng::seed_from_u64(seed)).unwrap();
        let tree = sample(&grammar, "ROOT", 30, true, &mut StdRng::seed_from_u64(seed)).unwrap();

        let parsed = DerivationNode::from_bracketed(&tree).unwrap();
        assert_eq!(parsed.yield_terminals().join(" "), flat);
        assert_eq!(parsed.to_bracketed(), tree);
    }
}

#[test]
fn test_tree_and_flat_agree_with_empty_rules() {
    let grammar = Grammar::parse(
        "1 ROOT S\n\
         2 S A S\n\
         1 S\n\
         1 A a\n\
         1 A\n\
         1 A B A\n\
         1 B b\n\
         1 B\n",
    )
    .unwrap();

    let mut saw_placeholder = false;
    let mut saw_empty = false;
    for seed in 0..60 {
        let flat = sample(&grammar, "ROOT", 6, false, &mut StdRng::seed_from_u64(seed)).unwrap();
        let tree = sample(&grammar, "ROOT", 6, true, &mut StdRng::seed_from_u64(seed)).unwrap();

        let parsed = DerivationNode::from_bracketed(&tree).unwrap();
        assert_eq!(flat.split_whitespace().collect::<Vec<_>>(), parsed.yield_terminals());
        saw_placeholder |= tree.contains("...");
        saw_empty |= tree.contains("(S)") || tree.contains("(A)") || tree.contains("(B)");
    }
    assert!(saw_placeholder);
    assert!(saw_empty);
}

#[test]
fn test_epsilon_rule_from_file() {
    let file = grammar_file("1 ROOT NP\n1 NP DET dog\n1 DET\n");
    let grammar = Grammar::from_file(file.path()).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    assert_eq!(sample(&grammar, "ROOT", 450, true, &mut rng).unwrap(), "(ROOT (NP (DET) dog))");
    assert_eq!(sample(&grammar, "DET", 450, false, &mut rng).unwrap(), "");
}

#[test]
fn test_same_seed_same_output() {
    let grammar = Grammar::parse(ENGLISH).unwrap();
    let sampler = Sampler::new(&grammar, SampleConfig::new("ROOT", 450, true));

    let first = sampler.sample_many(&mut StdRng::seed_from_u64(9), 10).unwrap();
    let second = sampler.sample_many(&mut StdRng::seed_from_u64(9), 10).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_grammar_shared_across_threads() {
    let grammar = Grammar::parse(ENGLISH).unwrap();
    let grammar = &grammar;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4u64)
            .map(|seed| {
                scope.spawn(move || {
                    let sampler = Sampler::new(grammar, SampleConfig::new("ROOT", 20, false));
                    let mut rng = StdRng::seed_from_u64(seed);
                    sampler.sample_many(&mut rng, 100).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().len(), 100);
        }
    });
}

#[test]
fn test_pretty_tree_from_sampler() {
    let grammar = Grammar::parse("1 ROOT NP VP\n1 NP Det Noun\n1 Det the\n1 Noun cat\n1 VP sleeps\n").unwrap();
    let sampler = Sampler::new(&grammar, SampleConfig::new("ROOT", 450, true));
    let mut rng = StdRng::seed_from_u64(1);

    let tree = sampler.derive(&mut rng).unwrap().to_tree().unwrap();
    let expected = "\
(ROOT (NP (Det the)
          (Noun cat))
      (VP sleeps))";
    assert_eq!(tree.pretty(), expected);
}
