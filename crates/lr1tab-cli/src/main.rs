use anyhow::Context as _;
use clap::Parser;
use lr1tab::{automaton::Automaton, grammar::Grammar, syntax, table::ParseTable};
use std::{path::PathBuf, time::Instant};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The path of grammar definition file.
    input: PathBuf,

    /// Override the start symbol of the grammar.
    #[arg(long, value_name = "SYMBOL")]
    start: Option<String>,

    /// Dump the item sets and transitions of the automaton.
    #[arg(long)]
    automaton: bool,

    /// Fail if the tables contain any conflict.
    #[arg(long)]
    deny_conflicts: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::trace!("CLI args = {:?}", args);

    let mut desc = syntax::parse_file(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    if let Some(start) = args.start {
        desc.start = Some(start);
    }
    let grammar = Grammar::from_desc(&desc).context("invalid grammar definition")?;
    println!("{}", grammar);

    let mut empty_nonterminals = vec![];
    for nonterminal in grammar.nonterminals.values().skip(1) {
        if grammar.productions_of(nonterminal.id()).is_empty() {
            empty_nonterminals.push(nonterminal.name());
        }
    }
    if !empty_nonterminals.is_empty() {
        println!(
            "[warning] The following nonterminals have no associated production rule: {:?}",
            empty_nonterminals
        );
    }

    let timer = Instant::now();
    let automaton = Automaton::generate(&grammar);
    tracing::info!("automaton generated in {:?}", timer.elapsed());

    if args.automaton {
        println!("{}", automaton.display(&grammar));
    }

    let timer = Instant::now();
    let table = ParseTable::generate(&grammar, &automaton);
    tracing::info!("tables generated in {:?}", timer.elapsed());

    println!("{}", table.display(&grammar));

    for conflict in table.conflicts() {
        println!("[warning] {}", conflict.display(&grammar));
    }
    if args.deny_conflicts && !table.conflicts().is_empty() {
        let num_conflicts = table.conflicts().len();
        let suffix = if num_conflicts == 1 { "" } else { "s" };
        anyhow::bail!("the tables have {} conflict{}", num_conflicts, suffix);
    }

    Ok(())
}
