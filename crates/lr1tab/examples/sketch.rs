use lr1tab::{automaton::Automaton, grammar::Grammar, table::ParseTable};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let grammar = Grammar::define(|g| {
        g.add_production("A", ["E", "=", "E"])?;
        g.add_production("A", ["id"])?;
        g.add_production("E", ["E", "+", "T"])?;
        g.add_production("E", ["T"])?;
        g.add_production("T", ["num"])?;
        g.add_production("T", ["id"])?;
        g.start_symbol("A")?;
        Ok(())
    })?;
    println!("{}", grammar);

    let automaton = Automaton::generate(&grammar);
    println!("{}", automaton.display(&grammar));

    let table = ParseTable::generate(&grammar, &automaton);
    println!("{}", table.display(&grammar));
    for conflict in table.conflicts() {
        println!("{}", conflict.display(&grammar));
    }

    Ok(())
}
