//! Rolls dice expressions from the command line, or interactively when none
//! are given.

use clap::Parser;
use dicelang::{
    roll::{RollResult, TermTrace},
    EvalConfig, Evaluation, RandomSource,
};
use rand::{rngs::StdRng, SeedableRng};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "dicelang", about = "Roll tabletop dice expressions", version)]
struct Cli {
    /// Expressions to roll, e.g. "4d6kh3" or "1d20adv + 5 >= 15"
    expressions: Vec<String>,

    /// Seed the random source for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Most dice one expression may roll; 0 removes the limit
    #[arg(long, default_value_t = EvalConfig::DEFAULT_MAX_ROLLS)]
    max_rolls: usize,

    /// Also print each arithmetic step
    #[arg(long)]
    steps: bool,

    /// Log level (-v=info, -vv=debug, -vvv=trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn str_roll(roll: &RollResult) -> String {
    let mut ret = roll
        .history()
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" -> ");
    if roll.exploded {
        ret.push('!');
    }
    if roll.flags.critical {
        ret.push('*');
    }
    if !roll.kept {
        ret = format!("~~{}~~", ret);
    }
    ret
}

fn str_term(term: &TermTrace) -> String {
    let rolls = term
        .rolls
        .iter()
        .map(str_roll)
        .collect::<Vec<_>>()
        .join(", ");
    let mut ret = format!("{} ({}) = {}", term.notation, rolls, term.value);
    if term.successes + term.failures > 0 {
        ret.push_str(&format!(
            " [{} successes, {} failures]",
            term.successes, term.failures
        ));
    }
    ret
}

fn report(source: &str, evaluation: &Evaluation, steps: bool) {
    for term in &evaluation.trace.terms {
        println!("  {}", str_term(term));
    }
    if steps {
        for step in &evaluation.trace.reductions {
            println!("  {}", step);
        }
    }
    println!("{} = {}", source.trim(), evaluation.value);
}

fn run(source: &str, rng: &mut dyn RandomSource, config: EvalConfig, steps: bool) {
    let result = dicelang::parse(source)
        .map_err(dicelang::Error::from)
        .and_then(|ast| Ok(dicelang::evaluate_with(&ast, rng, config)?));
    match result {
        Ok(evaluation) => report(source, &evaluation, steps),
        Err(why) => eprintln!("Error: {}", why),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.max_rolls {
        0 => EvalConfig::unbounded(),
        n => EvalConfig::bounded(n),
    };
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if !cli.expressions.is_empty() {
        for source in &cli.expressions {
            run(source, &mut rng, config, cli.steps);
        }
        return Ok(());
    }

    let stdin = io::stdin();
    print!("> ");
    io::stdout().flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            run(&line, &mut rng, config, cli.steps);
        }
        print!("> ");
        io::stdout().flush()?;
    }
    Ok(())
}
