use clap::{Parser, Subcommand};
use num_bigint::BigUint;
use solomonoff::{
    analyze_complete, reachable_states, ConfigLoader, InductionError, Inductor, InductorConfig,
    InstructionTable, Prediction, ProgramCatalog, Step, TableLoader, TuringMachine,
    MAX_EXECUTION_STEPS,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Log search progress at debug level
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single instruction table on an input value
    Run {
        /// Name of an embedded program (see `list`)
        #[clap(short, long, conflicts_with = "table")]
        program: Option<String>,

        /// A table file, or the table text itself
        #[clap(short, long)]
        table: Option<String>,

        /// The value written onto the tape before the run
        #[clap(short, long, default_value_t = 0)]
        input: u64,

        /// Give up after this many steps
        #[clap(short, long, default_value_t = MAX_EXECUTION_STEPS)]
        max_steps: u64,

        /// Reject tables missing a rule for any selector of their states, or whose rules
        /// enter a state beyond them
        #[clap(long)]
        strict: bool,

        /// Print each step of the execution
        #[clap(short = 'd', long)]
        debug: bool,
    },

    /// Search for programs explaining the observations and print predictions
    Induce {
        /// JSON file with the inductor configuration
        #[clap(short, long)]
        config: Option<PathBuf>,

        /// Units of search work before each prediction
        #[clap(short, long, default_value_t = 10000)]
        advances: u64,

        /// An observed result and the input that follows it, as `RESULT:NEXT_INPUT`
        #[clap(short = 'o', long = "observe")]
        observations: Vec<Observation>,

        /// Print predictions as JSON
        #[clap(long)]
        json: bool,
    },

    /// List the embedded programs
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Observation {
    result: u64,
    next_input: u64,
}

impl FromStr for Observation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (result, next_input) = s
            .split_once(':')
            .ok_or_else(|| format!("expected RESULT:NEXT_INPUT, got '{s}'"))?;

        let number = |text: &str| {
            text.trim()
                .parse::<u64>()
                .map_err(|e| format!("invalid value '{text}': {e}"))
        };

        Ok(Self {
            result: number(result)?,
            next_input: number(next_input)?,
        })
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = execute(cli.command) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn execute(command: Command) -> Result<(), InductionError> {
    match command {
        Command::Run {
            program,
            table,
            input,
            max_steps,
            strict,
            debug,
        } => {
            let table = resolve_table(program.as_deref(), table.as_deref())?;
            if strict {
                analyze_complete(&table)?;
            }
            run(table, input, max_steps, debug);
            Ok(())
        }
        Command::Induce {
            config,
            advances,
            observations,
            json,
        } => {
            let config = match config {
                Some(path) => ConfigLoader::load_config(&path)?,
                None => InductorConfig::default(),
            };
            induce(config, advances, &observations, json)
        }
        Command::List => {
            list()?;
            Ok(())
        }
    }
}

/// Picks the table named by `--program`, or reads `--table` as a file path when such a
/// file exists and as table text otherwise.
fn resolve_table(
    program: Option<&str>,
    table: Option<&str>,
) -> Result<InstructionTable, InductionError> {
    match (program, table) {
        (Some(name), _) => Ok(ProgramCatalog::get_by_name(name)?.table),
        (None, Some(table)) => {
            let path = Path::new(table);
            if path.is_file() {
                TableLoader::load_table(path)
            } else {
                TableLoader::load_table_from_string(table)
            }
        }
        (None, None) => Err(InductionError::ValidationError(
            "either --program or --table is required".to_string(),
        )),
    }
}

fn run(table: InstructionTable, input: u64, max_steps: u64, debug: bool) {
    let states = reachable_states(&table);
    let mut machine = TuringMachine::new(table, &BigUint::from(input));

    if debug {
        let print_state = |machine: &TuringMachine| {
            println!(
                "Step: {}, State: {}, Head: {}, Tape: {}",
                machine.elapsed_steps(),
                machine.state(),
                machine.position(),
                machine.render_tape()
            );
        };

        print_state(&machine);
        while machine.outcome() == Step::Running && machine.elapsed_steps() < max_steps {
            machine = machine.advance_one_step();
            print_state(&machine);
        }
        println!();
    } else {
        machine = machine.advance(max_steps);
    }

    println!("Reachable states: {states:?}");
    match machine.outcome() {
        Step::Halted => {
            let result = machine.decoded_result().unwrap_or_default();
            println!(
                "Halted after {} steps with result {}",
                machine.elapsed_steps(),
                result
            );
        }
        Step::Looping => println!(
            "Loops forever (detected after {} steps)",
            machine.elapsed_steps()
        ),
        Step::Running => println!("Still running after {} steps", machine.elapsed_steps()),
    }
    println!("{}", machine.render_tape());
}

fn induce(
    config: InductorConfig,
    advances: u64,
    observations: &[Observation],
    json: bool,
) -> Result<(), InductionError> {
    let mut inductor = Inductor::with_config(config)?;

    search(&mut inductor, advances)?;
    print_prediction(&inductor.predict(), json)?;

    for observation in observations {
        info!(
            result = observation.result,
            next_input = observation.next_input,
            "Observing"
        );
        inductor.observe(observation.result, observation.next_input);

        search(&mut inductor, advances)?;
        print_prediction(&inductor.predict(), json)?;
    }

    Ok(())
}

fn search(inductor: &mut Inductor, advances: u64) -> Result<(), InductionError> {
    for _ in 0..advances {
        inductor.advance()?;
    }

    info!(
        input = %inductor.input(),
        materialized = inductor.materialized(),
        frontier = inductor.frontier_len(),
        finished = inductor.finished_len(),
        "Search paused"
    );
    Ok(())
}

fn print_prediction(prediction: &Prediction, json: bool) -> Result<(), InductionError> {
    let report = prediction.to_report();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for entry in &report.entries {
        println!("{:>12}: {:.6}", entry.outcome, entry.approximate);
    }
    if let Some((outcome, _)) = prediction.most_likely() {
        println!("Most likely: {outcome}");
    }
    println!();
    Ok(())
}

fn list() -> Result<(), InductionError> {
    for index in 0..ProgramCatalog::count() {
        let info = ProgramCatalog::info(index)?;
        println!(
            "{:<16} {} states, {} rules  {}",
            info.name, info.state_count, info.rule_count, info.description
        );
    }
    Ok(())
}
