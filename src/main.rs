use clap::{ArgMatches, Command};
use plotgen_rust::{
    cases::ALL_CASES,
    config::RunConfig,
    parallel::run_cases,
};
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("run", sub_matches)) => {
            if let Err(e) = run_plots(sub_matches) {
                eprintln!("Run error: {}", e);
                std::process::exit(1);
            }
        }
        Some(("list-cases", _)) => list_cases(),
        _ => {
            eprintln!("Please specify a subcommand. Use --help for more information.");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("plotgen_rust=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("plotgen_rust=info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run_plots(matches: &ArgMatches) -> Result<(), String> {
    let config = RunConfig::from_matches(matches)?;
    init_tracing(config.verbose);

    println!("Host output: {}", config.roots.host_output.display());
    println!("Plot references: {}", config.plot_references);

    let outcomes = run_cases(&config)?;

    let mut failed = 0;
    for (name, result) in &outcomes {
        match result {
            Ok(report) => print!("{}", report),
            Err(e) => {
                failed += 1;
                println!("{}: failed: {}", name, e);
            }
        }
    }

    println!("{} of {} cases completed", outcomes.len() - failed, outcomes.len());
    if failed == outcomes.len() && failed > 0 {
        return Err("No case could be processed".to_string());
    }
    Ok(())
}

fn list_cases() {
    for case in ALL_CASES {
        let groups: Vec<String> = case.groups.iter().map(|g| g.to_string()).collect();
        println!(
            "{:<14} {:>5}-{:<5} min  {:>6}-{:<6} m  [{}]  {}",
            case.name,
            case.start_minutes,
            case.end_minutes,
            case.height_min,
            case.height_max,
            groups.join(", "),
            case.description
        );
    }
}

fn build_cli() -> Command {
    Command::new("plotgen_rust")
        .version("0.1.0")
        .about("Resolve atmospheric model output into panels against benchmark runs")
        .subcommand_required(true)
        .subcommand(RunConfig::command())
        .subcommand(Command::new("list-cases").about("List the benchmark case catalog"))
}
