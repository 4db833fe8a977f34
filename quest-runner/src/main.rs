use anyhow::{anyhow, Context, Result};
use clap::{arg, ArgAction, Command};
use env_logger::Env;
use quest_runner::{run_stream, RunOptions};
use quest_tree::{generate_blocks, WorkloadSettings};
use std::{
    fs,
    io::{self, BufReader, Write},
};

fn cli() -> Command {
    Command::new("quest-runner")
        .about("Runs budget queries over effort/gold command blocks")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Runs command blocks and prints one profit per query")
                .arg(
                    arg!([INPUT] "Path to a command file, or '-' for stdin")
                        .default_value("-")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--json "Print one JSON report per block")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--check "Verify tree invariants after every command")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Generates random command blocks")
                .arg(
                    arg!(<SETTINGS> "Settings json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("run", sub_m)) => run(
            sub_m.get_one::<String>("INPUT").unwrap().clone(),
            RunOptions {
                json: sub_m.get_flag("json"),
                check: sub_m.get_flag("check"),
            },
        ),
        Some(("generate", sub_m)) => {
            generate(sub_m.get_one::<String>("SETTINGS").unwrap().clone())
        }
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(input: String, options: RunOptions) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = io::BufWriter::new(stdout.lock());
    if input == "-" {
        run_stream(io::stdin().lock(), &mut writer, &options)?;
    } else {
        let file = fs::File::open(&input)
            .with_context(|| format!("Failed to open command file: {}", input))?;
        run_stream(BufReader::new(file), &mut writer, &options)?;
    }
    Ok(())
}

fn generate(settings: String) -> Result<()> {
    let settings = load_settings(&settings)?;
    let blocks = generate_blocks(&settings)?;

    let stdout = io::stdout();
    let mut writer = io::BufWriter::new(stdout.lock());
    for block in &blocks {
        write!(writer, "{}", block)?;
    }
    writer.flush()?;
    Ok(())
}

fn load_settings(settings: &str) -> Result<WorkloadSettings> {
    let settings = if settings.ends_with(".json") {
        fs::read_to_string(settings)
            .with_context(|| format!("Failed to read settings file: {}", settings))?
    } else {
        settings.to_string()
    };
    WorkloadSettings::from_json(&settings)
}
