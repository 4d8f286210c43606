use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap::error::ErrorKind;
use owo_colors::OwoColorize;
use recap::app::{Collaborators, RunOptions, load_config, run_pipeline};
use recap::cli::{Cli, Commands};
use recap::diagnostics::check_dependencies;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            // clap exits with 2 on usage errors; every failure here exits 1
            eprint!("{e}");
            std::process::exit(1);
        }
    };

    recap::logging::init(cli.quiet, cli.verbose);

    match cli.command {
        Some(Commands::Check) => {
            if !check_dependencies() {
                anyhow::bail!("required tools are missing");
            }
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "recap", &mut std::io::stdout());
        }
        None => run(cli).await,
    }

    Ok(())
}

/// Run the full pipeline for `cli.input`, exiting with status 1 on failure.
async fn run(cli: Cli) {
    let Some(input) = cli.input.as_deref() else {
        eprintln!("{}", Cli::command().render_usage());
        std::process::exit(1);
    };

    let mut config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    if let Some(model) = &cli.model {
        config.model_id = model.clone();
    }
    if let Some(language) = &cli.language {
        config.language_code = language.clone();
    }

    let mut options = RunOptions::new(input);
    options.prompt_path = cli.prompt.clone();
    options.output_path = cli.output.clone();
    options.poll = cli.poll_policy();

    match run_pipeline(&config, &options, &Collaborators::system()).await {
        Ok(summary) => {
            if !cli.quiet {
                println!(
                    "{} Result written to {}",
                    "Done.".green(),
                    summary.output_path.display()
                );
            }
        }
        Err(e) => fail(&e),
    }
}

fn fail(error: &recap::PipelineError) -> ! {
    eprintln!("{}", error.to_string().red());
    std::process::exit(1);
}
