//! Flow classifier CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use flowml_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use flowml_cli::commands::{
    run_evaluate, run_features, run_fit, run_predict, run_sample, run_synth,
};
use flowml_cli::logging::{LogConfig, LogFormat, init_logging};
use flowml_cli::summary::{
    print_features, print_fit_outcome, print_prediction_summary, print_report, print_sample,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match &cli.command {
        Command::Fit(args) => run_fit(args).map(|outcome| print_fit_outcome(&outcome, &args.output)),
        Command::Features(args) => run_features(&args.artifact).map(|schema| print_features(&schema)),
        Command::Predict(args) => run_predict(args).map(|outcome| {
            if let Some(path) = &args.output {
                println!("Predictions: {}", path.display());
            }
            print_prediction_summary(&outcome.summary);
        }),
        Command::Evaluate(args) => run_evaluate(args).map(|report| print_report(&report)),
        Command::Sample(args) => run_sample(args).map(|sample| {
            print_sample(&sample, &args.labeled_output, &args.features_output);
        }),
        Command::Synth(args) => run_synth(args).map(|batch| {
            println!(
                "Wrote {} synthetic rows to {}",
                batch.num_rows(),
                args.output.display()
            );
            println!("Synthetic values only exercise the pipeline; they say nothing about accuracy.");
        }),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
