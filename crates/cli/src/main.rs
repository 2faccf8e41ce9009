use anyhow::{Context, Result};
use cmdline_parser::ArgumentParser;
use std::io::Write;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    init_tracing();

    let mut parser = build_parser();
    let argv = std::env::args_os().map(|arg| arg.to_string_lossy().into_owned());
    let ok = parser.process(argv);
    if parser.help_requested() {
        return Ok(());
    }
    if !ok {
        println!("{}", parser.error_message());
        parser.check()?;
    }
    tracing::debug!(application = parser.application_name(), "arguments processed");

    let mut stdout = std::io::stdout().lock();
    if parser.is_set("json").0 {
        let json = serde_json::to_string_pretty(&parser.report())
            .context("failed to serialize parse report")?;
        writeln!(stdout, "{json}").context("failed to write to stdout")?;
    } else {
        let verbose = parser.is_set("verbose").0;
        write_summary(&mut stdout, &parser, verbose).context("failed to write to stdout")?;
    }

    Ok(())
}

fn build_parser() -> ArgumentParser {
    let mut parser = ArgumentParser::new();
    parser.add_positional_argument_with("source", "Input file", "file-path");
    parser.add_option("v", "List options that were not set").alias("verbose");
    parser
        .add_option("o", "Output file")
        .alias("output")
        .hint("file-path");
    parser.add_option("json", "Print the parse result as JSON");
    parser
}

fn write_summary(
    out: &mut impl Write,
    parser: &ArgumentParser,
    verbose: bool,
) -> std::io::Result<()> {
    for option in parser.options() {
        match (option.is_enabled(), option.value()) {
            (true, "") => writeln!(out, "{}", option.name())?,
            (true, value) => writeln!(out, "{} = {value}", option.name())?,
            (false, _) if verbose => writeln!(out, "{} (not set)", option.name())?,
            (false, _) => {}
        }
    }
    for arg in parser.positional_arguments() {
        writeln!(out, "{}: {}", arg.name(), arg.value())?;
    }
    for extra in parser.extra_arguments() {
        writeln!(out, "ignored: {extra}")?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
