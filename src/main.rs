use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use revdiff::{run_stream, wrap_fragment, RevdiffConfig, StreamingCounters};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let config = match RevdiffConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("revision-differ: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging.level);

    let mut input = wrap_fragment(io::stdin().lock(), config.stream.history_capacity);
    let out = BufWriter::new(io::stdout().lock());
    let counters = config.output.emit_counters.then(|| {
        StreamingCounters::new(
            io::stderr(),
            &config.output.counter_group,
            &config.output.counter_name,
        )
    });

    match run_stream(&mut input, &config, out, counters) {
        Ok(summary) => {
            info!(?summary, "revision_differ_done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, position = input.position(), "revision_differ_aborted");
            // Error first, then the retained tail of the input.
            let _ = writeln!(io::stderr().lock(), "{err}\n{}", input.history());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
