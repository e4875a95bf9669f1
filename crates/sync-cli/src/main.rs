use std::process::ExitCode;
use sync_cli::{cli, init_tracing, run, Invocation, EXIT_ERROR};

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();

    let invocation = match Invocation::from_matches(&matches) {
        Ok(invocation) => invocation,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::from(EXIT_ERROR);
        }
    };
    init_tracing(invocation.log_json);

    match run(&invocation).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
