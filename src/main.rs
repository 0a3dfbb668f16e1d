use std::process::ExitCode;

use clap::Parser;

use symptom_triage_lib::config::ServerArgs;

#[tokio::main]
async fn main() -> ExitCode {
    let args = ServerArgs::parse();
    symptom_triage_lib::init_tracing();

    match symptom_triage_lib::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
