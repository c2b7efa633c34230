use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // A .env file is optional.
    let _ = dotenvy::dotenv();

    match leetmate_render::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
