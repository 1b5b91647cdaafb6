// src/main.rs

use taskwatch::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(exit) => std::process::exit(exit.code()),
        Err(err) => {
            eprintln!("taskwatch error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<taskwatch::Exit> {
    let args = cli::parse();
    logging::init_logging(args.build.log_level)?;
    run(args).await
}
