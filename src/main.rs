use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = portward::cli::Cli::parse();
    if let Err(e) = portward::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
