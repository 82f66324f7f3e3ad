use clap::Parser;
use gprint::args::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            println!("{err}");
            std::process::exit(1);
        }
    };

    gprint::init_tracing();

    if let Err(err) = gprint::run(cli).await {
        println!("{err:#}");
        std::process::exit(1);
    }
}
