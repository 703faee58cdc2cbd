use std::error::Error;
use std::process;

use clap::Parser;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

#[derive(Parser)]
#[command(name = "met-client")]
#[command(about = "One-shot reading query against a running met-server")]
#[command(version = "0.1.0")]
struct Cli {
    /// Server host
    #[arg(default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(default_value_t = 30384)]
    port: u16,

    /// Print labelled fields, one per line
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("met-client: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut stream = TcpStream::connect((cli.host.as_str(), cli.port)).await?;
    let mut reply = String::new();
    stream.read_to_string(&mut reply).await?;

    if cli.verbose {
        let labels = [
            "temperature [C]",
            "pressure [hPa]",
            "humidity [%]",
            "wind speed [m/s]",
            "wind direction [deg]",
        ];
        for (label, value) in labels.iter().zip(reply.trim().split(',')) {
            println!("{:<22} {}", label, value);
        }
    } else {
        println!("{}", reply);
    }
    Ok(())
}
