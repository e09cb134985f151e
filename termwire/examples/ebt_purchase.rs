//! EBT purchase example

use termwire::{CurrencyType, Decimal, TcpChannel, Terminal, TransactionRequest, DEFAULT_PORT};
use termwire_core::framer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("termwire=info".parse()?))
        .init();

    let ip = std::env::var("TERMINAL_IP").unwrap_or_else(|_| "192.168.1.50".to_string());

    let terminal = Terminal::new(TcpChannel::new(ip, DEFAULT_PORT));
    terminal.connect().await?;

    println!("Terminal connected!");

    let request = TransactionRequest::purchase(1, Decimal::new(1000, 2), CurrencyType::FoodStamps)
        .with_allow_duplicates(true);

    let response = terminal
        .execute_observed(&request, |bytes| println!("-> {}", framer::render(bytes)))
        .await?;

    println!("{}", response);
    println!("Approved: {}", response.is_success());

    terminal.disconnect().await?;

    Ok(())
}
