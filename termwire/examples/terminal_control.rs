//! Terminal control example

use std::time::Duration;

use termwire::{CurrencyType, TcpChannel, Terminal, TransactionRequest, DEFAULT_PORT};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let ip = std::env::var("TERMINAL_IP").unwrap_or_else(|_| "192.168.1.50".to_string());

    let channel = TcpChannel::new(ip, DEFAULT_PORT).with_read_timeout(Duration::from_secs(30));
    let terminal = Terminal::new(channel);
    terminal.connect().await?;

    println!("Initializing...");
    let response = terminal.initialize().await?;
    println!("{}", response);

    // Rejected locally, nothing is sent
    let voucher_balance = TransactionRequest::balance_inquiry(8, CurrencyType::Voucher);
    if let Err(e) = terminal.execute(&voucher_balance).await {
        println!("Rejected: {}", e);
    }

    let balance = TransactionRequest::balance_inquiry(5, CurrencyType::FoodStamps);
    let response = terminal.execute(&balance).await?;
    println!("{}", response);

    println!("Resetting...");
    terminal.reset().await?;

    terminal.disconnect().await?;

    Ok(())
}
