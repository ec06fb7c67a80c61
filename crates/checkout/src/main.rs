//! Checkout client entry point.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use checkout::cli::{Cli, Command};
use checkout::config::{Config, LogFormat};
use checkout::console::{ConsoleReporter, render_orders, render_progress};
use clap::Parser;
use common::{BuyerId, ProductId};
use settlement::{Checkout, OrderIntent, coerce_quantity};
use tokio::signal;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use transport::HttpTransport;

/// Waits for an interrupt (SIGINT or SIGTERM).
async fn interrupt_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = signal::ctrl_c() => res,
            _ = terminate.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 1. Load configuration and initialize tracing
    let config = Config::from_env();
    init_tracing(&config);

    // 2. Build the transport
    let transport = HttpTransport::new(&config.backend_url, config.request_timeout)
        .context("failed to build HTTP client")?;
    tracing::debug!(backend = %transport.base_url(), "transport ready");

    match cli.command {
        Command::Orders => {
            let orders = transport.list_orders().await?;
            print!("{}", render_orders(&orders));
            Ok(ExitCode::SUCCESS)
        }
        Command::Buy {
            buyer,
            product,
            quantity,
        } => buy(&config, transport, buyer, product, &quantity).await,
    }
}

async fn buy(
    config: &Config,
    transport: HttpTransport,
    buyer: i64,
    product: i64,
    quantity: &str,
) -> Result<ExitCode> {
    // 1. Fetch the product; its price is the only one trusted
    let product = transport
        .fetch_product(ProductId::new(product))
        .await
        .context("failed to load product")?;
    let intent = OrderIntent::for_product(BuyerId::new(buyer), &product, coerce_quantity(quantity));
    match intent.total() {
        Some(total) => println!(
            "{} x{} = ${}",
            product.name,
            intent.quantity(),
            total.round_dp(2)
        ),
        None => println!("{} x{} (total unavailable)", product.name, intent.quantity()),
    }

    // 2. Wire the caller boundary
    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel();
    let checkout = Arc::new(Checkout::new(
        transport.clone(),
        ConsoleReporter::new(refresh_tx),
        config.settlement(),
    ));

    let mut progress = checkout.subscribe();
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            if let Some(line) = render_progress(&progress.borrow_and_update()) {
                println!("{line}");
            }
        }
    });

    // 3. Run the settlement; an interrupt asks for cancellation
    let mut submission = tokio::spawn({
        let checkout = checkout.clone();
        async move { checkout.submit(intent).await }
    });
    let outcome = loop {
        tokio::select! {
            joined = &mut submission => break joined??,
            res = interrupt_signal() => {
                res.context("failed to listen for interrupts")?;
                if checkout.cancel() {
                    tracing::info!("cancellation requested");
                } else {
                    tracing::warn!("payment already issued, waiting for verification");
                }
            }
        }
    };
    drop(checkout);
    let _ = printer.await;

    // 4. Refresh the order list after a successful purchase
    if let Ok(order_id) = refresh_rx.try_recv() {
        match transport.list_orders().await {
            Ok(orders) => {
                let mine: Vec<_> = orders
                    .into_iter()
                    .filter(|o| o.buyer_id == BuyerId::new(buyer))
                    .collect();
                print!("{}", render_orders(&mine));
            }
            Err(e) => tracing::warn!(%order_id, error = %e, "failed to refresh orders"),
        }
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
