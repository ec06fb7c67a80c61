//! Command line arguments.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "checkout", version, about = "Place marketplace orders from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Buy a product: create the order, pay, and verify the payment.
    Buy {
        /// Buyer placing the order.
        #[arg(long)]
        buyer: i64,

        /// Product to buy. Its price is read from the catalog.
        #[arg(long)]
        product: i64,

        /// Quantity as typed; anything invalid or below one counts as 1.
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        quantity: String,
    },

    /// List all orders.
    Orders,
}
