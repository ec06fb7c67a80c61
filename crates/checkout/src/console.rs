//! Terminal rendering of settlement progress and outcomes.

use common::OrderId;
use settlement::{OutcomeReporter, ProgressView, STEP_LABELS};
use tokio::sync::mpsc;
use transport::OrderReceipt;

/// Prints outcomes and asks for an order-list refresh after a success.
#[derive(Debug)]
pub struct ConsoleReporter {
    refresh: mpsc::UnboundedSender<OrderId>,
}

impl ConsoleReporter {
    /// Creates a reporter that sends the placed order id on `refresh`.
    pub fn new(refresh: mpsc::UnboundedSender<OrderId>) -> Self {
        Self { refresh }
    }
}

impl OutcomeReporter for ConsoleReporter {
    fn on_success(&self, order_id: OrderId) {
        println!("Order #{order_id} placed and paid.");
        if self.refresh.send(order_id).is_err() {
            tracing::debug!(%order_id, "no one listening for order refresh");
        }
    }

    fn on_failure(&self, message: &str) {
        eprintln!("Order failed: {message}");
    }

    fn on_cancelled(&self) {
        println!("Order cancelled.");
    }
}

/// Renders one progress line, or `None` when nothing is running.
pub fn render_progress(view: &ProgressView) -> Option<String> {
    let step = view.active_step?;
    let label = view.step_label()?;
    let mut line = format!("[{}/{}] {label}", step + 1, STEP_LABELS.len());
    if let Some(caption) = view.payment_sheet_caption() {
        line.push_str(" | Google Pay: ");
        line.push_str(caption);
    }
    Some(line)
}

/// Renders the order list as a table.
pub fn render_orders(orders: &[OrderReceipt]) -> String {
    let mut out = format!(
        "{:<8} {:<8} {:<8} {:<4} {}\n",
        "ORDER", "BUYER", "PRODUCT", "QTY", "STATUS"
    );
    for order in orders {
        out.push_str(&format!(
            "{:<8} {:<8} {:<8} {:<4} {}\n",
            order.id.get(),
            order.buyer_id.get(),
            order.product_id.get(),
            order.quantity,
            order.status
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{BuyerId, ProductId};
    use settlement::SettlementPhase;

    #[test]
    fn test_render_progress_lines() {
        let line = render_progress(&ProgressView::from_phase(SettlementPhase::CreatingOrder));
        assert_eq!(line.as_deref(), Some("[1/4] Create Order"));

        let line = render_progress(&ProgressView::from_phase(SettlementPhase::ProcessingPayment));
        assert_eq!(
            line.as_deref(),
            Some("[3/4] Process Payment | Google Pay: Processing payment...")
        );

        assert!(render_progress(&ProgressView::cleared()).is_none());
    }

    #[test]
    fn test_success_requests_refresh() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reporter = ConsoleReporter::new(tx);

        reporter.on_success(OrderId::new(7));
        reporter.on_failure("card declined");

        assert_eq!(rx.try_recv().ok(), Some(OrderId::new(7)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_render_orders_table() {
        let orders = vec![OrderReceipt {
            id: OrderId::new(7),
            buyer_id: BuyerId::new(1),
            product_id: ProductId::new(42),
            quantity: 2,
            status: "completed".to_string(),
            order_date: None,
            completion_date: None,
        }];
        let table = render_orders(&orders);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("7 "));
        assert!(lines[1].ends_with("completed"));
    }
}
