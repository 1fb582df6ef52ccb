use crate::domain::order::Order;
use crate::error::Result;
use std::io::Write;

/// Writes the final order table as CSV.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(target: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().from_writer(target),
        }
    }

    /// Writes a header followed by one row per order.
    pub fn write_orders(&mut self, orders: &[Order]) -> Result<()> {
        self.writer.write_record([
            "order_id",
            "session_id",
            "total_price",
            "status",
            "payment_intent_id",
        ])?;

        for order in orders {
            let total = order.total_price.to_string();
            self.writer.write_record([
                order.id.as_str(),
                order.session_id.as_str(),
                total.as_str(),
                order.status.as_str(),
                order.payment_intent_id.as_deref().unwrap_or(""),
            ])?;
        }

        self.writer.flush()?;
        Ok(())
    }
}
