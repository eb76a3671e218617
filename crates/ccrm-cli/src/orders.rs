//! `order` subcommands.

use ccrm_client::{CrmClient, CrmError, OrderSearch};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;

/// Sub-commands available under `order`.
#[derive(Debug, Subcommand)]
pub enum OrderCommands {
    /// Show a single order
    Get {
        order_id: i64,
    },
    /// Search orders created in a date range
    Find {
        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Day after the range ends (YYYY-MM-DD); defaults to now
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        email: Option<String>,
        /// Include rebilling details for each order product
        #[arg(long)]
        order_view: bool,
    },
}

pub(crate) async fn run(client: &CrmClient, command: OrderCommands) -> anyhow::Result<()> {
    match command {
        OrderCommands::Get { order_id } => match client.get_order(order_id).await {
            Ok(order) => super::print_json(&order),
            Err(e @ CrmError::Operational(_)) if e.status() == Some(404) => {
                anyhow::bail!("order {order_id} not found")
            }
            Err(e) => Err(e.into()),
        },
        OrderCommands::Find {
            from,
            to,
            email,
            order_view,
        } => {
            let search = OrderSearch {
                email,
                order_view: order_view.then_some(true),
                ..OrderSearch::new(start_of_day(from), to.map_or_else(Utc::now, start_of_day))
            };
            let orders = client.find_orders(&search).await?;
            if orders.is_empty() {
                println!("no orders found");
                return Ok(());
            }
            super::print_json(&orders)
        }
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
