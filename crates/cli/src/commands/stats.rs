//! `shipdesk stats`

use shipdesk_api::BackendClient;

use super::CliError;

/// Print shipment counters for the account, or for the platform with `admin`.
#[allow(clippy::print_stdout)]
pub async fn run(client: &BackendClient, admin: bool) -> Result<(), CliError> {
    let token = super::token()?;

    if admin {
        let stats = client.admin_stats(&token).await?;
        println!("users              {}", stats.total_users);
        println!("shipments          {}", stats.total_shipments);
        println!("orders             {}", stats.total_orders);
        println!("pending orders     {}", stats.pending_orders);
        println!("pending transfers  {}", stats.pending_transfers);
        println!("revenue            {}", stats.total_revenue.display());
        for entry in &stats.shipments_by_status {
            println!("  {:<16} {}", entry.status.as_str(), entry.count);
        }
    } else {
        let stats = client.shipment_statistics(&token).await?;
        println!("total              {}", stats.total);
        println!("pending            {}", stats.pending);
        println!("ready for pickup   {}", stats.ready_for_pickup);
        println!("in transit         {}", stats.in_transit);
        println!("delivered          {}", stats.delivered);
        println!("canceled           {}", stats.canceled);
    }
    Ok(())
}
