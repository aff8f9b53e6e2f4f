//! `shipdesk shipments`

use shipdesk_api::{BackendClient, ListQuery};
use shipdesk_core::ShipmentStatus;

use super::CliError;

/// Print one page of the current user's shipments.
#[allow(clippy::print_stdout)]
pub async fn run(
    client: &BackendClient,
    page: u32,
    status: Option<&str>,
    search: Option<&str>,
) -> Result<(), CliError> {
    // Reject unknown statuses before the request leaves.
    let status = status
        .map(str::parse::<ShipmentStatus>)
        .transpose()?
        .map(ShipmentStatus::as_str);

    let token = super::token()?;
    let query = ListQuery::first_page()
        .page(page)
        .status(status)
        .search(search);
    let result = client.my_shipments(&token, &query).await?;

    for shipment in &result.data {
        println!(
            "{:<18} {:<16} {:<20} {:>12}  {}",
            shipment.tracking_number.as_deref().unwrap_or("-"),
            shipment.status.as_str(),
            shipment.receiver.name,
            shipment.price.display(),
            shipment.created_at.format("%Y-%m-%d"),
        );
    }
    println!(
        "page {}/{} ({} shipments)",
        result.pagination.current_page, result.pagination.total_pages, result.pagination.total_items
    );
    Ok(())
}
