//! `shipdesk track <number>`

use shipdesk_api::BackendClient;

use super::CliError;

/// Print the status and event history of one shipment.
///
/// Sends the token when `SHIPDESK_TOKEN` is set; tracking works without it.
#[allow(clippy::print_stdout)]
pub async fn run(client: &BackendClient, number: &str) -> Result<(), CliError> {
    let token = super::token().ok();
    let result = client.track(token.as_ref(), number).await?;

    println!("{}  {}", result.tracking_number, result.status.label());
    if let Some(company) = &result.company {
        println!("Carrier: {company}");
    }
    for event in &result.events {
        let location = event.location.as_deref().unwrap_or("");
        println!(
            "  {}  {}  {}",
            event.at.format("%Y-%m-%d %H:%M"),
            event.description,
            location
        );
    }
    if result.events.is_empty() {
        println!("  (no events yet)");
    }
    Ok(())
}
