use chrono::{Duration, Utc};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_lending::{CategoryFilter, HistoryFilter, ItemCategory, LendingService};
use tracing::info;

mod config;
mod seed;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        environment = ?config.environment,
        trust_base = config.policy.trust.base,
        featured_limit = config.policy.featured_limit,
        "Starting lendit demo"
    );

    let service = LendingService::new(config.policy);
    let community = seed::seed(&service, Utc::now()).await?;
    let me = community.resident("Demo User")?.clone();
    let owner = community.resident("Amit Kumar")?.clone();

    let kettles = service
        .browse(me.id, "kettle", CategoryFilter::Only(ItemCategory::Kitchen))
        .await?;
    let kettle = kettles
        .first()
        .ok_or_else(|| eyre::eyre!("seeded catalog has no kettle"))?;
    info!(item = %kettle.item.name, owner = %kettle.owner_name, room = %kettle.owner_room, "Found item");

    // One full round trip: request, accept, return
    let request = service.request_item(me.id, kettle.item.id).await?;
    service
        .accept_request(owner.id, request.request.id, Utc::now() + Duration::days(3))
        .await?;
    let returned = service.return_item(me.id, request.request.id).await?;
    info!(
        request_id = %returned.request.id,
        late = ?returned.request.late,
        "Round trip complete"
    );

    let history = service.history(me.id, HistoryFilter::All).await?;
    info!(
        entries = history.entries.len(),
        success_rate = history.summary.success_rate,
        "History"
    );

    let profile = service.profile(me.id).await?;
    info!(
        score = profile.user.trust_score,
        tier = %profile.tier,
        achievements = profile.achievements.len(),
        "Profile"
    );

    let dashboard = service.dashboard(me.id).await?;
    println!("{}", serde_json::to_string_pretty(&dashboard)?);

    Ok(())
}
