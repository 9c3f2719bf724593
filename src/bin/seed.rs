use anyhow::{Context, Result, bail};
use contact_sync::{
    ContactGateway, ContactRecord,
    cache::next_resource_id,
    config::{AppConfig, BackendUrl},
    gateway::open_store,
};

/// Writes a few sample contacts into the configured file store, skipping
/// names that are already present.
#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("failed to read configuration")?;
    if config.backend_url == BackendUrl::Memory {
        bail!("seeding a memory:// store has no lasting effect; set MONGO_STRING=file://<path>");
    }

    let gateway = ContactGateway::new(open_store(&config.backend_url));
    gateway
        .connect()
        .await
        .context("failed to connect to contact store")?;

    let samples = [
        ("Arto Hellas", "040-123-4567"),
        ("Ada Lovelace", "394-453-2323"),
        ("Dan Abramov", "124-323-4345"),
        ("Mary Poppendieck", "392-364-2312"),
    ];

    let mut existing = gateway.find_all().await?;
    let mut inserted = 0usize;

    for (name, number) in samples {
        if existing.iter().any(|contact| contact.name == name) {
            continue;
        }
        let resource_id = next_resource_id(&existing)
            .with_context(|| format!("no resource id left for {name}"))?;
        let record = ContactRecord::new(name, number, resource_id);
        let saved = gateway
            .save(record)
            .await
            .with_context(|| format!("failed to seed {name}"))?;
        existing.push(saved);
        inserted += 1;
    }

    gateway.disconnect().await?;

    println!(
        "seeded {} contacts into {} ({} total)",
        inserted,
        config.backend_url,
        existing.len()
    );
    Ok(())
}
