use tracing::Level;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(debug_assertions)]
    let level = Some(Level::DEBUG);
    #[cfg(not(debug_assertions))]
    let level = Some(Level::INFO);

    let r = summer_camp_backend::create(level).await?;
    match r.launch().await {
        Ok(_) => tracing::info!("Server shut down."),
        Err(e) => {
            let message = e.to_string();
            tracing::error!("Error launching server: {}", message);
            anyhow::bail!(message);
        }
    };

    Ok(())
}
