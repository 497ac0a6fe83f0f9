use anyhow::Context;
use tokio::net::TcpListener;

mod bank;
mod config;
mod logging;
mod web;

use crate::{bank::AtmHandle, config::AtmConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = AtmConfig::from_env().context("failed to load configuration")?;
    let account = bank::Account::new(config.pin.clone(), config.opening_balance);
    let (atm, state) = AtmHandle::spawn(account, config.session_ttl, config.channel_size);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, web::router(atm))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // The router held the last handle, so the command loop is winding down.
    let account = state
        .await
        .context("failed to join the state handling task")?;
    tracing::info!(
        balance = %bank::format_money(account.balance()),
        transactions = account.ledger().len(),
        "shut down"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
