/// Study Gate - subscription-gated student access service

use study_gate::{
    config::{LoggingConfig, ServerConfig},
    context::AppContext,
    error::GateResult,
    server,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> GateResult<()> {
    // Load configuration
    let config = ServerConfig::from_env()?;

    init_tracing(&config.logging);
    print_banner();

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level)
        .unwrap_or_else(|_| EnvFilter::new("study_gate=debug,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn print_banner() {
    println!(
        r#"
   ___ _             _         ___      _
  / __| |_ _  _ __| |_  _   / __|__ _| |_ ___
  \__ \  _| || / _` | || | | (_ / _` |  _/ -_)
  |___/\__|\_,_\__,_|\_, |  \___\__,_|\__\___|
                     |__/
        Subscription-gated student access v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
