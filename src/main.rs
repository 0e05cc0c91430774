use paybridge::config::Config;
use paybridge::core::{telemetry, Result};
use paybridge::modules::gateways::GatewayService;
use paybridge::modules::transport::ReqwestTransport;
use std::sync::Arc;

/// Load the gateway accounts from the environment, check them, and print
/// what would be registered.
fn main() -> Result<()> {
    let config = Config::from_env()?;

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        telemetry::init_json(&config.client.log_level);
    } else {
        telemetry::init(&config.client.log_level);
    }

    config.validate()?;

    let transport = ReqwestTransport::from_config(&config.client)?;
    let service = GatewayService::from_config(&config, Arc::new(transport));

    tracing::info!(
        policy = ?config.client.required_field_policy,
        verification = ?config.client.response_verification,
        "Configuration loaded"
    );

    println!("{}", serde_json::to_string_pretty(&service.list_gateways())?);
    Ok(())
}
