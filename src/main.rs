use std::sync::Arc;

use aws::{ecs::SdkEcsConnector, organizations::OrganizationsDirectory, sts::StsClient};
use config::Config;
use handler::{Clients, EventHandler};
use lambda_runtime::{LambdaEvent, service_fn};
use log::{error, info};
use notify::SlackNotifier;
use secrecy::{ExposeSecret, SecretString};

mod account;
mod aws;
mod classify;
mod config;
mod event;
mod handler;
mod notify;
mod types;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    // Local runs pick settings up from .env
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().inspect_err(|e| error!("Invalid configuration: {e}"))?;
    let sdk_config = aws_config::load_from_env().await;

    let sts = Arc::new(StsClient::new(aws_sdk_sts::Client::new(&sdk_config)));
    let clients = Clients {
        identity: sts.clone(),
        roles: sts,
        directory: Arc::new(OrganizationsDirectory::new(
            aws_sdk_organizations::Client::new(&sdk_config),
        )),
        ecs: Arc::new(SdkEcsConnector::new(sdk_config)),
        notifier: Arc::new(SlackNotifier::new(
            SecretString::from(config.audit_webhook_url.expose_secret().to_string()),
            SecretString::from(config.alert_webhook_url.expose_secret().to_string()),
        )),
    };
    let handler = EventHandler::new(config, clients);
    let handler = &handler;

    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<serde_json::Value>| async move {
            info!("Handling request {}", event.context.request_id);
            let outcome = handler.handle(event.payload).await.inspect_err(|e| {
                error!("Request {} failed: {e}", event.context.request_id);
            })?;
            info!("Request {} finished: {:?}", event.context.request_id, outcome);
            Ok::<_, lambda_runtime::Error>(outcome)
        },
    ))
    .await
}
