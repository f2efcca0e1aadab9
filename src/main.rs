use lambda_http::{run, service_fn, tracing, Error, Request};
mod blynk;
mod config;
mod handler;
mod range;
mod sun;
use blynk::BlynkClient;
use config::Config;
use handler::{function_handler, AppState};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // Read configuration at cold start (once per container lifecycle)
    let config = Config::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        concurrency = config.dispatch_concurrency,
        "starting pin forwarder"
    );
    let state = AppState {
        updater: Box::new(BlynkClient::new(&config)),
        config,
    };
    let state = &state;

    run(service_fn(move |event: Request| async move {
        function_handler(event, state).await
    }))
    .await
}
