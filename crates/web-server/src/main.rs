// Entry point for `cargo run -p web-server`: serves with the loaded
// configuration and no command-line overrides.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = configuration::load_config()?;
    let _guard = web_server::telemetry::init_tracing(&settings.logging)?;
    web_server::run_server(settings).await
}
