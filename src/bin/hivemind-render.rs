#[path = "hivemind-render/app.rs"]
mod app;
#[path = "hivemind-render/args.rs"]
mod args;
#[path = "hivemind-render/logging.rs"]
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
