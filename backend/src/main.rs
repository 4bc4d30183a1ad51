use log::error;
use outlier_backend::build_rocket;
use outlier_backend::config::{create_app_state, init_logger, load_environment};

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    load_environment();
    init_logger();

    let state = create_app_state()?;
    if let Err(e) = build_rocket(state).launch().await {
        error!("Rocket failed: {e}");
        anyhow::bail!("Rocket failed to launch");
    }
    Ok(())
}
