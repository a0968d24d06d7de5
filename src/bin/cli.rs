use anyhow::{Context, Result};
use bgr_view::{NativeDisplay, Pipeline, IMAGE_PATH, WAIT_FOREVER, WINDOW_TITLE};
use env_logger::Env;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut pipeline = Pipeline::new(NativeDisplay::new());
    let key = pipeline
        .run(IMAGE_PATH, WINDOW_TITLE, WAIT_FOREVER)
        .with_context(|| format!("could not show {}", IMAGE_PATH))?;
    log::debug!("exiting on {:?}", key);
    Ok(())
}
