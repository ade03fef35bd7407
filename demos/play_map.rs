use anyhow::Context;
use macroquad::prelude::*;
use macroquad_tiled_anim::Map;

fn window_conf() -> Conf {
    Conf {
        window_title: "Tile Map".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

fn map_path() -> String {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TILEMAP_PATH").ok())
        .unwrap_or_else(|| "assets/map.json".to_owned())
}

async fn run() -> anyhow::Result<()> {
    let path = map_path();
    let mut map = Map::macroquad();
    map.load(&path)
        .with_context(|| format!("Loading map {path}"))?;

    tracing::info!(
        width = map.width(),
        height = map.height(),
        pixel_width = map.pixel_width(),
        pixel_height = map.pixel_height(),
        "map ready"
    );

    loop {
        if is_key_pressed(KeyCode::Escape) {
            tracing::info!("escape pressed, exiting");
            break;
        }

        clear_background(BLACK);

        let delta_ms = (get_frame_time() * 1000.0).round() as u32;
        map.render(delta_ms);

        draw_text(
            &format!("FPS: {}", get_fps()),
            screen_width() - 135.0,
            55.0,
            30.0,
            RED,
        );

        next_frame().await;
    }

    Ok(())
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        tracing::error!("{err:#}");
    }
}
