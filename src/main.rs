//! Demo: a spinning cube through the PS1-style rasterizer, with
//! runtime toggles for every retro artifact.

use macroquad::prelude as mq;
use macroquad::prelude::{
    clear_background, draw_text, draw_texture_ex, is_key_pressed, next_frame, screen_height,
    screen_width, Conf, DrawTextureParams, FilterMode, KeyCode, Texture2D,
};
use retroframe::{
    create_test_cube, Color, Light, Mat4, RenderConfig, Renderer, Texture, Vec3, HEIGHT, WIDTH,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const CONFIG_PATH: &str = "retroframe.ron";

fn window_conf() -> Conf {
    Conf {
        window_title: format!("retroframe v{}", VERSION),
        window_width: WIDTH as i32 * 3,
        window_height: HEIGHT as i32 * 3,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let mut renderer = Renderer::new(WIDTH, HEIGHT);
    renderer.config = RenderConfig::load(CONFIG_PATH).unwrap_or_default();
    renderer.set_lights(vec![Light::new(Vec3::new(-1.0, -1.0, -1.0), 0.7)]);
    renderer.set_texture(
        0,
        Texture::checkerboard(64, 64, Color::new(220, 220, 220), Color::new(90, 90, 140)),
    );

    let (vertices, faces) = create_test_cube();

    let view = Mat4::look_at(Vec3::new(0.0, 0.0, 4.5), Vec3::ZERO, Vec3::UP);
    let projection = Mat4::perspective(
        std::f32::consts::FRAC_PI_3,
        WIDTH as f32 / HEIGHT as f32,
        0.1,
        100.0,
    );

    let mut angle: f32 = 0.0;

    loop {
        handle_toggles(&mut renderer.config);

        angle += mq::get_frame_time() * 0.8;
        let model = Mat4::rotation_y(angle) * Mat4::rotation_x(0.4);

        renderer.clear(Color::new(24, 24, 32));
        renderer.render_mesh(&vertices, &faces, &model, &view, &projection);

        // Present at native resolution; the GPU scales with hard pixel
        // edges
        let texture = Texture2D::from_rgba8(
            renderer.fb.width as u16,
            renderer.fb.height as u16,
            &renderer.fb.as_rgba_bytes(),
        );
        texture.set_filter(FilterMode::Nearest);

        clear_background(mq::Color::from_rgba(0, 0, 0, 255));
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            mq::WHITE,
            DrawTextureParams {
                dest_size: Some(mq::vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        draw_hud(&renderer.config);

        next_frame().await;
    }
}

fn handle_toggles(config: &mut RenderConfig) {
    if is_key_pressed(KeyCode::W) {
        config.wireframe = !config.wireframe;
    }
    if is_key_pressed(KeyCode::L) {
        config.lighting = !config.lighting;
    }
    if is_key_pressed(KeyCode::T) {
        config.texturing = !config.texturing;
    }
    if is_key_pressed(KeyCode::B) {
        config.backface_culling = !config.backface_culling;
    }
    if is_key_pressed(KeyCode::V) {
        config.vertex_snapping = !config.vertex_snapping;
    }
    if is_key_pressed(KeyCode::D) {
        config.dithering = !config.dithering;
    }
    if is_key_pressed(KeyCode::G) {
        config.smooth_shading = !config.smooth_shading;
    }
    if is_key_pressed(KeyCode::S) {
        if let Err(e) = config.save(CONFIG_PATH) {
            log::warn!("could not save config: {}", e);
        }
    }
}

fn draw_hud(config: &RenderConfig) {
    let line = format!(
        "[W]ire:{} [L]ight:{} [T]ex:{} [B]ackface:{} [V]snap:{} [D]ither:{} [G]ouraud:{} [S]ave",
        onoff(config.wireframe),
        onoff(config.lighting),
        onoff(config.texturing),
        onoff(config.backface_culling),
        onoff(config.vertex_snapping),
        onoff(config.dithering),
        onoff(config.smooth_shading),
    );
    draw_text(&line, 8.0, screen_height() - 10.0, 18.0, mq::WHITE);
}

fn onoff(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}
