use std::path::Path;

use glam::Vec3;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::{Keycode, Scancode};

use crate::abs::*;
use crate::camera::{Camera, CameraMovement, Projection};
use crate::render::Renderer;
use crate::render::meshes::MeshRegistry;
use crate::scene::{SCENE_JSON, SceneDef};

mod abs;
mod camera;
mod render;
mod scene;
mod transform;

const WINDOW_TITLE: &str = "Tabletop Diorama";
const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;

fn setup_logging() -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

fn build_program(gl: &std::sync::Arc<glow::Context>) -> Result<ShaderProgram, ShaderError> {
    let vert = Shader::new(
        gl,
        glow::VERTEX_SHADER,
        include_str!("render/shaders/scene/vert.glsl"),
    )?;
    let frag = Shader::new(
        gl,
        glow::FRAGMENT_SHADER,
        include_str!("render/shaders/scene/frag.glsl"),
    )?;
    ShaderProgram::new(gl, &[&vert, &frag])
}

/// Loads every texture the scene declares, in declaration order, applying
/// per-texture wrap overrides. Any missing or undecodable file is fatal.
fn load_textures(
    gl: &std::sync::Arc<glow::Context>,
    scene: &SceneDef,
) -> Result<TextureStore, TextureError> {
    let mut store = TextureStore::new();
    for (name, def) in &scene.textures {
        let texture = Texture::load(gl, Path::new(&def.path))?;
        if let Some(wrap) = def.wrap {
            texture.set_wrap(wrap.mode());
        }
        store.insert(name.clone(), texture);
    }
    Ok(store)
}

fn fatal(message: String) -> ! {
    log::error!("{message}");
    std::process::exit(1);
}

fn main() {
    if let Err(e) = setup_logging() {
        eprintln!("failed to initialize logging: {e}");
    }

    let scene = match SceneDef::parse(SCENE_JSON) {
        Ok(scene) => scene,
        Err(e) => fatal(format!("invalid scene description: {e}")),
    };
    log::info!(
        "Scene loaded: {} objects, {} textures",
        scene.objects.len(),
        scene.textures.len()
    );

    let mut app = App::new(WINDOW_TITLE, WINDOW_WIDTH, WINDOW_HEIGHT);

    let program = match build_program(&app.gl) {
        Ok(program) => program,
        Err(e) => fatal(format!("shader setup failed: {e}")),
    };

    let meshes = MeshRegistry::create(&app.gl);

    let textures = match load_textures(&app.gl, &scene) {
        Ok(store) => store,
        Err(e) => fatal(format!("texture setup failed: {e}")),
    };

    let camera = Camera::new(Vec3::new(-3.5, 5.0, 15.0));
    let mut renderer = Renderer::new(
        &app.gl,
        program,
        meshes,
        textures,
        camera,
        WINDOW_WIDTH,
        WINDOW_HEIGHT,
    );

    let mut last_frame_time = std::time::Instant::now();

    'running: loop {
        let now = std::time::Instant::now();
        let delta_time = now.duration_since(last_frame_time).as_secs_f32();
        last_frame_time = now;

        for event in app.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'running,
                Event::Window {
                    win_event: WindowEvent::Resized(width, height),
                    ..
                } => {
                    renderer.resize(width.max(1) as u32, height.max(1) as u32);
                }
                Event::MouseMotion { x, y, .. } => {
                    renderer.camera.on_cursor_move(x as f32, y as f32);
                }
                Event::MouseWheel { precise_y, .. } => {
                    renderer.camera.on_scroll(precise_y);
                }
                Event::KeyUp {
                    keycode: Some(keycode),
                    ..
                } => match keycode {
                    Keycode::Escape => break 'running,
                    Keycode::P => renderer.projection = Projection::Perspective,
                    Keycode::O => renderer.projection = Projection::Orthographic,
                    _ => {}
                },
                _ => {}
            }
        }

        let keyboard = app.event_pump.keyboard_state();
        let held = [
            (Scancode::W, CameraMovement::Forward),
            (Scancode::S, CameraMovement::Backward),
            (Scancode::A, CameraMovement::Left),
            (Scancode::D, CameraMovement::Right),
            (Scancode::E, CameraMovement::Up),
            (Scancode::Q, CameraMovement::Down),
        ];
        for (scancode, movement) in held {
            if keyboard.is_scancode_pressed(scancode) {
                renderer.camera.process_movement(movement, delta_time);
            }
        }

        renderer.render_frame(&scene);
        app.window.gl_swap_window();
    }
}
