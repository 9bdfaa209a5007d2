mod input;
mod lighting;
mod renderer;
mod scene;
mod terrain;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use input::InputController;
use renderer::Renderer;
use scene::{SceneKind, SceneParams, MAX_GRID, MIN_GRID};

#[derive(Parser, Debug)]
#[command(name = "terraqua")]
#[command(about = "Interactive procedural terrain and water renderer")]
struct Args {
    /// Scene to show at startup
    #[arg(long, value_enum, default_value = "water")]
    scene: SceneKind,

    /// Grid columns
    #[arg(long, default_value = "100")]
    cols: u32,

    /// Grid rows
    #[arg(long, default_value = "100")]
    rows: u32,

    /// Terrain elevation divisor (higher is flatter)
    #[arg(long, default_value = "5.0")]
    elevation: f32,

    /// Water plane height
    #[arg(long, default_value = "0.08")]
    water_height: f32,

    /// Directory holding textures (skybox faces, water maps, surfaces)
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
}

impl Args {
    fn into_params(self) -> (SceneParams, PathBuf) {
        let params = SceneParams {
            scene: self.scene,
            grid_cols: self.cols.clamp(MIN_GRID, MAX_GRID),
            grid_rows: self.rows.clamp(MIN_GRID, MAX_GRID),
            elevation: self.elevation,
            water_height: self.water_height,
            ..SceneParams::default()
        };
        (params, self.assets)
    }
}

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    input: InputController,
    params: SceneParams,
    assets_dir: PathBuf,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attrs = Window::default_attributes().with_title("terraqua");
            let window = Arc::new(event_loop.create_window(window_attrs).unwrap());

            let renderer = pollster::block_on(Renderer::new(
                window.clone(),
                self.params,
                self.assets_dir.clone(),
            ))
            .unwrap();

            self.window = Some(window);
            self.renderer = Some(renderer);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let (Some(window), Some(renderer)) = (self.window.as_ref(), self.renderer.as_mut()) else {
            return;
        };

        // Give egui first refusal; camera input only sees what it ignores
        let consumed = renderer.handle_window_event(window, &event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape && state == ElementState::Pressed {
                    event_loop.exit();
                } else if !consumed {
                    self.input.handle_keyboard(code, state, &mut renderer.camera);
                }
            }
            WindowEvent::MouseInput { button, state, .. } if !consumed => {
                self.input.handle_mouse_button(button, state);
            }
            WindowEvent::CursorMoved { position, .. } if !consumed => {
                self.input.handle_mouse_move(
                    position.x as f32,
                    position.y as f32,
                    &mut renderer.camera,
                );
            }
            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                self.input.handle_scroll(delta, &mut renderer.camera);
            }
            WindowEvent::Resized(physical_size) => {
                renderer.resize(physical_size);
            }
            WindowEvent::RedrawRequested => {
                match renderer.render(window) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                    Err(e) => log::error!("render error: {e:?}"),
                }
                window.request_redraw();
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let (params, assets_dir) = args.into_params();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        window: None,
        renderer: None,
        input: InputController::new(),
        params,
        assets_dir,
    };

    event_loop.run_app(&mut app)?;

    Ok(())
}
