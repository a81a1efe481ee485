//! Windowed runner: a [`Session`] driven by a [`FrameDriver`] inside a
//! winit event loop.
//!
//! Each `RedrawRequested` measures the wall-clock time since the previous
//! frame, lets the frame driver run the physics updates it pays for (each
//! update takes a fresh [`InputFrame`](crate::input::InputFrame) from the
//! keyboard state), then renders the session at the driver's interpolation
//! factor.

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{WindowAttributes, WindowId};

use super::extract::extract_draw_commands_with_sheet;
use super::renderer::DebugRenderer;
use super::sprite::SpriteSheet;
use crate::config::{DemoConfig, FrameConfig};
use crate::frame::FrameDriver;
use crate::input::{Action, Binding, InputState};
use crate::session::Session;
use crate::viewport::integer_scale;

/// Frames between two FPS log lines.
const FPS_LOG_INTERVAL: u64 = 600;

/// How the window is set up.
#[derive(Debug, Clone)]
pub struct WindowOptions {
    pub title: String,
    /// Virtual resolution the camera shows, px.
    pub virtual_size: (u32, u32),
    /// Initial window size as a multiple of the virtual resolution.
    pub initial_scale: u32,
    pub frame: FrameConfig,
    /// Player frames; a placeholder quad is drawn without one.
    pub sprite_sheet: Option<SpriteSheet>,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: "pixelhop".to_owned(),
            virtual_size: (256, 240),
            initial_scale: 3,
            frame: FrameConfig::default(),
            sprite_sheet: None,
        }
    }
}

impl WindowOptions {
    /// Window options for a demo config, keeping the default title.
    pub fn from_demo(demo: &DemoConfig) -> Self {
        Self {
            virtual_size: (demo.virtual_width, demo.virtual_height),
            frame: demo.frame.clone(),
            ..Self::default()
        }
    }
}

/// Run `session` in a window until it is closed or Menu is pressed.
///
/// # Errors
///
/// Fails if the event loop, the window or the GPU renderer cannot be
/// created.
pub fn run_windowed(session: Session, options: WindowOptions) -> Result<(), anyhow::Error> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    let mut app = App {
        state: AppState::Pending { session, options },
        init_failed: false,
    };
    event_loop.run_app(&mut app)?;

    if app.init_failed {
        return Err(anyhow::anyhow!(
            "failed to initialize windowed renderer (see logs for details)"
        ));
    }
    Ok(())
}

/// Binding for a physical key, by its standard key name.
fn key_binding(code: KeyCode) -> Option<Binding> {
    let name = match code {
        KeyCode::ArrowLeft => "ArrowLeft",
        KeyCode::ArrowRight => "ArrowRight",
        KeyCode::ArrowUp => "ArrowUp",
        KeyCode::ArrowDown => "ArrowDown",
        KeyCode::Space => "Space",
        KeyCode::Escape => "Escape",
        KeyCode::KeyE => "E",
        KeyCode::KeyM => "M",
        KeyCode::Tab => "Tab",
        _ => return None,
    };
    Some(Binding::key(name))
}

// ---------------------------------------------------------------------------
// Internal state machine
// ---------------------------------------------------------------------------

/// winit 0.30 only allows creating windows from `resumed`, so the app
/// starts `Pending` and becomes `Running` once the renderer exists.
enum AppState {
    Pending {
        session: Session,
        options: WindowOptions,
    },
    Running(Box<Running>),
    Transitioning,
}

struct Running {
    session: Session,
    renderer: DebugRenderer,
    driver: FrameDriver,
    input: InputState,
    sprite_sheet: Option<SpriteSheet>,
    last_frame: Instant,
}

struct App {
    state: AppState,
    init_failed: bool,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let state = std::mem::replace(&mut self.state, AppState::Transitioning);
        let AppState::Pending { session, options } = state else {
            self.state = state;
            return;
        };

        let scale = options.initial_scale.max(1);
        let (width, height) = (options.virtual_size.0 * scale, options.virtual_size.1 * scale);
        let attrs = WindowAttributes::default()
            .with_title(options.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(width, height));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!(error = %e, "failed to create window -- exiting");
                self.init_failed = true;
                self.state = AppState::Pending { session, options };
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(DebugRenderer::new(window.clone(), options.virtual_size)) {
            Ok(renderer) => {
                let s = integer_scale((width, height), options.virtual_size);
                tracing::info!(width, height, scale = s.factor, "debug renderer window created");
                window.request_redraw();
                self.state = AppState::Running(Box::new(Running {
                    session,
                    renderer,
                    driver: FrameDriver::new(options.frame.clone()),
                    input: InputState::default(),
                    sprite_sheet: options.sprite_sheet,
                    last_frame: Instant::now(),
                }));
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to initialize debug renderer -- exiting");
                self.init_failed = true;
                self.state = AppState::Pending { session, options };
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let AppState::Running(run) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!(
                    ticks = run.session.tick_count(),
                    "window close requested -- shutting down"
                );
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                tracing::debug!(width = new_size.width, height = new_size.height, "window resized");
                run.renderer.resize(new_size);
            }
            WindowEvent::Focused(focused) => {
                run.input.set_focused(focused);
                if focused {
                    // Time spent in the background is not simulated.
                    run.driver.reset_backlog();
                    run.last_frame = Instant::now();
                }
            }
            WindowEvent::KeyboardInput { event: key_ev, .. } => {
                if let PhysicalKey::Code(code) = key_ev.physical_key {
                    if let Some(binding) = key_binding(code) {
                        run.input
                            .handle(&binding, key_ev.state == ElementState::Pressed);
                    }
                }
                if run.input.active_actions().contains(&Action::Menu) {
                    tracing::info!(ticks = run.session.tick_count(), "menu pressed -- shutting down");
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let elapsed = now.duration_since(run.last_frame).as_secs_f64();
                run.last_frame = now;

                let Running {
                    session,
                    renderer,
                    driver,
                    input,
                    sprite_sheet,
                    ..
                } = &mut **run;

                let report = driver.advance(elapsed, |dt| {
                    let frame = input.take_frame();
                    session.step(&frame, dt);
                });
                if driver.frame_count() % FPS_LOG_INTERVAL == 0 {
                    tracing::debug!(fps = driver.fps(), ticks = session.tick_count(), "frame rate");
                }

                let commands = extract_draw_commands_with_sheet(
                    session,
                    report.interpolation,
                    sprite_sheet.as_ref(),
                );
                match renderer.render(&commands) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let size = renderer.window().inner_size();
                        renderer.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("GPU out of memory -- exiting");
                        event_loop.exit();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "surface error during render");
                    }
                }
                renderer.window().request_redraw();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_keys_map_to_standard_bindings() {
        let input = InputState::default();
        for (code, action) in [
            (KeyCode::ArrowLeft, Action::Left),
            (KeyCode::ArrowRight, Action::Right),
            (KeyCode::Space, Action::Jump),
            (KeyCode::Escape, Action::Menu),
            (KeyCode::KeyE, Action::Inventory),
            (KeyCode::KeyM, Action::Map),
            (KeyCode::Tab, Action::StatusOverlay),
        ] {
            let binding = key_binding(code).unwrap();
            assert!(input.bindings().actions_for(&binding).contains(&action), "{code:?}");
        }
        assert!(key_binding(KeyCode::KeyQ).is_none());
    }
}
