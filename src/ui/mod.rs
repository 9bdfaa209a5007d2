//! User interface using egui.
//!
//! The panel never mutates render parameters directly: every widget change
//! is pushed as a [`ParamEvent`] and applied by the renderer at the next
//! frame boundary. Camera fields are the one exception, they are plain
//! view state with no GPU resources hanging off them.

use egui::Context;

use crate::renderer::camera::Camera;
use crate::scene::{ParamEvent, ParamQueue, SceneKind, SceneParams, MAX_GRID, MIN_GRID};

/// UI state and rendering.
pub struct Ui {
    /// Whether the side panel is visible
    pub panel_visible: bool,
}

impl Ui {
    pub fn new() -> Self {
        Self {
            panel_visible: true,
        }
    }

    /// Render the UI, pushing parameter changes into `queue`.
    pub fn render(
        &mut self,
        ctx: &Context,
        camera: &mut Camera,
        params: &SceneParams,
        queue: &mut ParamQueue,
        fps: f32,
    ) -> UiResponse {
        let mut response = UiResponse::default();

        // Toggle panel with Tab key
        if ctx.input(|i| i.key_pressed(egui::Key::Tab)) {
            self.panel_visible = !self.panel_visible;
        }

        if self.panel_visible {
            egui::SidePanel::left("controls")
                .default_width(220.0)
                .show(ctx, |ui| {
                    ui.heading("terraqua");
                    ui.separator();

                    // Performance
                    ui.label(format!("FPS: {:.1}", fps));
                    ui.separator();

                    // Scene selection
                    let mut scene = params.scene;
                    ui.horizontal(|ui| {
                        ui.selectable_value(&mut scene, SceneKind::Lit, "Lit");
                        ui.selectable_value(&mut scene, SceneKind::Static, "Static");
                        ui.selectable_value(&mut scene, SceneKind::Water, "Water");
                    });
                    if scene != params.scene {
                        queue.push(ParamEvent::SetScene(scene));
                    }

                    ui.separator();

                    ui.collapsing("Terrain", |ui| {
                        let mut cols = params.grid_cols;
                        if ui
                            .add(
                                egui::Slider::new(&mut cols, MIN_GRID..=MAX_GRID)
                                    .text("Columns"),
                            )
                            .changed()
                        {
                            queue.push(ParamEvent::SetGridCols(cols));
                        }

                        let mut rows = params.grid_rows;
                        if ui
                            .add(egui::Slider::new(&mut rows, MIN_GRID..=MAX_GRID).text("Rows"))
                            .changed()
                        {
                            queue.push(ParamEvent::SetGridRows(rows));
                        }

                        let mut elevation = params.elevation;
                        if ui
                            .add(egui::Slider::new(&mut elevation, 3.0..=50.0).text("Elevation"))
                            .changed()
                        {
                            queue.push(ParamEvent::SetElevation(elevation));
                        }
                    });

                    if params.scene == SceneKind::Water {
                        ui.collapsing("Water", |ui| {
                            let mut height = params.water_height;
                            if ui
                                .add(egui::Slider::new(&mut height, 0.0..=0.5).text("Height"))
                                .changed()
                            {
                                queue.push(ParamEvent::SetWaterHeight(height));
                            }
                        });
                    }

                    ui.collapsing("Light", |ui| {
                        let mut pos = params.light_pos;
                        let mut changed = false;
                        for (axis, label) in
                            [(&mut pos.x, "X"), (&mut pos.y, "Y"), (&mut pos.z, "Z")]
                        {
                            ui.horizontal(|ui| {
                                ui.label(label);
                                changed |= ui
                                    .add(
                                        egui::DragValue::new(axis)
                                            .speed(1.0)
                                            .range(-100.0..=100.0),
                                    )
                                    .changed();
                            });
                        }
                        if changed {
                            queue.push(ParamEvent::SetLightPos(pos));
                        }

                        let mut intensity = params.light_intensity;
                        if ui
                            .add(egui::Slider::new(&mut intensity, 0.0..=10.0).text("Intensity"))
                            .changed()
                        {
                            queue.push(ParamEvent::SetLightIntensity(intensity));
                        }
                    });

                    if params.scene == SceneKind::Lit {
                        let mut use_normal_map = params.use_normal_map;
                        if ui.checkbox(&mut use_normal_map, "Normal mapping").changed() {
                            queue.push(ParamEvent::SetNormalMap(use_normal_map));
                        }
                    }

                    ui.separator();

                    // Camera section
                    ui.collapsing("Camera", |ui| {
                        ui.horizontal(|ui| {
                            ui.label("Distance:");
                            ui.add(
                                egui::DragValue::new(&mut camera.distance)
                                    .speed(0.05)
                                    .range(0.2..=50.0),
                            );
                        });

                        ui.horizontal(|ui| {
                            ui.label("Azimuth:");
                            let mut degrees = camera.azimuth.to_degrees();
                            if ui
                                .add(egui::DragValue::new(&mut degrees).speed(1.0).suffix("°"))
                                .changed()
                            {
                                camera.azimuth = degrees.to_radians();
                            }
                        });

                        ui.horizontal(|ui| {
                            ui.label("Elevation:");
                            let mut degrees = camera.elevation.to_degrees();
                            if ui
                                .add(
                                    egui::DragValue::new(&mut degrees)
                                        .speed(1.0)
                                        .suffix("°")
                                        .range(-89.0..=89.0),
                                )
                                .changed()
                            {
                                camera.elevation = degrees.to_radians();
                            }
                        });

                        ui.horizontal(|ui| {
                            ui.label("FOV:");
                            ui.add(
                                egui::DragValue::new(&mut camera.fov)
                                    .speed(1.0)
                                    .suffix("°")
                                    .range(10.0..=120.0),
                            );
                        });

                        if ui.button("Reset Camera").clicked() {
                            response.reset_camera = true;
                        }
                    });

                    ui.separator();

                    // Help section
                    ui.collapsing("Controls", |ui| {
                        ui.label("Left Drag: Rotate");
                        ui.label("Scroll: Zoom");
                        ui.label("Shift+Drag: Pan");
                        ui.label("Middle Drag: Pan");
                        ui.label("R: Reset Camera");
                        ui.label("Tab: Toggle Panel");
                        ui.label("ESC: Quit");
                    });
                });
        }

        response
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}

/// Response from UI indicating what actions to take.
#[derive(Default)]
pub struct UiResponse {
    pub reset_camera: bool,
}
