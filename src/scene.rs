//! Scene selection, render parameters, and the parameter event queue.
//!
//! UI widgets never poke renderer state directly. Every slider/checkbox
//! change becomes a [`ParamEvent`] pushed into a [`ParamQueue`]; the
//! renderer drains the queue exactly once per frame, before any pass is
//! encoded, so a mid-frame slider drag can never tear the geometry or the
//! uniforms of a frame in flight.

use glam::Vec3;

/// Bounds enforced on the grid resolution before it reaches the builder.
pub const MIN_GRID: u32 = 2;
pub const MAX_GRID: u32 = 256;

/// Which demo is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SceneKind {
    /// Normal-mapped lit grid viewer.
    Lit,
    /// Static single-octave colored terrain.
    Static,
    /// Procedural fBm terrain with reflective/refractive water and skybox.
    #[default]
    Water,
}

/// Everything the sliders control, in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneParams {
    pub scene: SceneKind,
    pub grid_cols: u32,
    pub grid_rows: u32,
    pub elevation: f32,
    pub water_height: f32,
    pub light_pos: Vec3,
    pub light_intensity: f32,
    pub use_normal_map: bool,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            scene: SceneKind::default(),
            grid_cols: 100,
            grid_rows: 100,
            elevation: 5.0,
            water_height: 0.08,
            light_pos: Vec3::new(-80.0, -80.0, 30.0),
            light_intensity: 6.0,
            use_normal_map: false,
        }
    }
}

/// A single parameter change requested by the UI (or CLI at startup).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamEvent {
    SetScene(SceneKind),
    SetGridCols(u32),
    SetGridRows(u32),
    SetElevation(f32),
    SetWaterHeight(f32),
    SetLightPos(Vec3),
    SetLightIntensity(f32),
    SetNormalMap(bool),
}

/// What a drained batch of events requires of the renderer.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Applied {
    /// The grid resolution changed; vertex/index buffers must be rebuilt
    /// before the next draw.
    pub grid_dirty: bool,
}

/// FIFO of pending parameter changes, consumed at the frame boundary.
#[derive(Default)]
pub struct ParamQueue {
    events: Vec<ParamEvent>,
}

impl ParamQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ParamEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Apply every pending event to `params` in arrival order and clear the
    /// queue. Grid resolutions are clamped to `[MIN_GRID, MAX_GRID]` here,
    /// so the mesh builder only ever sees valid sizes.
    pub fn drain_into(&mut self, params: &mut SceneParams) -> Applied {
        let mut applied = Applied::default();
        for event in self.events.drain(..) {
            match event {
                ParamEvent::SetScene(s) => params.scene = s,
                ParamEvent::SetGridCols(c) => {
                    let c = c.clamp(MIN_GRID, MAX_GRID);
                    if c != params.grid_cols {
                        params.grid_cols = c;
                        applied.grid_dirty = true;
                    }
                }
                ParamEvent::SetGridRows(r) => {
                    let r = r.clamp(MIN_GRID, MAX_GRID);
                    if r != params.grid_rows {
                        params.grid_rows = r;
                        applied.grid_dirty = true;
                    }
                }
                ParamEvent::SetElevation(e) => params.elevation = e,
                ParamEvent::SetWaterHeight(w) => params.water_height = w,
                ParamEvent::SetLightPos(p) => params.light_pos = p,
                ParamEvent::SetLightIntensity(i) => params.light_intensity = i,
                ParamEvent::SetNormalMap(b) => params.use_normal_map = b,
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_applies_in_order() {
        let mut queue = ParamQueue::new();
        let mut params = SceneParams::default();
        queue.push(ParamEvent::SetElevation(10.0));
        queue.push(ParamEvent::SetElevation(20.0));
        queue.drain_into(&mut params);
        assert_eq!(params.elevation, 20.0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_resolution_change_marks_grid_dirty() {
        let mut queue = ParamQueue::new();
        let mut params = SceneParams::default();
        queue.push(ParamEvent::SetGridCols(64));
        let applied = queue.drain_into(&mut params);
        assert!(applied.grid_dirty);
        assert_eq!(params.grid_cols, 64);
    }

    #[test]
    fn test_same_resolution_is_not_dirty() {
        let mut queue = ParamQueue::new();
        let mut params = SceneParams::default();
        queue.push(ParamEvent::SetGridCols(params.grid_cols));
        let applied = queue.drain_into(&mut params);
        assert!(!applied.grid_dirty);
    }

    #[test]
    fn test_resolution_clamped_to_bounds() {
        let mut queue = ParamQueue::new();
        let mut params = SceneParams::default();
        queue.push(ParamEvent::SetGridCols(0));
        queue.push(ParamEvent::SetGridRows(100_000));
        queue.drain_into(&mut params);
        assert_eq!(params.grid_cols, MIN_GRID);
        assert_eq!(params.grid_rows, MAX_GRID);
    }

    #[test]
    fn test_non_grid_events_leave_geometry_alone() {
        let mut queue = ParamQueue::new();
        let mut params = SceneParams::default();
        queue.push(ParamEvent::SetWaterHeight(0.2));
        queue.push(ParamEvent::SetNormalMap(true));
        queue.push(ParamEvent::SetScene(SceneKind::Lit));
        let applied = queue.drain_into(&mut params);
        assert!(!applied.grid_dirty);
        assert_eq!(params.water_height, 0.2);
        assert!(params.use_normal_map);
        assert_eq!(params.scene, SceneKind::Lit);
    }
}
