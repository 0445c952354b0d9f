use bytemuck::{Pod, Zeroable};

/// Per-instance render data written to wasm memory for the TypeScript renderer.
/// Must match the TypeScript protocol: 8 floats = 32 bytes stride.
///
/// Positions and sizes are in playfield units (the catch game's 400×300
/// field, or cell units for the grid games).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    /// Center X.
    pub x: f32,
    /// Center Y.
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// What to draw; see [`sprite`].
    pub sprite: f32,
    /// Sprite-specific selector: symbol index, palette slot, or highlight state.
    pub variant: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    /// A fully opaque, unrotated instance.
    pub fn rect(x: f32, y: f32, width: f32, height: f32, sprite: f32, variant: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
            sprite,
            variant,
            alpha: 1.0,
        }
    }
}

/// Sprite ids understood by the TypeScript renderer.
pub mod sprite {
    pub const PADDLE: f32 = 1.0;
    pub const BALL: f32 = 2.0;
    /// A grid cell showing a symbol; `variant` is the symbol index.
    pub const CELL: f32 = 3.0;
    /// A face-down memory card.
    pub const CARD_BACK: f32 = 4.0;
    /// A face-up memory card; `variant` is the symbol index.
    pub const CARD_FACE: f32 = 5.0;
    pub const PARTICLE: f32 = 6.0;
    /// Trivia answer button; `variant` encodes 0 idle, 1 correct, 2 wrong.
    pub const ANSWER: f32 = 7.0;
}

/// Render buffer containing all sprite instances for one frame.
pub struct RenderBuffer {
    pub instances: Vec<RenderInstance>,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: RenderInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Instances as a flat float slice, for copying into the shared layout.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Raw pointer to instance data for direct reads from JS.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
