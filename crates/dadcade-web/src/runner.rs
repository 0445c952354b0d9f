use dadcade_engine::bridge::protocol::{
    HEADER_EVENT_COUNT, HEADER_FLOATS, HEADER_FRAME_COUNTER, HEADER_GAME, HEADER_INSTANCE_COUNT,
    HEADER_MAX_EVENTS, HEADER_MAX_INSTANCES, HEADER_MAX_SOUNDS, HEADER_PHASE,
    HEADER_PROTOCOL_VERSION, HEADER_SOUND_COUNT, HEADER_WORLD_HEIGHT, HEADER_WORLD_WIDTH,
    PROTOCOL_VERSION,
};
use dadcade_engine::{
    FixedTimestep, GameConfig, GameEvent, GameSession, GameType, InputEvent, InputQueue,
    ProtocolLayout, RenderBuffer, ScoreRecorder,
};
use dadcade_games::{GameHost, HostPhase};

/// Drives the arcade host from browser frames.
///
/// Frame time is accumulated into fixed steps. Input queued since the last
/// frame is seen by the first step only and drained once a step has run.
/// After each frame the render instances, sounds and game events are packed
/// into one flat buffer laid out by [`ProtocolLayout`].
pub struct ArcadeRunner {
    input: InputQueue,
    no_input: InputQueue,
    render_buffer: RenderBuffer,
    timestep: FixedTimestep,
    config: GameConfig,
    layout: ProtocolLayout,
    /// Flat buffer of sound event IDs.
    sound_buffer: Vec<u8>,
    event_buffer: Vec<GameEvent>,
    frame: Vec<f32>,
    frame_counter: u32,
}

impl ArcadeRunner {
    pub fn new(config: GameConfig) -> Self {
        let layout = ProtocolLayout::from_config(&config);
        Self {
            input: InputQueue::new(),
            no_input: InputQueue::new(),
            render_buffer: RenderBuffer::with_capacity(config.max_instances),
            timestep: FixedTimestep::new(config.fixed_dt),
            sound_buffer: Vec::with_capacity(config.max_sounds),
            event_buffer: Vec::with_capacity(config.max_events),
            frame: vec![0.0; layout.buffer_total_floats],
            frame_counter: 0,
            layout,
            config,
        }
    }

    /// Adopt the timing and capacities of a newly started game.
    pub fn attach(&mut self, config: GameConfig) {
        if config.fixed_dt != self.config.fixed_dt {
            self.timestep = FixedTimestep::new(config.fixed_dt);
        }
        self.timestep.reset();
        self.input.drain();
        let layout = ProtocolLayout::from_config(&config);
        if layout != self.layout {
            self.frame = vec![0.0; layout.buffer_total_floats];
            self.layout = layout;
        }
        self.config = config;
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Run one browser frame. Returns sessions finalized during it.
    pub fn tick<R: ScoreRecorder>(&mut self, host: &mut GameHost<R>, dt: f32, now_ms: u64) -> Vec<GameSession> {
        host.clear_frame_data();

        let mut finished = Vec::new();
        let steps = self.timestep.accumulate(dt);
        for step in 0..steps {
            let input = if step == 0 { &self.input } else { &self.no_input };
            if let Some(session) = host.tick(input, now_ms) {
                finished.push(session);
            }
        }
        if steps > 0 {
            self.input.drain();
        }

        self.render_buffer.clear();
        host.render(&mut self.render_buffer);
        self.render_buffer.instances.truncate(self.layout.max_instances);

        let ctx = host.context();
        self.sound_buffer.clear();
        self.sound_buffer
            .extend(ctx.sounds.iter().take(self.layout.max_sounds).map(|s| s.0 as u8));
        self.event_buffer.clear();
        self.event_buffer
            .extend(ctx.events.iter().take(self.layout.max_events).copied());

        self.frame_counter = self.frame_counter.wrapping_add(1);
        self.pack(host.phase(), host.game_type());
        finished
    }

    fn pack(&mut self, phase: HostPhase, game: Option<GameType>) {
        let l = &self.layout;
        let header = &mut self.frame[..HEADER_FLOATS];
        header[HEADER_FRAME_COUNTER] = self.frame_counter as f32;
        header[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        header[HEADER_MAX_INSTANCES] = l.max_instances as f32;
        header[HEADER_INSTANCE_COUNT] = self.render_buffer.instance_count() as f32;
        header[HEADER_MAX_SOUNDS] = l.max_sounds as f32;
        header[HEADER_SOUND_COUNT] = self.sound_buffer.len() as f32;
        header[HEADER_MAX_EVENTS] = l.max_events as f32;
        header[HEADER_EVENT_COUNT] = self.event_buffer.len() as f32;
        header[HEADER_WORLD_WIDTH] = self.config.world_width;
        header[HEADER_WORLD_HEIGHT] = self.config.world_height;
        header[HEADER_GAME] = game
            .and_then(|g| GameType::ALL.iter().position(|t| *t == g))
            .map_or(-1.0, |i| i as f32);
        header[HEADER_PHASE] = match phase {
            HostPhase::Idle => 0.0,
            HostPhase::Running => 1.0,
            HostPhase::Finished => 2.0,
        };

        let instances = self.render_buffer.as_floats();
        self.frame[l.instance_data_offset..l.instance_data_offset + instances.len()]
            .copy_from_slice(instances);

        for (slot, sound) in self.frame[l.sound_data_offset..].iter_mut().zip(&self.sound_buffer) {
            *slot = *sound as f32;
        }

        let events: &[f32] = bytemuck::cast_slice(&self.event_buffer);
        self.frame[l.event_data_offset..l.event_data_offset + events.len()].copy_from_slice(events);
    }

    // ---- Pointer accessors for direct reads from wasm memory ----

    pub fn frame(&self) -> &[f32] {
        &self.frame
    }

    pub fn frame_ptr(&self) -> *const f32 {
        self.frame.as_ptr()
    }

    pub fn instances_ptr(&self) -> *const f32 {
        self.render_buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.render_buffer.instance_count()
    }

    pub fn sound_events_ptr(&self) -> *const u8 {
        self.sound_buffer.as_ptr()
    }

    pub fn sound_events_len(&self) -> u32 {
        self.sound_buffer.len() as u32
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.event_buffer.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.event_buffer.len() as u32
    }

    pub fn world_width(&self) -> f32 {
        self.config.world_width
    }

    pub fn world_height(&self) -> f32 {
        self.config.world_height
    }

    pub fn max_instances(&self) -> u32 {
        self.layout.max_instances as u32
    }

    pub fn max_sounds(&self) -> u32 {
        self.layout.max_sounds as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }
}
