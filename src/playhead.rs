/// Frame-driven animation clock feeding the `playhead` uniform.
///
/// Every rendered frame moves the clock by a fixed step, independent of
/// wall time. The default step runs the clock backwards, which scrolls the
/// color bands towards the wide end of the spiral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playhead {
    time: f32,
    step: f32,
    playing: bool,
}

impl Default for Playhead {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEP)
    }
}

impl Playhead {
    pub const DEFAULT_STEP: f32 = 0.001;

    pub fn new(step: f32) -> Self {
        Self {
            time: 0.0,
            step,
            playing: true,
        }
    }

    /// Current uniform value.
    pub fn value(&self) -> f32 {
        self.time
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Moves the clock one frame forward and returns the new value.
    pub fn advance(&mut self) -> f32 {
        if self.playing {
            self.time -= self.step;
        }
        self.time
    }

    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }
}
