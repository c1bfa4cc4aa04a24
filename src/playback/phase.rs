/// Lifecycle of the single loaded media resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing loaded (startup, after a failure or an explicit stop).
    #[default]
    Idle,
    /// A load was issued; waiting for metadata.
    Loading,
    Playing,
    Paused,
    /// Reached natural end-of-media and did not advance.
    Finished,
}

/// Inputs that move the lifecycle forward.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Trigger {
    Load,
    /// Metadata arrived; `playing` is the play/pause intent at that moment.
    Ready { playing: bool },
    Pause,
    Resume,
    Finish,
    Fail,
    Stop,
}

impl Phase {
    /// Transition table. `None` means the trigger is not valid in this phase
    /// and must be ignored.
    pub fn on(self, trigger: Trigger) -> Option<Phase> {
        use Phase::*;
        use Trigger::*;

        match (self, trigger) {
            (_, Load) => Some(Loading),
            (_, Stop) => Some(Idle),

            (Loading, Ready { playing: true }) => Some(Playing),
            (Loading, Ready { playing: false }) => Some(Paused),
            (Loading, Pause | Resume) => Some(Loading),
            (Loading, Fail) => Some(Idle),

            (Playing, Pause) => Some(Paused),
            (Playing, Finish) => Some(Finished),
            (Playing, Fail) => Some(Idle),

            (Paused, Resume) => Some(Playing),
            // The audio thread may report the end just before a pause lands.
            (Paused, Finish) => Some(Finished),
            (Paused, Fail) => Some(Idle),

            _ => None,
        }
    }

    /// Whether a resource is currently attached to the engine.
    pub fn is_live(self) -> bool {
        matches!(self, Phase::Loading | Phase::Playing | Phase::Paused)
    }
}
