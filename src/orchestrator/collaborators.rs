//! Side effects the orchestrator triggers but does not own

/// Plays a named sound effect, e.g. `task-completed`.
pub trait SoundPlayer {
    fn play(&self, sound: &str);
}

/// Shows a named modal, e.g. `exercise-success-modal`.
pub trait ModalPresenter {
    fn show(&self, modal: &str);
}

/// Does nothing. The default for both collaborators.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SoundPlayer for Silent {
    fn play(&self, _sound: &str) {}
}

impl ModalPresenter for Silent {
    fn show(&self, _modal: &str) {}
}
