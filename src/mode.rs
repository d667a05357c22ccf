// Which regime the hand is steering: continuous color control or emoji drops.

use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// Finger distances drive the smoothed gains and brightness.
    #[default]
    Continuous,
    /// Recognized poses drop emoji.
    Discrete,
}

impl Mode {
    pub fn toggled(self) -> Mode {
        match self {
            Mode::Continuous => Mode::Discrete,
            Mode::Discrete => Mode::Continuous,
        }
    }

    /// Short label for the HUD.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Continuous => "RGB",
            Mode::Discrete => "EMOJI",
        }
    }
}

/// Two states, two commands. Reset goes to a configured target.
#[derive(Clone, Debug)]
pub struct ModeController {
    mode: Mode,
    reset_target: Mode,
}

impl ModeController {
    pub fn new(initial: Mode, reset_target: Mode) -> Self {
        Self { mode: initial, reset_target }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Flip between the two modes; returns the new one.
    pub fn toggle(&mut self) -> Mode {
        self.mode = self.mode.toggled();
        info!(mode = self.mode.label(), "mode toggled");
        self.mode
    }

    /// Force the designated reset mode.
    pub fn reset(&mut self) -> Mode {
        self.mode = self.reset_target;
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_back_and_forth() {
        let mut mc = ModeController::new(Mode::Continuous, Mode::Continuous);
        assert_eq!(mc.toggle(), Mode::Discrete);
        assert_eq!(mc.toggle(), Mode::Continuous);
    }

    #[test]
    fn reset_lands_on_configured_target() {
        let mut mc = ModeController::new(Mode::Continuous, Mode::Discrete);
        assert_eq!(mc.reset(), Mode::Discrete);
        mc.toggle();
        assert_eq!(mc.mode(), Mode::Continuous);
        assert_eq!(mc.reset(), Mode::Discrete);
    }
}
