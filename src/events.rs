use bevy_ecs::prelude::*;

use crate::map::direction::Direction;

/// Intents forwarded by the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameCommand {
    /// Leave the menu and begin a fresh session.
    Start,
    /// Ask the player to head this way as soon as the path is clear.
    MovePlayer(Direction),
    /// Pause while playing, resume while paused.
    TogglePause,
    /// Escape-key semantics: pause while playing, go to the menu while paused.
    Back,
    /// Begin a fresh session from the game-over screen.
    Restart,
    /// Abandon the session and return to the menu from anywhere.
    ReturnToMenu,
    /// Stop the runner.
    Exit,
}

/// Events raised inside a tick and consumed later in the same tick.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// A ghost overlapped the player while playing.
    PlayerCaught { ghost: Entity },
    /// The last collectible was eaten.
    BoardCleared,
}
