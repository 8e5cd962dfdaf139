use bevy_ecs::event::EventWriter;
use bevy_ecs::query::With;
use bevy_ecs::system::{Query, Res, ResMut};
use thousands::Separable;
use tracing::{debug, trace};

use crate::config::GameConfig;
use crate::events::GameEvent;
use crate::systems::components::{Collectibles, Collider, PlayerControlled, Position, ScoreResource};
use crate::systems::state::GameStage;

/// Eats every collectible the player overlaps, scoring each one exactly once.
///
/// Eaten collectibles are removed on the spot, so a collectible can never be scored twice.
/// Writes `BoardCleared` on the tick the last one goes.
pub fn collectible_system(
    stage: Res<GameStage>,
    config: Res<GameConfig>,
    mut collectibles: ResMut<Collectibles>,
    mut score: ResMut<ScoreResource>,
    player: Query<(&Position, &Collider), With<PlayerControlled>>,
    mut events: EventWriter<GameEvent>,
) {
    if *stage != GameStage::Playing || collectibles.0.is_empty() {
        return;
    }

    let Ok((position, collider)) = player.single() else {
        return;
    };
    let player_rect = collider.rect_at(position.0);

    let before = collectibles.0.len();
    collectibles.0.retain(|collectible| !collectible.overlaps(&player_rect));
    let eaten = (before - collectibles.0.len()) as u32;
    if eaten == 0 {
        return;
    }

    score.0 += eaten * config.collectible_score;
    trace!(eaten, remaining = collectibles.0.len(), score = score.0, "Collectible eaten");

    if collectibles.0.is_empty() {
        debug!(score = score.0.separate_with_commas(), "Board cleared");
        events.write(GameEvent::BoardCleared);
    }
}
