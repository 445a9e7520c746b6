//! Simulation events reported to the host after each step.

use engine_core::{EntityKind, PowerKind, Vec3};
use hecs::Entity;

/// Why the episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    EnemyContact,
    FellOffArena,
}

/// Something that happened during one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    Spawned { entity: Entity, kind: EntityKind, position: Vec3 },
    Despawned { entity: Entity, kind: EntityKind },
    Stomped { enemy: Entity },
    InhaleStarted,
    /// An enemy was caught by the inhale cone and is being sucked in.
    Captured { enemy: Entity },
    /// The inhale window ran out with nothing caught.
    InhaleTimedOut,
    Swallowed { enemy: Entity },
    PickedUp { item: Entity, power: PowerKind },
    /// The player touched an item while already holding a power.
    PickupRejected { item: Entity },
    Thrown { item: Entity, power: PowerKind },
    Landed { item: Entity },
    PowerUsed { power: PowerKind },
    /// A non-finite position was detected and replaced.
    PositionReset { entity: Option<Entity>, kind: EntityKind },
    PlayerDied { cause: DeathCause },
}

/// Whether the episode continues after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Running,
    EpisodeEnded(DeathCause),
}

impl Outcome {
    pub fn is_ended(&self) -> bool {
        matches!(self, Outcome::EpisodeEnded(_))
    }
}

/// Everything one call to `Simulation::step` produced.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub events: Vec<SimEvent>,
    pub outcome: Outcome,
}

impl StepReport {
    pub fn count(&self, pred: impl Fn(&SimEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}
