//! Level simulation
//!
//! All gameplay logic lives here. The module has no rendering or platform
//! dependencies:
//! - Elapsed time is supplied by the caller
//! - Seeded RNG only
//! - Contacts are handled in the order the physics world reports them

pub mod camera;
pub mod damage;
pub mod effects;
pub mod lifecycle;
pub mod map;
pub mod particles;
pub mod physics;
pub mod state;
pub mod target;
pub mod tick;
pub mod zone;

pub use camera::{CameraBounds, CameraScroller};
pub use damage::{CollisionDamageController, DamageOutcome, ImpactClass, classify_impact};
pub use effects::{AlarmBank, EffectsDirector, ParticleKind};
pub use lifecycle::{LevelLifecycle, LevelPhase, Transition};
pub use map::{LevelError, LevelMap, MapObject};
pub use particles::{Easing, Fade, ParticlePool};
pub use physics::{BoxWorld, ContactListener, ContactQueue, DamageEvent, PhysicsWorld};
pub use state::{LevelEvent, LevelState};
pub use target::Target;
pub use tick::{TickInput, tick};
pub use zone::{Rect, Zone, ZoneKind, ZoneSet};
