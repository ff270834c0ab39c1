//! Cloak world - owns units, detectors and stances, and drives the tick
//!
//! One authoritative tick advances every cloak in actor-id order, then
//! applies queued detector changes. Visibility queries are read-only and can
//! run between ticks from any number of observers.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::cloak::events::{CloakEvent, CloakEventLog, LoggedCloakEvent};
use crate::cloak::state::{Cloak, CloakSnapshot, UnitStatus};
use crate::cloak::state::{fnv_step, FNV_OFFSET};
use crate::core::config::{config, SimulationConfig};
use crate::core::error::{CloakError, Result};
use crate::core::types::{ActorId, CellPos, Color, DamageState, FactionId, Tick};
use crate::detection::registry::{DetectionRegistry, DetectorUnit};
use crate::diplomacy::stance::StanceTable;
use crate::rules::loader::RulesCatalog;
use crate::visibility::observer::ObserverContext;
use crate::visibility::presentation::{radar_color, render_directive, RenderDirective};
use crate::visibility::resolver::{CloakTarget, VisibilityResolver};

/// Radar color for owners missing from the rules file
pub const FALLBACK_COLOR: Color = Color::rgb(128, 128, 128);

/// A simulated actor as far as cloaking is concerned
#[derive(Debug, Clone)]
pub struct UnitState {
    pub id: ActorId,
    pub actor_type: String,
    pub owner: FactionId,
    pub position: CellPos,
    pub disabled: bool,
    pub damage: DamageState,
    pub cloak: Option<Cloak>,
    pub detect_range: Option<u32>,
}

impl UnitState {
    fn target(&self) -> Option<CloakTarget<'_>> {
        self.cloak.as_ref().map(|cloak| CloakTarget {
            cloak,
            owner: self.owner,
            position: self.position,
        })
    }
}

pub struct CloakWorld {
    pub current_tick: Tick,
    rules: RulesCatalog,
    stances: StanceTable,
    units: BTreeMap<ActorId, UnitState>,
    detectors: DetectionRegistry,
    log: CloakEventLog,
    next_id: u32,
    parallel_threshold: usize,
}

impl CloakWorld {
    /// World using the global simulation config and the rules' stance table
    pub fn new(rules: RulesCatalog) -> Result<Self> {
        Self::with_config(rules, config())
    }

    /// Fails with `CloakError::Config` when the config is inconsistent
    pub fn with_config(rules: RulesCatalog, config: &SimulationConfig) -> Result<Self> {
        config.validate().map_err(CloakError::Config)?;
        let stances = rules.stance_table();
        Ok(Self {
            current_tick: 0,
            rules,
            stances,
            units: BTreeMap::new(),
            detectors: DetectionRegistry::new(config.min_grid_cell_size),
            log: CloakEventLog::new(config.max_event_log),
            next_id: 1,
            parallel_threshold: config.parallel_threshold,
        })
    }

    pub fn rules(&self) -> &RulesCatalog {
        &self.rules
    }

    pub fn stances(&self) -> &StanceTable {
        &self.stances
    }

    /// Stances may change mid-game; queries always read the current table
    pub fn stances_mut(&mut self) -> &mut StanceTable {
        &mut self.stances
    }

    pub fn detectors(&self) -> &DetectionRegistry {
        &self.detectors
    }

    pub fn events(&self) -> &CloakEventLog {
        &self.log
    }

    pub fn drain_events(&mut self) -> Vec<LoggedCloakEvent> {
        self.log.drain()
    }

    pub fn unit(&self, actor: ActorId) -> Option<&UnitState> {
        self.units.get(&actor)
    }

    /// Units in actor-id order
    pub fn units(&self) -> impl Iterator<Item = &UnitState> + '_ {
        self.units.values()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    fn unit_mut(&mut self, actor: ActorId) -> Result<&mut UnitState> {
        self.units.get_mut(&actor).ok_or(CloakError::UnknownActor(actor))
    }

    fn cloak_mut(&mut self, actor: ActorId) -> Result<&mut Cloak> {
        self.unit_mut(actor)?
            .cloak
            .as_mut()
            .ok_or(CloakError::NotCloakable(actor))
    }

    fn target(&self, actor: ActorId) -> Result<Option<CloakTarget<'_>>> {
        self.units
            .get(&actor)
            .map(UnitState::target)
            .ok_or(CloakError::UnknownActor(actor))
    }

    fn record(&mut self, event: Option<CloakEvent>) -> Option<CloakEvent> {
        if let Some(event) = &event {
            tracing::debug!("Tick {}: {:?}", self.current_tick, event);
            self.log.push(event.clone(), self.current_tick);
        }
        event
    }

    // === LIFECYCLE ===

    /// Spawn an actor of a rules type
    ///
    /// Detectors become active at the next tick boundary (or `sync_detectors`).
    pub fn spawn_unit(&mut self, actor_type: &str, owner: FactionId, position: CellPos) -> Result<ActorId> {
        let kind = self.rules.actor(actor_type)?;
        let id = ActorId(self.next_id);
        let cloak = kind.cloak.clone().map(|config| Cloak::new(id, config));
        let detect_range = kind.detect_range;
        self.next_id += 1;

        if let Some(range) = detect_range {
            self.detectors.queue_add(DetectorUnit {
                actor: id,
                owner,
                position,
                range,
            });
        }

        tracing::info!(
            "Spawned {} '{}' for {:?} at ({}, {})",
            id,
            actor_type,
            owner,
            position.x,
            position.y
        );

        self.units.insert(
            id,
            UnitState {
                id,
                actor_type: actor_type.to_string(),
                owner,
                position,
                disabled: false,
                damage: DamageState::Undamaged,
                cloak,
                detect_range,
            },
        );
        Ok(id)
    }

    pub fn despawn(&mut self, actor: ActorId) -> Result<()> {
        let unit = self.units.remove(&actor).ok_or(CloakError::UnknownActor(actor))?;
        if unit.detect_range.is_some() {
            self.detectors.queue_remove(actor);
        }
        tracing::info!("Despawned {}", actor);
        Ok(())
    }

    /// Apply queued detector changes now instead of at the next tick
    ///
    /// Meant for setup before the first tick; never call it between queries
    /// that must agree with each other.
    pub fn sync_detectors(&mut self) -> usize {
        self.detectors.apply_pending()
    }

    // === EXTERNAL NOTIFICATIONS ===

    /// Movement is picked up by the cloak on the next tick
    pub fn move_unit(&mut self, actor: ActorId, position: CellPos) -> Result<()> {
        let unit = self.unit_mut(actor)?;
        unit.position = position;
        let is_detector = unit.detect_range.is_some();
        if is_detector {
            self.detectors.queue_move(actor, position);
        }
        Ok(())
    }

    pub fn set_disabled(&mut self, actor: ActorId, disabled: bool) -> Result<()> {
        self.unit_mut(actor)?.disabled = disabled;
        Ok(())
    }

    /// Non-cloakable actors just record the state
    pub fn set_damage_state(&mut self, actor: ActorId, state: DamageState) -> Result<Option<CloakEvent>> {
        let unit = self.unit_mut(actor)?;
        unit.damage = state;
        let event = unit
            .cloak
            .as_mut()
            .and_then(|cloak| cloak.on_damage_state_changed(state));
        Ok(self.record(event))
    }

    /// Non-cloakable attackers are ignored
    pub fn notify_attack(&mut self, actor: ActorId) -> Result<Option<CloakEvent>> {
        let event = self.unit_mut(actor)?.cloak.as_mut().and_then(Cloak::on_attack);
        Ok(self.record(event))
    }

    /// Explicit uncloak request; `None` uses the type's cloak delay
    pub fn uncloak(&mut self, actor: ActorId, duration: Option<u32>) -> Result<Option<CloakEvent>> {
        let cloak = self.cloak_mut(actor)?;
        let event = match duration {
            Some(ticks) => cloak.uncloak_for(ticks),
            None => cloak.uncloak(),
        };
        Ok(self.record(event))
    }

    // === TICK ===

    /// Advance every cloak one tick, then apply queued detector changes
    pub fn tick(&mut self) -> Vec<CloakEvent> {
        let mut events = Vec::new();

        for unit in self.units.values_mut() {
            let status = UnitStatus {
                disabled: unit.disabled,
                location: unit.position,
            };
            if let Some(cloak) = unit.cloak.as_mut() {
                events.extend(cloak.tick(status));
            }
        }

        for event in &events {
            tracing::debug!("Tick {}: {:?}", self.current_tick, event);
        }
        self.log.extend(events.iter().cloned(), self.current_tick);

        self.detectors.apply_pending();
        self.current_tick += 1;
        events
    }

    // === QUERIES ===

    /// Can the observer see this actor? Actors without a cloak always can be.
    pub fn is_visible(&self, actor: ActorId, ctx: &ObserverContext) -> Result<bool> {
        let resolver = VisibilityResolver::new(&self.stances, &self.detectors);
        Ok(match self.target(actor)? {
            Some(target) => resolver.is_visible(&target, ctx),
            None => true,
        })
    }

    /// Every actor the observer can see, in actor-id order
    ///
    /// Large worlds are evaluated in parallel; the result is identical.
    pub fn visible_units(&self, ctx: &ObserverContext) -> Vec<ActorId> {
        let resolver = VisibilityResolver::new(&self.stances, &self.detectors);
        let check = |unit: &UnitState| match unit.target() {
            Some(target) => resolver.is_visible(&target, ctx),
            None => true,
        };

        if self.units.len() >= self.parallel_threshold {
            let units: Vec<&UnitState> = self.units.values().collect();
            units.par_iter().filter(|u| check(u)).map(|u| u.id).collect()
        } else {
            self.units.values().filter(|u| check(u)).map(|u| u.id).collect()
        }
    }

    /// Radar color of an actor for a viewing faction
    pub fn radar_color(&self, actor: ActorId, viewer: Option<FactionId>) -> Result<Color> {
        let unit = self.units.get(&actor).ok_or(CloakError::UnknownActor(actor))?;
        let base = self.rules.faction_color(unit.owner).unwrap_or(FALLBACK_COLOR);
        Ok(match unit.target() {
            Some(target) => radar_color(&target, base, viewer),
            None => base,
        })
    }

    /// Render treatment of an actor through the rendered fog
    pub fn render_directive(&self, actor: ActorId, rendered: &ObserverContext) -> Result<RenderDirective> {
        let resolver = VisibilityResolver::new(&self.stances, &self.detectors);
        Ok(match self.target(actor)? {
            Some(target) => render_directive(&resolver, &target, rendered),
            None => RenderDirective::Normal,
        })
    }

    // === SYNC / SNAPSHOT ===

    /// Digest of all cloak state, folded in actor-id order
    pub fn sync_hash(&self) -> u64 {
        let mut hash = FNV_OFFSET;
        for unit in self.units.values() {
            if let Some(cloak) = &unit.cloak {
                for byte in unit.id.0.to_le_bytes() {
                    hash = fnv_step(hash, byte);
                }
                for byte in cloak.sync_hash().to_le_bytes() {
                    hash = fnv_step(hash, byte);
                }
            }
        }
        hash
    }

    pub fn cloak_snapshot(&self, actor: ActorId) -> Result<CloakSnapshot> {
        let unit = self.units.get(&actor).ok_or(CloakError::UnknownActor(actor))?;
        unit.cloak
            .as_ref()
            .map(Cloak::snapshot)
            .ok_or(CloakError::NotCloakable(actor))
    }

    pub fn restore_cloak(&mut self, actor: ActorId, snapshot: &CloakSnapshot) -> Result<()> {
        let cloak = self.cloak_mut(actor)?;
        *cloak = Cloak::restore(actor, cloak.shared_config(), snapshot)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diplomacy::stance::{Stance, StanceResolver};

    const RED: FactionId = FactionId(1);
    const BLUE: FactionId = FactionId(2);

    const RULES: &str = r#"
        [[factions]]
        id = 1
        name = "Red"
        color = [200, 40, 40]

        [[factions]]
        id = 2
        name = "Blue"
        color = [40, 80, 200]

        [actors.sub.cloak]
        initial_delay = 3
        cloak_delay = 5

        [actors.mover.cloak]
        initial_delay = 0
        cloak_delay = 5
        uncloak_on_move = true

        [actors.sonar.detect_cloaked]
        range = 3

        [actors.tank]
    "#;

    fn world() -> CloakWorld {
        let rules = RulesCatalog::parse_toml(RULES).expect("Should parse test rules");
        CloakWorld::with_config(rules, &SimulationConfig::default()).expect("valid config")
    }

    fn run(world: &mut CloakWorld, ticks: usize) {
        for _ in 0..ticks {
            world.tick();
        }
    }

    #[test]
    fn test_spawn_allocates_sequential_ids() {
        let mut world = world();
        let a = world.spawn_unit("sub", RED, CellPos::new(0, 0)).expect("spawn");
        let b = world.spawn_unit("tank", BLUE, CellPos::new(1, 0)).expect("spawn");
        assert!(a < b);
        assert_eq!(world.unit_count(), 2);
    }

    #[test]
    fn test_spawn_unknown_type_fails() {
        let mut world = world();
        let result = world.spawn_unit("zeppelin", RED, CellPos::new(0, 0));
        assert!(matches!(result, Err(CloakError::UnknownActorType(_))));
    }

    #[test]
    fn test_tick_cloaks_after_initial_delay() {
        let mut world = world();
        let sub = world.spawn_unit("sub", RED, CellPos::new(0, 0)).expect("spawn");

        run(&mut world, 2);
        assert!(world.events().is_empty());

        let events = world.tick();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].actor(), sub);
        assert_eq!(world.events().iter().next().map(|e| e.tick), Some(2));
    }

    #[test]
    fn test_detector_active_after_tick_boundary() {
        let mut world = world();
        let sub = world.spawn_unit("sub", RED, CellPos::new(0, 0)).expect("spawn");
        run(&mut world, 3);

        world.spawn_unit("sonar", BLUE, CellPos::new(1, 0)).expect("spawn");
        let blue = ObserverContext::for_faction(BLUE);
        assert!(!world.is_visible(sub, &blue).expect("query"));

        world.tick();
        assert!(world.is_visible(sub, &blue).expect("query"));
    }

    #[test]
    fn test_despawned_detector_stops_revealing() {
        let mut world = world();
        let sub = world.spawn_unit("sub", RED, CellPos::new(0, 0)).expect("spawn");
        let sonar = world.spawn_unit("sonar", BLUE, CellPos::new(1, 0)).expect("spawn");
        run(&mut world, 3);
        let blue = ObserverContext::for_faction(BLUE);
        assert!(world.is_visible(sub, &blue).expect("query"));

        world.despawn(sonar).expect("despawn");
        world.tick();
        assert!(!world.is_visible(sub, &blue).expect("query"));
        assert!(world.unit(sonar).is_none());
    }

    #[test]
    fn test_uncloak_on_move_through_tick() {
        let mut world = world();
        let mover = world.spawn_unit("mover", RED, CellPos::new(0, 0)).expect("spawn");
        world.tick(); // baseline

        world.move_unit(mover, CellPos::new(1, 0)).expect("move");
        let events = world.tick();
        assert!(matches!(events.as_slice(), [CloakEvent::Uncloaked { .. }]));
        assert_eq!(world.unit(mover).and_then(|u| u.cloak.as_ref()).map(Cloak::remaining_ticks), Some(5));
    }

    #[test]
    fn test_disabled_unit_stays_revealed() {
        let mut world = world();
        let sub = world.spawn_unit("sub", RED, CellPos::new(0, 0)).expect("spawn");
        world.set_disabled(sub, true).expect("disable");
        run(&mut world, 20);

        let remaining = world.unit(sub).and_then(|u| u.cloak.as_ref()).map(Cloak::remaining_ticks);
        assert_eq!(remaining, Some(5));
    }

    #[test]
    fn test_notifications_logged() {
        let mut world = world();
        let sub = world.spawn_unit("sub", RED, CellPos::new(0, 0)).expect("spawn");
        run(&mut world, 3);
        world.drain_events();

        assert!(world.notify_attack(sub).expect("attack").is_some());
        assert!(world.notify_attack(sub).expect("attack").is_none());
        assert_eq!(world.events().len(), 1);
    }

    #[test]
    fn test_non_cloakable_is_always_visible() {
        let mut world = world();
        let tank = world.spawn_unit("tank", RED, CellPos::new(0, 0)).expect("spawn");
        assert!(world.is_visible(tank, &ObserverContext::for_faction(BLUE)).expect("query"));
        assert!(world.notify_attack(tank).expect("attack").is_none());
        assert!(matches!(world.uncloak(tank, None), Err(CloakError::NotCloakable(_))));
    }

    #[test]
    fn test_unknown_actor_errors() {
        let world = world();
        let ghost = ActorId(99);
        assert!(matches!(
            world.is_visible(ghost, &ObserverContext::default()),
            Err(CloakError::UnknownActor(_))
        ));
    }

    #[test]
    fn test_stance_change_applies_to_next_query() {
        let mut world = world();
        let sub = world.spawn_unit("sub", RED, CellPos::new(0, 0)).expect("spawn");
        run(&mut world, 3);

        let blue = ObserverContext::for_faction(BLUE);
        assert!(!world.is_visible(sub, &blue).expect("query"));

        world.stances_mut().set_mutual(RED, BLUE, Stance::Ally);
        assert!(world.stances().is_allied(RED, BLUE));
        assert!(world.is_visible(sub, &blue).expect("query"));
    }

    #[test]
    fn test_parallel_visible_units_matches_sequential() {
        let rules = RulesCatalog::parse_toml(RULES).expect("Should parse test rules");
        let parallel_config = SimulationConfig {
            parallel_threshold: 1,
            ..SimulationConfig::default()
        };
        let mut parallel = CloakWorld::with_config(rules.clone(), &parallel_config).expect("valid config");
        let mut sequential =
            CloakWorld::with_config(rules, &SimulationConfig::default()).expect("valid config");

        for world in [&mut parallel, &mut sequential] {
            for i in 0..40 {
                let kind = if i % 4 == 0 { "sonar" } else { "sub" };
                let owner = if i % 2 == 0 { RED } else { BLUE };
                world.spawn_unit(kind, owner, CellPos::new(i * 2, i % 5)).expect("spawn");
            }
            run(world, 4);
        }

        for ctx in [
            ObserverContext::for_faction(RED),
            ObserverContext::for_faction(BLUE),
            ObserverContext::default(),
        ] {
            assert_eq!(parallel.visible_units(&ctx), sequential.visible_units(&ctx));
        }
    }

    #[test]
    fn test_radar_color_uses_faction_color() {
        let mut world = world();
        let sub = world.spawn_unit("sub", RED, CellPos::new(0, 0)).expect("spawn");
        let tank = world.spawn_unit("tank", FactionId(7), CellPos::new(0, 0)).expect("spawn");
        run(&mut world, 3);

        assert_eq!(world.radar_color(sub, Some(RED)).expect("color").a, 128);
        assert_eq!(world.radar_color(sub, Some(BLUE)).expect("color"), Color::rgb(200, 40, 40));
        assert_eq!(world.radar_color(tank, Some(RED)).expect("color"), FALLBACK_COLOR);
    }

    #[test]
    fn test_snapshot_restore_through_world() {
        let mut world = world();
        let sub = world.spawn_unit("sub", RED, CellPos::new(0, 0)).expect("spawn");
        let snapshot = world.cloak_snapshot(sub).expect("snapshot");
        let hash = world.sync_hash();

        run(&mut world, 3);
        assert_ne!(world.sync_hash(), hash);

        world.restore_cloak(sub, &snapshot).expect("restore");
        assert_eq!(world.sync_hash(), hash);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let rules = RulesCatalog::parse_toml(RULES).expect("Should parse test rules");
        let bad = SimulationConfig {
            max_event_log: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            CloakWorld::with_config(rules, &bad),
            Err(CloakError::Config(_))
        ));
    }

    #[test]
    fn test_zero_duration_uncloak_is_logged() {
        let mut world = world();
        let sub = world.spawn_unit("sub", RED, CellPos::new(0, 0)).expect("spawn");
        run(&mut world, 3);
        world.drain_events();

        let event = world.uncloak(sub, Some(0)).expect("uncloak");
        assert!(matches!(event, Some(CloakEvent::Uncloaked { .. })));
        assert_eq!(world.events().len(), 1);
        assert_eq!(world.unit(sub).and_then(|u| u.cloak.as_ref()).map(Cloak::remaining_ticks), Some(0));
    }

    #[test]
    fn test_render_directive_for_non_cloakable() {
        let mut world = world();
        let tank = world.spawn_unit("tank", RED, CellPos::new(0, 0)).expect("spawn");
        assert_eq!(
            world.render_directive(tank, &ObserverContext::local(BLUE)).expect("directive"),
            RenderDirective::Normal
        );
    }
}
