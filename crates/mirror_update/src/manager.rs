//! The update manager — one refresh pass over the reachable entity graph.
//!
//! Each tick the manager walks the reference graph breadth-first from a set
//! of root identities, asking the strategy per container whether to refresh
//! and pulling due containers from the source adapter. The frontier is a
//! sequential queue with a deterministic visit order so frame-over-frame
//! behaviour is reproducible; a visited set gives at-most-once-per-frame
//! semantics even though the reference graph may contain cycles.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use mirror_entity::{ContainerRegistry, SourceAdapter};
use mirror_store::{ContainerIdentity, Frame};

use crate::strategy::UpdateStrategy;

/// Statistics for one completed (or abandoned) traversal pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// The frame the pass ran for.
    pub frame: Frame,
    /// Identities dequeued and marked visited.
    pub visited: usize,
    /// Containers pulled from the source.
    pub updated: usize,
    /// Containers the strategy left stale this pass.
    pub skipped: usize,
    /// Containers retired because the source no longer knows them.
    pub retired: usize,
    /// Per-attribute failures across all pulls (logged and skipped).
    pub attribute_errors: usize,
    /// Whether the pass was abandoned by the cancel flag. Attributes
    /// committed before cancellation stay committed.
    pub cancelled: bool,
}

/// The traversal engine executing one refresh pass per tick.
#[derive(Debug)]
pub struct UpdateManager {
    registry: Arc<ContainerRegistry>,
    strategy: UpdateStrategy,
}

impl UpdateManager {
    /// Create a manager refreshing `registry` under `strategy`.
    #[must_use]
    pub fn new(registry: Arc<ContainerRegistry>, strategy: UpdateStrategy) -> Self {
        Self { registry, strategy }
    }

    /// The registry this manager refreshes.
    #[must_use]
    pub fn registry(&self) -> &Arc<ContainerRegistry> {
        &self.registry
    }

    /// The strategy consulted for every reachable container.
    #[must_use]
    pub const fn strategy(&self) -> &UpdateStrategy {
        &self.strategy
    }

    /// Run one full refresh pass for `frame`, starting from `roots`.
    pub fn run_pass(
        &self,
        adapter: &dyn SourceAdapter,
        frame: Frame,
        roots: &[ContainerIdentity],
    ) -> PassReport {
        self.run_pass_with_cancel(adapter, frame, roots, &AtomicBool::new(false))
    }

    /// Run one refresh pass, abandoning it as soon as `cancel` reads true.
    ///
    /// Cancellation is observed between containers; the container being
    /// pulled when the flag flips finishes its batch, and nothing is rolled
    /// back.
    pub fn run_pass_with_cancel(
        &self,
        adapter: &dyn SourceAdapter,
        frame: Frame,
        roots: &[ContainerIdentity],
        cancel: &AtomicBool,
    ) -> PassReport {
        let mut report = PassReport {
            frame,
            ..PassReport::default()
        };
        let mut visited: HashSet<ContainerIdentity> = HashSet::new();
        let mut frontier: VecDeque<(ContainerIdentity, u32)> =
            roots.iter().map(|&identity| (identity, 0)).collect();

        debug!(%frame, roots = roots.len(), "pass start");

        while let Some((identity, depth)) = frontier.pop_front() {
            if cancel.load(Ordering::Acquire) {
                report.cancelled = true;
                info!(%frame, visited = report.visited, "pass abandoned");
                break;
            }
            // At-most-once per pass; also breaks reference cycles.
            if !visited.insert(identity) {
                continue;
            }
            report.visited += 1;

            if !adapter.exists(identity) {
                if self.registry.retire(identity) {
                    warn!(container = %identity, %frame, "source lost entity, retired");
                    report.retired += 1;
                }
                // No expansion from a gone entity; sibling branches continue.
                continue;
            }

            let existing = self.registry.resolve(identity);
            let newly_seen = existing.is_none();
            let frames_since = existing
                .as_ref()
                .map_or(u64::MAX, |handle| handle.read().frames_since(frame));
            if !self.strategy.should_update(frames_since, depth) {
                // Stale this tick by policy, not a fault. The frontier does
                // not extend through an unrefreshed container, and a
                // first-sighted identity the strategy declines is not
                // registered at all.
                report.skipped += 1;
                continue;
            }

            let handle = existing.unwrap_or_else(|| self.registry.ensure(identity));
            let outcome = handle.write().pull_from_source(adapter, frame);
            report.attribute_errors += outcome.errors.len();
            if outcome.entity_gone {
                // The entity vanished between the exists probe and the
                // attribute reads. Same treatment as a failed probe: retire,
                // keep committed attributes, expand nothing.
                if self.registry.retire(identity) {
                    warn!(container = %identity, %frame, "entity vanished mid-pull, retired");
                    report.retired += 1;
                }
                continue;
            }
            report.updated += 1;
            debug!(
                container = %identity,
                depth,
                applied = outcome.applied,
                errors = outcome.errors.len(),
                "container refreshed"
            );

            let mut references = handle.read().referenced_containers();
            if newly_seen {
                // First sighting: the cache may not carry references yet, so
                // let the adapter seed the frontier once.
                for discovered in adapter.discover_references(identity) {
                    if !references.contains(&discovered) {
                        references.push(discovered);
                    }
                }
            }
            for reference in references {
                if !visited.contains(&reference) {
                    frontier.push_back((reference, depth + 1));
                }
            }
        }

        info!(
            %frame,
            visited = report.visited,
            updated = report.updated,
            skipped = report.skipped,
            retired = report.retired,
            attribute_errors = report.attribute_errors,
            cancelled = report.cancelled,
            "pass complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use mirror_entity::SourceError;
    use mirror_store::{AttributeValue, ContainerKind};

    use super::*;

    /// Adapter fixture: a mutable scripted game state plus a log of the
    /// order entities were probed in. Identities in `stale` still answer the
    /// existence probe positively after their entity data is removed, the
    /// way a live source can race its own bookkeeping.
    #[derive(Default)]
    struct ScriptedSource {
        entities: Mutex<HashMap<ContainerIdentity, HashMap<&'static str, AttributeValue>>>,
        discover: Mutex<HashMap<ContainerIdentity, Vec<ContainerIdentity>>>,
        probes: Mutex<Vec<ContainerIdentity>>,
        stale: Mutex<HashSet<ContainerIdentity>>,
    }

    impl ScriptedSource {
        fn insert(
            &self,
            identity: ContainerIdentity,
            attributes: Vec<(&'static str, AttributeValue)>,
        ) {
            self.entities
                .lock()
                .unwrap()
                .insert(identity, attributes.into_iter().collect());
        }

        fn remove(&self, identity: ContainerIdentity) {
            self.entities.lock().unwrap().remove(&identity);
        }

        fn set_attribute(
            &self,
            identity: ContainerIdentity,
            key: &'static str,
            value: AttributeValue,
        ) {
            if let Some(attrs) = self.entities.lock().unwrap().get_mut(&identity) {
                attrs.insert(key, value);
            }
        }

        fn seed_discovery(&self, identity: ContainerIdentity, related: Vec<ContainerIdentity>) {
            self.discover.lock().unwrap().insert(identity, related);
        }

        fn mark_stale(&self, identity: ContainerIdentity) {
            self.stale.lock().unwrap().insert(identity);
        }

        fn probe_order(&self) -> Vec<ContainerIdentity> {
            self.probes.lock().unwrap().clone()
        }
    }

    impl SourceAdapter for ScriptedSource {
        fn exists(&self, identity: ContainerIdentity) -> bool {
            self.probes.lock().unwrap().push(identity);
            self.entities.lock().unwrap().contains_key(&identity)
                || self.stale.lock().unwrap().contains(&identity)
        }

        fn read_attribute(
            &self,
            identity: ContainerIdentity,
            key: &str,
        ) -> Result<Option<AttributeValue>, SourceError> {
            let entities = self.entities.lock().unwrap();
            let attrs = entities
                .get(&identity)
                .ok_or(SourceError::EntityRetired(identity))?;
            Ok(attrs.get(key).cloned())
        }

        fn discover_references(&self, identity: ContainerIdentity) -> Vec<ContainerIdentity> {
            self.discover
                .lock()
                .unwrap()
                .get(&identity)
                .cloned()
                .unwrap_or_default()
        }
    }

    fn player(id: u64) -> ContainerIdentity {
        ContainerIdentity::new(ContainerKind::Player, id)
    }

    fn unit(id: u64) -> ContainerIdentity {
        ContainerIdentity::new(ContainerKind::Unit, id)
    }

    fn tile(id: u64) -> ContainerIdentity {
        ContainerIdentity::new(ContainerKind::TilePosition, id)
    }

    fn eager_manager() -> (UpdateManager, Arc<ContainerRegistry>) {
        let registry = Arc::new(ContainerRegistry::new());
        let manager = UpdateManager::new(registry.clone(), UpdateStrategy::Eager);
        (manager, registry)
    }

    #[test]
    fn test_pass_updates_root_and_references() {
        let (manager, registry) = eager_manager();
        let source = ScriptedSource::default();
        source.insert(
            player(1),
            vec![
                ("minerals", AttributeValue::Int(50)),
                ("units", AttributeValue::Refs(vec![unit(10), unit(11)])),
            ],
        );
        source.insert(unit(10), vec![("hit_points", AttributeValue::Int(40))]);
        source.insert(unit(11), vec![("hit_points", AttributeValue::Int(35))]);

        let report = manager.run_pass(&source, Frame(1), &[player(1)]);
        assert_eq!(report.visited, 3);
        assert_eq!(report.updated, 3);
        assert_eq!(report.retired, 0);
        assert_eq!(
            registry.latest_value(unit(11), "hit_points"),
            Some(AttributeValue::Int(35))
        );
    }

    #[test]
    fn test_cycle_visited_once_each() {
        let (manager, _registry) = eager_manager();
        let source = ScriptedSource::default();
        // unit 1 stands on tile 5; tile 5 lists unit 1 back.
        source.insert(
            unit(1),
            vec![("tile", AttributeValue::Refs(vec![tile(5)]))],
        );
        source.insert(
            tile(5),
            vec![("units", AttributeValue::Refs(vec![unit(1)]))],
        );

        let report = manager.run_pass(&source, Frame(1), &[unit(1)]);
        assert_eq!(report.visited, 2, "A and B each visited exactly once");
        assert_eq!(report.updated, 2);
    }

    #[test]
    fn test_duplicate_roots_visited_once() {
        let (manager, _registry) = eager_manager();
        let source = ScriptedSource::default();
        source.insert(player(1), vec![("minerals", AttributeValue::Int(1))]);

        let report = manager.run_pass(&source, Frame(1), &[player(1), player(1)]);
        assert_eq!(report.visited, 1);
        assert_eq!(report.updated, 1);
    }

    #[test]
    fn test_retirement_mid_pass_isolates_branch() {
        let (manager, registry) = eager_manager();
        let source = ScriptedSource::default();
        source.insert(
            player(1),
            vec![("units", AttributeValue::Refs(vec![unit(7), unit(8)]))],
        );
        source.insert(unit(7), vec![("hit_points", AttributeValue::Int(10))]);
        source.insert(unit(8), vec![("hit_points", AttributeValue::Int(20))]);
        manager.run_pass(&source, Frame(1), &[player(1)]);
        assert!(registry.is_active(unit(7)));

        // The source loses unit 7; unit 8 keeps changing.
        source.remove(unit(7));
        source.set_attribute(unit(8), "hit_points", AttributeValue::Int(15));

        let report = manager.run_pass(&source, Frame(2), &[player(1)]);
        assert_eq!(report.retired, 1);
        assert!(!registry.is_active(unit(7)));
        // The sibling branch still completed and committed its update.
        assert_eq!(
            registry.latest_value(unit(8), "hit_points"),
            Some(AttributeValue::Int(15))
        );
        // The retired container's history survives.
        let history = registry.retired_history(unit(7));
        assert_eq!(history.len(), 1);
        assert_eq!(
            history[0].value_at("hit_points", Frame(2)),
            Some(AttributeValue::Int(10))
        );
    }

    #[test]
    fn test_entity_gone_mid_pull_retires_and_stops_expansion() {
        let (manager, registry) = eager_manager();
        let source = ScriptedSource::default();
        source.insert(
            unit(7),
            vec![("target", AttributeValue::Refs(vec![unit(9)]))],
        );
        source.insert(unit(9), vec![("hit_points", AttributeValue::Int(30))]);
        manager.run_pass(&source, Frame(1), &[unit(7)]);
        assert!(registry.is_active(unit(7)));

        // The entity vanishes, but the existence probe lags behind: every
        // attribute read now reports it retired.
        source.remove(unit(7));
        source.mark_stale(unit(7));

        let report = manager.run_pass(&source, Frame(2), &[unit(7)]);
        assert_eq!(report.retired, 1);
        assert_eq!(report.updated, 0);
        assert!(!registry.is_active(unit(7)));
        // The cached target reference must not extend the frontier.
        assert_eq!(report.visited, 1);
        // History up to the last committed frame survives retirement.
        let history = registry.retired_history(unit(7));
        assert_eq!(history.len(), 1);
        assert_eq!(
            history[0].latest("target"),
            Some(AttributeValue::Refs(vec![unit(9)]))
        );
    }

    #[test]
    fn test_throttled_pass_skips_fresh_containers() {
        let registry = Arc::new(ContainerRegistry::new());
        let manager = UpdateManager::new(
            registry.clone(),
            UpdateStrategy::Throttled { min_interval: 5 },
        );
        let source = ScriptedSource::default();
        source.insert(player(1), vec![("minerals", AttributeValue::Int(1))]);

        // Never updated: due regardless of interval.
        let first = manager.run_pass(&source, Frame(1), &[player(1)]);
        assert_eq!(first.updated, 1);

        // Two frames later: still fresh, kept stale by design.
        source.set_attribute(player(1), "minerals", AttributeValue::Int(2));
        let second = manager.run_pass(&source, Frame(3), &[player(1)]);
        assert_eq!(second.updated, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(
            registry.latest_value(player(1), "minerals"),
            Some(AttributeValue::Int(1)),
            "skipped container keeps stale data"
        );

        // Interval reached: refreshes again.
        let third = manager.run_pass(&source, Frame(6), &[player(1)]);
        assert_eq!(third.updated, 1);
        assert_eq!(
            registry.latest_value(player(1), "minerals"),
            Some(AttributeValue::Int(2))
        );
    }

    #[test]
    fn test_depth_limit_stops_expansion() {
        let registry = Arc::new(ContainerRegistry::new());
        let manager = UpdateManager::new(
            registry.clone(),
            UpdateStrategy::DepthLimited { max_depth: 0 },
        );
        let source = ScriptedSource::default();
        source.insert(
            player(1),
            vec![("units", AttributeValue::Refs(vec![unit(2)]))],
        );
        source.insert(
            unit(2),
            vec![("tile", AttributeValue::Refs(vec![tile(3)]))],
        );
        source.insert(tile(3), vec![]);

        let report = manager.run_pass(&source, Frame(1), &[player(1)]);
        // Root updated; unit visited but skipped; the skipped container does
        // not extend the frontier, so the tile is never reached.
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.visited, 2);
        assert!(!registry.is_active(tile(3)));
    }

    #[test]
    fn test_declined_first_sighting_is_not_registered() {
        let registry = Arc::new(ContainerRegistry::new());
        let manager = UpdateManager::new(
            registry.clone(),
            UpdateStrategy::DepthLimited { max_depth: 0 },
        );
        let source = ScriptedSource::default();
        source.insert(
            player(1),
            vec![("units", AttributeValue::Refs(vec![unit(2)]))],
        );
        source.insert(unit(2), vec![("hit_points", AttributeValue::Int(40))]);

        let report = manager.run_pass(&source, Frame(1), &[player(1)]);
        assert_eq!(report.skipped, 1);
        // A first-sighted identity the strategy declines leaves no empty
        // container behind in the active set.
        assert!(!registry.is_active(unit(2)));
        assert!(registry.all_of_kind(ContainerKind::Unit).is_empty());
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn test_discovery_seeds_first_sighting() {
        let (manager, registry) = eager_manager();
        let source = ScriptedSource::default();
        // The player's own reference registers read unknown this tick, but
        // the adapter can still point at its units.
        source.insert(player(1), vec![("minerals", AttributeValue::Int(5))]);
        source.insert(unit(4), vec![("hit_points", AttributeValue::Int(9))]);
        source.seed_discovery(player(1), vec![unit(4)]);

        let report = manager.run_pass(&source, Frame(1), &[player(1)]);
        assert_eq!(report.visited, 2);
        assert!(registry.is_active(unit(4)));
    }

    #[test]
    fn test_unknown_root_is_not_created() {
        let (manager, registry) = eager_manager();
        let source = ScriptedSource::default();

        let report = manager.run_pass(&source, Frame(1), &[player(9)]);
        assert_eq!(report.visited, 1);
        assert_eq!(report.updated, 0);
        assert_eq!(report.retired, 0, "nothing to retire for a never-seen id");
        assert!(!registry.is_active(player(9)));
    }

    #[test]
    fn test_cancelled_pass_keeps_committed_work() {
        let (manager, registry) = eager_manager();
        let source = ScriptedSource::default();
        source.insert(player(1), vec![("minerals", AttributeValue::Int(5))]);

        let cancel = AtomicBool::new(true);
        let report = manager.run_pass_with_cancel(&source, Frame(1), &[player(1)], &cancel);
        assert!(report.cancelled);
        assert_eq!(report.visited, 0, "flag was up before the first dequeue");
        assert!(!registry.is_active(player(1)));
    }

    #[test]
    fn test_visit_order_is_deterministic() {
        let build_source = || {
            let source = ScriptedSource::default();
            source.insert(
                player(1),
                vec![("units", AttributeValue::Refs(vec![unit(3), unit(2)]))],
            );
            source.insert(
                unit(2),
                vec![("tile", AttributeValue::Refs(vec![tile(9)]))],
            );
            source.insert(unit(3), vec![]);
            source.insert(tile(9), vec![]);
            source
        };

        let run = || {
            let (manager, _registry) = eager_manager();
            let source = build_source();
            manager.run_pass(&source, Frame(1), &[player(1)]);
            source.probe_order()
        };

        let first = run();
        let second = run();
        assert_eq!(first, second, "identical passes probe in identical order");
        // Breadth-first in reference declaration order.
        assert_eq!(first, vec![player(1), unit(3), unit(2), tile(9)]);
    }

    #[test]
    fn test_reader_thread_during_pass() {
        let (manager, registry) = eager_manager();
        let source = ScriptedSource::default();
        source.insert(player(1), vec![("minerals", AttributeValue::Int(0))]);
        manager.run_pass(&source, Frame(0), &[player(1)]);

        let reader_registry = registry.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let reader = std::thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                // Consumers may read while the next tick's traversal is in
                // flight; they see a committed value or nothing, never an error.
                let _ = reader_registry.latest_value(player(1), "minerals");
            }
        });

        for frame in 1..100u64 {
            source.set_attribute(player(1), "minerals", AttributeValue::Int(frame as i64));
            manager.run_pass(&source, Frame(frame), &[player(1)]);
        }
        stop.store(true, Ordering::Relaxed);
        reader.join().unwrap();
        assert_eq!(
            registry.latest_value(player(1), "minerals"),
            Some(AttributeValue::Int(99))
        );
    }
}
