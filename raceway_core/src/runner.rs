//! Race runner: one worker thread per racer.
//!
//! # Lifecycle
//!
//! ```text
//!  run()
//!   ├─ build RaceContext + one SlotWriter per lane
//!   ├─ spawn racer-<id> threads ──► lane loop until finished or eliminated
//!   │                                  ├─ step (randomness lock held)
//!   │                                  ├─ publish to own lane
//!   │                                  ├─ pace (env.sleep)
//!   │                                  └─ append to ledger on the line
//!   ├─ monitor.watch()            ◄── completion counter condvar
//!   ├─ join every worker
//!   └─ RaceOutcome (podium, eliminated, traces, final snapshot)
//! ```
//!
//! Nothing reads the ledger or the returned racers before every join has
//! returned.

use crate::board::{LaneStatus, RaceSnapshot, SlotWriter};
use crate::config::RaceConfig;
use crate::context::{RaceContext, Randomness};
use crate::entity::{Entity, Hazards, RacerId, Stride};
use crate::error::{ConfigError, RaceError, RaceResult};
use crate::monitor::{CompletionMonitor, MonitorReport};
use raceway_env::RaceEnv;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

/// One tick of one racer, as published to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRecord {
    /// 1-based tick number of this racer
    pub tick: u64,
    pub position: u32,
    pub status: LaneStatus,
}

/// Everything a worker hands back when joined.
#[derive(Debug, Clone)]
pub struct LaneReport {
    /// The racer, in its final state
    pub entity: Entity,

    /// 1-based finishing place, if the racer made it to the ledger
    pub placement: Option<usize>,

    /// Every tick the racer ran
    pub trace: Vec<TickRecord>,
}

impl LaneReport {
    pub fn id(&self) -> RacerId {
        self.entity.id()
    }

    pub fn ticks(&self) -> usize {
        self.trace.len()
    }
}

/// Final, consistent view of a finished race.
#[derive(Debug, Clone)]
pub struct RaceOutcome {
    podium: Vec<RacerId>,
    lanes: Vec<LaneReport>,
    final_snapshot: RaceSnapshot,
    monitor: MonitorReport,
    retired: usize,
}

impl RaceOutcome {
    /// Finishers in arrival order.
    pub fn podium(&self) -> &[RacerId] {
        &self.podium
    }

    pub fn winner(&self) -> Option<RacerId> {
        self.podium.first().copied()
    }

    /// 1-based place of a racer, `None` if it did not finish.
    pub fn placement_of(&self, id: RacerId) -> Option<usize> {
        self.podium.iter().position(|&p| p == id).map(|i| i + 1)
    }

    /// Racers that were eliminated, in roster order.
    pub fn eliminated(&self) -> Vec<RacerId> {
        self.lanes
            .iter()
            .filter(|lane| lane.entity.is_eliminated())
            .map(LaneReport::id)
            .collect()
    }

    /// Per-racer reports, in roster order.
    pub fn lanes(&self) -> &[LaneReport] {
        &self.lanes
    }

    pub fn lane(&self, id: RacerId) -> Option<&LaneReport> {
        self.lanes.iter().find(|lane| lane.id() == id)
    }

    /// Board as it stood after the last worker was joined.
    pub fn final_snapshot(&self) -> &RaceSnapshot {
        &self.final_snapshot
    }

    pub fn monitor(&self) -> MonitorReport {
        self.monitor
    }

    /// Completion counter value at the end of the race.
    pub fn retired(&self) -> usize {
        self.retired
    }
}

/// Spawns and drives racer workers.
///
/// Generic over the environment so the same runner paces real races with
/// `SystemEnv` and test races with `VirtualEnv`.
pub struct RaceRunner<E: RaceEnv> {
    env: Arc<E>,
    track_length: u32,
    hazards: Hazards,
    tick_delay: Duration,
    cadence: Duration,
}

impl<E: RaceEnv> RaceRunner<E> {
    /// Creates a runner with default hazards and a 50 ms tick and cadence.
    pub fn new(env: Arc<E>, track_length: u32) -> Self {
        Self {
            env,
            track_length,
            hazards: Hazards::default(),
            tick_delay: Duration::from_millis(50),
            cadence: Duration::from_millis(50),
        }
    }

    /// Creates a runner from a validated config.
    pub fn from_config(env: Arc<E>, config: &RaceConfig) -> RaceResult<Self> {
        config.validate()?;
        Ok(Self::new(env, config.track_length)
            .with_hazards(config.hazards)
            .with_tick_delay(config.tick_delay())
            .with_cadence(config.monitor_cadence()))
    }

    pub fn with_hazards(mut self, hazards: Hazards) -> Self {
        self.hazards = hazards;
        self
    }

    pub fn with_tick_delay(mut self, delay: Duration) -> Self {
        self.tick_delay = delay;
        self
    }

    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn track_length(&self) -> u32 {
        self.track_length
    }

    /// Runs a race to completion.
    ///
    /// `on_frame` is called from the calling thread with every monitor
    /// snapshot. Returns once every worker has been joined.
    pub fn run<F>(&self, roster: Vec<Entity>, randomness: Randomness, mut on_frame: F) -> RaceResult<RaceOutcome>
    where
        F: FnMut(&RaceSnapshot),
    {
        if roster.is_empty() {
            return Err(RaceError::EmptyRoster);
        }
        if self.track_length == 0 {
            return Err(ConfigError::TrackLength.into());
        }
        validate_roster(&roster)?;

        let field = roster.len();
        let ids: Vec<RacerId> = roster.iter().map(Entity::id).collect();
        let (context, writers) = RaceContext::new(self.track_length, self.hazards, randomness, &ids);

        info!(
            "Race started: {} racers, {}m track, {:?} per tick (env seed={})",
            field,
            self.track_length,
            self.tick_delay,
            self.env.seed()
        );
        let started = self.env.now();

        let mut handles: Vec<(RacerId, JoinHandle<LaneReport>)> = Vec::with_capacity(field);
        for (entity, writer) in roster.into_iter().zip(writers) {
            let id = entity.id();
            let context_ref = Arc::clone(&context);
            let env = Arc::clone(&self.env);
            let delay = self.tick_delay;
            let spawned = thread::Builder::new()
                .name(format!("racer-{id}"))
                .spawn(move || run_lane(&context_ref, env.as_ref(), delay, entity, writer));

            match spawned {
                Ok(handle) => handles.push((id, handle)),
                Err(source) => {
                    error!(racer = %id, "failed to spawn worker: {}", source);
                    if let Err(e) = join_all(handles) {
                        error!("Worker failure while unwinding a failed start: {}", e);
                    }
                    return Err(RaceError::Spawn { id, source });
                }
            }
        }

        let monitor = CompletionMonitor::new(Arc::clone(&self.env), self.cadence).watch(
            &context,
            started,
            &mut on_frame,
        );

        let lanes = join_all(handles)?;

        let retired = context.counter().retired();
        let podium = context.ledger().entries();
        let final_snapshot = context
            .board()
            .snapshot(self.env.now().saturating_sub(started), retired);

        info!(
            "Race complete: {} finished, {} eliminated, {} frames",
            podium.len(),
            lanes.iter().filter(|l| l.entity.is_eliminated()).count(),
            monitor.frames
        );

        Ok(RaceOutcome {
            podium,
            lanes,
            final_snapshot,
            monitor,
            retired,
        })
    }
}

/// Rejects rosters whose racers could stall forever, panic on a speed draw
/// or collide in the ledger.
fn validate_roster(roster: &[Entity]) -> Result<(), ConfigError> {
    let mut seen = HashSet::with_capacity(roster.len());
    for entity in roster {
        entity.profile().validate()?;
        if !seen.insert(entity.id()) {
            return Err(ConfigError::DuplicateRacer { id: entity.id() });
        }
    }
    Ok(())
}

/// Joins every worker, even after one has panicked.
fn join_all(handles: Vec<(RacerId, JoinHandle<LaneReport>)>) -> RaceResult<Vec<LaneReport>> {
    let mut lanes = Vec::with_capacity(handles.len());
    let mut first_failure = None;

    for (id, handle) in handles {
        match handle.join() {
            Ok(report) => lanes.push(report),
            Err(_) => {
                error!(racer = %id, "worker panicked");
                if first_failure.is_none() {
                    first_failure = Some(RaceError::WorkerPanicked { id });
                }
            }
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(lanes),
    }
}

/// Visual status for the tick that produced `stride`.
fn lane_status(stride: Stride, position: u32, track_length: u32) -> LaneStatus {
    if stride == Stride::Eliminated {
        LaneStatus::Eliminated
    } else if position >= track_length {
        LaneStatus::Finished
    } else if stride.distance() == 0 {
        LaneStatus::Stalled
    } else {
        LaneStatus::Advancing
    }
}

/// Body of one racer thread.
fn run_lane<E: RaceEnv + ?Sized>(
    context: &RaceContext,
    env: &E,
    tick_delay: Duration,
    mut entity: Entity,
    writer: SlotWriter,
) -> LaneReport {
    let _retirement = context.counter().enlist();
    let id = entity.id();
    let track_length = context.track_length();
    let mut draws = context.randomness().draws_for(id);
    let mut trace = Vec::new();
    let mut placement = None;

    debug!(racer = %id, "off the line");

    while !entity.has_finished(track_length) && !entity.is_eliminated() {
        let stride = draws.step(&mut entity, context.hazards());
        let position = entity.advance(stride.distance(), track_length);
        let status = lane_status(stride, position, track_length);
        writer.publish(position, status);
        trace.push(TickRecord {
            tick: trace.len() as u64 + 1,
            position,
            status,
        });

        env.sleep(tick_delay);

        if position >= track_length {
            placement = context.ledger().append(id);
            debug!(racer = %id, ?placement, ticks = trace.len(), "crossed the line");
        }
    }

    if entity.is_eliminated() {
        info!(racer = %id, position = entity.position(), "Racer {} eliminated", id);
    }

    LaneReport {
        entity,
        placement,
        trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::RacerProfile;
    use raceway_env::{SeededSource, VirtualEnv};

    fn quick_runner(track_length: u32) -> RaceRunner<VirtualEnv> {
        RaceRunner::new(VirtualEnv::shared(0), track_length)
            .with_tick_delay(Duration::ZERO)
            .with_cadence(Duration::from_millis(1))
    }

    #[test]
    fn test_lane_status_rules() {
        assert_eq!(lane_status(Stride::Eliminated, 4, 10), LaneStatus::Eliminated);
        assert_eq!(lane_status(Stride::Run(3), 10, 10), LaneStatus::Finished);
        assert_eq!(lane_status(Stride::Stalled, 4, 10), LaneStatus::Stalled);
        assert_eq!(lane_status(Stride::Stumble, 4, 10), LaneStatus::Stalled);
        assert_eq!(lane_status(Stride::Tired(1), 5, 10), LaneStatus::Advancing);
    }

    #[test]
    fn test_empty_roster_rejected() {
        let result = quick_runner(10).run(Vec::new(), Randomness::per_racer(0), |_| {});
        assert!(matches!(result, Err(RaceError::EmptyRoster)));
    }

    #[test]
    fn test_zero_speed_racer_rejected_before_spawn() {
        let roster = vec![Entity::from_profile(RacerProfile {
            id: RacerId(1),
            min_speed: 0,
            max_speed: 0,
            resistance: 1.0,
        })];

        let result = quick_runner(10).run(roster, Randomness::per_racer(0), |_| {});

        assert!(matches!(
            result,
            Err(RaceError::Config(ConfigError::RacerSpeed { min: 0, .. }))
        ));
    }

    #[test]
    fn test_inverted_speed_range_rejected() {
        let roster = vec![Entity::new(RacerId(1), 5, 2, 0.5)];
        let result = quick_runner(10).run(roster, Randomness::per_racer(0), |_| {});
        assert!(matches!(
            result,
            Err(RaceError::Config(ConfigError::RacerSpeed { min: 5, max: 2, .. }))
        ));
    }

    #[test]
    fn test_resistance_out_of_range_rejected() {
        let roster = vec![Entity::new(RacerId(1), 1, 2, 1.2)];
        let result = quick_runner(10).run(roster, Randomness::per_racer(0), |_| {});
        assert!(matches!(
            result,
            Err(RaceError::Config(ConfigError::RacerResistance { .. }))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let roster = vec![
            Entity::new(RacerId(1), 1, 2, 0.5),
            Entity::new(RacerId(1), 1, 2, 0.5),
        ];
        let result = quick_runner(5).run(roster, Randomness::per_racer(0), |_| {});
        assert!(matches!(
            result,
            Err(RaceError::Config(ConfigError::DuplicateRacer { id: RacerId(1) }))
        ));
    }

    #[test]
    fn test_from_config_validates() {
        let config = RaceConfig {
            racer_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            RaceRunner::from_config(VirtualEnv::shared(0), &config),
            Err(RaceError::Config(_))
        ));
    }

    #[test]
    fn test_race_runs_to_completion() {
        let roster: Vec<Entity> = (1..=5)
            .map(|n| Entity::new(RacerId(n), 1, 4, 0.8))
            .collect();

        let outcome = quick_runner(30)
            .run(roster, Randomness::shared(SeededSource::seeded(8)), |_| {})
            .unwrap();

        assert_eq!(outcome.retired(), 5);
        assert_eq!(outcome.lanes().len(), 5);
        assert_eq!(outcome.podium().len() + outcome.eliminated().len(), 5);
        for lane in outcome.lanes() {
            let view = outcome.final_snapshot().lane(lane.id()).unwrap();
            assert_eq!(view.position, lane.entity.position());
            assert_eq!(lane.placement, outcome.placement_of(lane.id()));
        }
    }

    #[test]
    fn test_pacing_goes_through_env() {
        let env = VirtualEnv::shared(0);
        let runner = RaceRunner::new(Arc::clone(&env), 5)
            .with_hazards(Hazards::none())
            .with_tick_delay(Duration::from_millis(50))
            .with_cadence(Duration::from_millis(1));
        let roster = vec![Entity::new(RacerId(1), 1, 1, 1.0)];

        let outcome = runner
            .run(roster, Randomness::per_racer(3), |_| {})
            .unwrap();

        assert_eq!(outcome.lanes()[0].ticks(), 5);
        assert_eq!(env.sleep_calls(), 5);
        assert_eq!(env.total_slept(), Duration::from_millis(250));
    }
}
