//! High-level battle runtime.
//!
//! [`BattleRuntime`] owns one encounter: the database, the party and troop,
//! the scheduler and its sinks. It ticks the scheduler and answers command
//! prompts through a [`CommandProvider`]. Use it directly with
//! [`BattleRuntime::run`] or move it onto a worker task with
//! [`BattleRuntime::spawn`].

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use battle_core::battler::UsageContext;
use battle_core::env::{ActorId, InventoryKey, ItemRef, TroopId};
use battle_core::{
    BattleConfig, BattleContext, BattleEnv, BattleManager, BattleOutcome, BattleSystem,
    EscapeOutcome, LogCommand, MemoryDatabase, Party, PcgRng, Phase, Rewards, RngOracle, Troop,
};

use crate::api::{
    ActorCommandRequest, AutoCommandProvider, CommandProvider, PartyCommand,
    PartyCommandRequest, Result, RuntimeError, RuntimeHandle,
};
use crate::events::{Event, EventBus, LifecycleEvent};
use crate::sinks::{TracingAudio, TracingPresentation};
use crate::workers::{BattleWorker, Command};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Roll preemptive and surprise odds before the battle starts.
    pub encounter_rolls: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 256,
            command_buffer_size: 32,
            encounter_rolls: false,
        }
    }
}

/// Troop to fight and the rules of the encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encounter {
    pub troop_id: TroopId,
    pub can_escape: bool,
    pub can_lose: bool,
}

impl Encounter {
    pub fn new(troop_id: TroopId) -> Self {
        Self {
            troop_id,
            can_escape: true,
            can_lose: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub actor_id: ActorId,
    pub name: String,
    pub level: u32,
    pub hp: i32,
    pub mp: i32,
    pub tp: i32,
    pub alive: bool,
}

/// Snapshot of an encounter; final once `outcome` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSummary {
    pub troop_id: TroopId,
    pub phase: Phase,
    pub outcome: Option<BattleOutcome>,
    pub rewards: Rewards,
    pub ticks: u64,
    pub turns: i32,
    pub gold: i64,
    pub party: Vec<MemberSummary>,
    pub inventory: Vec<(InventoryKey, u32)>,
}

enum InputRequest {
    Party(PartyCommandRequest),
    Actor(ActorCommandRequest),
}

/// One encounter and everything needed to drive it.
pub struct BattleRuntime {
    db: MemoryDatabase,
    config: BattleConfig,
    runtime_config: RuntimeConfig,
    party: Party,
    troop: Troop,
    manager: BattleManager,
    rng: Box<dyn RngOracle + Send>,
    presentation: TracingPresentation,
    audio: TracingAudio,
    provider: Box<dyn CommandProvider>,
    event_bus: EventBus,
    ticks: u64,
}

impl BattleRuntime {
    /// Create a new runtime builder
    pub fn builder(db: MemoryDatabase, config: BattleConfig) -> RuntimeBuilder {
        RuntimeBuilder::new(db, config)
    }

    // ===== queries =====

    pub fn manager(&self) -> &BattleManager {
        &self.manager
    }

    pub fn party(&self) -> &Party {
        &self.party
    }

    pub fn troop(&self) -> &Troop {
        &self.troop
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Every log command narrated so far.
    pub fn log(&self) -> &[LogCommand] {
        self.presentation.history()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn is_finished(&self) -> bool {
        self.manager.is_finished()
    }

    pub fn summary(&self) -> BattleSummary {
        let env = BattleEnv::new(&self.db, &self.config);
        let party = self
            .party
            .battle_member_indices(env)
            .into_iter()
            .filter_map(|index| self.party.member(index))
            .map(|actor| MemberSummary {
                actor_id: actor.as_actor().map_or(0, |data| data.actor_id),
                name: actor.name(env),
                level: actor.level(),
                hp: actor.hp(),
                mp: actor.mp(),
                tp: actor.tp(),
                alive: actor.is_alive(env),
            })
            .collect();
        BattleSummary {
            troop_id: self.troop.troop_id(),
            phase: self.manager.phase(),
            outcome: self.manager.result(),
            rewards: self.manager.rewards().clone(),
            ticks: self.ticks,
            turns: self.troop.turn_count(),
            gold: self.party.gold(),
            party,
            inventory: self.party.inventory().iter().collect(),
        }
    }

    // ===== driving =====

    /// Ticks until battle-end cleanup has run.
    pub async fn run(&mut self, max_ticks: u64) -> Result<BattleSummary> {
        let limit = self.ticks.saturating_add(max_ticks);
        while !self.manager.is_finished() {
            if self.ticks >= limit {
                return Err(RuntimeError::TickLimit { max_ticks });
            }
            self.tick().await?;
        }
        Ok(self.summary())
    }

    /// Answers a pending command prompt, if any, then advances the
    /// scheduler by one tick.
    pub async fn tick(&mut self) -> Result<()> {
        if self.manager.is_finished() {
            return Ok(());
        }
        let from = self.manager.phase();
        if let Some(request) = self.with_context(|manager, ctx| input_request(manager, ctx)) {
            self.answer(request).await?;
        }

        let time_active = self.is_time_active();
        self.with_context(|manager, ctx| manager.update(ctx, time_active));
        self.ticks += 1;

        let to = self.manager.phase();
        if from != to {
            debug!(tick = self.ticks, %from, %to, "phase changed");
            self.event_bus
                .publish(Event::Lifecycle(LifecycleEvent::PhaseChanged {
                    tick: self.ticks,
                    from,
                    to,
                }));
        }
        if self.manager.is_finished() {
            let summary = self.summary();
            info!(
                outcome = ?summary.outcome,
                ticks = summary.ticks,
                exp = summary.rewards.exp,
                gold = summary.rewards.gold,
                "battle finished"
            );
            self.event_bus
                .publish(Event::Lifecycle(LifecycleEvent::Finished(Box::new(summary))));
        }
        Ok(())
    }

    /// Requests an abort; it takes effect on the next tick.
    pub fn abort(&mut self) {
        self.manager.abort();
    }

    /// Party command "escape", outside of the command provider.
    pub fn process_escape(&mut self) -> EscapeOutcome {
        self.with_context(|manager, ctx| manager.process_escape(ctx))
    }

    /// Moves the runtime onto a worker task.
    ///
    /// The task ends when every [`RuntimeHandle`] has been dropped and
    /// hands the runtime back through its join handle.
    pub fn spawn(self) -> (RuntimeHandle, JoinHandle<BattleRuntime>) {
        let (command_tx, command_rx) =
            mpsc::channel::<Command>(self.runtime_config.command_buffer_size);
        let handle = RuntimeHandle::new(command_tx, self.event_bus.clone());
        let worker = BattleWorker::new(self, command_rx);
        let join = tokio::spawn(worker.run());
        (handle, join)
    }

    // ===== internals =====

    fn with_context<R>(
        &mut self,
        f: impl FnOnce(&mut BattleManager, &mut BattleContext<'_>) -> R,
    ) -> R {
        let env = BattleEnv::new(&self.db, &self.config);
        let mut ctx = BattleContext::new(
            env,
            &mut self.party,
            &mut self.troop,
            &mut *self.rng,
            &mut self.presentation,
            &mut self.audio,
        );
        f(&mut self.manager, &mut ctx)
    }

    /// Wait mode freezes the clocks while commands are being chosen.
    fn is_time_active(&self) -> bool {
        !(self.config.battle_system == BattleSystem::WaitTimeBar && self.manager.is_inputting())
    }

    async fn answer(&mut self, request: InputRequest) -> Result<()> {
        match request {
            InputRequest::Party(window) => {
                let command = self.provider.party_command(&window).await?;
                if command == PartyCommand::Escape {
                    let outcome = self.process_escape();
                    debug!(%outcome, "party chose to escape");
                    if outcome != EscapeOutcome::Forbidden {
                        return Ok(());
                    }
                }
                self.with_context(|manager, ctx| manager.select_next_command(ctx));
            }
            InputRequest::Actor(request) => {
                let action = self.provider.actor_command(&request).await?;
                debug!(actor = request.actor_id, ?action, "command chosen");
                self.with_context(|manager, ctx| {
                    if let Some(slot) = manager.inputting_action_mut(ctx) {
                        *slot = action;
                    }
                    manager.select_next_command(ctx);
                });
            }
        }
        Ok(())
    }
}

fn input_request(manager: &BattleManager, ctx: &BattleContext<'_>) -> Option<InputRequest> {
    if !manager.is_inputting()
        || manager.is_busy(ctx)
        || matches!(manager.phase(), Phase::Aborting | Phase::BattleEnd)
    {
        return None;
    }
    let Some(id) = manager.actor() else {
        return Some(InputRequest::Party(PartyCommandRequest {
            can_escape: manager.can_escape(),
            escape_ratio: manager.escape_ratio(),
            turn: ctx.troop.turn_count(),
        }));
    };

    let env = ctx.env;
    let actor = ctx.party.member(id.index)?;
    let inventory = ctx.party.inventory();
    let usage = UsageContext::new(Some(inventory), manager.can_escape());
    let attack = actor.attack_skill_id(env);
    let usable_items = inventory
        .iter()
        .filter_map(|(key, _)| match key {
            InventoryKey::Item(item) => Some(item),
            _ => None,
        })
        .filter(|item| actor.can_use(env, ItemRef::Item(*item), usage))
        .collect();
    let enemies = ctx.troop.view();
    let enemy_targets = enemies
        .alive(env)
        .into_iter()
        .filter_map(|enemy| enemies.position(enemy))
        .collect();

    Some(InputRequest::Actor(ActorCommandRequest {
        actor: id,
        actor_id: actor.as_actor().map_or(0, |data| data.actor_id),
        name: actor.name(env),
        attack_skill: actor
            .can_use(env, ItemRef::Skill(attack), usage)
            .then_some(attack),
        guard_skill: env.config().guard_skill_id,
        usable_skills: actor.usable_skills(env, usage),
        usable_items,
        enemy_targets,
    }))
}

/// Builder for [`BattleRuntime`] with flexible configuration.
pub struct RuntimeBuilder {
    db: MemoryDatabase,
    config: BattleConfig,
    runtime_config: RuntimeConfig,
    actors: Option<Vec<ActorId>>,
    encounter: Encounter,
    rng: Option<Box<dyn RngOracle + Send>>,
    provider: Option<Box<dyn CommandProvider>>,
    items: Vec<(InventoryKey, u32)>,
    gold: i64,
}

impl RuntimeBuilder {
    fn new(db: MemoryDatabase, config: BattleConfig) -> Self {
        Self {
            db,
            config,
            runtime_config: RuntimeConfig::default(),
            actors: None,
            encounter: Encounter::new(1),
            rng: None,
            provider: None,
            items: Vec::new(),
            gold: 0,
        }
    }

    /// Override runtime configuration
    pub fn runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    pub fn encounter(mut self, encounter: Encounter) -> Self {
        self.encounter = encounter;
        self
    }

    /// Party members in order. Defaults to every actor in the database.
    pub fn party(mut self, actors: impl IntoIterator<Item = ActorId>) -> Self {
        self.actors = Some(actors.into_iter().collect());
        self
    }

    /// Seeds the default [`PcgRng`].
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Some(Box::new(PcgRng::new(seed)));
        self
    }

    pub fn rng(mut self, rng: impl RngOracle + Send + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Defaults to [`AutoCommandProvider`].
    pub fn provider(mut self, provider: impl CommandProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    pub fn item(mut self, key: InventoryKey, amount: u32) -> Self {
        self.items.push((key, amount));
        self
    }

    pub fn gold(mut self, gold: i64) -> Self {
        self.gold = gold;
        self
    }

    /// Sets the encounter up and starts the battle.
    pub fn build(self) -> Result<BattleRuntime> {
        let env = BattleEnv::new(&self.db, &self.config);
        let actors = self
            .actors
            .unwrap_or_else(|| self.db.actors.keys().copied().collect());
        let mut party = Party::from_actors(env, actors).map_err(RuntimeError::Party)?;
        for (key, amount) in self.items {
            party
                .inventory_mut()
                .gain_item(key, amount, self.config.max_items);
        }
        party.gain_gold(env, self.gold);

        let Encounter {
            troop_id,
            can_escape,
            can_lose,
        } = self.encounter;
        let mut manager = BattleManager::new();
        let troop = manager.setup(env, &party, troop_id, can_escape, can_lose)?;

        let event_bus = EventBus::with_capacity(self.runtime_config.event_buffer_size);
        let mut runtime = BattleRuntime {
            presentation: TracingPresentation::new(Some(event_bus.clone())),
            audio: TracingAudio::new(Some(event_bus.clone())),
            rng: self.rng.unwrap_or_else(|| Box::new(PcgRng::new(0))),
            provider: self
                .provider
                .unwrap_or_else(|| Box::new(AutoCommandProvider)),
            db: self.db,
            config: self.config,
            runtime_config: self.runtime_config,
            party,
            troop,
            manager,
            event_bus,
            ticks: 0,
        };

        let encounter_rolls = runtime.runtime_config.encounter_rolls;
        runtime.with_context(|manager, ctx| {
            if encounter_rolls {
                manager.on_encounter(ctx);
            }
            manager.start_battle(ctx);
        });
        info!(
            troop = troop_id,
            system = %runtime.config.battle_system,
            preemptive = runtime.manager.is_preemptive(),
            surprise = runtime.manager.is_surprise(),
            "battle started"
        );
        Ok(runtime)
    }
}
