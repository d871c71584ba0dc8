use super::*;
use crate::battler::test_support;
use crate::battler::ForceTarget;
use crate::config::{BattleConfig, BattleSystem};
use crate::env::{
    EnemyDef, ItemRef, LogCommand, MemoryDatabase, ScriptedRng, SoundCue, TroopDef, TroopMember,
};
use crate::error::SetupError;
use crate::stats::{BattlerTrait, ExParam, Param};

struct Harness {
    db: MemoryDatabase,
    config: BattleConfig,
    party: Party,
    troop: Troop,
    rng: ScriptedRng,
    log: Vec<LogCommand>,
    audio: Vec<SoundCue>,
    manager: BattleManager,
}

impl Harness {
    fn new(system: BattleSystem) -> Self {
        Self::build(
            test_support::database(),
            BattleConfig::with_battle_system(system),
            1,
            true,
            false,
        )
    }

    fn build(
        db: MemoryDatabase,
        config: BattleConfig,
        troop_id: u32,
        can_escape: bool,
        can_lose: bool,
    ) -> Self {
        let env = BattleEnv::new(&db, &config);
        let party = Party::from_actors(env, [1, 2]).unwrap();
        let mut manager = BattleManager::new();
        let troop = manager
            .setup(env, &party, troop_id, can_escape, can_lose)
            .unwrap();
        Self {
            db,
            config,
            party,
            troop,
            rng: ScriptedRng::constant(0.5),
            log: Vec::new(),
            audio: Vec::new(),
            manager,
        }
    }

    fn with<R>(&mut self, f: impl FnOnce(&mut BattleManager, &mut BattleContext<'_>) -> R) -> R {
        let Self {
            db,
            config,
            party,
            troop,
            rng,
            log,
            audio,
            manager,
        } = self;
        let env = BattleEnv::new(&*db, &*config);
        let mut ctx = BattleContext::new(env, party, troop, rng, log, audio);
        f(manager, &mut ctx)
    }

    fn start(&mut self) {
        self.with(|manager, ctx| manager.start_battle(ctx));
    }

    /// Ticks until cleanup has run, answering every command prompt with an
    /// attack on the first enemy. Returns the ticks spent.
    fn run(&mut self, max_ticks: usize, time_active: bool) -> usize {
        for tick in 0..max_ticks {
            if self.manager.is_finished() {
                return tick;
            }
            self.with(|manager, ctx| {
                if manager.is_inputting() {
                    if let Some(action) = manager.inputting_action_mut(ctx) {
                        *action = Action::skill(1).with_target(0);
                    }
                    manager.select_next_command(ctx);
                }
                manager.update(ctx, time_active);
            });
        }
        max_ticks
    }

    fn logged(&self, command: &LogCommand) -> bool {
        self.log.contains(command)
    }

    /// Experience each party member earned on top of its level-1 total.
    fn exp_gained(&self) -> Vec<i64> {
        let env = BattleEnv::new(&self.db, &self.config);
        self.party
            .members()
            .iter()
            .map(|actor| actor.current_exp() - actor.exp_for_level(env, 1))
            .collect()
    }
}

fn counter_database() -> MemoryDatabase {
    let db = test_support::database();
    let mut slime: EnemyDef = db.enemies[&1].clone();
    slime.name = "Hedgehog".into();
    slime.traits.push(BattlerTrait::ExParam {
        param: ExParam::Counter,
        value: 1.0,
    });
    db.with_enemy(3, slime).with_troop(
        2,
        TroopDef {
            name: "Hedgehog".into(),
            members: vec![TroopMember {
                enemy_id: 3,
                hidden: false,
            }],
        },
    )
}

// ===== setup =====

#[test]
fn setup_computes_escape_ratio() {
    let h = Harness::new(BattleSystem::TurnBased);
    // 0.5 * 25 / 16
    assert!((h.manager.escape_ratio() - 0.781_25).abs() < 1e-9);
    assert_eq!(h.manager.phase(), Phase::Init);
    assert_eq!(h.troop.members().len(), 2);
}

#[test]
fn twice_as_fast_party_escapes_for_sure() {
    let mut db = test_support::database();
    if let Some(class) = db.classes.get_mut(&1) {
        class.params[0][Param::Agility.index()] = 100;
    }
    if let Some(slime) = db.enemies.get_mut(&1) {
        slime.params[Param::Agility.index()] = 50;
    }
    let h = Harness::build(db, BattleConfig::default(), 1, true, false);
    assert!((h.manager.escape_ratio() - 1.0).abs() < 1e-9);
}

#[test]
fn setup_rejects_bad_encounters() {
    let db = test_support::database().with_troop(
        5,
        TroopDef {
            name: "Nobody".into(),
            members: Vec::new(),
        },
    );
    let config = BattleConfig::default();
    let env = BattleEnv::new(&db, &config);
    let party = Party::from_actors(env, [1]).unwrap();
    let mut manager = BattleManager::new();

    assert!(matches!(
        manager.setup(env, &party, 99, true, false),
        Err(SetupError::Data(_))
    ));
    assert_eq!(
        manager.setup(env, &party, 5, true, false).unwrap_err(),
        SetupError::EmptyTroop { troop_id: 5 }
    );
    assert_eq!(
        manager.setup(env, &Party::new(), 1, true, false).unwrap_err(),
        SetupError::EmptyParty
    );
}

#[test]
fn setup_refuses_while_a_battle_runs() {
    let mut h = Harness::new(BattleSystem::TurnBased);
    h.start();
    let Harness {
        db,
        config,
        party,
        manager,
        ..
    } = &mut h;
    let env = BattleEnv::new(&*db, &*config);
    assert_eq!(
        manager.setup(env, party, 1, true, false).unwrap_err(),
        SetupError::AlreadyRunning
    );
}

// ===== encounter and start =====

#[test]
fn surprise_skips_party_input() {
    let mut h = Harness::new(BattleSystem::TurnBased);
    h.rng = ScriptedRng::new([0.9, 0.0], 0.5);
    h.with(|manager, ctx| manager.on_encounter(ctx));
    assert!(!h.manager.is_preemptive());
    assert!(h.manager.is_surprise());

    h.start();
    assert!(h.logged(&LogCommand::Surprise));
    h.with(|manager, ctx| manager.update(ctx, false));

    assert_eq!(h.manager.phase(), Phase::Turn);
    assert!(!h.manager.is_inputting());
    let order: Vec<BattlerId> = h.manager.action_battlers().collect();
    assert_eq!(order, vec![BattlerId::troop(0), BattlerId::troop(1)]);
}

#[test]
fn start_announces_every_enemy() {
    let mut h = Harness::new(BattleSystem::TurnBased);
    h.start();
    let emerged = h
        .log
        .iter()
        .filter(|command| matches!(command, LogCommand::Emerge { .. }))
        .count();
    assert_eq!(emerged, 2);
    assert_eq!(h.manager.phase(), Phase::Start);
}

// ===== strict turns =====

#[test]
fn turn_order_is_stable_by_speed() {
    let mut h = Harness::new(BattleSystem::TurnBased);
    h.start();
    h.with(|manager, ctx| manager.update(ctx, false));
    assert_eq!(h.manager.phase(), Phase::Input);
    assert!(h.manager.is_inputting());
    assert_eq!(h.manager.actor(), None);

    // party command window, then one command per actor
    h.with(|manager, ctx| manager.select_next_command(ctx));
    assert_eq!(h.manager.actor(), Some(BattlerId::party(0)));
    for _ in 0..2 {
        h.with(|manager, ctx| {
            if let Some(action) = manager.inputting_action_mut(ctx) {
                *action = Action::skill(1).with_target(0);
            }
            manager.select_next_command(ctx);
        });
    }

    // actors: 25 + 5, slimes: 16 + 4
    assert_eq!(h.manager.phase(), Phase::Turn);
    let order: Vec<BattlerId> = h.manager.action_battlers().collect();
    assert_eq!(
        order,
        vec![
            BattlerId::party(0),
            BattlerId::party(1),
            BattlerId::troop(0),
            BattlerId::troop(1),
        ]
    );
    assert!(h.logged(&LogCommand::TurnStart { turn: 1 }));
}

#[test]
fn equal_speeds_keep_party_before_troop() {
    let mut db = test_support::database();
    if let Some(slime) = db.enemies.get_mut(&1) {
        slime.params[Param::Agility.index()] = 25;
    }
    let mut h = Harness::build(db, BattleConfig::default(), 1, true, false);
    h.start();
    h.with(|manager, ctx| {
        manager.update(ctx, false);
        manager.select_next_command(ctx);
    });
    for _ in 0..2 {
        h.with(|manager, ctx| {
            if let Some(action) = manager.inputting_action_mut(ctx) {
                *action = Action::skill(1).with_target(0);
            }
            manager.select_next_command(ctx);
        });
    }

    // everyone: 25 + 5
    let speeds: Vec<i32> = h
        .party
        .members()
        .iter()
        .chain(h.troop.members())
        .map(Battler::speed)
        .collect();
    assert_eq!(speeds, vec![30; 4]);
    let order: Vec<BattlerId> = h.manager.action_battlers().collect();
    assert_eq!(
        order,
        vec![
            BattlerId::party(0),
            BattlerId::party(1),
            BattlerId::troop(0),
            BattlerId::troop(1),
        ]
    );
}

#[test]
fn strict_battle_ends_in_victory() {
    let mut h = Harness::new(BattleSystem::TurnBased);
    h.start();
    let ticks = h.run(500, false);
    assert!(ticks < 500);

    assert_eq!(h.manager.result(), Some(BattleOutcome::Win));
    assert_eq!(h.manager.rewards().exp, 20);
    assert_eq!(h.manager.rewards().gold, 10);
    assert_eq!(h.party.gold(), 10);
    assert!(h.logged(&LogCommand::Victory));
    assert!(h.audio.contains(&SoundCue::Victory));
    assert!(h.audio.contains(&SoundCue::EnemyCollapse));
    assert_eq!(h.exp_gained(), vec![20, 20]);
    assert!(h.party.members().iter().all(|actor| actor.num_actions() == 0));
}

#[test]
fn forced_action_preempts_the_phase() {
    let mut h = Harness::new(BattleSystem::TurnBased);
    h.start();
    h.with(|manager, ctx| {
        manager.force_action(ctx, BattlerId::party(0), 1, ForceTarget::Index(0));
    });
    for _ in 0..3 {
        h.with(|manager, ctx| manager.update(ctx, false));
    }

    // 20 * 4 - 5 * 2
    assert_eq!(h.troop.members()[0].hp(), 30);
    assert_eq!(h.manager.phase(), Phase::Turn);
    assert_eq!(h.manager.subject(), None);
    assert!(h.logged(&LogCommand::ActionStart {
        subject: BattlerId::party(0),
        item: ItemRef::Skill(1),
    }));
    assert!(h.logged(&LogCommand::HpDamage {
        target: BattlerId::troop(0),
        value: 70,
        drain: false,
    }));
    assert!(h.audio.contains(&SoundCue::EnemyDamage));
}

#[test]
fn forced_action_ignores_the_dead() {
    let mut h = Harness::new(BattleSystem::TurnBased);
    h.start();
    h.with(|manager, ctx| {
        let env = ctx.env;
        if let Some(slime) = ctx.troop.member_mut(0) {
            slime.set_hp(env, 0);
        }
        manager.force_action(ctx, BattlerId::troop(0), 1, ForceTarget::Random);
    });
    assert_eq!(h.troop.members()[0].num_actions(), 0);
}

#[test]
fn counter_attack_hits_the_subject() {
    let mut h = Harness::build(
        counter_database(),
        BattleConfig::default(),
        2,
        true,
        false,
    );
    h.start();
    let hp_before = h.party.members()[0].hp();
    h.with(|manager, ctx| {
        manager.force_action(ctx, BattlerId::party(0), 1, ForceTarget::Index(0));
        manager.update(ctx, false);
        manager.update(ctx, false);
    });

    // 15 * 4 - 10 * 2
    assert_eq!(h.party.members()[0].hp(), hp_before - 40);
    assert_eq!(h.troop.members()[0].hp(), 100);
    assert!(h.logged(&LogCommand::Counter {
        battler: BattlerId::troop(0)
    }));
}

// ===== escape and abort =====

#[test]
fn escape_fails_then_succeeds() {
    let mut h = Harness::new(BattleSystem::TurnBased);
    h.start();
    h.with(|manager, ctx| manager.update(ctx, false));

    h.rng = ScriptedRng::constant(0.9);
    let outcome = h.with(|manager, ctx| manager.process_escape(ctx));
    assert_eq!(outcome, EscapeOutcome::Failed);
    assert!((h.manager.escape_ratio() - 0.881_25).abs() < 1e-9);
    assert_eq!(h.manager.phase(), Phase::Turn);
    assert!(h.logged(&LogCommand::EscapeFailure));
    assert!(h.party.members().iter().all(|actor| actor.num_actions() == 0));

    h.rng = ScriptedRng::constant(0.85);
    let outcome = h.with(|manager, ctx| manager.process_escape(ctx));
    assert_eq!(outcome, EscapeOutcome::Escaped);
    assert!(h.manager.is_escaped());
    assert_eq!(h.manager.phase(), Phase::BattleEnd);
    assert_eq!(h.manager.result(), Some(BattleOutcome::Escape));
    assert!(h.logged(&LogCommand::EscapeSuccess));
    assert_eq!(
        h.audio.iter().filter(|cue| **cue == SoundCue::Escape).count(),
        2
    );
}

#[test]
fn escape_forbidden_rolls_nothing() {
    let mut h = Harness::build(
        test_support::database(),
        BattleConfig::default(),
        1,
        false,
        false,
    );
    h.rng = ScriptedRng::new([0.0], 0.5);
    let outcome = h.with(|manager, ctx| manager.process_escape(ctx));
    assert_eq!(outcome, EscapeOutcome::Forbidden);
    assert_eq!(h.rng.consumed(), 0);
    assert!(h.log.is_empty());
}

#[test]
fn abort_takes_effect_next_tick() {
    let mut h = Harness::new(BattleSystem::TurnBased);
    h.start();
    h.manager.abort();
    assert_eq!(h.manager.phase(), Phase::Aborting);
    h.with(|manager, ctx| manager.update(ctx, false));
    assert_eq!(h.manager.result(), Some(BattleOutcome::Abort));
    assert_eq!(h.manager.phase(), Phase::BattleEnd);

    h.with(|manager, ctx| manager.update(ctx, false));
    assert!(h.manager.is_finished());
}

// ===== defeat and rewards =====

fn wipe_party(h: &mut Harness) {
    h.with(|_, ctx| {
        let env = ctx.env;
        for index in 0..2 {
            if let Some(actor) = ctx.party.member_mut(index) {
                actor.set_hp(env, 0);
            }
        }
    });
}

#[test]
fn defeat_revives_when_losing_is_allowed() {
    let mut h = Harness::build(
        test_support::database(),
        BattleConfig::default(),
        1,
        true,
        true,
    );
    h.start();
    wipe_party(&mut h);
    h.with(|manager, ctx| manager.update(ctx, false));
    assert_eq!(h.manager.result(), Some(BattleOutcome::Defeat));
    assert!(h.logged(&LogCommand::Defeat));
    assert!(h.audio.contains(&SoundCue::Defeat));

    h.with(|manager, ctx| manager.update(ctx, false));
    assert!(h.manager.is_finished());
    assert!(h.party.members().iter().all(|actor| actor.hp() == 1));
}

#[test]
fn defeat_without_can_lose_leaves_the_party_down() {
    let mut h = Harness::new(BattleSystem::TurnBased);
    h.start();
    wipe_party(&mut h);
    h.run(3, false);
    assert_eq!(h.manager.result(), Some(BattleOutcome::Defeat));
    assert!(h.party.members().iter().all(|actor| actor.hp() == 0));
}

fn wipe_troop(h: &mut Harness) {
    h.with(|_, ctx| {
        let env = ctx.env;
        for index in 0..2 {
            if let Some(enemy) = ctx.troop.member_mut(index) {
                enemy.set_hp(env, 0);
            }
        }
    });
}

#[test]
fn actors_start_with_the_level_one_total() {
    let h = Harness::new(BattleSystem::TurnBased);
    let env = BattleEnv::new(&h.db, &h.config);
    for actor in h.party.members() {
        assert_eq!(actor.as_actor().map(|data| data.level), Some(1));
        // 30 * 2 / (6 + 1 / 1500), rounded
        assert_eq!(actor.exp_for_level(env, 1), 10);
        assert_eq!(actor.current_exp(), 10);
    }
    assert_eq!(h.exp_gained(), vec![0, 0]);
}

#[test]
fn reserve_members_share_exp_when_enabled() {
    let mut config = BattleConfig::default();
    config.max_battle_members = 1;
    config.reserve_exp = true;
    let mut h = Harness::build(test_support::database(), config, 1, true, false);
    h.start();
    wipe_troop(&mut h);
    h.with(|manager, ctx| manager.update(ctx, false));

    assert_eq!(h.manager.result(), Some(BattleOutcome::Win));
    assert_eq!(h.exp_gained(), vec![20, 20]);
    assert!(h.logged(&LogCommand::Rewards {
        exp: 20,
        gold: 10,
        items: Vec::new(),
    }));
}

#[test]
fn reserve_members_get_nothing_by_default() {
    let mut config = BattleConfig::default();
    config.max_battle_members = 1;
    let mut h = Harness::build(test_support::database(), config, 1, true, false);
    h.start();
    wipe_troop(&mut h);
    h.with(|manager, ctx| manager.update(ctx, false));

    assert_eq!(h.exp_gained(), vec![20, 0]);
}

// ===== time bars =====

#[test]
fn active_time_bar_battle_ends_in_victory() {
    let mut h = Harness::new(BattleSystem::ActiveTimeBar);
    h.start();
    assert_eq!(h.manager.phase(), Phase::Start);
    let ticks = h.run(20_000, true);
    assert!(ticks < 20_000);

    assert_eq!(h.manager.result(), Some(BattleOutcome::Win));
    assert!(h.troop.turn_count() >= 1);
    assert!(h.troop.is_all_dead(BattleEnv::new(&h.db, &h.config)));
}

#[test]
fn paused_clock_holds_the_time_bar() {
    let mut h = Harness::new(BattleSystem::ActiveTimeBar);
    h.start();
    h.with(|manager, ctx| manager.update(ctx, false));
    assert_eq!(h.manager.phase(), Phase::Turn);

    let charges: Vec<f64> = h
        .troop
        .members()
        .iter()
        .map(|enemy| enemy.time_bar().charge())
        .collect();
    for _ in 0..10 {
        h.with(|manager, ctx| manager.update(ctx, false));
    }
    let after: Vec<f64> = h
        .troop
        .members()
        .iter()
        .map(|enemy| enemy.time_bar().charge())
        .collect();
    assert_eq!(charges, after);
}
