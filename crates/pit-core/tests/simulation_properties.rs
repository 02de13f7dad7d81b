//! Behavioural tests for the simulation state machine.

use chrono::{Duration, FixedOffset, TimeZone};
use pit_core::{
    Assignment, PolicyKind, RecognitionOutcome, Simulation, TickDecision, TickOutcome, Timestamp,
    LOG_WINDOW, SLOT_COUNT, SUMMARY_WINDOW,
};

fn t0() -> Timestamp {
    FixedOffset::east_opt(7 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
        .unwrap()
}

fn interval() -> Duration {
    Duration::seconds(120)
}

/// Drives one due wake and applies `label`. Returns the ticket image and the outcome.
fn tick(sim: &mut Simulation, now: &Timestamp, label: &str) -> Option<(String, TickOutcome)> {
    match sim.begin_tick(now) {
        TickDecision::Process(ticket) => {
            let image = ticket.image().to_string();
            let out = sim.complete_tick(ticket, &RecognitionOutcome::Plate(label.into()));
            Some((image, out))
        }
        _ => None,
    }
}

#[test]
fn queue_is_sorted_at_start() {
    let mut sim = Simulation::with_policy(PolicyKind::Rotate);
    for name in ["c.jpg", "a.jpg", "b10.jpg", "b2.jpg"] {
        sim.enqueue(name, &t0());
    }
    assert_eq!(sim.queue().iter().collect::<Vec<_>>(), ["c.jpg", "a.jpg", "b10.jpg", "b2.jpg"]);
    sim.start(&t0());
    assert_eq!(sim.queue().iter().collect::<Vec<_>>(), ["a.jpg", "b10.jpg", "b2.jpg", "c.jpg"]);

    // Sorting happens once; later uploads append.
    sim.enqueue("0.jpg", &t0());
    assert_eq!(sim.queue().back().map(String::as_str), Some("0.jpg"));

    let (first, _) = tick(&mut sim, &t0(), "X").unwrap();
    assert_eq!(first, "a.jpg");
}

#[test]
fn fill_example_after_one_tick() {
    let mut sim = Simulation::with_policy(PolicyKind::Fill);
    sim.enqueue("a.jpg", &t0());
    sim.enqueue("b.jpg", &t0());
    sim.start(&t0());
    tick(&mut sim, &t0(), "B1234XY").unwrap();

    let snap = sim.snapshot(&t0());
    assert_eq!(
        snap.pit_log,
        ["08:00:00 - B1234XY", "Empty", "Empty", "Empty", "Empty"]
    );
    assert_eq!(snap.summary, ["PIT 1: 08:00:00 - B1234XY"]);
    assert!(!snap.finished);
    assert_eq!(
        snap.log,
        [
            "[08:00:00] Upload: a.jpg",
            "[08:00:00] Upload: b.jpg",
            "[08:00:00] Simulasi dimulai",
            "[08:00:00] Upload diproses: a.jpg",
            "[08:00:00] PIT 1 ⬅ B1234XY",
        ]
    );
}

#[test]
fn fill_occupies_one_slot_per_tick_then_finishes() {
    let mut sim = Simulation::with_policy(PolicyKind::Fill);
    for i in 0..7 {
        sim.enqueue(format!("{i}.jpg"), &t0());
    }
    sim.start(&t0());

    for i in 0..SLOT_COUNT {
        let now = t0() + interval() * i as i32;
        let before = sim.board().slots().iter().filter(|s| !s.is_empty()).count();
        let (_, out) = tick(&mut sim, &now, &format!("P{i}")).unwrap();
        let after = sim.board().slots().iter().filter(|s| !s.is_empty()).count();
        assert_eq!(after, before + 1);
        assert_eq!(
            out,
            TickOutcome::Applied {
                label: format!("P{i}"),
                assignment: Assignment::Placed { slot: i, evicted: None }
            }
        );
    }

    assert!(sim.is_finished());
    assert!(!sim.is_running());
    assert_eq!(
        sim.board().log().last().unwrap(),
        "[08:08:00] Semua PIT terisi. Simulasi selesai."
    );

    // Further wakes do nothing, and the remaining backlog stays queued.
    let later = t0() + interval() * 10;
    assert_eq!(sim.begin_tick(&later), TickDecision::Idle);
    assert_eq!(sim.queue().len(), 2);
    assert!(sim.snapshot(&later).finished);

    sim.reset();
    assert!(!sim.is_finished());
}

#[test]
fn fill_restart_while_full_finishes_again_on_next_wake() {
    let mut sim = Simulation::with_policy(PolicyKind::Fill);
    for i in 0..SLOT_COUNT {
        sim.enqueue(format!("{i}.jpg"), &t0());
    }
    sim.start(&t0());
    for i in 0..SLOT_COUNT {
        tick(&mut sim, &(t0() + interval() * i as i32), "X");
    }
    assert!(sim.is_finished());

    let now = t0() + interval() * 20;
    sim.enqueue("extra.jpg", &now);
    sim.start(&now);
    assert!(!sim.is_finished());
    assert_eq!(sim.begin_tick(&now), TickDecision::Finished);
    assert!(sim.is_finished());
    assert!(!sim.is_running());
    assert_eq!(sim.queue().len(), 1);
}

#[test]
fn rotate_cycles_targets_and_evicts_only_occupied_slots() {
    let mut sim = Simulation::with_policy(PolicyKind::Rotate);
    for i in 0..12 {
        sim.enqueue(format!("{i:02}.jpg"), &t0());
    }
    sim.start(&t0());

    let mut targets = Vec::new();
    let mut now = t0();
    for i in 0..12 {
        let occupied_before: Vec<bool> =
            sim.board().slots().iter().map(|s| !s.is_empty()).collect();
        let summary_before = sim.board().summary().len();


        let (_, out) = tick(&mut sim, &now, &format!("P{i}")).unwrap();
        let TickOutcome::Applied {
            assignment: Assignment::Placed { slot, evicted },
            ..
        } = out
        else {
            panic!("rotate always places");
        };
        targets.push(slot);
        assert_eq!(evicted.is_some(), occupied_before[slot]);
        let emitted = sim.board().summary().len() - summary_before;
        assert_eq!(emitted, usize::from(occupied_before[slot]));
        now += interval();
    }

    assert_eq!(targets, [0, 1, 2, 3, 4, 0, 1, 2, 3, 4, 0, 1]);
    assert!(!sim.is_finished());
    assert!(sim.is_running());
}

#[test]
fn rotate_cursor_survives_idle_wakes() {
    let mut sim = Simulation::with_policy(PolicyKind::Rotate);
    sim.enqueue("a.jpg", &t0());
    sim.start(&t0());
    tick(&mut sim, &t0(), "A").unwrap();

    let mut now = t0();
    for _ in 0..3 {
        now += interval();
        assert_eq!(sim.begin_tick(&now), TickDecision::QueueEmpty);
    }

    now += interval();
    sim.enqueue("b.jpg", &now);
    let (_, out) = tick(&mut sim, &now, "B").unwrap();
    assert!(matches!(
        out,
        TickOutcome::Applied {
            assignment: Assignment::Placed { slot: 1, .. },
            ..
        }
    ));
}

#[test]
fn rotate_eviction_summary_format() {
    let mut sim = Simulation::with_policy(PolicyKind::Rotate);
    for i in 0..6 {
        sim.enqueue(format!("{i}.jpg"), &t0());
    }
    sim.start(&t0());
    let mut now = t0();
    for i in 0..6 {
        tick(&mut sim, &now, &format!("P{i}")).unwrap();
        now += interval();
    }
    // Slot 1 entered at 08:00:00 and was replaced at 08:10:00.
    assert_eq!(
        sim.board().summary(),
        ["PIT 1: 08:10:00 - OUT: P0 (Durasi: 00:10:00)"]
    );
}

#[test]
fn reset_always_returns_to_initial_state() {
    for policy in [PolicyKind::Fill, PolicyKind::Rotate] {
        let mut sim = Simulation::with_policy(policy);
        for i in 0..8 {
            sim.enqueue(format!("{i}.jpg"), &t0());
        }
        sim.start(&t0());
        let mut now = t0();
        for i in 0..4 {
            tick(&mut sim, &now, &format!("P{i}"));
            now += interval();
        }
        sim.stop(&now);
        sim.reset();

        let snap = sim.snapshot(&now);
        assert_eq!(snap.pit_log, vec!["Empty"; SLOT_COUNT]);
        assert!(snap.summary.is_empty());
        assert!(snap.log.is_empty());
        assert!(!snap.finished);
        assert!(sim.queue().is_empty());
        assert!(!sim.is_running());
        assert!(!sim.is_force_stopped());
        assert_eq!(sim.board().cursor(), 0);
        assert_eq!(sim.policy(), policy);
    }
}

#[test]
fn stop_then_wake_changes_nothing() {
    let mut sim = Simulation::with_policy(PolicyKind::Rotate);
    sim.enqueue("a.jpg", &t0());
    sim.enqueue("b.jpg", &t0());
    sim.start(&t0());
    tick(&mut sim, &t0(), "A").unwrap();
    sim.stop(&t0());

    let before = sim.snapshot(&t0());
    let queue_before = sim.queue().clone();
    for k in 1..5 {
        assert_eq!(sim.begin_tick(&(t0() + interval() * k)), TickDecision::Idle);
    }
    assert_eq!(sim.snapshot(&t0()), before);
    assert_eq!(sim.queue(), &queue_before);
    assert!(sim.is_force_stopped());
    assert_eq!(before.log.last().unwrap(), "[08:00:00] Simulasi dihentikan");
}

#[test]
fn windows_stay_bounded() {
    let mut sim = Simulation::with_policy(PolicyKind::Rotate);
    for i in 0..300 {
        sim.enqueue(format!("{i:04}.jpg"), &t0());
    }
    sim.start(&t0());
    let mut now = t0();
    for i in 0..300 {
        tick(&mut sim, &now, &format!("P{i}")).unwrap();
        now += interval();
    }

    let snap = sim.snapshot(&now);
    assert_eq!(snap.summary.len(), SUMMARY_WINDOW);
    assert_eq!(snap.log.len(), LOG_WINDOW);
    assert_eq!(snap.log.last(), sim.board().log().last());
    assert!(sim.board().summary().len() > 200);
}

#[test]
fn sentinel_outcomes_are_ordinary_occupants() {
    let mut sim = Simulation::with_policy(PolicyKind::Fill);
    sim.enqueue("broken.jpg", &t0());
    sim.start(&t0());
    let TickDecision::Process(ticket) = sim.begin_tick(&t0()) else {
        panic!("expected ticket");
    };
    sim.complete_tick(ticket, &RecognitionOutcome::ReadFailure);
    assert_eq!(sim.snapshot(&t0()).pit_log[0], "08:00:00 - Gagal Membaca");
}

#[test]
fn snapshot_serializes_with_stable_field_names() {
    let sim = Simulation::default();
    let value = serde_json::to_value(sim.snapshot(&t0())).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "pit_log": ["Empty", "Empty", "Empty", "Empty", "Empty"],
            "summary": [],
            "log": [],
            "finished": false
        })
    );
}
