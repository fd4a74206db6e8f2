use super::*;
use crate::expr::{check_order, Expr, Point};
use crate::joint::{JointKind, VPoint};
use crate::mechanism::{Driver, Mechanism, MechanismCfg, MechanismError};
use crate::orient::orient_pair;
use crate::rand::{draw_dyad_chain, ChainCfg, JointCount, ReplayToken};
use nalgebra::{vector, Vector2};
use proptest::prelude::*;

/// 0 ground, 1 crank, 2 coupler, 3 ground.
fn four_bar_points() -> Vec<VPoint> {
    vec![
        VPoint::r(["ground", "link_1"], 0.0, 0.0),
        VPoint::r(["link_1", "link_2"], 1.0, 2.0),
        VPoint::r(["link_2", "link_3"], 4.0, 3.0),
        VPoint::r(["ground", "link_3"], 5.0, 0.0),
    ]
}

fn four_bar() -> Mechanism {
    Mechanism::from_joints(&four_bar_points(), &MechanismCfg::default())
        .with_driver(Driver::with_base(1, 0))
}

fn triangle_example(p3: Vector2<f64>) -> Mechanism {
    Mechanism::from_links(
        4,
        &[("L_a", vec![0, 1]), ("L_b", vec![0, 2]), ("L_c", vec![1, 2, 3])],
        vec![vector![0.0, 0.0], vector![1.0, 0.0], vector![3.0, 0.0], p3],
    )
    .with_grounded([1, 2])
    .with_drivers([0])
}

fn replay(m: &Mechanism, p: &Plan) {
    check_order(m.grounded().iter().copied(), &p.exprs).expect("sound order");
}

#[test]
fn driver_then_dyad_example() {
    let m = triangle_example(vector![2.0, 2.0]);
    let p = plan_with_defaults(&m).unwrap();
    assert!(p.is_complete());
    assert_eq!(p.render(), "PLAP[P2,L0,a0,P1](P0);PLLP[P1,L1,L2,P2](P3)");
    assert_eq!(p.stats.steps, 4);
    // angle zero points at the first neighbor, the reference is the x-largest locked one
    assert!(matches!(
        p.exprs[0],
        Expr::Plap {
            target: Point(0),
            reference: Point(2),
            driven: Point(1),
            ..
        }
    ));
    replay(&m, &p);

    // mirrored target flips the branch
    let m = triangle_example(vector![2.0, -2.0]);
    let p = plan_with_defaults(&m).unwrap();
    assert_eq!(p.render(), "PLAP[P2,L0,a0,P1](P0);PLLP[P2,L1,L2,P1](P3)");
}

#[test]
fn driver_base_hint_wins_when_locked() {
    let m = triangle_example(vector![2.0, 2.0]);
    let m = Mechanism {
        drivers: vec![Driver::with_base(0, 1)],
        ..m
    };
    let p = plan_with_defaults(&m).unwrap();
    assert_eq!(p.exprs[0].to_string(), "PLAP[P1,L0,a0](P0)");
}

#[test]
fn driver_base_hint_falls_back_when_unlocked() {
    // base 2 is not locked yet, so the grounded 0 is used
    let m = Mechanism::from_joints(&four_bar_points(), &MechanismCfg::default())
        .with_driver(Driver::with_base(1, 2));
    let p = plan_with_defaults(&m).unwrap();
    assert_eq!(p.exprs[0].to_string(), "PLAP[P0,L0,a0](P1)");
}

#[test]
fn four_bar_is_complete() {
    let m = four_bar();
    let p = plan_with_defaults(&m).unwrap();
    assert_eq!(p.outcome, Outcome::Complete);
    assert_eq!(p.render(), "PLAP[P0,L0,a0](P1);PLLP[P1,L1,L2,P3](P2)");
    assert!(p.unresolved.is_empty());
    replay(&m, &p);
}

#[test]
fn isolated_link_stalls_and_reports() {
    let mut pts = four_bar_points();
    pts.push(VPoint::r(["iso"], 9.0, 9.0));
    pts.push(VPoint::r(["iso"], 10.0, 9.0));
    let m = Mechanism::from_joints(&pts, &MechanismCfg::default())
        .with_driver(Driver::with_base(1, 0));
    let p = plan_with_defaults(&m).unwrap();
    assert_eq!(p.outcome, Outcome::Partial);
    assert_eq!(p.render(), "PLAP[P0,L0,a0](P1);PLLP[P1,L1,L2,P3](P2)");
    assert_eq!(
        p.unresolved,
        vec![
            Unresolved {
                joint: 4,
                reason: UnresolvedReason::UnderConstrained
            },
            Unresolved {
                joint: 5,
                reason: UnresolvedReason::UnderConstrained
            },
        ]
    );
    let n = m.joint_count();
    assert!(p.stats.steps <= (n + 1) * (n + 1));
}

#[test]
fn sliders_are_reported_unsupported() {
    let m = four_bar().with_kind(2, JointKind::P);
    let p = plan_with_defaults(&m).unwrap();
    assert_eq!(p.render(), "PLAP[P0,L0,a0](P1)");
    assert_eq!(
        p.unresolved,
        vec![Unresolved {
            joint: 2,
            reason: UnresolvedReason::UnsupportedKind {
                kind: JointKind::P
            }
        }]
    );

    let m = four_bar().with_kind(1, JointKind::RP);
    let p = plan_with_defaults(&m).unwrap();
    assert!(p.exprs.is_empty());
    assert_eq!(p.unresolved_joints(), vec![1, 2]);
    assert_eq!(
        p.unresolved[0].reason,
        UnresolvedReason::UnsupportedKind {
            kind: JointKind::RP
        }
    );
    assert_eq!(p.unresolved[1].reason, UnresolvedReason::UnderConstrained);
}

#[test]
fn grounded_slider_is_fine() {
    let m = four_bar().with_kind(3, JointKind::P);
    let p = plan_with_defaults(&m).unwrap();
    assert!(p.is_complete());
}

#[test]
fn driver_without_locked_neighbor() {
    let m = Mechanism::from_links(
        3,
        &[("a", vec![0, 1]), ("b", vec![1, 2])],
        vec![Vector2::zeros(); 3],
    )
    .with_drivers([1]);
    let p = plan_with_defaults(&m).unwrap();
    assert!(p.exprs.is_empty());
    assert_eq!(
        p.unresolved[1],
        Unresolved {
            joint: 1,
            reason: UnresolvedReason::NoLockedReference { nearest: Some(0) }
        }
    );

    let m = Mechanism::from_links(2, &[("a", vec![0])], vec![Vector2::zeros(); 2]).with_drivers([1]);
    let p = plan_with_defaults(&m).unwrap();
    assert_eq!(
        p.unresolved[1].reason,
        UnresolvedReason::NoLockedReference { nearest: None }
    );
}

#[test]
fn failed_driver_is_not_placed_by_a_dyad() {
    // 2 only touches 3 and 4, which get locked after the driver phase
    let m = Mechanism::from_links(
        5,
        &[
            ("ground", vec![0, 1]),
            ("c", vec![0, 3]),
            ("d", vec![1, 3]),
            ("e", vec![0, 4]),
            ("f", vec![1, 4]),
            ("g", vec![2, 3]),
            ("h", vec![2, 4]),
        ],
        vec![
            vector![0.0, 0.0],
            vector![4.0, 0.0],
            vector![2.0, 4.0],
            vector![1.0, 2.0],
            vector![3.0, 2.0],
        ],
    )
    .with_grounded([0, 1])
    .with_drivers([2]);
    let p = plan_with_defaults(&m).unwrap();
    assert_eq!(p.count("PLAP"), 0);
    assert_eq!(p.count("PLLP"), 2);
    assert_eq!(
        p.unresolved,
        vec![Unresolved {
            joint: 2,
            reason: UnresolvedReason::NoLockedReference { nearest: Some(3) }
        }]
    );
}

#[test]
fn alias_widens_reference_search() {
    let mut pts = four_bar_points();
    pts[3].links.push("link_5".into());
    pts.push(VPoint::r(["link_4"], 4.0, 3.0));
    pts.push(VPoint::r(["link_4", "link_5"], 6.0, 4.0));
    let m = Mechanism::from_joints(&pts, &MechanismCfg::default())
        .with_driver(Driver::with_base(1, 0))
        .with_alias(4, 2);
    let p = plan_with_defaults(&m).unwrap();
    assert!(p.is_complete());
    assert_eq!(p.exprs.len(), 3);
    assert_eq!(p.exprs[2].target(), Point(5));
    let mut refs = p.exprs[2].references();
    refs.sort();
    assert_eq!(refs, vec![Point(2), Point(3)]);
    replay(&m, &p);
}

#[test]
fn grounded_pivot_must_be_the_canonical_joint() {
    let mut pts = four_bar_points();
    pts.push(VPoint::r(["link_3"], 5.0, 0.0));
    let m = Mechanism::from_joints(&pts, &MechanismCfg::default())
        .with_driver(Driver::with_base(1, 0));

    // the ground lock would vanish behind the alias
    assert_eq!(
        plan_with_defaults(&m.clone().with_alias(3, 4)),
        Err(MechanismError::GroundedAlias {
            alias: 3,
            canonical: 4
        })
    );

    let m = m.with_alias(4, 3);
    let p = plan_with_defaults(&m).unwrap();
    assert!(p.is_complete());
    assert_eq!(p.render(), "PLAP[P0,L0,a0](P1);PLLP[P1,L1,L2,P3](P2)");
    replay(&m, &p);
}

#[test]
fn empty_mechanism_is_trivially_complete() {
    let m = Mechanism::default();
    let p = plan_with_defaults(&m).unwrap();
    assert!(p.is_complete());
    assert!(p.exprs.is_empty());
    assert_eq!(p.stats.steps, 0);
}

#[test]
fn malformed_input_is_rejected_before_planning() {
    let m = four_bar().with_drivers([42]);
    assert!(matches!(
        plan_with_defaults(&m),
        Err(MechanismError::DriverOutOfRange { joint: 42, .. })
    ));
}

#[test]
fn zero_stall_limit_stops_after_drivers() {
    let cfg = PlannerCfg {
        stall_limit: StallLimit::Fixed(0),
    };
    let p = plan(&four_bar(), cfg).unwrap();
    assert_eq!(p.render(), "PLAP[P0,L0,a0](P1)");
    assert_eq!(p.outcome, Outcome::Partial);
    assert_eq!(p.stats.steps, 0);
}

#[test]
fn later_joints_wrap_around() {
    // 0 depends on 1, which is only placeable after 2; needs a second pass
    let m = Mechanism::from_links(
        5,
        &[
            ("ground", vec![3, 4]),
            ("a", vec![2, 3]),
            ("b", vec![2, 4]),
            ("c", vec![1, 2]),
            ("d", vec![1, 3]),
            ("e", vec![0, 1]),
            ("f", vec![0, 4]),
        ],
        vec![
            vector![0.0, 3.0],
            vector![1.0, 2.0],
            vector![2.0, 1.0],
            vector![0.0, 0.0],
            vector![3.0, 0.0],
        ],
    )
    .with_grounded([3, 4]);
    let p = plan_with_defaults(&m).unwrap();
    assert!(p.is_complete());
    let order: Vec<Point> = p.exprs.iter().map(Expr::target).collect();
    assert_eq!(order, vec![Point(2), Point(1), Point(0)]);
    replay(&m, &p);
}

fn chain_cfg(drivers: usize) -> ChainCfg {
    ChainCfg {
        joints: JointCount::Uniform { min: 3, max: 24 },
        drivers,
        ..ChainCfg::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn dyad_chains_resolve_completely(seed in any::<u64>(), index in 0u64..1000, drivers in 0usize..3) {
        let m = draw_dyad_chain(chain_cfg(drivers), ReplayToken { seed, index });
        let p = plan_with_defaults(&m).unwrap();
        let n = m.joint_count();
        prop_assert!(p.is_complete());
        prop_assert_eq!(p.count("PLAP"), drivers);
        prop_assert_eq!(p.count("PLLP"), n - 2 - drivers);
        prop_assert!(check_order(m.grounded().iter().copied(), &p.exprs).is_ok());
        prop_assert!(p.stats.steps <= (n + 1) * (n + 1));
    }

    #[test]
    fn aliased_chains_resolve_completely(
        seed in any::<u64>(),
        index in 0u64..1000,
        drivers in 0usize..3,
        aliases in 1usize..8,
    ) {
        let cfg = ChainCfg { aliases, ..chain_cfg(drivers) };
        let m = draw_dyad_chain(cfg, ReplayToken { seed, index });
        let p = plan_with_defaults(&m).unwrap();
        let n = m.joint_count();
        let twins = m.same().len();
        prop_assert!(p.is_complete(), "unresolved {:?}", p.unresolved_joints());
        prop_assert_eq!(p.count("PLAP"), drivers);
        prop_assert_eq!(p.count("PLLP"), n - 2 - drivers - twins);
        prop_assert!(check_order(m.grounded().iter().copied(), &p.exprs).is_ok());
        for e in &p.exprs {
            prop_assert!(!m.same().contains_key(&e.target().0));
            for r in e.references() {
                prop_assert!(!m.same().contains_key(&r.0));
            }
        }
        prop_assert!(p.stats.steps <= (n + 1) * (n + 1));
    }

    #[test]
    fn planning_is_deterministic(seed in any::<u64>(), index in 0u64..1000) {
        let m = draw_dyad_chain(chain_cfg(1), ReplayToken { seed, index });
        let a = plan_with_defaults(&m).unwrap();
        let b = plan_with_defaults(&m).unwrap();
        prop_assert_eq!(a.render(), b.render());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn emitted_pairs_ignore_candidate_order(seed in any::<u64>(), index in 0u64..1000) {
        let m = draw_dyad_chain(chain_cfg(1), ReplayToken { seed, index });
        let p = plan_with_defaults(&m).unwrap();
        let pos = |i: usize| m.position(i);
        for e in &p.exprs {
            if let Expr::Pllp { target, ref_a, ref_b, .. } = e {
                prop_assert_eq!(orient_pair(ref_b.0, ref_a.0, target.0, pos), (ref_a.0, ref_b.0));
                prop_assert_eq!(orient_pair(ref_a.0, ref_b.0, target.0, pos), (ref_a.0, ref_b.0));
            }
        }
    }

    #[test]
    fn removing_ground_never_hangs(seed in any::<u64>(), index in 0u64..1000) {
        let m = draw_dyad_chain(chain_cfg(0), ReplayToken { seed, index });
        let m = Mechanism { grounded: Default::default(), ..m };
        let p = plan_with_defaults(&m).unwrap();
        prop_assert!(p.exprs.is_empty());
        prop_assert_eq!(p.unresolved.len(), m.joint_count());
    }
}
