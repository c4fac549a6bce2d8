use ravg_engine::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config() -> RavgConfig {
    RavgConfig::new("owner")
}

fn rankings(pairs: &[(&str, f64)]) -> Vec<RankingInput> {
    pairs
        .iter()
        .map(|(user_id, score)| RankingInput::new(user_id, *score))
        .collect()
}

fn choices(values: &[&str]) -> Vec<ChoiceInput> {
    values
        .iter()
        .enumerate()
        .map(|(idx, c)| ChoiceInput::new(&format!("u{}", idx), c))
        .collect()
}

fn one_to(n: u32) -> Vec<RankingInput> {
    (1..=n)
        .map(|i| RankingInput::new(&format!("u{}", i), i as f64))
        .collect()
}

// ******** simple_mean ********

#[test]
fn simple_mean_three_rankers() {
    init();
    let res = calculate_ravg(
        &rankings(&[("a", 6.0), ("b", 8.0), ("c", 10.0)]),
        &[],
        &config(),
    );
    assert_eq!(res.team_ravg, 8.0);
    assert_eq!(res.rank_count, 3);
    assert_eq!(res.super_ravg, None);
    assert_eq!(
        res.contributors,
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
}

#[test]
fn simple_mean_single_ranker() {
    init();
    let res = calculate_ravg(&rankings(&[("a", 7.5)]), &[], &config());
    assert_eq!(res.team_ravg, 7.5);
}

#[test]
fn no_rankers() {
    init();
    for formula in [
        RavgFormula::SimpleMean,
        RavgFormula::WeightedByRole,
        RavgFormula::ExcludeOutliers,
        RavgFormula::Custom,
    ] {
        let c = config().with_formula(formula).with_supervisor_weight(3.0);
        let res = calculate_ravg(&[], &[], &c);
        assert_eq!(res, RavgResult::EMPTY);
        assert_eq!(res.team_ravg, 0.0);
        assert_eq!(res.super_ravg, None);
        assert_eq!(res.rank_count, 0);
        assert!(res.contributors.is_empty());
    }
}

#[test]
fn simple_mean_same_scores() {
    init();
    let r: Vec<RankingInput> = (0..5)
        .map(|i| RankingInput::new(&format!("u{}", i), 5.0))
        .collect();
    assert_eq!(calculate_ravg(&r, &[], &config()).team_ravg, 5.0);
}

#[test]
fn repeated_calls_are_identical() {
    init();
    let r = rankings(&[("owner", 9.3), ("a", 1.7), ("b", 4.4), ("c", 8.1)]);
    let collabs = vec![CollaboratorInfo::new("owner", CollaboratorRole::Owner)];
    for formula in [
        RavgFormula::SimpleMean,
        RavgFormula::WeightedByRole,
        RavgFormula::ExcludeOutliers,
        RavgFormula::Custom,
    ] {
        let c = config()
            .with_formula(formula)
            .with_supervisor_weight(2.5)
            .with_member_weight("a", 0.3);
        let first = calculate_ravg(&r, &collabs, &c);
        let second = calculate_ravg(&r, &collabs, &c);
        assert_eq!(first.team_ravg.to_bits(), second.team_ravg.to_bits());
        assert_eq!(
            first.super_ravg.map(f64::to_bits),
            second.super_ravg.map(f64::to_bits)
        );
        assert_eq!(first, second);
    }
}

// ******** weighted_by_role ********

#[test]
fn weighted_by_role_owner_counts_twice() {
    init();
    let collabs = vec![
        CollaboratorInfo::new("owner", CollaboratorRole::Owner),
        CollaboratorInfo::new("contrib", CollaboratorRole::Contributor),
    ];
    let c = config().with_formula(RavgFormula::WeightedByRole);
    let res = calculate_ravg(
        &rankings(&[("owner", 10.0), ("contrib", 5.0)]),
        &collabs,
        &c,
    );
    // (10 * 2 + 5) / 3
    assert!((res.team_ravg - 8.333).abs() < 0.01);
    assert!((res.team_ravg - 25.0 / 3.0).abs() < 1e-12);
}

#[test]
fn weighted_by_role_unknown_users_count_once() {
    init();
    let c = config().with_formula(RavgFormula::WeightedByRole);
    let res = calculate_ravg(&rankings(&[("unknown1", 4.0), ("unknown2", 8.0)]), &[], &c);
    assert_eq!(res.team_ravg, 6.0);
}

// ******** exclude_outliers ********

#[test]
fn exclude_outliers_ten_rankers() {
    init();
    let c = config().with_formula(RavgFormula::ExcludeOutliers);
    // Keeps 2..=9
    assert_eq!(calculate_ravg(&one_to(10), &[], &c).team_ravg, 5.5);
}

#[test]
fn exclude_outliers_too_few_rankers() {
    init();
    let c = config().with_formula(RavgFormula::ExcludeOutliers);
    let res = calculate_ravg(&rankings(&[("a", 1.0), ("b", 10.0)]), &[], &c);
    assert_eq!(res.team_ravg, 5.5);
    let res = calculate_ravg(&rankings(&[("a", 3.0)]), &[], &c);
    assert_eq!(res.team_ravg, 3.0);
}

#[test]
fn exclude_outliers_three_rankers() {
    init();
    let c = config().with_formula(RavgFormula::ExcludeOutliers);
    let res = calculate_ravg(&rankings(&[("a", 0.0), ("b", 5.0), ("c", 10.0)]), &[], &c);
    assert_eq!(res.team_ravg, 5.0);
}

#[test]
fn exclude_outliers_counts_all_rankings() {
    init();
    let c = config().with_formula(RavgFormula::ExcludeOutliers);
    let res = calculate_ravg(&one_to(10), &[], &c);
    assert_eq!(res.rank_count, 10);
    assert_eq!(res.contributors.len(), 10);
}

// ******** custom ********

#[test]
fn custom_member_weights() {
    init();
    let c = config()
        .with_formula(RavgFormula::Custom)
        .with_member_weight("a", 3.0)
        .with_member_weight("b", 1.0);
    let res = calculate_ravg(&rankings(&[("a", 10.0), ("b", 5.0)]), &[], &c);
    assert_eq!(res.team_ravg, 8.75);
}

#[test]
fn custom_missing_weights_count_once() {
    init();
    let c = config()
        .with_formula(RavgFormula::Custom)
        .with_member_weight("a", 2.0);
    let res = calculate_ravg(&rankings(&[("a", 8.0), ("b", 4.0)]), &[], &c);
    assert!((res.team_ravg - 20.0 / 3.0).abs() < 1e-12);
}

#[test]
fn custom_zero_weights_use_simple_mean() {
    init();
    let c = config()
        .with_formula(RavgFormula::Custom)
        .with_member_weight("a", 0.0)
        .with_member_weight("b", 0.0);
    let res = calculate_ravg(&rankings(&[("a", 10.0), ("b", 2.0)]), &[], &c);
    assert_eq!(res.team_ravg, 6.0);
}

#[test]
fn custom_weights_of_absent_members_are_ignored() {
    init();
    let c = config()
        .with_formula(RavgFormula::Custom)
        .with_member_weight("ghost", 100.0);
    let res = calculate_ravg(&rankings(&[("a", 10.0), ("b", 2.0)]), &[], &c);
    assert_eq!(res.team_ravg, 6.0);
}

// ******** Super RAVG ********

#[test]
fn super_ravg_blends_owner() {
    init();
    let c = config().with_supervisor_weight(2.0);
    let res = calculate_ravg(
        &rankings(&[("owner", 10.0), ("u2", 6.0), ("u3", 8.0)]),
        &[],
        &c,
    );
    assert_eq!(res.team_ravg, 7.0);
    assert_eq!(res.super_ravg, Some(9.0));
    assert_eq!(res.rank_count, 3);
    assert_eq!(res.contributors[0], "owner");
    assert_eq!(res.display_ravg(), 9.0);
}

#[test]
fn super_ravg_owner_only() {
    init();
    let c = config().with_supervisor_weight(3.0);
    let res = calculate_ravg(&rankings(&[("owner", 8.5)]), &[], &c);
    assert_eq!(res.team_ravg, 0.0);
    assert_eq!(res.super_ravg, Some(8.5));
    assert_eq!(res.rank_count, 1);
}

#[test]
fn super_ravg_owner_has_not_ranked() {
    init();
    let c = config().with_supervisor_weight(2.0);
    let res = calculate_ravg(&rankings(&[("u1", 6.0), ("u2", 8.0)]), &[], &c);
    assert_eq!(res.team_ravg, 7.0);
    assert_eq!(res.super_ravg, Some(7.0));
}

#[test]
fn super_ravg_inactive_at_one() {
    init();
    let c = config().with_supervisor_weight(1.0);
    let res = calculate_ravg(&rankings(&[("owner", 10.0), ("u2", 5.0)]), &[], &c);
    assert_eq!(res.team_ravg, 7.5);
    assert_eq!(res.super_ravg, None);
    assert_eq!(res.display_ravg(), 7.5);
}

#[test]
fn super_ravg_inactive_below_one() {
    init();
    let c = config().with_supervisor_weight(0.5);
    let res = calculate_ravg(&rankings(&[("owner", 10.0), ("u2", 5.0)]), &[], &c);
    assert_eq!(res.team_ravg, 7.5);
    assert_eq!(res.super_ravg, None);
}

#[test]
fn super_ravg_infinite_weight_is_owner_score() {
    init();
    let c = config().with_supervisor_weight(f64::INFINITY);
    let res = calculate_ravg(&rankings(&[("owner", 10.0), ("u2", 6.0), ("u3", 8.0)]), &[], &c);
    assert_eq!(res.team_ravg, 7.0);
    assert_eq!(res.super_ravg, Some(10.0));
    assert!(c.validate().is_err());
}

#[test]
fn super_ravg_nan_weight_is_inactive() {
    init();
    let c = config().with_supervisor_weight(f64::NAN);
    let res = calculate_ravg(&rankings(&[("owner", 10.0), ("u2", 5.0)]), &[], &c);
    assert_eq!(res.team_ravg, 7.5);
    assert_eq!(res.super_ravg, None);
}

#[test]
fn super_ravg_level_one_uses_formula() {
    init();
    // The owner is removed before the role weights are applied.
    let collabs = vec![CollaboratorInfo::new("owner", CollaboratorRole::Owner)];
    let c = config()
        .with_formula(RavgFormula::WeightedByRole)
        .with_supervisor_weight(3.0);
    let res = calculate_ravg(
        &rankings(&[("u1", 4.0), ("owner", 8.0), ("u2", 6.0)]),
        &collabs,
        &c,
    );
    assert_eq!(res.team_ravg, 5.0);
    // (5 + 8 * 3) / 4
    assert_eq!(res.super_ravg, Some(7.25));
}

// ******** Two axes ********

#[test]
fn two_axis_is_computed_per_axis() {
    init();
    let c = config().with_supervisor_weight(2.0);
    let r = vec![
        (RankingInput::new("owner", 10.0), Some(1.0)),
        (RankingInput::new("u1", 6.0), Some(3.0)),
        (RankingInput::new("u2", 8.0), None),
    ];
    let res = calculate_ravg_two_axis(&r, &[], &c);
    assert_eq!(res.x.team_ravg, 7.0);
    assert_eq!(res.x.super_ravg, Some(9.0));
    assert_eq!(res.y.team_ravg, 3.0);
    // (3 + 1 * 2) / 3
    assert!((res.y.super_ravg.unwrap() - 5.0 / 3.0).abs() < 1e-12);
    assert_eq!(res.y.rank_count, 2);
}

// ******** Statistics and leaderboard ********

#[test]
fn stats_of_scores() {
    init();
    let s = score_stats(&rankings(&[("a", 2.0), ("b", 4.0), ("c", 6.0)])).unwrap();
    assert_eq!(s.avg, 4.0);
    assert_eq!(s.min, 2.0);
    assert_eq!(s.max, 6.0);
    assert_eq!(s.stddev, Some(2.0));
    assert_eq!(s.rank_count, 3);

    let single = score_stats(&rankings(&[("a", 2.0)])).unwrap();
    assert_eq!(single.stddev, None);
    assert_eq!(score_stats(&[]), None);
}

#[test]
fn leaderboard_order_and_ties() {
    init();
    let c = config();
    let results: Vec<(String, RavgResult)> = vec![
        ("r1", vec![("a", 5.0)]),
        ("r2", vec![("a", 9.0)]),
        ("r3", vec![]),
        ("r4", vec![("a", 5.0), ("b", 5.0)]),
        ("r5", vec![("a", 1.0)]),
    ]
    .into_iter()
    .map(|(id, r)| (id.to_string(), calculate_ravg(&rankings(&r), &[], &c)))
    .collect();

    let lb = build_leaderboard(&results);
    let summary: Vec<(u32, &str, f64)> = lb
        .iter()
        .map(|e| (e.position, e.record_id.as_str(), e.ravg))
        .collect();
    assert_eq!(
        summary,
        vec![(1, "r2", 9.0), (2, "r1", 5.0), (2, "r4", 5.0), (4, "r5", 1.0)]
    );
    assert_eq!(lb[2].rank_count, 2);
}

#[test]
fn leaderboard_uses_super_ravg() {
    init();
    let c = config().with_supervisor_weight(2.0);
    let results = vec![
        (
            "r1".to_string(),
            calculate_ravg(&rankings(&[("owner", 1.0), ("a", 9.0)]), &[], &c),
        ),
        (
            "r2".to_string(),
            calculate_ravg(&rankings(&[("owner", 9.0), ("a", 3.0)]), &[], &c),
        ),
    ];
    let lb = build_leaderboard(&results);
    assert_eq!(lb[0].record_id, "r2");
    assert_eq!(lb[0].ravg, 7.0);
    assert_eq!(lb[1].ravg, 11.0 / 3.0);
}

#[test]
fn progress_per_user() {
    init();
    let collabs = vec![
        CollaboratorInfo::new("owner", CollaboratorRole::Owner),
        CollaboratorInfo::new("idle", CollaboratorRole::Viewer),
    ];
    let rankers = vec![
        vec!["owner".to_string(), "a".to_string()],
        vec!["a".to_string()],
        vec![],
        vec!["owner".to_string()],
    ];
    let progress = user_progress(&collabs, &rankers);
    let users: Vec<&str> = progress.iter().map(|p| p.user_id.as_str()).collect();
    assert_eq!(users, vec!["owner", "idle", "a"]);
    assert_eq!(progress[0].ranked_records, 2);
    assert_eq!(progress[0].total_records, 4);
    assert_eq!(progress[0].completion_pct, 50.0);
    assert_eq!(progress[1].ranked_records, 0);
    assert_eq!(progress[1].completion_pct, 0.0);
    assert_eq!(progress[2].ranked_records, 2);
}

#[test]
fn progress_without_records() {
    init();
    let collabs = vec![CollaboratorInfo::new("owner", CollaboratorRole::Owner)];
    let progress = user_progress(&collabs, &[]);
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].total_records, 0);
    assert_eq!(progress[0].completion_pct, 0.0);
}

// ******** Vote tally ********

#[test]
fn tally_binary() {
    init();
    let res = calculate_vote_tally(&choices(&["yes", "no", "yes", "yes"]));
    assert_eq!(
        res.tally,
        vec![("yes".to_string(), 3), ("no".to_string(), 1)]
    );
    assert_eq!(res.total, 4);
    assert_eq!(res.winner, Some("yes".to_string()));
}

#[test]
fn tally_quaternary() {
    init();
    let res = calculate_vote_tally(&choices(&["a", "c", "a", "b"]));
    assert_eq!(
        res.tally,
        vec![
            ("a".to_string(), 2),
            ("c".to_string(), 1),
            ("b".to_string(), 1)
        ]
    );
    assert_eq!(res.winner, Some("a".to_string()));
}

#[test]
fn tally_tie_has_no_winner() {
    init();
    assert_eq!(calculate_vote_tally(&choices(&["yes", "no"])).winner, None);
    assert_eq!(
        calculate_vote_tally(&choices(&["a", "a", "b", "b", "c"])).winner,
        None
    );
}

#[test]
fn tally_tie_broken_later() {
    init();
    let res = calculate_vote_tally(&choices(&["a", "b", "b", "a", "a"]));
    assert_eq!(res.winner, Some("a".to_string()));
    assert_eq!(res.count("a"), 3);
    assert_eq!(res.count("b"), 2);
    assert_eq!(res.count("z"), 0);
}

#[test]
fn tally_empty() {
    init();
    let res = calculate_vote_tally(&[]);
    assert!(res.tally.is_empty());
    assert_eq!(res.total, 0);
    assert_eq!(res.winner, None);
}

// ******** Configuration values ********

#[test]
fn parse_configuration_values() {
    init();
    assert_eq!("custom".parse::<RavgFormula>(), Ok(RavgFormula::Custom));
    assert_eq!(
        "median".parse::<RavgFormula>(),
        Err(RavgErrors::UnknownFormula("median".to_string()))
    );
    assert_eq!("owner".parse::<CollaboratorRole>(), Ok(CollaboratorRole::Owner));
    assert!("admin".parse::<CollaboratorRole>().is_err());
    assert_eq!("two_axis".parse::<RankingMode>(), Ok(RankingMode::TwoAxis));
    assert!(RankingMode::Binary.is_categorical());
    assert!(!RankingMode::OneAxis.is_categorical());
    for f in [
        RavgFormula::SimpleMean,
        RavgFormula::WeightedByRole,
        RavgFormula::ExcludeOutliers,
        RavgFormula::Custom,
    ] {
        assert_eq!(f.as_str().parse::<RavgFormula>(), Ok(f));
    }
}

#[test]
fn validate_configuration() {
    init();
    assert!(config().validate().is_ok());
    assert!(config().with_supervisor_weight(4.5).validate().is_ok());
    assert_eq!(
        config().with_supervisor_weight(0.9).validate(),
        Err(RavgErrors::InvalidSupervisorWeight(0.9))
    );
    assert!(config()
        .with_supervisor_weight(f64::INFINITY)
        .validate()
        .is_err());
    assert!(config().with_member_weight("a", -1.0).validate().is_err());
    assert!(config().with_member_weight("a", 0.0).validate().is_ok());
}
