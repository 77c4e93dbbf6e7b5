//! Bounded randomization of a settings group and a heuristic difficulty score
//! for the result.
//!
//! The score is a rough signal for "this batch made the game a lot harder",
//! built from per-factor weights and a few fixed bonuses. It does not model
//! actual game balance.

use std::collections::{BTreeMap, HashSet};

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::Value;

use crate::catalog::{Catalog, FactorSetting, Setting};
use crate::convert;
use crate::path::{self, SettingPath};

/// Paths written by one batch and the stored values written there.
pub type Assessment = BTreeMap<SettingPath, Value>;

/// Share of a factor's range trimmed from each end before sampling.
const FACTOR_INSET: f64 = 0.1;
/// A player-favoring factor below `normal * 0.6` counts against the player.
const LOW_FACTOR_RATIO: f64 = 0.6;
/// A harder-is-higher factor above `normal * 1.6` counts against the player.
const HIGH_FACTOR_RATIO: f64 = 1.6;

#[derive(Debug, Clone, Default)]
pub struct Randomizer {
    excluded: HashSet<SettingPath>,
}

impl Randomizer {
    /// A randomizer that never touches the given paths.
    pub fn new<'a>(excluded: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            excluded: excluded.into_iter().map(SettingPath::from).collect(),
        }
    }

    pub fn is_excluded(&self, path: &SettingPath) -> bool {
        self.excluded.contains(path)
    }

    /// Draw a new value for every eligible setting, write it into `doc`, and
    /// record it. Excluded paths and freeform fields are left untouched.
    pub fn randomize<R: Rng + ?Sized>(
        &self,
        doc: &mut Value,
        settings: &[&Setting],
        rng: &mut R,
    ) -> Assessment {
        let mut assessment = Assessment::new();
        for setting in settings {
            let target = setting.path();
            if self.is_excluded(target) {
                debug!("Skipping excluded path {target}");
                continue;
            }
            let Some(value) = draw(setting, rng) else {
                debug!("No random draw for {target}");
                continue;
            };
            debug!("Randomized {target} = {value}");
            path::set(doc, target, value.clone());
            assessment.insert(target.clone(), value);
        }
        assessment
    }
}

/// One random value in stored form, or `None` for kinds without a draw.
pub fn draw<R: Rng + ?Sized>(setting: &Setting, rng: &mut R) -> Option<Value> {
    match setting {
        Setting::Duration(s) => {
            let minutes = rng.gen_range(s.min_minutes..=s.max_minutes);
            convert::minutes_to_duration(minutes).ok().map(Value::from)
        }
        Setting::Factor(s) => Some(Value::from(draw_factor(s, rng))),
        Setting::Choice(s) => s.options.choose(rng).cloned().map(Value::from),
        Setting::Toggle(_) => Some(Value::Bool(rng.gen_bool(0.5))),
        Setting::Freeform(_) => None,
    }
}

/// The interval factors are sampled from: the bounds pulled in by 10% of
/// the range on each side, or the full bounds if that leaves nothing.
pub fn factor_interval(min: f64, max: f64) -> (f64, f64) {
    let inset = (max - min) * FACTOR_INSET;
    let (low, high) = (min + inset, max - inset);
    if low >= high { (min, max) } else { (low, high) }
}

fn draw_factor<R: Rng + ?Sized>(s: &FactorSetting, rng: &mut R) -> f64 {
    let (low, high) = factor_interval(s.min, s.max);
    let value = convert::round6(rng.gen_range(low..=high));
    value.clamp(s.min, s.max)
}

/// Outcome of [`score`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DifficultyReport {
    pub score: i32,
    /// `score` reached the catalog's threshold.
    pub harder: bool,
    /// Each path that added points, with the points it added.
    pub contributors: Vec<(SettingPath, i32)>,
}

/// Score a batch against the catalog's normals and difficulty rules.
pub fn score(assessment: &Assessment, catalog: &Catalog) -> DifficultyReport {
    let mut report = DifficultyReport::default();

    for (target, value) in assessment {
        let Some(Setting::Factor(factor)) = catalog.lookup(target) else {
            continue;
        };
        let Some(new) = value.as_f64() else {
            continue;
        };
        let points = factor_points(factor, new);
        if points > 0 {
            report.score += points;
            report.contributors.push((target.clone(), points));
        }
    }

    for bonus in &catalog.difficulty().bonuses {
        if assessment.get(&bonus.path) != Some(&bonus.trigger) {
            continue;
        }
        let normal = catalog
            .definition(&bonus.path)
            .and_then(Setting::normal_value);
        if normal.as_ref() != Some(&bonus.trigger) {
            report.score += bonus.points;
            report.contributors.push((bonus.path.clone(), bonus.points));
        }
    }

    report.harder = report.score >= catalog.difficulty().threshold;
    report
}

fn factor_points(factor: &FactorSetting, new: f64) -> i32 {
    let weight = factor.impact_weight;
    if weight < 0 && new < factor.normal * LOW_FACTOR_RATIO {
        weight.abs()
    } else if weight > 0 && new > factor.normal * HIGH_FACTOR_RATIO {
        weight
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enshrouded::{self, RANDOMIZE_EXCLUDED};
    use crate::fixtures::test::{choice, duration, factor, server_catalog, toggle};
    use rand::SeedableRng;
    use rand::rngs::{SmallRng, StdRng};
    use serde_json::json;

    fn assessment(entries: &[(&str, Value)]) -> Assessment {
        entries
            .iter()
            .map(|(p, v)| (SettingPath::from(*p), v.clone()))
            .collect()
    }

    #[test]
    fn interval_is_inset_by_ten_percent() {
        let (low, high) = factor_interval(0.25, 4.0);
        assert!((low - 0.625).abs() < 1e-9);
        assert!((high - 3.625).abs() < 1e-9);
    }

    #[test]
    fn degenerate_interval_falls_back_to_bounds() {
        assert_eq!(factor_interval(1.0, 1.0), (1.0, 1.0));
    }

    #[test]
    fn draws_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let day = duration("d", 2, 60, 30);
        let health = factor("f", 0.25, 4.0, 1.0, -2);
        let tomb = choice("c", &["A", "B", "C"], "A");
        for _ in 0..500 {
            let ns = draw(&day, &mut rng).unwrap().as_i64().unwrap();
            assert_eq!(ns % convert::NANOS_PER_MINUTE, 0);
            assert!((2..=60).contains(&(ns / convert::NANOS_PER_MINUTE)));

            let f = draw(&health, &mut rng).unwrap().as_f64().unwrap();
            assert!((0.625..=3.625).contains(&f), "factor {f}");
            assert_eq!(f, convert::round6(f));

            let c = draw(&tomb, &mut rng).unwrap();
            assert!(["A", "B", "C"].contains(&c.as_str().unwrap()));
        }
    }

    #[test]
    fn toggles_draw_both_values() {
        let mut rng = SmallRng::seed_from_u64(1);
        let t = toggle("t", false);
        let draws: HashSet<bool> = (0..64)
            .map(|_| draw(&t, &mut rng).unwrap().as_bool().unwrap())
            .collect();
        assert_eq!(draws.len(), 2);
    }

    #[test]
    fn randomize_skips_exclusions_and_records_writes() {
        let catalog = server_catalog();
        let mut doc = enshrouded::fallback_template(&catalog);
        let before = doc.clone();
        let settings = catalog.group_settings("General").unwrap();
        let randomizer = Randomizer::new(RANDOMIZE_EXCLUDED.iter().copied());
        let mut rng = StdRng::seed_from_u64(42);

        let assessment = randomizer.randomize(&mut doc, &settings, &mut rng);

        for excluded in RANDOMIZE_EXCLUDED {
            let p = SettingPath::from(*excluded);
            assert!(!assessment.contains_key(&p));
            assert_eq!(path::get(&doc, &p), path::get(&before, &p));
        }
        // slotCount is freeform: not excluded, but nothing to draw.
        assert!(!assessment.contains_key(&"slotCount".into()));
        assert!(assessment.contains_key(&"voiceChatMode".into()));
        for (p, v) in &assessment {
            assert_eq!(path::get(&doc, p), Some(v));
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let catalog = server_catalog();
        let settings = catalog.group_settings("Enemy").unwrap();
        let randomizer = Randomizer::default();
        let run = |seed| {
            let mut doc = json!({});
            randomizer.randomize(&mut doc, &settings, &mut StdRng::seed_from_u64(seed))
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn low_player_health_adds_its_weight() {
        let catalog = server_catalog();
        let report = score(
            &assessment(&[("gameSettings.playerHealthFactor", json!(0.2))]),
            &catalog,
        );
        assert_eq!(report.score, 2);
        assert!(!report.harder);
        assert_eq!(
            report.contributors,
            vec![("gameSettings.playerHealthFactor".into(), 2)]
        );
    }

    #[test]
    fn boundary_ratios_do_not_score() {
        let catalog = server_catalog();
        let report = score(
            &assessment(&[
                ("gameSettings.playerHealthFactor", json!(0.6)),
                ("gameSettings.enemyDamageFactor", json!(1.6)),
            ]),
            &catalog,
        );
        assert_eq!(report.score, 0);
    }

    #[test]
    fn harsh_batch_crosses_threshold() {
        let catalog = server_catalog();
        let report = score(
            &assessment(&[
                ("gameSettings.enemyDamageFactor", json!(3.0)),
                ("gameSettings.bossHealthFactor", json!(4.0)),
                ("gameSettings.playerManaFactor", json!(2.0)),
            ]),
            &catalog,
        );
        assert_eq!(report.score, 3);
        assert!(report.harder);
    }

    #[test]
    fn bonuses_apply_only_when_trigger_differs_from_normal() {
        let catalog = server_catalog();
        let report = score(
            &assessment(&[
                ("gameSettings.enableStarvingDebuff", json!(true)),
                ("gameSettings.tombstoneMode", json!("Everything")),
            ]),
            &catalog,
        );
        assert_eq!(report.score, 3);
        assert!(report.harder);

        let report = score(
            &assessment(&[
                ("gameSettings.enableStarvingDebuff", json!(false)),
                ("gameSettings.tombstoneMode", json!("NoTombstone")),
            ]),
            &catalog,
        );
        assert_eq!(report.score, 0);
    }

    #[test]
    fn zero_weight_factors_never_score() {
        let catalog = server_catalog();
        let report = score(
            &assessment(&[("gameSettings.threatBonus", json!(4.0))]),
            &catalog,
        );
        assert_eq!(report.score, 0);
    }
}
