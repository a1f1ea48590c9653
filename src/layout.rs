//! Decorative placement of skill badges.
//!
//! Skills are grouped by [`SkillCategory`] and each badge gets a percentage
//! offset inside its category panel plus a pixel size. The arrangement is a
//! loose grid with random jitter; nothing prevents overlap and nothing here
//! affects which skills are shown, only where.
//!
//! ## Grid
//!
//! For item `i` of `n` in a category:
//!
//! ```text
//! row    = i / ITEMS_PER_ROW
//! column = i % ITEMS_PER_ROW
//! left   = BASE_LEFT + column / (min(ITEMS_PER_ROW, n) - 1) * USABLE_WIDTH ± JITTER_X
//! top    = BASE_TOP  + row * ROW_HEIGHT                                   ± JITTER_Y
//! size   ∈ [MIN_SIZE, MAX_SIZE]
//! ```
//!
//! A category with a single item has a zero divisor; that item sits at
//! column fraction 0.
//!
//! ## Randomness
//!
//! The random source is passed in. Rendering uses [`layout_rng`], which is
//! seeded from `skills.layout_seed` when configured (reproducible output) and
//! from OS entropy otherwise, so every render gets a fresh arrangement.

use crate::types::{Skill, SkillCategory};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;

pub const ITEMS_PER_ROW: usize = 4;
/// Left margin, percent of panel width.
pub const BASE_LEFT: f64 = 7.0;
/// Horizontal span columns are spread across, percent.
pub const USABLE_WIDTH: f64 = 86.0;
/// Top margin, percent of panel height.
pub const BASE_TOP: f64 = 18.0;
pub const ROW_HEIGHT: f64 = 22.0;
pub const JITTER_X: f64 = 2.0;
pub const JITTER_Y: f64 = 4.0;
pub const MIN_SIZE: f64 = 40.0;
pub const MAX_SIZE: f64 = 50.0;

pub const STAR_COUNT: usize = 64;

/// Where a badge sits and how it drifts.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub row: usize,
    pub column: usize,
    /// Percent from the panel's left edge.
    pub left: f64,
    /// Percent from the panel's top edge.
    pub top: f64,
    /// Pixels, width and height.
    pub size: f64,
    pub float: FloatMotion,
}

/// Parameters for the looping float animation (CSS custom properties).
#[derive(Debug, Clone, PartialEq)]
pub struct FloatMotion {
    pub duration_secs: f64,
    pub delay_secs: f64,
    pub drift_x: f64,
    pub drift_y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub left: f64,
    pub top: f64,
    pub size: f64,
    pub opacity: f64,
    pub delay_secs: f64,
}

/// One non-empty category panel.
#[derive(Debug, Clone)]
pub struct CategoryLayout<'a> {
    pub category: SkillCategory,
    pub items: Vec<(&'a Skill, Placement)>,
}

impl CategoryLayout<'_> {
    /// Rows used, for sizing the panel.
    pub fn rows(&self) -> usize {
        self.items.len().div_ceil(ITEMS_PER_ROW)
    }
}

/// Random source for one render.
pub fn layout_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn by_display_order(a: &&Skill, b: &&Skill) -> Ordering {
    let key = |s: &Skill| s.order.unwrap_or(f64::MAX);
    key(a)
        .total_cmp(&key(b))
        .then_with(|| a.name.cmp(&b.name))
}

/// Group skills by category in display order, dropping empty categories.
///
/// Within a category, skills sort by their `order` field (missing sorts
/// last), then by name.
pub fn group_by_category(skills: &[Skill]) -> Vec<(SkillCategory, Vec<&Skill>)> {
    SkillCategory::ALL
        .iter()
        .filter_map(|category| {
            let mut group: Vec<&Skill> = skills.iter().filter(|s| s.category == *category).collect();
            if group.is_empty() {
                return None;
            }
            group.sort_by(by_display_order);
            Some((*category, group))
        })
        .collect()
}

/// Place item `index` of a category holding `count` items.
pub fn place(index: usize, count: usize, rng: &mut impl Rng) -> Placement {
    let row = index / ITEMS_PER_ROW;
    let column = index % ITEMS_PER_ROW;
    let divisor = ITEMS_PER_ROW.min(count).saturating_sub(1);
    let fraction = if divisor == 0 {
        0.0
    } else {
        column as f64 / divisor as f64
    };

    let left = BASE_LEFT + fraction * USABLE_WIDTH + rng.gen_range(-JITTER_X..=JITTER_X);
    let top = BASE_TOP + row as f64 * ROW_HEIGHT + rng.gen_range(-JITTER_Y..=JITTER_Y);
    let size = rng.gen_range(MIN_SIZE..=MAX_SIZE);

    Placement {
        row,
        column,
        left,
        top,
        size,
        float: FloatMotion {
            duration_secs: rng.gen_range(7.0..=13.0),
            delay_secs: rng.gen_range(0.0..=2.5),
            drift_x: rng.gen_range(-20.0..=20.0),
            drift_y: rng.gen_range(20.0..=40.0),
        },
    }
}

/// Lay out every non-empty category.
pub fn assign<'a>(skills: &'a [Skill], rng: &mut impl Rng) -> Vec<CategoryLayout<'a>> {
    group_by_category(skills)
        .into_iter()
        .map(|(category, group)| {
            let count = group.len();
            let items = group
                .into_iter()
                .enumerate()
                .map(|(index, skill)| (skill, place(index, count, rng)))
                .collect();
            CategoryLayout { category, items }
        })
        .collect()
}

/// Background starfield behind the skill panels.
pub fn starfield(count: usize, rng: &mut impl Rng) -> Vec<Star> {
    (0..count)
        .map(|_| Star {
            left: rng.gen_range(0.0..98.0),
            top: rng.gen_range(0.0..98.0),
            size: rng.gen_range(1.2..3.9),
            opacity: rng.gen_range(0.2..0.56),
            delay_secs: rng.gen_range(0.0..2.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str, category: SkillCategory, order: Option<f64>) -> Skill {
        Skill {
            id: name.to_lowercase(),
            name: name.to_string(),
            icon: None,
            category,
            order,
        }
    }

    #[test]
    fn grid_indices_for_all_sizes() {
        let mut rng = layout_rng(Some(7));
        for count in 1..=17 {
            for index in 0..count {
                let p = place(index, count, &mut rng);
                assert!(p.column < ITEMS_PER_ROW);
                assert_eq!(p.row, index / ITEMS_PER_ROW);
                assert_eq!(p.column, index % ITEMS_PER_ROW);
            }
        }
    }

    #[test]
    fn single_item_sits_at_first_column() {
        let mut rng = layout_rng(Some(1));
        let p = place(0, 1, &mut rng);
        assert!(p.left.is_finite());
        assert!(p.left >= BASE_LEFT - JITTER_X && p.left <= BASE_LEFT + JITTER_X);
    }

    #[test]
    fn last_column_reaches_usable_width() {
        let mut rng = layout_rng(Some(3));
        let p = place(3, 8, &mut rng);
        let right = BASE_LEFT + USABLE_WIDTH;
        assert!(p.left >= right - JITTER_X && p.left <= right + JITTER_X);
    }

    #[test]
    fn small_category_spreads_over_its_own_width() {
        // Two items: divisor is 1, so the second item lands at the far edge
        let mut rng = layout_rng(Some(9));
        let p = place(1, 2, &mut rng);
        assert!(p.left >= BASE_LEFT + USABLE_WIDTH - JITTER_X);
    }

    #[test]
    fn vertical_offset_follows_row() {
        let mut rng = layout_rng(Some(11));
        let p = place(5, 8, &mut rng);
        let expected = BASE_TOP + ROW_HEIGHT;
        assert!((p.top - expected).abs() <= JITTER_Y);
    }

    #[test]
    fn size_within_range() {
        let mut rng = layout_rng(Some(5));
        for i in 0..50 {
            let p = place(i, 50, &mut rng);
            assert!(p.size >= MIN_SIZE && p.size <= MAX_SIZE);
            assert!(p.float.duration_secs >= 7.0 && p.float.duration_secs <= 13.0);
        }
    }

    #[test]
    fn seeded_layout_is_reproducible() {
        let skills = vec![
            skill("Rust", SkillCategory::Programming, Some(1.0)),
            skill("Go", SkillCategory::Programming, Some(2.0)),
        ];
        let a = assign(&skills, &mut layout_rng(Some(42)));
        let b = assign(&skills, &mut layout_rng(Some(42)));
        let lefts = |l: &[CategoryLayout<'_>]| -> Vec<f64> {
            l.iter()
                .flat_map(|c| c.items.iter().map(|(_, p)| p.left))
                .collect()
        };
        assert_eq!(lefts(&a), lefts(&b));
    }

    #[test]
    fn empty_categories_are_omitted() {
        let skills = vec![
            skill("Airflow", SkillCategory::DataEngineering, None),
            skill("Rust", SkillCategory::Programming, None),
        ];
        let groups = group_by_category(&skills);
        let categories: Vec<SkillCategory> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            categories,
            vec![SkillCategory::Programming, SkillCategory::DataEngineering]
        );
    }

    #[test]
    fn no_skills_no_layout() {
        let mut rng = layout_rng(Some(0));
        assert!(assign(&[], &mut rng).is_empty());
    }

    #[test]
    fn category_items_sorted_by_order_then_name() {
        let skills = vec![
            skill("Zig", SkillCategory::Programming, None),
            skill("Python", SkillCategory::Programming, Some(2.0)),
            skill("Rust", SkillCategory::Programming, Some(1.0)),
            skill("C", SkillCategory::Programming, None),
        ];
        let groups = group_by_category(&skills);
        let names: Vec<&str> = groups[0].1.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Python", "C", "Zig"]);
    }

    #[test]
    fn rows_round_up() {
        let skills: Vec<Skill> = (0..5)
            .map(|i| skill(&format!("s{i}"), SkillCategory::Ml, Some(i as f64)))
            .collect();
        let layout = assign(&skills, &mut layout_rng(Some(2)));
        assert_eq!(layout[0].rows(), 2);
    }

    #[test]
    fn starfield_bounds() {
        let stars = starfield(STAR_COUNT, &mut layout_rng(Some(4)));
        assert_eq!(stars.len(), STAR_COUNT);
        assert!(stars.iter().all(|s| s.left < 98.0 && s.top < 98.0 && s.opacity >= 0.2));
    }
}
