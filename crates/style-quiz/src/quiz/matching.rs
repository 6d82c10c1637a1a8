use super::domain::{NormalizedProfile, RankedTemplate, Template, TraitLevel, TraitMap};

/// Score awarded to a template that declares no expectations.
pub const NEUTRAL_MATCH_PERCENT: u8 = 50;

const POINTS_PER_CHECK: u32 = 2;

/// Percentage fit between a respondent profile and a template's expected
/// levels.
///
/// Each expected trait is worth two points: two for an exact level match,
/// one for an adjacent level (high/medium or medium/low in either order),
/// zero for a full miss. Traits the respondent never scored count as `low`.
pub fn match_percent(profile: &NormalizedProfile, expectations: &TraitMap<TraitLevel>) -> u8 {
    if expectations.is_empty() {
        return NEUTRAL_MATCH_PERCENT;
    }

    let mut points = 0u32;
    for (name, expected) in expectations.iter() {
        let actual = profile.get(name).copied().unwrap_or(TraitLevel::Low);
        let distance = u32::from(actual.rank().abs_diff(expected.rank()));
        points += POINTS_PER_CHECK.saturating_sub(distance);
    }

    let total = expectations.len() as u32 * POINTS_PER_CHECK;
    (f64::from(points) / f64::from(total) * 100.0).round() as u8
}

/// Rank every candidate template by fit, best first.
///
/// The sort is stable: templates with equal scores keep the order they were
/// supplied in.
pub fn rank_templates(profile: &NormalizedProfile, templates: &[Template]) -> Vec<RankedTemplate> {
    let mut ranked: Vec<RankedTemplate> = templates
        .iter()
        .cloned()
        .map(|template| RankedTemplate {
            match_percent: match_percent(profile, &template.match_profile),
            template,
        })
        .collect();

    ranked.sort_by(|a, b| b.match_percent.cmp(&a.match_percent));
    ranked
}
