//! Heuristic quality score of a parameter set against the descriptor it was
//! derived from. Pure and deterministic; malformed values degrade to neutral
//! or zero sub-scores instead of failing.

use serde::Serialize;

use crate::optimizer::color::{self, NEUTRAL_SIMILARITY};
use crate::optimizer::state::ParameterSet;
use crate::perception::types::ElementDescriptor;

pub const SIZE_WEIGHT: f64 = 0.4;
pub const COLOR_WEIGHT: f64 = 0.25;
pub const TYPOGRAPHY_WEIGHT: f64 = 0.2;
pub const CONTENT_WEIGHT: f64 = 0.15;

/// Score given to a factor with nothing to compare.
pub const NEUTRAL: f64 = 0.5;

/// Partial credit for content present on both sides but different.
const CONTENT_MISMATCH: f64 = 0.7;

/// Font-size error is penalized this many times harder than box size error.
const FONT_SIZE_PENALTY: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityBreakdown {
    pub size: f64,
    pub color: f64,
    pub typography: f64,
    pub content: f64,
    pub total: f64,
}

/// Overall quality on [0, 1].
pub fn evaluate(params: &ParameterSet, descriptor: &ElementDescriptor) -> f64 {
    breakdown(params, descriptor).total
}

pub fn breakdown(params: &ParameterSet, descriptor: &ElementDescriptor) -> QualityBreakdown {
    let size = size_score(params, descriptor);
    let color = color_score(params, descriptor);
    let typography = typography_score(params, descriptor);
    let content = content_score(params, descriptor);

    let total = SIZE_WEIGHT * size
        + COLOR_WEIGHT * color
        + TYPOGRAPHY_WEIGHT * typography
        + CONTENT_WEIGHT * content;

    QualityBreakdown {
        size,
        color,
        typography,
        content,
        total: unit(total),
    }
}

/// Mean of the per-axis scores; 0 without a position to compare against.
pub fn size_score(params: &ParameterSet, descriptor: &ElementDescriptor) -> f64 {
    let Some(pos) = descriptor.position else {
        return 0.0;
    };
    let w = axis_score(params.width, pos.width);
    let h = axis_score(params.height, pos.height);
    (w + h) / 2.0
}

fn axis_score(candidate: f64, target: f64) -> f64 {
    if candidate == target {
        return 1.0;
    }
    if !target.is_finite() || target <= 0.0 || !candidate.is_finite() {
        return 0.0;
    }
    let rel = (candidate - target).abs() / target;
    (1.0 - 2.0 * rel).max(0.0)
}

/// Weighted over primary (0.5), background (0.3) and text (0.2) colours the
/// descriptor actually declared.
pub fn color_score(params: &ParameterSet, descriptor: &ElementDescriptor) -> f64 {
    let p = &descriptor.properties;
    let channels = [
        (0.5, &params.color, &p.color),
        (0.3, &params.background_color, &p.background_color),
        (0.2, &params.text_color, &p.text_color),
    ];
    let checks: Vec<(f64, f64)> = channels
        .iter()
        .filter_map(|(w, ours, theirs)| {
            theirs
                .as_deref()
                .map(|t| (*w, color::similarity(ours, t)))
        })
        .collect();
    weighted_mean(&checks).unwrap_or(NEUTRAL)
}

pub fn typography_score(params: &ParameterSet, descriptor: &ElementDescriptor) -> f64 {
    let p = &descriptor.properties;
    let mut checks = Vec::with_capacity(3);

    if let Some(target) = p.font_size.as_deref() {
        checks.push((0.4, font_size_score(&params.font_size, target)));
    }
    if let Some(target) = p.font_weight.as_deref() {
        let score = if params.font_weight.trim() == target.trim() { 1.0 } else { 0.5 };
        checks.push((0.3, score));
    }
    if let Some(target) = p.text_color.as_deref() {
        checks.push((0.3, color::similarity(&params.text_color, target)));
    }
    weighted_mean(&checks).unwrap_or(NEUTRAL)
}

fn font_size_score(candidate: &str, target: &str) -> f64 {
    match (leading_number(candidate), leading_number(target)) {
        (Some(c), Some(t)) if t > 0.0 => {
            let rel = (c - t).abs() / t;
            (1.0 - FONT_SIZE_PENALTY * rel).max(0.0)
        }
        (Some(c), Some(t)) if c == t => 1.0,
        _ => NEUTRAL_SIMILARITY,
    }
}

/// Title, text and value each count only when both sides have one.
pub fn content_score(params: &ParameterSet, descriptor: &ElementDescriptor) -> f64 {
    let p = &descriptor.properties;
    let fields = [
        (0.4, &params.title, &p.title),
        (0.3, &params.text, &p.text),
        (0.3, &params.value, &p.value),
    ];
    let checks: Vec<(f64, f64)> = fields
        .iter()
        .filter_map(|(w, ours, theirs)| {
            let theirs = theirs.as_deref().filter(|t| !t.is_empty())?;
            if ours.is_empty() {
                return None;
            }
            let score = if ours.as_str() == theirs { 1.0 } else { CONTENT_MISMATCH };
            Some((*w, score))
        })
        .collect();
    weighted_mean(&checks).unwrap_or(NEUTRAL)
}

fn weighted_mean(checks: &[(f64, f64)]) -> Option<f64> {
    let total_weight: f64 = checks.iter().map(|(w, _)| w).sum();
    if checks.is_empty() || total_weight <= 0.0 {
        return None;
    }
    Some(checks.iter().map(|(w, s)| w * s).sum::<f64>() / total_weight)
}

/// Leading decimal number of a CSS length such as `"14px"` or `"1.5rem"`.
pub(crate) fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && *c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

fn unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
