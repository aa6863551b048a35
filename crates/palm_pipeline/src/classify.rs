//! Role assignment strategies

use crate::config::MAX_LINES;
use crate::types::{LineComponent, LineRole};

/// Trait for strategies that name skeleton components
///
/// Receives components ranked by area, largest first, and returns the
/// role given to each chosen component as `(role, index into ranked)`.
/// A role may appear at most once.
pub trait LineClassifier: Send + Sync {
    fn assign(&self, ranked: &[LineComponent]) -> Vec<(LineRole, usize)>;
}

/// Largest component is the life line, then head, heart, fate
#[derive(Debug, Clone, Copy, Default)]
pub struct RankClassifier;

impl LineClassifier for RankClassifier {
    fn assign(&self, ranked: &[LineComponent]) -> Vec<(LineRole, usize)> {
        LineRole::ALL
            .iter()
            .copied()
            .zip(0..ranked.len())
            .take(MAX_LINES)
            .collect()
    }
}

/// Sort components by area, largest first
///
/// The sort is stable, so equal areas keep their discovery order.
pub fn rank_components(mut components: Vec<LineComponent>) -> Vec<LineComponent> {
    components.sort_by(|a, b| b.area.cmp(&a.area));
    components
}
