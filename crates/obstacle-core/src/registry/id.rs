//! Obstacle id allocation
//!
//! Ids are the creation time in Unix milliseconds, rendered as text. Two
//! obstacles created within the same millisecond, a clock that steps
//! backwards, or a legacy id that happens to collide all bump the candidate
//! forward until it is unused.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::model::{Obstacle, ObstacleId};

/// Allocates ids unique within the collection
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    last_issued: i64,
}

impl IdGenerator {
    /// Raise the floor to the largest numeric id in `obstacles`
    pub(crate) fn observe(&mut self, obstacles: &[Obstacle]) {
        let max = obstacles
            .iter()
            .filter_map(|o| o.id().as_str().parse::<i64>().ok())
            .max();

        if let Some(max) = max {
            self.last_issued = self.last_issued.max(max);
        }
    }

    /// Next id not present in `existing`
    pub(crate) fn next(&mut self, existing: &[Obstacle], now: DateTime<Utc>) -> ObstacleId {
        let taken: HashSet<&str> = existing.iter().map(|o| o.id().as_str()).collect();
        self.next_excluding(&taken, now)
    }

    fn next_excluding(&mut self, taken: &HashSet<&str>, now: DateTime<Utc>) -> ObstacleId {
        self.next_after_millis(taken, now.timestamp_millis())
    }

    fn next_after_millis(&mut self, taken: &HashSet<&str>, now: i64) -> ObstacleId {
        let start = self
            .last_issued
            .checked_add(1)
            .map_or(now, |floor| now.max(floor));

        // A stored id near i64::MAX can exhaust the range above the floor;
        // search upward from the clock instead
        match free_from(start, taken).or_else(|| free_from(now, taken)) {
            Some(candidate) => {
                self.last_issued = self.last_issued.max(candidate);
                ObstacleId::new(candidate.to_string())
            }
            None => {
                let mut suffix = 0u64;
                loop {
                    let candidate = format!("{}-{}", now, suffix);
                    if !taken.contains(candidate.as_str()) {
                        return ObstacleId::new(candidate);
                    }
                    suffix += 1;
                }
            }
        }
    }

    /// Give every obstacle after the first holder of an id a fresh one
    ///
    /// Returns the number of obstacles that were re-keyed.
    pub(crate) fn reassign_duplicates(
        &mut self,
        obstacles: Vec<Obstacle>,
        now: DateTime<Utc>,
    ) -> (Vec<Obstacle>, usize) {
        let all_ids: HashSet<String> = obstacles
            .iter()
            .map(|o| o.id().as_str().to_string())
            .collect();

        let mut seen: HashSet<String> = HashSet::with_capacity(obstacles.len());
        let mut reassigned = 0;
        let mut result = Vec::with_capacity(obstacles.len());

        for obstacle in obstacles {
            if seen.insert(obstacle.id().as_str().to_string()) {
                result.push(obstacle);
                continue;
            }

            let taken: HashSet<&str> = all_ids
                .iter()
                .chain(seen.iter())
                .map(String::as_str)
                .collect();
            let fresh = self.next_excluding(&taken, now);
            tracing::warn!(
                "Duplicate obstacle id {} re-keyed as {}",
                obstacle.id(),
                fresh
            );

            seen.insert(fresh.as_str().to_string());
            result.push(obstacle.with_id(fresh));
            reassigned += 1;
        }

        (result, reassigned)
    }
}

/// First value at or above `start` not in `taken`, if any before overflow
fn free_from(start: i64, taken: &HashSet<&str>) -> Option<i64> {
    let mut candidate = start;
    while taken.contains(candidate.to_string().as_str()) {
        candidate = candidate.checked_add(1)?;
    }
    Some(candidate)
}
