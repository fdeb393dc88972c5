//! Per-series in-flight tracking.

use std::collections::HashSet;
use std::sync::Mutex;

use herald_models::SeriesId;

/// Series whose check is currently running.
#[derive(Debug, Default)]
pub struct InFlight {
    series: Mutex<HashSet<SeriesId>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `series_id` busy, or returns `None` if it already is.
    pub fn try_acquire(&self, series_id: &SeriesId) -> Option<InFlightGuard<'_>> {
        let mut series = self.series.lock().unwrap_or_else(|p| p.into_inner());
        if !series.insert(series_id.clone()) {
            return None;
        }
        Some(InFlightGuard {
            owner: self,
            series_id: series_id.clone(),
        })
    }

    pub fn is_busy(&self, series_id: &SeriesId) -> bool {
        self.series
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains(series_id)
    }
}

/// Clears the busy mark when dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    owner: &'a InFlight,
    series_id: SeriesId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .series
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(&self.series_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_refused() {
        let in_flight = InFlight::new();
        let id = SeriesId::new("1399");

        let guard = in_flight.try_acquire(&id);
        assert!(guard.is_some());
        assert!(in_flight.try_acquire(&id).is_none());
        assert!(in_flight.try_acquire(&SeriesId::new("95396")).is_some());

        drop(guard);
        assert!(!in_flight.is_busy(&id));
        assert!(in_flight.try_acquire(&id).is_some());
    }
}
