//! Session-level caching for interactive front-ends.
//!
//! The pricing core keeps no state between calls. An interactive session,
//! however, re-renders constantly and often revisits the same inputs, so it
//! remembers one entry per (coordinates, date range): the loaded series and
//! its Weibull fit. Changing only the threshold, exposure or loading reprices
//! from the stored fit, with no network round trip and no refit.
//!
//! A cache instance assumes a single data source and ladder; call
//! [`PricingCache::clear`] when either changes.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::app::pipeline::{RunOutput, fit_series, load_observations, run_pricing_with_fit};
use crate::domain::{DataSource, ObservationSeries, PricingRequest, WeibullFit};
use crate::error::{AppError, PricingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    latitude_bits: u64,
    longitude_bits: u64,
    start: NaiveDate,
    end: NaiveDate,
}

impl From<&PricingRequest> for SeriesKey {
    fn from(req: &PricingRequest) -> Self {
        Self {
            latitude_bits: req.location.latitude.to_bits(),
            longitude_bits: req.location.longitude.to_bits(),
            start: req.range.start,
            end: req.range.end,
        }
    }
}

/// A loaded series and the outcome of fitting it. A failed fit is kept too,
/// so an unusable window is not reloaded on every keystroke.
#[derive(Debug)]
struct SeriesEntry {
    series: Arc<ObservationSeries>,
    fit: PricingResult<WeibullFit>,
}

#[derive(Debug, Default)]
pub struct PricingCache {
    entries: HashMap<SeriesKey, SeriesEntry>,
    loads: usize,
    fits: usize,
}

impl PricingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Price `request`, loading and fitting its series only on first use.
    pub fn price(
        &mut self,
        request: &PricingRequest,
        source: &DataSource,
        ladder: &[f64],
    ) -> Result<RunOutput, AppError> {
        let key = SeriesKey::from(request);
        let entry = match self.entries.entry(key) {
            Entry::Occupied(slot) => {
                debug!("series cache hit");
                slot.into_mut()
            }
            Entry::Vacant(slot) => {
                let series = load_observations(request, source)?;
                self.loads += 1;
                let fit = fit_series(&series);
                self.fits += 1;
                slot.insert(SeriesEntry {
                    series: Arc::new(series),
                    fit,
                })
            }
        };

        let fit = entry.fit.clone()?;
        run_pricing_with_fit(request, ladder, Arc::clone(&entry.series), fit)
    }

    /// Number of times observations were actually loaded.
    pub fn loads(&self) -> usize {
        self.loads
    }

    /// Number of Weibull fits run.
    pub fn fits(&self) -> usize {
        self.fits
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
