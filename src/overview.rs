// Shows overview state.
// Orders the featured emitter and one emitter per featured location into rows.

use std::sync::Arc;

use tracing::debug;

use crate::artsy::{Show, ShowKind};
use crate::emitter::{DEFAULT_IMAGE_VERSION, ShowEmitter, ShowSource};
use crate::locations::LocationsHost;

pub const FEATURED_TITLE: &str = "Featured Shows";

/// Rows of show emitters: row 0 is featured, the rest are locations.
#[derive(Debug, Clone)]
pub struct ShowsOverview {
    emitters: Vec<ShowEmitter>,
}

impl ShowsOverview {
    /// Build the rows and start the above-the-fold fetches.
    ///
    /// The featured row is fetched only when `cached_featured` is empty.
    pub fn new(
        locations: &LocationsHost,
        kind: ShowKind,
        cached_featured: Vec<Show>,
        source: Arc<dyn ShowSource>,
    ) -> Self {
        let needs_featured = cached_featured.is_empty();
        let featured = ShowEmitter::featured(FEATURED_TITLE, cached_featured, source.clone());
        if needs_featured {
            featured.get_shows();
        }

        let mut emitters = vec![featured];
        emitters.extend(
            locations
                .featured()
                .into_iter()
                .map(|location| ShowEmitter::location_based(location.clone(), kind, source.clone())),
        );

        let overview = Self { emitters };
        overview.request_shows_at(1);
        overview
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    pub fn emitters(&self) -> &[ShowEmitter] {
        &self.emitters
    }

    pub fn featured(&self) -> &ShowEmitter {
        &self.emitters[0]
    }

    pub fn emitter_at(&self, row: usize) -> Option<&ShowEmitter> {
        self.emitters.get(row)
    }

    /// Location emitter for a row; the featured row and out-of-range rows give `None`.
    pub fn location_emitter_at(&self, row: usize) -> Option<&ShowEmitter> {
        if row == 0 {
            return None;
        }
        self.emitters.get(row).filter(|e| e.location().is_some())
    }

    /// Fetch the shows of a location row and the row after it.
    pub fn request_shows_at(&self, row: usize) {
        for row in [row, row + 1] {
            if let Some(emitter) = self.location_emitter_at(row) {
                if emitter.get_shows() {
                    debug!(row, emitter = %emitter.title(), "requested shows");
                }
            }
        }
    }

    /// Image URLs worth prefetching for a location row.
    pub fn image_urls_to_prefetch(&self, row: usize) -> Vec<String> {
        self.location_emitter_at(row)
            .map(|emitter| emitter.image_urls_for_shows(DEFAULT_IMAGE_VERSION))
            .unwrap_or_default()
    }

    /// Wait for every fetch currently in flight.
    pub async fn settled(&self) {
        for emitter in &self.emitters {
            emitter.settled().await;
        }
    }
}
