//! Nearest-pump attribution.
//!
//! Each death record is assigned to the pump closest to it on the survey
//! grid. Distances are planar: the grid is metric and the study area is a
//! few hundred metres across.

use rstar::RTree;
use rstar::primitives::GeomWithData;
use snow_map_analytics_models::PumpShare;
use snow_map_cholera_models::{DeathRecord, PumpRecord};

/// A pump position in the R-tree, tagged with its dataset index.
type PumpEntry = GeomWithData<[f64; 2], usize>;

/// Counts, for every pump in input order, the deaths whose nearest pump it
/// is. Equidistant pumps resolve to the lower index. Returns an empty list
/// when there are no pumps.
#[must_use]
pub fn pump_shares(deaths: &[DeathRecord], pumps: &[PumpRecord]) -> Vec<PumpShare> {
    let mut shares: Vec<PumpShare> = pumps
        .iter()
        .enumerate()
        .map(|(pump_index, pump)| PumpShare {
            pump_index,
            location: pump.location,
            records: 0,
            deaths: 0,
        })
        .collect();

    if pumps.is_empty() {
        return shares;
    }

    let tree = RTree::bulk_load(
        pumps
            .iter()
            .enumerate()
            .map(|(i, pump)| PumpEntry::new([pump.position.easting, pump.position.northing], i))
            .collect(),
    );

    for record in deaths {
        let query = [record.position.easting, record.position.northing];
        let Some(index) = nearest_pump(&tree, query) else {
            continue;
        };
        let share = &mut shares[index];
        share.records += 1;
        share.deaths += u64::from(record.count);
    }

    log::debug!(
        "Attributed {} death records to {} pumps",
        deaths.len(),
        pumps.len()
    );

    shares
}

fn nearest_pump(tree: &RTree<PumpEntry>, query: [f64; 2]) -> Option<usize> {
    let mut candidates = tree.nearest_neighbor_iter_with_distance_2(&query);
    let (first, best_distance) = candidates.next()?;

    let tied = candidates
        .take_while(|(_, distance)| *distance <= best_distance)
        .map(|(entry, _)| entry.data);

    Some(tied.fold(first.data, usize::min))
}
