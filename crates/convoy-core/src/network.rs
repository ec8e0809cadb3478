//! Corridor network: surveyed transit links between named locations.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// A surveyed link between two locations. The distance overrides the
/// straight-line estimate whenever the planner routes along corridors.
/// Links are bidirectional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corridor {
    pub a: String,
    pub b: String,
    pub distance_km: f64,
}

/// A corridor path between two locations.
#[derive(Debug, Clone)]
pub struct CorridorPath {
    /// Intermediate stops, excluding both endpoints.
    pub via: Vec<String>,
    pub distance_km: f64,
}

/// Bidirectional corridor graph keyed by location id.
#[derive(Debug, Clone, Default)]
pub struct CorridorNetwork {
    edges: HashMap<String, Vec<(String, f64)>>,
}

impl CorridorNetwork {
    pub fn new(corridors: &[Corridor]) -> Self {
        let mut edges: HashMap<String, Vec<(String, f64)>> = HashMap::new();
        for corridor in corridors {
            edges
                .entry(corridor.a.clone())
                .or_default()
                .push((corridor.b.clone(), corridor.distance_km));
            edges
                .entry(corridor.b.clone())
                .or_default()
                .push((corridor.a.clone(), corridor.distance_km));
        }
        Self { edges }
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn direct(&self, from: &str, to: &str) -> Option<f64> {
        self.edges
            .get(from)?
            .iter()
            .find(|(neighbor, _)| neighbor == to)
            .map(|(_, distance_km)| *distance_km)
    }

    /// Fewest-hops corridor path from `from` to `to`.
    ///
    /// Breadth-first over the graph; corridor hops are short trusted links,
    /// so hop count is the search depth that matters. Returns None when the
    /// two locations are not connected, in which case callers fall back to
    /// the straight great-circle leg.
    pub fn path(&self, from: &str, to: &str) -> Option<CorridorPath> {
        if from == to {
            return Some(CorridorPath {
                via: Vec::new(),
                distance_km: 0.0,
            });
        }
        if let Some(distance_km) = self.direct(from, to) {
            return Some(CorridorPath {
                via: Vec::new(),
                distance_km,
            });
        }
        if !self.edges.contains_key(from) || !self.edges.contains_key(to) {
            return None;
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut previous: HashMap<&str, (&str, f64)> = HashMap::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        visited.insert(from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            let Some(neighbors) = self.edges.get(current) else {
                continue;
            };
            for (neighbor, distance_km) in neighbors {
                if !visited.insert(neighbor.as_str()) {
                    continue;
                }
                previous.insert(neighbor.as_str(), (current, *distance_km));
                if neighbor == to {
                    return Some(self.unwind(&previous, from, to));
                }
                queue.push_back(neighbor.as_str());
            }
        }

        None
    }

    fn unwind(&self, previous: &HashMap<&str, (&str, f64)>, from: &str, to: &str) -> CorridorPath {
        let mut via: Vec<String> = Vec::new();
        let mut distance_km = 0.0;
        let mut current = to;
        while current != from {
            let Some((parent, hop_km)) = previous.get(current) else {
                break;
            };
            distance_km += hop_km;
            if current != to {
                via.push(current.to_string());
            }
            current = parent;
        }
        via.reverse();
        CorridorPath { via, distance_km }
    }
}
