//! # Breakthrough Quests
//!
//! A breakthrough is unlocked by visiting a real-world landmark. Which
//! landmarks exist is data supplied from outside the engine through the
//! [`QuestCatalog`] trait; the engine only picks one uniformly at random.

use crate::QuestId;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A visitable landmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub quest_id: QuestId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl Landmark {
    pub fn new(quest_id: impl Into<String>, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            quest_id: QuestId::new(quest_id),
            name: name.into(),
            lat,
            lng,
        }
    }
}

/// Source of landmarks.
pub trait QuestCatalog: Send + Sync {
    fn landmarks(&self) -> &[Landmark];

    fn find(&self, quest: &QuestId) -> Option<&Landmark> {
        self.landmarks().iter().find(|l| &l.quest_id == quest)
    }
}

/// A fixed in-memory catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(rename = "landmark", default)]
    landmarks: Vec<Landmark>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// The catalog used when no file is configured.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            Landmark::new("gyeongbokgung", "Gyeongbokgung Palace", 37.5796, 126.9770),
            Landmark::new("namsan-tower", "N Seoul Tower", 37.5512, 126.9882),
            Landmark::new("bukchon", "Bukchon Hanok Village", 37.5826, 126.9830),
            Landmark::new("cheonggyecheon", "Cheonggyecheon Stream", 37.5690, 126.9786),
            Landmark::new("lotte-tower", "Lotte World Tower", 37.5125, 127.1025),
            Landmark::new("olympic-park", "Olympic Park", 37.5207, 127.1215),
        ])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

impl QuestCatalog for StaticCatalog {
    fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }
}

/// Pick a breakthrough landmark uniformly at random.
///
/// Landmarks in `visited` are skipped unless every landmark has been visited,
/// in which case the pick is over the whole catalog. Returns `None` only for
/// an empty catalog.
pub fn pick_breakthrough_quest<'a, C, R>(
    catalog: &'a C,
    visited: &[QuestId],
    rng: &mut R,
) -> Option<&'a Landmark>
where
    C: QuestCatalog + ?Sized,
    R: Rng + ?Sized,
{
    let all = catalog.landmarks();
    let fresh: Vec<&Landmark> = all
        .iter()
        .filter(|l| !visited.contains(&l.quest_id))
        .collect();

    if fresh.is_empty() {
        all.choose(rng)
    } else {
        fresh.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn builtin_catalog_has_unique_ids() {
        let catalog = StaticCatalog::builtin();
        let mut ids: Vec<_> = catalog.landmarks().iter().map(|l| l.quest_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn empty_catalog_picks_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pick_breakthrough_quest(&StaticCatalog::default(), &[], &mut rng).is_none());
    }

    #[test]
    fn visited_landmarks_are_skipped() {
        let catalog = StaticCatalog::new(vec![
            Landmark::new("a", "A", 0.0, 0.0),
            Landmark::new("b", "B", 1.0, 1.0),
        ]);
        let visited = vec![QuestId::new("a")];
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let pick = pick_breakthrough_quest(&catalog, &visited, &mut rng).map(|l| l.name.as_str());
            assert_eq!(pick, Some("B"));
        }
    }

    #[test]
    fn all_visited_falls_back_to_whole_catalog() {
        let catalog = StaticCatalog::new(vec![Landmark::new("a", "A", 0.0, 0.0)]);
        let mut rng = StdRng::seed_from_u64(3);
        let pick = pick_breakthrough_quest(&catalog, &[QuestId::new("a")], &mut rng);
        assert_eq!(pick.map(|l| l.quest_id.as_str()), Some("a"));
    }

    #[test]
    fn pick_reaches_every_landmark() {
        let catalog = StaticCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..500 {
            if let Some(l) = pick_breakthrough_quest(&catalog, &[], &mut rng) {
                seen.insert(l.quest_id.clone());
            }
        }
        assert_eq!(seen.len(), catalog.len());
    }

    #[test]
    fn find_by_quest_id() {
        let catalog = StaticCatalog::builtin();
        assert!(catalog.find(&QuestId::new("bukchon")).is_some());
        assert!(catalog.find(&QuestId::new("atlantis")).is_none());
    }
}
