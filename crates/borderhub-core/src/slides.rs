//! The GIS workflow slide deck and a bounded cursor over it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{HubError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Image path relative to the pictures directory.
    pub image: String,
    pub title: String,
    pub caption: String,
}

impl Slide {
    pub fn new(image: &str, title: &str, caption: &str) -> Self {
        Self {
            image: image.to_string(),
            title: title.to_string(),
            caption: caption.to_string(),
        }
    }
}

/// The step-by-step walkthrough of how the spatial analysis was built.
pub fn default_deck() -> Vec<Slide> {
    vec![
        Slide::new("Merge_datasets.png", "Merging Datasets", "We merged datasets of Uganda and Kenya to create a unified foundation for analyzing cross-border trade, conflict, and population patterns."),
        Slide::new("markets with population density weight 1.png", "Population Assignment: Markets and Population", "We sourced high-resolution population data from WorldPop and assigned it to each market point."),
        Slide::new("markets with population density weight 2.png", "Market Coverage Simulation", "Urban markets received a 1.5 km buffer; rural markets a 3 km buffer, simulating service areas realistically."),
        Slide::new("Trading routes and Markets population coverage 1.png", "Trading Routes and Population Coverage (Part 1)", "Visualization showing how catchment areas relate to key trading routes."),
        Slide::new("Trading routes and Markets population coverage 2.png", "Trading Routes and Population Coverage (Part 2)", "Highlights how clustered populations align with transport corridors."),
        Slide::new("Travel Distance Calculation 1.png", "Travel Distance Calculation (Part 1)", "Using OSM data, we calculated travel distances from markets to border posts."),
        Slide::new("Travel Distance Calculation 2.png", "Travel Distance Calculation (Part 2)", "This map visualizes how accessibility varies across the region."),
        Slide::new("Road Data Preparation.png", "Road Data Preparation", "Road infrastructure was cleaned and validated to model realistic travel times."),
        Slide::new("assign pop point to market 1.png", "Assigning Population Points to Markets (Part 1)", "Spatial joins linked buffered markets to surrounding population points."),
        Slide::new("assign pop point to market 2.png", "Assigning Population Points to Markets (Part 2)", "This simulates realistic market demand by weighting markets by nearby population."),
        Slide::new("fatalities and proximity1.png", "Conflict Event Proximity (Part 1)", "Conflict event data was analyzed for proximity to critical trade routes."),
        Slide::new("fatalities and proximity2.png", "Conflict Event Proximity (Part 2)", "We weighted fatalities and conflict severity closer to borders more heavily."),
        Slide::new("Travle distance (1).jpg", "Conflict Impact on Trade Routes", "Trade routes were assessed for risk exposure to nearby conflicts."),
        Slide::new("Markets type and conflict (1).jpg", "Market Types and Conflict Exposure", "We examined how different market types faced different conflict risks."),
        Slide::new("CI (1).jpg", "Conflict Intensity Mapping", "Conflict Intensity (CI) heatmaps and timelines highlight spikes in conflict at hubs like Busia and Malaba."),
        Slide::new("Layer 3 .jpg", "Relational Networks (Ethnicity and Trade)", "We overlaid ethnic, cultural, and linguistic ties onto economic and conflict maps."),
    ]
}

/// Where a viewer currently is in the deck.
#[derive(Debug, Clone, Serialize)]
pub struct SlidePosition {
    pub index: usize,
    pub total: usize,
    pub slide: Slide,
}

/// A cursor clamped to `[0, len - 1]`. Moving past either end is a no-op.
#[derive(Debug, Clone)]
pub struct SlideNavigator {
    deck: Arc<[Slide]>,
    index: usize,
}

impl SlideNavigator {
    pub fn new(deck: Arc<[Slide]>) -> Result<Self> {
        if deck.is_empty() {
            return Err(HubError::EmptyDeck);
        }
        Ok(Self { deck, index: 0 })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.deck.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deck.is_empty()
    }

    pub fn advance(&mut self) -> usize {
        self.index = (self.index + 1).min(self.deck.len() - 1);
        self.index
    }

    pub fn retreat(&mut self) -> usize {
        self.index = self.index.saturating_sub(1);
        self.index
    }

    pub fn current(&self) -> &Slide {
        &self.deck[self.index]
    }

    pub fn position(&self) -> SlidePosition {
        SlidePosition {
            index: self.index,
            total: self.deck.len(),
            slide: self.current().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav() -> SlideNavigator {
        SlideNavigator::new(default_deck().into()).unwrap()
    }

    #[test]
    fn retreat_at_start_stays_at_zero() {
        let mut n = nav();
        assert_eq!(n.retreat(), 0);
        assert_eq!(n.current().title, "Merging Datasets");
    }

    #[test]
    fn advance_at_end_stays_at_last() {
        let mut n = nav();
        let last = n.len() - 1;
        for _ in 0..n.len() + 3 {
            n.advance();
        }
        assert_eq!(n.index(), last);
        assert_eq!(n.advance(), last);
        assert_eq!(n.retreat(), last - 1);
    }

    #[test]
    fn single_slide_deck_never_moves() {
        let mut n = SlideNavigator::new(vec![Slide::new("a.png", "A", "a")].into()).unwrap();
        assert_eq!(n.advance(), 0);
        assert_eq!(n.retreat(), 0);
    }

    #[test]
    fn empty_deck_is_rejected() {
        let deck: Arc<[Slide]> = Vec::new().into();
        assert!(matches!(SlideNavigator::new(deck), Err(HubError::EmptyDeck)));
    }
}
