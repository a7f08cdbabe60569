use std::collections::HashMap;

/// Identifying metadata for one competition of the season.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompetitionDescriptor {
    pub id: String,
    pub name: String,
    pub date: String,
    pub source_url: String,
}

impl CompetitionDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_url(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_url: url.into(),
            ..Self::default()
        }
    }
}

/// How a single player finished in a single competition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerResult {
    pub player_name: String,
    pub points: i64,
    /// 1-based finishing position as listed on the page.
    pub rank: usize,
    /// Score or status exactly as displayed (`36`, `DQ`, `NS`, ...).
    pub raw_result: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Competition {
    pub descriptor: CompetitionDescriptor,
    pub player_count: usize,
    pub results: HashMap<String, PlayerResult>,
}

impl Competition {
    pub fn new(descriptor: CompetitionDescriptor) -> Self {
        Self {
            descriptor,
            player_count: 0,
            results: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    /// Results in finishing order, ties on rank broken by name.
    pub fn ranked_results(&self) -> Vec<&PlayerResult> {
        let mut rows: Vec<&PlayerResult> = self.results.values().collect();
        rows.sort_by(|a, b| {
            a.rank
                .cmp(&b.rank)
                .then_with(|| a.player_name.cmp(&b.player_name))
        });
        rows
    }
}

/// Competitions of one season as listed on the "all competitions" page.
pub type CompetitionListing = HashMap<String, CompetitionDescriptor>;
