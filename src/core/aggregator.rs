use crate::core::{EntityCategory, ExtractionResult, FrequencyTable};
use indexmap::IndexMap;

/// Label → occurrence count, remembering the order labels were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyCounter {
    counts: IndexMap<String, u64>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str, count: u64) {
        *self.counts.entry(label.to_string()).or_insert(0) += count;
    }

    /// 每次出現都要計數，不做去重
    pub fn update<'a>(&mut self, labels: impl IntoIterator<Item = &'a String>) {
        for label in labels {
            self.add(label, 1);
        }
    }

    pub fn get(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn merge(&mut self, other: &FrequencyCounter) {
        for (label, count) in other.iter() {
            self.add(label, count);
        }
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts
            .iter()
            .map(|(label, &count)| (label.as_str(), count))
    }

    /// Count descending; equal counts stay in first-seen order (stable sort).
    pub fn sorted(&self) -> Vec<(String, u64)> {
        let mut rows: Vec<(String, u64)> = self
            .iter()
            .map(|(label, count)| (label.to_string(), count))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }
}

/// 三個類別各一個計數器
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregator {
    binary_systems: FrequencyCounter,
    intermediates: FrequencyCounter,
    descriptors: FrequencyCounter,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, result: &ExtractionResult) {
        self.binary_systems.update(&result.binary_systems);
        self.intermediates.update(&result.intermediates);
        self.descriptors.update(&result.descriptors);
    }

    pub fn merge(&mut self, other: &Aggregator) {
        for category in EntityCategory::ALL {
            self.counter_mut(category).merge(other.counter(category));
        }
    }

    pub fn counter(&self, category: EntityCategory) -> &FrequencyCounter {
        match category {
            EntityCategory::BinarySystems => &self.binary_systems,
            EntityCategory::Intermediates => &self.intermediates,
            EntityCategory::Descriptors => &self.descriptors,
        }
    }

    fn counter_mut(&mut self, category: EntityCategory) -> &mut FrequencyCounter {
        match category {
            EntityCategory::BinarySystems => &mut self.binary_systems,
            EntityCategory::Intermediates => &mut self.intermediates,
            EntityCategory::Descriptors => &mut self.descriptors,
        }
    }

    pub fn into_tables(self) -> Vec<FrequencyTable> {
        EntityCategory::ALL
            .iter()
            .map(|&category| FrequencyTable {
                category,
                rows: self.counter(category).sorted(),
            })
            .collect()
    }
}
