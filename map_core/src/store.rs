use map_runtime::LocationRecord;

/// Where the current record set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    Feed,
    Demo,
}

/// Authoritative set of location records.
///
/// The only mutation is a wholesale [`LocationStore::replace_all`]; there is
/// no identity-based merge between refreshes.
#[derive(Debug, Default, Clone)]
pub struct LocationStore {
    records: Vec<LocationRecord>,
    source: Option<RecordSource>,
    generation: u64,
}

impl LocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, records: Vec<LocationRecord>, source: RecordSource) {
        self.records = records;
        self.source = Some(source);
        self.generation += 1;
    }

    pub fn all(&self) -> &[LocationRecord] {
        &self.records
    }

    /// True once any record set, even an empty one, has been stored.
    pub fn is_populated(&self) -> bool {
        self.source.is_some()
    }

    pub fn source(&self) -> Option<RecordSource> {
        self.source
    }

    /// Number of completed `replace_all` calls.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
