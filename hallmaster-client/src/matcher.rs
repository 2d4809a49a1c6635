//! Tiered booking search
//!
//! Each search term is matched against collated bookings in two tiers:
//! - **Confident**: the term, or its acronym, appears in the title
//! - **Possible**: the term, or its acronym, appears only in the description
//!
//! Descriptions are fetched lazily through a [`DescriptionFetcher`] and cached
//! on the booking, so one search never fetches the same booking twice.

use crate::sources::DescriptionFetcher;
use hallmaster_common::models::EMPTY_DESCRIPTION;
use hallmaster_common::{Booking, Error, Result};
use serde::Serialize;
use tracing::{debug, info};

/// Uppercased first character of every word in `term`
///
/// Words are runs of alphanumerics and underscores, so
/// `"Annual General Meeting"` gives `"AGM"` and `"yoga"` gives `"Y"`.
pub fn acronym(term: &str) -> String {
    let mut acronym = String::new();
    let mut in_word = false;

    for c in term.chars() {
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word && !in_word {
            acronym.extend(c.to_uppercase());
        }
        in_word = is_word;
    }

    acronym
}

/// Reject an empty term list or any blank term
pub fn validate_terms<S: AsRef<str>>(terms: &[S]) -> Result<()> {
    if terms.is_empty() {
        return Err(Error::Validation("At least one search term is required".to_string()));
    }
    if terms.iter().any(|t| t.as_ref().trim().is_empty()) {
        return Err(Error::Validation("Search terms must not be blank".to_string()));
    }
    Ok(())
}

/// Search tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Stop scanning the remaining bookings for a term once its acronym has
    /// matched one. Later bookings that would also match are missed.
    pub stop_on_first_acronym_hit: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            stop_on_first_acronym_hit: true,
        }
    }
}

/// A matched booking tagged with its confidence tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "confidence", content = "booking", rename_all = "snake_case")]
pub enum SearchHit {
    Confident(Booking),
    Possible(Booking),
}

impl SearchHit {
    pub fn booking(&self) -> &Booking {
        match self {
            SearchHit::Confident(booking) | SearchHit::Possible(booking) => booking,
        }
    }

    pub fn into_booking(self) -> Booking {
        match self {
            SearchHit::Confident(booking) | SearchHit::Possible(booking) => booking,
        }
    }

    pub fn is_confident(&self) -> bool {
        matches!(self, SearchHit::Confident(_))
    }
}

/// Search output: every confident hit, then every possible hit
///
/// Each tier keeps discovery order. A booking can appear more than once when
/// several terms match it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchResults {
    hits: Vec<SearchHit>,
}

impl SearchResults {
    fn from_tiers(confident: Vec<Booking>, possible: Vec<Booking>) -> Self {
        let hits = confident
            .into_iter()
            .map(SearchHit::Confident)
            .chain(possible.into_iter().map(SearchHit::Possible))
            .collect();
        Self { hits }
    }

    pub fn hits(&self) -> &[SearchHit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn confident(&self) -> impl Iterator<Item = &Booking> {
        self.hits.iter().filter(|h| h.is_confident()).map(SearchHit::booking)
    }

    pub fn possible(&self) -> impl Iterator<Item = &Booking> {
        self.hits.iter().filter(|h| !h.is_confident()).map(SearchHit::booking)
    }

    /// Drop the tier tags, keeping order
    pub fn into_bookings(self) -> Vec<Booking> {
        self.hits.into_iter().map(SearchHit::into_booking).collect()
    }
}

impl IntoIterator for SearchResults {
    type Item = SearchHit;
    type IntoIter = std::vec::IntoIter<SearchHit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.into_iter()
    }
}

/// Tiered matcher over collated bookings
pub struct SearchMatcher<'f> {
    fetcher: &'f dyn DescriptionFetcher,
    options: SearchOptions,
}

impl<'f> SearchMatcher<'f> {
    pub fn new(fetcher: &'f dyn DescriptionFetcher) -> Self {
        Self {
            fetcher,
            options: SearchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Fetch and cache the description unless already fetched
    pub async fn ensure_description<'b>(&self, booking: &'b mut Booking) -> Result<&'b str> {
        if !booking.description().is_fetched() {
            debug!(booking_id = booking.id, "Fetching description");
            let text = self.fetcher.fetch_description(booking.id).await?;
            booking.attach_description(text);
        }
        Ok(booking.description().text().unwrap_or(EMPTY_DESCRIPTION))
    }

    /// Match `terms` against `bookings` in order
    ///
    /// Fetched descriptions stay cached on `bookings`.
    ///
    /// # Errors
    /// - `Validation` for an empty term list or a blank term
    /// - any error from the description fetcher, unchanged
    pub async fn search<S: AsRef<str>>(
        &self,
        terms: &[S],
        bookings: &mut [Booking],
    ) -> Result<SearchResults> {
        validate_terms(terms)?;

        let mut confident = Vec::new();
        let mut possible = Vec::new();

        for term in terms {
            let term = term.as_ref();
            let needle = term.to_lowercase();
            let initials = acronym(term).to_lowercase();
            debug!(term = %term, acronym = %initials, "Matching term");

            for booking in bookings.iter_mut() {
                let title = booking.title.to_lowercase();

                if title.contains(&needle) {
                    self.ensure_description(booking).await?;
                    confident.push(booking.clone());
                    continue;
                }

                let description = self.ensure_description(booking).await?.to_lowercase();

                if description.contains(&needle) {
                    possible.push(booking.clone());
                }

                // A term without word characters has no acronym to match on
                if initials.is_empty() {
                    continue;
                }

                if title.contains(&initials) {
                    confident.push(booking.clone());
                    if self.options.stop_on_first_acronym_hit {
                        break;
                    }
                } else if description.contains(&initials) {
                    possible.push(booking.clone());
                    if self.options.stop_on_first_acronym_hit {
                        break;
                    }
                }
            }
        }

        info!(
            terms = terms.len(),
            confident = confident.len(),
            possible = possible.len(),
            "Search complete"
        );

        Ok(SearchResults::from_tiers(confident, possible))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory fetcher recording how often each booking was fetched
    #[derive(Default)]
    struct FakeFetcher {
        descriptions: HashMap<i64, String>,
        calls: Mutex<HashMap<i64, usize>>,
    }

    impl FakeFetcher {
        fn with(descriptions: &[(i64, &str)]) -> Self {
            Self {
                descriptions: descriptions
                    .iter()
                    .map(|(id, text)| (*id, text.to_string()))
                    .collect(),
                calls: Mutex::new(HashMap::new()),
            }
        }

        fn calls_for(&self, id: i64) -> usize {
            self.calls.lock().unwrap().get(&id).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl DescriptionFetcher for FakeFetcher {
        async fn fetch_description(&self, booking_id: i64) -> Result<String> {
            *self.calls.lock().unwrap().entry(booking_id).or_insert(0) += 1;
            Ok(self
                .descriptions
                .get(&booking_id)
                .cloned()
                .unwrap_or_else(|| EMPTY_DESCRIPTION.to_string()))
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl DescriptionFetcher for FailingFetcher {
        async fn fetch_description(&self, _booking_id: i64) -> Result<String> {
            Err(Error::http_status(500, "boom"))
        }
    }

    fn booking(id: i64, title: &str) -> Booking {
        let start = Utc.with_ymd_and_hms(2024, 5, 3, 9, 0, 0).unwrap()
            + chrono::Duration::hours(id);
        Booking::new(id, title, start, start + chrono::Duration::hours(1), "Hall A")
    }

    fn ids(bookings: Vec<Booking>) -> Vec<i64> {
        bookings.into_iter().map(|b| b.id).collect()
    }

    #[test]
    fn test_acronym_of_phrase() {
        assert_eq!(acronym("Annual General Meeting"), "AGM");
    }

    #[test]
    fn test_acronym_of_single_word() {
        assert_eq!(acronym("yoga"), "Y");
    }

    #[test]
    fn test_acronym_splits_on_punctuation() {
        assert_eq!(acronym("parent-toddler group"), "PTG");
        assert_eq!(acronym("  "), "");
    }

    #[tokio::test]
    async fn test_title_match_is_confident_and_case_insensitive() {
        let fetcher = FakeFetcher::default();
        let mut bookings = vec![booking(1, "Morning YOGA"), booking(2, "Choir")];

        let results = SearchMatcher::new(&fetcher)
            .search(&["yoga"], &mut bookings)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results.hits()[0].is_confident());
        assert_eq!(results.hits()[0].booking().id, 1);
        assert!(results.hits()[0].booking().description().is_fetched());
    }

    #[tokio::test]
    async fn test_description_match_is_possible() {
        let fetcher = FakeFetcher::with(&[(2, "Gentle stretching and yoga poses")]);
        let mut bookings = vec![booking(1, "Quiz Night"), booking(2, "Wellbeing Hour")];

        let results = SearchMatcher::new(&fetcher)
            .search(&["Yoga"], &mut bookings)
            .await
            .unwrap();

        // The description also holds the acronym "Y", so the booking is listed twice
        let possible: Vec<i64> = results.possible().map(|b| b.id).collect();
        assert_eq!(possible, vec![2, 2]);
        assert_eq!(results.confident().count(), 0);
    }

    #[tokio::test]
    async fn test_confident_hits_precede_possible_hits() {
        let fetcher = FakeFetcher::with(&[(1, "Where the chess club meets")]);
        let mut bookings = vec![booking(1, "Games Night"), booking(2, "Chess Club Final")];

        let results = SearchMatcher::new(&fetcher)
            .search(&["chess club"], &mut bookings)
            .await
            .unwrap();

        let tiers: Vec<bool> = results.hits().iter().map(SearchHit::is_confident).collect();
        assert_eq!(tiers, vec![true, false]);
        assert_eq!(ids(results.into_bookings()), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_acronym_in_title_is_confident() {
        let fetcher = FakeFetcher::default();
        let mut bookings = vec![booking(1, "Quiz Night"), booking(2, "Village AGM")];

        let results = SearchMatcher::new(&fetcher)
            .search(&["Annual General Meeting"], &mut bookings)
            .await
            .unwrap();

        assert_eq!(ids(results.into_bookings()), vec![2]);
    }

    #[tokio::test]
    async fn test_acronym_hit_stops_scan_by_default() {
        let fetcher = FakeFetcher::default();
        let mut bookings = vec![
            booking(1, "AGM"),
            booking(2, "AGM follow-up"),
            booking(3, "Tea"),
        ];

        let results = SearchMatcher::new(&fetcher)
            .search(&["Annual General Meeting"], &mut bookings)
            .await
            .unwrap();

        assert_eq!(ids(results.into_bookings()), vec![1]);
        assert_eq!(fetcher.calls_for(2), 0);
        assert_eq!(fetcher.calls_for(3), 0);
    }

    #[tokio::test]
    async fn test_acronym_hit_scan_continues_when_disabled() {
        let fetcher = FakeFetcher::default();
        let mut bookings = vec![booking(1, "AGM"), booking(2, "AGM follow-up")];

        let results = SearchMatcher::new(&fetcher)
            .with_options(SearchOptions {
                stop_on_first_acronym_hit: false,
            })
            .search(&["Annual General Meeting"], &mut bookings)
            .await
            .unwrap();

        assert_eq!(ids(results.into_bookings()), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_acronym_in_description_is_possible_and_stops() {
        let fetcher = FakeFetcher::with(&[(1, "Our yearly AGM"), (2, "Also the AGM")]);
        let mut bookings = vec![booking(1, "Members evening"), booking(2, "Trustees")];

        let results = SearchMatcher::new(&fetcher)
            .search(&["Annual General Meeting"], &mut bookings)
            .await
            .unwrap();

        let possible: Vec<i64> = results.possible().map(|b| b.id).collect();
        assert_eq!(possible, vec![1]);
        assert_eq!(fetcher.calls_for(2), 0);
    }

    #[tokio::test]
    async fn test_unrelated_term_only_matches_literal_description() {
        let quiet = FakeFetcher::with(&[(1, "Yearly meeting of all trustees")]);
        let mut bookings = vec![booking(1, "Annual General Meeting")];
        let results = SearchMatcher::new(&quiet)
            .search(&["board"], &mut bookings)
            .await
            .unwrap();
        assert!(results.is_empty());

        let mentions = FakeFetcher::with(&[(1, "The board presents its report")]);
        let mut bookings = vec![booking(1, "Annual General Meeting")];
        let results = SearchMatcher::new(&mentions)
            .search(&["board"], &mut bookings)
            .await
            .unwrap();
        assert_eq!(results.confident().count(), 0);
        assert!(!results.is_empty());
        assert!(results.possible().all(|b| b.id == 1));
    }

    #[tokio::test]
    async fn test_descriptions_fetched_once_across_terms() {
        let fetcher = FakeFetcher::with(&[(1, "nothing relevant"), (2, "also nothing")]);
        let mut bookings = vec![booking(1, "Choir"), booking(2, "Yoga")];

        SearchMatcher::new(&fetcher)
            .search(&["yoga", "pilates", "zumba"], &mut bookings)
            .await
            .unwrap();

        assert_eq!(fetcher.calls_for(1), 1);
        assert_eq!(fetcher.calls_for(2), 1);
        assert!(bookings.iter().all(|b| b.description().is_fetched()));
    }

    #[tokio::test]
    async fn test_booking_can_match_under_several_terms() {
        let fetcher = FakeFetcher::with(&[(1, "weekly singing practice")]);
        let mut bookings = vec![booking(1, "Choir")];

        let results = SearchMatcher::new(&fetcher)
            .search(&["choir", "singing practice"], &mut bookings)
            .await
            .unwrap();

        let tiers: Vec<bool> = results.hits().iter().map(SearchHit::is_confident).collect();
        assert_eq!(tiers, vec![true, false]);
        assert_eq!(ids(results.into_bookings()), vec![1, 1]);
    }

    #[tokio::test]
    async fn test_term_without_word_characters_has_no_acronym_hits() {
        let fetcher = FakeFetcher::with(&[(1, "Bring a mat"), (2, "Agenda attached")]);
        let mut bookings = vec![booking(1, "Yoga"), booking(2, "AGM"), booking(3, "Choir")];

        let results = SearchMatcher::new(&fetcher)
            .search(&["!!"], &mut bookings)
            .await
            .unwrap();

        assert!(results.is_empty());
        for id in [1, 2, 3] {
            assert_eq!(fetcher.calls_for(id), 1);
        }
    }

    #[tokio::test]
    async fn test_empty_and_blank_terms_rejected() {
        let fetcher = FakeFetcher::default();
        let mut bookings = vec![booking(1, "Choir")];
        let matcher = SearchMatcher::new(&fetcher);

        let none: [&str; 0] = [];
        assert!(matches!(
            matcher.search(&none, &mut bookings).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            matcher.search(&["choir", "  "], &mut bookings).await,
            Err(Error::Validation(_))
        ));
        assert_eq!(fetcher.calls_for(1), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let mut bookings = vec![booking(1, "Choir")];
        let err = SearchMatcher::new(&FailingFetcher)
            .search(&["yoga"], &mut bookings)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport { status: Some(500), .. }));
    }

    #[tokio::test]
    async fn test_already_fetched_description_is_reused() {
        let fetcher = FakeFetcher::with(&[(1, "from the server")]);
        let mut bookings = vec![booking(1, "Choir")];
        bookings[0].attach_description("cached yoga notes".to_string());

        let results = SearchMatcher::new(&fetcher)
            .search(&["yoga notes"], &mut bookings)
            .await
            .unwrap();

        assert_eq!(results.possible().count(), 1);
        assert_eq!(fetcher.calls_for(1), 0);
    }
}
