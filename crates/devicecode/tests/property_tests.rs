//! Property-based tests for value cleaning, chip verification and the
//! query language.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p devicecode --test property_tests
//!
//! # More cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p devicecode --test property_tests
//! ```

use chrono::NaiveDate;
use proptest::prelude::*;

use devicecode::device::{ChipCategory, ChipInfo, ChipSlot, Identity};
use devicecode::normalize::{clean_value, Normalizer};
use devicecode::query::{tokenize, YEAR_RANGE};
use devicecode::reference::DefaultValueTable;
use devicecode::{CanonicalDevice, Origin, Query, ReferenceData};

// =============================================================================
// Test Strategies
// =============================================================================

/// Default-like text without comment markers.
fn default_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9;:,\\. ]{1,30}".prop_map(|s| s.trim().to_string())
        .prop_filter("non-empty", |s| !s.is_empty())
}

/// Text added around a default to make a near miss.
fn affix() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{1,8}"
}

/// Chip manufacturer/model pairs, some of them in the built-in list.
fn chip_pair() -> impl Strategy<Value = (String, String)> {
    prop_oneof![
        Just(("Broadcom".to_string(), "BCM4718".to_string())),
        Just(("broadcom".to_string(), "bcm4706".to_string())),
        Just(("Atheros".to_string(), "AR9132".to_string())),
        ("[A-Za-z]{0,12}", "[A-Z0-9]{0,10}"),
    ]
}

fn year() -> impl Strategy<Value = i32> {
    YEAR_RANGE.0..=YEAR_RANGE.1
}

fn device_released(year: i32) -> CanonicalDevice {
    let mut device = CanonicalDevice::new(Origin::WikiDevi, "Acme X1", Identity::new("Acme", "X1"));
    device.release_date = NaiveDate::from_ymd_opt(year, 6, 1);
    device
}

// =============================================================================
// Default Value Table
// =============================================================================

proptest! {
    /// An exact default is dropped; the same text with anything around it is kept.
    #[test]
    fn default_matching_is_exact(default in default_text(), prefix in affix(), suffix in affix()) {
        let mut table = DefaultValueTable::new();
        table.insert("model", &default);

        prop_assert!(table.is_default("model", &default));
        prop_assert!(clean_value(&table, "model", &default).is_none());

        let near_miss = format!("{}{}", default, suffix);
        prop_assert!(!table.is_default("model", &near_miss));
        let kept = clean_value(&table, "model", &near_miss);
        prop_assert_eq!(kept.map(|v| v.text), Some(near_miss.trim().to_string()));

        let near_miss = format!("{} {}", prefix, default);
        prop_assert!(!table.is_default("model", &near_miss));
        prop_assert!(clean_value(&table, "model", &near_miss).is_some());
    }

    /// Defaults only apply to the identifier they were registered for.
    #[test]
    fn default_is_per_identifier(default in default_text()) {
        let mut table = DefaultValueTable::new();
        table.insert("cpu1chip1", &default);

        prop_assert!(table.is_default("CPU1CHIP1", &default));
        prop_assert!(!table.is_default("model", &default));
    }
}

// =============================================================================
// Chip Verification
// =============================================================================

proptest! {
    /// Verifying an already verified chip changes nothing.
    #[test]
    fn verification_is_idempotent((manufacturer, model) in chip_pair()) {
        let reference = ReferenceData::builtin();
        let normalizer = Normalizer::new(&reference);
        let slot = ChipSlot::new(ChipCategory::Cpu, 1, 1);

        let mut chip = ChipInfo::new(slot, manufacturer.clone(), model.clone());
        normalizer.verify(&mut chip);
        let once = chip.clone();
        normalizer.verify(&mut chip);

        prop_assert_eq!(&chip, &once);
        prop_assert_eq!(chip.manufacturer, manufacturer);
        prop_assert_eq!(chip.model, model);
    }

    /// Verification ignores case.
    #[test]
    fn verification_ignores_case((manufacturer, model) in chip_pair()) {
        let reference = ReferenceData::builtin();
        prop_assert_eq!(
            reference.chips.verify(&manufacturer, &model),
            reference.chips.verify(&manufacturer.to_uppercase(), &model.to_lowercase())
        );
    }
}

// =============================================================================
// Query Language
// =============================================================================

proptest! {
    /// A year range matches exactly the devices whose year lies inside it.
    #[test]
    fn year_range_matches_bounds(a in year(), b in year(), released in year()) {
        let device = device_released(released);
        let query = Query::parse(&format!("year={}:{}", a, b)).unwrap();
        let expected = a.min(b) <= released && released <= a.max(b);
        prop_assert_eq!(query.matches(&device), expected);
    }

    /// A range is the same filter as its years listed one by one.
    #[test]
    fn year_range_equals_year_list(a in year(), span in 0i32..5, released in year()) {
        let b = (a + span).min(YEAR_RANGE.1);
        let device = device_released(released);

        let range = Query::parse(&format!("year={}:{}", b, a)).unwrap();
        let listed: Vec<String> = (a..=b).map(|y| format!("year={}", y)).collect();
        let list = Query::parse(&listed.join(" ")).unwrap();

        prop_assert_eq!(range.matches(&device), list.matches(&device));
    }

    /// Years outside the accepted window are rejected.
    #[test]
    fn year_outside_window_is_error(y in prop_oneof![0i32..YEAR_RANGE.0, (YEAR_RANGE.1 + 1)..10000]) {
        let query = format!("year={}", y);
        prop_assert!(Query::parse(&query).is_err());
    }

    /// The tokenizer never panics.
    #[test]
    fn tokenize_never_panics(input in "\\PC{0,80}") {
        let _ = tokenize(&input);
    }

    /// The parser never panics, whatever the statement shape.
    #[test]
    fn parse_never_panics(input in "[a-z_=?:;\"' \\\\0-9]{0,60}") {
        let _ = Query::parse(&input);
    }

    /// Tokens come back lowercased.
    #[test]
    fn tokens_are_lowercase(words in prop::collection::vec("[A-Za-z0-9=]{1,10}", 0..6)) {
        let tokens = tokenize(&words.join(" ")).unwrap();
        prop_assert_eq!(tokens.len(), words.len());
        for (token, word) in tokens.iter().zip(&words) {
            prop_assert_eq!(token, &word.to_lowercase());
        }
    }
}
