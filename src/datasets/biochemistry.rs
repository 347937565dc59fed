//! Lab test results, shaped like a biochemistry extract.
//!
//! Test codes, units and reference ranges come from an aggregate table of
//! real test frequencies; each generated row picks a weighted test code and
//! draws its result from that test's observed normal distribution.

use std::sync::Arc;

use anyhow::Context;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::bucket_list::BucketList;
use crate::distribution::Normal;
use crate::person::Person;

use super::{format_date, DataGenerator, LookupTables};

static LOOKUP_CSV: &str = include_str!("../data/biochemistry.csv");

/// One row of the embedded frequency table. Numeric columns hold "NULL"
/// for tests without a quantity result (cultures, sedimentation rates).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BiochemistryLookupRow {
    #[serde(rename = "LocalClinicalCodeValue")]
    pub test_code: String,
    #[serde(rename = "ReadCodeValue")]
    pub read_code: String,
    #[serde(rename = "hb_extract")]
    pub healthboard: String,
    #[serde(rename = "SampleName")]
    pub sample_type: String,
    #[serde(rename = "ArithmeticComparator")]
    pub arithmetic_comparator: String,
    #[serde(rename = "Interpretation")]
    pub interpretation: String,
    #[serde(rename = "QuantityUnit")]
    pub quantity_unit: String,
    #[serde(rename = "RangeHighValue")]
    pub range_high: String,
    #[serde(rename = "RangeLowValue")]
    pub range_low: String,
    #[serde(rename = "QVAverage")]
    pub qv_average: String,
    #[serde(rename = "QVStandardDev")]
    pub qv_standard_dev: String,
    #[serde(rename = "RecordCount")]
    pub record_count: u32,
}

impl BiochemistryLookupRow {
    /// A new quantity value from the test's observed mean and standard
    /// deviation, or None when the test has no numeric result.
    fn random_result(&self, rng: &mut ChaCha8Rng) -> Option<String> {
        let average: f64 = self.qv_average.parse().ok()?;
        let std_dev: f64 = self.qv_standard_dev.parse().ok()?;
        Some(Normal::new(average, std_dev).sample(rng).to_string())
    }
}

pub(crate) fn load_lookup() -> anyhow::Result<BucketList<BiochemistryLookupRow>> {
    let mut list = BucketList::new();
    let mut reader = csv::Reader::from_reader(LOOKUP_CSV.as_bytes());
    for record in reader.deserialize() {
        let row: BiochemistryLookupRow = record.context("parsing biochemistry row")?;
        list.add(row.record_count, row);
    }
    Ok(list)
}

/// Generates rows of lab test results for random people.
pub struct Biochemistry {
    lookups: Arc<LookupTables>,
}

impl Biochemistry {
    pub fn new(lookups: &Arc<LookupTables>) -> Self {
        Biochemistry {
            lookups: Arc::clone(lookups),
        }
    }
}

fn random_lab_number(rng: &mut ChaCha8Rng) -> String {
    if rng.gen_range(0..2) == 0 {
        format!("CC{}", rng.gen_range(0..1000000))
    } else {
        format!("BC{}", rng.gen_range(0..1000000))
    }
}

impl DataGenerator for Biochemistry {
    fn headers(&self) -> Vec<String> {
        [
            "chi",
            "Healthboard",
            "SampleDate",
            "SampleType",
            "TestCode",
            "Result",
            "Labnumber",
            "QuantityUnit",
            "ReadCodeValue",
            "ArithmeticComparator",
            "Interpretation",
            "RangeHighValue",
            "RangeLowValue",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn generate_row(&mut self, person: &Person, rng: &mut ChaCha8Rng) -> Vec<Option<String>> {
        // weighted by how often each test appears in the aggregate data
        let sample = self.lookups.biochemistry().get_random(rng);
        let lab_number = random_lab_number(rng);
        let result = sample.random_result(rng);

        vec![
            Some(person.chi.clone()),
            Some(sample.healthboard.clone()),
            Some(format_date(person.random_date_during_lifetime(rng))),
            Some(sample.sample_type.clone()),
            Some(sample.test_code.clone()),
            result,
            Some(lab_number),
            Some(sample.quantity_unit.clone()),
            Some(sample.read_code.clone()),
            Some(sample.arithmetic_comparator.clone()),
            Some(sample.interpretation.clone()),
            Some(sample.range_high.clone()),
            Some(sample.range_low.clone()),
        ]
    }
}
