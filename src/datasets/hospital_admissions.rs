//! Hospital admission episodes with ICD-10 coded conditions.
//!
//! The embedded aggregate table records, for each ICD-10 code, how often it
//! appeared and in which window of months it was in use. Draws are
//! restricted to the codes active in the admission month, so codes enter
//! and leave the generated data the way they did in the source aggregates.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::bucket_list::BucketList;
use crate::dates::{max_date, random_date};
use crate::person::Person;

use super::{format_date, random_sentence, DataGenerator, LookupTables};

static LOOKUP_CSV: &str = include_str!("../data/hospital_admissions.csv");
static OPERATIONS_CSV: &str = include_str!("../data/hospital_admissions_operations.csv");

/// The earliest admission date to generate (matches the window the source
/// aggregate data was collected over).
pub fn minimum_admission_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1983, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("hardcoded date is valid")
}

/// The latest admission date to generate.
pub fn maximum_admission_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("hardcoded date is valid")
}

/// The condition slot a lookup row's code appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConditionColumn {
    Main,
    Other1,
    Other2,
    Other3,
}

impl ConditionColumn {
    const ALL: [ConditionColumn; 4] = [
        ConditionColumn::Main,
        ConditionColumn::Other1,
        ConditionColumn::Other2,
        ConditionColumn::Other3,
    ];

    fn parse(name: &str) -> anyhow::Result<Self> {
        match name {
            "MAIN_CONDITION" => Ok(ConditionColumn::Main),
            "OTHER_CONDITION_1" => Ok(ConditionColumn::Other1),
            "OTHER_CONDITION_2" => Ok(ConditionColumn::Other2),
            "OTHER_CONDITION_3" => Ok(ConditionColumn::Other3),
            other => anyhow::bail!("unknown condition column {other}"),
        }
    }
}

/// Months since 1900-01, the unit the aggregate table measures code
/// activity in.
fn months_since_1900(date: NaiveDateTime) -> i32 {
    (date.year() - 1900) * 12 + date.month() as i32
}

#[derive(Debug, Deserialize)]
struct CodeRow {
    #[serde(rename = "TestCode")]
    code: String,
    #[serde(rename = "ColumnAppearingIn")]
    column: String,
    #[serde(rename = "AverageMonthAppearing")]
    average_month: f64,
    #[serde(rename = "StandardDeviationMonthAppearing")]
    std_dev_months: f64,
    #[serde(rename = "CountAppearances")]
    count: u32,
}

#[derive(Debug, Deserialize)]
struct OperationsRow {
    #[serde(rename = "MAIN_CONDITION")]
    main_condition: String,
    #[serde(rename = "MAIN_OPERATION")]
    main_operation: String,
    #[serde(rename = "MAIN_OPERATION_B")]
    main_operation_b: String,
    #[serde(rename = "OTHER_OPERATION_1")]
    other_operation_1: String,
    #[serde(rename = "OTHER_OPERATION_1B")]
    other_operation_1b: String,
    #[serde(rename = "OTHER_OPERATION_2")]
    other_operation_2: String,
    #[serde(rename = "OTHER_OPERATION_2B")]
    other_operation_2b: String,
    #[serde(rename = "OTHER_OPERATION_3")]
    other_operation_3: String,
    #[serde(rename = "OTHER_OPERATION_3B")]
    other_operation_3b: String,
    #[serde(rename = "CountOfRecords")]
    count: u32,
}

fn blank_to_none(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parsed form of the admissions aggregate tables: the weighted code list,
/// a per-column map from month to the codes active then, and the popular
/// operation tuples for each main condition.
#[derive(Debug)]
pub(crate) struct AdmissionsLookup {
    codes: BucketList<String>,
    // indexed by ConditionColumn as usize, keyed by months_since_1900
    month_maps: [HashMap<i32, Vec<usize>>; 4],
    operations: HashMap<String, BucketList<[Option<String>; 8]>>,
}

impl AdmissionsLookup {
    /// A random ICD-10 code for the given slot, weighted by appearance
    /// count among the codes active in the admission month.
    fn random_code(&self, column: ConditionColumn, admission: NaiveDateTime, rng: &mut ChaCha8Rng) -> String {
        let month = months_since_1900(admission);
        let active = self.month_maps[column as usize]
            .get(&month)
            .unwrap_or_else(|| panic!("admission month {month} outside the aggregate window"));
        self.codes.get_random_from(active, rng).clone()
    }

    fn random_operations(&self, main_condition: &str, rng: &mut ChaCha8Rng) -> [Option<String>; 8] {
        match self.operations.get(main_condition) {
            Some(list) => list.get_random(rng).clone(),
            None => Default::default(),
        }
    }
}

pub(crate) fn load_lookup() -> anyhow::Result<AdmissionsLookup> {
    let from = months_since_1900(minimum_admission_date());
    let to = months_since_1900(maximum_admission_date());

    let mut codes = BucketList::new();
    let mut month_maps: [HashMap<i32, Vec<usize>>; 4] = Default::default();
    for map in &mut month_maps {
        for month in from..=to {
            map.insert(month, Vec::new());
        }
    }

    let mut reader = csv::Reader::from_reader(LOOKUP_CSV.as_bytes());
    for (index, record) in reader.deserialize().enumerate() {
        let row: CodeRow = record.context("parsing hospital admissions row")?;
        let column = ConditionColumn::parse(&row.column)?;

        // a code is active within two standard deviations of its average
        // month, clipped to the window we generate admissions in
        let month_from = ((row.average_month - 2.0 * row.std_dev_months).round() as i32).max(from);
        let month_to = ((row.average_month + 2.0 * row.std_dev_months).round() as i32).min(to);

        for month in month_from..=month_to {
            month_maps[column as usize]
                .entry(month)
                .or_default()
                .push(index);
        }

        codes.add(row.count, row.code);
    }

    for column in ConditionColumn::ALL {
        for month in from..=to {
            anyhow::ensure!(
                !month_maps[column as usize][&month].is_empty(),
                "no {column:?} codes active in month {month}"
            );
        }
    }

    let mut operations: HashMap<String, BucketList<[Option<String>; 8]>> = HashMap::new();
    let mut reader = csv::Reader::from_reader(OPERATIONS_CSV.as_bytes());
    for record in reader.deserialize() {
        let row: OperationsRow = record.context("parsing admissions operations row")?;
        operations.entry(row.main_condition).or_default().add(
            row.count,
            [
                blank_to_none(row.main_operation),
                blank_to_none(row.main_operation_b),
                blank_to_none(row.other_operation_1),
                blank_to_none(row.other_operation_1b),
                blank_to_none(row.other_operation_2),
                blank_to_none(row.other_operation_2b),
                blank_to_none(row.other_operation_3),
                blank_to_none(row.other_operation_3b),
            ],
        );
    }

    log::debug!(
        "built admissions lookup ({} codes, {} operable conditions)",
        codes.len(),
        operations.len()
    );

    Ok(AdmissionsLookup {
        codes,
        month_maps,
        operations,
    })
}

/// One admission episode: dates, coded conditions and popular operations.
#[derive(Debug, Clone, PartialEq)]
pub struct HospitalAdmissionsRecord {
    pub admission_date: NaiveDateTime,
    pub discharge_date: NaiveDateTime,
    pub main_condition: String,
    pub other_condition_1: Option<String>,
    pub other_condition_2: Option<String>,
    pub other_condition_3: Option<String>,
    pub operations: [Option<String>; 8],
}

impl HospitalAdmissionsRecord {
    pub(crate) fn new(
        lookup: &AdmissionsLookup,
        person: &Person,
        after: NaiveDateTime,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let after = max_date(after, person.date_of_birth);
        let admission_date = random_date(
            max_date(after, minimum_admission_date()),
            maximum_admission_date(),
            rng,
        );

        // discharged after a random number of hours, up to 10 days
        let discharge_date = admission_date + Duration::hours(rng.gen_range(0..240));

        // condition 1 always populated
        let main_condition = lookup.random_code(ConditionColumn::Main, admission_date, rng);

        let mut other_condition_1 = None;
        let mut other_condition_2 = None;
        let mut other_condition_3 = None;

        // 50% chance of condition 2 as well as 1
        if rng.gen_range(0..2) == 0 {
            other_condition_1 = Some(lookup.random_code(ConditionColumn::Other1, admission_date, rng));

            // 25% chance of condition 3 too
            if rng.gen_range(0..2) == 0 {
                other_condition_2 =
                    Some(lookup.random_code(ConditionColumn::Other2, admission_date, rng));

                // 12.5% chance of all conditions
                if rng.gen_range(0..2) == 0 {
                    other_condition_3 =
                        Some(lookup.random_code(ConditionColumn::Other3, admission_date, rng));
                }

                // 1.25% chance of dirty data = the text 'Nul'
                if rng.gen_range(0..10) == 0 {
                    other_condition_3 = Some("Nul".to_string());
                }
            }
        }

        // if the condition is one that is often treated in a specific way
        let operations = lookup.random_operations(&main_condition, rng);

        HospitalAdmissionsRecord {
            admission_date,
            discharge_date,
            main_condition,
            other_condition_1,
            other_condition_2,
            other_condition_3,
            operations,
        }
    }
}

/// Generates admission episode rows for random people.
pub struct HospitalAdmissions {
    lookups: Arc<LookupTables>,
}

impl HospitalAdmissions {
    pub fn new(lookups: &Arc<LookupTables>) -> Self {
        HospitalAdmissions {
            lookups: Arc::clone(lookups),
        }
    }
}

impl DataGenerator for HospitalAdmissions {
    fn headers(&self) -> Vec<String> {
        [
            "chi",
            "DateOfBirth",
            "AdmissionDate",
            "DischargeDate",
            "MainCondition",
            "OtherCondition1",
            "OtherCondition2",
            "OtherCondition3",
            "Comment",
            "MainOperation",
            "MainOperationB",
            "OtherOperation1",
            "OtherOperation1B",
            "OtherOperation2",
            "OtherOperation2B",
            "OtherOperation3",
            "OtherOperation3B",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn generate_row(&mut self, person: &Person, rng: &mut ChaCha8Rng) -> Vec<Option<String>> {
        let episode = HospitalAdmissionsRecord::new(
            self.lookups.admissions(),
            person,
            person.date_of_birth,
            rng,
        );
        let [op, op_b, op1, op1_b, op2, op2_b, op3, op3_b] = episode.operations;

        vec![
            Some(person.chi.clone()),
            Some(format_date(person.date_of_birth)),
            Some(format_date(episode.admission_date)),
            Some(format_date(episode.discharge_date)),
            Some(episode.main_condition),
            episode.other_condition_1,
            episode.other_condition_2,
            episode.other_condition_3,
            Some(random_sentence(rng).to_string()),
            op,
            op_b,
            op1,
            op1_b,
            op2,
            op2_b,
            op3,
            op3_b,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::{IdentifierPool, PersonCollection};
    use crate::seeded_rng::make_rng;

    #[test]
    fn every_month_in_the_window_has_active_codes() {
        // load_lookup verifies this itself; just make sure it loads
        let lookup = load_lookup().unwrap();
        assert!(!lookup.codes.is_empty());
    }

    #[test]
    fn episode_dates_are_ordered_and_bounded() {
        let lookups = Arc::new(LookupTables::new());
        let mut rng = make_rng(11, "admissions");
        let mut pool = IdentifierPool::new();

        for _ in 0..300 {
            let person = Person::new(&mut rng, &mut pool);
            let episode = HospitalAdmissionsRecord::new(
                lookups.admissions(),
                &person,
                person.date_of_birth,
                &mut rng,
            );
            assert!(episode.admission_date >= max_date(person.date_of_birth, minimum_admission_date()));
            assert!(episode.admission_date < maximum_admission_date());
            assert!(episode.discharge_date >= episode.admission_date);
            assert!(episode.discharge_date <= episode.admission_date + Duration::days(10));
        }
    }

    #[test]
    fn condition_chain_is_strictly_nested() {
        let lookups = Arc::new(LookupTables::new());
        let mut rng = make_rng(12, "admissions");
        let mut pool = IdentifierPool::new();

        let mut saw_nul = false;
        for _ in 0..2000 {
            let person = Person::new(&mut rng, &mut pool);
            let e = HospitalAdmissionsRecord::new(
                lookups.admissions(),
                &person,
                person.date_of_birth,
                &mut rng,
            );
            if e.other_condition_3.is_some() {
                assert!(e.other_condition_2.is_some());
            }
            if e.other_condition_2.is_some() {
                assert!(e.other_condition_1.is_some());
            }
            if e.other_condition_3.as_deref() == Some("Nul") {
                saw_nul = true;
            }
        }
        // about 1.25% of records carry the dirty sentinel
        assert!(saw_nul, "expected at least one 'Nul' in 2000 episodes");
    }

    #[test]
    fn operations_only_appear_for_mapped_conditions() {
        let lookups = Arc::new(LookupTables::new());
        let mut gen = HospitalAdmissions::new(&lookups);
        let mut rng = make_rng(13, "admissions");
        let mut pool = IdentifierPool::new();
        let person = Person::new(&mut rng, &mut pool);

        for _ in 0..500 {
            let row = gen.generate_row(&person, &mut rng);
            let main_condition = row[4].as_deref().unwrap();
            let has_ops = row[9].is_some();
            if has_ops {
                assert!(
                    lookups.admissions().operations.contains_key(main_condition),
                    "operations generated for unmapped condition {main_condition}"
                );
            }
        }
    }

    #[test]
    fn same_seed_same_rows() {
        let lookups = Arc::new(LookupTables::new());
        let mut a = HospitalAdmissions::new(&lookups);
        let mut b = HospitalAdmissions::new(&lookups);
        let mut cohort = PersonCollection::new();
        cohort.generate_people(10, &mut make_rng(14, "admissions-cohort"));

        let mut r1 = make_rng(14, "admissions");
        let mut r2 = make_rng(14, "admissions");
        for person in cohort.people() {
            assert_eq!(
                a.generate_row(person, &mut r1),
                b.generate_row(person, &mut r2)
            );
        }
    }
}
