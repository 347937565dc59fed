//! Maternity episodes for women in the cohort.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::bucket_list::BucketList;
use crate::dates::{add_years, min_date, now, random_date};
use crate::person::{random_chi, Gender, Person, MINIMUM_YEAR_OF_BIRTH, MAXIMUM_YEAR_OF_BIRTH};

use super::{format_date, DataGenerator, LookupTables};

static LOCATIONS_CSV: &str = include_str!("../data/maternity_locations.csv");

/// The youngest age at which maternity events are generated.
pub const MIN_AGE: i32 = 18;

/// The oldest age at which maternity events are generated.
pub const MAX_AGE: i32 = 55;

#[derive(Debug, Deserialize)]
struct LocationRow {
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "RecordCount")]
    record_count: u32,
}

pub(crate) fn load_locations() -> anyhow::Result<BucketList<String>> {
    let mut list = BucketList::new();
    let mut reader = csv::Reader::from_reader(LOCATIONS_CSV.as_bytes());
    for record in reader.deserialize() {
        let row: LocationRow = record.context("parsing maternity location row")?;
        list.add(row.record_count, row.location);
    }
    log::debug!("built maternity location lookup ({} locations)", list.len());
    Ok(list)
}

static MARITAL_STATUS_CODES: [char; 11] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'Y', 'Z'];

static OBSTETRIC_SPECIALTIES: [&str; 7] = ["F1", "F1A", "F1B", "F2", "F3", "F31", "F32"];

/// One maternity event: when it happened, where, and the babies born.
#[derive(Debug, Clone, PartialEq)]
pub struct MaternityRecord {
    pub date: NaiveDateTime,
    pub sending_location: String,
    pub baby_chis: [Option<String>; 3],
    pub location: String,
    pub marital_status: char,
    pub specialty: String,
}

impl MaternityRecord {
    pub(crate) fn new(
        locations: &BucketList<String>,
        mother: &Person,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let youngest = add_years(mother.date_of_birth, MIN_AGE);
        let oldest = mother
            .date_of_death
            .unwrap_or_else(|| add_years(mother.date_of_birth, MAX_AGE));

        // no future dates
        let oldest = min_date(oldest, now());

        // if they died before 18 the eligibility check should have excluded
        // them, but clamp rather than panic on a reversed range
        let date = if youngest > oldest {
            youngest
        } else {
            random_date(youngest, oldest, rng)
        };

        let sending_location = locations.get_random(rng).clone();

        // every birth has one baby; one in 30 are twins and a further one
        // in 34 of those are triplets
        let mut baby_chis: [Option<String>; 3] = Default::default();
        baby_chis[0] = Some(random_baby_chi(date, rng));
        if rng.gen_range(0..30) == 0 {
            baby_chis[1] = Some(random_baby_chi(date, rng));
            if rng.gen_range(0..34) == 0 {
                baby_chis[2] = Some(random_baby_chi(date, rng));
            }
        }

        let location = format!("Ward {}", rng.gen_range(1..30));
        let marital_status = MARITAL_STATUS_CODES[rng.gen_range(0..MARITAL_STATUS_CODES.len())];
        let specialty =
            OBSTETRIC_SPECIALTIES[rng.gen_range(0..OBSTETRIC_SPECIALTIES.len())].to_string();

        MaternityRecord {
            date,
            sending_location,
            baby_chis,
            location,
            marital_status,
            specialty,
        }
    }
}

/// A CHI for a baby born at the event date, with random gender.
fn random_baby_chi(born: NaiveDateTime, rng: &mut ChaCha8Rng) -> String {
    let gender = if rng.gen_range(0..2) == 0 {
        Gender::Female
    } else {
        Gender::Male
    };
    random_chi(born, gender, rng)
}

/// A CHI for the partner: a random person unrelated to the cohort.
fn random_partner_chi(rng: &mut ChaCha8Rng) -> String {
    let date_of_birth = random_date(
        chrono::NaiveDate::from_ymd_opt(MINIMUM_YEAR_OF_BIRTH, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("hardcoded date is valid"),
        chrono::NaiveDate::from_ymd_opt(MAXIMUM_YEAR_OF_BIRTH, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("hardcoded date is valid"),
        rng,
    );
    let gender = if rng.gen_range(0..2) == 0 {
        Gender::Female
    } else {
        Gender::Male
    };
    random_chi(date_of_birth, gender, rng)
}

fn random_episode_key(rng: &mut ChaCha8Rng) -> String {
    (0..32)
        .map(|_| char::from_digit(rng.gen_range(0..16), 16).expect("digit in range"))
        .collect()
}

/// Generates maternity event rows for eligible (female, of age) people.
pub struct Maternity {
    lookups: Arc<LookupTables>,
}

impl Maternity {
    pub fn new(lookups: &Arc<LookupTables>) -> Self {
        Maternity {
            lookups: Arc::clone(lookups),
        }
    }
}

impl DataGenerator for Maternity {
    fn headers(&self) -> Vec<String> {
        [
            "MotherCHI",
            "Healthboard",
            "Date",
            "PartnerCHI",
            "BabyCHI1",
            "BabyCHI2",
            "BabyCHI3",
            "SendingLocation",
            "EpisodeRecordKey",
            "Location",
            "MaritalStatus",
            "Specialty",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// True when the person is female and lived past the minimum
    /// reproductive age.
    fn is_eligible(&self, person: &Person) -> bool {
        if person.gender != Gender::Female {
            return false;
        }

        // if died must have lived for at least 18 years (round up for leaps)
        if let Some(death) = person.date_of_death {
            return death - person.date_of_birth > Duration::days(i64::from(MIN_AGE) * 366);
        }

        // if alive must be old enough to give birth
        person.date_of_birth <= add_years(now(), -MIN_AGE)
    }

    fn generate_row(&mut self, person: &Person, rng: &mut ChaCha8Rng) -> Vec<Option<String>> {
        let record = MaternityRecord::new(self.lookups.maternity_locations(), person, rng);
        let healthboard = if rng.gen_range(0..2) == 0 { 'T' } else { 'F' };
        let partner_chi = random_partner_chi(rng);
        let episode_key = random_episode_key(rng);
        let [baby1, baby2, baby3] = record.baby_chis;

        vec![
            Some(person.chi.clone()),
            Some(healthboard.to_string()),
            Some(format_date(record.date)),
            Some(partner_chi),
            baby1,
            baby2,
            baby3,
            Some(record.sending_location),
            Some(episode_key),
            Some(record.location),
            Some(record.marital_status.to_string()),
            Some(record.specialty),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::PersonCollection;
    use crate::generator::random_eligible_person;
    use crate::seeded_rng::make_rng;

    #[test]
    fn eligible_people_are_women_of_age() {
        let mut rng = make_rng(100, "maternity-cohort");
        let mut cohort = PersonCollection::new();
        cohort.generate_people(100, &mut rng);

        let lookups = Arc::new(LookupTables::new());
        let m = Maternity::new(&lookups);

        let eligible: Vec<_> = cohort
            .people()
            .iter()
            .filter(|p| m.is_eligible(p))
            .collect();
        assert!(eligible.iter().all(|p| p.gender == Gender::Female));
        // restrictions on both gender and age leave well under half
        assert!(eligible.len() <= 55, "{} eligible", eligible.len());
        assert!(!eligible.is_empty());
    }

    #[test]
    fn events_fall_within_the_mothers_fertile_lifetime() {
        let mut rng = make_rng(100, "maternity-cohort");
        let mut cohort = PersonCollection::new();
        cohort.generate_people(100, &mut rng);

        let lookups = Arc::new(LookupTables::new());
        let m = Maternity::new(&lookups);

        for person in cohort.people().iter().filter(|p| m.is_eligible(p)) {
            let record = MaternityRecord::new(lookups.maternity_locations(), person, &mut rng);
            // gave birth after being born themselves, and not in the future
            assert!(person.date_of_birth < record.date);
            assert!(record.date <= now());
        }
    }

    #[test]
    fn popular_locations_dominate_rare_ones() {
        let mut rng = make_rng(100, "maternity");
        let mut cohort = PersonCollection::new();
        cohort.generate_people(100, &mut make_rng(100, "maternity-cohort"));

        let lookups = Arc::new(LookupTables::new());
        let mut m = Maternity::new(&lookups);

        let mut popular = 0;
        let mut rare = 0;
        for _ in 0..50000 {
            let person = random_eligible_person(&m, cohort.people(), &mut rng);
            let row = m.generate_row(person, &mut rng);
            match row[7].as_deref() {
                Some("T101H") => popular += 1,
                Some("T306H") => rare += 1,
                _ => {}
            }
        }

        assert!(popular > 0);
        // should be more from the popular location; like a lot more
        assert!(popular > rare * 10);
    }

    #[test]
    fn twins_and_triplets_are_rare_but_present() {
        let mut rng = make_rng(42, "maternity");
        let mut cohort = PersonCollection::new();
        cohort.generate_people(100, &mut make_rng(42, "maternity-cohort"));

        let lookups = Arc::new(LookupTables::new());
        let mut m = Maternity::new(&lookups);

        let mut singles = 0;
        let mut twins = 0;
        for _ in 0..10000 {
            let person = random_eligible_person(&m, cohort.people(), &mut rng);
            let row = m.generate_row(person, &mut rng);
            assert!(row[4].is_some(), "every event has a first baby");
            if row[5].is_some() {
                twins += 1;
            } else {
                singles += 1;
            }
            if row[6].is_some() {
                assert!(row[5].is_some(), "triplets imply twins");
            }
        }
        // 1 in 30 expectation over 10000 draws
        assert!(twins > 150 && twins < 550, "twins: {twins}");
        assert!(singles > twins);
    }
}
