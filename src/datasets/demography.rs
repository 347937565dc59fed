//! GP registration snapshots, 39 columns wide, complete with the data
//! quality quirks of the real feed: healthboard-specific name mangling,
//! missing forenames on old records, sparse alias and address columns.

use chrono::{Datelike, NaiveDateTime};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::dates::{random_date, random_date_after};
use crate::person::{random_surname, Address, Person, MINIMUM_YEAR_OF_BIRTH};

use super::{
    format_date, random_chi_status, random_double_ish, random_gp_code, random_letter,
    DataGenerator,
};

/// Generates GP registration rows for random people.
#[derive(Debug, Default)]
pub struct Demography;

impl Demography {
    pub fn new() -> Self {
        Demography
    }
}

fn earliest(death: Option<NaiveDateTime>, created: NaiveDateTime) -> NaiveDateTime {
    match death {
        Some(d) if d < created => d,
        _ => created,
    }
}

fn address_cells(address: &Address) -> [Option<String>; 5] {
    [
        Some(address.line1.clone()),
        Some(address.line2.clone()),
        Some(address.line3.clone()),
        Some(address.line4.clone()),
        Some(address.postcode.value.clone()),
    ]
}

impl DataGenerator for Demography {
    fn headers(&self) -> Vec<String> {
        [
            "chi",
            "dtCreated",
            "current_record",
            "notes",
            "chi_num_of_curr_record",
            "chi_status",
            "century",
            "surname",
            "forename",
            "sex",
            "current_address_L1",
            "current_address_L2",
            "current_address_L3",
            "current_address_L4",
            "current_postcode",
            "date_of_death",
            "source_death",
            "area_residence",
            "hb_extract",
            "current_gp",
            "birth_surname",
            "previous_surname",
            "midname",
            "alt_forename",
            "other_initials",
            "previous_address_L1",
            "previous_address_L2",
            "previous_address_L3",
            "previous_address_L4",
            "previous_postcode",
            "date_address_changed",
            "adr",
            "current_gp_accept_date",
            "previous_gp",
            "previous_gp_accept_date",
            "date_into_practice",
            "date_of_birth",
            "patient_triage_score",
            "hic_dataLoadRunID",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn generate_row(&mut self, person: &Person, rng: &mut ChaCha8Rng) -> Vec<Option<String>> {
        // all records must have been created after the person was born
        let created = random_date_after(person.date_of_birth, rng);

        let current_record = rng.gen_range(0..2) == 0;

        // one in 10 records has an alias chi
        let alias_chi = if rng.gen_range(0..10) == 0 {
            Some(person.random_chi(rng))
        } else {
            None
        };

        let chi_status = random_chi_status(rng);
        let century = person.date_of_birth.year().to_string()[0..2].to_string();

        let mut surname = Some(person.surname.clone());
        let mut forename = Some(person.forename.clone());

        // all records after a person dies keep the same address; everything
        // before that is a random historical one
        let random_address = Address::new_random(rng);
        let died_before_record = person.is_dead_by(created);
        let current_address = if died_before_record {
            address_cells(&person.address)
        } else {
            address_cells(&random_address)
        };

        let date_of_death = person.date_of_death_or_none_on(created);
        let source_death = date_of_death.map(|_| "R".to_string());

        let area_residence = if person.address.postcode.district.trim().is_empty() {
            None
        } else {
            Some(person.address.postcode.district[0..1].to_string())
        };

        let healthboard = random_letter(rng);

        // healthboard 'A' pads the name field to a length of 10
        if healthboard == 'A' {
            if let Some(name) = forename.as_mut() {
                while name.len() < 10 {
                    name.push(' ');
                }
            }
        }

        // healthboard 'B' sends both names in the forename field and
        // leaves surname blank
        if healthboard == 'B' {
            forename = Some(format!(
                "{} {}",
                forename.as_deref().unwrap_or(""),
                surname.as_deref().unwrap_or("")
            ));
            surname = None;
        }

        let current_gp = random_gp_code(rng);

        // birth surname and previous surname fields, sparsely populated
        let birth_surname = (rng.gen_range(0..10) == 0).then(|| random_surname(rng).to_string());
        let previous_surname = (rng.gen_range(0..10) == 0).then(|| random_surname(rng).to_string());

        // a gender-appropriate middle name for one person in 3
        let midname = (rng.gen_range(0..3) == 0).then(|| person.random_forename(rng).to_string());
        let alt_forename = (rng.gen_range(0..5) == 0).then(|| person.random_forename(rng).to_string());
        let other_initials = (rng.gen_range(0..3) == 0).then(|| random_letter(rng).to_string());

        // people only have previous addresses if they are alive
        let mut previous_address: [Option<String>; 5] = Default::default();
        let mut date_address_changed = None;
        if rng.gen_range(0..2) == 0 && person.date_of_death.is_none() {
            previous_address = address_cells(&Address::new_random(rng));

            // date of address change is unknown for 50% of records
            if rng.gen_range(0..2) == 0 {
                date_address_changed = Some(random_date(
                    person.date_of_birth,
                    earliest(person.date_of_death, created),
                    rng,
                ));
            }
        }

        let gp_accept_date = random_date_after(person.date_of_birth, rng);

        // before 1980 some records are missing a forename; the farther
        // back you go the more likely
        if gp_accept_date.year() < 1980 {
            let spread = gp_accept_date.year() - MINIMUM_YEAR_OF_BIRTH;
            if spread <= 0 || rng.gen_range(0..spread) == 0 {
                forename = None;
            }
        }

        let mut previous_gp = None;
        let mut previous_gp_accept_date = None;
        if rng.gen_range(0..3) == 0 {
            previous_gp = Some(random_gp_code(rng));
            previous_gp_accept_date = Some(random_date_after(gp_accept_date, rng));
        }

        let date_into_practice =
            random_date(person.date_of_birth, earliest(person.date_of_death, created), rng);

        // batches run 1 (earliest possible dtCreated) to 12
        let data_load_run_id = (created.year() - 1890) / 10;

        let [cur_l1, cur_l2, cur_l3, cur_l4, cur_postcode] = current_address;
        let [prev_l1, prev_l2, prev_l3, prev_l4, prev_postcode] = previous_address;

        vec![
            Some(person.chi.clone()),
            Some(format_date(created)),
            Some(current_record.to_string()),
            Some("Random record".to_string()),
            alias_chi,
            chi_status.map(|c| c.to_string()),
            Some(century),
            surname,
            forename,
            Some(person.gender.as_char().to_string()),
            cur_l1,
            cur_l2,
            cur_l3,
            cur_l4,
            cur_postcode,
            date_of_death.map(format_date),
            source_death,
            area_residence,
            Some(healthboard.to_string()),
            Some(current_gp),
            birth_surname,
            previous_surname,
            midname,
            alt_forename,
            other_initials,
            prev_l1,
            prev_l2,
            prev_l3,
            prev_l4,
            prev_postcode,
            date_address_changed.map(format_date),
            None,
            Some(format_date(gp_accept_date)),
            previous_gp,
            previous_gp_accept_date.map(format_date),
            Some(format_date(date_into_practice)),
            Some(format_date(person.date_of_birth)),
            Some(random_double_ish(rng)),
            Some(data_load_run_id.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::{IdentifierPool, PersonCollection};
    use crate::seeded_rng::make_rng;

    #[test]
    fn rows_have_39_columns_and_consistent_identity() {
        let mut gen = Demography::new();
        let mut rng = make_rng(31, "demography");
        let mut pool = IdentifierPool::new();

        for _ in 0..200 {
            let person = Person::new(&mut rng, &mut pool);
            let row = gen.generate_row(&person, &mut rng);
            assert_eq!(row.len(), 39);
            assert_eq!(row[0].as_deref(), Some(person.chi.as_str()));
            assert_eq!(
                row[9].as_deref().unwrap(),
                person.gender.as_char().to_string()
            );
            assert_eq!(row[36].as_deref(), Some(format_date(person.date_of_birth).as_str()));
            // record creation always after birth
            assert!(row[1].as_deref().unwrap() >= row[36].as_deref().unwrap());
        }
    }

    #[test]
    fn death_columns_agree() {
        let mut gen = Demography::new();
        let mut rng = make_rng(32, "demography");
        let mut pool = IdentifierPool::new();

        for _ in 0..500 {
            let person = Person::new(&mut rng, &mut pool);
            let row = gen.generate_row(&person, &mut rng);
            // source_death is populated exactly when a death date is known
            assert_eq!(row[15].is_some(), row[16].is_some());
            if row[15].is_some() {
                assert!(person.date_of_death.is_some());
            }
        }
    }

    #[test]
    fn healthboard_b_merges_the_name_fields() {
        let mut gen = Demography::new();
        let mut rng = make_rng(33, "demography");
        let mut pool = IdentifierPool::new();

        let mut saw_board_b = false;
        for _ in 0..2000 {
            let person = Person::new(&mut rng, &mut pool);
            let row = gen.generate_row(&person, &mut rng);
            if row[18].as_deref() == Some("B") {
                saw_board_b = true;
                assert!(row[7].is_none(), "board B surname should be blank");
                if let Some(forename) = row[8].as_deref() {
                    assert!(forename.ends_with(&person.surname));
                }
            }
        }
        assert!(saw_board_b);
    }

    #[test]
    fn previous_address_only_for_the_living() {
        let mut gen = Demography::new();
        let mut rng = make_rng(34, "demography");
        let mut pool = IdentifierPool::new();

        for _ in 0..1000 {
            let person = Person::new(&mut rng, &mut pool);
            let row = gen.generate_row(&person, &mut rng);
            if person.date_of_death.is_some() {
                assert!(row[25].is_none());
                assert!(row[30].is_none());
            }
        }
    }

    #[test]
    fn same_seed_same_rows() {
        let mut a = Demography::new();
        let mut b = Demography::new();
        let mut cohort = PersonCollection::new();
        cohort.generate_people(20, &mut make_rng(35, "demography-cohort"));

        let mut r1 = make_rng(35, "demography");
        let mut r2 = make_rng(35, "demography");
        for person in cohort.people() {
            assert_eq!(
                a.generate_row(person, &mut r1),
                b.generate_row(person, &mut r2)
            );
        }
    }
}
