//! Prescription rows drawn from a weighted table of common drugs.

use std::sync::Arc;

use anyhow::Context;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::bucket_list::BucketList;
use crate::person::Person;

use super::{format_date, DataGenerator, LookupTables};

static LOOKUP_CSV: &str = include_str!("../data/prescribing.csv");

/// One row of the embedded prescribing frequency table. Quantity bounds
/// are strings because some drugs are dispensed in non-numeric amounts
/// ("300ML", "5 CARTRIDGES").
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PrescriptionLookupRow {
    pub res_seqno: String,
    pub name: String,
    pub formulation_code: String,
    pub strength: String,
    #[serde(rename = "orig_strength")]
    pub strength_numerical: String,
    pub measure_code: String,
    #[serde(rename = "BNF_Code")]
    pub bnf_code: String,
    #[serde(rename = "formatted_BNF_Code")]
    pub formatted_bnf_code: String,
    #[serde(rename = "BNF_Description")]
    pub bnf_description: String,
    #[serde(rename = "Approved_Name")]
    pub approved_name: String,
    #[serde(rename = "minQuantity")]
    pub min_quantity: String,
    #[serde(rename = "maxQuantity")]
    pub max_quantity: String,
    pub frequency: u32,
}

impl PrescriptionLookupRow {
    /// A quantity uniform between the min and max when both are numeric;
    /// otherwise one of the raw strings, picked at random.
    fn random_quantity(&self, rng: &mut ChaCha8Rng) -> String {
        match (
            self.min_quantity.parse::<f64>(),
            self.max_quantity.parse::<f64>(),
        ) {
            (Ok(min), Ok(max)) => ((rng.gen::<f64>() * (max - min) + min) as i64).to_string(),
            _ => {
                if rng.gen_range(0..2) == 0 {
                    self.min_quantity.clone()
                } else {
                    self.max_quantity.clone()
                }
            }
        }
    }

    fn strength_numerical(&self) -> Option<String> {
        if self.strength_numerical == "NULL" {
            None
        } else {
            Some(self.strength_numerical.clone())
        }
    }
}

pub(crate) fn load_lookup() -> anyhow::Result<BucketList<PrescriptionLookupRow>> {
    let mut list = BucketList::new();
    let mut reader = csv::Reader::from_reader(LOOKUP_CSV.as_bytes());
    for record in reader.deserialize() {
        let row: PrescriptionLookupRow = record.context("parsing prescribing row")?;
        list.add(row.frequency, row);
    }
    Ok(list)
}

/// Generates prescription rows for random people.
pub struct Prescribing {
    lookups: Arc<LookupTables>,
}

impl Prescribing {
    pub fn new(lookups: &Arc<LookupTables>) -> Self {
        Prescribing {
            lookups: Arc::clone(lookups),
        }
    }
}

impl DataGenerator for Prescribing {
    fn headers(&self) -> Vec<String> {
        [
            "chi",
            "PrescribedDate",
            "Quantity",
            "Strength",
            "StrengthNumerical",
            "FormulationCode",
            "MeasureCode",
            "Name",
            "ApprovedName",
            "BnfCode",
            "FormattedBnfCode",
            "BnfDescription",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn generate_row(&mut self, person: &Person, rng: &mut ChaCha8Rng) -> Vec<Option<String>> {
        // weighted by how often each drug appears in the aggregate data
        let drug = self.lookups.prescribing().get_random(rng);
        let quantity = drug.random_quantity(rng);

        vec![
            Some(person.chi.clone()),
            Some(format_date(person.random_date_during_lifetime(rng))),
            Some(quantity),
            Some(drug.strength.clone()),
            drug.strength_numerical(),
            Some(drug.formulation_code.clone()),
            Some(drug.measure_code.clone()),
            Some(drug.name.clone()),
            Some(drug.approved_name.clone()),
            Some(drug.bnf_code.clone()),
            Some(drug.formatted_bnf_code.clone()),
            Some(drug.bnf_description.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::{IdentifierPool, PersonCollection};
    use crate::seeded_rng::make_rng;

    #[test]
    fn numeric_quantities_stay_within_lookup_bounds() {
        let lookups = Arc::new(LookupTables::new());
        let mut gen = Prescribing::new(&lookups);
        let mut rng = make_rng(21, "prescribing");
        let mut pool = IdentifierPool::new();
        let person = Person::new(&mut rng, &mut pool);

        for _ in 0..1000 {
            let row = gen.generate_row(&person, &mut rng);
            assert_eq!(row.len(), gen.headers().len());
            let quantity = row[2].as_deref().unwrap();
            if let Ok(n) = quantity.parse::<i64>() {
                // all numeric lookup ranges sit inside 1..=168
                assert!((1..=168).contains(&n), "quantity {n} out of range");
            } else {
                // non-numeric quantities come straight from the lookup
                assert!(
                    ["300ML", "500ML", "15G", "30G", "5 CARTRIDGES", "2 VIALS"]
                        .contains(&quantity),
                    "unexpected quantity {quantity}"
                );
            }
        }
    }

    #[test]
    fn common_drugs_dominate_rare_ones() {
        let lookups = Arc::new(LookupTables::new());
        let mut gen = Prescribing::new(&lookups);
        let mut rng = make_rng(22, "prescribing");
        let mut pool = IdentifierPool::new();
        let person = Person::new(&mut rng, &mut pool);

        let mut statins = 0;
        let mut insulin = 0;
        for _ in 0..3000 {
            let row = gen.generate_row(&person, &mut rng);
            match row[8].as_deref() {
                Some("SIMVASTATIN") => statins += 1,
                Some("INSULIN GLARGINE") => insulin += 1,
                _ => {}
            }
        }
        assert!(statins > 100, "simvastatin appeared only {statins} times");
        assert!(statins > insulin * 10);
    }

    #[test]
    fn same_seed_same_rows() {
        let lookups = Arc::new(LookupTables::new());
        let mut a = Prescribing::new(&lookups);
        let mut b = Prescribing::new(&lookups);
        let mut cohort = PersonCollection::new();
        cohort.generate_people(10, &mut make_rng(23, "prescribing-cohort"));

        let mut r1 = make_rng(23, "prescribing");
        let mut r2 = make_rng(23, "prescribing");
        for person in cohort.people() {
            assert_eq!(
                a.generate_row(person, &mut r1),
                b.generate_row(person, &mut r2)
            );
        }
    }
}
