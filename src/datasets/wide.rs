//! Very wide stress-test tables for exercising downstream load pipelines.
//!
//! Column content is banded: a run of random ints, then doubles, then
//! sentences, then GP codes, then gaussian ints, so loaders see every
//! datatype at width.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::distribution::gaussian_int_between;
use crate::person::Person;

use super::{random_gp_code, random_sentence, DataGenerator};

fn banded_headers(width: usize) -> Vec<String> {
    let mut headers = Vec::with_capacity(width);
    headers.push("id".to_string());
    headers.push("chi".to_string());
    for i in 2..width {
        headers.push(format!("col{i}"));
    }
    headers
}

fn banded_row(
    person: &Person,
    rng: &mut ChaCha8Rng,
    autonum: u64,
    width: usize,
    bands: [usize; 4],
) -> Vec<Option<String>> {
    let mut row = Vec::with_capacity(width);
    row.push(Some(autonum.to_string()));
    row.push(Some(person.chi.clone()));

    for i in 2..width {
        let cell = if i < bands[0] {
            rng.gen::<i32>().to_string()
        } else if i < bands[1] {
            rng.gen::<f64>().to_string()
        } else if i < bands[2] {
            random_sentence(rng).to_string()
        } else if i < bands[3] {
            random_gp_code(rng)
        } else {
            gaussian_int_between(rng, 50.0, 50000.0).to_string()
        };
        row.push(Some(cell));
    }

    row
}

/// A 980 column dataset.
#[derive(Debug, Default)]
pub struct Wide {
    autonum: u64,
}

impl Wide {
    pub const WIDTH: usize = 980;

    pub fn new() -> Self {
        Wide::default()
    }
}

impl DataGenerator for Wide {
    fn headers(&self) -> Vec<String> {
        banded_headers(Self::WIDTH)
    }

    fn generate_row(&mut self, person: &Person, rng: &mut ChaCha8Rng) -> Vec<Option<String>> {
        self.autonum += 1;
        banded_row(person, rng, self.autonum, Self::WIDTH, [100, 200, 300, 400])
    }
}

/// A 20,000 column dataset, for when [`Wide`] isn't wide enough.
#[derive(Debug, Default)]
pub struct UltraWide {
    autonum: u64,
}

impl UltraWide {
    pub const WIDTH: usize = 20000;

    pub fn new() -> Self {
        UltraWide::default()
    }
}

impl DataGenerator for UltraWide {
    fn headers(&self) -> Vec<String> {
        banded_headers(Self::WIDTH)
    }

    fn generate_row(&mut self, person: &Person, rng: &mut ChaCha8Rng) -> Vec<Option<String>> {
        self.autonum += 1;
        banded_row(
            person,
            rng,
            self.autonum,
            Self::WIDTH,
            [4000, 8000, 16000, 19500],
        )
    }
}
