//! Seeded generation of fake-but-statistically-plausible healthcare records.
//!
//! Everything random flows through a caller-supplied [`ChaCha8Rng`], so a
//! fixed seed always reproduces the same cohort and the same rows. Each
//! dataset generator composes draws from frequency-weighted lookup tables
//! ([`BucketList`]) and parametric normal distributions ([`Normal`]) into
//! rows that respect the person's birth/death window.
//!
//! [`ChaCha8Rng`]: rand_chacha::ChaCha8Rng
//! [`BucketList`]: bucket_list::BucketList
//! [`Normal`]: distribution::Normal

pub use bucket_list::BucketList;
pub use cohort::{IdentifierPool, PersonCollection};
pub use distribution::Normal;
pub use generator::{
    generate_rows, load_record_batch, random_eligible_person, save_record_batch, to_record_batch,
    write_csv, Dataset, RowsGenerated,
};
pub use person::{Gender, Person};
pub use seeded_rng::make_rng;

pub mod bucket_list;
pub mod cohort;
pub mod dates;
pub mod datasets;
pub mod distribution;
pub mod generator;
pub mod person;
pub mod seeded_rng;
