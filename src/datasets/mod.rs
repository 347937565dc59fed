//! Record generators for each synthetic dataset.
//!
//! Each generator produces rows about one [`Person`] at a time, drawing all
//! randomness from the caller's rng so a seed fully determines the output.
//! Frequency-weighted content comes from small aggregate tables embedded in
//! the binary (`src/data/*.csv`), parsed lazily on first use.

use std::sync::OnceLock;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::bucket_list::BucketList;
use crate::person::Person;

pub mod biochemistry;
pub mod demography;
pub mod hospital_admissions;
pub mod maternity;
pub mod prescribing;
pub mod wide;

pub use biochemistry::Biochemistry;
pub use demography::Demography;
pub use hospital_admissions::HospitalAdmissions;
pub use maternity::Maternity;
pub use prescribing::Prescribing;
pub use wide::{UltraWide, Wide};

/// A source of randomly generated dataset rows.
///
/// `generate_row` returns one complete row, with `None` for cells that are
/// deliberately blank in the synthetic output. Row length always matches
/// `headers()`.
pub trait DataGenerator {
    fn headers(&self) -> Vec<String>;

    /// Whether rows in this dataset can be generated for the given person.
    fn is_eligible(&self, _person: &Person) -> bool {
        true
    }

    fn generate_row(&mut self, person: &Person, rng: &mut ChaCha8Rng) -> Vec<Option<String>>;
}

/// Lazily-parsed lookup tables shared by the generators.
///
/// Build one instance per run and hand it to each generator constructor.
/// Each table is parsed from its embedded csv exactly once; a malformed
/// table aborts at first use, since that is a packaging bug no caller can
/// recover from.
#[derive(Debug, Default)]
pub struct LookupTables {
    biochemistry: OnceLock<BucketList<biochemistry::BiochemistryLookupRow>>,
    admissions: OnceLock<hospital_admissions::AdmissionsLookup>,
    prescribing: OnceLock<BucketList<prescribing::PrescriptionLookupRow>>,
    maternity_locations: OnceLock<BucketList<String>>,
}

impl LookupTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn biochemistry(&self) -> &BucketList<biochemistry::BiochemistryLookupRow> {
        self.biochemistry.get_or_init(|| {
            let list = biochemistry::load_lookup()
                .unwrap_or_else(|e| panic!("bad embedded biochemistry lookup: {e:#}"));
            log::debug!("built biochemistry lookup ({} test codes)", list.len());
            list
        })
    }

    pub(crate) fn admissions(&self) -> &hospital_admissions::AdmissionsLookup {
        self.admissions.get_or_init(|| {
            hospital_admissions::load_lookup()
                .unwrap_or_else(|e| panic!("bad embedded hospital admissions lookup: {e:#}"))
        })
    }

    pub(crate) fn prescribing(&self) -> &BucketList<prescribing::PrescriptionLookupRow> {
        self.prescribing.get_or_init(|| {
            let list = prescribing::load_lookup()
                .unwrap_or_else(|e| panic!("bad embedded prescribing lookup: {e:#}"));
            log::debug!("built prescribing lookup ({} drugs)", list.len());
            list
        })
    }

    pub(crate) fn maternity_locations(&self) -> &BucketList<String> {
        self.maternity_locations.get_or_init(|| {
            maternity::load_locations()
                .unwrap_or_else(|e| panic!("bad embedded maternity location lookup: {e:#}"))
        })
    }
}

/// Formats a date the way the csv extracts do.
pub(crate) fn format_date(date: chrono::NaiveDateTime) -> String {
    date.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Returns a random 'GPCode'. This is a letter followed by up to 3 digits.
pub(crate) fn random_gp_code(rng: &mut ChaCha8Rng) -> String {
    format!("{}{}", random_letter(rng), rng.gen_range(0..999))
}

/// Gets a random upper case letter (A - Z).
pub(crate) fn random_letter(rng: &mut ChaCha8Rng) -> char {
    (b'A' + rng.gen_range(0..26)) as char
}

/// Returns a random 'status' for a CHI or sometimes None. Values include
/// 'C' (current), 'H' (historical), 'L' (legacy) and 'R' (retracted).
pub(crate) fn random_chi_status(rng: &mut ChaCha8Rng) -> Option<char> {
    match rng.gen_range(0..5) {
        0 => Some('C'),
        1 => Some('H'),
        2 => None,
        3 => Some('L'),
        4 => Some('R'),
        _ => unreachable!(),
    }
}

/// Returns a string that represents a double, in one of the mixed formats
/// seen in the source feeds (bare int, rounded float, "d.d").
pub(crate) fn random_double_ish(rng: &mut ChaCha8Rng) -> String {
    match rng.gen_range(0..3) {
        0 => rng.gen_range(0..100).to_string(),
        1 => format!("{:.2}", rng.gen::<f64>()),
        _ => format!("{}.{}", rng.gen_range(0..10), rng.gen_range(0..10)),
    }
}

/// Returns a random sentence, for free-text comment noise.
pub(crate) fn random_sentence(rng: &mut ChaCha8Rng) -> &'static str {
    SENTENCES[rng.gen_range(0..SENTENCES.len())]
}

// Sourced from https://randomwordgenerator.com/sentence.php
static SENTENCES: [&str; 94] = [
    "A mad prize ghosts the attractive romantic.",
    "I often see the time 11:11 or 12:34 on clocks.",
    "Malls are great places to shop; I can find everything I need under one roof.",
    "Christmas is coming.",
    "I will never be this young again. Ever. Oh damn' I just got older.",
    "This is a Japanese doll.",
    "We have never been to Asia, nor have we visited Africa.",
    "She was too short to see over the fence.",
    "Hurry!",
    "If I don't like something, I'll stay away from it.",
    "Wednesday is hump day, but has anyone asked the camel if he's happy about it?",
    "She folded her handkerchief neatly.",
    "I checked to make sure that he was still alive.",
    "He didn't want to go to the dentist, yet he went anyway.",
    "There was no ice cream in the freezer, nor did they have money to go to the store.",
    "Sometimes, all you need to do is completely make an ass of yourself and laugh it off to realise that life isn't so bad after all.",
    "If the Easter Bunny and the Tooth Fairy had babies would they take your teeth and leave chocolate for you?",
    "Cats are good pets, for they are clean and are not noisy.",
    "The body may perhaps compensates for the loss of a true metaphysics.",
    "Please wait outside of the house.",
    "The mysterious diary records the voice.",
    "There were white out conditions in the town; subsequently, the roads were impassable.",
    "I love eating toasted cheese and tuna sandwiches.",
    "Two seats were vacant.",
    "The clock within this blog and the clock on my laptop are 1 hour different from each other.",
    "She did her best to help him.",
    "We need to rent a room for our party.",
    "Someone I know recently combined Maple Syrup & buttered Popcorn thinking it would taste like caramel popcorn. It didn't and they don't recommend anyone else do it either.",
    "The river stole the gods.",
    "Joe made the sugar cookies; Susan decorated them.",
    "He told us a very exciting adventure story.",
    "He said he was not there yesterday; however, many people saw him there.",
    "I really want to go to work, but I am too sick to drive.",
    "A glittering gem is not enough.",
    "Abstraction is often one floor above you.",
    "Sometimes it is better to just walk away from things and go back to them later when you're in a better frame of mind.",
    "Mary plays the piano.",
    "She did not cheat on the test, for it was not the right thing to do.",
    "I would have gotten the promotion, but my attendance wasn't good enough.",
    "I want more detailed information.",
    "It was getting dark, and we weren't there yet.",
    "She borrowed the book from him many years ago and hasn't yet returned it.",
    "I was very proud of my nickname throughout high school but today- I couldn't be any different to what my nickname was.",
    "Wow, does that work?",
    "When I was little I had a car door slammed shut on my hand. I still remember it quite vividly.",
    "The waves were crashing on the shore; it was a lovely sight.",
    "If Purple People Eaters are real' where do they find purple people to eat?",
    "Where do random thoughts come from?",
    "They got there early, and they got really good seats.",
    "Everyone was busy, so I went to the movie alone.",
    "I am never at home on Sundays.",
    "Should we start class now, or should we wait for everyone to get here?",
    "The quick brown fox jumps over the lazy dog.",
    "A song can make or ruin a person's day if they let it get to them.",
    "I want to buy a onesie' but know it won't suit me.",
    "Italy is my favorite country; in fact, I plan to spend two weeks there next year.",
    "I hear that Nancy is very pretty.",
    "What was the person thinking when they discovered cow's milk was fine for human consumption' and why did they do it in the first place!?",
    "She advised him to come back at once.",
    "He ran out of money, so he had to stop playing poker.",
    "My Mum tries to be cool by saying that she likes all the same things that I do.",
    "The sky is clear; the stars are twinkling.",
    "She works two jobs to make ends meet; at least, that was her reason for not having time to join us.",
    "I'd rather be a bird than a fish.",
    "He turned in the research paper on Friday; otherwise, he would have not passed the class.",
    "The memory we used to share is no longer coherent.",
    "Lets all be unique together until we realise we are all the same.",
    "I am happy to take your donation; any amount will be greatly appreciated.",
    "The old apple revels in its authority.",
    "Let me help you with your baggage.",
    "Sixty-Four comes asking for bread.",
    "I am counting my calories, yet I really want dessert.",
    "How was the math test?",
    "If you like tuna and tomato sauce- try combining the two. It's really not as bad as it sounds.",
    "Last Friday in three week's time I saw a spotted striped blue worm shake hands with a legless lizard.",
    "She wrote him a long letter, but he didn't read it.",
    "Don't step on the broken glass.",
    "Check back tomorrow; I will see if the book has arrived.",
    "I currently have 4 windows open up' and I don't know why.",
    "Tom got a small piece of pie.",
    "Is it free?",
    "She only paints with bold colors; she does not like pastels.",
    "Yeah, I think it's a good environment for learning English.",
    "This is the last random sentence I will be writing and I am going to stop mid-sent",
    "We have a lot of rain in June.",
    "She always speaks to him in a loud voice.",
    "The lake is a long way from here.",
    "Writing a list of random sentences is harder than I initially thought it would be.",
    "I think I will buy the red car, or I will lease the blue one.",
    "A purple pig and a green donkey flew a kite in the middle of the night and ended up sunburnt.",
    "The stranger officiates the meal.",
    "The shooter says goodbye to his love.",
    "The book is in front of the table.",
    "Rock music approaches at high velocity.",
];
