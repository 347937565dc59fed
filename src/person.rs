//! Randomly generated people for whom dataset rows can be built.

use chrono::{NaiveDate, NaiveDateTime};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::cohort::IdentifierPool;
use crate::dates::{now, random_date, random_date_after};

/// Earliest year of birth to generate.
pub const MINIMUM_YEAR_OF_BIRTH: i32 = 1914;

/// Latest year of birth to generate.
pub const MAXIMUM_YEAR_OF_BIRTH: i32 = 2014;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn as_char(&self) -> char {
        match self {
            Gender::Female => 'F',
            Gender::Male => 'M',
        }
    }
}

/// A UK postcode with its associated ward and district.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Postcode {
    /// The full postcode e.g. "DD8 3PZ"
    pub value: String,
    /// The region associated with the postcode e.g. "Angus"
    pub ward: String,
    /// The district associated with the postcode e.g. "Brechin and Edzell"
    pub district: String,
}

/// A four-line address with postcode. Lines 2 and 4 are sometimes blank,
/// as in real demography extracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub line4: String,
    pub postcode: Postcode,
}

impl Address {
    pub fn new_random(rng: &mut ChaCha8Rng) -> Self {
        let number = rng.gen_range(1..300);
        let street = STREETS[rng.gen_range(0..STREETS.len())];
        let line2 = if rng.gen_range(0..3) == 0 {
            LOCALITIES[rng.gen_range(0..LOCALITIES.len())].to_string()
        } else {
            String::new()
        };
        let (town, county, postcode, ward, district) =
            POSTCODE_AREAS[rng.gen_range(0..POSTCODE_AREAS.len())];
        let line4 = if rng.gen_range(0..2) == 0 {
            county.to_string()
        } else {
            String::new()
        };
        Address {
            line1: format!("{number} {street}"),
            line2,
            line3: town.to_string(),
            line4,
            postcode: Postcode {
                value: format!("{postcode}{}{}", rng.gen_range(0..10), ward),
                ward: ward.to_string(),
                district: district.to_string(),
            },
        }
    }
}

/// Randomly generated person for whom datasets can be built.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub forename: String,
    pub surname: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDateTime,
    pub date_of_death: Option<NaiveDateTime>,
    pub chi: String,
    pub anochi: String,
    pub address: Address,
    pub previous_address: Option<Address>,
}

impl Person {
    /// Generates a new random person. The identifier pool guarantees the
    /// person's CHI and ANOCHI have never been issued before; both are
    /// registered in the pool as a side effect.
    pub fn new(rng: &mut ChaCha8Rng, pool: &mut IdentifierPool) -> Self {
        let gender = if rng.gen_range(0..2) == 0 {
            Gender::Female
        } else {
            Gender::Male
        };
        let forename = random_forename(gender, rng).to_string();
        let surname = random_surname(rng).to_string();

        let date_of_birth = random_date(
            NaiveDate::from_ymd_opt(MINIMUM_YEAR_OF_BIRTH, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .expect("hardcoded date is valid"),
            NaiveDate::from_ymd_opt(MAXIMUM_YEAR_OF_BIRTH, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .expect("hardcoded date is valid"),
            rng,
        );

        // 1 in 10 patients is dead
        let date_of_death = if rng.gen_range(0..10) == 0 {
            Some(random_date_after(date_of_birth, rng))
        } else {
            None
        };

        // redraw on collision; the pool makes collisions vanishingly rare
        // so these loops terminate almost immediately in practice
        let mut chi = random_chi(date_of_birth, gender, rng);
        while !pool.register_chi(&chi) {
            chi = random_chi(date_of_birth, gender, rng);
        }

        let mut anochi = generate_anochi(rng);
        while !pool.register_anochi(&anochi) {
            anochi = generate_anochi(rng);
        }

        let address = Address::new_random(rng);

        // one in 10 people doesn't have a previous address
        let previous_address = if rng.gen_range(0..10) != 0 {
            Some(Address::new_random(rng))
        } else {
            None
        };

        Person {
            forename,
            surname,
            gender,
            date_of_birth,
            date_of_death,
            chi,
            anochi,
            address,
            previous_address,
        }
    }

    /// Returns a random first name appropriate to the person's gender.
    pub fn random_forename(&self, rng: &mut ChaCha8Rng) -> &'static str {
        random_forename(self.gender, rng)
    }

    /// Returns a random date after the person's date of birth (and before
    /// their death if they are dead).
    pub fn random_date_during_lifetime(&self, rng: &mut ChaCha8Rng) -> NaiveDateTime {
        match self.date_of_death {
            None => random_date_after(self.date_of_birth, rng),
            Some(death) => random_date(self.date_of_birth, death, rng),
        }
    }

    /// If the person died after `on_date` this returns None (as of `on_date`
    /// nobody knew when the person would die). You cannot predict the
    /// future, but you can remember the past.
    pub fn date_of_death_or_none_on(&self, on_date: NaiveDateTime) -> Option<NaiveDateTime> {
        self.date_of_death.filter(|death| on_date >= *death)
    }

    /// Another CHI consistent with this person's date of birth and gender,
    /// without any uniqueness guarantee. Used for alias fields and for
    /// partner identifiers in maternity rows.
    pub fn random_chi(&self, rng: &mut ChaCha8Rng) -> String {
        random_chi(self.date_of_birth, self.gender, rng)
    }

    pub fn is_dead_by(&self, date: NaiveDateTime) -> bool {
        matches!(self.date_of_death, Some(death) if death < date)
    }

    /// Whether this person has died at all within the generated window.
    pub fn is_dead(&self) -> bool {
        self.is_dead_by(now())
    }
}

/// Returns a random first name for the given gender from the 100 most
/// common names. Two of the boys' names deliberately contain a space, to
/// exercise validation rules downstream.
pub fn random_forename(gender: Gender, rng: &mut ChaCha8Rng) -> &'static str {
    match gender {
        Gender::Female => COMMON_GIRL_FORENAMES[rng.gen_range(0..100)],
        Gender::Male => COMMON_BOY_FORENAMES[rng.gen_range(0..100)],
    }
}

/// Returns a random surname from a list of common surnames.
pub fn random_surname(rng: &mut ChaCha8Rng) -> &'static str {
    COMMON_SURNAMES[rng.gen_range(0..100)]
}

/// Returns a randomly generated CHI number. The first 6 digits match the
/// date of birth and the second to last digit matches the gender (odd for
/// females, even for males).
pub fn random_chi(date_of_birth: NaiveDateTime, gender: Gender, rng: &mut ChaCha8Rng) -> String {
    let prefix = date_of_birth.format("%d%m%y");
    let suffix = rng.gen_range(10..99);

    let mut gender_digit = rng.gen_range(0..10);
    match gender {
        // odd last number for girls
        Gender::Female if gender_digit % 2 == 0 => gender_digit = 1,
        // even last number for guys
        Gender::Male if gender_digit % 2 == 1 => gender_digit = 2,
        _ => {}
    }

    let check_digit = rng.gen_range(0..9);

    format!("{prefix}{suffix}{gender_digit}{check_digit}")
}

fn generate_anochi(rng: &mut ChaCha8Rng) -> String {
    let mut anochi = String::with_capacity(12);
    for _ in 0..10 {
        anochi.push(char::from_digit(rng.gen_range(0..10), 10).expect("digit in range"));
    }
    anochi.push_str("_A");
    anochi
}

static COMMON_GIRL_FORENAMES: [&str; 100] = [
    "AMELIA",
    "OLIVIA",
    "EMILY",
    "AVA",
    "ISLA",
    "JESSICA",
    "POPPY",
    "ISABELLA",
    "SOPHIE",
    "MIA",
    "RUBY",
    "LILY",
    "GRACE",
    "EVIE",
    "SOPHIA",
    "ELLA",
    "SCARLETT",
    "CHLOE",
    "ISABELLE",
    "FREYA",
    "CHARLOTTE",
    "SIENNA",
    "DAISY",
    "PHOEBE",
    "MILLIE",
    "EVA",
    "ALICE",
    "LUCY",
    "FLORENCE",
    "SOFIA",
    "LAYLA",
    "LOLA",
    "HOLLY",
    "IMOGEN",
    "MOLLY",
    "MATILDA",
    "LILLY",
    "ROSIE",
    "ELIZABETH",
    "ERIN",
    "MAISIE",
    "LEXI",
    "ELLIE",
    "HANNAH",
    "EVELYN",
    "ABIGAIL",
    "ELSIE",
    "SUMMER",
    "MEGAN",
    "JASMINE",
    "MAYA",
    "AMELIE",
    "LACEY",
    "WILLOW",
    "EMMA",
    "BELLA",
    "ELEANOR",
    "ESME",
    "ELIZA",
    "GEORGIA",
    "HARRIET",
    "GRACIE",
    "ANNABELLE",
    "EMILIA",
    "AMBER",
    "IVY",
    "BROOKE",
    "ROSE",
    "ANNA",
    "ZARA",
    "LEAH",
    "MOLLIE",
    "MARTHA",
    "FAITH",
    "HOLLIE",
    "AMY",
    "BETHANY",
    "VIOLET",
    "KATIE",
    "MARYAM",
    "FRANCESCA",
    "JULIA",
    "MARIA",
    "DARCEY",
    "ISABEL",
    "TILLY",
    "MADDISON",
    "VICTORIA",
    "ISOBEL",
    "NIAMH",
    "SKYE",
    "MADISON",
    "DARCY",
    "AISHA",
    "BEATRICE",
    "SARAH",
    "ZOE",
    "PAIGE",
    "HEIDI",
    "LYDIA",
];

static COMMON_BOY_FORENAMES: [&str; 100] = [
    "OLIVER",
    "JACK",
    "HARRY",
    "JACOB",
    "CHARLIE",
    "THOMAS",
    "OSCAR",
    "WILLIAM",
    "JAMES",
    "GEORGE",
    "ALFIE",
    "JOSHUA",
    "NOAH",
    "ETHAN",
    "MUHAMMAD",
    "ARCHIE",
    "LEO",
    "HENRY",
    "JOSEPH",
    "SAMUEL",
    "RILEY",
    "DANIEL",
    "MOHAMMED",
    "ALEXANDER",
    "MAX",
    "LUCAS",
    "MASON",
    "LOGAN",
    "ISAAC",
    "BENJAMIN",
    "DYLAN",
    "JAKE",
    "EDWARD",
    "FINLEY",
    "FREDDIE",
    "HARRISON",
    "TYLER",
    "SEBASTIAN",
    "ZACHARY",
    "ADAM",
    "THEO",
    "JAYDEN",
    "ARTHUR",
    "TOBY",
    "LUKE",
    "LEWIS",
    "MATTHEW",
    "HARVEY",
    "HARLEY",
    "DAVID",
    "RYAN",
    "TOMMY",
    "MICHAEL",
    "REUBEN",
    "NATHAN",
    "BLAKE",
    "MOHAMMAD",
    "JENSON",
    "BOBBY",
    "LUCA",
    "CHARLES",
    "FRANKIE",
    "DEXTER",
    "KAI",
    "ALEX",
    "CONNOR",
    "LIAM",
    "JAMIE",
    "ELIJAH",
    "STANLEY",
    "LOUIE",
    "JUDE",
    "CALLUM",
    "HUGO",
    "LEON",
    "ELLIOT",
    "LOUIS",
    "THEODORE",
    "GABRIEL",
    "OLLIE",
    "AARON",
    "FREDERICK",
    "EVAN",
    "ELLIOTT",
    "OWEN",
    "TEDDY",
    "FINLAY",
    "CALEB",
    "IBRAHIM",
    "RONNIE",
    "FELIX",
    "AIDEN",
    "CAMERON",
    "AUSTIN",
    "KIAN",
    "RORY",
    "SETH",
    "ROBERT",
    // these two deliberately have spaces in them to break validation rules
    "MAVERIC MCNULTY",
    "FRANKIE HOLLYWOOD",
];

static COMMON_SURNAMES: [&str; 100] = [
    "Smith",
    "Jones",
    "Taylor",
    "Williams",
    "Brown",
    "Davies",
    "Evans",
    "Wilson",
    "Thomas",
    "Roberts",
    "Johnson",
    "Lewis",
    "Walker",
    "Robinson",
    "Wood",
    "Thompson",
    "White",
    "Watson",
    "Jackson",
    "Wright",
    "Green",
    "Harris",
    "Cooper",
    "King",
    "Lee",
    "Martin",
    "Clarke",
    "James",
    "Morgan",
    "Hughes",
    "Edwards",
    "Hill",
    "Moore",
    "Clark",
    "Harrison",
    "Scott",
    "Young",
    "Morris",
    "Hall",
    "Ward",
    "Turner",
    "Carter",
    "Phillips",
    "Mitchell",
    "Patel",
    "Adams",
    "Campbell",
    "Anderson",
    "Allen",
    "Cook",
    "Bailey",
    "Parker",
    "Miller",
    "Davis",
    "Murphy",
    "Price",
    "Bell",
    "Baker",
    "Griffith",
    "Kelly",
    "Simpson",
    "Marshall",
    "Collins",
    "Bennett",
    "Cox",
    "Richards",
    "Fox",
    "Gray",
    "Rose",
    "Chapman",
    "Hunt",
    "Robertson",
    "Shaw",
    "Reynolds",
    "Lloyd",
    "Ellis",
    "Richards",
    "Russell",
    "Wilkinson",
    "Khan",
    "Graham",
    "Stewart",
    "Reid",
    "Murray",
    "Powell",
    "Palmer",
    "Holmes",
    "Rogers",
    "Stevens",
    "Walsh",
    "Hunter",
    "Thomson",
    "Matthews",
    "Ross",
    "Owen",
    "Mason",
    "Knight",
    "Kennedy",
    "Butler",
    "Saunders",
];

static STREETS: [&str; 12] = [
    "High Street",
    "Victoria Road",
    "Station Road",
    "Mill Lane",
    "Kirk Wynd",
    "Union Street",
    "Albert Crescent",
    "Nethergate",
    "Strathmore Avenue",
    "Queen Street",
    "Castle Terrace",
    "Harbour Road",
];

static LOCALITIES: [&str; 6] = [
    "Woodside",
    "The Glebe",
    "Seafield",
    "Hillbank",
    "Westpark",
    "Carseview",
];

// (town, county, postcode prefix, ward letter suffix, district)
static POSTCODE_AREAS: [(&str, &str, &str, &str, &str); 8] = [
    ("Dundee", "Tayside", "DD1 2", "AB", "Maryfield"),
    ("Forfar", "Angus", "DD8 3", "PZ", "Brechin and Edzell"),
    ("Arbroath", "Angus", "DD11 1", "QT", "Arbroath East"),
    ("Perth", "Perthshire", "PH1 5", "RD", "Perth City Centre"),
    ("St Andrews", "Fife", "KY16 9", "AJ", "St Andrews"),
    ("Montrose", "Angus", "DD10 8", "LN", "Montrose and District"),
    ("Aberdeen", "Aberdeenshire", "AB10 1", "FR", "Torry and Ferryhill"),
    ("Glenrothes", "Fife", "KY7 5", "NX", "Glenrothes Central"),
];
