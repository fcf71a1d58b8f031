/// Name and address generation for simulated nearby devices
use markov_namegen::{CharacterChainGenerator, RandomTextGenerator};

/// Training data for device owner names
const TRAINING_NAMES: &[&str] = &[
    "Aldric", "Theron", "Gareth", "Mirabel", "Isolde", "Lysander", "Elowen", "Rowan",
    "Caelum", "Astrid", "Eirik", "Freya", "Magnus", "Sigrid", "Bjorn", "Ingrid",
    "Apollo", "Diana", "Atlas", "Selene", "Orion", "Luna", "Phoenix", "Aurora",
    "Finn", "Maeve", "Cormac", "Niamh", "Declan", "Siobhan", "Aidan", "Brigid",
    "Zephyr", "Ember", "Storm", "Raven", "Cedar", "Willow", "Maple", "Birch",
];

/// Device models appended to the owner name, like phones announce themselves
const MODELS: &[&str] = &["Pixel", "Galaxy", "Xperia", "Moto", "Nokia", "OnePlus"];

fn create_name_generator() -> CharacterChainGenerator {
    CharacterChainGenerator::builder()
        .with_order(2)
        .with_prior(0.01)
        .train(TRAINING_NAMES.iter().copied())
        .build()
}

/// Generate a pronounceable owner name of at most 12 letters
fn generate_owner_name(generator: &mut CharacterChainGenerator) -> String {
    loop {
        let name = generator.generate_one();
        if !name.is_empty() && name.len() <= 12 && name.chars().all(char::is_alphabetic) {
            return name;
        }
    }
}

/// Generate `count` distinct device names such as "Mirabel's Pixel"
pub fn generate_device_names(count: usize) -> Vec<String> {
    let mut generator = create_name_generator();
    let mut names = Vec::with_capacity(count);
    while names.len() < count {
        let model = MODELS[rand::random_range(0..MODELS.len())];
        let name = format!("{}'s {}", generate_owner_name(&mut generator), model);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Generate a locally administered unicast MAC address
pub fn generate_device_address() -> String {
    let mut octets: [u8; 6] = rand::random();
    // Locally administered, unicast
    octets[0] = (octets[0] | 0x02) & 0xfe;
    octets
        .iter()
        .map(|octet| format!("{:02x}", octet))
        .collect::<Vec<_>>()
        .join(":")
}
