//! Placeholder identities.
//!
//! Names, phrases and colors are assigned by cycling through fixed pools;
//! only the activity counters are random.

use rand::Rng;

use crate::types::UserProfile;

const PHRASES: [&str; 20] = [
    "A luz que você busca está no silêncio que você evita.",
    "Cada pulso seu reverbera através das estrelas.",
    "Você é poeira estelar consciente de si mesma.",
    "O universo conspira a favor de quem manifesta com amor.",
    "Sua vibração cria sua realidade.",
    "Navegue pelo desconhecido com coragem.",
    "O vazio não é falta, é potencial infinito.",
    "Ressoe com a frequência do amanhã.",
    "Sua alma é uma arquitetura de fótons sagrados.",
    "Desperte a multidimensão que existe em você.",
    "O agora é o único portal para a eternidade.",
    "Tecer o futuro exige coragem no presente.",
    "Sinta a gravidade do seu próprio propósito.",
    "A harmonia é a linguagem do cosmos.",
    "Seja o oráculo que você procura.",
    "Manifestar é o ato mais puro de liberdade.",
    "O código da vida é escrito em luz.",
    "Sintonize sua mente com a batida do universo.",
    "A expansão começa de dentro para fora.",
    "Cada semente plantada hoje é uma estrela de amanhã.",
];

const NAMES: [&str; 10] = [
    "Aura-Bot",
    "Sentinela",
    "Eco",
    "Vigilante",
    "Nexus",
    "Orbis",
    "Aeon",
    "Vertex",
    "Lumen",
    "Zenit",
];

const COLORS: [&str; 8] = [
    "#00ffff", "#ff00ff", "#7000ff", "#0066ff", "#ffcc00", "#ff4400", "#00ffaa", "#aaccff",
];

/// Maximum age of a bot's last pulse (ms).
const MAX_PULSE_AGE_MS: i64 = 10_000_000;

/// Generate `count` bot identities with ids `bot-0 .. bot-{count-1}`.
pub fn generate_bots<R: Rng + ?Sized>(count: usize, now: i64, rng: &mut R) -> Vec<UserProfile> {
    (0..count)
        .map(|i| UserProfile {
            id: format!("bot-{}", i),
            name: format!("{}-{}", NAMES[i % NAMES.len()], i + 1),
            portrait_url: format!(
                "https://image.pollinations.ai/prompt/abstract%20digital%20consciousness%20entity%20{i}?seed={i}&width=512&height=512&nologo=true"
            ),
            vibe: PHRASES[i % PHRASES.len()].to_string(),
            pulse_count: rng.gen_range(0..20),
            last_pulse_at: Some(now - rng.gen_range(0..MAX_PULSE_AGE_MS)),
            seed_count: 0,
            community_count: 0,
            color: Some(COLORS[i % COLORS.len()].to_string()),
        })
        .collect()
}

/// The four demo members shown before any store is reachable.
pub fn seed_users(now: i64) -> Vec<UserProfile> {
    let demo = |id: &str, name: &str, vibe: &str, pulses: u32, ago: Option<i64>, seeds, communities| {
        UserProfile {
            id: id.to_string(),
            name: name.to_string(),
            portrait_url: format!("https://picsum.photos/seed/{}/400/400", name.to_lowercase()),
            vibe: vibe.to_string(),
            pulse_count: pulses,
            last_pulse_at: ago.map(|ms| now - ms),
            seed_count: seeds,
            community_count: communities,
            color: None,
        }
    };

    vec![
        demo("1", "Zion", "Ethereal Explorer", 12, Some(100_000), 1, 0),
        demo("2", "Gaia", "Deep Resonance", 5, Some(500_000), 0, 1),
        demo("3", "Kael", "Silent Weaver", 0, None, 2, 0),
        demo("4", "Nyx", "Night Architect", 20, Some(200_000), 1, 2),
    ]
}
